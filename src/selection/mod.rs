mod album_url;
mod links_file;
mod selection;

pub use album_url::*;
pub use links_file::*;
pub use selection::*;
