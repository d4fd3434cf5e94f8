mod catalog;
mod catalog_error;
mod models;
mod subsonic;

pub use catalog::*;
pub use catalog_error::CatalogError;
pub use models::*;
pub use subsonic::SubsonicCatalog;
