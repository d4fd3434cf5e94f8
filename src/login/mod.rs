mod app_secrets;
mod authenticator;
mod credentials;
mod probe;

pub use app_secrets::*;
pub use authenticator::*;
pub use credentials::*;
pub use probe::*;
