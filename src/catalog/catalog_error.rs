use reqwest::Error as ReqwestError;
use std::fmt;

#[derive(Debug)]
pub enum CatalogError {
    JsonParseError(serde_json::Error),
    ApiError { code: i32, message: String },
    ReqwestError(ReqwestError),
    NotFound(String),
    Other(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CatalogError::JsonParseError(e) => write!(f, "JSON parse error: {}", e),
            CatalogError::ApiError { code, message } => {
                write!(f, "API error ({}): {}", code, message)
            }
            CatalogError::ReqwestError(e) => write!(f, "Reqwest error: {}", e),
            CatalogError::NotFound(what) => write!(f, "Not found: {}", what),
            CatalogError::Other(s) => write!(f, "Other error: {}", s),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<serde_json::Error> for CatalogError {
    fn from(error: serde_json::Error) -> Self {
        CatalogError::JsonParseError(error)
    }
}

impl From<ReqwestError> for CatalogError {
    fn from(error: ReqwestError) -> Self {
        CatalogError::ReqwestError(error)
    }
}
