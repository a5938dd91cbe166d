use std::{io, path::PathBuf};

use tablestore::StoreError;
use thiserror::Error;

#[allow(clippy::module_name_repetitions)]
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Unable to load the application configuration file {path:?}")]
    ApplicationConfig { path: PathBuf, source: io::Error },
    #[error("Unable to parse contents of {path:?}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Unable to create configuration file {path:?}")]
    ConfigFileCreation { path: PathBuf },
    #[error("Unable to parse the url: {0}")]
    InvalidUrl(url::ParseError),
    #[error("Store request failed: {0}")]
    Transport(String),
    #[error("No row with id '{id}' in table '{table}'")]
    NotFound { table: String, id: String },
    #[error("Maximum of {limit} '{flag}' items allowed for the {category} category")]
    QuotaExceeded {
        flag: String,
        category: String,
        limit: usize,
    },
    #[error("Unable to store image: {0}")]
    UploadFailure(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
    #[error("Rows of table '{table}' do not carry the '{flag}' flag")]
    UnsupportedFlag { table: String, flag: String },
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RowNotFound(table, id) => CatalogError::NotFound { table, id },
            other => CatalogError::Transport(format!("{other}")),
        }
    }
}

impl From<url::ParseError> for CatalogError {
    fn from(value: url::ParseError) -> Self {
        CatalogError::InvalidUrl(value)
    }
}
