use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ApiError {
    #[error("dataset not found at {0}")]
    #[diagnostic(help("pass --database or set `database` in biodiversity-api.json"))]
    DataSourceMissing(PathBuf),

    #[error("failed to read dataset: {0}")]
    DataSource(String),

    #[error("dataset table `{table}` is missing column `{column}`")]
    DataSourceMissingColumn { table: String, column: String },

    #[error("malformed value in `{table}.{column}`: {message}")]
    DataSourceMalformed {
        table: String,
        column: String,
        message: String,
    },

    #[error("duplicate key `{key}` in `{table}`")]
    DataSourceDuplicate { table: String, key: String },

    #[error("{0} not found!!!")]
    SampleNotFound(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("server error: {0}")]
    Serve(String),
}

impl ApiError {
    pub fn is_data_source(&self) -> bool {
        matches!(
            self,
            ApiError::DataSourceMissing(_)
                | ApiError::DataSource(_)
                | ApiError::DataSourceMissingColumn { .. }
                | ApiError::DataSourceMalformed { .. }
                | ApiError::DataSourceDuplicate { .. }
        )
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        ApiError::DataSource(err.to_string())
    }
}
