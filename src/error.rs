use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed monetary value or an unreadable source file.
    #[error("parse error in {context}: {message}")]
    Parse { context: String, message: String },

    #[error("table `{table}` is missing expected column `{column}`")]
    Schema { table: String, column: String },

    #[error("cannot join on `{key}`: column missing from the {side} table")]
    Join { key: String, side: &'static str },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl Error {
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Parse {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn schema(table: impl Into<String>, column: impl Into<String>) -> Self {
        Error::Schema {
            table: table.into(),
            column: column.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
