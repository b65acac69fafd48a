use thiserror::Error;

#[derive(Error, Debug)]
pub enum RaceError {
    #[error("cannot find the race distance in '{0}'")]
    MissingDistance(String),

    #[error("invalid clock value '{0}': expected mm:ss")]
    ClockFormat(String),

    #[error("missing column '{column}' for {who}")]
    MissingColumn { column: String, who: String },

    #[error("invalid rank '{value}' for athlete '{name}'")]
    InvalidRank { name: String, value: String },

    #[error("invalid number '{value}' in column '{column}'")]
    InvalidNumber { column: String, value: String },

    #[error("race table is empty")]
    EmptyTable,
}

pub type Result<T> = std::result::Result<T, RaceError>;
