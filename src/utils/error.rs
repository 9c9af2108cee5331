// src/utils/error.rs
use chrono::NaiveDate;
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Why a date fragment did not turn into a calendar date.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("No month/day pair found in text")]
    NoDate,

    #[error("Unknown month name: {0}")]
    UnknownMonth(String),

    #[error("Invalid day {day} for {month}")]
    InvalidDay { month: String, day: String },
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Regular expression error: {0}")]
    RegexError(String),

    #[error("Vocabulary '{0}' must not be empty")]
    EmptyVocabulary(&'static str),

    #[error("Invalid vocabulary entry: {0}")]
    InvalidVocabulary(String),
}

#[derive(Error, Debug)]
pub enum InputError {
    #[error("I/O error reading organization list: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error in organization list: {0}")]
    Csv(#[from] csv::Error),

    #[error("Organization list is missing required column '{0}'")]
    MissingColumn(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Window start {start} is after window end {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
