//! Errors returned while refreshing and querying the scores.

use thiserror::Error;

use crate::readers::TransportError;

/// A fatal error met while parsing the decompressed dataset.
/// Any of them aborts the refresh, the previous snapshot is kept.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Malformed metadata line: {0}")]
    MalformedMetadata(String),

    #[error("Metadata field not found: {0}")]
    MissingMetadataField(&'static str),

    #[error("Invalid score date '{value}': {source}")]
    InvalidScoreDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Unexpected CSV header: expected [cve,epss,percentile], got {0:?}")]
    UnexpectedHeader(Vec<String>),

    #[error("Invalid number of fields at line {line}: expected 3, got {fields}")]
    MalformedRow { line: usize, fields: usize },

    #[error("Unreadable CSV: {0}")]
    MalformedCsv(#[from] csv::Error),

    #[error("The dataset is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),
}

/// The dataset could not be downloaded.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Error while sending the request: {0}")]
    Transport(#[source] TransportError),

    #[error("Invalid HTTP response code: {0}")]
    BadStatus(u16),

    #[error("The response body is empty")]
    EmptyBody,
}

/// A refresh attempt failed. The previous snapshot is left untouched.
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("Failed to fetch the scores: {0}")]
    FetchFailed(#[from] FetchError),

    #[error("Failed to decompress the scores: {0}")]
    DecompressFailed(#[source] std::io::Error),

    #[error("Failed to parse the scores: {0}")]
    ParseFailed(#[from] ParseError),
}

/// The errors visible to the users of [`crate::scores::Client`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid CVE format: {0}")]
    InvalidIdentifier(String),

    #[error("Score not found for CVE: {0}")]
    NotFound(String),

    #[error("Failed to update scores: {0}")]
    Refresh(#[from] RefreshError),

    #[error("The command line arguments have not been read")]
    ArgumentsNotRead,

    #[error("Unable to create a HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
