//! The [`LeapdnaError`] `enum` definition and error messages.
//!
use crate::block::BlockType;
use thiserror::Error;

/// The [`LeapdnaError`] defines the standard set of errors that should
/// be passed to the user.
#[derive(Debug, Error)]
pub enum LeapdnaError {
    // IO related errors
    #[error("File reading error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // Leapdna block errors
    #[error("Leapdna block is not a {expected} (found \"{found}\")")]
    BlockTypeMismatch {
        expected: BlockType,
        found: BlockType,
    },
    #[error("Unknown leapdna block type \"{0}\"")]
    UnknownBlockType(String),
    #[error("Leapdna block has no \"type\" field")]
    MissingBlockType,

    // Statistic validation errors
    #[error("Sample size must not be negative (got {0})")]
    InvalidSampleSize(i64),
    #[error("Expected heterozygosity must be between 0 and 1 (got {0})")]
    InvalidHExp(f64),
    #[error("Observed heterozygosity must be between 0 and 1 (got {0})")]
    InvalidHObs(f64),

    // Lookup errors
    #[error("Study has no locus named '{0}'")]
    MissingLocus(String),
    #[error("Locus '{locus}' has no allele named '{allele}'")]
    MissingAllele { locus: String, allele: String },

    // Tabular cell parsing errors
    #[error("Did not understand frequency value \"{0}\"")]
    InvalidFrequencyValue(String),
    #[error("Did not understand sample size value \"{0}\"")]
    InvalidSampleSizeValue(String),
    #[error("Did not understand observed heterozygosity value \"{0}\"")]
    InvalidHObsValue(String),

    // Tabular structure errors
    #[error("Could not parse tabular file: {0}")]
    TabularParseFailure(String),
    #[error("Could not detect the delimiter of tabular file")]
    CouldNotDetectDelimiter,

    // Command line tool related errors
    #[error("Could not detect study file format from extension ('{0}')")]
    CouldNotDetectFileFormat(String),
    #[error("Delimiter must be a single-byte character (got '{0}')")]
    InvalidDelimiter(char),
    #[error("Command line argument error: {0}")]
    ArgumentError(#[from] clap::error::Error),
}
