use std::path::PathBuf;

/// Custom Result type for readtally operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the readtally library, encompassing all possible error
/// cases that can occur while loading features and counting reads.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    /// Errors raised while loading the features table
    FeatureError(#[from] FeatureError),
    /// Errors raised while dispatching files to the worker pool
    ScheduleError(#[from] ScheduleError),
    /// Standard I/O errors from the Rust standard library
    IoError(#[from] std::io::Error),
    /// Errors raised while reading or writing comma-separated tables
    CsvError(#[from] csv::Error),
    /// Errors from the niffler decompression library
    NifflerError(#[from] niffler::Error),
}

/// Errors specific to loading and validating the features file
#[derive(thiserror::Error, Debug)]
pub enum FeatureError {
    /// The features file does not exist or is not a regular file
    #[error("Features file not found: {0:?}")]
    MissingFile(PathBuf),

    /// A line of the features file does not carry the expected
    /// `name,sequence` columns
    #[error("Malformed line {1} in features file {0:?}: expected `name,sequence`")]
    MalformedLine(PathBuf, usize),

    /// The features file parsed cleanly but produced no usable entries
    #[error("No features loaded from {0:?}")]
    EmptyTable(PathBuf),
}

/// Errors raised by the batch scheduler
#[derive(thiserror::Error, Debug)]
pub enum ScheduleError {
    /// The scheduler was handed an empty file set
    #[error("No sequencing files to process")]
    EmptyFileSet,

    /// A worker ran its file to an error; the run aborts with no retry
    #[error("Worker failed while processing {path:?}: {source}")]
    WorkerFailed {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// A worker thread panicked; the run aborts with no retry
    #[error("Worker thread panicked while processing {0:?}")]
    WorkerPanicked(PathBuf),
}
