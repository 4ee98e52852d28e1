//! Client side of the design workflow: file intake, submission with timeout,
//! response classification, batch processing and downloads.

pub mod batch;
pub mod download;
pub mod error;
pub mod identity;
pub mod intake;
pub mod progress;
pub mod submission;

pub use batch::{BatchItem, BatchQueue, BatchStatus, MAX_BATCH_FILES};
pub use error::ClientError;
pub use intake::{ImageFile, MAX_FILE_SIZE};
pub use progress::ProgressTracker;
pub use submission::{
    DesignClient, DesignOutcome, DesignSession, DesignSubmission, ProcessingMode,
    SubmissionState,
};
