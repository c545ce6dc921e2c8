#![warn(missing_docs)]

//! blobrelay upload pipeline.
//!
//! Given a directory of content-addressed files, verify each file's bytes
//! against its name, classify it as a manifest or data blob, skip what the
//! catalog already holds, and upload the rest under a fixed-size worker pool
//! with cooperative cancellation and periodic progress reporting.

pub mod cancel;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod retry;
pub mod scanner;

pub use cancel::Stopper;
pub use config::UploaderConfig;
pub use error::{UploadError, UploadResult};
pub use pipeline::{UploadSummary, Uploader};
pub use progress::{ProgressSnapshot, UploadEvent};
pub use retry::{RetryConfig, RetryExecutor, RetryOutcome};
pub use scanner::scan_dir;
