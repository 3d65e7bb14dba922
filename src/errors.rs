//! Error types for sample ingestion
//!
//! Errors are small, `Copy`, and carry only `&'static str` context so they
//! stay cheap on the ingest hot path. A rejected sample leaves the engine
//! untouched: no history append, no bias update, no latest-reading change.

use thiserror::Error;

/// Errors returned by [`AttitudeEngine::ingest`](crate::AttitudeEngine::ingest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IngestError {
    /// A sample field was NaN or infinite.
    ///
    /// `field` names the offending reading (`"accel"`, `"gyro"`, or `"temp"`).
    #[error("invalid sample: non-finite {field} reading")]
    InvalidSample {
        /// Which reading failed validation.
        field: &'static str,
    },
}
