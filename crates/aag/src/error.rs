use thiserror::Error;

use crate::graph::{Eid, Fid};

/// Failures surfaced while building a graph or running a recognizer.
///
/// `AttributeMissing` and `DegenerateEdge` are non-fatal: the builder records
/// them as diagnostics and keeps going with a conservative default (a zero
/// angle, an omitted arc). `InvalidShape` aborts the build. A recognizer's
/// `RecognizerInternalFailure` is caught at the orchestrator boundary and
/// turned into an empty feature list for that recognizer plus a diagnostic —
/// it never aborts the run.
#[derive(Debug, Error)]
pub enum AagError {
    #[error("shape is invalid: {reason}")]
    InvalidShape { reason: String },

    #[error("face {fid} is missing attribute: {what}")]
    AttributeMissing { fid: Fid, what: String },

    #[error("edge {eid} is degenerate (zero-length tangent)")]
    DegenerateEdge { eid: Eid },

    #[error("recognizer '{name}' failed: {reason}")]
    RecognizerInternalFailure { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, AagError>;
