use thiserror::Error;

/// Everything that can go wrong during one rendering pass. All variants are fatal for the pass
/// that produced them, and for that pass only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrailError {
    /// The solver result is missing an entry, has an entry of the wrong length, or holds a value
    /// outside its domain. `path` names the offending field, e.g. `forward_mask_x[2][0][7]`.
    #[error("malformed solver result at {path}: {reason}")]
    MalformedResult { path: String, reason: String },

    /// An index computed by the propagators left its valid range.
    #[error("index contract violated in {context}: index {index} is outside 0..{bound}")]
    IndexContractViolation {
        context: String,
        index: usize,
        bound: usize,
    },

    /// The round counts given to the renderer disagree with what the solver result holds.
    #[error("configuration mismatch: {reason}")]
    ConfigurationMismatch { reason: String },
}

impl TrailError {
    pub(crate) fn malformed<P: Into<String>, R: Into<String>>(path: P, reason: R) -> Self {
        TrailError::MalformedResult {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn index<C: Into<String>>(context: C, index: usize, bound: usize) -> Self {
        TrailError::IndexContractViolation {
            context: context.into(),
            index,
            bound,
        }
    }

    pub(crate) fn mismatch<R: Into<String>>(reason: R) -> Self {
        TrailError::ConfigurationMismatch {
            reason: reason.into(),
        }
    }

    /// Short name of the error class, used as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            TrailError::MalformedResult { .. } => "MalformedResult",
            TrailError::IndexContractViolation { .. } => "IndexContractViolation",
            TrailError::ConfigurationMismatch { .. } => "ConfigurationMismatch",
        }
    }
}
