use std::path::PathBuf;
use thiserror::Error;

/// Failures a measurement cycle can produce.
///
/// `Decode` and `Publish` are recovered within the cycle (verbatim passthrough
/// and failure-spool spillover respectively). `Spool` has no further fallback
/// and terminates the cycle; `ConfigMissing` terminates startup before any
/// cycle runs.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("measurement output is not a JSON object: {reason}")]
    Decode { reason: String },

    #[error("publish to '{topic}' failed: {reason}")]
    Publish { topic: String, reason: String },

    #[error("failed to append to spool file {}", path.display())]
    Spool {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing required config field '{field}' in [{section}]")]
    ConfigMissing {
        section: &'static str,
        field: &'static str,
    },
}
