use std::path::PathBuf;
use thiserror::Error;

/// Run-ending failures. Anything that happens inside a single job is not an
/// `Error`; it is folded into that job's outcome instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Config(String),
    #[error("reading {flag} input: {source}")]
    TechList {
        flag: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("reading stdin: {0}")]
    Stdin(#[source] std::io::Error),
    #[error("No input provided on stdin. Provide JSON or pipe host list into this command.")]
    EmptyInput,
    #[error("running {command}: {reason}")]
    Detector { command: String, reason: String },
    #[error("decoding JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("opening output file {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn conflicting_filters() -> Self {
        Error::Config("Cannot use both --exclude-tech and --include-tech flags together".into())
    }
}
