//! Turns raw stdin into a stream of technology records.

mod decoder;
mod detector;

pub use decoder::RecordStream;
pub use detector::{run_detector, DEFAULT_DETECTOR};

use tracing::debug;
use vulntechx_core::Error;

/// True when the input already looks like JSON records.
pub fn looks_structured(input: &[u8]) -> bool {
    matches!(input.iter().copied().find(|b| !b.is_ascii_whitespace()), Some(b'[' | b'{'))
}

/// Produce the bytes the record decoder should read.
///
/// JSON input is passed through untouched. Anything else is treated as a
/// host list and handed to the detector command, whose stdout is returned.
pub async fn resolve_source(input: Vec<u8>, detector: &str) -> Result<Vec<u8>, Error> {
    if input.is_empty() {
        return Err(Error::EmptyInput);
    }
    if looks_structured(&input) {
        debug!("detected JSON on stdin, parsing directly");
        return Ok(input);
    }
    debug!(detector, "no JSON detected on stdin, piping it through the detector");
    run_detector(detector, input).await
}
