use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use vulntechx_core::Error;

pub const DEFAULT_DETECTOR: &str = "techx -silent -json";

/// Run the detector through `sh -c`, feeding it `input` and collecting stdout.
///
/// Spawn failures and non-zero exits are fatal for the whole run.
pub async fn run_detector(detector: &str, input: Vec<u8>) -> Result<Vec<u8>, Error> {
    let fail = |reason: String| Error::Detector { command: detector.to_string(), reason };
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(detector)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| fail(e.to_string()))?;

    // Fed from a separate task so a chatty detector cannot deadlock on a full pipe.
    let feeder = child.stdin.take().map(|mut stdin| {
        tokio::spawn(async move {
            let _ = stdin.write_all(&input).await;
        })
    });

    let output = child.wait_with_output().await.map_err(|e| fail(e.to_string()))?;
    if let Some(f) = feeder {
        let _ = f.await;
    }
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        let reason = if stderr.is_empty() {
            output.status.to_string()
        } else {
            format!("{}: {}", output.status, stderr)
        };
        return Err(fail(reason));
    }
    Ok(output.stdout)
}
