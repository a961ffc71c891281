use crate::sink::OutputSink;
use command_builder::Expansion;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::debug;
use vulntechx_core::JobSpec;

/// How a single job ended. Every job yields exactly one outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Exited { success: bool, code: Option<i32> },
    SpawnFailed,
    WaitFailed,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Exited { success: true, .. })
    }
}

/// Run one job under `sh -c`, feeding the host on stdin and draining both
/// output streams through the sink.
pub async fn run_job(spec: &JobSpec, expansion: &dyn Expansion, sink: &OutputSink) -> JobOutcome {
    let mut child = match Command::new("sh")
        .arg("-c")
        .arg(&spec.command)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(c) => c,
        Err(e) => {
            debug!(host = %spec.host, tech = %spec.tech, error = %e, "error starting command");
            return JobOutcome::SpawnFailed;
        }
    };

    let stdin = child.stdin.take();
    let feed = async move {
        if let Some(mut stdin) = stdin {
            // The child may exit without reading stdin; a broken pipe is fine.
            let _ = stdin.write_all(spec.host.as_bytes()).await;
        }
    };
    tokio::join!(
        feed,
        drain(child.stdout.take(), expansion, sink),
        drain(child.stderr.take(), expansion, sink),
    );

    match child.wait().await {
        Ok(status) => {
            if !status.success() {
                debug!(host = %spec.host, tech = %spec.tech, %status, "command exited unsuccessfully");
            }
            JobOutcome::Exited { success: status.success(), code: status.code() }
        }
        Err(e) => {
            debug!(host = %spec.host, tech = %spec.tech, error = %e, "error waiting for command");
            JobOutcome::WaitFailed
        }
    }
}

async fn drain<R>(stream: Option<R>, expansion: &dyn Expansion, sink: &OutputSink)
where
    R: AsyncRead + Unpin,
{
    let Some(stream) = stream else { return };
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(strip_newline(&buf));
                sink.emit(&line, expansion.persists(&line)).await;
            }
            Err(e) => {
                debug!(error = %e, "error reading command output");
                break;
            }
        }
    }
}

fn strip_newline(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}
