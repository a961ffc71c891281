use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::thread;
use tokio::sync::mpsc;
use tracing::debug;
use vulntechx_core::Error;

/// Lines in flight between jobs and the writer thread.
const BACKLOG: usize = 1024;

#[derive(Debug)]
struct Entry {
    line: String,
    persist: bool,
}

/// Handle jobs use to emit output. Cheap to clone.
///
/// Lines travel over a bounded channel to one writer thread, which echoes
/// each to stdout and appends the persisted ones to the output file. A
/// saturated channel makes `emit` wait, so slow consumers slow the jobs
/// down instead of blocking runtime workers.
#[derive(Debug, Clone)]
pub struct OutputSink {
    tx: mpsc::Sender<Entry>,
}

/// The writer thread behind an [`OutputSink`].
#[derive(Debug)]
pub struct SinkWriter {
    handle: thread::JoinHandle<()>,
}

impl SinkWriter {
    /// Wait until every sink handle is dropped and all queued lines are written.
    pub fn finish(self) {
        let _ = self.handle.join();
    }
}

impl OutputSink {
    /// Open (or create) `path` for appending and start the writer thread.
    /// `None` means console only.
    pub fn open(path: Option<&Path>) -> Result<(OutputSink, SinkWriter), Error> {
        let file = match path {
            Some(path) => Some(open_append(path)?),
            None => None,
        };
        let (tx, rx) = mpsc::channel(BACKLOG);
        let handle = thread::spawn(move || write_loop(rx, file));
        Ok((OutputSink { tx }, SinkWriter { handle }))
    }

    /// Queue `line` for stdout and, when `persist` holds, for the output file.
    pub async fn emit(&self, line: &str, persist: bool) {
        let _ = self.tx.send(Entry { line: line.to_string(), persist }).await;
    }
}

fn open_append(path: &Path) -> Result<File, Error> {
    let mut opts = OpenOptions::new();
    opts.append(true).create(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o644);
    }
    opts.open(path).map_err(|source| Error::Output { path: path.to_path_buf(), source })
}

fn write_loop(mut rx: mpsc::Receiver<Entry>, mut file: Option<File>) {
    while let Some(entry) = rx.blocking_recv() {
        let _ = writeln!(io::stdout().lock(), "{}", entry.line);
        if !entry.persist {
            continue;
        }
        if let Some(f) = file.as_mut() {
            let mut record = entry.line;
            record.push('\n');
            if let Err(e) = f.write_all(record.as_bytes()) {
                debug!(error = %e, "error writing to output file");
            }
        }
    }
}
