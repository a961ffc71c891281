use crate::{render, Expansion, PATH_MARKER};
use std::path::{Path, PathBuf};
use tracing::debug;
use vulntechx_core::JobSpec;

pub const DEFAULT_WORDLIST_DIR: &str = "/root/wordlists";

/// One command per tag, optionally swapping the tag for a wordlist path.
#[derive(Debug, Clone)]
pub struct PerTagPath {
    template: String,
    resolve_paths: bool,
    wordlist_dir: PathBuf,
}

impl PerTagPath {
    pub fn new(template: &str, wordlist_dir: impl Into<PathBuf>) -> Self {
        PerTagPath {
            template: template.to_string(),
            resolve_paths: template.contains(PATH_MARKER),
            wordlist_dir: wordlist_dir.into(),
        }
    }

    /// Substitution value for a tag.
    ///
    /// Tried in order: the tag as a path, `<wordlist_dir>/<tag>`,
    /// `<wordlist_dir>/<tag>.txt`, then the bare tag.
    pub fn resolve(&self, tag: &str) -> String {
        if !self.resolve_paths {
            return tag.to_string();
        }
        if exists(Path::new(tag)) {
            debug!(tech = tag, path = tag, "using existing path for tech");
            return tag.to_string();
        }
        // Joined like a path segment even when the tag starts with `/`.
        let direct = self.wordlist_dir.join(tag.trim_start_matches('/'));
        let mut candidates = vec![direct.clone()];
        if !tag.to_lowercase().ends_with(".txt") {
            let mut with_ext = direct.into_os_string();
            with_ext.push(".txt");
            candidates.push(PathBuf::from(with_ext));
        }
        for c in candidates {
            if exists(&c) {
                debug!(tech = tag, path = %c.display(), "found wordlist path for tech");
                return c.to_string_lossy().into_owned();
            }
        }
        debug!(tech = tag, "no wordlist found, falling back to inline replacement");
        tag.to_string()
    }
}

fn exists(p: &Path) -> bool {
    !p.as_os_str().is_empty() && p.exists()
}

impl Expansion for PerTagPath {
    fn expand(&self, host: &str, tags: &[String]) -> Vec<JobSpec> {
        tags.iter()
            .map(|tag| JobSpec {
                host: host.to_string(),
                tech: tag.clone(),
                command: render(&self.template, &self.resolve(tag)),
            })
            .collect()
    }

    fn persists(&self, _line: &str) -> bool {
        true
    }

    fn announce(&self, tool: &str, job: &JobSpec) -> String {
        format!(
            "Running {} for host {} tech {}: [echo \"{}\" | {}]",
            tool, job.host, job.tech, job.host, job.command
        )
    }
}
