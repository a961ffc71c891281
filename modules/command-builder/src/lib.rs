//! Expands technology records into shell commands.
//!
//! Two strategies exist. [`AggregateTags`] renders every surviving tag of a
//! record into one command; [`PerTagPath`] renders one command per tag and can
//! swap a tag for a wordlist path. Each strategy also decides which output
//! lines are worth persisting.
//!
//! Substituted values are not shell-escaped. Tag names come from detector
//! output, so a crafted technology name reaches `sh -c` as-is.

mod aggregate;
mod per_tag;

pub use aggregate::AggregateTags;
pub use per_tag::{PerTagPath, DEFAULT_WORDLIST_DIR};

use std::path::PathBuf;
use vulntechx_core::JobSpec;

pub const PLACEHOLDER: &str = "{tech}";

/// Template marker that turns aggregate rendering into a nuclei `-tc` expression.
pub const EXPRESSION_MARKER: &str = "-tc";
/// Template marker that turns on wordlist path resolution in per-tag mode.
pub const PATH_MARKER: &str = "-path";

/// Replace every placeholder occurrence in `template` with `value`.
pub fn render(template: &str, value: &str) -> String {
    template.replace(PLACEHOLDER, value)
}

/// A command expansion strategy paired with its output persistence rule.
pub trait Expansion: Send + Sync {
    /// Build the jobs for one host from its normalised, filtered tags.
    /// `tags` is never empty.
    fn expand(&self, host: &str, tags: &[String]) -> Vec<JobSpec>;

    /// Whether a line of job output belongs in the output file.
    fn persists(&self, line: &str) -> bool;

    /// The `--process` announcement printed before `job` starts.
    fn announce(&self, tool: &str, job: &JobSpec) -> String {
        format!("Running {}: [echo \"{}\" | {}]", tool, job.host, job.command)
    }
}

/// Pick a strategy from the template alone: `-path` means one job per tag
/// with path resolution, anything else aggregates.
pub fn infer(template: &str, wordlist_dir: impl Into<PathBuf>) -> Box<dyn Expansion> {
    if template.contains(PATH_MARKER) {
        Box::new(PerTagPath::new(template, wordlist_dir))
    } else {
        Box::new(AggregateTags::new(template))
    }
}

/// Scanner result lines start with three bracketed fields, e.g.
/// `[cve-2021-1234] [http] [critical] https://host/`.
pub fn is_result_line(line: &str) -> bool {
    let mut fields = line.split_whitespace();
    (0..3).all(|_| fields.next().map_or(false, |f| f.starts_with('[')))
}
