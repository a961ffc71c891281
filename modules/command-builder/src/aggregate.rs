use crate::{is_result_line, render, Expansion, EXPRESSION_MARKER};
use vulntechx_core::JobSpec;

/// One command per record with all tags rendered together.
#[derive(Debug, Clone)]
pub struct AggregateTags {
    template: String,
    expression: bool,
}

impl AggregateTags {
    pub fn new(template: &str) -> Self {
        AggregateTags { template: template.to_string(), expression: template.contains(EXPRESSION_MARKER) }
    }

    /// The text that replaces the placeholder for these tags.
    pub fn substitution(&self, tags: &[String]) -> String {
        if self.expression {
            let clauses: Vec<String> = tags
                .iter()
                .map(|t| format!("contains(to_lower(name),'{}')", t.to_lowercase()))
                .collect();
            format!("\"{}\"", clauses.join(" || "))
        } else {
            tags.join(",").to_lowercase()
        }
    }
}

impl Expansion for AggregateTags {
    fn expand(&self, host: &str, tags: &[String]) -> Vec<JobSpec> {
        vec![JobSpec {
            host: host.to_string(),
            tech: tags.join(","),
            command: render(&self.template, &self.substitution(tags)),
        }]
    }

    fn persists(&self, line: &str) -> bool {
        is_result_line(line)
    }
}
