//! Technology lists, tag normalisation and the include/exclude policy.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use tracing::debug;
use vulntechx_core::Error;

pub type TechSet = BTreeSet<String>;

/// Resolve an include/exclude argument into a set of lowercase names.
///
/// The argument is read as a newline-delimited file when a path with that
/// name exists, and as a comma-separated list otherwise. Empty list segments
/// stay in the set: they never match a normalised tag, but they keep an
/// explicit `-i ","` from widening to every technology.
pub fn load_tech_list(input: &str) -> io::Result<TechSet> {
    if input.is_empty() {
        return Ok(TechSet::new());
    }
    if fs::metadata(input).is_ok() {
        let reader = BufReader::new(File::open(input)?);
        let mut techs = TechSet::new();
        for line in reader.lines() {
            let line = line?;
            let t = line.trim();
            if !t.is_empty() {
                techs.insert(t.to_lowercase());
            }
        }
        return Ok(techs);
    }
    Ok(input.split(',').map(|s| s.trim().to_lowercase()).collect())
}

/// Reduce a raw `name:version` tag to its bare lowercase name.
///
/// Returns `None` for names that are empty or contain whitespace.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let name = raw.split_once(':').map_or(raw, |(name, _)| name).trim();
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return None;
    }
    Some(name.to_lowercase())
}

/// Normalise every tag of a record, keeping record order.
pub fn normalize_tags(raw: &[String]) -> Vec<String> {
    raw.iter()
        .filter_map(|t| {
            let n = normalize_tag(t);
            if n.is_none() {
                debug!(tag = %t, "ignoring unparsable tech name");
            }
            n
        })
        .collect()
}

/// Which technologies survive filtering. Include and exclude never coexist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TechPolicy {
    #[default]
    All,
    Include(TechSet),
    Exclude(TechSet),
}

impl TechPolicy {
    /// Build a policy from already loaded sets. Both non-empty is a config error.
    pub fn from_sets(include: TechSet, exclude: TechSet) -> Result<Self, Error> {
        match (include.is_empty(), exclude.is_empty()) {
            (false, false) => Err(Error::conflicting_filters()),
            (false, true) => Ok(TechPolicy::Include(include)),
            (true, false) => Ok(TechPolicy::Exclude(exclude)),
            (true, true) => Ok(TechPolicy::All),
        }
    }

    /// Load both flag values and build the policy.
    pub fn from_specs(include: &str, exclude: &str) -> Result<Self, Error> {
        let exclude = load_tech_list(exclude)
            .map_err(|source| Error::TechList { flag: "exclude-tech", source })?;
        let include = load_tech_list(include)
            .map_err(|source| Error::TechList { flag: "include-tech", source })?;
        Self::from_sets(include, exclude)
    }

    pub fn allows(&self, tag: &str) -> bool {
        match self {
            TechPolicy::All => true,
            TechPolicy::Include(set) => set.contains(tag),
            TechPolicy::Exclude(set) => !set.contains(tag),
        }
    }

    /// Normalise and filter a record's raw tags in one pass.
    pub fn select(&self, raw: &[String]) -> Vec<String> {
        normalize_tags(raw).into_iter().filter(|t| self.allows(t)).collect()
    }
}
