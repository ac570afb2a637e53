use crate::path_set::PathSet;
use regex::Regex;

#[derive(Debug)]
enum Pattern {
    Literal(String),
    Wildcard(Regex),
}

/// Restricts status results to the paths a caller asked about.
///
/// A filter without `*` matches one path exactly. With `*`, each `*` stands
/// for any run of characters (slashes included) and everything else is taken
/// literally, matched against the whole path.
#[derive(Debug, Default)]
pub struct PathFilter {
    patterns: Vec<Pattern>,
}

impl PathFilter {
    pub fn new<S: AsRef<str>>(filters: &[S]) -> Self {
        let patterns = filters
            .iter()
            .map(|filter| filter.as_ref())
            .filter(|filter| !filter.is_empty())
            .filter_map(|filter| {
                if !filter.contains('*') {
                    return Some(Pattern::Literal(filter.to_string()));
                }

                match wildcard_regex(filter) {
                    Ok(regex) => Some(Pattern::Wildcard(regex)),
                    Err(e) => {
                        log::warn!("Skipping filter {:?}: {}", filter, e);
                        None
                    }
                }
            })
            .collect();

        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn matches(&self, path: &str) -> bool {
        self.is_empty()
            || self.patterns.iter().any(|pattern| match pattern {
                Pattern::Literal(literal) => literal == path,
                Pattern::Wildcard(regex) => regex.is_match(path),
            })
    }

    pub fn apply(&self, set: &mut PathSet) {
        if !self.is_empty() {
            set.retain(|path| self.matches(path));
        }
    }
}

fn wildcard_regex(filter: &str) -> Result<Regex, regex::Error> {
    let body = filter
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    Regex::new(&format!("^{body}$"))
}
