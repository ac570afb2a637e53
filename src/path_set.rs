use std::collections::HashSet;

/// Set of repo-relative paths that remembers insertion order.
#[derive(Debug, Default, Clone)]
pub struct PathSet {
    order: Vec<String>,
    members: HashSet<String>,
}

impl PathSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the path was already present.
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        if self.members.contains(&path) {
            return false;
        }
        self.members.insert(path.clone());
        self.order.push(path);
        true
    }

    pub fn extend<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for path in paths {
            self.insert(path);
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.members.contains(path)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        let members = &mut self.members;
        self.order.retain(|path| {
            let kept = keep(path.as_str());
            if !kept {
                members.remove(path.as_str());
            }
            kept
        });
    }

    pub fn union(&self, other: &PathSet) -> PathSet {
        self.iter().chain(other.iter()).collect()
    }
}

impl PartialEq for PathSet {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for PathSet {}

impl<S: Into<String>> FromIterator<S> for PathSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = PathSet::new();
        set.extend(iter);
        set
    }
}

impl<'a> IntoIterator for &'a PathSet {
    type Item = &'a str;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, String>, fn(&String) -> &str>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter().map(String::as_str as fn(&String) -> &str)
    }
}
