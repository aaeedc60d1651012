//! Subject catalog: maps subject names to the numeric ids used by the engine.

use pyo3::prelude::*;
use rustc_hash::FxHashMap;

use crate::models::SubjectId;

pub const MATHEMATICS: SubjectId = 1;
pub const PHYSICS: SubjectId = 2;
pub const INFORMATICS: SubjectId = 3;

/// Case-insensitive subject name lookup. Built once, read-only afterwards.
#[pyclass]
#[derive(Clone, Debug)]
pub struct SubjectCatalog {
    by_name: FxHashMap<String, SubjectId>,
}

impl SubjectCatalog {
    /// Build from `(name, id)` pairs. A later pair with the same name wins.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, SubjectId)>,
        S: AsRef<str>,
    {
        let by_name = pairs
            .into_iter()
            .map(|(name, id)| (normalize(name.as_ref()), id))
            .filter(|(name, _)| !name.is_empty())
            .collect();
        Self { by_name }
    }

    /// Resolve a subject given either by name or by numeric id.
    pub fn resolve(&self, token: &str) -> Option<SubjectId> {
        let token = token.trim();
        if let Ok(id) = token.parse::<SubjectId>() {
            return Some(id);
        }
        self.by_name.get(&normalize(token)).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl Default for SubjectCatalog {
    fn default() -> Self {
        Self::from_pairs([
            ("mathematics", MATHEMATICS),
            ("physics", PHYSICS),
            ("informatics", INFORMATICS),
        ])
    }
}

#[pymethods]
impl SubjectCatalog {
    #[new]
    #[pyo3(signature = (pairs=None))]
    fn py_new(pairs: Option<Vec<(String, SubjectId)>>) -> Self {
        match pairs {
            Some(pairs) => Self::from_pairs(pairs),
            None => Self::default(),
        }
    }

    #[pyo3(name = "resolve")]
    fn py_resolve(&self, token: &str) -> Option<SubjectId> {
        self.resolve(token)
    }

    fn __len__(&self) -> usize {
        self.len()
    }

    fn __repr__(&self) -> String {
        let mut entries: Vec<(&String, &SubjectId)> = self.by_name.iter().collect();
        entries.sort_by_key(|(_, id)| **id);
        let body: Vec<String> = entries
            .into_iter()
            .map(|(name, id)| format!("{}={}", name, id))
            .collect();
        format!("SubjectCatalog({})", body.join(", "))
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = SubjectCatalog::default();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.resolve("Mathematics"), Some(MATHEMATICS));
        assert_eq!(catalog.resolve("  PHYSICS "), Some(PHYSICS));
        assert_eq!(catalog.resolve("informatics"), Some(INFORMATICS));
        assert_eq!(catalog.resolve("chemistry"), None);
    }

    #[test]
    fn test_numeric_tokens_pass_through() {
        let catalog = SubjectCatalog::default();
        assert_eq!(catalog.resolve("7"), Some(7));
    }

    #[test]
    fn test_custom_pairs() {
        let catalog = SubjectCatalog::from_pairs([("Chemistry", 4), ("", 9), ("chemistry", 5)]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.resolve("CHEMISTRY"), Some(5));
        assert!(catalog.resolve("mathematics").is_none());
    }
}
