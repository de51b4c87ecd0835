use crate::message::Arg;
use indexmap::IndexMap;
use tokio::time::Instant;

/// The latest arguments of one active status and when it first appeared.
#[derive(Debug, Clone)]
pub struct StatusEntry {
    pub args: Vec<Arg>,
    pub started: Instant,
}

/// Active statuses keyed by name, iterated in the order they were first added.
#[derive(Debug, Default)]
pub struct StatusRegistry {
    entries: IndexMap<String, StatusEntry>,
}

/// Whether [`StatusRegistry::upsert`] created a status or replaced the arguments
/// of an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

impl StatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `name` at the end, or replaces its arguments while keeping its
    /// position and start time.
    pub fn upsert(&mut self, name: &str, args: Vec<Arg>, now: Instant) -> Upsert {
        match self.entries.get_mut(name) {
            Some(entry) => {
                entry.args = args;
                Upsert::Updated
            }
            None => {
                self.entries
                    .insert(name.to_owned(), StatusEntry { args, started: now });
                Upsert::Inserted
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<StatusEntry> {
        self.entries.shift_remove(name)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, name: &str) -> Option<&StatusEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StatusEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::args;
    use std::time::Duration;

    #[test]
    fn keeps_insertion_order() {
        let now = Instant::now();
        let mut registry = StatusRegistry::new();
        registry.upsert("b", args!["B"], now);
        registry.upsert("a", args!["A"], now);
        registry.upsert("c", args!["C"], now);
        registry.upsert("b", args!["B2"], now);
        assert_eq!(registry.names().collect::<Vec<_>>(), ["b", "a", "c"]);
    }

    #[test]
    fn update_replaces_args_but_not_start() {
        let first = Instant::now();
        let later = first + Duration::from_secs(10);
        let mut registry = StatusRegistry::new();
        assert_eq!(registry.upsert("a", args!["one", "two"], first), Upsert::Inserted);
        assert_eq!(registry.upsert("a", args!["three"], later), Upsert::Updated);

        let entry = registry.get("a").unwrap();
        assert_eq!(entry.args, args!["three"]);
        assert_eq!(entry.started, first);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn removal_keeps_remaining_order() {
        let now = Instant::now();
        let mut registry = StatusRegistry::new();
        for name in ["a", "b", "c"] {
            registry.upsert(name, args![name], now);
        }
        assert!(registry.remove("b").is_some());
        assert!(registry.remove("b").is_none());
        assert!(!registry.contains("b"));
        assert_eq!(registry.names().collect::<Vec<_>>(), ["a", "c"]);

        registry.clear();
        assert!(registry.is_empty());
    }
}
