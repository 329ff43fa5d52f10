use std::collections::BTreeMap;

use crate::entry::{Entry, Kind};
use crate::error::StoreError;
use crate::store::EntryStore;

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<(Kind, String), Entry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        let mut store = Self::new();
        for entry in entries {
            store.insert(entry);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn insert(&mut self, entry: Entry) -> Option<Entry> {
        self.entries
            .insert((entry.kind, entry.identifier.clone()), entry)
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }
}

impl EntryStore for MemoryStore {
    fn get(&self, kind: Kind, identifier: &str) -> Result<Option<Entry>, StoreError> {
        Ok(self.entries.get(&(kind, identifier.to_string())).cloned())
    }

    fn upsert(&mut self, entry: Entry) -> Result<Option<Entry>, StoreError> {
        Ok(self.insert(entry))
    }

    fn remove(&mut self, kind: Kind, identifier: &str) -> Result<Option<Entry>, StoreError> {
        Ok(self.entries.remove(&(kind, identifier.to_string())))
    }

    fn list(&self, kind: Kind) -> Result<Vec<Entry>, StoreError> {
        Ok(self
            .entries
            .values()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::Flag;

    fn store() -> MemoryStore {
        MemoryStore::with_entries([
            Entry::email("fraud@example.com", Flag::Blocked, "chargeback").unwrap(),
            Entry::email("ann@example.com", Flag::Verified, "").unwrap(),
            Entry::app_user_id("u-1", Flag::Review, "new account").unwrap(),
        ])
    }

    #[test]
    fn lookup_normalizes_email() {
        let store = store();
        let hit = store.lookup(Kind::Email, " FRAUD@example.com").unwrap();
        assert_eq!(hit.unwrap().flag, Flag::Blocked);
    }

    #[test]
    fn lookup_is_kind_scoped() {
        let store = store();
        assert!(store.lookup(Kind::AppUserId, "fraud@example.com").unwrap().is_none());
    }

    #[test]
    fn blank_lookup_misses() {
        let store = store();
        assert!(store.lookup(Kind::AppUserId, "").unwrap().is_none());
        assert!(store.lookup(Kind::Email, "not-an-email").unwrap().is_none());
    }

    #[test]
    fn upsert_last_write_wins() {
        let mut store = store();
        let previous = store
            .upsert(Entry::app_user_id("u-1", Flag::Verified, "cleared").unwrap())
            .unwrap();
        assert_eq!(previous.unwrap().flag, Flag::Review);
        let now = store.get(Kind::AppUserId, "u-1").unwrap().unwrap();
        assert_eq!(now.flag, Flag::Verified);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn list_sorted_by_identifier() {
        let store = store();
        let emails: Vec<String> = store
            .list(Kind::Email)
            .unwrap()
            .into_iter()
            .map(|e| e.identifier)
            .collect();
        assert_eq!(emails, vec!["ann@example.com", "fraud@example.com"]);
    }

    #[test]
    fn remove_returns_entry() {
        let mut store = store();
        assert!(store.remove(Kind::Email, "ann@example.com").unwrap().is_some());
        assert!(store.remove(Kind::Email, "ann@example.com").unwrap().is_none());
    }
}
