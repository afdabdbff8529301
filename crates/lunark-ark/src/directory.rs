//! In-memory entry directory with first-wins name lookup.

use std::hash::BuildHasherDefault;

use hashbrown::HashMap;
use rustc_hash::FxHasher;

use crate::ArkEntry;

type FxHashMap<K, V> = HashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Ordered entries plus a name index.
///
/// Names are not guaranteed unique on disk. The index keeps the first entry
/// for each name, so later duplicates are reachable by position only.
#[derive(Debug, Clone, Default)]
pub struct ArkDirectory {
    entries: Vec<ArkEntry>,
    by_name: FxHashMap<String, usize>,
    duplicates: usize,
}

impl ArkDirectory {
    /// Build a directory from entries in on-disk order.
    pub fn new(entries: Vec<ArkEntry>) -> Self {
        let mut by_name = FxHashMap::with_capacity_and_hasher(entries.len(), Default::default());
        let mut duplicates = 0;

        for (i, entry) in entries.iter().enumerate() {
            match by_name.entry(entry.name().to_string()) {
                hashbrown::hash_map::Entry::Vacant(slot) => {
                    slot.insert(i);
                }
                hashbrown::hash_map::Entry::Occupied(first) => {
                    duplicates += 1;
                    tracing::debug!(
                        name = entry.name(),
                        index = i,
                        first = *first.get(),
                        "duplicate entry name shadowed by earlier entry"
                    );
                }
            }
        }

        Self {
            entries,
            by_name,
            duplicates,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in on-disk order.
    #[inline]
    pub fn entries(&self) -> &[ArkEntry] {
        &self.entries
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, ArkEntry> {
        self.entries.iter()
    }

    /// Look up an entry by exact name. Duplicates resolve to the first one.
    pub fn get(&self, name: &str) -> Option<&ArkEntry> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    /// Get entry by index.
    #[inline]
    pub fn get_index(&self, index: usize) -> Option<&ArkEntry> {
        self.entries.get(index)
    }

    /// Find an entry by name (case-insensitive, `\` treated as `/`).
    pub fn find(&self, name: &str) -> Option<&ArkEntry> {
        if let Some(entry) = self.get(name) {
            return Some(entry);
        }
        let normalized = name.replace('\\', "/");
        self.entries
            .iter()
            .find(|e| e.name().eq_ignore_ascii_case(&normalized))
    }

    /// Names in on-disk order, duplicates included.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(ArkEntry::name).collect()
    }

    /// Number of entries shadowed by an earlier entry of the same name.
    #[inline]
    pub fn duplicate_count(&self) -> usize {
        self.duplicates
    }
}

impl<'a> IntoIterator for &'a ArkDirectory {
    type Item = &'a ArkEntry;
    type IntoIter = std::slice::Iter<'a, ArkEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lunark_common::{LegacyString, TextEncoding};

    fn entry(index: usize, name: &str, priority: u32) -> ArkEntry {
        ArkEntry::new(
            index,
            LegacyString::decode(name.as_bytes(), TextEncoding::Ascii),
            LegacyString::decode(b"", TextEncoding::Ascii),
            0,
            0,
            0,
            0,
            0,
            [0; 16],
            priority,
        )
    }

    #[test]
    fn test_first_wins() {
        let dir = ArkDirectory::new(vec![
            entry(0, "a.xml", 1),
            entry(1, "b.xml", 2),
            entry(2, "a.xml", 3),
        ]);

        assert_eq!(dir.len(), 3);
        assert_eq!(dir.duplicate_count(), 1);
        assert_eq!(dir.names(), vec!["a.xml", "b.xml", "a.xml"]);
        for _ in 0..3 {
            assert_eq!(dir.get("a.xml").unwrap().priority(), 1);
        }
        assert_eq!(dir.get_index(2).unwrap().priority(), 3);
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let dir = ArkDirectory::new(vec![entry(0, "Ponies.XML", 0)]);
        assert!(dir.get("ponies.xml").is_none());
        assert_eq!(dir.find("ponies.xml").unwrap().index(), 0);
        assert!(dir.find("missing.xml").is_none());
    }
}
