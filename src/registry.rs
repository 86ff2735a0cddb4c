//! Marker registry.
//!
//! Records are keyed by [`MarkerId`], allocated from a counter that never goes
//! back, so deleting by id can only ever touch the marker the id was made for.

use std::collections::BTreeMap;

use crate::model::{MarkerId, MarkerRecord};

#[derive(Debug, Default)]
pub struct MarkerRegistry {
    records: BTreeMap<MarkerId, MarkerRecord>,
    next_id: u64,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a fresh id.
    pub fn allocate_id(&mut self) -> MarkerId {
        self.next_id += 1;
        MarkerId::new(self.next_id)
    }

    /// Store a record, replacing any record with the same id.
    pub fn insert(&mut self, record: MarkerRecord) -> Option<MarkerRecord> {
        self.records.insert(record.id, record)
    }

    pub fn remove(&mut self, id: MarkerId) -> Option<MarkerRecord> {
        self.records.remove(&id)
    }

    pub fn get(&self, id: MarkerId) -> Option<&MarkerRecord> {
        self.records.get(&id)
    }

    pub fn contains(&self, id: MarkerId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ids in creation order.
    pub fn ids(&self) -> impl Iterator<Item = MarkerId> + '_ {
        self.records.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarkerRecord> {
        self.records.values()
    }

    /// Remove and return every record.
    pub fn drain(&mut self) -> Vec<MarkerRecord> {
        std::mem::take(&mut self.records).into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::OverlayHandle;
    use crate::model::{Coordinates, LocationDraft, LocationType};

    fn record(registry: &mut MarkerRegistry, name: &str) -> MarkerRecord {
        let id = registry.allocate_id();
        let draft = LocationDraft::new(name, LocationType::Home, Coordinates::new(0.0, 0.0));
        MarkerRecord::new(id, draft, OverlayHandle(id.get()))
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut registry = MarkerRegistry::new();
        let a = registry.allocate_id();
        let b = registry.allocate_id();
        assert_ne!(a, b);

        let rec = record(&mut registry, "c");
        let c = rec.id;
        registry.insert(rec);
        registry.remove(c);
        assert_ne!(registry.allocate_id(), c);
    }

    #[test]
    fn test_remove_only_touches_one_record() {
        let mut registry = MarkerRegistry::new();
        let ids: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|name| {
                let rec = record(&mut registry, name);
                let id = rec.id;
                registry.insert(rec);
                id
            })
            .collect();

        let removed = registry.remove(ids[1]).unwrap();
        assert_eq!(removed.draft.name, "b");
        assert!(registry.remove(ids[1]).is_none());
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![ids[0], ids[2]]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_drain() {
        let mut registry = MarkerRegistry::new();
        let rec = record(&mut registry, "a");
        registry.insert(rec);

        assert_eq!(registry.drain().len(), 1);
        assert!(registry.is_empty());
    }
}
