use chrono::{DateTime, Utc};
use hashbrown::HashMap;

use crate::{
    location::{LocationRecord, ValidatedLocation},
    types::Identifier,
};

/// Length and latest record of one history, read together.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StreamHead {
    pub length: usize,
    pub latest: Option<LocationRecord>,
}

#[derive(Debug, Default)]
pub struct LocationStore {
    histories: HashMap<Identifier, Vec<LocationRecord>>,
    order: Vec<Identifier>,
    total: usize,
}

impl LocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, location: ValidatedLocation) -> LocationRecord {
        self.append_at(location, Utc::now())
    }

    pub fn append_at(
        &mut self,
        location: ValidatedLocation,
        received_at: DateTime<Utc>,
    ) -> LocationRecord {
        let record = LocationRecord::from_validated(location, received_at);

        if !self.histories.contains_key(&record.identifier) {
            self.order.push(record.identifier.clone());
        }
        self.histories
            .entry(record.identifier.clone())
            .or_default()
            .push(record.clone());
        self.total += 1;
        record
    }

    pub fn latest(&self, identifier: &str) -> Option<&LocationRecord> {
        self.histories.get(identifier).and_then(|h| h.last())
    }

    pub fn latest_cloned(&self, identifier: &str) -> Option<LocationRecord> {
        self.latest(identifier).cloned()
    }

    /// Latest record of every identifier, in first-seen order.
    pub fn latest_all(&self) -> Vec<&LocationRecord> {
        self.order
            .iter()
            .filter_map(|id| self.latest(id))
            .collect()
    }

    pub fn latest_all_cloned(&self) -> Vec<LocationRecord> {
        self.latest_all().into_iter().cloned().collect()
    }

    pub fn history(&self, identifier: &str) -> Option<&[LocationRecord]> {
        self.histories
            .get(identifier)
            .map(Vec::as_slice)
            .filter(|h| !h.is_empty())
    }

    pub fn history_cloned(&self, identifier: &str) -> Option<Vec<LocationRecord>> {
        self.history(identifier).map(<[LocationRecord]>::to_vec)
    }

    pub fn length(&self, identifier: &str) -> usize {
        self.histories.get(identifier).map_or(0, Vec::len)
    }

    pub fn head(&self, identifier: &str) -> StreamHead {
        StreamHead {
            length: self.length(identifier),
            latest: self.latest_cloned(identifier),
        }
    }

    pub fn identifiers(&self) -> &[Identifier] {
        &self.order
    }

    pub fn total_records(&self) -> usize {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::types::Coordinates;

    fn loc(id: &str, lat: f64) -> ValidatedLocation {
        ValidatedLocation {
            identifier: id.to_string(),
            coordinates: Coordinates::new(lat, -43.2),
            reported_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn append_then_latest_returns_the_stored_record() {
        let mut store = LocationStore::new();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 5).unwrap();
        let rec = store.append_at(loc("u1", -22.9), at);

        assert_eq!(rec.received_at, at);
        assert_eq!(store.latest("u1"), Some(&rec));
        assert_eq!(store.length("u1"), 1);
    }

    #[test]
    fn unknown_identifier_is_absent() {
        let store = LocationStore::new();
        assert!(store.latest("nobody").is_none());
        assert!(store.history("nobody").is_none());
        assert_eq!(store.length("nobody"), 0);
        assert_eq!(store.head("nobody"), StreamHead::default());
    }

    #[test]
    fn latest_all_follows_first_seen_order() {
        let mut store = LocationStore::new();
        store.append(loc("b", 1.0));
        store.append(loc("a", 2.0));
        let b2 = store.append(loc("b", 3.0));
        let a = store.latest_cloned("a").unwrap();

        assert_eq!(store.latest_all_cloned(), vec![b2, a]);
        assert_eq!(store.identifiers(), ["b".to_string(), "a".to_string()]);
        assert_eq!(store.total_records(), 3);
    }

    #[test]
    fn head_pairs_length_with_latest() {
        let mut store = LocationStore::new();
        store.append(loc("u1", 1.0));
        let last = store.append(loc("u1", 2.0));

        let head = store.head("u1");
        assert_eq!(head.length, 2);
        assert_eq!(head.latest, Some(last));
    }
}
