use indexmap::IndexMap;

use crate::domain::{BusinessRecord, DedupKey};

/// Every unique business seen during a run, in first-seen order.
///
/// Records are only ever added. A record whose `(name, region)` is already
/// present is counted as a duplicate and dropped.
#[derive(Debug, Default)]
pub struct ResultSet {
    records: IndexMap<DedupKey, BusinessRecord>,
    duplicates: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,
    pub duplicates: usize,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the record was new.
    pub fn insert(&mut self, record: BusinessRecord) -> bool {
        let key = record.dedup_key();
        match self.records.contains_key(&key) {
            true => {
                self.duplicates += 1;
                false
            }
            false => {
                self.records.insert(key, record);
                true
            }
        }
    }

    pub fn merge(&mut self, records: impl IntoIterator<Item = BusinessRecord>) -> MergeStats {
        let mut stats = MergeStats::default();
        for record in records {
            match self.insert(record) {
                true => stats.added += 1,
                false => stats.duplicates += 1,
            }
        }
        stats
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn duplicate_count(&self) -> usize {
        self.duplicates
    }

    pub fn records(&self) -> impl Iterator<Item = &BusinessRecord> {
        self.records.values()
    }

    pub fn into_records(self) -> Vec<BusinessRecord> {
        self.records.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::{MergeStats, ResultSet};
    use crate::domain::BusinessRecord;

    fn record(name: &str, region: &str, phone: Option<&str>) -> BusinessRecord {
        BusinessRecord {
            name: name.to_string(),
            website: None,
            phone: phone.map(|p| p.to_string()),
            region: region.to_string(),
        }
    }

    #[test]
    fn first_record_for_a_key_is_kept() {
        let mut set = ResultSet::new();

        assert!(set.insert(record("Acme", "Leeds", Some("1"))));
        assert!(!set.insert(record("Acme", "Leeds", Some("2"))));
        assert!(set.insert(record("Acme", "York", None)));

        let records = set.into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].phone.as_deref(), Some("1"));
        assert_eq!(records[1].region, "York");
    }

    #[test]
    fn merge_reports_added_and_duplicates() {
        let mut set = ResultSet::new();
        set.merge(vec![record("A", "Aville", None)]);

        let stats = set.merge(vec![
            record("A", "Aville", None),
            record("B", "Aville", None),
            record("B", "Aville", None),
        ]);

        assert_eq!(
            stats,
            MergeStats {
                added: 1,
                duplicates: 2
            }
        );
        assert_eq!(set.len(), 2);
        assert_eq!(set.duplicate_count(), 2);
    }

    proptest! {
        #[test]
        fn one_record_per_key(
            pairs in prop::collection::vec((0u8..6, 0u8..3), 0..60)
        ) {
            let records: Vec<BusinessRecord> = pairs
                .iter()
                .map(|(n, r)| record(&format!("name-{}", n), &format!("region-{}", r), None))
                .collect();
            let total = records.len();

            let mut set = ResultSet::new();
            set.merge(records);

            let distinct: HashSet<(u8, u8)> = pairs.iter().cloned().collect();
            prop_assert_eq!(set.len(), distinct.len());
            prop_assert_eq!(set.duplicate_count(), total - set.len());

            let keys: HashSet<_> = set.records().map(|r| r.dedup_key()).collect();
            prop_assert_eq!(keys.len(), set.len());
        }
    }
}
