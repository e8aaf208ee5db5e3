//! In-memory store implementations for tests and dev mode.
//!
//! Each write method takes one write lock for its whole mutation, which is
//! what gives the pipelines their one-commit-per-phase semantics here.
//! Readers always see the last committed state, never a half-applied batch.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use pulsefit_analytics::{
    FeedbackStore, ForecastStore, LabelUpdate, ProfitStore, StoreError, WordFrequencyStore,
};
use pulsefit_core::{
    FeedbackId, FeedbackRecord, ForecastEntry, ProfitRecord, SentimentLabel, WordFrequencyEntry,
};

/// Feedback rows keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryFeedbackStore {
    rows: RwLock<HashMap<FeedbackId, FeedbackRecord>>,
}

impl InMemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Intake path: add a record (external writers own creation).
    pub fn insert(&self, record: FeedbackRecord) {
        self.rows.write().unwrap().insert(record.id, record);
    }

    pub fn len(&self) -> usize {
        self.rows.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().unwrap().is_empty()
    }

    pub fn get(&self, id: FeedbackId) -> Option<FeedbackRecord> {
        self.rows.read().unwrap().get(&id).cloned()
    }
}

impl FeedbackStore for InMemoryFeedbackStore {
    fn unresolved(&self) -> Result<Vec<FeedbackRecord>, StoreError> {
        let rows = self.rows.read().unwrap();
        let mut pending: Vec<FeedbackRecord> = rows
            .values()
            .filter(|r| r.sentiment == SentimentLabel::Unresolved)
            .cloned()
            .collect();
        // Stable processing order for deterministic runs.
        pending.sort_by_key(|r| (r.created_at, *r.id.as_uuid()));
        Ok(pending)
    }

    fn texts_by_label(&self, label: SentimentLabel) -> Result<Vec<String>, StoreError> {
        let rows = self.rows.read().unwrap();
        let mut matching: Vec<&FeedbackRecord> =
            rows.values().filter(|r| r.sentiment == label).collect();
        matching.sort_by_key(|r| (r.created_at, *r.id.as_uuid()));
        Ok(matching.iter().map(|r| r.raw_text.clone()).collect())
    }

    fn commit_labels(&self, updates: &[LabelUpdate]) -> Result<(), StoreError> {
        let mut rows = self.rows.write().unwrap();

        // Validate the whole batch before touching anything: one commit,
        // all-or-nothing.
        for update in updates {
            if !rows.contains_key(&update.id) {
                return Err(StoreError::storage(format!(
                    "unknown feedback id {}",
                    update.id
                )));
            }
        }
        for update in updates {
            if let Some(row) = rows.get_mut(&update.id) {
                row.sentiment = update.sentiment;
                row.confidence = update.confidence;
            }
        }
        Ok(())
    }
}

/// The word-frequency aggregate table.
#[derive(Debug, Default)]
pub struct InMemoryWordFrequencyStore {
    rows: RwLock<Vec<WordFrequencyEntry>>,
}

impl InMemoryWordFrequencyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl WordFrequencyStore for InMemoryWordFrequencyStore {
    fn all(&self) -> Result<Vec<WordFrequencyEntry>, StoreError> {
        Ok(self.rows.read().unwrap().clone())
    }

    fn replace_all(&self, entries: Vec<WordFrequencyEntry>) -> Result<(), StoreError> {
        // Swap under one write lock: truncate + insert as a single commit.
        *self.rows.write().unwrap() = entries;
        Ok(())
    }
}

/// Historical profit records (read-only for the pipelines; `insert` is the
/// external intake path).
#[derive(Debug, Default)]
pub struct InMemoryProfitStore {
    rows: RwLock<Vec<ProfitRecord>>,
}

impl InMemoryProfitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn insert(&self, record: ProfitRecord) {
        self.rows.write().unwrap().push(record);
    }
}

impl ProfitStore for InMemoryProfitStore {
    fn all_ordered(&self) -> Result<Vec<ProfitRecord>, StoreError> {
        let mut rows = self.rows.read().unwrap().clone();
        rows.sort_by_key(|r| r.period_start);
        Ok(rows)
    }
}

/// The forecast table.
#[derive(Debug, Default)]
pub struct InMemoryForecastStore {
    rows: RwLock<Vec<ForecastEntry>>,
}

impl InMemoryForecastStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl ForecastStore for InMemoryForecastStore {
    fn all(&self) -> Result<Vec<ForecastEntry>, StoreError> {
        Ok(self.rows.read().unwrap().clone())
    }

    fn replace_all(&self, entries: Vec<ForecastEntry>) -> Result<(), StoreError> {
        // Delete-all-then-insert as one swap; a reader either sees the old
        // generation or the new one, never an empty in-between.
        *self.rows.write().unwrap() = entries;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn commit_labels_is_all_or_nothing() {
        let store = InMemoryFeedbackStore::new();
        let record = FeedbackRecord::new("academia boa");
        let id = record.id;
        store.insert(record);

        let updates = vec![
            LabelUpdate {
                id,
                sentiment: SentimentLabel::Positive,
                confidence: 0.9,
            },
            LabelUpdate {
                id: FeedbackId::new(), // unknown
                sentiment: SentimentLabel::Negative,
                confidence: 0.8,
            },
        ];

        assert!(store.commit_labels(&updates).is_err());
        // the known row was not partially updated
        let row = store.get(id).unwrap();
        assert_eq!(row.sentiment, SentimentLabel::Unresolved);
    }

    #[test]
    fn unresolved_returns_only_pending_rows() {
        let store = InMemoryFeedbackStore::new();
        let a = FeedbackRecord::new("primeira");
        let a_id = a.id;
        store.insert(a);
        store.insert(FeedbackRecord::new("segunda"));

        store
            .commit_labels(&[LabelUpdate {
                id: a_id,
                sentiment: SentimentLabel::Positive,
                confidence: 0.8,
            }])
            .unwrap();

        let pending = store.unresolved().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].raw_text, "segunda");
        assert_eq!(
            store.texts_by_label(SentimentLabel::Positive).unwrap(),
            vec!["primeira".to_string()]
        );
    }

    #[test]
    fn replace_all_swaps_the_whole_generation() {
        let store = InMemoryForecastStore::new();
        let date = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let old = vec![ForecastEntry::new(date, 1.0, 0.0, 2.0, "v1", Utc::now())];
        store.replace_all(old).unwrap();

        let new_date = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        let new = vec![
            ForecastEntry::new(new_date, 2.0, 1.0, 3.0, "v2", Utc::now()),
            ForecastEntry::new(date, 3.0, 2.0, 4.0, "v2", Utc::now()),
        ];
        store.replace_all(new).unwrap();

        let rows = store.all().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.model_version == "v2"));
    }

    #[test]
    fn profits_come_back_ordered() {
        let store = InMemoryProfitStore::new();
        let record = |m: u32| ProfitRecord {
            period_start: NaiveDate::from_ymd_opt(2025, m, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2025, m, 28).unwrap(),
            total_revenue: 0.0,
            total_expenses: 0.0,
            net_profit: m as f64,
            profit_margin: 0.0,
        };
        store.insert(record(3));
        store.insert(record(1));
        store.insert(record(2));

        let months: Vec<u32> = store
            .all_ordered()
            .unwrap()
            .iter()
            .map(|r| r.net_profit as u32)
            .collect();
        assert_eq!(months, vec![1, 2, 3]);
    }
}
