use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use cardnorm_core::{
    AnalysisStatus, CardFeatureOverride, CardRepo, CardStore, FeatureOverrideRepo,
    NormalizedCard, RawRecord, RawRecordRepo, RulePattern, RulePatternRepo,
};
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Inner {
    raw: BTreeMap<i64, RawRecord>,
    next_id: i64,
    cards: HashMap<String, NormalizedCard>,
    rules: Vec<RulePattern>,
    overrides: HashMap<String, CardFeatureOverride>,
    rejected_codes: HashSet<String>,
}

/// In-process store. Every operation holds one lock, so `commit_done` is
/// atomic with respect to every other call.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_rule(&self, rule: RulePattern) {
        self.inner.lock().await.rules.push(rule);
    }

    pub async fn add_override(&self, o: CardFeatureOverride) {
        self.inner
            .lock()
            .await
            .overrides
            .insert(o.pronunciation.clone(), o);
    }

    pub async fn raw_record(&self, id: i64) -> Option<RawRecord> {
        self.inner.lock().await.raw.get(&id).cloned()
    }

    /// Make every later `commit_done` for `code` fail, as a broken database
    /// would.
    pub async fn reject_commits_for(&self, code: &str) {
        self.inner
            .lock()
            .await
            .rejected_codes
            .insert(code.to_string());
    }
}

fn reset(record: &mut RawRecord) {
    record.status = AnalysisStatus::Pending;
    record.last_analyzed_at = None;
    record.analysis_error = None;
}

#[async_trait]
impl RawRecordRepo for MemoryStore {
    async fn insert_raw(&self, record: &RawRecord) -> anyhow::Result<i64> {
        let mut inner = self.inner.lock().await;
        let duplicate = inner
            .raw
            .values()
            .any(|r| r.card_number == record.card_number && r.product_id == record.product_id);
        if duplicate {
            anyhow::bail!(
                "raw record already exists: {} (product {:?})",
                record.card_number,
                record.product_id
            );
        }
        inner.next_id += 1;
        let id = inner.next_id;
        let mut stored = record.clone();
        stored.id = id;
        inner.raw.insert(id, stored);
        Ok(id)
    }

    async fn list_pending(
        &self,
        after_id: i64,
        limit: Option<u64>,
    ) -> anyhow::Result<Vec<RawRecord>> {
        let inner = self.inner.lock().await;
        let pending = inner
            .raw
            .range(after_id.saturating_add(1)..)
            .map(|(_, r)| r)
            .filter(|r| r.status == AnalysisStatus::Pending)
            .cloned();
        Ok(match limit {
            Some(n) => pending.take(usize::try_from(n).unwrap_or(usize::MAX)).collect(),
            None => pending.collect(),
        })
    }

    async fn find_by_card_number(&self, card_number: &str) -> anyhow::Result<Vec<RawRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .raw
            .values()
            .filter(|r| r.card_number == card_number)
            .cloned()
            .collect())
    }

    async fn mark_errored(&self, id: i64, note: &str, at: DateTime<Utc>) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().await;
        let record = inner
            .raw
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("raw record not found: {id}"))?;
        record.status = AnalysisStatus::Errored;
        record.last_analyzed_at = Some(at);
        record.analysis_error = Some(note.to_string());
        Ok(())
    }

    async fn reset_to_pending(&self, card_number: &str) -> anyhow::Result<u64> {
        let mut inner = self.inner.lock().await;
        let mut count = 0;
        for record in inner
            .raw
            .values_mut()
            .filter(|r| r.card_number == card_number)
        {
            reset(record);
            count += 1;
        }
        Ok(count)
    }

    async fn reset_all(&self) -> anyhow::Result<u64> {
        let mut inner = self.inner.lock().await;
        let mut count = 0;
        for record in inner.raw.values_mut() {
            reset(record);
            count += 1;
        }
        Ok(count)
    }
}

#[async_trait]
impl CardRepo for MemoryStore {
    async fn upsert_card(&self, card: &NormalizedCard) -> anyhow::Result<()> {
        self.inner
            .lock()
            .await
            .cards
            .insert(card.code.clone(), card.clone());
        Ok(())
    }

    async fn find_card_by_code(&self, code: &str) -> anyhow::Result<Option<NormalizedCard>> {
        Ok(self.inner.lock().await.cards.get(code).cloned())
    }

    async fn count_cards(&self) -> anyhow::Result<u64> {
        Ok(self.inner.lock().await.cards.len() as u64)
    }
}

#[async_trait]
impl RulePatternRepo for MemoryStore {
    async fn list_active_rules(&self) -> anyhow::Result<Vec<RulePattern>> {
        let inner = self.inner.lock().await;
        let mut rules: Vec<RulePattern> =
            inner.rules.iter().filter(|r| r.is_active).cloned().collect();
        rules.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rules)
    }
}

#[async_trait]
impl FeatureOverrideRepo for MemoryStore {
    async fn find_override(
        &self,
        pronunciation: &str,
    ) -> anyhow::Result<Option<CardFeatureOverride>> {
        Ok(self.inner.lock().await.overrides.get(pronunciation).cloned())
    }

    async fn list_overrides(&self) -> anyhow::Result<Vec<CardFeatureOverride>> {
        Ok(self.inner.lock().await.overrides.values().cloned().collect())
    }
}

#[async_trait]
impl CardStore for MemoryStore {
    async fn commit_done(
        &self,
        record_id: i64,
        card: &NormalizedCard,
        at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.rejected_codes.contains(&card.code) {
            anyhow::bail!("commit rejected for card {}", card.code);
        }
        let record = inner
            .raw
            .get_mut(&record_id)
            .ok_or_else(|| anyhow::anyhow!("raw record not found: {record_id}"))?;
        record.status = AnalysisStatus::Done;
        record.last_analyzed_at = Some(at);
        record.analysis_error = None;
        inner.cards.insert(card.code.clone(), card.clone());
        Ok(())
    }
}
