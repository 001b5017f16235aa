use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::card::NormalizedCard;
use crate::record::RawRecord;
use crate::rule::{CardFeatureOverride, RulePattern};

#[async_trait]
pub trait RawRecordRepo: Send + Sync {
    /// Store a captured record and return its id. Used by ingestion and tests.
    async fn insert_raw(&self, record: &RawRecord) -> anyhow::Result<i64>;

    /// Pending records with an id greater than `after_id`, in id order, at
    /// most `limit` of them. Pass `0` to start from the beginning.
    async fn list_pending(
        &self,
        after_id: i64,
        limit: Option<u64>,
    ) -> anyhow::Result<Vec<RawRecord>>;

    /// Every record with this card number (one per product).
    async fn find_by_card_number(&self, card_number: &str) -> anyhow::Result<Vec<RawRecord>>;

    async fn mark_errored(&self, id: i64, note: &str, at: DateTime<Utc>) -> anyhow::Result<()>;

    /// Returns the number of records moved back to pending.
    async fn reset_to_pending(&self, card_number: &str) -> anyhow::Result<u64>;

    async fn reset_all(&self) -> anyhow::Result<u64>;
}

#[async_trait]
pub trait CardRepo: Send + Sync {
    async fn upsert_card(&self, card: &NormalizedCard) -> anyhow::Result<()>;

    async fn find_card_by_code(&self, code: &str) -> anyhow::Result<Option<NormalizedCard>>;

    async fn count_cards(&self) -> anyhow::Result<u64>;
}

#[async_trait]
pub trait RulePatternRepo: Send + Sync {
    async fn list_active_rules(&self) -> anyhow::Result<Vec<RulePattern>>;
}

#[async_trait]
pub trait FeatureOverrideRepo: Send + Sync {
    async fn find_override(&self, pronunciation: &str)
    -> anyhow::Result<Option<CardFeatureOverride>>;

    async fn list_overrides(&self) -> anyhow::Result<Vec<CardFeatureOverride>>;
}

/// Everything the analysis batch needs from storage.
#[async_trait]
pub trait CardStore: RawRecordRepo + CardRepo + RulePatternRepo + FeatureOverrideRepo {
    /// Upsert `card`, mark the record done and clear its note as one unit.
    /// Either all three happen or none do.
    async fn commit_done(
        &self,
        record_id: i64,
        card: &NormalizedCard,
        at: DateTime<Utc>,
    ) -> anyhow::Result<()>;
}
