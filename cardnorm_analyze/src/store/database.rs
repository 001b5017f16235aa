//! `sea-orm` backed store for PostgreSQL or SQLite.

use async_trait::async_trait;
use cardnorm_core::{
    AnalysisStatus, CardFeatureOverride, CardRepo, CardStore, FeatureOverrideRepo,
    NormalizedCard, RawRecord, RawRecordRepo, RulePattern, RulePatternRepo,
};
use cardnorm_entities::{card_feature_overrides, cards, raw_cards, rule_patterns};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Schema, Set,
    TransactionTrait,
};
use tracing::{debug, info, warn};

use super::convert;

fn is_table_already_exists_error(err: &DbErr) -> bool {
    let text = err.to_string();
    text.contains("table") && text.contains("already exists")
}

pub struct DatabaseStore {
    db: DatabaseConnection,
}

impl DatabaseStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        Self::connect_with(ConnectOptions::new(database_url)).await
    }

    pub async fn connect_with(options: ConnectOptions) -> anyhow::Result<Self> {
        info!("Connecting to card database");
        let db = Database::connect(options).await?;
        let store = Self { db };
        store.ensure_schema().await?;
        info!("Card database ready");
        Ok(store)
    }

    #[must_use]
    pub const fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Create any missing tables.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        let backend = self.db.get_database_backend();
        let schema = Schema::new(backend);
        let statements = [
            schema.create_table_from_entity(raw_cards::Entity),
            schema.create_table_from_entity(cards::Entity),
            schema.create_table_from_entity(rule_patterns::Entity),
            schema.create_table_from_entity(card_feature_overrides::Entity),
        ];
        for stmt in &statements {
            match self
                .db
                .execute_unprepared(&backend.build(stmt).to_string())
                .await
            {
                Ok(_) => {}
                Err(e) if is_table_already_exists_error(&e) => {
                    debug!("Table already exists, skipping creation");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Store a curated rule. Rules are authored outside the analysis path;
    /// this is the ingestion hook for them.
    pub async fn insert_rule(&self, rule: &RulePattern) -> anyhow::Result<i64> {
        let inserted = rule_patterns::Entity::insert(convert::rule_to_active(rule)?)
            .exec(&self.db)
            .await?;
        Ok(inserted.last_insert_id)
    }

    pub async fn upsert_override(&self, o: &CardFeatureOverride) -> anyhow::Result<()> {
        let model = convert::override_to_active(o);
        if card_feature_overrides::Entity::find_by_id(o.pronunciation.clone())
            .one(&self.db)
            .await?
            .is_some()
        {
            model.update(&self.db).await?;
        } else {
            model.insert(&self.db).await?;
        }
        Ok(())
    }

    pub async fn count_by_status(&self, status: AnalysisStatus) -> anyhow::Result<u64> {
        Ok(raw_cards::Entity::find()
            .filter(raw_cards::Column::Status.eq(status.as_str()))
            .count(&self.db)
            .await?)
    }
}

async fn write_card<C: ConnectionTrait>(
    db: &C,
    card: &NormalizedCard,
    at: DateTime<Utc>,
) -> anyhow::Result<()> {
    let model = convert::card_to_active(card, at)?;
    if cards::Entity::find_by_id(card.code.clone())
        .one(db)
        .await?
        .is_some()
    {
        model.update(db).await?;
    } else {
        model.insert(db).await?;
    }
    Ok(())
}

fn reset_query() -> sea_orm::UpdateMany<raw_cards::Entity> {
    raw_cards::Entity::update_many()
        .col_expr(
            raw_cards::Column::Status,
            Expr::value(AnalysisStatus::Pending.as_str()),
        )
        .col_expr(
            raw_cards::Column::LastAnalyzedAt,
            Expr::value(Option::<DateTime<Utc>>::None),
        )
        .col_expr(
            raw_cards::Column::AnalysisError,
            Expr::value(Option::<String>::None),
        )
}

#[async_trait]
impl RawRecordRepo for DatabaseStore {
    async fn insert_raw(&self, record: &RawRecord) -> anyhow::Result<i64> {
        let duplicate = raw_cards::Entity::find()
            .filter(raw_cards::Column::CardNumber.eq(record.card_number.as_str()))
            .filter(match record.product_id {
                Some(p) => raw_cards::Column::ProductId.eq(p),
                None => raw_cards::Column::ProductId.is_null(),
            })
            .one(&self.db)
            .await?;
        if duplicate.is_some() {
            anyhow::bail!(
                "raw record already exists: {} (product {:?})",
                record.card_number,
                record.product_id
            );
        }
        let inserted = raw_cards::Entity::insert(convert::raw_record_to_active(record))
            .exec(&self.db)
            .await?;
        Ok(inserted.last_insert_id)
    }

    async fn list_pending(
        &self,
        after_id: i64,
        limit: Option<u64>,
    ) -> anyhow::Result<Vec<RawRecord>> {
        let models = raw_cards::Entity::find()
            .filter(raw_cards::Column::Status.eq(AnalysisStatus::Pending.as_str()))
            .filter(raw_cards::Column::Id.gt(after_id))
            .order_by_asc(raw_cards::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(models
            .into_iter()
            .map(convert::raw_record_from_model)
            .collect())
    }

    async fn find_by_card_number(&self, card_number: &str) -> anyhow::Result<Vec<RawRecord>> {
        let models = raw_cards::Entity::find()
            .filter(raw_cards::Column::CardNumber.eq(card_number))
            .order_by_asc(raw_cards::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models
            .into_iter()
            .map(convert::raw_record_from_model)
            .collect())
    }

    async fn mark_errored(&self, id: i64, note: &str, at: DateTime<Utc>) -> anyhow::Result<()> {
        raw_cards::ActiveModel {
            id: Set(id),
            status: Set(AnalysisStatus::Errored.as_str().to_string()),
            last_analyzed_at: Set(Some(at)),
            analysis_error: Set(Some(note.to_string())),
            ..Default::default()
        }
        .update(&self.db)
        .await?;
        Ok(())
    }

    async fn reset_to_pending(&self, card_number: &str) -> anyhow::Result<u64> {
        let result = reset_query()
            .filter(raw_cards::Column::CardNumber.eq(card_number))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn reset_all(&self) -> anyhow::Result<u64> {
        let result = reset_query().exec(&self.db).await?;
        Ok(result.rows_affected)
    }
}

#[async_trait]
impl CardRepo for DatabaseStore {
    async fn upsert_card(&self, card: &NormalizedCard) -> anyhow::Result<()> {
        write_card(&self.db, card, Utc::now()).await
    }

    async fn find_card_by_code(&self, code: &str) -> anyhow::Result<Option<NormalizedCard>> {
        cards::Entity::find_by_id(code.to_string())
            .one(&self.db)
            .await?
            .map(convert::card_from_model)
            .transpose()
    }

    async fn count_cards(&self) -> anyhow::Result<u64> {
        Ok(cards::Entity::find().count(&self.db).await?)
    }
}

#[async_trait]
impl RulePatternRepo for DatabaseStore {
    async fn list_active_rules(&self) -> anyhow::Result<Vec<RulePattern>> {
        let models = rule_patterns::Entity::find()
            .filter(rule_patterns::Column::IsActive.eq(true))
            .order_by_desc(rule_patterns::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models
            .into_iter()
            .filter_map(|m| {
                let id = m.id;
                convert::rule_from_model(m)
                    .inspect_err(|e| warn!("Skipping rule {id}: {e:#}"))
                    .ok()
            })
            .collect())
    }
}

#[async_trait]
impl FeatureOverrideRepo for DatabaseStore {
    async fn find_override(
        &self,
        pronunciation: &str,
    ) -> anyhow::Result<Option<CardFeatureOverride>> {
        Ok(
            card_feature_overrides::Entity::find_by_id(pronunciation.to_string())
                .one(&self.db)
                .await?
                .map(convert::override_from_model),
        )
    }

    async fn list_overrides(&self) -> anyhow::Result<Vec<CardFeatureOverride>> {
        let models = card_feature_overrides::Entity::find().all(&self.db).await?;
        Ok(models
            .into_iter()
            .map(convert::override_from_model)
            .collect())
    }
}

#[async_trait]
impl CardStore for DatabaseStore {
    async fn commit_done(
        &self,
        record_id: i64,
        card: &NormalizedCard,
        at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let txn = self.db.begin().await?;
        write_card(&txn, card, at).await?;
        raw_cards::ActiveModel {
            id: Set(record_id),
            status: Set(AnalysisStatus::Done.as_str().to_string()),
            last_analyzed_at: Set(Some(at)),
            analysis_error: Set(None),
            ..Default::default()
        }
        .update(&txn)
        .await?;
        txn.commit().await?;
        Ok(())
    }
}
