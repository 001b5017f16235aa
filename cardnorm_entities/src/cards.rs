use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A normalized card, keyed by its code.
///
/// Feature masks are unsigned 64-bit values stored bit-for-bit in `BIGINT`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,
    pub name: String,
    pub pronunciation: String,
    pub product_id: Option<i64>,
    pub card_type: i32,
    /// JSON array of `{category1, category2, category3}` objects.
    #[sea_orm(column_type = "Text")]
    pub classes: String,
    pub color: i32,
    pub cost: Option<String>,
    pub level: Option<i32>,
    pub limit: Option<i32>,
    pub limit_consumption: Option<i32>,
    pub power: Option<String>,
    pub timing: Option<i32>,
    #[sea_orm(column_type = "Text")]
    pub skill_text: String,
    #[sea_orm(column_type = "Text")]
    pub burst_text: String,
    pub has_burst: i32,
    pub format: i32,
    pub story: Option<String>,
    pub rarity: Option<String>,
    pub feature_bits1: i64,
    pub feature_bits2: i64,
    pub burst_bits: i64,
    pub source_url: String,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
