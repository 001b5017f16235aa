use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A captured card page and its analysis state.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "raw_cards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub card_number: String,
    pub name: String,
    pub product_id: Option<i64>,
    #[sea_orm(column_type = "Text")]
    pub raw_html: String,
    #[sea_orm(column_type = "Text")]
    pub skill_text: String,
    #[sea_orm(column_type = "Text")]
    pub life_burst_text: String,
    pub source_url: String,
    pub scraped_at: DateTimeUtc,
    /// pending, done or errored.
    #[sea_orm(default_value = "pending")]
    pub status: String,
    pub last_analyzed_at: Option<DateTimeUtc>,
    pub analysis_error: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
