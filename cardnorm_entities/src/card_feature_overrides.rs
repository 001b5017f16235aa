use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "card_feature_overrides")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub pronunciation: String,
    pub fixed_bits1: i64,
    pub fixed_bits2: i64,
    pub fixed_burst_bits: i64,
    pub note: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
