use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rule_patterns")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub keyword: String,
    #[sea_orm(column_type = "Text")]
    pub pattern: String,
    /// Literal text substituted for every match before detection.
    #[sea_orm(column_type = "Text", nullable)]
    pub replace_with: Option<String>,
    /// JSON array of feature names.
    #[sea_orm(column_type = "Text")]
    pub features: String,
    /// JSON array of texts the pattern must match.
    #[sea_orm(column_type = "Text")]
    pub positive_examples: String,
    /// JSON array of texts the pattern must not match.
    #[sea_orm(column_type = "Text")]
    pub negative_examples: String,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
