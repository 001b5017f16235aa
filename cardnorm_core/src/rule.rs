use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::feature::FeatureBits;

/// A curated text rule: when `pattern` matches, the card gains `features`.
///
/// A rule with `replace_with` also rewrites every match in the card text
/// before detection rules run, e.g. `ライフバースト：` to `LB:`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RulePattern {
    pub id: i64,
    pub keyword: String,
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace_with: Option<String>,
    /// Feature names as written by the curator (`Draw`, `burst:Banish`).
    pub features: Vec<String>,
    pub positive_examples: Vec<String>,
    pub negative_examples: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RulePattern {
    #[must_use]
    pub fn new(id: i64, keyword: &str, pattern: &str, features: &[&str]) -> Self {
        let now = Utc::now();
        Self {
            id,
            keyword: keyword.to_string(),
            pattern: pattern.to_string(),
            replace_with: None,
            features: features.iter().map(ToString::to_string).collect(),
            positive_examples: Vec::new(),
            negative_examples: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_examples(mut self, positive: &[&str], negative: &[&str]) -> Self {
        self.positive_examples = positive.iter().map(ToString::to_string).collect();
        self.negative_examples = negative.iter().map(ToString::to_string).collect();
        self
    }

    #[must_use]
    pub fn with_replacement(mut self, replacement: &str) -> Self {
        self.replace_with = Some(replacement.to_string());
        self
    }
}

/// Hand-corrected feature masks for every card sharing a pronunciation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardFeatureOverride {
    pub pronunciation: String,
    pub fixed_bits1: u64,
    pub fixed_bits2: u64,
    pub fixed_burst_bits: u64,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CardFeatureOverride {
    #[must_use]
    pub fn new(pronunciation: &str, bits: FeatureBits, note: &str) -> Self {
        let now = Utc::now();
        Self {
            pronunciation: pronunciation.to_string(),
            fixed_bits1: bits.group1,
            fixed_bits2: bits.group2,
            fixed_burst_bits: bits.burst,
            note: note.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub const fn bits(&self) -> FeatureBits {
        FeatureBits::new(self.fixed_bits1, self.fixed_bits2, self.fixed_burst_bits)
    }
}
