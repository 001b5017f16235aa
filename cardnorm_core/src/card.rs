//! The normalized card record produced by analysis.

use serde::{Deserialize, Serialize};

use crate::card_type::CardType;
use crate::feature::FeatureBits;

/// Whether a card has a life burst.
///
/// Types that can never carry a burst are `NotApplicable` rather than `No`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HasBurst {
    Yes,
    No,
    NotApplicable,
}

impl HasBurst {
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::NotApplicable => 0,
            Self::Yes => 1,
            Self::No => 2,
        }
    }

    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::NotApplicable),
            1 => Some(Self::Yes),
            2 => Some(Self::No),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::NotApplicable => "not_applicable",
        }
    }
}

/// One entry of a card's class column, e.g. `奏羅：宇宙` or
/// `精像：美巧/電機`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CardClass {
    pub category1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category3: Option<String>,
}

impl CardClass {
    #[must_use]
    pub fn new(category1: &str, category2: Option<&str>, category3: Option<&str>) -> Self {
        Self {
            category1: category1.to_string(),
            category2: category2.map(str::to_string),
            category3: category3.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedCard {
    pub code: String,
    pub name: String,
    pub pronunciation: String,
    pub product_id: Option<i64>,
    pub card_type: CardType,
    pub classes: Vec<CardClass>,
    pub color: u32,
    /// Grow cost for lrig types, play cost otherwise.
    pub cost: Option<String>,
    pub level: Option<i32>,
    pub limit: Option<i32>,
    pub limit_consumption: Option<i32>,
    pub power: Option<String>,
    pub timing: Option<u32>,
    pub skill_text: String,
    pub burst_text: String,
    pub has_burst: HasBurst,
    pub format: u32,
    pub story: Option<String>,
    pub rarity: Option<String>,
    pub features: FeatureBits,
    pub source_url: String,
}
