//! `sea-orm` entities backing the card store.

pub mod card_feature_overrides;
pub mod cards;
pub mod raw_cards;
pub mod rule_patterns;
