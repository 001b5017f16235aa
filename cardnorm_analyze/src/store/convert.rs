//! Conversions between stored models and domain types.
//!
//! Bitmasks are stored in signed integer columns; the casts below reinterpret
//! the bits without changing them.

#![allow(
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation
)]

use anyhow::Context;
use cardnorm_core::{CardClass, 
    AnalysisStatus, CardFeatureOverride, CardType, FeatureBits, HasBurst, NormalizedCard,
    RawRecord, RulePattern,
};
use cardnorm_entities::{card_feature_overrides, cards, raw_cards, rule_patterns};
use chrono::{DateTime, Utc};
use sea_orm::Set;
use tracing::warn;

/// An unreadable status is treated as errored, so the record is neither
/// retried nor reported as analysed until it is reset.
pub fn raw_record_from_model(m: raw_cards::Model) -> RawRecord {
    let status = m.status.parse().unwrap_or_else(|_| {
        warn!(
            "Raw record {} has unknown status {:?}; treating it as errored",
            m.id, m.status
        );
        AnalysisStatus::Errored
    });
    RawRecord {
        id: m.id,
        card_number: m.card_number,
        name: m.name,
        product_id: m.product_id,
        raw_html: m.raw_html,
        skill_text: m.skill_text,
        life_burst_text: m.life_burst_text,
        source_url: m.source_url,
        scraped_at: m.scraped_at,
        status,
        last_analyzed_at: m.last_analyzed_at,
        analysis_error: m.analysis_error,
    }
}

/// Active model for a new raw row; the id is assigned by the database.
pub fn raw_record_to_active(r: &RawRecord) -> raw_cards::ActiveModel {
    raw_cards::ActiveModel {
        card_number: Set(r.card_number.clone()),
        name: Set(r.name.clone()),
        product_id: Set(r.product_id),
        raw_html: Set(r.raw_html.clone()),
        skill_text: Set(r.skill_text.clone()),
        life_burst_text: Set(r.life_burst_text.clone()),
        source_url: Set(r.source_url.clone()),
        scraped_at: Set(r.scraped_at),
        status: Set(r.status.as_str().to_string()),
        last_analyzed_at: Set(r.last_analyzed_at),
        analysis_error: Set(r.analysis_error.clone()),
        ..Default::default()
    }
}

pub fn card_from_model(m: cards::Model) -> anyhow::Result<NormalizedCard> {
    let card_type = CardType::from_code(m.card_type)
        .with_context(|| format!("card {} has unknown type code {}", m.code, m.card_type))?;
    let has_burst = HasBurst::from_code(m.has_burst)
        .with_context(|| format!("card {} has unknown has_burst code {}", m.code, m.has_burst))?;
    let classes: Vec<CardClass> = serde_json::from_str(&m.classes)
        .with_context(|| format!("card {} has unreadable classes {:?}", m.code, m.classes))?;
    Ok(NormalizedCard {
        code: m.code,
        name: m.name,
        pronunciation: m.pronunciation,
        product_id: m.product_id,
        card_type,
        classes,
        color: m.color as u32,
        cost: m.cost,
        level: m.level,
        limit: m.limit,
        limit_consumption: m.limit_consumption,
        power: m.power,
        timing: m.timing.map(|t| t as u32),
        skill_text: m.skill_text,
        burst_text: m.burst_text,
        has_burst,
        format: m.format as u32,
        story: m.story,
        rarity: m.rarity,
        features: FeatureBits::new(
            m.feature_bits1 as u64,
            m.feature_bits2 as u64,
            m.burst_bits as u64,
        ),
        source_url: m.source_url,
    })
}

pub fn card_to_active(
    c: &NormalizedCard,
    at: DateTime<Utc>,
) -> anyhow::Result<cards::ActiveModel> {
    Ok(cards::ActiveModel {
        code: Set(c.code.clone()),
        name: Set(c.name.clone()),
        pronunciation: Set(c.pronunciation.clone()),
        product_id: Set(c.product_id),
        card_type: Set(c.card_type.code()),
        classes: Set(serde_json::to_string(&c.classes)?),
        color: Set(c.color as i32),
        cost: Set(c.cost.clone()),
        level: Set(c.level),
        limit: Set(c.limit),
        limit_consumption: Set(c.limit_consumption),
        power: Set(c.power.clone()),
        timing: Set(c.timing.map(|t| t as i32)),
        skill_text: Set(c.skill_text.clone()),
        burst_text: Set(c.burst_text.clone()),
        has_burst: Set(c.has_burst.code()),
        format: Set(c.format as i32),
        story: Set(c.story.clone()),
        rarity: Set(c.rarity.clone()),
        feature_bits1: Set(c.features.group1 as i64),
        feature_bits2: Set(c.features.group2 as i64),
        burst_bits: Set(c.features.burst as i64),
        source_url: Set(c.source_url.clone()),
        updated_at: Set(at),
    })
}

fn json_list(rule_id: i64, column: &str, text: &str) -> anyhow::Result<Vec<String>> {
    serde_json::from_str(text)
        .with_context(|| format!("rule {rule_id} has an unreadable {column} column: {text:?}"))
}

pub fn rule_from_model(m: rule_patterns::Model) -> anyhow::Result<RulePattern> {
    Ok(RulePattern {
        features: json_list(m.id, "features", &m.features)?,
        positive_examples: json_list(m.id, "positive_examples", &m.positive_examples)?,
        negative_examples: json_list(m.id, "negative_examples", &m.negative_examples)?,
        id: m.id,
        keyword: m.keyword,
        pattern: m.pattern,
        replace_with: m.replace_with,
        is_active: m.is_active,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

pub fn rule_to_active(r: &RulePattern) -> anyhow::Result<rule_patterns::ActiveModel> {
    Ok(rule_patterns::ActiveModel {
        keyword: Set(r.keyword.clone()),
        pattern: Set(r.pattern.clone()),
        replace_with: Set(r.replace_with.clone()),
        features: Set(serde_json::to_string(&r.features)?),
        positive_examples: Set(serde_json::to_string(&r.positive_examples)?),
        negative_examples: Set(serde_json::to_string(&r.negative_examples)?),
        is_active: Set(r.is_active),
        created_at: Set(r.created_at),
        updated_at: Set(r.updated_at),
        ..Default::default()
    })
}

pub fn override_from_model(m: card_feature_overrides::Model) -> CardFeatureOverride {
    CardFeatureOverride {
        pronunciation: m.pronunciation,
        fixed_bits1: m.fixed_bits1 as u64,
        fixed_bits2: m.fixed_bits2 as u64,
        fixed_burst_bits: m.fixed_burst_bits as u64,
        note: m.note,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

pub fn override_to_active(o: &CardFeatureOverride) -> card_feature_overrides::ActiveModel {
    card_feature_overrides::ActiveModel {
        pronunciation: Set(o.pronunciation.clone()),
        fixed_bits1: Set(o.fixed_bits1 as i64),
        fixed_bits2: Set(o.fixed_bits2 as i64),
        fixed_burst_bits: Set(o.fixed_burst_bits as i64),
        note: Set(o.note.clone()),
        created_at: Set(o.created_at),
        updated_at: Set(o.updated_at),
    }
}
