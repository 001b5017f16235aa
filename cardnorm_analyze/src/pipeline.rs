//! Single-record analysis: raw record in, normalized card out.
//!
//! Nothing here touches storage. The same record with the same rule and
//! override snapshots always yields the same card.

use cardnorm_core::bits::Format;
use cardnorm_core::{
    AnalysisError, BitSymbol, CardFeature, CardType, Color, FeatureBits, HasBurst, NormalizedCard,
    RawRecord, to_half_width, truncate_bytes,
};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::classify::{Classification, classify};
use crate::extract::extract;
use crate::fields::{CoercionMiss, DISSONA, Field, MappedFields, map_fields};
use crate::matcher::RuleSet;
use crate::overrides::OverrideResolver;

pub const NAME_MAX_BYTES: usize = 256;
pub const PRONUNCIATION_MAX_BYTES: usize = 128;

#[expect(clippy::expect_used, reason = "Static pattern is checked by the tests")]
static RARITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<div class="cardRarity">(.*?)</div>"#).expect("rarity pattern must compile")
});

/// A card plus the diagnostics gathered while building it.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub card: NormalizedCard,
    pub position_misses: Vec<Field>,
    pub coercion_misses: Vec<CoercionMiss>,
    /// Whether the feature masks came from an override.
    pub overridden: bool,
}

pub struct CardAnalyzer<'a> {
    rules: &'a RuleSet,
    overrides: &'a OverrideResolver,
}

impl<'a> CardAnalyzer<'a> {
    #[must_use]
    pub const fn new(rules: &'a RuleSet, overrides: &'a OverrideResolver) -> Self {
        Self { rules, overrides }
    }

    pub fn analyze(&self, record: &RawRecord) -> Result<Analysis, AnalysisError> {
        let list = extract(&record.raw_html).ok_or(AnalysisError::NoAnchor)?;
        let label = list.type_label().unwrap_or_default();
        let card_type = match classify(label) {
            Classification::Known(t) => t,
            Classification::Unknown(label) => {
                return Err(AnalysisError::UnknownCardType { label });
            }
        };
        let fields = map_fields(card_type, &list)?;

        let (name, pronunciation) = split_name(&record.name);
        let matched = self.rules.apply(&record.skill_text, &record.life_burst_text);
        let computed = matched.features | structural_features(card_type, &fields);
        let override_bits = self.overrides.lookup(&pronunciation);
        let features = override_bits.unwrap_or(computed);

        let card = NormalizedCard {
            code: to_half_width(record.card_number.trim()),
            name,
            pronunciation,
            product_id: record.product_id,
            card_type,
            classes: fields.classes(Field::CardClass).to_vec(),
            color: fields.bits(Field::Color).unwrap_or_else(|| Color::Unknown.bit()),
            cost: fields.text(Field::Cost).map(ToString::to_string),
            level: fields.integer(Field::Level),
            limit: fields.integer(Field::Limit),
            limit_consumption: fields.integer(Field::LimitConsumption),
            power: fields.text(Field::Power).map(ToString::to_string),
            timing: fields.bits(Field::Timing),
            skill_text: matched.skill_text,
            burst_text: matched.burst_text,
            has_burst: has_burst(card_type, &record.life_burst_text),
            format: fields.bits(Field::Format).unwrap_or(Format::DEFAULT_MASK),
            story: fields.text(Field::Story).map(ToString::to_string),
            rarity: rarity(&record.raw_html),
            features,
            source_url: record.source_url.clone(),
        };

        Ok(Analysis {
            card,
            position_misses: fields.position_misses,
            coercion_misses: fields.coercion_misses,
            overridden: override_bits.is_some(),
        })
    }
}

/// Features implied by the card's columns rather than its text.
fn structural_features(card_type: CardType, fields: &MappedFields) -> FeatureBits {
    let mut bits = FeatureBits::EMPTY;
    if card_type == CardType::LrigAssist && fields.integer(Field::Limit).is_some_and(|l| l != 0) {
        bits |= FeatureBits::from(CardFeature::EnhanceLimit);
    }
    if fields.text(Field::Story) == Some(DISSONA) {
        bits |= FeatureBits::from(CardFeature::Dissona);
    }
    bits
}

fn has_burst(card_type: CardType, burst_text: &str) -> HasBurst {
    if !card_type.can_have_burst() {
        HasBurst::NotApplicable
    } else if burst_text.trim().is_empty() {
        HasBurst::No
    } else {
        HasBurst::Yes
    }
}

/// Split `名前<よみ>` into name and pronunciation.
///
/// Without a complete `<...>` part the whole name doubles as pronunciation.
#[must_use]
pub fn split_name(raw: &str) -> (String, String) {
    let full = to_half_width(raw.trim());
    let (name, pronunciation) = match (full.find('<'), full.find('>')) {
        (Some(start), Some(end)) if start < end => {
            (full[..start].trim_end(), full[start + 1..end].trim())
        }
        _ => (full.as_str(), full.as_str()),
    };
    (
        truncate_bytes(name, NAME_MAX_BYTES).to_string(),
        truncate_bytes(pronunciation, PRONUNCIATION_MAX_BYTES).to_string(),
    )
}

/// Text of the `cardRarity` marker, if present and non-empty.
#[must_use]
pub fn rarity(html: &str) -> Option<String> {
    let value = RARITY.captures(html)?.get(1)?.as_str().trim();
    (!value.is_empty()).then(|| value.to_string())
}
