//! Card-type classification from the localized type label.

use cardnorm_core::CardType;

/// A marker printed beside a base label that selects a variant type, as in
/// `ピース（リレー）` or `シグニ クラフト`.
#[derive(Debug, Clone, Copy)]
pub struct VariantMarker {
    pub base: CardType,
    pub marker: &'static str,
    pub variant: CardType,
}

const fn marker(base: CardType, text: &'static str, variant: CardType) -> VariantMarker {
    VariantMarker {
        base,
        marker: text,
        variant,
    }
}

/// Checked in order; the first marker present for the base type wins.
pub const VARIANT_MARKERS: &[VariantMarker] = &[
    marker(CardType::Lrig, "アシスト", CardType::LrigAssist),
    marker(CardType::Piece, "リレー", CardType::PieceRelay),
    marker(CardType::Piece, "クラフト", CardType::PieceCraft),
    marker(CardType::Arts, "クラフト", CardType::ArtsCraft),
    marker(CardType::Signi, "クラフト", CardType::SigniCraft),
    marker(CardType::Spell, "クラフト", CardType::SpellCraft),
    marker(CardType::Resona, "クラフト", CardType::ResonaCraft),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Known(CardType),
    Unknown(String),
}

/// Every card type ordered by label length, longest first.
///
/// Longer labels contain shorter ones (`クラフトシグニ` contains `シグニ`), so
/// the first containment hit in this order is the most specific one.
fn by_label_length() -> [CardType; 16] {
    let mut types = CardType::ALL;
    types.sort_by_key(|t| std::cmp::Reverse(t.label().chars().count()));
    types
}

#[must_use]
pub fn classify(label: &str) -> Classification {
    let text = label.trim();
    let Some(found) = by_label_length()
        .into_iter()
        .find(|t| text.contains(t.label()))
    else {
        return Classification::Unknown(text.to_string());
    };

    let resolved = VARIANT_MARKERS
        .iter()
        .find(|m| m.base == found && text.contains(m.marker))
        .map_or(found, |m| m.variant);
    Classification::Known(resolved)
}
