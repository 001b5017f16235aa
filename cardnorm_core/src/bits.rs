//! Fixed bit tables for categorical card attributes.
//!
//! Every table maps each symbol to exactly one bit, so a set of symbols
//! encodes to the OR of their bits and decodes back to the same set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A symbol belonging to a fixed bit table.
pub trait BitSymbol: Copy + Ord + 'static {
    /// Every symbol of the table, in display order.
    const ALL: &'static [Self];

    /// The single bit assigned to this symbol.
    fn bit(self) -> u32;

    /// Display label.
    fn label(self) -> &'static str;
}

/// OR together the bits of `symbols`.
#[must_use]
pub fn encode<S: BitSymbol>(symbols: impl IntoIterator<Item = S>) -> u32 {
    symbols.into_iter().fold(0, |mask, s| mask | s.bit())
}

/// Every symbol whose bit is set in `mask`. Bits outside the table are ignored.
#[must_use]
pub fn decode<S: BitSymbol>(mask: u32) -> BTreeSet<S> {
    S::ALL
        .iter()
        .copied()
        .filter(|s| mask & s.bit() != 0)
        .collect()
}

/// Card color. Bit 0 is reserved; eight slots in total.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    White,
    Blue,
    Red,
    Black,
    Green,
    Colorless,
    Unknown,
}

impl Color {
    /// Map a single color character as printed on the page.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '白' => Some(Self::White),
            '青' => Some(Self::Blue),
            '赤' => Some(Self::Red),
            '黒' => Some(Self::Black),
            '緑' => Some(Self::Green),
            '無' => Some(Self::Colorless),
            _ => None,
        }
    }

    /// Short code used by the cost notation (`w3l1`).
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::White => 'w',
            Self::Blue => 'u',
            Self::Red => 'r',
            Self::Black => 'k',
            Self::Green => 'g',
            Self::Colorless => 'l',
            Self::Unknown => 'x',
        }
    }
}

impl BitSymbol for Color {
    const ALL: &'static [Self] = &[
        Self::White,
        Self::Blue,
        Self::Red,
        Self::Black,
        Self::Green,
        Self::Colorless,
        Self::Unknown,
    ];

    fn bit(self) -> u32 {
        match self {
            Self::White => 1 << 1,
            Self::Blue => 1 << 2,
            Self::Red => 1 << 3,
            Self::Black => 1 << 4,
            Self::Green => 1 << 5,
            Self::Colorless => 1 << 6,
            Self::Unknown => 1 << 7,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::White => "白",
            Self::Blue => "青",
            Self::Red => "赤",
            Self::Black => "黒",
            Self::Green => "緑",
            Self::Colorless => "無",
            Self::Unknown => "?",
        }
    }
}

/// Phase in which an arts, piece or assist lrig may be used.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
    MainPhase,
    AttackPhase,
    SpellCutIn,
}

impl BitSymbol for Timing {
    const ALL: &'static [Self] = &[Self::MainPhase, Self::AttackPhase, Self::SpellCutIn];

    fn bit(self) -> u32 {
        match self {
            Self::MainPhase => 1 << 0,
            Self::AttackPhase => 1 << 1,
            Self::SpellCutIn => 1 << 2,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::MainPhase => "メインフェイズ",
            Self::AttackPhase => "アタックフェイズ",
            Self::SpellCutIn => "スペルカットイン",
        }
    }
}

/// Tournament format. Formats nest: a diva selection card is also legal in
/// key selection and all-star, and a key selection card in all-star.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    DivaSelection,
    KeySelection,
    AllStar,
}

impl Format {
    /// Mask of a card without a format icon: legal in all three.
    pub const DEFAULT_MASK: u32 = 7;

    /// Mask stored for a card whose narrowest format is `self`.
    ///
    /// The bits name the formats the card belongs to from the narrowest
    /// outwards, so diva selection stores `1`, key selection `3` and
    /// all-star `7`.
    #[must_use]
    pub fn legal_mask(self) -> u32 {
        Self::ALL
            .iter()
            .take_while(|f| **f <= self)
            .fold(0, |mask, f| mask | f.bit())
    }

    /// Icon file that marks legality in this format, if the format has one.
    #[must_use]
    pub const fn icon(self) -> Option<&'static str> {
        match self {
            Self::DivaSelection => Some("icon_txt_format_diva.png"),
            Self::KeySelection => Some("icon_txt_format_key.png"),
            Self::AllStar => None,
        }
    }
}

impl BitSymbol for Format {
    const ALL: &'static [Self] = &[Self::DivaSelection, Self::KeySelection, Self::AllStar];

    fn bit(self) -> u32 {
        match self {
            Self::DivaSelection => 1 << 0,
            Self::KeySelection => 1 << 1,
            Self::AllStar => 1 << 2,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::DivaSelection => "ディーヴァセレクション",
            Self::KeySelection => "キーセレクション",
            Self::AllStar => "オールスター",
        }
    }
}
