//! Card-type taxonomy.
//!
//! The numeric codes are the stored `card_type` values and must not change.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The game-domain category of a card.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CardType {
    Lrig = 1,
    Arts = 2,
    LrigAssist = 3,
    Piece = 4,
    Signi = 5,
    Spell = 6,
    Resona = 7,
    Key = 8,
    ArtsCraft = 9,
    SigniCraft = 10,
    SpellCraft = 11,
    PieceRelay = 12,
    PieceCraft = 13,
    ResonaCraft = 14,
    Token = 15,
    Coin = 16,
}

impl CardType {
    pub const ALL: [Self; 16] = [
        Self::Lrig,
        Self::Arts,
        Self::LrigAssist,
        Self::Piece,
        Self::Signi,
        Self::Spell,
        Self::Resona,
        Self::Key,
        Self::ArtsCraft,
        Self::SigniCraft,
        Self::SpellCraft,
        Self::PieceRelay,
        Self::PieceCraft,
        Self::ResonaCraft,
        Self::Token,
        Self::Coin,
    ];

    /// Stored numeric code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lrig => "lrig",
            Self::Arts => "arts",
            Self::LrigAssist => "lrig_assist",
            Self::Piece => "piece",
            Self::Signi => "signi",
            Self::Spell => "spell",
            Self::Resona => "resona",
            Self::Key => "key",
            Self::ArtsCraft => "arts_craft",
            Self::SigniCraft => "signi_craft",
            Self::SpellCraft => "spell_craft",
            Self::PieceRelay => "piece_relay",
            Self::PieceCraft => "piece_craft",
            Self::ResonaCraft => "resona_craft",
            Self::Token => "token",
            Self::Coin => "coin",
        }
    }

    /// Label as printed on the card page.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Lrig => "ルリグ",
            Self::Arts => "アーツ",
            Self::LrigAssist => "アシストルリグ",
            Self::Piece => "ピース",
            Self::Signi => "シグニ",
            Self::Spell => "スペル",
            Self::Resona => "レゾナ",
            Self::Key => "キー",
            Self::ArtsCraft => "クラフトアーツ",
            Self::SigniCraft => "クラフトシグニ",
            Self::SpellCraft => "クラフトスペル",
            Self::PieceRelay => "リレーピース",
            Self::PieceCraft => "クラフトピース",
            Self::ResonaCraft => "クラフトレゾナ",
            Self::Token => "トークン",
            Self::Coin => "コイン",
        }
    }

    /// Whether cards of this type can carry a life burst at all.
    #[must_use]
    pub const fn can_have_burst(self) -> bool {
        matches!(
            self,
            Self::Signi | Self::SigniCraft | Self::Spell | Self::SpellCraft
        )
    }
}

impl std::fmt::Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CardType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown card type: {s}"))
    }
}
