//! Gameplay feature flags and their bit assignments.
//!
//! Card features are spread over two 64-bit groups because there are more of
//! them than fit in one word. Burst features live in their own mask. Bit 0 of
//! every group is never assigned.

use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

/// Where a card feature's bit lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSlot {
    Group1(u8),
    Group2(u8),
}

macro_rules! card_features {
    ($($variant:ident => $group:ident($bit:literal), $label:literal;)*) => {
        /// A detected gameplay keyword or ability.
        #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum CardFeature {
            $($variant,)*
        }

        impl CardFeature {
            pub const ALL: &'static [Self] = &[$(Self::$variant,)*];

            #[must_use]
            pub const fn slot(self) -> FeatureSlot {
                match self {
                    $(Self::$variant => FeatureSlot::$group($bit),)*
                }
            }

            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)*
                }
            }

            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)*
                }
            }
        }
    };
}

macro_rules! burst_features {
    ($($variant:ident => $bit:literal, $label:literal;)*) => {
        /// An effect category of a life-burst text.
        #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum BurstFeature {
            $($variant,)*
        }

        impl BurstFeature {
            pub const ALL: &'static [Self] = &[$(Self::$variant,)*];

            #[must_use]
            pub const fn bit(self) -> u64 {
                match self {
                    $(Self::$variant => 1 << $bit,)*
                }
            }

            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)*
                }
            }

            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)*
                }
            }
        }
    };
}

card_features! {
    DoubleCrush => Group1(1), "ダブルクラッシュ";
    TripleCrush => Group1(2), "トリプルクラッシュ";
    DiscardOpponent => Group1(3), "手札破壊";
    RandomDiscard => Group1(4), "ランダム手札破壊";
    Draw => Group1(5), "ドロー";
    Assassin => Group1(6), "アサシン";
    Freeze => Group1(7), "凍結";
    Drop => Group1(8), "デッキドロップ";
    OnDrop => Group1(9), "デッキドロップ時";
    OnRefresh => Group1(10), "リフレッシュ時";
    Lancer => Group1(11), "ランサー";
    SLancer => Group1(12), "Sランサー";
    RemoveSigni => Group1(13), "シグニ除外";
    NonAttackable => Group1(14), "アタック不可";
    Down => Group1(15), "ダウン";
    Up => Group1(16), "アップ";
    Charge => Group1(17), "エナチャージ";
    EnerAttack => Group1(18), "エナ破壊";
    Trash => Group1(19), "トラッシュ送り";
    Ener => Group1(20), "エナ送り";
    PowerUp => Group1(21), "パワーアップ";
    PowerDown => Group1(22), "パワーダウン";
    Bounce => Group1(23), "バウンス";
    DeckBounce => Group1(24), "デッキバウンス";
    Salvage => Group1(25), "回収";
    LifeBurst => Group1(26), "ライフバースト";
    Shadow => Group1(27), "シャドウ";
    Invulnerable => Group1(28), "バニッシュされない";
    OnSpell => Group1(29), "スペル使用時";
    OnArts => Group1(30), "アーツ使用時";
    OnPiece => Group1(31), "ピース使用時";
    OnBanish => Group1(32), "バニッシュした時";
    Banish => Group1(33), "バニッシュ";
    Guard => Group1(34), "ガード";
    OnGuard => Group1(35), "ガードした時";
    AttackNoEffect => Group1(36), "アタック無効";
    OnTouch => Group1(38), "対象になった時";
    Awake => Group1(39), "覚醒";
    Exceed => Group1(40), "エクシード";
    OnExceed => Group1(41), "エクシードした時";
    AddLife => Group1(42), "ライフクロス追加";
    OnBurst => Group1(43), "ライフバースト発動時";
    LifeTrash => Group1(44), "ライフクロストラッシュ送り";
    LifeCrush => Group1(45), "クラッシュ";
    Damage => Group1(46), "ダメージ";
    OnLifeCrush => Group1(47), "クラッシュ時";
    Position => Group1(48), "シグニゾーン移動";
    Vanilla => Group1(49), "能力を持たない";
    Untouchable => Group1(50), "効果を受けない";
    TopCheck => Group1(51), "トップ確認";
    BottomCheck => Group1(52), "ボトム確認";
    Barrier => Group1(53), "バリア獲得";
    MultiEner => Group1(54), "マルチエナ";
    LrigTrash => Group1(55), "ルリグトラッシュ";
    Charm => Group1(56), "チャーム";
    Craft => Group1(57), "クラフト";
    Acce => Group1(58), "アクセ";
    Rise => Group1(59), "ライズ";
    Recollect => Group1(60), "リコレクト";
    SeekTop => Group1(61), "シーク";
    EraseSkill => Group1(62), "能力消去";
    CancelDamage => Group2(1), "ダメージ無効";
    Reanimate => Group2(2), "トラッシュ場出し";
    AdditionalAttack => Group2(3), "追加アタック";
    UnGuardable => Group2(4), "ガード不可";
    SalvageSpell => Group2(5), "スペル回収";
    BanishOnAttack => Group2(6), "アタック時バニッシュ";
    Shoot => Group2(7), "シュート";
    LimitSigni => Group2(8), "配置禁止";
    FreeSpell => Group2(9), "スペル割引";
    DualColorEner => Group2(10), "多色エナ";
    GainCoin => Group2(11), "コイン獲得";
    BetCoin => Group2(12), "ベット";
    HandCost => Group2(13), "手札コスト";
    AssistCost => Group2(14), "アシストダウン";
    Inherit => Group2(15), "ルリグ能力継承";
    PreventGrowCost => Group2(16), "グロウコスト軽減";
    PutSigniDefense => Group2(17), "ブロッカー場出し";
    PutSigniOffense => Group2(18), "シグニ場出し";
    Harmony => Group2(19), "ハーモニー";
    MagicBox => Group2(20), "マジックボックス";
    Virus => Group2(21), "ウィルス";
    EnhanceLimit => Group2(22), "リミット上昇";
    Dissona => Group2(23), "ディソナ";
}

burst_features! {
    Draw => 1, "ドロー";
    Banish => 2, "バニッシュ";
    Charge => 3, "エナチャージ";
    Salvage => 4, "回収";
    Bounce => 5, "バウンス";
    Freeze => 6, "凍結";
    Trash => 7, "トラッシュ送り";
    Ener => 8, "エナ送り";
    PowerDown => 9, "パワーダウン";
    PowerUp => 10, "パワーアップ";
    Discard => 11, "手札破壊";
    Down => 12, "ダウン";
    AddLife => 13, "ライフクロス追加";
    Defend => 14, "アタック防御";
    Reanimate => 15, "場に出す";
    Search => 16, "サーチ";
    Guard => 17, "ガード獲得";
    LifeCrush => 18, "クラッシュ";
}

impl CardFeature {
    /// Bits contributed to (group 1, group 2).
    #[must_use]
    pub const fn bits(self) -> (u64, u64) {
        match self.slot() {
            FeatureSlot::Group1(b) => (1 << b, 0),
            FeatureSlot::Group2(b) => (0, 1 << b),
        }
    }

    /// Look up by variant name (`Draw`) or page label (`ドロー`).
    #[must_use]
    pub fn lookup(key: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name() == key || f.label() == key)
    }
}

impl BurstFeature {
    #[must_use]
    pub fn lookup(key: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name() == key || f.label() == key)
    }
}

/// A feature named by a rule or an override request.
///
/// Burst features are written with a `burst:` prefix (`burst:Draw`) since
/// several names exist in both tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureRef {
    Card(CardFeature),
    Burst(BurstFeature),
}

impl FromStr for FeatureRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix("burst:") {
            return BurstFeature::lookup(rest.trim())
                .map(Self::Burst)
                .ok_or_else(|| format!("unknown burst feature: {rest}"));
        }
        CardFeature::lookup(s)
            .map(Self::Card)
            .ok_or_else(|| format!("unknown feature: {s}"))
    }
}

impl std::fmt::Display for FeatureRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Card(c) => write!(f, "{}", c.name()),
            Self::Burst(b) => write!(f, "burst:{}", b.name()),
        }
    }
}

/// The three feature masks of a card.
///
/// `FeatureBits::default()` is the identity of `|`, so accumulating matches is
/// a plain fold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureBits {
    pub group1: u64,
    pub group2: u64,
    pub burst: u64,
}

impl FeatureBits {
    pub const EMPTY: Self = Self {
        group1: 0,
        group2: 0,
        burst: 0,
    };

    #[must_use]
    pub const fn new(group1: u64, group2: u64, burst: u64) -> Self {
        Self {
            group1,
            group2,
            burst,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.group1 == 0 && self.group2 == 0 && self.burst == 0
    }

    #[must_use]
    pub fn from_refs<'a>(refs: impl IntoIterator<Item = &'a FeatureRef>) -> Self {
        refs.into_iter().fold(Self::EMPTY, |acc, r| acc | Self::from(*r))
    }

    /// Same masks with the burst group cleared.
    #[must_use]
    pub const fn card_only(self) -> Self {
        Self {
            burst: 0,
            ..self
        }
    }

    #[must_use]
    pub fn card_features(&self) -> Vec<CardFeature> {
        CardFeature::ALL
            .iter()
            .copied()
            .filter(|f| {
                let (b1, b2) = f.bits();
                self.group1 & b1 != 0 || self.group2 & b2 != 0
            })
            .collect()
    }

    #[must_use]
    pub fn burst_features(&self) -> Vec<BurstFeature> {
        BurstFeature::ALL
            .iter()
            .copied()
            .filter(|f| self.burst & f.bit() != 0)
            .collect()
    }
}

impl From<CardFeature> for FeatureBits {
    fn from(feature: CardFeature) -> Self {
        let (group1, group2) = feature.bits();
        Self::new(group1, group2, 0)
    }
}

impl From<FeatureRef> for FeatureBits {
    fn from(r: FeatureRef) -> Self {
        match r {
            FeatureRef::Card(c) => c.into(),
            FeatureRef::Burst(b) => Self::new(0, 0, b.bit()),
        }
    }
}

impl BitOr for FeatureBits {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            group1: self.group1 | rhs.group1,
            group2: self.group2 | rhs.group2,
            burst: self.burst | rhs.burst,
        }
    }
}

impl BitOrAssign for FeatureBits {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn card_feature_bits_are_unique() {
        let mut seen = HashSet::new();
        for f in CardFeature::ALL {
            let slot = match f.slot() {
                FeatureSlot::Group1(b) => (1, b),
                FeatureSlot::Group2(b) => (2, b),
            };
            assert!(slot.1 > 0 && slot.1 < 64, "{f:?} out of range");
            assert!(seen.insert(slot), "{f:?} shares a bit");
        }
    }

    #[test]
    fn piece_trigger_keeps_the_stored_bit() {
        // stored masks use bit 31 for piece use; arts use took the free bit 30
        assert_eq!(CardFeature::OnPiece.slot(), FeatureSlot::Group1(31));
        assert_eq!(CardFeature::OnArts.slot(), FeatureSlot::Group1(30));
        assert_eq!(
            FeatureBits::new(1 << 31, 0, 0).card_features(),
            vec![CardFeature::OnPiece]
        );
    }

    #[test]
    fn burst_feature_bits_are_unique() {
        let mut seen = 0_u64;
        for f in BurstFeature::ALL {
            assert_eq!(seen & f.bit(), 0, "{f:?} shares a bit");
            seen |= f.bit();
        }
        assert_eq!(seen & 1, 0);
    }

    #[test]
    fn decode_inverts_encode() {
        let refs = [
            FeatureRef::Card(CardFeature::Draw),
            FeatureRef::Card(CardFeature::Virus),
            FeatureRef::Burst(BurstFeature::Banish),
        ];
        let bits = FeatureBits::from_refs(&refs);
        assert_eq!(
            bits.card_features(),
            vec![CardFeature::Draw, CardFeature::Virus]
        );
        assert_eq!(bits.burst_features(), vec![BurstFeature::Banish]);
    }

    #[test]
    fn feature_ref_parsing() {
        assert_eq!(
            "Draw".parse::<FeatureRef>(),
            Ok(FeatureRef::Card(CardFeature::Draw))
        );
        assert_eq!(
            "バニッシュ".parse::<FeatureRef>(),
            Ok(FeatureRef::Card(CardFeature::Banish))
        );
        assert_eq!(
            "burst:Draw".parse::<FeatureRef>(),
            Ok(FeatureRef::Burst(BurstFeature::Draw))
        );
        assert!("Teleport".parse::<FeatureRef>().is_err());
    }

    #[test]
    fn or_is_commutative_with_empty_identity() {
        let a = FeatureBits::new(0b10, 0, 0b100);
        let b = FeatureBits::new(0b1000, 0b10, 0);
        assert_eq!(a | b, b | a);
        assert_eq!(a | FeatureBits::EMPTY, a);
        assert!(FeatureBits::default().is_empty());
    }
}
