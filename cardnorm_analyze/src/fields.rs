//! Positional field mapping.
//!
//! Each card type has its own table of `(field, column, kind)` entries. The
//! columns are those of the current page layout; the legacy layout is handled
//! by [`Layout::position`].

use std::collections::BTreeMap;

use cardnorm_core::bits::{BitSymbol, Color, Format, Timing};
use cardnorm_core::{AnalysisError, CardClass, CardType, to_half_width};

use crate::extract::{DefinitionList, Layout};

/// Story value recorded when the story column shows the dissona icon.
pub const DISSONA: &str = "dissona";
const DISSONA_ICON: &str = "icon_txt_dissona.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    CardClass,
    Color,
    Level,
    Cost,
    Limit,
    Power,
    LimitConsumption,
    Timing,
    Format,
    Story,
}

/// How a raw column value is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
    Class,
    Timing,
    Cost,
    Color,
    Format,
    Story,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub field: Field,
    pub position: usize,
    pub kind: FieldKind,
}

const fn def(field: Field, position: usize, kind: FieldKind) -> FieldDef {
    FieldDef {
        field,
        position,
        kind,
    }
}

// Current-layout columns.
const CLASS: usize = 1;
const COLOR: usize = 2;
const LEVEL: usize = 3;
const GROW_COST: usize = 4;
const COST: usize = 5;
const LIMIT: usize = 6;
const POWER: usize = 7;
const LIMIT_CONSUMPTION: usize = 8;
const TIMING: usize = 9;
const FORMAT: usize = 10;
const STORY: usize = 11;

const LRIG: &[FieldDef] = &[
    def(Field::CardClass, CLASS, FieldKind::Class),
    def(Field::Color, COLOR, FieldKind::Color),
    def(Field::Level, LEVEL, FieldKind::Integer),
    def(Field::Cost, GROW_COST, FieldKind::Cost),
    def(Field::Limit, LIMIT, FieldKind::Integer),
    def(Field::Format, FORMAT, FieldKind::Format),
    def(Field::Story, STORY, FieldKind::Story),
];

const LRIG_ASSIST: &[FieldDef] = &[
    def(Field::CardClass, CLASS, FieldKind::Class),
    def(Field::Color, COLOR, FieldKind::Color),
    def(Field::Level, LEVEL, FieldKind::Integer),
    def(Field::Cost, GROW_COST, FieldKind::Cost),
    def(Field::Limit, LIMIT, FieldKind::Integer),
    def(Field::Timing, TIMING, FieldKind::Timing),
    def(Field::Format, FORMAT, FieldKind::Format),
    def(Field::Story, STORY, FieldKind::Story),
];

const ARTS: &[FieldDef] = &[
    def(Field::Color, COLOR, FieldKind::Color),
    def(Field::Cost, COST, FieldKind::Cost),
    def(Field::Timing, TIMING, FieldKind::Timing),
    def(Field::Format, FORMAT, FieldKind::Format),
    def(Field::Story, STORY, FieldKind::Story),
];

const KEY: &[FieldDef] = &[
    def(Field::Color, COLOR, FieldKind::Color),
    def(Field::Cost, COST, FieldKind::Cost),
    def(Field::LimitConsumption, LIMIT_CONSUMPTION, FieldKind::Integer),
    def(Field::Format, FORMAT, FieldKind::Format),
    def(Field::Story, STORY, FieldKind::Story),
];

const SIGNI: &[FieldDef] = &[
    def(Field::CardClass, CLASS, FieldKind::Class),
    def(Field::Color, COLOR, FieldKind::Color),
    def(Field::Level, LEVEL, FieldKind::Integer),
    def(Field::Cost, COST, FieldKind::Cost),
    def(Field::Power, POWER, FieldKind::Text),
    def(Field::Format, FORMAT, FieldKind::Format),
    def(Field::Story, STORY, FieldKind::Story),
];

const SPELL: &[FieldDef] = &[
    def(Field::Color, COLOR, FieldKind::Color),
    def(Field::Cost, COST, FieldKind::Cost),
    def(Field::Format, FORMAT, FieldKind::Format),
    def(Field::Story, STORY, FieldKind::Story),
];

// Piece types share the arts columns; usable timing lives in column 9.
const PIECE: &[FieldDef] = ARTS;

const TOKEN: &[FieldDef] = &[
    def(Field::CardClass, CLASS, FieldKind::Class),
    def(Field::Color, COLOR, FieldKind::Color),
    def(Field::Level, LEVEL, FieldKind::Integer),
    def(Field::Power, POWER, FieldKind::Text),
];

/// The field table of a card type. `None` for types with no page layout.
#[must_use]
pub const fn table_for(card_type: CardType) -> Option<&'static [FieldDef]> {
    match card_type {
        CardType::Lrig => Some(LRIG),
        CardType::LrigAssist => Some(LRIG_ASSIST),
        CardType::Arts | CardType::ArtsCraft => Some(ARTS),
        CardType::Key => Some(KEY),
        CardType::Signi | CardType::SigniCraft | CardType::Resona | CardType::ResonaCraft => {
            Some(SIGNI)
        }
        CardType::Spell | CardType::SpellCraft => Some(SPELL),
        CardType::Piece | CardType::PieceRelay | CardType::PieceCraft => Some(PIECE),
        CardType::Token => Some(TOKEN),
        CardType::Coin => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Integer(i32),
    Text(String),
    Bits(u32),
    Classes(Vec<CardClass>),
}

/// A value that was present but could not be coerced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionMiss {
    pub field: Field,
    pub raw: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappedFields {
    pub values: BTreeMap<Field, FieldValue>,
    /// Fields whose column was beyond the end of the extracted list.
    pub position_misses: Vec<Field>,
    pub coercion_misses: Vec<CoercionMiss>,
}

impl MappedFields {
    #[must_use]
    pub fn integer(&self, field: Field) -> Option<i32> {
        match self.values.get(&field) {
            Some(FieldValue::Integer(v)) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn text(&self, field: Field) -> Option<&str> {
        match self.values.get(&field) {
            Some(FieldValue::Text(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn bits(&self, field: Field) -> Option<u32> {
        match self.values.get(&field) {
            Some(FieldValue::Bits(v)) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn classes(&self, field: Field) -> &[CardClass] {
        match self.values.get(&field) {
            Some(FieldValue::Classes(v)) => v,
            _ => &[],
        }
    }
}

/// Map the extracted values of a card of `card_type` through its table.
///
/// Fails only when the type has no table. Missing and malformed values are
/// recorded in the result instead.
pub fn map_fields(
    card_type: CardType,
    list: &DefinitionList,
) -> Result<MappedFields, AnalysisError> {
    let table = table_for(card_type).ok_or(AnalysisError::UnsupportedCardType { card_type })?;
    Ok(map_with(table, list.layout, &list.values))
}

#[must_use]
pub fn map_with(table: &[FieldDef], layout: Layout, values: &[String]) -> MappedFields {
    let mut mapped = MappedFields::default();
    for def in table {
        let Some(raw) = values.get(layout.position(def.position)) else {
            mapped.position_misses.push(def.field);
            continue;
        };
        let flat = flatten_breaks(raw);
        if is_placeholder(&flat) {
            continue;
        }
        match coerce(def.kind, raw, &flat) {
            Coerced::Value(v) => {
                mapped.values.insert(def.field, v);
            }
            Coerced::Absent => {}
            Coerced::Miss => mapped.coercion_misses.push(CoercionMiss {
                field: def.field,
                raw: flat,
            }),
        }
    }
    mapped
}

enum Coerced {
    Value(FieldValue),
    Absent,
    Miss,
}

/// `raw` keeps the markup for the icon-based kinds; `flat` is the trimmed text
/// with line breaks removed.
fn coerce(kind: FieldKind, raw: &str, flat: &str) -> Coerced {
    match kind {
        FieldKind::Integer => to_half_width(flat)
            .parse::<i32>()
            .map_or(Coerced::Miss, |v| Coerced::Value(FieldValue::Integer(v))),
        FieldKind::Text => Coerced::Value(FieldValue::Text(flat.to_string())),
        FieldKind::Class => match parse_classes(raw) {
            classes if classes.is_empty() => Coerced::Absent,
            classes => Coerced::Value(FieldValue::Classes(classes)),
        },
        FieldKind::Timing => match timing_bits(flat) {
            0 => Coerced::Miss,
            bits => Coerced::Value(FieldValue::Bits(bits)),
        },
        FieldKind::Cost => Coerced::Value(FieldValue::Text(
            convert_cost(flat).unwrap_or_else(|| flat.to_string()),
        )),
        FieldKind::Color => Coerced::Value(FieldValue::Bits(color_bits(flat))),
        FieldKind::Format => Coerced::Value(FieldValue::Bits(format_bits(raw))),
        FieldKind::Story => {
            if raw.contains(DISSONA_ICON) {
                Coerced::Value(FieldValue::Text(DISSONA.to_string()))
            } else {
                Coerced::Absent
            }
        }
    }
}

fn is_placeholder(flat: &str) -> bool {
    flat.is_empty() || flat == "-"
}

/// Remove `<br>` variants and line breaks, then trim.
#[must_use]
pub fn flatten_breaks(raw: &str) -> String {
    raw.replace(['\n', '\r'], "")
        .replace("<br />", "")
        .replace("<br/>", "")
        .replace("<br>", "")
        .trim()
        .to_string()
}

/// Split a class column into one entry per line.
///
/// Categories are separated by `:` or `：` and a third category by `/` or
/// `／`; a line without a separator is a single top-level category.
#[must_use]
pub fn parse_classes(raw: &str) -> Vec<CardClass> {
    raw.replace("<br />", "\n")
        .replace("<br/>", "\n")
        .replace("<br>", "\n")
        .lines()
        .map(str::trim)
        .filter(|line| !is_placeholder(line))
        .map(parse_class)
        .collect()
}

fn non_empty(s: &str) -> Option<&str> {
    Some(s.trim()).filter(|s| !s.is_empty())
}

fn parse_class(line: &str) -> CardClass {
    let class = match line.split_once(':').or_else(|| line.split_once('：')) {
        None => CardClass::new(line, None, None),
        Some((cat1, rest)) => match rest.split_once('/').or_else(|| rest.split_once('／')) {
            Some((cat2, cat3)) => CardClass::new(cat1.trim(), non_empty(cat2), non_empty(cat3)),
            None => CardClass::new(cat1.trim(), non_empty(rest), None),
        },
    };
    normalize_class(class)
}

/// Correct known misprints and spelling variants on the card pages.
fn normalize_class(mut class: CardClass) -> CardClass {
    if class.category1 == "奏生" && class.category2.as_deref() == Some("植物") {
        class.category1 = "奏羅".to_string();
    }
    if class.category2.as_deref() == Some("ウエポン") {
        class.category2 = Some("ウェポン".to_string());
    }
    if class.category2.as_deref() == Some("バーチャル")
        && class.category3.as_deref() == Some("世怜音女学院")
    {
        class.category3 = None;
    }
    class
}

/// OR of every phase label found in `text`.
#[must_use]
pub fn timing_bits(text: &str) -> u32 {
    Timing::ALL
        .iter()
        .filter(|t| text.contains(t.label()))
        .fold(0, |mask, t| mask | t.bit())
}

/// Color bits of every color character in `text`; the unknown bit when none.
#[must_use]
pub fn color_bits(text: &str) -> u32 {
    match text
        .chars()
        .filter_map(Color::from_char)
        .fold(0, |mask, c| mask | c.bit())
    {
        0 => Color::Unknown.bit(),
        mask => mask,
    }
}

/// Legality mask of the narrowest format whose icon is present; all three
/// formats when there is none.
#[must_use]
pub fn format_bits(markup: &str) -> u32 {
    Format::ALL
        .iter()
        .find(|f| f.icon().is_some_and(|icon| markup.contains(icon)))
        .map_or(Format::DEFAULT_MASK, |f| f.legal_mask())
}

/// Convert cost notation such as `《白》×３《無》×１` to `w3l1`.
///
/// Returns `None` when the text is not in that notation.
#[must_use]
pub fn convert_cost(text: &str) -> Option<String> {
    let text = to_half_width(text);
    let mut out = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '《' {
            continue;
        }
        let mut symbol = String::new();
        for next in chars.by_ref() {
            if next == '》' {
                break;
            }
            symbol.push(next);
        }
        let code = cost_code(&symbol)?;
        if chars.next() != Some('×') {
            return None;
        }
        let mut count = String::new();
        while let Some(d) = chars.next_if(char::is_ascii_digit) {
            count.push(d);
        }
        let count: u32 = count.parse().ok()?;
        out.push(code);
        out.push_str(&count.to_string());
    }
    (!out.is_empty()).then_some(out)
}

fn cost_code(symbol: &str) -> Option<char> {
    if symbol.contains("コイン") {
        return Some('c');
    }
    if symbol == "?" {
        return Some(Color::Unknown.code());
    }
    let mut chars = symbol.chars();
    match (chars.next().and_then(Color::from_char), chars.next()) {
        (Some(color), None) => Some(color.code()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    fn current(raw: &[&str]) -> DefinitionList {
        DefinitionList {
            layout: Layout::Current,
            values: values(raw),
        }
    }

    const SIGNI_ROW: [&str; 12] = [
        "シグニ",
        "奏羅：宇宙",
        "白",
        "2",
        "-",
        "《白》×１",
        "-",
        "5000",
        "-",
        "-",
        "<img src=\"/images/icon_txt_format_key.png\">",
        "",
    ];

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn signi_current_layout() {
        let mapped = map_fields(CardType::Signi, &current(&SIGNI_ROW)).expect("signi has a table");
        assert_eq!(
            mapped.classes(Field::CardClass),
            [CardClass::new("奏羅", Some("宇宙"), None)]
        );
        assert_eq!(mapped.bits(Field::Color), Some(Color::White.bit()));
        assert_eq!(mapped.integer(Field::Level), Some(2));
        assert_eq!(mapped.text(Field::Cost), Some("w1"));
        assert_eq!(mapped.text(Field::Power), Some("5000"));
        assert_eq!(mapped.bits(Field::Format), Some(3));
        assert_eq!(mapped.text(Field::Story), None);
        assert!(mapped.position_misses.is_empty());
        assert!(mapped.coercion_misses.is_empty());
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn lrig_reads_grow_cost_and_limit() {
        let row = [
            "ルリグ",
            "タマ",
            "白",
            "3",
            "《白》×２",
            "-",
            "7",
            "-",
            "-",
            "-",
            "",
            "<img src=\"icon_txt_dissona.png\">",
        ];
        let mapped = map_fields(CardType::Lrig, &current(&row)).expect("lrig has a table");
        assert_eq!(mapped.text(Field::Cost), Some("w2"));
        assert_eq!(mapped.integer(Field::Limit), Some(7));
        assert_eq!(mapped.text(Field::Story), Some(DISSONA));
        assert_eq!(mapped.bits(Field::Format), None);
        assert_eq!(
            mapped.classes(Field::CardClass),
            [CardClass::new("タマ", None, None)]
        );
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn legacy_signi_row() {
        let list = DefinitionList {
            layout: Layout::Legacy,
            values: values(&["シグニ", "...", "...", "3", "500", "-", "2000", "main"]),
        };
        let mapped = map_fields(CardType::Signi, &list).expect("signi has a table");
        assert_eq!(mapped.integer(Field::Level), Some(3));
        assert_eq!(mapped.integer(Field::Limit), None);
        assert_eq!(mapped.text(Field::Power), Some("2000"));
        assert_eq!(mapped.bits(Field::Timing), None);
        assert_eq!(mapped.text(Field::Cost), Some("500"));
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn short_row_records_position_misses() {
        let mapped = map_fields(CardType::Signi, &current(&["シグニ", "x"])).expect("table");
        assert!(mapped.position_misses.contains(&Field::Color));
        assert!(mapped.position_misses.contains(&Field::Power));
        assert!(!mapped.position_misses.contains(&Field::CardClass));
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn unparseable_integer_is_a_coercion_miss() {
        let mut row = SIGNI_ROW;
        row[3] = "レベル";
        let mapped = map_fields(CardType::Signi, &current(&row)).expect("table");
        assert_eq!(mapped.integer(Field::Level), None);
        assert_eq!(
            mapped.coercion_misses,
            vec![CoercionMiss {
                field: Field::Level,
                raw: "レベル".to_string()
            }]
        );
    }

    #[test]
    fn placeholder_is_absent_for_every_type_and_field() {
        for card_type in CardType::ALL {
            let Some(table) = table_for(card_type) else {
                continue;
            };
            for raw in ["-", "", " - "] {
                let mut row = vec![card_type.label().to_string()];
                row.extend(std::iter::repeat_n(raw.to_string(), 11));
                let mapped = map_with(table, Layout::Current, &row);
                assert!(mapped.values.is_empty(), "{card_type} with {raw:?}");
                assert!(mapped.coercion_misses.is_empty());
                assert!(mapped.position_misses.is_empty());
            }
        }
    }

    #[test]
    fn coin_has_no_table() {
        assert!(matches!(
            map_fields(CardType::Coin, &current(&["コイン"])),
            Err(AnalysisError::UnsupportedCardType {
                card_type: CardType::Coin
            })
        ));
    }

    #[test]
    fn timing_labels_or_together() {
        let bits = timing_bits("【メインフェイズ】<br>【アタックフェイズ】");
        assert_eq!(bits, Timing::MainPhase.bit() | Timing::AttackPhase.bit());
        assert_eq!(timing_bits("main"), 0);

        let mut row = vec!["アーツ"; 12];
        row[9] = "よくわからない";
        let mapped = map_with(ARTS, Layout::Current, &values(&row));
        assert_eq!(mapped.bits(Field::Timing), None);
        assert_eq!(mapped.coercion_misses.len(), 1);
    }

    #[test]
    fn cost_notation() {
        assert_eq!(convert_cost("《白》×３《無》×１").as_deref(), Some("w3l1"));
        assert_eq!(convert_cost("《青》×0").as_deref(), Some("u0"));
        assert_eq!(convert_cost("《コインアイコン》×１").as_deref(), Some("c1"));
        assert_eq!(convert_cost("《紫》×１"), None);
        assert_eq!(convert_cost("《白》1"), None);
        assert_eq!(convert_cost("500"), None);
    }

    #[test]
    fn color_scan() {
        assert_eq!(color_bits("白黒"), Color::White.bit() | Color::Black.bit());
        assert_eq!(color_bits("無"), Color::Colorless.bit());
        assert_eq!(color_bits("???"), Color::Unknown.bit());
    }

    #[test]
    fn format_icons() {
        assert_eq!(format_bits(""), 7);
        assert_eq!(format_bits("<img src=\"icon_txt_format_key.png\">"), 3);
        assert_eq!(format_bits("<img src=\"icon_txt_format_diva.png\">"), 1);
        // the narrowest format wins
        assert_eq!(
            format_bits("<img src=\"icon_txt_format_key.png\"><img src=\"icon_txt_format_diva.png\">"),
            1
        );
    }

    #[test]
    fn class_column_splits_into_categories() {
        assert_eq!(
            parse_classes("精像：美巧/電機<br>精武：ウエポン<br />精元"),
            vec![
                CardClass::new("精像", Some("美巧"), Some("電機")),
                CardClass::new("精武", Some("ウェポン"), None),
                CardClass::new("精元", None, None),
            ]
        );
        assert_eq!(
            parse_classes("奏羅:宇宙／怪異"),
            vec![CardClass::new("奏羅", Some("宇宙"), Some("怪異"))]
        );
        assert!(parse_classes(" - ").is_empty());
    }

    #[test]
    fn class_misprints_are_corrected() {
        assert_eq!(
            parse_classes("奏生：植物"),
            vec![CardClass::new("奏羅", Some("植物"), None)]
        );
        // only the plant misprint moves to 奏羅
        assert_eq!(
            parse_classes("奏生：水獣"),
            vec![CardClass::new("奏生", Some("水獣"), None)]
        );
        assert_eq!(
            parse_classes("電音部：バーチャル/世怜音女学院"),
            vec![CardClass::new("電音部", Some("バーチャル"), None)]
        );
    }

    #[test]
    fn breaks_are_flattened() {
        assert_eq!(flatten_breaks(" 奏羅<br>\n宇宙<br />"), "奏羅宇宙");
    }
}
