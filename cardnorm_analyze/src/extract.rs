//! Definition-list extraction from captured card markup.
//!
//! Card pages describe a card as a `<dl>` of `<dt>label</dt><dd>value</dd>`
//! pairs. Only the `<dd>` values matter here; their position identifies the
//! field, and the first one is the card-type label.

use once_cell::sync::Lazy;
use regex::Regex;

/// Which page generation the markup comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Anchored by `カード種類`, with separate grow-cost and cost columns.
    Current,
    /// Anchored by `種類`, with a single cost column.
    Legacy,
}

impl Layout {
    /// Translate a current-layout column to this layout's column.
    #[must_use]
    pub const fn position(self, current: usize) -> usize {
        match self {
            Self::Current => current,
            Self::Legacy => match current {
                0..=3 => current,
                4 | 5 => 4,
                _ => current - 1,
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Anchor {
    pub marker: &'static str,
    pub layout: Layout,
}

/// Anchors in priority order.
pub const ANCHORS: [Anchor; 2] = [
    Anchor {
        marker: "<dt>カード種類</dt>",
        layout: Layout::Current,
    },
    Anchor {
        marker: "<dt>種類</dt>",
        layout: Layout::Legacy,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionList {
    pub layout: Layout,
    pub values: Vec<String>,
}

impl DefinitionList {
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&str> {
        self.values.get(position).map(String::as_str)
    }

    /// The card-type label, if any value was found.
    #[must_use]
    pub fn type_label(&self) -> Option<&str> {
        self.get(0)
    }
}

/// Extract with the standard anchors.
#[must_use]
pub fn extract(html: &str) -> Option<DefinitionList> {
    extract_with(html, &ANCHORS)
}

/// Locate the first anchor present in `html` and collect the value of every
/// `<dt>`/`<dd>` pair from the anchor onwards.
///
/// Returns `None` when no anchor is present.
#[must_use]
pub fn extract_with(html: &str, anchors: &[Anchor]) -> Option<DefinitionList> {
    let (start, layout) = anchors
        .iter()
        .find_map(|a| html.find(a.marker).map(|i| (i, a.layout)))?;
    Some(DefinitionList {
        layout,
        values: dd_values(&html[start..]),
    })
}

#[expect(clippy::expect_used, reason = "Static pattern is checked by the tests")]
static DEFINITION_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<dt>([^<]+)</dt>\s*<dd(?:\s[^>]*)?>(.*?)</dd>")
        .expect("definition pair pattern must compile")
});

/// Trimmed `<dd>` content of each complete pair, in document order.
fn dd_values(html: &str) -> Vec<String> {
    DEFINITION_PAIR
        .captures_iter(html)
        .filter_map(|c| c.get(2))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}
