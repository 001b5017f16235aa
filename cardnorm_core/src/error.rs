use thiserror::Error;

use crate::card_type::CardType;

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Why a single record could not be analysed.
///
/// The `Display` text is what gets stored as the record's error note.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no definition-list anchor found.")]
    NoAnchor,

    #[error("unknown card type: {label}")]
    UnknownCardType { label: String },

    #[error("unsupported card type: {card_type}")]
    UnsupportedCardType { card_type: CardType },

    #[error("storage error: {0}")]
    Storage(anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_are_human_readable() {
        assert_eq!(
            AnalysisError::NoAnchor.to_string(),
            "no definition-list anchor found."
        );
        assert_eq!(
            AnalysisError::UnsupportedCardType {
                card_type: CardType::Coin
            }
            .to_string(),
            "unsupported card type: coin"
        );
    }
}
