#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions
)]

pub mod bits;
pub mod card;
pub mod card_type;
pub mod error;
pub mod feature;
pub mod record;
pub mod repository;
pub mod rule;
pub mod util;

pub use bits::{BitSymbol, Color, Format, Timing};
pub use card::{CardClass, HasBurst, NormalizedCard};
pub use card_type::CardType;
pub use error::AnalysisError;
pub use feature::{BurstFeature, CardFeature, FeatureBits, FeatureRef, FeatureSlot};
pub use record::{AnalysisStatus, RawRecord};
pub use repository::{CardRepo, CardStore, FeatureOverrideRepo, RawRecordRepo, RulePatternRepo};
pub use rule::{CardFeatureOverride, RulePattern};
pub use util::{to_half_width, truncate_bytes};
