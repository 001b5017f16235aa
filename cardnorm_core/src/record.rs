use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    #[default]
    Pending,
    Done,
    Errored,
}

impl AnalysisStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
            Self::Errored => "errored",
        }
    }
}

impl std::fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AnalysisStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "done" => Ok(Self::Done),
            "errored" => Ok(Self::Errored),
            _ => Err(anyhow::anyhow!("unknown analysis status: {s}")),
        }
    }
}

/// A card page as captured by the scraper.
///
/// Only the analysis fields (`status`, `last_analyzed_at`, `analysis_error`)
/// are ever written by this workspace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawRecord {
    pub id: i64,
    pub card_number: String,
    pub name: String,
    pub product_id: Option<i64>,
    pub raw_html: String,
    pub skill_text: String,
    pub life_burst_text: String,
    pub source_url: String,
    pub scraped_at: DateTime<Utc>,
    pub status: AnalysisStatus,
    pub last_analyzed_at: Option<DateTime<Utc>>,
    pub analysis_error: Option<String>,
}

impl RawRecord {
    /// A freshly captured, pending record.
    #[must_use]
    pub fn new(id: i64, card_number: &str, name: &str, raw_html: &str) -> Self {
        Self {
            id,
            card_number: card_number.to_string(),
            name: name.to_string(),
            product_id: None,
            raw_html: raw_html.to_string(),
            skill_text: String::new(),
            life_burst_text: String::new(),
            source_url: String::new(),
            scraped_at: Utc::now(),
            status: AnalysisStatus::Pending,
            last_analyzed_at: None,
            analysis_error: None,
        }
    }

    #[must_use]
    pub fn with_skill_text(mut self, text: &str) -> Self {
        self.skill_text = text.to_string();
        self
    }

    #[must_use]
    pub fn with_life_burst_text(mut self, text: &str) -> Self {
        self.life_burst_text = text.to_string();
        self
    }

    #[must_use]
    pub const fn with_product(mut self, product_id: i64) -> Self {
        self.product_id = Some(product_id);
        self
    }

    #[must_use]
    pub fn with_source_url(mut self, url: &str) -> Self {
        self.source_url = url.to_string();
        self
    }
}
