use std::collections::HashMap;

use cardnorm_core::{CardFeatureOverride, FeatureBits, FeatureOverrideRepo};
use tracing::debug;

/// Manual feature corrections keyed by pronunciation, frozen for one batch.
#[derive(Debug, Clone, Default)]
pub struct OverrideResolver {
    by_pronunciation: HashMap<String, FeatureBits>,
}

impl OverrideResolver {
    #[must_use]
    pub fn new(overrides: impl IntoIterator<Item = CardFeatureOverride>) -> Self {
        Self {
            by_pronunciation: overrides
                .into_iter()
                .map(|o| {
                    let bits = o.bits();
                    (o.pronunciation, bits)
                })
                .collect(),
        }
    }

    pub async fn snapshot<R: FeatureOverrideRepo + ?Sized>(repo: &R) -> anyhow::Result<Self> {
        let resolver = Self::new(repo.list_overrides().await?);
        debug!("Loaded {} feature overrides", resolver.len());
        Ok(resolver)
    }

    #[must_use]
    pub fn lookup(&self, pronunciation: &str) -> Option<FeatureBits> {
        self.by_pronunciation.get(pronunciation).copied()
    }

    /// The override's masks when one exists, otherwise `computed`.
    ///
    /// An override replaces all three masks; it is not merged.
    #[must_use]
    pub fn resolve(&self, pronunciation: &str, computed: FeatureBits) -> FeatureBits {
        self.lookup(pronunciation).unwrap_or(computed)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_pronunciation.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_pronunciation.is_empty()
    }
}
