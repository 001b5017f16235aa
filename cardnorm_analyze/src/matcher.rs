//! Rule-pattern matching over skill and life-burst text.
//!
//! Matching runs in two passes. Rewrite rules (those with a replacement) run
//! one after another in id order, each adding its features and then replacing
//! its matches. Detection rules then run in parallel over the rewritten text.

use cardnorm_core::{FeatureBits, FeatureRef, RulePattern, to_half_width};
use rayon::prelude::*;
use regex::{NoExpand, Regex};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule {id} ({keyword}): invalid pattern: {source}")]
    InvalidPattern {
        id: i64,
        keyword: String,
        source: regex::Error,
    },

    #[error("rule {id} ({keyword}): unknown feature name: {name}")]
    UnknownFeature {
        id: i64,
        keyword: String,
        name: String,
    },

    #[error("rule {id} ({keyword}): positive example does not match: {example}")]
    PositiveMiss {
        id: i64,
        keyword: String,
        example: String,
    },

    #[error("rule {id} ({keyword}): negative example matches: {example}")]
    NegativeHit {
        id: i64,
        keyword: String,
        example: String,
    },
}

impl RuleError {
    #[must_use]
    pub const fn rule_id(&self) -> i64 {
        match self {
            Self::InvalidPattern { id, .. }
            | Self::UnknownFeature { id, .. }
            | Self::PositiveMiss { id, .. }
            | Self::NegativeHit { id, .. } => *id,
        }
    }
}

/// A rule with its pattern compiled and its feature names resolved.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub id: i64,
    pub keyword: String,
    regex: Regex,
    bits: FeatureBits,
    replacement: Option<String>,
}

impl CompiledRule {
    /// Compile a rule. Unknown feature names are returned alongside the rule
    /// rather than failing it; the known names still count.
    pub fn compile(rule: &RulePattern) -> Result<(Self, Vec<RuleError>), RuleError> {
        let regex = Regex::new(&rule.pattern).map_err(|source| RuleError::InvalidPattern {
            id: rule.id,
            keyword: rule.keyword.clone(),
            source,
        })?;

        let mut unknown = Vec::new();
        let mut refs = Vec::with_capacity(rule.features.len());
        for name in &rule.features {
            match name.parse::<FeatureRef>() {
                Ok(r) => refs.push(r),
                Err(_) => unknown.push(RuleError::UnknownFeature {
                    id: rule.id,
                    keyword: rule.keyword.clone(),
                    name: name.clone(),
                }),
            }
        }

        Ok((
            Self {
                id: rule.id,
                keyword: rule.keyword.clone(),
                regex,
                bits: FeatureBits::from_refs(&refs),
                replacement: rule.replace_with.clone(),
            },
            unknown,
        ))
    }

    #[must_use]
    pub const fn bits(&self) -> FeatureBits {
        self.bits
    }

    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Skill text yields card features only; burst text yields card and burst
    /// features. Both texts must already be normalized.
    fn contribution(&self, skill: &str, burst: &str) -> FeatureBits {
        let mut out = FeatureBits::EMPTY;
        if !skill.is_empty() && self.is_match(skill) {
            out |= self.bits.card_only();
        }
        if !burst.is_empty() && self.is_match(burst) {
            out |= self.bits;
        }
        out
    }

    /// Replace every match with the literal replacement; `$` is not expanded.
    fn rewrite(&self, text: &str) -> String {
        match &self.replacement {
            Some(with) if !text.is_empty() => {
                self.regex.replace_all(text, NoExpand(with.as_str())).into_owned()
            }
            _ => text.to_string(),
        }
    }
}

/// Features found in a card's texts, and the texts after rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matched {
    pub features: FeatureBits,
    pub skill_text: String,
    pub burst_text: String,
}

/// The active rules of one batch.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    /// Rules with a replacement, sorted by id.
    rewrites: Vec<CompiledRule>,
    detectors: Vec<CompiledRule>,
}

impl RuleSet {
    /// Compile every active rule. Rules whose pattern does not compile are
    /// skipped; problems are logged and returned.
    #[must_use]
    pub fn compile(rules: &[RulePattern]) -> (Self, Vec<RuleError>) {
        let mut compiled = Vec::new();
        let mut problems = Vec::new();
        for rule in rules.iter().filter(|r| r.is_active) {
            match CompiledRule::compile(rule) {
                Ok((c, unknown)) => {
                    for e in &unknown {
                        warn!("{e}");
                    }
                    problems.extend(unknown);
                    compiled.push(c);
                }
                Err(e) => {
                    warn!("Skipping rule: {e}");
                    problems.push(e);
                }
            }
        }
        debug!("Compiled {} rules", compiled.len());
        let (mut rewrites, detectors): (Vec<_>, Vec<_>) =
            compiled.into_iter().partition(|r| r.replacement.is_some());
        rewrites.sort_by_key(|r| r.id);
        (
            Self {
                rewrites,
                detectors,
            },
            problems,
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rewrites.len() + self.detectors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Normalize and rewrite both texts, collecting the features of every
    /// matching rule.
    ///
    /// Rewrites are applied in id order, so listing order does not change
    /// the result. Detection is an OR fold with an empty identity, so
    /// neither rule order nor the parallel split changes it either.
    #[must_use]
    pub fn apply(&self, skill_text: &str, burst_text: &str) -> Matched {
        let mut skill = to_half_width(skill_text);
        let mut burst = to_half_width(burst_text);
        let mut features = FeatureBits::EMPTY;
        for rule in &self.rewrites {
            features |= rule.contribution(&skill, &burst);
            skill = rule.rewrite(&skill);
            burst = rule.rewrite(&burst);
        }
        features |= self
            .detectors
            .par_iter()
            .map(|r| r.contribution(&skill, &burst))
            .reduce(|| FeatureBits::EMPTY, |a, b| a | b);
        Matched {
            features,
            skill_text: skill,
            burst_text: burst,
        }
    }
}

/// Check every rule against its own examples.
///
/// Positive examples must match and negative examples must not. Examples are
/// normalized the same way card text is. Inactive rules are checked too.
#[must_use]
pub fn validate_examples(rules: &[RulePattern]) -> Vec<RuleError> {
    rules
        .par_iter()
        .flat_map_iter(|rule| match CompiledRule::compile(rule) {
            Err(e) => vec![e],
            Ok((compiled, mut problems)) => {
                problems.extend(
                    rule.positive_examples
                        .iter()
                        .filter(|ex| !compiled.is_match(&to_half_width(ex)))
                        .map(|ex| RuleError::PositiveMiss {
                            id: rule.id,
                            keyword: rule.keyword.clone(),
                            example: ex.clone(),
                        }),
                );
                problems.extend(
                    rule.negative_examples
                        .iter()
                        .filter(|ex| compiled.is_match(&to_half_width(ex)))
                        .map(|ex| RuleError::NegativeHit {
                            id: rule.id,
                            keyword: rule.keyword.clone(),
                            example: ex.clone(),
                        }),
                );
                problems
            }
        })
        .collect()
}
