//! Batch analysis over pending raw records.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use cardnorm_core::{AnalysisError, CardStore, RawRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::matcher::{RuleError, RuleSet, validate_examples};
use crate::overrides::OverrideResolver;
use crate::pipeline::CardAnalyzer;

/// Cooperative cancellation flag, checked between records.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Pending records read per query when no page size is given.
pub const DEFAULT_PAGE_SIZE: u64 = 200;

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Maximum number of pending records to take.
    pub limit: Option<u64>,
    /// Wall-clock budget; records not reached stay pending.
    pub time_budget: Option<Duration>,
    /// Pending records read per query; [`DEFAULT_PAGE_SIZE`] when unset.
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub card_number: String,
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<BatchFailure>,
    /// Set when the stop signal or the time budget ended the batch.
    pub stopped_early: bool,
    /// Rules skipped or partially applied during this batch.
    pub rule_problems: Vec<String>,
}

pub struct AnalysisOrchestrator {
    store: Arc<dyn CardStore>,
    stop: StopSignal,
}

impl AnalysisOrchestrator {
    #[must_use]
    pub fn new(store: Arc<dyn CardStore>) -> Self {
        Self {
            store,
            stop: StopSignal::new(),
        }
    }

    #[must_use]
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    #[must_use]
    pub const fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    /// Analyse pending records one at a time.
    ///
    /// Rules and overrides are read once, before the first record. A failing
    /// record is marked errored and the batch moves on; only failures to read
    /// the batch inputs abort it.
    pub async fn run_batch(&self, options: BatchOptions) -> anyhow::Result<BatchSummary> {
        let run_id = Uuid::now_v7();
        let started_at = Utc::now();
        let clock = Instant::now();

        let (rules, problems) = RuleSet::compile(&self.store.list_active_rules().await?);
        let overrides = OverrideResolver::snapshot(self.store.as_ref()).await?;
        let analyzer = CardAnalyzer::new(&rules, &overrides);
        info!(
            "Batch {run_id}: {} rules, {} overrides",
            rules.len(),
            overrides.len()
        );

        let mut summary = BatchSummary {
            run_id,
            started_at,
            finished_at: started_at,
            processed: 0,
            succeeded: 0,
            failed: 0,
            failures: Vec::new(),
            stopped_early: false,
            rule_problems: problems.iter().map(ToString::to_string).collect(),
        };

        // Records are paged by id, so a record left pending by a failed
        // status write is not read again in this batch.
        let page_size = options.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
        let mut remaining = options.limit;
        let mut cursor = 0;
        'pages: loop {
            let want = remaining.map_or(page_size, |r| r.min(page_size));
            if want == 0 {
                break;
            }
            let page = self.store.list_pending(cursor, Some(want)).await?;
            let Some(last) = page.last() else {
                break;
            };
            debug!(
                "Batch {run_id}: {} pending records after id {cursor}",
                page.len()
            );
            cursor = last.id;
            let taken = u64::try_from(page.len()).unwrap_or(u64::MAX);
            remaining = remaining.map(|r| r.saturating_sub(taken));

            for record in &page {
                if self.stop.is_stopped() {
                    info!("Batch {run_id}: stop requested");
                    summary.stopped_early = true;
                    break 'pages;
                }
                if options.time_budget.is_some_and(|b| clock.elapsed() >= b) {
                    info!("Batch {run_id}: time budget exhausted");
                    summary.stopped_early = true;
                    break 'pages;
                }
                self.run_one(&analyzer, record, &mut summary).await;
            }

            if taken < want {
                break;
            }
        }

        summary.finished_at = Utc::now();
        info!(
            "Batch {run_id}: processed {}, succeeded {}, failed {}{}",
            summary.processed,
            summary.succeeded,
            summary.failed,
            if summary.stopped_early {
                " (stopped early)"
            } else {
                ""
            }
        );
        Ok(summary)
    }

    async fn run_one(
        &self,
        analyzer: &CardAnalyzer<'_>,
        record: &RawRecord,
        summary: &mut BatchSummary,
    ) {
        summary.processed += 1;
        match self.process(analyzer, record).await {
            Ok(()) => summary.succeeded += 1,
            Err(e) => {
                let note = e.to_string();
                warn!("Analysis failed for {}: {note}", record.card_number);
                if let Err(mark) = self.store.mark_errored(record.id, &note, Utc::now()).await {
                    warn!("Could not mark {} as errored: {mark}", record.card_number);
                }
                summary.failed += 1;
                summary.failures.push(BatchFailure {
                    card_number: record.card_number.clone(),
                    note,
                });
            }
        }
    }

    async fn process(
        &self,
        analyzer: &CardAnalyzer<'_>,
        record: &RawRecord,
    ) -> Result<(), AnalysisError> {
        let analysis = analyzer.analyze(record)?;
        if !analysis.position_misses.is_empty() || !analysis.coercion_misses.is_empty() {
            debug!(
                "{}: {} position misses, {} coercion misses",
                record.card_number,
                analysis.position_misses.len(),
                analysis.coercion_misses.len()
            );
        }
        self.store
            .commit_done(record.id, &analysis.card, Utc::now())
            .await
            .map_err(AnalysisError::Storage)
    }

    /// Move every record with this card number back to pending.
    pub async fn reset(&self, card_number: &str) -> anyhow::Result<u64> {
        let count = self.store.reset_to_pending(card_number).await?;
        info!("Reset {count} records for {card_number}");
        Ok(count)
    }

    pub async fn reset_all(&self) -> anyhow::Result<u64> {
        let count = self.store.reset_all().await?;
        info!("Reset {count} records");
        Ok(count)
    }

    /// Check every active rule against its positive and negative examples.
    pub async fn check_rules(&self) -> anyhow::Result<Vec<RuleError>> {
        let rules = self.store.list_active_rules().await?;
        Ok(validate_examples(&rules))
    }
}
