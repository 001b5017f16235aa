//! Batch analysis against the in-memory store.

mod common;

use std::sync::Arc;
use std::time::Duration;

use cardnorm_analyze::{AnalysisOrchestrator, BatchOptions, MemoryStore, StopSignal};
use cardnorm_core::{
    AnalysisStatus, BurstFeature, CardClass, CardFeature, CardFeatureOverride, CardRepo, CardType,
    FeatureBits, Format, FeatureRef, HasBurst, RawRecord, RawRecordRepo, RulePattern, Timing,
};
use cardnorm_core::bits::encode;
use chrono::{Duration as ChronoDuration, Utc};

use common::{ARTS, current_page, legacy_page, signi_record};

fn rules() -> Vec<RulePattern> {
    vec![
        RulePattern::new(1, "ドロー", r"カードを\d+枚引く", &["Draw", "burst:Draw"]),
        RulePattern::new(2, "バニッシュ", "バニッシュする", &["Banish", "burst:Banish"]),
        RulePattern::new(3, "アタック時", "アタックしたとき", &["OnAttack"]),
    ]
}

async fn store_with(records: &[RawRecord]) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for r in records {
        store.insert_raw(r).await.ok();
    }
    for rule in rules() {
        store.add_rule(rule).await;
    }
    store
}

fn orchestrator(store: &Arc<MemoryStore>) -> AnalysisOrchestrator {
    AnalysisOrchestrator::new(store.clone())
}

#[tokio::test]
#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
async fn legacy_anchor_signi_is_normalized() {
    let html = legacy_page(&["シグニ", "...", "...", "3", "500", "-", "2000", "main"]);
    let store = store_with(&[RawRecord::new(0, "WX01-001", "ウリス", &html)]).await;

    let summary = orchestrator(&store)
        .run_batch(BatchOptions::default())
        .await
        .expect("batch runs");
    assert_eq!((summary.processed, summary.succeeded, summary.failed), (1, 1, 0));

    let card = store
        .find_card_by_code("WX01-001")
        .await
        .expect("lookup")
        .expect("card written");
    assert_eq!(card.card_type, CardType::Signi);
    assert_eq!(card.level, Some(3));
    assert_eq!(card.limit, None);
    assert_eq!(card.power.as_deref(), Some("2000"));
    assert_eq!(card.timing, None);

    let record = store.raw_record(1).await.expect("record exists");
    assert_eq!(record.status, AnalysisStatus::Done);
    assert!(record.analysis_error.is_none());
    assert!(record.last_analyzed_at.is_some());
}

#[tokio::test]
#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
async fn record_without_anchor_is_errored_and_writes_no_card() {
    let html = "<div><dl><dt>カード名</dt><dd>x</dd></dl></div>";
    let store = store_with(&[RawRecord::new(0, "WX01-002", "x", html)]).await;

    let summary = orchestrator(&store)
        .run_batch(BatchOptions::default())
        .await
        .expect("batch runs");
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures[0].card_number, "WX01-002");
    assert_eq!(summary.failures[0].note, "no definition-list anchor found.");

    let record = store.raw_record(1).await.expect("record exists");
    assert_eq!(record.status, AnalysisStatus::Errored);
    assert_eq!(
        record.analysis_error.as_deref(),
        Some("no definition-list anchor found.")
    );
    assert_eq!(store.count_cards().await.expect("count"), 0);
}

#[tokio::test]
#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
async fn one_failure_does_not_abort_the_batch() {
    let records = [
        signi_record("WX02-001", "エルドラ＜えるどら＞"),
        RawRecord::new(0, "WX02-002", "謎", &current_page(&["マジック", "x"])),
        RawRecord::new(0, "WX02-003", "コイン", &current_page(&["コイン"])),
        RawRecord::new(0, "WX02-004", "アーツ", &current_page(&ARTS)),
    ];
    let store = store_with(&records).await;

    let summary = orchestrator(&store)
        .run_batch(BatchOptions::default())
        .await
        .expect("batch runs");
    assert_eq!(summary.processed, 4);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 2);
    let notes: Vec<&str> = summary.failures.iter().map(|f| f.note.as_str()).collect();
    assert_eq!(
        notes,
        vec!["unknown card type: マジック", "unsupported card type: coin"]
    );

    let arts = store
        .find_card_by_code("WX02-004")
        .await
        .expect("lookup")
        .expect("arts written");
    assert_eq!(arts.cost.as_deref(), Some("r2l1"));
    assert_eq!(
        arts.timing,
        Some(encode([Timing::MainPhase, Timing::AttackPhase]))
    );
    // a key selection card is also legal in diva selection
    assert_eq!(arts.format, 3);
    assert_eq!(arts.format, Format::KeySelection.legal_mask());
    assert!(arts.classes.is_empty());
    assert_eq!(arts.has_burst, HasBurst::NotApplicable);
}

#[tokio::test]
#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
async fn skill_and_burst_features_are_recorded() {
    let store = store_with(&[signi_record("WX03-001", "エルドラ＜えるどら＞")]).await;
    orchestrator(&store)
        .run_batch(BatchOptions::default())
        .await
        .expect("batch runs");

    let card = store
        .find_card_by_code("WX03-001")
        .await
        .expect("lookup")
        .expect("card written");
    assert_eq!(card.has_burst, HasBurst::Yes);
    assert_eq!(card.pronunciation, "えるどら");
    assert_eq!(
        card.features.card_features(),
        vec![CardFeature::Draw, CardFeature::Banish]
    );
    assert_eq!(card.features.burst_features(), vec![BurstFeature::Banish]);
}

#[tokio::test]
#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
async fn override_replaces_rule_output_for_shared_pronunciation() {
    let store = store_with(&[
        signi_record("WX04-001", "エルドラ＜えるどら＞"),
        signi_record("WX04-002", "エルドラ＜えるどら＞"),
        signi_record("WX04-003", "ミルルン＜みるるん＞"),
    ])
    .await;
    let fixed = FeatureBits::from_refs(&[
        FeatureRef::Card(CardFeature::Freeze),
        FeatureRef::Burst(BurstFeature::Freeze),
    ]);
    store
        .add_override(CardFeatureOverride::new("えるどら", fixed, "hand checked"))
        .await;

    orchestrator(&store)
        .run_batch(BatchOptions::default())
        .await
        .expect("batch runs");

    for code in ["WX04-001", "WX04-002"] {
        let card = store
            .find_card_by_code(code)
            .await
            .expect("lookup")
            .expect("card written");
        assert_eq!(card.features, fixed, "{code}");
    }
    let other = store
        .find_card_by_code("WX04-003")
        .await
        .expect("lookup")
        .expect("card written");
    assert_ne!(other.features, fixed);
    assert!(other.features.card_features().contains(&CardFeature::Draw));
}

#[tokio::test]
#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
async fn rule_creation_order_does_not_change_masks() {
    let record = signi_record("WX05-001", "エルドラ");

    let mut results = Vec::new();
    for offset in 0..3_i64 {
        let store = Arc::new(MemoryStore::new());
        store.insert_raw(&record).await.expect("insert");
        let mut shuffled = rules();
        shuffled.rotate_left(usize::try_from(offset).expect("small offset"));
        for (i, mut rule) in shuffled.into_iter().enumerate() {
            let age = i64::try_from(i).expect("small index");
            rule.created_at = Utc::now() - ChronoDuration::minutes(age * 10 + offset);
            store.add_rule(rule).await;
        }
        orchestrator(&store)
            .run_batch(BatchOptions::default())
            .await
            .expect("batch runs");
        let card = store
            .find_card_by_code("WX05-001")
            .await
            .expect("lookup")
            .expect("card written");
        results.push(card.features);
    }
    assert!(results.windows(2).all(|w| w[0] == w[1]));
}

#[tokio::test]
#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
async fn reanalysis_after_reset_is_identical() {
    let store = store_with(&[signi_record("WX06-001", "エルドラ＜えるどら＞")]).await;
    let orchestrator = orchestrator(&store);

    orchestrator
        .run_batch(BatchOptions::default())
        .await
        .expect("first batch");
    let first = store
        .find_card_by_code("WX06-001")
        .await
        .expect("lookup")
        .expect("card written");

    let empty = orchestrator
        .run_batch(BatchOptions::default())
        .await
        .expect("nothing pending");
    assert_eq!(empty.processed, 0);

    assert_eq!(orchestrator.reset("WX06-001").await.expect("reset"), 1);
    let record = store.raw_record(1).await.expect("record exists");
    assert_eq!(record.status, AnalysisStatus::Pending);
    assert!(record.last_analyzed_at.is_none());

    orchestrator
        .run_batch(BatchOptions::default())
        .await
        .expect("second batch");
    let second = store
        .find_card_by_code("WX06-001")
        .await
        .expect("lookup")
        .expect("card written");
    assert_eq!(first, second);
    assert_eq!(store.count_cards().await.expect("count"), 1);
}

#[tokio::test]
#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
async fn storage_failure_marks_record_errored() {
    let store = store_with(&[
        signi_record("WX07-001", "a"),
        signi_record("WX07-002", "b"),
    ])
    .await;
    store.reject_commits_for("WX07-001").await;

    let summary = orchestrator(&store)
        .run_batch(BatchOptions::default())
        .await
        .expect("batch runs");
    assert_eq!((summary.succeeded, summary.failed), (1, 1));
    assert!(summary.failures[0].note.starts_with("storage error:"));

    assert!(
        store
            .find_card_by_code("WX07-001")
            .await
            .expect("lookup")
            .is_none()
    );
    let record = store.raw_record(1).await.expect("record exists");
    assert_eq!(record.status, AnalysisStatus::Errored);
}

#[tokio::test]
#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
async fn stop_signal_and_budget_leave_records_pending() {
    let records: Vec<RawRecord> = (1..=3)
        .map(|i| signi_record(&format!("WX08-00{i}"), "x"))
        .collect();

    let store = store_with(&records).await;
    let stop = StopSignal::new();
    stop.stop();
    let summary = orchestrator(&store)
        .with_stop_signal(stop)
        .run_batch(BatchOptions::default())
        .await
        .expect("batch runs");
    assert!(summary.stopped_early);
    assert_eq!(summary.processed, 0);
    assert_eq!(store.list_pending(0, None).await.expect("list").len(), 3);

    let summary = orchestrator(&store)
        .run_batch(BatchOptions {
            time_budget: Some(Duration::ZERO),
            ..BatchOptions::default()
        })
        .await
        .expect("batch runs");
    assert!(summary.stopped_early);
    assert_eq!(store.list_pending(0, None).await.expect("list").len(), 3);

    let summary = orchestrator(&store)
        .run_batch(BatchOptions {
            limit: Some(2),
            page_size: Some(1),
            ..BatchOptions::default()
        })
        .await
        .expect("batch runs");
    assert!(!summary.stopped_early);
    assert_eq!(summary.processed, 2);
    assert_eq!(store.list_pending(0, None).await.expect("list").len(), 1);
}

#[tokio::test]
#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
async fn unknown_rule_features_are_reported_in_summary() {
    let store = store_with(&[signi_record("WX09-001", "x")]).await;
    let summary = orchestrator(&store)
        .run_batch(BatchOptions::default())
        .await
        .expect("batch runs");
    // rule 3 names a feature that does not exist
    assert_eq!(summary.rule_problems.len(), 1);
    assert!(summary.rule_problems[0].contains("OnAttack"));
    assert_eq!(summary.succeeded, 1);
}

#[tokio::test]
#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
async fn check_rules_reports_example_failures() {
    let store = Arc::new(MemoryStore::new());
    store
        .add_rule(
            RulePattern::new(1, "ドロー", r"カードを\d+枚引く", &["Draw"])
                .with_examples(&["カードを１枚引く"], &["カードを引く"]),
        )
        .await;
    store
        .add_rule(
            RulePattern::new(2, "凍結", "凍結", &["Freeze"]).with_examples(&[], &["凍結しない"]),
        )
        .await;

    let problems = orchestrator(&store).check_rules().await.expect("rules load");
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].rule_id(), 2);
}

#[test]
fn batch_summary_serializes() {
    let summary = cardnorm_analyze::BatchSummary {
        run_id: uuid::Uuid::now_v7(),
        started_at: Utc::now(),
        finished_at: Utc::now(),
        processed: 1,
        succeeded: 0,
        failed: 1,
        failures: vec![cardnorm_analyze::BatchFailure {
            card_number: "X".to_string(),
            note: "no definition-list anchor found.".to_string(),
        }],
        stopped_early: false,
        rule_problems: Vec::new(),
    };
    let json = serde_json::to_value(&summary).unwrap_or_default();
    assert_eq!(json["failed"], 1);
    assert_eq!(json["failures"][0]["card_number"], "X");
}

#[tokio::test]
#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
async fn small_pages_cover_every_pending_record() {
    let mut records: Vec<RawRecord> = (1..=5)
        .map(|i| signi_record(&format!("WX11-00{i}"), "x"))
        .collect();
    records[1] = RawRecord::new(0, "WX11-002", "x", "<p>no list</p>");
    let store = store_with(&records).await;

    let summary = orchestrator(&store)
        .run_batch(BatchOptions {
            page_size: Some(2),
            ..BatchOptions::default()
        })
        .await
        .expect("batch runs");
    assert_eq!((summary.processed, summary.succeeded, summary.failed), (5, 4, 1));
    assert!(!summary.stopped_early);
    assert!(store.list_pending(0, None).await.expect("list").is_empty());
    assert_eq!(store.count_cards().await.expect("count"), 4);
}

#[tokio::test]
#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
async fn rewrite_rules_shape_stored_text_and_features() {
    let record = signi_record("WX12-001", "x")
        .with_life_burst_text("ライフバースト：対戦相手のシグニ１体をバニッシュする。");
    let store = store_with(&[record]).await;
    store
        .add_rule(
            RulePattern::new(10, "ライフバースト", "ライフバースト:", &["Draw"])
                .with_replacement("LB:"),
        )
        .await;

    orchestrator(&store)
        .run_batch(BatchOptions::default())
        .await
        .expect("batch runs");
    let card = store
        .find_card_by_code("WX12-001")
        .await
        .expect("lookup")
        .expect("card written");
    assert_eq!(card.burst_text, "LB:対戦相手のシグニ1体をバニッシュする。");
    assert_eq!(card.skill_text, "【自】:このシグニがアタックしたとき、カードを1枚引く。");
    let features = card.features.card_features();
    assert!(features.contains(&CardFeature::Draw));
    assert!(features.contains(&CardFeature::Banish));
    assert_eq!(
        card.classes,
        vec![CardClass::new("奏羅", Some("宇宙"), None)]
    );
}
