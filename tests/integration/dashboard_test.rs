//! Dashboard Service Integration Tests
//!
//! Drives the full rebuild pipeline from a JSON snapshot on disk: parallel
//! per-leader loading, failure isolation, caching with explicit reload,
//! superseded rebuilds, and config-driven goal resolution.

use std::sync::Arc;
use std::time::Duration;

use campaign_core::{DateWindow, RecurrencePeriod};
use campaign_dashboard::{
    AppError, CampaignDataSource, ConfigService, DashboardConfig, DashboardRequest,
    DashboardService, SettingsUpdate, SnapshotDataSource,
};
use campaign_hierarchy::{find_node, SortDirection, SortKey, SortState, Stage};
use chrono::NaiveDate;
use serde_json::json;
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

/// Backend export for a small chapter: Maria leads Sam (explicit) and Lee
/// (roster only); Dev is a second top-level leader with no team.
fn snapshot_json() -> serde_json::Value {
    let pledge = json!({
        "action_id": "pledge",
        "name": "Sign Pledge",
        "fields": [
            {"key": "asked", "label": "Asked", "type": "boolean"},
            {"key": "signed", "label": "Signed", "type": "checkbox"}
        ],
        "has_goal": true,
        "default_individual_goal": 3,
        "goal_type": "pledges"
    });
    let calls = json!({
        "action_id": "calls",
        "name": "Phone Calls",
        "action_type": "rate_based",
        "recurrence_period": "weekly",
        "recurrence_count": 2
    });

    let mut entries = Vec::new();
    for (organizer, asked, signed) in [("100", 4, 3), ("300", 2, 0), ("400", 3, 3), ("200", 1, 1)] {
        for i in 0..5 {
            let signed_value = if i < signed { "true" } else { "false" };
            entries.push(json!({
                "organizer_vanid": organizer,
                "vanid": format!("{}-{}", organizer, i),
                "action_id": "pledge",
                "contact_name": format!("Person {}", i),
                "progress": {"asked": i < asked, "signed": signed_value}
            }));
        }
    }
    for day in ["2026-10-12", "2026-10-14", "2026-10-01"] {
        entries.push(json!({
            "organizer_vanid": "100",
            "vanid": format!("call-{}", day),
            "action_id": "calls",
            "progress": {},
            "updated_at": format!("{}T15:00:00Z", day)
        }));
    }

    json!({
        "edges": [
            {"organizer_vanid": "org", "leader_vanid": "100", "leader_name": "Maria Lopez"},
            {"organizer_vanid": "org", "leader_vanid": "200"},
            {"organizer_vanid": "org", "leader_vanid": "300", "parent_leader_vanid": "100"}
        ],
        "rosters": [
            {"teamLead": "Maria Lopez", "teamMembers": ["Sam Okafor", "Lee Chen", "Pat Unknown"], "chapter": "North"}
        ],
        "entries": entries,
        "aliases": [],
        "contacts": [
            {"vanid": "200", "first_name": "Dev", "last_name": "Patel"},
            {"vanid": "300", "first_name": "Sam", "last_name": "Okafor"},
            {"vanid": "400", "first_name": "Lee", "last_name": "Chen"}
        ],
        "campaign_goals": [{"goal_type": "pledges", "total_target": 1000}],
        "live_actions": [
            {"organizer_vanid": "100", "actions": [pledge.clone(), calls]},
            {"organizer_vanid": "200", "actions": [pledge.clone()]},
            {"organizer_vanid": "300", "chapter": "North", "actions": [pledge.clone()]},
            {"organizer_vanid": "400", "actions": [pledge]}
        ],
        "personal_goals": {
            "300": [{"action_id": "pledge", "goal_value": 2}]
        }
    })
}

fn write_snapshot(dir: &TempDir, value: &serde_json::Value) -> std::path::PathBuf {
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

fn service_with(
    value: serde_json::Value,
    config: DashboardConfig,
    latency: Option<Duration>,
) -> (DashboardService, Arc<SnapshotDataSource>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(&dir, &value);
    let mut source = SnapshotDataSource::from_file(&path).unwrap();
    if let Some(latency) = latency {
        source = source.with_latency(latency);
    }
    let source = Arc::new(source);
    let shared: Arc<dyn CampaignDataSource> = source.clone();
    let service = DashboardService::new(source.snapshot(), shared, config);
    (service, source, dir)
}

fn north() -> DashboardRequest {
    DashboardRequest::new("org").with_chapter(Some("North".to_string()))
}

// ============================================================================
// Pipeline
// ============================================================================

#[tokio::test]
async fn test_full_pipeline_from_snapshot() {
    let (service, _source, _dir) = service_with(snapshot_json(), DashboardConfig::default(), None);
    let view = service.rebuild(&north()).await.unwrap();

    // total sort: Maria (3 pledges + 3 calls) ahead of Dev (1)
    let top: Vec<&str> = view.leaders.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(top, vec!["100", "200"]);

    let maria = &view.leaders[0];
    assert_eq!(maria.name, "Maria Lopez");
    let children: Vec<&str> = maria.sub_leaders.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(children, vec!["400", "300", "unmatched:100"]);
    assert!(maria.sub_leaders.iter().all(|n| n.is_automatic));

    let pledge = &maria.action_progress["pledge"];
    assert_eq!(pledge.count, 3);
    assert_eq!(pledge.named_count, 5);
    assert_eq!(pledge.goal, 3);
    assert!(pledge.has_met_goal);
    assert_eq!(pledge.checkpoints["asked"], 4);

    // no window: every call counts toward the per-week goal of 2
    assert_eq!(maria.action_progress["calls"].count, 3);
    assert_eq!(maria.action_progress["calls"].goal, 2);

    let sam = find_node(&view.leaders, "300").unwrap();
    assert_eq!(sam.action_progress["pledge"].goal, 2);
    assert!(!sam.action_progress["pledge"].has_met_goal);

    assert_eq!(view.goal_for_action("300", "pledge"), 2);
    assert_eq!(view.goal_for_action("400", "pledge"), 3);
    assert_eq!(view.checkpoint_count("100", "pledge", "signed"), 3);
    assert_eq!(
        view.checkpoint_conversion("100", "pledge", &Stage::field("asked"), &Stage::field("signed")),
        75.0
    );

    assert_eq!(view.summary.leader_count, 4);
    let pledge_summary = view
        .summary
        .actions
        .iter()
        .find(|a| a.action_id == "pledge")
        .unwrap();
    assert_eq!(pledge_summary.leader_count, 4);
    assert_eq!(pledge_summary.count, 7);
    assert_eq!(pledge_summary.named_count, 20);
    assert_eq!(pledge_summary.leaders_met, 2);
}

#[tokio::test]
async fn test_view_serializes_camel_case() {
    let (service, _source, _dir) = service_with(snapshot_json(), DashboardConfig::default(), None);
    let view = service.rebuild(&north()).await.unwrap();
    let value = serde_json::to_value(&view).unwrap();

    assert_eq!(value["rootId"], "org");
    assert_eq!(value["sort"]["key"], "total");
    let maria = &value["leaders"][0];
    assert_eq!(maria["actionProgress"]["pledge"]["namedCount"], 5);
    assert_eq!(maria["actionProgress"]["pledge"]["hasMetGoal"], true);
    assert_eq!(maria["subLeaders"][2]["metadata"]["kind"], "unmatched_members");
}

#[tokio::test]
async fn test_chapter_scopes_rosters_and_actions() {
    let (service, _source, _dir) = service_with(snapshot_json(), DashboardConfig::default(), None);
    let request = DashboardRequest::new("org").with_chapter(Some("South".to_string()));
    let view = service.rebuild(&request).await.unwrap();

    let maria = find_node(&view.leaders, "100").unwrap();
    let children: Vec<&str> = maria.sub_leaders.iter().map(|n| n.id.as_str()).collect();
    // only the explicit edge survives; Sam's live actions are North-only
    assert_eq!(children, vec!["300"]);
    assert!(maria.sub_leaders[0].action_progress.is_empty());
}

#[tokio::test]
async fn test_weekly_window_restricts_rate_based_counts() {
    let (service, _source, _dir) = service_with(snapshot_json(), DashboardConfig::default(), None);
    let on = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
    let window = DateWindow::for_period(RecurrencePeriod::Weekly, on).unwrap();
    let view = service.rebuild(&north().with_window(Some(window))).await.unwrap();

    let maria = find_node(&view.leaders, "100").unwrap();
    assert_eq!(maria.action_progress["calls"].count, 2);
    assert!(maria.action_progress["calls"].has_met_goal);
    // one-time actions ignore the window
    assert_eq!(maria.action_progress["pledge"].named_count, 5);
}

#[tokio::test]
async fn test_leaders_of_leaders_and_sort() {
    let (service, _source, _dir) = service_with(snapshot_json(), DashboardConfig::default(), None);
    let request = north()
        .with_leaders_of_leaders(true)
        .with_sort(SortState {
            key: SortKey::Name,
            direction: SortDirection::Asc,
        });
    let view = service.rebuild(&request).await.unwrap();

    assert_eq!(view.leaders.len(), 1);
    let children: Vec<&str> = view.leaders[0]
        .sub_leaders
        .iter()
        .map(|n| n.name.as_str())
        .collect();
    assert_eq!(children, vec!["Lee Chen", "Sam Okafor", "Unmatched team members (1)"]);
}

#[tokio::test]
async fn test_rebuild_is_idempotent() {
    let (service, _source, _dir) = service_with(snapshot_json(), DashboardConfig::default(), None);
    let first = service.rebuild(&north()).await.unwrap();
    let second = service.rebuild(&north()).await.unwrap();

    assert_eq!(first.leaders, second.leaders);
    assert_eq!(first.summary, second.summary);
    assert_eq!(second.generation, first.generation + 1);
}

// ============================================================================
// Loading & Caching
// ============================================================================

#[tokio::test]
async fn test_failing_leader_is_isolated() {
    let mut value = snapshot_json();
    value["failing_leaders"] = json!(["300"]);
    let (service, _source, _dir) = service_with(value, DashboardConfig::default(), None);
    let view = service.rebuild(&north()).await.unwrap();

    assert_eq!(view.failed_leaders, vec!["300"]);
    let sam = find_node(&view.leaders, "300").unwrap();
    assert!(sam.action_progress.is_empty());
    let lee = find_node(&view.leaders, "400").unwrap();
    assert_eq!(lee.action_progress["pledge"].count, 3);
    assert_eq!(find_node(&view.leaders, "100").unwrap().action_progress.len(), 2);
}

#[tokio::test]
async fn test_cache_hits_until_reload() {
    let (service, source, _dir) = service_with(snapshot_json(), DashboardConfig::default(), None);

    service.rebuild(&north()).await.unwrap();
    let fetched = source.fetch_count();
    // two fetches per real leader
    assert_eq!(fetched, 8);

    service.rebuild(&north()).await.unwrap();
    assert_eq!(source.fetch_count(), fetched);

    service.reload();
    service.rebuild(&north()).await.unwrap();
    assert_eq!(source.fetch_count(), fetched * 2);
}

#[tokio::test]
async fn test_superseded_rebuild_is_rejected() {
    let (service, _source, _dir) = service_with(
        snapshot_json(),
        DashboardConfig::default(),
        Some(Duration::from_millis(150)),
    );

    let request = north();
    let (stale, fresh) = tokio::join!(service.rebuild(&request), async {
        tokio::time::sleep(Duration::from_millis(25)).await;
        service.rebuild(&request).await
    });

    match stale {
        Err(AppError::Superseded(latest)) => assert_eq!(latest, 2),
        other => panic!("expected Superseded, got {:?}", other.map(|v| v.generation)),
    }
    let fresh = fresh.unwrap();
    assert_eq!(fresh.generation, 2);
    assert_eq!(fresh.leaders.len(), 2);
}

// ============================================================================
// Configuration
// ============================================================================

#[tokio::test]
async fn test_campaign_goal_mode_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut config_service = ConfigService::open(dir.path().join("config.json")).unwrap();
    config_service
        .update_config(SettingsUpdate {
            campaign_goal_mode: Some(true),
            max_depth: Some(1),
            default_chapter: Some("North".to_string()),
            ..Default::default()
        })
        .unwrap();

    let (service, _source, _dir) =
        service_with(snapshot_json(), config_service.get_config_clone(), None);
    let view = service.rebuild(&DashboardRequest::new("org")).await.unwrap();

    assert_eq!(view.chapter.as_deref(), Some("North"));
    assert!(view.leaders.iter().all(|n| n.sub_leaders.is_empty()));
    let maria = find_node(&view.leaders, "100").unwrap();
    assert_eq!(maria.action_progress["pledge"].goal, 1000);
    // rate-based goals stay per period
    assert_eq!(maria.action_progress["calls"].goal, 2);
}
