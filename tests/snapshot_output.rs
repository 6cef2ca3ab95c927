use claude_usage_line::models::{SessionSummary, UsageSnapshot};
use claude_usage_line::snapshot::{SnapshotFile, persist_snapshot, read_snapshot, write_snapshot};
use serde_json::Value;
use std::fs;

fn sample_snapshot() -> UsageSnapshot {
    UsageSnapshot {
        cycle_prompt_count: 23,
        cycle_start: 1_736_316_000,
        week_sonnet_hours: 12.34,
        week_opus_hours: 0.5,
        week_prompt_count: 80,
        week_start: 1_736_121_600,
        generated_at: 1_736_330_400,
        sessions: vec![SessionSummary {
            session_id: "s1".to_string(),
            project: "proj".to_string(),
            start_time: 1_736_320_000,
            end_time: 1_736_327_200,
            duration_hours: 2.0,
            prompt_count: 23,
            sonnet_response_count: 3,
            opus_response_count: 1,
        }],
    }
}

#[test]
fn test_snapshot_uses_legacy_layout() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("data").join("usage_data.json");
    write_snapshot(&path, &sample_snapshot()).unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    let json: Value = serde_json::from_str(&raw).unwrap();

    let cycle = &json["current_5h_cycle"];
    assert_eq!(cycle["start_time"], 1_736_316_000_000i64);
    assert_eq!(cycle["total_prompts"], 23);
    assert_eq!(cycle["total_hours"], 2.3);

    let week = &json["current_week"];
    assert_eq!(week["start_time"], 1_736_121_600_000i64);
    assert_eq!(week["sonnet4_hours"], 12.34);
    assert_eq!(week["opus4_hours"], 0.5);
    assert_eq!(week["total_sessions"], 1);

    assert_eq!(json["last_updated"], 1_736_330_400_000i64);
    assert_eq!(json.as_object().unwrap().len(), 3);
}

#[test]
fn test_snapshot_round_trips_through_reader() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("usage_data.json");
    let snapshot = sample_snapshot();
    assert!(persist_snapshot(&path, &snapshot));
    assert_eq!(read_snapshot(&path).unwrap(), SnapshotFile::from(&snapshot));
}

#[test]
fn test_snapshot_overwrites_previous_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("usage_data.json");
    fs::write(&path, "stale contents that are not json").unwrap();
    let mut snapshot = sample_snapshot();
    snapshot.cycle_prompt_count = 1;
    write_snapshot(&path, &snapshot).unwrap();
    assert_eq!(read_snapshot(&path).unwrap().current_5h_cycle.total_prompts, 1);
}

#[test]
fn test_unwritable_snapshot_is_not_fatal() {
    let temp_dir = tempfile::tempdir().unwrap();
    // A regular file where the parent directory should be
    let blocker = temp_dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    let path = blocker.join("usage_data.json");

    assert!(write_snapshot(&path, &sample_snapshot()).is_err());
    assert!(!persist_snapshot(&path, &sample_snapshot()));
}
