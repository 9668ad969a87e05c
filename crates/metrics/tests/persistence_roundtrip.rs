use agentdeck_metrics::persistence::write_atomic;
use agentdeck_metrics::{JsonFileStore, SnapshotStore, StatsService};
use agentdeck_state::StatsSettings;
use agentdeck_test_utils::TestFixture;
use std::fs;
use std::io::{self, Write};

fn settings_for(fixture: &TestFixture) -> StatsSettings {
    StatsSettings {
        file_path: fixture.stats_path.clone(),
        ..StatsSettings::default()
    }
}

#[test]
fn saved_stats_survive_a_restart() {
    let fixture = TestFixture::new().unwrap();

    let first = StatsService::from_settings(settings_for(&fixture));
    first.initialize();
    for (ms, ok) in [(100, true), (200, true), (300, true), (50, false)] {
        first.record_invocation("x", ok, ms);
    }
    first.record_invocation("y", true, 5);
    first.shutdown();

    let second = StatsService::from_settings(settings_for(&fixture));
    second.initialize();

    assert_eq!(second.get_all_stats(), first.get_all_stats());
    assert_eq!(second.get_total_invocations(), 5);
    let x = second.get_agent_stats("x").unwrap();
    assert_eq!(x.invocation_count, 4);
    assert_eq!(x.success_count, 3);
    assert_eq!(x.failure_count, 1);
    assert_eq!(x.average_response_time_ms, 162.5);
    assert!(x.last_used >= x.first_used);
}

#[test]
fn load_of_save_is_identity() {
    let fixture = TestFixture::new().unwrap();
    let stats = StatsService::in_memory();
    stats.record_invocation("alpha", true, 3);
    stats.record_invocation("beta", false, 9);
    let snapshot = stats.get_all_stats();

    let store = JsonFileStore::new(&fixture.stats_path);
    store.save(&snapshot).unwrap();
    assert_eq!(store.load().unwrap(), snapshot);
}

#[test]
fn persisted_file_uses_camel_case_fields() {
    let fixture = TestFixture::new().unwrap();
    let stats = StatsService::from_settings(settings_for(&fixture));
    stats.record_invocation("alpha", true, 3);
    stats.scheduled_persistence().unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&fixture.stats_path).unwrap()).unwrap();
    let alpha = &value["alpha"];
    for field in [
        "agentName",
        "invocationCount",
        "successCount",
        "failureCount",
        "averageResponseTimeMs",
        "totalResponseTimeMs",
        "lastUsed",
        "firstUsed",
    ] {
        assert!(alpha.get(field).is_some(), "missing {field}");
    }
}

#[test]
fn missing_file_starts_empty() {
    let fixture = TestFixture::new().unwrap();
    let stats = StatsService::from_settings(settings_for(&fixture));
    stats.initialize();
    assert!(stats.get_all_stats().is_empty());
}

#[test]
fn corrupt_file_starts_empty_and_is_replaced_on_save() {
    let fixture = TestFixture::new().unwrap();
    fixture.write_stats_file("{ this is not json").unwrap();

    let stats = StatsService::from_settings(settings_for(&fixture));
    stats.initialize();
    assert!(stats.get_all_stats().is_empty());

    stats.record_invocation("alpha", true, 1);
    stats.scheduled_persistence().unwrap();
    let reloaded = JsonFileStore::new(&fixture.stats_path).load().unwrap();
    assert_eq!(reloaded["alpha"].invocation_count, 1);
}

#[test]
fn failed_write_leaves_previous_file_untouched() {
    let fixture = TestFixture::new().unwrap();
    let stats = StatsService::from_settings(settings_for(&fixture));
    stats.record_invocation("alpha", true, 1);
    stats.scheduled_persistence().unwrap();
    let before = fs::read(&fixture.stats_path).unwrap();

    let result = write_atomic(&fixture.stats_path, |file| {
        file.write_all(b"{\"alpha\": {\"invocationCou")?;
        Err(io::Error::other("disk full"))
    });

    assert!(result.is_err());
    assert_eq!(fs::read(&fixture.stats_path).unwrap(), before);
    let leftovers: Vec<_> = fs::read_dir(fixture.stats_path.parent().unwrap())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn cleared_stats_are_persisted_as_empty() {
    let fixture = TestFixture::new().unwrap();
    let stats = StatsService::from_settings(settings_for(&fixture));
    stats.record_invocation("alpha", true, 1);
    stats.scheduled_persistence().unwrap();

    stats.clear_all_stats();
    stats.scheduled_persistence().unwrap();

    let reloaded = JsonFileStore::new(&fixture.stats_path).load().unwrap();
    assert!(reloaded.is_empty());
}
