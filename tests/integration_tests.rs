//! Integration tests
//!
//! Tests the full flow: event payloads → Flattener → MemoryStore snapshot

use futures::stream::{self, StreamExt};
use json2states::store::{StoreCall, StoredNode};
use json2states::{
    CommonType, Flattener, FlattenerConfig, MemoryStore, ParseOptions, Role, StateValue,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use tempfile::tempdir;

fn event_payload(kind: &str, score: f64) -> serde_json::Value {
    json!({
        "type": kind,
        "after": {
            "id": "1700000000.123456-abc123",
            "camera": "front",
            "label": "person",
            "score": score,
            "start_time": 1_700_000_000.123,
            "end_time": null,
            "current_zones": ["driveway", "porch.steps"],
            "has_snapshot": true,
            "attributes": {}
        }
    })
}

// ============================================================================
// Event Payload Tests
// ============================================================================

#[tokio::test]
async fn test_event_payload_tree() {
    let store = MemoryStore::new();
    let flattener = Flattener::new(store.clone());
    let mut options = ParseOptions::new().with_channel_name("Events");

    flattener
        .parse("events", event_payload("new", 0.84), &mut options)
        .await;

    assert_eq!(
        store.get("events").await,
        Some(StoredNode::Channel {
            name: "Events".to_string()
        })
    );
    assert_eq!(
        store.value("events.type").await,
        Some(StateValue::Text("new".to_string()))
    );
    assert_eq!(
        store.metadata("events.after.start_time").await.unwrap().role,
        Role::ValueTime
    );
    assert_eq!(
        store.metadata("events.after.has_snapshot").await.unwrap().role,
        Role::Indicator
    );
    assert_eq!(
        store.value("events.after.end_time").await,
        Some(StateValue::Text(String::new()))
    );
    assert_eq!(
        store.value("events.after.current_zones.porchsteps").await,
        Some(StateValue::Text("porch.steps".to_string()))
    );
    assert!(store
        .get("events.after.attributes")
        .await
        .unwrap()
        .is_channel());
}

#[tokio::test]
async fn test_repeated_events_only_write_values() {
    let store = MemoryStore::new();
    let flattener = Flattener::new(store.clone());
    let mut options = ParseOptions::new();

    flattener
        .parse("events", event_payload("new", 0.84), &mut options)
        .await;
    let structural = store
        .calls()
        .await
        .iter()
        .filter(|call| call.is_structural())
        .count();

    store.clear_journal().await;
    flattener
        .parse("events", event_payload("update", 0.91), &mut options)
        .await;

    let calls = store.calls().await;
    assert!(calls.iter().all(|call| matches!(call, StoreCall::Write { .. })));
    // 4 channels and 10 states the first time, then 10 writes
    assert_eq!(structural, 14);
    assert_eq!(calls.len(), 10);
    assert_eq!(
        store.value("events.after.score").await.unwrap().to_json(),
        json!(0.91)
    );
}

#[tokio::test]
async fn test_stats_payload_with_options_file() {
    let dir = tempdir().unwrap();
    let options_path = dir.path().join("options.yaml");
    std::fs::write(
        &options_path,
        r#"
write: false
preferedArrayName: name
units:
  camera_fps: fps
  inference_speed: ms
descriptions:
  stats.service.version: Frigate version
excludeStateWithEnding:
  - pid
"#,
    )
    .unwrap();
    let mut options = ParseOptions::from_file(&options_path).unwrap();

    let store = MemoryStore::new();
    let flattener = Flattener::new(store.clone());
    flattener
        .parse(
            "stats",
            json!({
                "cameras": {"front": {"camera_fps": 5.1, "detection_fps": 0.2, "pid": 123}},
                "detectors": [
                    {"name": "coral", "inference_speed": 10.5, "detection_start": 0.0},
                    {"name": "cpu1", "inference_speed": 80.0, "detection_start": 0.0}
                ],
                "service": {"uptime": 3600, "version": "0.13.2-6476f8a"}
            }),
            &mut options,
        )
        .await;

    let fps = store.metadata("stats.cameras.front.camera_fps").await.unwrap();
    assert_eq!(fps.unit.as_deref(), Some("fps"));
    assert_eq!(store.get("stats.cameras.front.pid").await, None);

    let coral = store.metadata("stats.coral.inference_speed").await.unwrap();
    assert_eq!(coral.unit.as_deref(), Some("ms"));
    assert!(store.get("stats.cpu1").await.unwrap().is_channel());

    let version = store.metadata("stats.service.version").await.unwrap();
    assert_eq!(version.name, "Frigate version");
    assert_eq!(version.common_type, CommonType::String);
}

#[tokio::test]
async fn test_base64_payload_is_expanded() {
    let store = MemoryStore::new();
    let flattener = Flattener::new(store.clone());
    let mut options = ParseOptions::new().with_parse_base64(true);

    // {"a":1}
    flattener
        .parse("mqtt.raw", json!("eyJhIjoxfQ=="), &mut options)
        .await;

    assert_eq!(
        store.value("mqtt.raw.a").await.unwrap().to_json(),
        json!(1)
    );
    assert_eq!(store.value("mqtt.raw").await, None);
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_store_snapshot_survives_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("states.json");

    {
        let store = MemoryStore::new();
        let flattener = Flattener::new(store.clone());
        let mut options = ParseOptions::new();
        flattener
            .parse("events", event_payload("new", 0.84), &mut options)
            .await;
        store.save_to_file(&path).await.unwrap();
    }

    let store = MemoryStore::from_file(&path).await.unwrap();
    assert_eq!(
        store.value("events.after.camera").await,
        Some(StateValue::Text("front".to_string()))
    );

    // A fresh engine creates structure again, then writes
    let flattener = Flattener::new(store.clone());
    let mut options = ParseOptions::new();
    flattener
        .parse("events", json!({"type": "end"}), &mut options)
        .await;
    assert_eq!(store.calls_for("events.type").await.len(), 2);
    assert_eq!(
        store.value("events.type").await,
        Some(StateValue::Text("end".to_string()))
    );
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[tokio::test]
async fn test_message_loop_shares_one_engine() {
    let store = MemoryStore::new();
    let config = FlattenerConfig::new().with_max_logged_value_len(80);
    let flattener = Arc::new(Flattener::with_config(store.clone(), config).unwrap());

    let messages: Vec<(String, serde_json::Value)> = (0..50)
        .map(|i| {
            (
                format!("cameras.cam{}", i % 5),
                json!({"motion": i % 2 == 0, "fps": i, "zones": ["yard"]}),
            )
        })
        .collect();

    stream::iter(messages)
        .map(|(path, payload)| {
            let flattener = Arc::clone(&flattener);
            async move {
                let mut options = ParseOptions::new();
                flattener.parse(&path, payload, &mut options).await;
            }
        })
        .buffer_unordered(8)
        .collect::<Vec<()>>()
        .await;

    for cam in 0..5 {
        let base = format!("cameras.cam{cam}");
        assert!(store.get(&base).await.unwrap().is_channel());
        assert!(store.value(&format!("{base}.motion")).await.is_some());
        assert!(store.value(&format!("{base}.zones.yard")).await.is_some());
    }
    // cam, motion, fps, zones, zones.yard per camera
    assert_eq!(store.len().await, 25);
}

#[test]
fn test_crate_metadata() {
    assert_eq!(json2states::NAME, "json2states");
    assert!(!json2states::VERSION.is_empty());
}
