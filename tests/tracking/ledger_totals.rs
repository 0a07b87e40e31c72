use super::scripted_provider::ScriptedProvider;
use nutrisight::tracking::{ActionClassifier, FrameCoordinator};
use std::sync::Arc;

const PNG_FRAME: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

async fn run(replies: &[&str]) -> FrameCoordinator {
    let provider = Arc::new(ScriptedProvider::new(replies));
    let classifier = ActionClassifier::new(provider, "gemini-2.0-flash", 0.2);
    let tracker = FrameCoordinator::new(classifier, 4);
    for _ in replies {
        tracker.process_frame(PNG_FRAME).await.unwrap();
    }
    tracker
}

#[tokio::test]
async fn exercise_burns_calories_regardless_of_sign() {
    let tracker = run(&[
        r#"{"status":"finished","action_type":"food","title":"Sandwich","macros":{"calories":450,"protein_g":22.5}}"#,
        r#"{"status":"finished","action_type":"Exercise","title":"Pushups","macros":{"calories":-30}}"#,
        r#"{"status":"finished","action_type":"exercise","title":"Squats","macros":{"calories":20}}"#,
    ])
    .await;

    let summary = tracker.summary().await;
    assert_eq!(summary.total_actions, 3);
    assert_eq!(summary.totals.calories_consumed, 450);
    assert_eq!(summary.totals.calories_burned, 50);
    assert_eq!(summary.net_calories, 400);
    assert!((summary.totals.protein_g - 22.5).abs() < f64::EPSILON);
    assert!(summary.supplements_taken.is_empty());
}

#[tokio::test]
async fn reset_restarts_ids_and_empties_the_ledger() {
    let tracker = run(&[
        r#"{"status":"finished","action_type":"supplement","title":"Fish oil"}"#,
        r#"{"status":"finished","action_type":"supplement","title":"Magnesium"}"#,
    ])
    .await;

    let ids: Vec<String> = tracker
        .summary()
        .await
        .items
        .into_iter()
        .map(|entry| entry.id)
        .collect();
    assert_eq!(ids, vec!["action_1", "action_2"]);

    tracker.reset().await;
    let snapshot = tracker.snapshot().await;
    assert_eq!(snapshot.summary.total_actions, 0);
    assert_eq!(snapshot.current_action, "");
    assert_eq!(snapshot.frames_buffered, 0);
}

#[tokio::test]
async fn missing_labels_fall_back_to_defaults() {
    let tracker = run(&[r#"{"status":"finished"}"#]).await;
    let summary = tracker.summary().await;
    let entry = &summary.items[0];
    assert_eq!(entry.title, "Activity");
    assert_eq!(entry.action_type, "food");
    assert_eq!(entry.status, "completed");
    assert!(chrono::DateTime::parse_from_rfc3339(&entry.timestamp).is_ok());
}
