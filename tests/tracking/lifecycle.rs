use super::scripted_provider::ScriptedProvider;
use nutrisight::tracking::{
    ActionClassifier, ClassificationStatus, FrameCoordinator, LifecycleStage,
};
use std::sync::Arc;

const JPEG_FRAME: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

fn coordinator(provider: &Arc<ScriptedProvider>) -> FrameCoordinator {
    let classifier = ActionClassifier::new(provider.clone(), "gemini-2.0-flash", 0.2);
    FrameCoordinator::new(classifier, 20)
}

#[tokio::test]
async fn supplement_sequence_commits_once_and_clears_context() {
    let provider = Arc::new(ScriptedProvider::new(&[
        r#"{"status":"started","action_type":"supplement","title":"Vitamin D"}"#,
        r#"```json
{"status":"in progress","action_type":"supplement","title":"Vitamin D"}
```"#,
        r#"{"status":"finished","action_type":"supplement","title":"Vitamin D3 1000IU","micros":{"vitamin_d":"1000IU"}}"#,
        r#"{"status":"not detected"}"#,
    ]));
    let tracker = coordinator(&provider);

    let started = tracker.process_frame(JPEG_FRAME).await.unwrap();
    assert_eq!(started.state.action_progress, LifecycleStage::Started);
    assert_eq!(started.state.current_action, "Vitamin D");
    assert_eq!(started.frames_buffered, 1);
    assert!(started.committed.is_none());

    let progressing = tracker.process_frame(JPEG_FRAME).await.unwrap();
    assert_eq!(progressing.classification.status, ClassificationStatus::InProgress);
    assert_eq!(progressing.frames_buffered, 2);
    assert_eq!(progressing.state.history_len, 4);

    let finished = tracker.process_frame(JPEG_FRAME).await.unwrap();
    let entry = finished.committed.as_ref().unwrap();
    assert_eq!(entry.id, "action_1");
    assert_eq!(entry.title, "Vitamin D3 1000IU");
    assert_eq!(entry.micros.vitamin_d, "1000IU");
    assert_eq!(finished.frames_analyzed, Some(2));
    assert_eq!(finished.frames_buffered, 0);
    assert_eq!(finished.state.history_len, 0);
    assert_eq!(finished.summary.supplements_taken, vec!["Vitamin D3 1000IU"]);

    let idle = tracker.process_frame(JPEG_FRAME).await.unwrap();
    assert!(idle.committed.is_none());
    assert_eq!(idle.state.action_progress, LifecycleStage::Finished);
    assert_eq!(idle.summary.total_actions, 1);

    // Each call carries the accumulated history plus the new frame.
    assert_eq!(provider.message_counts(), vec![1, 3, 5, 1]);
}

#[tokio::test]
async fn malformed_reply_mid_action_keeps_the_action_open() {
    let provider = Arc::new(ScriptedProvider::new(&[
        r#"{"status":"started","action_type":"food","title":"Apple"}"#,
        "the model rambled instead of answering",
        r#"{"status":"finished","action_type":"food","title":"Apple","macros":{"calories":"95"}}"#,
    ]));
    let tracker = coordinator(&provider);

    tracker.process_frame(JPEG_FRAME).await.unwrap();
    let rambling = tracker.process_frame(JPEG_FRAME).await.unwrap();
    assert_eq!(rambling.classification.status, ClassificationStatus::Unknown);
    assert_eq!(rambling.state.action_progress, LifecycleStage::Started);
    assert_eq!(rambling.state.current_action, "Apple");
    assert_eq!(rambling.state.history_len, 4);

    let finished = tracker.process_frame(JPEG_FRAME).await.unwrap();
    assert_eq!(finished.committed.unwrap().macros.calories, 95);
}

#[tokio::test]
async fn upstream_failure_leaves_state_untouched() {
    let provider = Arc::new(ScriptedProvider::new(&[
        r#"{"status":"started","action_type":"hydration","title":"Water"}"#,
    ]));
    let tracker = coordinator(&provider);

    tracker.process_frame(JPEG_FRAME).await.unwrap();
    let before = tracker.snapshot().await;

    assert!(tracker.process_frame(JPEG_FRAME).await.is_err());
    let after = tracker.snapshot().await;
    assert_eq!(after.current_action, before.current_action);
    assert_eq!(after.action_progress, before.action_progress);
    assert_eq!(after.history_len, before.history_len);
    assert_eq!(after.frames_buffered, before.frames_buffered);
}

#[tokio::test]
async fn finish_without_start_still_records_the_action() {
    let provider = Arc::new(ScriptedProvider::new(&[
        r#"{"status":"FINISHED","category":"drink","action":"Orange juice","macros":{"calories":110,"water_ml":240}}"#,
    ]));
    let tracker = coordinator(&provider);

    let outcome = tracker.process_frame(JPEG_FRAME).await.unwrap();
    let entry = outcome.committed.unwrap();
    assert_eq!(entry.title, "Orange juice");
    assert_eq!(entry.action_type, "drink");
    assert_eq!(outcome.frames_analyzed, Some(0));
    assert_eq!(outcome.summary.totals.water_ml, 240);
}
