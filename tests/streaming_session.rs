//! Streaming session scenarios driven through the wire protocol.

use signflow::extract::Handedness;
use signflow::model::capability::{
    HandDetector, MockFaceDetector, MockPoseDetector, MockSignToTextModel, MockTextToSignModel,
};
use signflow::extract::{HandDetection, Landmark};
use signflow::session::{ClientMessage, SessionEvent};
use signflow::store::MemoryRecordStore;
use signflow::video::{PixelFormat, RawFrame};
use signflow::{Config, ModelRegistry, SessionState, StreamingEngine, WindowConfig};
use std::sync::Arc;

fn frame(timestamp_ms: u64) -> RawFrame {
    RawFrame::new(4, 4, PixelFormat::Bgr8, vec![0; 48], timestamp_ms)
}

fn frame_json(timestamp_ms: u64) -> String {
    ClientMessage::SignFrame {
        frame: frame(timestamp_ms),
    }
    .to_json()
    .expect("frame serializes")
}

fn session_config() -> Config {
    let mut config = Config::default();
    config.window = WindowConfig {
        max_frames: 4,
        min_frames: 1,
        trailing_silence_frames: 3,
        max_span_ms: 100_000,
    };
    config
}

/// Hands appear only in frames at or after the given timestamp.
struct HandsAfter(u64);

impl HandDetector for HandsAfter {
    fn detect(&self, frame: &RawFrame) -> signflow::Result<Vec<HandDetection>> {
        if frame.timestamp_ms >= self.0 {
            Ok(vec![HandDetection::new(
                Handedness::Right,
                vec![Landmark::new(0.5, 0.5, 0.0); 21],
            )])
        } else {
            Ok(vec![])
        }
    }

    fn name(&self) -> &str {
        "hands-after"
    }
}

fn build_engine(
    hands: Arc<dyn HandDetector>,
    s2t: MockSignToTextModel,
    store: Arc<MemoryRecordStore>,
) -> StreamingEngine {
    let registry = ModelRegistry::builder()
        .with_pose(Arc::new(MockPoseDetector::new()))
        .with_hands(hands)
        .with_face(Arc::new(MockFaceDetector::new().with_landmarks(478)))
        .with_sign_to_text(Arc::new(s2t))
        .with_text_to_sign(Arc::new(MockTextToSignModel::new("t2s")))
        .build()
        .expect("all capabilities provided");
    registry.initialize().expect("first initialization");
    StreamingEngine::new(Arc::new(registry), store, session_config())
        .expect("initialized registry")
}

#[tokio::test]
async fn silence_then_signal_then_end_finalizes_only_the_signal_frame() {
    let store = Arc::new(MemoryRecordStore::new());
    let engine = build_engine(
        Arc::new(HandsAfter(20)),
        MockSignToTextModel::new("s2t").with_response("good morning"),
        store.clone(),
    );
    let mut session = engine.open_session("client-42");

    // F1: no signal.
    let events = session.handle_raw(&frame_json(10)).await;
    assert_eq!(events, vec![SessionEvent::NoFeatures]);

    // F2: signal, accumulated quietly.
    let events = session.handle_raw(&frame_json(20)).await;
    assert!(events.is_empty());
    assert_eq!(session.buffered_frames(), 1);

    // End of utterance: exactly one translation_result over the one-frame
    // window.
    let events = session
        .handle_raw(r#"{"type":"end_of_utterance"}"#)
        .await;
    assert_eq!(events.len(), 1);
    let SessionEvent::TranslationResult {
        text, confidence, ..
    } = &events[0]
    else {
        panic!("expected translation_result, got {:?}", events[0]);
    };
    assert_eq!(text, "Good morning.");
    assert!((0.0..=1.0).contains(confidence));
    assert_eq!(session.state(), SessionState::Open);

    // Finalized utterances are persisted; partials never are.
    let records = store.translations().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].caller_id, "client-42");
}

#[tokio::test]
async fn partials_stream_while_utterance_is_open() {
    let store = Arc::new(MemoryRecordStore::new());
    let engine = build_engine(
        Arc::new(HandsAfter(0)),
        MockSignToTextModel::new("s2t").with_partial_response("good mor"),
        store.clone(),
    );
    let mut session = engine.open_session("client-42");

    let mut partials = 0;
    for t in [10, 20, 30, 40, 50, 60] {
        for event in session.handle_raw(&frame_json(t)).await {
            match event {
                SessionEvent::PartialTranslation {
                    text,
                    features_detected,
                    ..
                } => {
                    assert_eq!(text, "good mor");
                    assert!(features_detected);
                    partials += 1;
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
    }

    // Buffer fills at 4 frames; every ready frame after that streams one
    // partial, none of which are persisted.
    assert_eq!(partials, 3);
    assert_eq!(session.partials_emitted(), 3);
    assert!(store.translations().await.is_empty());
}

#[tokio::test]
async fn unknown_message_type_is_reported_and_session_survives() {
    let store = Arc::new(MemoryRecordStore::new());
    let engine = build_engine(
        Arc::new(HandsAfter(0)),
        MockSignToTextModel::new("s2t").with_response("still here"),
        store,
    );
    let mut session = engine.open_session("client-42");

    let events = session
        .handle_raw(r#"{"type":"interpreter_session","data":{}}"#)
        .await;
    assert_eq!(
        events,
        vec![SessionEvent::Error {
            message: "unknown message type: interpreter_session".to_string()
        }]
    );

    // The session keeps translating afterwards.
    session.handle_raw(&frame_json(10)).await;
    let events = session
        .handle_raw(r#"{"type":"end_of_utterance"}"#)
        .await;
    assert!(matches!(
        events[0],
        SessionEvent::TranslationResult { .. }
    ));
}

#[tokio::test]
async fn disconnect_mid_accumulation_never_raises_and_reconnect_is_fresh() {
    let store = Arc::new(MemoryRecordStore::new());
    let engine = build_engine(
        Arc::new(HandsAfter(0)),
        MockSignToTextModel::new("s2t"),
        store.clone(),
    );

    let mut session = engine.open_session("client-42");
    session.handle_raw(&frame_json(10)).await;
    session.handle_raw(&frame_json(20)).await;
    assert_eq!(session.state(), SessionState::Accumulating);

    // Disconnect discards the unflushed buffer without persistence.
    session.close();
    drop(session);
    assert!(store.translations().await.is_empty());

    // Reconnection with the same client identifier starts a brand-new
    // session with an empty buffer.
    let session = engine.open_session("client-42");
    assert_eq!(session.state(), SessionState::Open);
    assert_eq!(session.buffered_frames(), 0);
    assert_eq!(session.frames_received(), 0);
}

#[tokio::test]
async fn channel_driven_session_round_trip() {
    let store = Arc::new(MemoryRecordStore::new());
    let engine = build_engine(
        Arc::new(HandsAfter(0)),
        MockSignToTextModel::new("s2t").with_response("see you soon"),
        store,
    );
    let session = engine.open_session("client-42");

    let (input_tx, input_rx) = tokio::sync::mpsc::channel(8);
    let (output_tx, mut output_rx) = tokio::sync::mpsc::channel(engine.event_buffer());
    let handle = tokio::spawn(session.run(input_rx, output_tx));

    input_tx
        .send(ClientMessage::SignFrame { frame: frame(10) })
        .await
        .expect("send frame");
    input_tx
        .send(ClientMessage::EndOfUtterance)
        .await
        .expect("send end");

    let event = output_rx.recv().await.expect("one event");
    let SessionEvent::TranslationResult { text, .. } = event else {
        panic!("expected translation_result, got {:?}", event);
    };
    assert_eq!(text, "See you soon.");

    drop(input_tx);
    handle.await.expect("session task completes");
}
