//! Mock implementations for testing
//!
//! These mocks enable driving a whole call without a microphone, speaker
//! or server.

use super::traits::*;
use crate::api::{ProcessRequest, ProcessResponse};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

// ============================================================================
// Mock Speech Capture
// ============================================================================

/// Counts starts and stops; can be told to fail the next N starts
#[derive(Default)]
pub struct MockCapture {
    pub starts: AtomicU32,
    pub stops: AtomicU32,
    failing_starts: AtomicU32,
}

impl MockCapture {
    pub fn failing(times: u32) -> Self {
        Self {
            failing_starts: AtomicU32::new(times),
            ..Default::default()
        }
    }

    pub fn start_count(&self) -> u32 {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> u32 {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechCapture for MockCapture {
    async fn start(&self) -> Result<(), CaptureError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failing_starts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_starts.store(remaining - 1, Ordering::SeqCst);
            return Err(CaptureError::Unavailable("no input device".to_string()));
        }
        Ok(())
    }

    async fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Recording Synthesizer
// ============================================================================

#[derive(Default)]
pub struct RecordingSynthesizer {
    spoken: Mutex<Vec<String>>,
}

impl RecordingSynthesizer {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.spoken.lock().unwrap().last().cloned()
    }
}

impl SpeechSynthesizer for RecordingSynthesizer {
    fn speak(&self, text: &str) {
        self.spoken.lock().unwrap().push(text.to_string());
    }
}

// ============================================================================
// Scripted Transport
// ============================================================================

/// Returns queued results in order and records every request
#[derive(Default)]
pub struct ScriptedTransport {
    results: Mutex<VecDeque<Result<ProcessResponse, TransportError>>>,
    pub requests: Mutex<Vec<ProcessRequest>>,
}

impl ScriptedTransport {
    pub fn queue_response(&self, response: ProcessResponse) {
        self.results.lock().unwrap().push_back(Ok(response));
    }

    pub fn queue_error(&self, error: TransportError) {
        self.results.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<ProcessRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DialogueTransport for ScriptedTransport {
    async fn turn(&self, request: &ProcessRequest) -> Result<ProcessResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::network("No scripted response queued")))
    }
}

#[cfg(test)]
mod tests {
    use super::super::*;
    use super::*;
    use crate::dialogue::{AppointmentData, ConversationState, Session};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    type TestCall<T> = CallOrchestrator<Arc<MockCapture>, Arc<RecordingSynthesizer>, Arc<T>>;

    fn call<T: DialogueTransport>(
        capture: MockCapture,
        transport: T,
    ) -> (TestCall<T>, Arc<MockCapture>, Arc<RecordingSynthesizer>, Arc<T>) {
        let capture = Arc::new(capture);
        let synth = Arc::new(RecordingSynthesizer::default());
        let transport = Arc::new(transport);
        let orchestrator = CallOrchestrator::new(capture.clone(), synth.clone(), transport.clone());
        (orchestrator, capture, synth, transport)
    }

    fn quick_policy(max_failures: u32) -> RestartPolicy {
        RestartPolicy {
            max_consecutive_failures: max_failures,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            healthy_run: Duration::from_secs(2),
        }
    }

    #[tokio::test]
    async fn test_full_call_through_local_core() {
        let (mut orch, capture, synth, _) = call(MockCapture::default(), LocalTransport::default());

        orch.start_call().await;
        assert!(orch.is_active());
        assert!(orch.is_listening());
        assert_eq!(capture.start_count(), 1);
        assert_eq!(synth.spoken()[0], crate::dialogue::OPENING_PROMPT);

        // The answer to the opening question is the reason for calling
        orch.handle_event(CaptureEvent::Utterance("I have chest pain".to_string())).await;
        assert_eq!(orch.session().state, ConversationState::CollectName);
        assert_eq!(orch.session().data.symptoms, "I have chest pain");
        assert_eq!(orch.session().data.department, "Cardiology");

        for line in ["John Smith", "3pm tomorrow"] {
            orch.handle_event(CaptureEvent::Utterance(line.to_string())).await;
        }

        assert_eq!(orch.session().state, ConversationState::Confirmation);
        let summary = orch.summary().unwrap();
        assert_eq!(summary.name, "John Smith");
        assert_eq!(summary.department, "Cardiology");
        assert_eq!(summary.time, "3pm tomorrow");

        let last = synth.last().unwrap();
        assert!(last.contains("John Smith") && last.contains("3pm tomorrow"));

        // Greeting plus a caller line and a reply per turn
        assert_eq!(orch.transcript().len(), 7);
        assert_eq!(orch.transcript().entries()[1].speaker, Speaker::Caller);
        assert_eq!(orch.transcript().entries()[1].text, "I have chest pain");
    }

    #[tokio::test]
    async fn test_bare_booking_request_is_asked_for_reason() {
        let (mut orch, _, synth, _) = call(MockCapture::default(), LocalTransport::default());
        orch.start_call().await;

        orch.handle_event(CaptureEvent::Utterance("I'd like to book an appointment".to_string()))
            .await;
        assert_eq!(orch.session().state, ConversationState::CollectSymptoms);
        assert!(orch.session().data.is_empty());
        assert!(synth.last().unwrap().contains("symptoms"));

        orch.handle_event(CaptureEvent::Utterance("I have chest pain".to_string())).await;
        assert_eq!(orch.session().state, ConversationState::CollectName);
        assert_eq!(orch.session().data.department, "Cardiology");
    }

    #[tokio::test]
    async fn test_failed_turn_keeps_session_and_apologizes() {
        let transport = ScriptedTransport::default();
        transport.queue_error(TransportError::server("boom"));
        transport.queue_response(ProcessResponse::new(
            Session::new(ConversationState::CollectSymptoms, AppointmentData::default()),
            "Please describe your symptoms.",
        ));
        let (mut orch, _, synth, transport) = call(MockCapture::default(), transport);

        orch.start_call().await;
        orch.handle_event(CaptureEvent::Utterance("hello".to_string())).await;
        assert_eq!(orch.session().state, ConversationState::Greeting);
        assert_eq!(synth.last().unwrap(), TURN_FAILED_MESSAGE);
        assert!(orch.is_active());

        // The retry sends the same, untouched session
        orch.handle_event(CaptureEvent::Utterance("hello".to_string())).await;
        assert_eq!(orch.session().state, ConversationState::CollectSymptoms);

        let requests = transport.recorded_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].state, "greeting");
        assert_eq!(requests[1].state, "greeting");
    }

    #[tokio::test]
    async fn test_requests_carry_last_returned_session() {
        let transport = ScriptedTransport::default();
        let data = AppointmentData {
            symptoms: "rash".to_string(),
            department: "Pediatrics".to_string(),
            ..Default::default()
        };
        transport.queue_response(ProcessResponse::new(
            Session::new(ConversationState::CollectName, data.clone()),
            "Your name?",
        ));
        transport.queue_response(ProcessResponse::new(
            Session::new(ConversationState::CollectTime, data.clone()),
            "When?",
        ));
        let (mut orch, _, _, transport) = call(MockCapture::default(), transport);

        orch.start_call().await;
        orch.handle_event(CaptureEvent::Utterance("  rash  ".to_string())).await;
        orch.handle_event(CaptureEvent::Utterance("Ada".to_string())).await;

        let requests = transport.recorded_requests();
        assert_eq!(requests[0].input, "rash");
        assert_eq!(requests[1].state, "collect_name");
        assert_eq!(requests[1].user_data.as_ref(), Some(&data));
    }

    #[tokio::test]
    async fn test_events_ignored_outside_call() {
        let (mut orch, _, synth, transport) =
            call(MockCapture::default(), ScriptedTransport::default());

        orch.handle_event(CaptureEvent::Utterance("hello".to_string())).await;
        orch.handle_event(CaptureEvent::Error(CaptureErrorKind::Network)).await;

        assert!(transport.recorded_requests().is_empty());
        assert!(synth.spoken().is_empty());
    }

    #[tokio::test]
    async fn test_capture_errors_are_spoken() {
        let (mut orch, _, synth, _) = call(MockCapture::default(), LocalTransport::default());
        orch.start_call().await;

        orch.handle_event(CaptureEvent::Error(CaptureErrorKind::NoSpeech)).await;
        assert_eq!(synth.last().unwrap(), NO_SPEECH_MESSAGE);
        orch.handle_event(CaptureEvent::Error(CaptureErrorKind::Network)).await;
        assert_eq!(synth.last().unwrap(), NETWORK_MESSAGE);
        orch.handle_event(CaptureEvent::Error(CaptureErrorKind::Other)).await;
        assert_eq!(synth.last().unwrap(), UNCLEAR_MESSAGE);

        assert_eq!(orch.session().state, ConversationState::Greeting);
    }

    #[tokio::test]
    async fn test_end_call_resets_everything() {
        let (mut orch, capture, synth, _) = call(MockCapture::default(), LocalTransport::default());
        orch.start_call().await;
        orch.handle_event(CaptureEvent::Utterance("hi".to_string())).await;
        orch.handle_event(CaptureEvent::Utterance("I have a fever".to_string())).await;
        assert_eq!(orch.session().state, ConversationState::CollectName);

        orch.end_call().await;

        assert!(!orch.is_active());
        assert!(!orch.is_listening());
        assert_eq!(capture.stop_count(), 1);
        assert_eq!(synth.last().unwrap(), GOODBYE_MESSAGE);
        assert_eq!(*orch.session(), Session::default());
        assert!(orch.transcript().is_empty());

        // Ending twice is a no-op
        orch.end_call().await;
        assert_eq!(capture.stop_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quick_end_restarts_with_backoff() {
        let (orch, capture, _, _) = call(MockCapture::default(), LocalTransport::default());
        let mut orch = orch.with_restart_policy(quick_policy(3));
        orch.start_call().await;

        let before = tokio::time::Instant::now();
        orch.handle_event(CaptureEvent::Ended).await;
        assert_eq!(capture.start_count(), 2);
        assert!(before.elapsed() >= Duration::from_millis(100));
        assert!(orch.is_listening());
    }

    #[tokio::test(start_paused = true)]
    async fn test_healthy_run_restarts_immediately() {
        let (orch, capture, _, _) = call(MockCapture::default(), LocalTransport::default());
        let mut orch = orch.with_restart_policy(quick_policy(3));
        orch.start_call().await;

        tokio::time::advance(Duration::from_secs(10)).await;
        let before = tokio::time::Instant::now();
        orch.handle_event(CaptureEvent::Ended).await;

        assert_eq!(capture.start_count(), 2);
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_when_capture_never_starts() {
        let (orch, capture, synth, _) = call(MockCapture::failing(100), LocalTransport::default());
        let mut orch = orch.with_restart_policy(quick_policy(2));

        orch.start_call().await;

        // Initial attempt plus one retry; the second failure is the limit
        assert_eq!(capture.start_count(), 2);
        assert!(orch.is_active());
        assert!(!orch.is_listening());
        assert_eq!(synth.last().unwrap(), MICROPHONE_UNAVAILABLE_MESSAGE);

        // A stray end event does not restart anything
        orch.handle_event(CaptureEvent::Ended).await;
        assert_eq!(capture.start_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_start_failure() {
        let (orch, capture, synth, _) = call(MockCapture::failing(1), LocalTransport::default());
        let mut orch = orch.with_restart_policy(quick_policy(2));

        orch.start_call().await;

        assert_eq!(capture.start_count(), 2);
        assert!(orch.is_listening());
        assert_ne!(synth.last().unwrap(), MICROPHONE_UNAVAILABLE_MESSAGE);
    }

    #[tokio::test]
    async fn test_run_processes_events_in_order_until_closed() {
        let (mut orch, _, synth, _) = call(MockCapture::default(), LocalTransport::default());
        orch.start_call().await;

        let (tx, mut rx) = mpsc::channel(8);
        for line in ["hello", "I have a cough", "Ada"] {
            tx.send(CaptureEvent::Utterance(line.to_string())).await.unwrap();
        }
        drop(tx);

        orch.run(&mut rx).await;

        assert_eq!(orch.session().state, ConversationState::CollectTime);
        assert_eq!(orch.session().data.caller_name, "Ada");
        assert_eq!(synth.spoken().len(), 4);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let shutdown = CancellationToken::new();
        let (orch, _, _, _) = call(MockCapture::default(), LocalTransport::default());
        let mut orch = orch.with_shutdown(shutdown.clone());
        orch.start_call().await;

        let (_tx, mut rx) = mpsc::channel::<CaptureEvent>(1);
        shutdown.cancel();

        orch.run(&mut rx).await;
        assert!(orch.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_restart_backoff() {
        let shutdown = CancellationToken::new();
        let (orch, capture, synth, _) = call(MockCapture::failing(100), LocalTransport::default());
        let mut orch = orch
            .with_restart_policy(quick_policy(10))
            .with_shutdown(shutdown.clone());

        let canceller = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            canceller.cancel();
        });

        // Backoff is 100ms then 200ms; shutdown lands inside the second wait
        let before = tokio::time::Instant::now();
        orch.start_call().await;

        let waited = before.elapsed();
        assert!(waited >= Duration::from_millis(150) && waited < Duration::from_millis(300));
        assert_eq!(capture.start_count(), 2);
        assert!(!orch.is_listening());
        assert_ne!(synth.last().unwrap(), MICROPHONE_UNAVAILABLE_MESSAGE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_restart_after_shutdown() {
        let shutdown = CancellationToken::new();
        let (orch, capture, _, _) = call(MockCapture::default(), LocalTransport::default());
        let mut orch = orch
            .with_restart_policy(quick_policy(3))
            .with_shutdown(shutdown.clone());
        orch.start_call().await;
        assert_eq!(capture.start_count(), 1);

        shutdown.cancel();
        orch.handle_event(CaptureEvent::Ended).await;

        assert_eq!(capture.start_count(), 1);
        assert!(!orch.is_listening());
    }
}
