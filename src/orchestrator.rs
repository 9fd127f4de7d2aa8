//! Call orchestrator
//!
//! Drives one call around the dialogue core: speech capture in, one turn
//! round-trip per utterance, speech synthesis out. The session lives here
//! and is sent with every turn; the core keeps nothing between turns.

pub mod console;
mod supervisor;
mod transcript;
pub mod traits;
mod transport;

#[cfg(test)]
mod testing;

pub use supervisor::{CaptureSupervisor, RestartDecision, RestartPolicy};
pub use traits::*;
pub use transcript::{Speaker, Transcript, TurnEntry};
pub use transport::{HttpTransport, LocalTransport};

use crate::api::ProcessRequest;
use crate::dialogue::{self, AppointmentSummary, Session, OPENING_PROMPT};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub const TURN_FAILED_MESSAGE: &str =
    "Sorry, there was an issue processing your request. Please try again.";
pub const NO_SPEECH_MESSAGE: &str = "No speech detected. Please try again.";
pub const NETWORK_MESSAGE: &str = "Network issue. Please check your connection.";
pub const UNCLEAR_MESSAGE: &str = "Sorry, I couldn't hear you clearly. Please try speaking again.";
pub const MICROPHONE_UNAVAILABLE_MESSAGE: &str =
    "I can't access the microphone right now. Please check your audio device and call again.";
pub const GOODBYE_MESSAGE: &str = "Thank you for calling. Goodbye.";

/// Owns one caller's session and the collaborators around it.
///
/// Turns are handled through `&mut self`, so at most one turn per session
/// is ever in flight; events that arrive meanwhile wait in the channel.
pub struct CallOrchestrator<C, S, T> {
    capture: C,
    synthesizer: S,
    transport: T,
    session: Session,
    transcript: Transcript,
    supervisor: CaptureSupervisor,
    call_id: Option<Uuid>,
    /// Set while capture is running
    listening_since: Option<Instant>,
    heard_speech: bool,
    shutdown: CancellationToken,
}

impl<C, S, T> CallOrchestrator<C, S, T>
where
    C: SpeechCapture,
    S: SpeechSynthesizer,
    T: DialogueTransport,
{
    #[must_use]
    pub fn new(capture: C, synthesizer: S, transport: T) -> Self {
        Self {
            capture,
            synthesizer,
            transport,
            session: dialogue::reset(),
            transcript: Transcript::default(),
            supervisor: CaptureSupervisor::default(),
            call_id: None,
            listening_since: None,
            heard_speech: false,
            shutdown: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_restart_policy(mut self, policy: RestartPolicy) -> Self {
        self.supervisor = CaptureSupervisor::new(policy);
        self
    }

    /// Token that stops `run` and cuts short any restart backoff
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.call_id.is_some()
    }

    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.listening_since.is_some()
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Summary view data, once name, department and time are known
    #[must_use]
    pub fn summary(&self) -> Option<AppointmentSummary> {
        self.session.data.summary()
    }

    /// Begin a call: fresh session, start listening, greet the caller
    pub async fn start_call(&mut self) {
        if self.is_active() {
            return;
        }
        let call_id = Uuid::new_v4();
        self.call_id = Some(call_id);
        self.session = dialogue::reset();
        self.transcript.clear();
        self.supervisor.reset();
        tracing::info!(%call_id, "Call started");

        self.speak(OPENING_PROMPT);
        self.start_capture().await;
    }

    /// End the call: stop listening, say goodbye, discard the session
    pub async fn end_call(&mut self) {
        let Some(call_id) = self.call_id.take() else {
            return;
        };
        self.capture.stop().await;
        self.listening_since = None;
        self.speak(GOODBYE_MESSAGE);
        self.session = dialogue::reset();
        self.transcript.clear();
        self.supervisor.reset();
        tracing::info!(%call_id, "Call ended");
    }

    /// Consume capture events until the channel closes or shutdown fires
    pub async fn run(&mut self, events: &mut mpsc::Receiver<CaptureEvent>) {
        let shutdown = self.shutdown.clone();
        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => break,
                },
            }
        }
    }

    pub async fn handle_event(&mut self, event: CaptureEvent) {
        if !self.is_active() {
            tracing::debug!(?event, "Ignoring capture event outside a call");
            return;
        }
        match event {
            CaptureEvent::Utterance(text) => self.handle_utterance(&text).await,
            CaptureEvent::Error(kind) => {
                tracing::warn!(?kind, "Speech capture error");
                self.speak(capture_error_message(kind));
            }
            CaptureEvent::Ended => self.handle_capture_ended().await,
        }
    }

    async fn handle_utterance(&mut self, text: &str) {
        let text = text.trim();
        self.heard_speech = true;
        self.transcript.push(Speaker::Caller, text);

        let request = ProcessRequest::new(text, &self.session);
        match self.transport.turn(&request).await {
            Ok(response) => {
                tracing::debug!(
                    from = %self.session.state,
                    to = %response.state,
                    "Turn completed"
                );
                self.session = response.session();
                self.speak(&response.response);
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    kind = ?e.kind,
                    retryable = e.kind.is_retryable(),
                    "Turn failed"
                );
                self.speak(TURN_FAILED_MESSAGE);
            }
        }
    }

    async fn handle_capture_ended(&mut self) {
        let Some(since) = self.listening_since.take() else {
            // Capture already given up on or stopped
            return;
        };
        let ran_for = since.elapsed();
        match self.supervisor.on_ended(ran_for, self.heard_speech) {
            RestartDecision::Restart { delay } => {
                if self.back_off(delay).await {
                    self.start_capture().await;
                }
            }
            RestartDecision::GiveUp => self.give_up_capture(),
        }
    }

    /// Start listening, retrying with backoff until it works or we give up
    async fn start_capture(&mut self) {
        loop {
            if self.shutdown.is_cancelled() {
                return;
            }
            match self.capture.start().await {
                Ok(()) => {
                    self.listening_since = Some(Instant::now());
                    self.heard_speech = false;
                    return;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to start speech capture");
                    match self.supervisor.on_failure() {
                        RestartDecision::Restart { delay } => {
                            if !self.back_off(delay).await {
                                return;
                            }
                        }
                        RestartDecision::GiveUp => {
                            self.give_up_capture();
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Wait before a restart; false if shutdown fired first
    async fn back_off(&self, delay: std::time::Duration) -> bool {
        if self.shutdown.is_cancelled() {
            return false;
        }
        if delay.is_zero() {
            return true;
        }
        tracing::debug!(
            ?delay,
            failures = self.supervisor.consecutive_failures(),
            "Restarting speech capture after backoff"
        );
        tokio::select! {
            () = self.shutdown.cancelled() => {
                tracing::debug!("Shutdown during capture backoff");
                false
            }
            () = tokio::time::sleep(delay) => true,
        }
    }

    fn give_up_capture(&mut self) {
        tracing::error!(
            failures = self.supervisor.consecutive_failures(),
            "Speech capture keeps failing; giving up"
        );
        self.speak(MICROPHONE_UNAVAILABLE_MESSAGE);
    }

    fn speak(&mut self, text: &str) {
        self.synthesizer.speak(text);
        self.transcript.push(Speaker::Receptionist, text);
    }
}

#[must_use]
pub fn capture_error_message(kind: CaptureErrorKind) -> &'static str {
    match kind {
        CaptureErrorKind::NoSpeech => NO_SPEECH_MESSAGE,
        CaptureErrorKind::Network => NETWORK_MESSAGE,
        CaptureErrorKind::Other => UNCLEAR_MESSAGE,
    }
}
