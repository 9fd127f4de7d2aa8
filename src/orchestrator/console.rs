//! Terminal stand-ins for the microphone and the speaker
//!
//! Each line typed on stdin is treated as one recognized utterance; replies
//! are printed instead of spoken.

use super::traits::{
    CaptureError, CaptureErrorKind, CaptureEvent, SpeechCapture, SpeechSynthesizer,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Forwards lines only while the call is listening
#[derive(Debug, Default, Clone)]
pub struct ConsoleCapture {
    listening: Arc<AtomicBool>,
}

impl ConsoleCapture {
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    /// Read lines from `input` into the event channel until EOF.
    ///
    /// Lines typed while not listening are discarded, like speech before the
    /// call starts. The sender is dropped at EOF, which closes the channel.
    #[must_use]
    pub fn spawn_reader<R>(&self, input: R, events: mpsc::Sender<CaptureEvent>) -> JoinHandle<()>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let listening = self.listening.clone();
        tokio::spawn(async move {
            let mut lines = input.lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if !listening.load(Ordering::SeqCst) {
                            continue;
                        }
                        if events.send(CaptureEvent::Utterance(line)).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read console input");
                        let _ = events.send(CaptureEvent::Error(CaptureErrorKind::Other)).await;
                        break;
                    }
                }
            }
        })
    }
}

#[async_trait]
impl SpeechCapture for ConsoleCapture {
    async fn start(&self) -> Result<(), CaptureError> {
        self.listening.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }
}

/// Prints replies to stdout
#[derive(Debug, Default)]
pub struct ConsoleSynthesizer;

impl SpeechSynthesizer for ConsoleSynthesizer {
    fn speak(&self, text: &str) {
        println!("Receptionist: {text}");
    }
}
