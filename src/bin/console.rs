//! Text-mode call: type what the caller says, read what the receptionist
//! would say.
//!
//! Talks to a running server at `RECEPTIONIST_SERVER_URL`, or runs the
//! dialogue in-process when `RECEPTIONIST_LOCAL=1`.

use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use voice_receptionist::config::ConsoleConfig;
use voice_receptionist::dialogue::{DepartmentTable, DialogueContext};
use voice_receptionist::orchestrator::console::{ConsoleCapture, ConsoleSynthesizer};
use voice_receptionist::orchestrator::{
    CallOrchestrator, DialogueTransport, HttpTransport, LocalTransport,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they don't interleave with the conversation
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voice_receptionist=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ConsoleConfig::from_env();
    let transport: Arc<dyn DialogueTransport> = if config.local {
        let departments = match &config.departments_path {
            Some(path) => DepartmentTable::from_file(path)?,
            None => DepartmentTable::default(),
        };
        Arc::new(LocalTransport::new(DialogueContext::new(departments)))
    } else {
        tracing::info!(url = %config.server_url, "Using dialogue server");
        Arc::new(HttpTransport::new(&config.server_url)?)
    };

    let capture = ConsoleCapture::default();
    let (events_tx, mut events_rx) = mpsc::channel(16);
    let reader = capture.spawn_reader(BufReader::new(tokio::io::stdin()), events_tx);

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let mut call =
        CallOrchestrator::new(capture, ConsoleSynthesizer, transport).with_shutdown(shutdown);
    call.start_call().await;
    call.run(&mut events_rx).await;

    if let Some(summary) = call.summary() {
        println!(
            "Appointment Summary: {} / {} / {}",
            summary.name, summary.department, summary.time
        );
    }
    call.end_call().await;
    reader.abort();

    Ok(())
}
