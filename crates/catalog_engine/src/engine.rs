use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use catalog_logging::{catalog_debug, catalog_error, catalog_info, catalog_warn};

use crate::decode::parse_document;
use crate::fetch::{FetchSettings, Fetcher, SourceFetcher};
use crate::{AttemptId, EngineEvent, FetchError, FetchedDocument};

enum EngineCommand {
    Fetch {
        attempt_id: AttemptId,
        location: String,
    },
}

/// Runs fetch attempts on a background runtime and reports each completion with
/// the attempt id it was issued under. Completions may arrive out of order.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: FetchSettings) -> io::Result<Self> {
        Self::with_fetcher(Arc::new(SourceFetcher::new(settings)))
    }

    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("catalog-engine")
            .build()?;

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let fetcher = fetcher.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(fetcher.as_ref(), command, event_tx).await;
                });
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    /// Queues a fetch. Returns `false` when the engine thread is gone and the
    /// attempt will never complete.
    pub fn fetch(&self, attempt_id: AttemptId, location: impl Into<String>) -> bool {
        let command = EngineCommand::Fetch {
            attempt_id,
            location: location.into(),
        };
        match self.cmd_tx.send(command) {
            Ok(()) => true,
            Err(_) => {
                catalog_error!("engine stopped; attempt {} was not started", attempt_id);
                false
            }
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    fetcher: &dyn Fetcher,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Fetch {
            attempt_id,
            location,
        } => {
            catalog_info!("attempt {} fetching {}", attempt_id, location);
            let result = load_document(fetcher, &location).await;
            match &result {
                Ok(doc) => catalog_debug!(
                    "attempt {} loaded {} bytes from {}",
                    attempt_id,
                    doc.metadata.byte_len,
                    doc.metadata.resolved
                ),
                Err(err) => catalog_warn!("attempt {} failed: {}", attempt_id, err),
            }
            let _ = event_tx.send(EngineEvent::DocumentLoaded { attempt_id, result });
        }
    }
}

/// Fetches `location` and parses the body as JSON.
pub async fn load_document(
    fetcher: &dyn Fetcher,
    location: &str,
) -> Result<FetchedDocument, FetchError> {
    let output = fetcher.fetch(location).await?;
    let document = parse_document(&output.bytes, output.metadata.content_type.as_deref())?;
    Ok(FetchedDocument {
        document,
        metadata: output.metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_reports_a_stopped_engine() {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (_event_tx, event_rx) = mpsc::channel();
        drop(cmd_rx);
        let engine = EngineHandle { cmd_tx, event_rx };

        assert!(!engine.fetch(4, "blog.json"));
        assert!(engine.try_recv().is_none());
    }
}
