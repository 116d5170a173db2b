use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::bridge::BridgeReply;
use crate::overlay::{BlockingScreen, OverlayFlagsPayload, ReturnIntent};
use crate::platform::SettingsPage;

/// Lines written to the embedding process.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Outbound {
    /// `id` is echoed back exactly as the caller sent it.
    Reply {
        id: Value,
        reply: BridgeReply,
    },
    #[serde(rename_all = "camelCase")]
    Overlay {
        screen: BlockingScreen,
        flags: OverlayFlagsPayload,
        requested_at: DateTime<Utc>,
    },
    Navigate {
        intent: ReturnIntent,
    },
    #[serde(rename_all = "camelCase")]
    OverlayClosed {
        overlay_id: Uuid,
    },
    OpenSettings {
        page: SettingsPage,
    },
    Error {
        message: String,
    },
}

#[derive(Clone)]
enum Sink {
    /// Written on the caller's thread; for in-memory writers.
    Direct(Arc<Mutex<Box<dyn Write + Send>>>),
    /// Handed to a blocking writer task so async callers never wait on the pipe.
    Queued(mpsc::UnboundedSender<Vec<u8>>),
}

/// Line-delimited JSON sink shared by the reply path, the overlay launcher
/// and the platform adapter.
#[derive(Clone)]
pub struct HostOutput {
    sink: Sink,
}

impl HostOutput {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            sink: Sink::Direct(Arc::new(Mutex::new(Box::new(writer)))),
        }
    }

    /// Moves the writes to a blocking task. The task ends once every clone of
    /// the returned output is dropped and the queue has been written out.
    pub fn queued<W: Write + Send + 'static>(mut writer: W) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();
        let handle = tokio::task::spawn_blocking(move || {
            while let Some(line) = rx.blocking_recv() {
                if let Err(err) = writer.write_all(&line).and_then(|()| writer.flush()) {
                    log::error!("host output closed: {err}");
                    break;
                }
            }
        });

        (
            Self {
                sink: Sink::Queued(tx),
            },
            handle,
        )
    }

    pub fn stdout() -> (Self, JoinHandle<()>) {
        Self::queued(io::stdout())
    }

    pub fn emit(&self, message: &Outbound) -> Result<()> {
        let mut line = serde_json::to_vec(message).context("failed to encode host message")?;
        line.push(b'\n');

        match &self.sink {
            Sink::Direct(writer) => {
                let mut writer = writer
                    .lock()
                    .map_err(|_| anyhow!("host output lock poisoned"))?;
                writer.write_all(&line).context("failed to write host message")?;
                writer.flush().context("failed to flush host output")
            }
            Sink::Queued(tx) => tx.send(line).map_err(|_| anyhow!("host output closed")),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::Captured;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_emits_one_line_per_message() {
        let captured = Captured::default();
        let output = HostOutput::new(captured.clone());

        output
            .emit(&Outbound::Reply {
                id: json!(7),
                reply: BridgeReply::Success { result: json!(true) },
            })
            .unwrap();
        output
            .emit(&Outbound::OpenSettings {
                page: SettingsPage::Accessibility,
            })
            .unwrap();

        let lines = captured.lines();
        assert_eq!(
            lines[0],
            json!({"type": "reply", "id": 7, "reply": {"status": "success", "result": true}})
        );
        assert_eq!(
            lines[1],
            json!({"type": "openSettings", "page": {"page": "accessibility"}})
        );
    }

    #[tokio::test]
    async fn test_queued_output_is_written_in_order() {
        let captured = Captured::default();
        let (output, writer) = HostOutput::queued(captured.clone());

        for n in 0..3 {
            output
                .emit(&Outbound::Error {
                    message: format!("line {n}"),
                })
                .unwrap();
        }
        drop(output);
        writer.await.unwrap();

        let messages: Vec<Value> = captured
            .lines()
            .into_iter()
            .map(|line| line["message"].clone())
            .collect();
        assert_eq!(messages, vec![json!("line 0"), json!("line 1"), json!("line 2")]);
    }
}
