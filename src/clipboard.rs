use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::thread;
use std::time::Duration;

use anyhow::{Context, anyhow};
use tracing::debug;

/// Upper bound on waiting for the clipboard thread to answer.
const CLIPBOARD_TIMEOUT: Duration = Duration::from_secs(2);

/// UTF-8 text clipboard.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> anyhow::Result<()>;
    fn read_text(&self) -> anyhow::Result<String>;
}

enum Request {
    Write(String, SyncSender<anyhow::Result<()>>),
    Read(SyncSender<anyhow::Result<String>>),
}

/// The system clipboard, owned by a dedicated thread.
///
/// Some platforms only serve clipboard contents while the owning handle is alive,
/// so one long-lived `arboard::Clipboard` lives on its own thread and the rest of
/// the process talks to it over a channel.
pub struct SystemClipboard {
    requests: Sender<Request>,
}

impl SystemClipboard {
    pub fn spawn() -> anyhow::Result<Self> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("clipboard".into())
            .spawn(move || serve(rx))
            .context("failed to spawn clipboard thread")?;
        Ok(Self { requests: tx })
    }

    fn call<T>(
        &self,
        request: impl FnOnce(SyncSender<anyhow::Result<T>>) -> Request,
    ) -> anyhow::Result<T> {
        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        self.requests
            .send(request(reply_tx))
            .map_err(|_| anyhow!("clipboard thread is gone"))?;
        reply_rx
            .recv_timeout(CLIPBOARD_TIMEOUT)
            .map_err(|_| anyhow!("clipboard did not respond within {CLIPBOARD_TIMEOUT:?}"))?
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> anyhow::Result<()> {
        self.call(|reply| Request::Write(text.to_string(), reply))
    }

    fn read_text(&self) -> anyhow::Result<String> {
        self.call(Request::Read)
    }
}

fn serve(requests: Receiver<Request>) {
    let mut slot: Option<arboard::Clipboard> = None;

    for request in requests {
        if slot.is_none() {
            // Retried on the next request, e.g. once a display becomes available.
            match arboard::Clipboard::new() {
                Ok(clipboard) => slot = Some(clipboard),
                Err(err) => {
                    let err = anyhow!("failed to open clipboard: {err}");
                    match request {
                        Request::Write(_, reply) => {
                            let _ = reply.send(Err(err));
                        }
                        Request::Read(reply) => {
                            let _ = reply.send(Err(err));
                        }
                    }
                    continue;
                }
            }
        }
        let Some(clipboard) = slot.as_mut() else {
            continue;
        };

        match request {
            Request::Write(text, reply) => {
                let result = clipboard.set_text(text).context("clipboard write failed");
                let _ = reply.send(result);
            }
            Request::Read(reply) => {
                let result = clipboard.get_text().context("clipboard read failed");
                let _ = reply.send(result);
            }
        }
    }

    debug!("clipboard thread stopped");
}
