//! Connectivity monitoring
//!
//! A periodic lightweight probe drives an online/offline flag. Transitions
//! produce spoken notices; recovery from offline is driven entirely by the
//! probe flipping back, never by retrying failed connector calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Spoken when connectivity returns
pub const ONLINE_NOTICE: &str = "You're back online.";

/// Spoken when connectivity is lost
pub const OFFLINE_NOTICE: &str = "You are offline. Some features may not work.";

/// Probe interval
const PROBE_INTERVAL: Duration = Duration::from_secs(10);

/// Probe timeout; a slow link still counts as online
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Shared online/offline flag, written by the probe task
#[derive(Clone)]
pub struct ConnectivityMonitor {
    online: Arc<AtomicBool>,
}

/// A connectivity transition worth announcing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Online,
    Offline,
}

impl Transition {
    /// The spoken notice for this transition
    #[must_use]
    pub const fn notice(self) -> &'static str {
        match self {
            Self::Online => ONLINE_NOTICE,
            Self::Offline => OFFLINE_NOTICE,
        }
    }
}

impl ConnectivityMonitor {
    /// Create a monitor that assumes it starts online
    #[must_use]
    pub fn new() -> Self {
        Self {
            online: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Current online state
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    /// Spawn the probe task; transitions are sent to `notices`
    ///
    /// The task runs until the receiver side of `notices` is dropped.
    pub fn spawn_probe(
        &self,
        probe_url: String,
        notices: tokio::sync::mpsc::Sender<Transition>,
    ) -> tokio::task::JoinHandle<()> {
        let online = Arc::clone(&self.online);

        tokio::spawn(async move {
            let client = match reqwest::Client::builder().timeout(PROBE_TIMEOUT).build() {
                Ok(client) => client,
                Err(e) => {
                    tracing::error!(error = %e, "failed to build probe client");
                    return;
                }
            };

            loop {
                let now_online = head_ok(&client, &probe_url).await;

                let was_online = online.swap(now_online, Ordering::Relaxed);

                if was_online != now_online {
                    let transition = if now_online {
                        Transition::Online
                    } else {
                        Transition::Offline
                    };
                    tracing::info!(?transition, "connectivity changed");
                    if notices.send(transition).await.is_err() {
                        return;
                    }
                }

                tokio::time::sleep(PROBE_INTERVAL).await;
            }
        })
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot probe for text-only turns that skip the periodic monitor.
/// Any failure, including a captive portal answering with a non-success
/// status, counts as offline.
pub async fn probe_once(probe_url: &str) -> bool {
    let Ok(client) = reqwest::Client::builder().timeout(PROBE_TIMEOUT).build() else {
        return false;
    };
    head_ok(&client, probe_url).await
}

async fn head_ok(client: &reqwest::Client, url: &str) -> bool {
    client
        .head(url)
        .send()
        .await
        .is_ok_and(|r| r.status().is_success())
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;

    #[test]
    fn starts_online() {
        let monitor = ConnectivityMonitor::new();
        assert!(monitor.is_online());
    }

    #[test]
    fn transition_notices() {
        assert_eq!(Transition::Online.notice(), ONLINE_NOTICE);
        assert_eq!(Transition::Offline.notice(), OFFLINE_NOTICE);
    }

    /// Answer every request on a loopback listener with a fixed status line
    async fn serve_status(status_line: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response =
                    format!("{status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });
        format!("http://{addr}/generate_204")
    }

    #[tokio::test]
    async fn probe_accepts_success_status() {
        let url = serve_status("HTTP/1.1 204 No Content").await;
        assert!(probe_once(&url).await);
    }

    #[tokio::test]
    async fn probe_treats_captive_portal_as_offline() {
        // A captive portal intercepting the probe answers with a
        // non-success status; that must not count as online.
        let url = serve_status("HTTP/1.1 511 Network Authentication Required").await;
        assert!(!probe_once(&url).await);
    }

    #[tokio::test]
    async fn probe_treats_unreachable_as_offline() {
        // Bind then drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        assert!(!probe_once(&format!("http://{addr}/generate_204")).await);
    }
}
