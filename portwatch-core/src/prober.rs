//! Reachability probes.
//!
//! A probe answers one question: can a TCP connection to the target be
//! established within the timeout? Every failure (refused, timed out,
//! unresolvable host, unreachable network) is reported as `false`.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use portwatch_types::Target;
use tokio::net::TcpStream;

/// Something that can test whether a target accepts connections.
///
/// Monitors hold a probe behind an `Arc<dyn Probe>`, which lets tests and
/// simulations substitute scripted reachability.
#[async_trait]
pub trait Probe: Send + Sync + fmt::Debug {
    /// Return `true` iff `target` was reachable within `timeout`.
    async fn probe(&self, target: &Target, timeout: Duration) -> bool;
}

/// Probes by opening (and immediately closing) a TCP connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProber;

#[async_trait]
impl Probe for TcpProber {
    async fn probe(&self, target: &Target, timeout: Duration) -> bool {
        let address = target.address();
        // The timeout also covers name resolution
        match tokio::time::timeout(timeout, TcpStream::connect(address.as_str())).await {
            Ok(Ok(stream)) => {
                drop(stream);
                true
            }
            Ok(Err(e)) => {
                tracing::trace!(%address, error = %e, "connect failed");
                false
            }
            Err(_) => {
                tracing::trace!(%address, ?timeout, "connect timed out");
                false
            }
        }
    }
}

/// Probe `host:port` once with a [`TcpProber`].
pub async fn probe(host: &str, port: u16, timeout: Duration) -> bool {
    TcpProber.probe(&Target::new(host, port), timeout).await
}

/// A probe backed by a closure.
///
/// ```rust
/// use portwatch_core::{FnProbe, Probe};
/// use portwatch_types::Target;
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let even_ports_up = FnProbe::new(|target: &Target| target.port % 2 == 0);
/// assert!(even_ports_up.probe(&Target::new("h", 80), Duration::from_secs(1)).await);
/// # });
/// ```
pub struct FnProbe<F> {
    f: F,
}

impl<F> FnProbe<F>
where
    F: Fn(&Target) -> bool + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for FnProbe<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProbe").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> Probe for FnProbe<F>
where
    F: Fn(&Target) -> bool + Send + Sync,
{
    async fn probe(&self, target: &Target, _timeout: Duration) -> bool {
        (self.f)(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn listening_port_is_up() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        assert!(probe("127.0.0.1", port, TIMEOUT).await);
    }

    #[tokio::test]
    async fn closed_port_is_down() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        assert!(!probe("127.0.0.1", port, TIMEOUT).await);
    }

    #[tokio::test]
    async fn unresolvable_host_is_down() {
        assert!(!probe("no-such-host.invalid", 80, TIMEOUT).await);
    }

    #[tokio::test]
    async fn probe_leaves_no_connection_open() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        assert!(TcpProber.probe(&Target::new("127.0.0.1", port), TIMEOUT).await);

        // The probe side closed its end, so the accepted stream reads EOF
        let (mut accepted, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 8];
        let read = tokio::io::AsyncReadExt::read(&mut accepted, &mut buf)
            .await
            .unwrap();
        assert_eq!(read, 0);
    }

    #[tokio::test]
    async fn fn_probe_delegates_to_closure() {
        let probe = FnProbe::new(|t: &Target| t.port == 22);
        assert!(probe.probe(&Target::new("h", 22), TIMEOUT).await);
        assert!(!probe.probe(&Target::new("h", 23), TIMEOUT).await);
    }
}
