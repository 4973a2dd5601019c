use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use mncreach_common::{debug, ports::EchoProbe};

use crate::command;

/// Extra wall time granted on top of the probe timeout for process start-up.
const SPAWN_GRACE: Duration = Duration::from_secs(1);

/// Echo probes through the operating system's `ping`.
pub struct SystemPing;

/// Executable and arguments for a single echo request to `addr`.
pub fn ping_command(addr: IpAddr, timeout: Duration) -> (&'static str, Vec<String>) {
    let secs = timeout.as_secs().max(1).to_string();
    let target = addr.to_string();

    if cfg!(target_os = "macos") {
        match addr {
            IpAddr::V4(_) => ("ping", vec!["-n".into(), "-c".into(), "1".into(), "-t".into(), secs, target]),
            IpAddr::V6(_) => ("ping6", vec!["-n".into(), "-c".into(), "1".into(), target]),
        }
    } else {
        let family = match addr {
            IpAddr::V4(_) => "-4",
            IpAddr::V6(_) => "-6",
        };
        (
            "ping",
            vec![family.into(), "-n".into(), "-c".into(), "1".into(), "-W".into(), secs, target],
        )
    }
}

#[async_trait]
impl EchoProbe for SystemPing {
    async fn probe(&self, addr: IpAddr, timeout: Duration) -> bool {
        let (tool, args) = ping_command(addr, timeout);
        match command::run(tool, &args, timeout + SPAWN_GRACE).await {
            Ok(_) => true,
            Err(e) => {
                debug!("No echo reply from {addr}: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(target_os = "linux")]
    #[test]
    fn linux_ping_picks_family_from_literal() {
        let (tool, args) = ping_command("2001:db8::1".parse().unwrap(), Duration::from_secs(2));
        assert_eq!(tool, "ping");
        assert_eq!(args.first().map(String::as_str), Some("-6"));
        assert_eq!(args.last().map(String::as_str), Some("2001:db8::1"));

        let (_, args) = ping_command("10.0.0.1".parse().unwrap(), Duration::from_secs(2));
        assert_eq!(args.first().map(String::as_str), Some("-4"));
    }

    #[test]
    fn sub_second_timeout_rounds_up() {
        let (_, args) = ping_command("10.0.0.1".parse().unwrap(), Duration::from_millis(300));
        assert!(args.iter().any(|arg| arg == "1"));
    }

    #[tokio::test]
    #[ignore]
    async fn loopback_answers() {
        assert!(SystemPing.probe("127.0.0.1".parse().unwrap(), Duration::from_secs(1)).await);
    }

    #[tokio::test]
    #[ignore]
    async fn documentation_range_stays_silent() {
        assert!(!SystemPing.probe("203.0.113.1".parse().unwrap(), Duration::from_secs(1)).await);
    }
}
