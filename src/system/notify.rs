//! Desktop notification sent when the daemon comes up.

use crate::traits::CommandRunner;
use log::warn;

const APP_NAME: &str = "lfn-shell";

/// Arguments for `notify-send` announcing that the shell started on
/// `host` at `started`.
pub fn start_notification_args(host: &str, started: &str, timeout_ms: u64) -> Vec<String> {
    vec![
        "-a".into(),
        APP_NAME.into(),
        "-u".into(),
        "normal".into(),
        "-i".into(),
        "system".into(),
        format!("{} started", APP_NAME),
        format!("Started on {}\n{}", host, started),
        "-t".into(),
        timeout_ms.to_string(),
    ]
}

/// Best-effort host name for display.
pub fn host_name() -> String {
    std::fs::read_to_string("/proc/sys/kernel/hostname")
        .ok()
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

/// Fire the startup notification on a background thread.
///
/// `notify-send` can block for a long time when no notification daemon
/// answers, so the caller never waits for it.
pub fn send_start_notification<R: CommandRunner>(runner: R, timeout_ms: u64) {
    let started = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let args = start_notification_args(&host_name(), &started, timeout_ms);
    std::thread::spawn(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        if let Err(e) = runner.run("notify-send", &args, None) {
            warn!("startup notification failed: {}", e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::testing::{Call, MockRunner};
    use std::time::{Duration, Instant};

    #[test]
    fn notification_arguments() {
        let args = start_notification_args("box", "2026-01-02 03:04:05", 7000);
        assert_eq!(args[0..6], ["-a", "lfn-shell", "-u", "normal", "-i", "system"]);
        assert_eq!(args[6], "lfn-shell started");
        assert_eq!(args[7], "Started on box\n2026-01-02 03:04:05");
        assert_eq!(args[8..], ["-t", "7000"]);
    }

    #[test]
    fn host_name_is_never_empty() {
        assert!(!host_name().is_empty());
    }

    #[test]
    fn notification_runs_notify_send() {
        let runner = MockRunner::default();
        send_start_notification(runner.clone(), 1000);

        let deadline = Instant::now() + Duration::from_secs(2);
        while runner.calls().is_empty() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        match runner.calls().first() {
            Some(Call::Run { program, args, .. }) => {
                assert_eq!(program, "notify-send");
                assert_eq!(args.last().map(String::as_str), Some("1000"));
            }
            other => panic!("unexpected calls: {:?}", other),
        }
    }
}
