//! Process-level startup checks: the agent must fail fast with exit code 1
//! when the broker is unreachable or the configuration is unusable.

use assert_cmd::Command;
use std::time::Duration;

#[test]
fn unreachable_broker_exits_one() {
    // Port 1 on loopback: nothing listens there, so connect is refused at once.
    Command::cargo_bin("procpulse_agent")
        .unwrap()
        .env("REDIS_HOST", "127.0.0.1")
        .env("REDIS_PORT", "1")
        .timeout(Duration::from_secs(10))
        .assert()
        .failure()
        .code(1);
}

#[test]
fn invalid_port_exits_one() {
    Command::cargo_bin("procpulse_agent")
        .unwrap()
        .env("REDIS_PORT", "not-a-number")
        .timeout(Duration::from_secs(10))
        .assert()
        .failure()
        .code(1);
}
