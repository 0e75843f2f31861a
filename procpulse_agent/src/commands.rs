//! Inbound command grammar and handler stubs.

use tracing::info;

/// A control directive received on the commands channel. The colon-delimited
/// grammar is shared with the aggregator; pid and value stay unparsed strings
/// here because the real handlers own that validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Kill { pid: String },
    Throttle { pid: String, value: String },
    Unknown { raw: String },
}

impl Command {
    /// `None` means the command is malformed (a throttle missing its second
    /// separator) and is dropped without a diagnostic.
    pub fn parse(raw: &str) -> Option<Command> {
        if let Some(pid) = raw.strip_prefix("kill:") {
            return Some(Command::Kill {
                pid: pid.to_string(),
            });
        }
        if let Some(rest) = raw.strip_prefix("throttle:") {
            return rest.split_once(':').map(|(pid, value)| Command::Throttle {
                pid: pid.to_string(),
                value: value.to_string(),
            });
        }
        Some(Command::Unknown {
            raw: raw.to_string(),
        })
    }
}

/// Routes one raw command to exactly one handler. Never panics on any input.
pub fn dispatch(raw: &str) {
    match Command::parse(raw) {
        Some(Command::Kill { pid }) => handle_kill(&pid),
        Some(Command::Throttle { pid, value }) => handle_throttle(&pid, &value),
        Some(Command::Unknown { raw }) => info!("[CMD] unknown: {raw}"),
        None => {}
    }
}

// Process control stays stubbed until the throttle value semantics are settled
// with the aggregator; the log lines are the contract the dashboard scrapes.
fn handle_kill(pid: &str) {
    info!("[CMD] kill requested for PID {pid} (stub)");
}

fn handle_throttle(pid: &str, value: &str) {
    info!("[CMD] throttle PID {pid} to {value} (stub)");
}
