//! Recording switch fake.
//!
//! Stands in for the real switch gateway in tests: every command is
//! recorded, scripted responses cover the read operations, and failures
//! can be injected by command substring.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use ovsnet_common::{ExecResult, NetMgrResult, SwitchControlPort};

/// Which control surface received a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandFamily {
    /// Port/bridge table mutation (`ovs-vsctl`).
    Table,
    /// Flow table mutation (`ovs-ofctl`).
    Flow,
    /// Host link state (`ip`).
    Link,
}

/// One command observed by the fake.
#[derive(Debug, Clone)]
pub struct RecordedCommand {
    /// The control surface.
    pub family: CommandFamily,
    /// The argument vector as issued.
    pub args: Vec<String>,
}

impl RecordedCommand {
    /// The argument vector joined for substring assertions.
    pub fn text(&self) -> String {
        self.args.join(" ")
    }
}

#[derive(Default)]
struct State {
    commands: Vec<RecordedCommand>,
    fail_on: Vec<String>,
    ofports: HashMap<String, u32>,
    missing_bridges: HashSet<String>,
}

/// Recording fake standing in for a real switch.
///
/// By default every command succeeds, every bridge exists, and no port
/// resolves to a datapath number; tests script the rest.
#[derive(Default)]
pub struct RecordingSwitch {
    state: Mutex<State>,
}

impl RecordingSwitch {
    /// Creates an empty recording switch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the datapath number reported for a port.
    pub fn with_ofport(self, port: &str, number: u32) -> Self {
        self.state
            .lock()
            .unwrap()
            .ofports
            .insert(port.to_string(), number);
        self
    }

    /// Injects a failure (exit 1) for any command whose joined text
    /// contains the needle.
    pub fn with_failure(self, needle: &str) -> Self {
        self.state.lock().unwrap().fail_on.push(needle.to_string());
        self
    }

    /// Marks a bridge as absent so `br-exists` reports it missing until
    /// an `add-br` for it is observed.
    pub fn with_missing_bridge(self, bridge: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .missing_bridges
            .insert(bridge.to_string());
        self
    }

    /// All commands observed so far.
    pub fn commands(&self) -> Vec<RecordedCommand> {
        self.state.lock().unwrap().commands.clone()
    }

    /// Joined command texts, for ordering and substring assertions.
    pub fn command_texts(&self) -> Vec<String> {
        self.commands().iter().map(RecordedCommand::text).collect()
    }

    fn respond(&self, family: CommandFamily, args: &[String]) -> ExecResult {
        let mut state = self.state.lock().unwrap();
        state.commands.push(RecordedCommand {
            family,
            args: args.to_vec(),
        });

        let text = args.join(" ");
        tracing::debug!(?family, command = %text, "Recorded switch command");
        if state.fail_on.iter().any(|needle| text.contains(needle)) {
            return ExecResult {
                exit_code: 1,
                stdout: String::new(),
                stderr: "simulated failure".to_string(),
            };
        }

        if family == CommandFamily::Table {
            match args.first().map(String::as_str) {
                Some("br-exists") => {
                    let absent = args
                        .get(1)
                        .map(|b| state.missing_bridges.contains(b))
                        .unwrap_or(false);
                    return ExecResult {
                        exit_code: if absent { 2 } else { 0 },
                        stdout: String::new(),
                        stderr: String::new(),
                    };
                }
                Some("add-br") => {
                    if let Some(bridge) = args.get(1) {
                        state.missing_bridges.remove(bridge);
                    }
                }
                Some("get") if args.get(3).map(String::as_str) == Some("ofport") => {
                    let port = args.get(2).cloned().unwrap_or_default();
                    return match state.ofports.get(&port) {
                        Some(number) => ExecResult {
                            exit_code: 0,
                            stdout: number.to_string(),
                            stderr: String::new(),
                        },
                        None => ExecResult {
                            exit_code: 1,
                            stdout: String::new(),
                            stderr: format!("no row \"{port}\" in table Interface"),
                        },
                    };
                }
                _ => {}
            }
        }

        ExecResult {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

#[async_trait]
impl SwitchControlPort for RecordingSwitch {
    async fn table_cmd(&self, args: &[String]) -> NetMgrResult<ExecResult> {
        Ok(self.respond(CommandFamily::Table, args))
    }

    async fn flow_cmd(&self, args: &[String]) -> NetMgrResult<ExecResult> {
        Ok(self.respond(CommandFamily::Flow, args))
    }

    async fn link_cmd(&self, args: &[String]) -> NetMgrResult<ExecResult> {
        Ok(self.respond(CommandFamily::Link, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_records_commands() {
        let switch = RecordingSwitch::new();
        switch
            .table_cmd(&args(&["add-port", "cloud", "vm-88"]))
            .await
            .unwrap();
        switch
            .flow_cmd(&args(&["del-flows", "cloud", "in_port=245"]))
            .await
            .unwrap();

        let recorded = switch.commands();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].family, CommandFamily::Table);
        assert_eq!(recorded[0].text(), "add-port cloud vm-88");
        assert_eq!(recorded[1].family, CommandFamily::Flow);
    }

    #[tokio::test]
    async fn test_scripted_ofport() {
        let switch = RecordingSwitch::new().with_ofport("vm-88", 245);
        assert_eq!(switch.port_number("vm-88").await.unwrap(), 245);
        assert!(switch.port_number("vm-99").await.is_err());
    }

    #[tokio::test]
    async fn test_missing_bridge_until_created() {
        let switch = RecordingSwitch::new().with_missing_bridge("tenant1");

        let probe = switch.table_cmd(&args(&["br-exists", "tenant1"])).await.unwrap();
        assert_eq!(probe.exit_code, 2);

        switch.table_cmd(&args(&["add-br", "tenant1"])).await.unwrap();

        let probe = switch.table_cmd(&args(&["br-exists", "tenant1"])).await.unwrap();
        assert!(probe.success());
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let switch = RecordingSwitch::new().with_failure("del-flows");
        let result = switch
            .flow_cmd(&args(&["del-flows", "cloud", "in_port=245"]))
            .await
            .unwrap();
        assert_eq!(result.exit_code, 1);
        assert_eq!(result.stderr, "simulated failure");
    }
}
