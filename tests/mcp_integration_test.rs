//! MCP Server Integration Tests
//!
//! These tests spawn the server binary and talk JSON-RPC to it over stdio.
//! Tests that need a real `ast-grep` on PATH are ignored by default.

#![allow(deprecated)] // Allow deprecated cargo_bin for now

use assert_cmd::cargo::CommandCargoExt;
use assert_cmd::Command as AssertCommand;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use tempfile::TempDir;

/// MCP Test Client that communicates with the server via stdio
struct McpTestClient {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    request_id: i64,
}

impl McpTestClient {
    /// Spawn a new MCP server with extra CLI arguments and connect to it
    fn spawn(extra_args: &[&str]) -> Result<Self, Box<dyn std::error::Error>> {
        let mut child = Command::cargo_bin("ast-grep-mcp")?
            .args(extra_args)
            .env_remove("AST_GREP_CONFIG")
            .env_remove("AST_GREP_BIN")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdin = child.stdin.take().expect("Failed to get stdin");
        let stdout = BufReader::new(child.stdout.take().expect("Failed to get stdout"));

        Ok(Self {
            child,
            stdin,
            stdout,
            request_id: 0,
        })
    }

    /// Send a JSON-RPC request and get the response
    fn request(&mut self, method: &str, params: Value) -> Result<Value, Box<dyn std::error::Error>> {
        self.request_id += 1;
        let request = json!({
            "jsonrpc": "2.0",
            "id": self.request_id,
            "method": method,
            "params": params
        });

        writeln!(self.stdin, "{}", serde_json::to_string(&request)?)?;
        self.stdin.flush()?;

        let mut response_line = String::new();
        self.stdout.read_line(&mut response_line)?;

        Ok(serde_json::from_str(&response_line)?)
    }

    /// Send a raw line and read one response line
    fn send_raw(&mut self, line: &str) -> Result<Value, Box<dyn std::error::Error>> {
        writeln!(self.stdin, "{}", line)?;
        self.stdin.flush()?;

        let mut response_line = String::new();
        self.stdout.read_line(&mut response_line)?;

        Ok(serde_json::from_str(&response_line)?)
    }

    fn initialize(&mut self) -> Result<Value, Box<dyn std::error::Error>> {
        self.request(
            "initialize",
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": { "name": "test-client", "version": "1.0.0" }
            }),
        )
    }

    fn call_tool(&mut self, name: &str, arguments: Value) -> Result<Value, Box<dyn std::error::Error>> {
        self.request("tools/call", json!({ "name": name, "arguments": arguments }))
    }
}

impl Drop for McpTestClient {
    fn drop(&mut self) {
        let _ = self.child.kill();
    }
}

fn create_python_fixture() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(
        dir.path().join("example.py"),
        "def hello():\n    print(\"Hello, World!\")\n\ndef add(a, b):\n    return a + b\n\n\nclass Calculator:\n    pass\n",
    )
    .expect("Failed to write example.py");
    dir
}

fn tool_text(response: &Value) -> &str {
    response["result"]["content"][0]["text"]
        .as_str()
        .expect("Expected text content")
}

// ============================================================================
// Binary Tests
// ============================================================================

#[test]
fn test_binary_help() {
    AssertCommand::cargo_bin("ast-grep-mcp")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("MCP server"))
        .stdout(predicate::str::contains("AST_GREP_CONFIG"));
}

#[test]
fn test_binary_version() {
    AssertCommand::cargo_bin("ast-grep-mcp")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ast-grep-mcp"));
}

#[test]
fn test_missing_config_flag_refuses_to_start() {
    AssertCommand::cargo_bin("ast-grep-mcp")
        .unwrap()
        .env_remove("AST_GREP_CONFIG")
        .args(["--config", "/definitely/missing/sgconfig.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("/definitely/missing/sgconfig.yml"))
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_missing_config_env_refuses_to_start() {
    AssertCommand::cargo_bin("ast-grep-mcp")
        .unwrap()
        .env("AST_GREP_CONFIG", "/definitely/missing/from-env.yml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("AST_GREP_CONFIG"));
}

// ============================================================================
// Protocol Tests
// ============================================================================

#[test]
fn test_initialize_and_list_tools() {
    let mut client = McpTestClient::spawn(&[]).expect("Failed to spawn MCP server");

    let response = client.initialize().expect("Failed to initialize");
    assert_eq!(response["result"]["serverInfo"]["name"], "ast-grep");

    let response = client.request("tools/list", json!({})).expect("Failed to list tools");
    let names: Vec<&str> = response["result"]["tools"]
        .as_array()
        .expect("tools should be array")
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    for expected in [
        "dump_syntax_tree",
        "find_code",
        "find_code_by_rule",
        "supported_languages",
        "test_match_code_rule",
    ] {
        assert!(names.contains(&expected), "missing tool {expected}");
    }
}

#[test]
fn test_missing_engine_is_reported() {
    let mut client = McpTestClient::spawn(&["--engine", "definitely-not-ast-grep-xyz"])
        .expect("Failed to spawn MCP server");
    client.initialize().expect("Failed to initialize");

    let response = client
        .call_tool(
            "find_code",
            json!({ "project_folder": "/tmp", "pattern": "def $NAME($$$)" }),
        )
        .expect("Failed to call find_code");

    let message = response["error"]["message"]
        .as_str()
        .expect("Expected error for missing engine");
    assert!(message.contains("definitely-not-ast-grep-xyz"));
    assert!(message.contains("not found"));
}

#[test]
fn test_invalid_offset_rejected() {
    let mut client = McpTestClient::spawn(&["--engine", "definitely-not-ast-grep-xyz"])
        .expect("Failed to spawn MCP server");
    client.initialize().expect("Failed to initialize");

    // Rejected before the (missing) engine is ever launched.
    let response = client
        .call_tool(
            "find_code",
            json!({ "project_folder": "/tmp", "pattern": "x", "offset": -1 }),
        )
        .expect("Failed to call find_code");
    assert_eq!(response["error"]["code"], -32602);
}

#[test]
fn test_unparsable_line_gets_parse_error() {
    let mut client = McpTestClient::spawn(&[]).expect("Failed to spawn MCP server");

    let response = client.send_raw("this is not json").expect("Failed to send line");
    assert_eq!(response["error"]["code"], -32700);
    assert!(response["id"].is_null());

    // The server keeps serving afterwards.
    let response = client.request("ping", json!({})).expect("Failed to ping");
    assert_eq!(response["result"], json!({}));
}

// ============================================================================
// Engine Tests (require ast-grep on PATH)
// ============================================================================

#[test]
#[ignore = "Requires ast-grep on PATH - run with --ignored"]
fn test_find_code_python_functions() {
    let fixture = create_python_fixture();
    let mut client = McpTestClient::spawn(&[]).expect("Failed to spawn MCP server");
    client.initialize().expect("Failed to initialize");

    let response = client
        .call_tool(
            "find_code",
            json!({
                "project_folder": fixture.path().to_str().unwrap(),
                "pattern": "def $NAME($$$)",
                "language": "python",
                "output_format": "text"
            }),
        )
        .expect("Failed to call find_code");

    let text = tool_text(&response);
    assert!(text.contains("Found 2 matches"));
    assert!(text.contains("hello"));
    assert!(text.contains("add"));
}

#[test]
#[ignore = "Requires ast-grep on PATH - run with --ignored"]
fn test_find_code_by_rule_class_range() {
    let fixture = create_python_fixture();
    let mut client = McpTestClient::spawn(&[]).expect("Failed to spawn MCP server");
    client.initialize().expect("Failed to initialize");

    let response = client
        .call_tool(
            "find_code_by_rule",
            json!({
                "project_folder": fixture.path().to_str().unwrap(),
                "yaml": "id: test\nlanguage: python\nrule:\n  pattern: class $NAME\n  kind: class_definition",
                "output_format": "json"
            }),
        )
        .expect("Failed to call find_code_by_rule");

    let body: Value = serde_json::from_str(tool_text(&response)).unwrap();
    let first = &body["results"][0];
    assert_eq!(first["range"]["start"]["line"], 7);
    assert!(first["text"].as_str().unwrap().contains("Calculator"));
}

#[test]
#[ignore = "Requires ast-grep on PATH - run with --ignored"]
fn test_match_code_rule_no_matches() {
    let mut client = McpTestClient::spawn(&[]).expect("Failed to spawn MCP server");
    client.initialize().expect("Failed to initialize");

    let response = client
        .call_tool(
            "test_match_code_rule",
            json!({
                "code": "def foo(): pass",
                "yaml": "id: test\nlanguage: python\nrule:\n  pattern: class $NAME"
            }),
        )
        .expect("Failed to call test_match_code_rule");

    let message = response["error"]["message"].as_str().unwrap();
    assert!(message.contains("No matches found"));
}

#[test]
#[ignore = "Requires ast-grep on PATH - run with --ignored"]
fn test_paging_with_max_results() {
    let fixture = create_python_fixture();
    let mut client = McpTestClient::spawn(&[]).expect("Failed to spawn MCP server");
    client.initialize().expect("Failed to initialize");

    let folder = fixture.path().to_str().unwrap().to_string();
    let response = client
        .call_tool(
            "find_code",
            json!({
                "project_folder": folder,
                "pattern": "def $NAME($$$)",
                "language": "python",
                "max_results": 1
            }),
        )
        .expect("Failed to call find_code");
    let text = tool_text(&response);
    assert!(text.contains("showing first 1 of 2"));
    assert_eq!(text.matches("def ").count(), 1);
    assert!(text.contains("offset=1"));
}
