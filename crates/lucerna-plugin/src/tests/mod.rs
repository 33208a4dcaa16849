//! Crate-level end-to-end tests driving the engine through full
//! daemon conversations.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixListener;
use std::thread::JoinHandle;

use serde_json::{Value, json};
use tempfile::TempDir;

use crate::engine::Plugin;
use crate::error::PluginError;
use crate::method::RpcMethod;
use crate::options::{OptionKind, PluginOption};

/// Runs the daemon's side of the handshake plus whatever `extra_lines`
/// follow, returning the plugin's output lines.
fn converse(plugin: &mut Plugin, lightning_dir: &str, extra_lines: &[&str]) -> Vec<Value> {
    let mut input = String::new();
    input.push_str(r#"{"jsonrpc":"2.0","method":"getmanifest","params":{},"id":"1"}"#);
    input.push('\n');
    input.push_str(
        &json!({
            "jsonrpc": "2.0",
            "method": "init",
            "params": {
                "configuration": {
                    "lightning-dir": lightning_dir,
                    "rpc-file": "lightning-rpc",
                },
                "options": {"greeting": "bonjour"},
            },
            "id": "2",
        })
        .to_string(),
    );
    input.push('\n');
    for line in extra_lines {
        input.push_str(line);
        input.push('\n');
    }

    let mut output = Vec::new();
    plugin
        .run(input.as_bytes(), &mut output)
        .expect("loop runs to end of stream");
    String::from_utf8(output)
        .expect("output is UTF-8")
        .lines()
        .map(|line| serde_json::from_str(line).expect("output line is JSON"))
        .collect()
}

/// Binds a scripted daemon on `lightning-rpc` in `dir`, answering one
/// control-socket request with `reply`.
fn scripted_daemon(dir: &TempDir, reply: &str) -> JoinHandle<Value> {
    let path = dir.path().join("lightning-rpc");
    let listener = UnixListener::bind(&path).expect("bind listener");
    let reply = reply.to_owned();
    std::thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
        let mut line = String::new();
        reader.read_line(&mut line).expect("read request");
        let request: Value = serde_json::from_str(line.trim()).expect("request is JSON");
        let mut stream = stream;
        stream.write_all(reply.as_bytes()).expect("write reply");
        stream.write_all(b"\n").expect("write newline");
        request
    })
}

fn greeting_plugin() -> Plugin {
    Plugin::builder()
        .option(PluginOption::new(
            "greeting",
            "hi",
            "greeting text",
            OptionKind::String,
        ))
        .expect("register greeting")
        .rpc_method(RpcMethod::new("bye", |_ctx, _params| {
            Ok(json!("Bye bye world!"))
        }))
        .expect("register bye")
        .build()
}

#[test]
fn full_handshake_then_user_method() {
    let mut plugin = greeting_plugin();
    let responses = converse(
        &mut plugin,
        "/tmp/lightning",
        &[r#"{"jsonrpc":"2.0","method":"bye","params":{},"id":"3"}"#],
    );
    assert_eq!(responses.len(), 3);

    let manifest = responses
        .first()
        .and_then(|r| r.get("result"))
        .expect("manifest result");
    assert_eq!(
        manifest
            .get("options")
            .and_then(Value::as_array)
            .and_then(|options| options.first())
            .and_then(|option| option.get("name")),
        Some(&json!("greeting"))
    );
    assert_eq!(
        manifest
            .get("rpcmethods")
            .and_then(Value::as_array)
            .and_then(|methods| methods.first())
            .and_then(|method| method.get("name")),
        Some(&json!("bye"))
    );

    assert_eq!(responses.get(1), Some(&json!({"jsonrpc": "2.0", "result": {}, "id": "2"})));
    assert_eq!(
        responses.get(2),
        Some(&json!({"jsonrpc": "2.0", "result": "Bye bye world!", "id": "3"}))
    );
    assert_eq!(plugin.option_value("greeting"), Some(&json!("bonjour")));
}

#[test]
fn handler_calls_back_into_the_daemon() {
    let dir = TempDir::new().expect("tempdir");
    let daemon = scripted_daemon(
        &dir,
        r#"{"jsonrpc":"2.0","result":{"alias":"lucerna-node"},"id":1}"#,
    );

    let mut plugin = Plugin::builder()
        .rpc_method(RpcMethod::new("alias", |ctx, _params| {
            let info = ctx.rpc()?.get_info()?;
            info.get("alias")
                .cloned()
                .ok_or_else(|| PluginError::handler("daemon reported no alias"))
        }))
        .expect("register alias")
        .build();

    let lightning_dir = dir.path().to_str().expect("UTF-8 tempdir").to_owned();
    let responses = converse(
        &mut plugin,
        &lightning_dir,
        &[r#"{"jsonrpc":"2.0","method":"alias","params":{},"id":"3"}"#],
    );

    assert_eq!(
        responses.get(2),
        Some(&json!({"jsonrpc": "2.0", "result": "lucerna-node", "id": "3"}))
    );
    let control_request = daemon.join().expect("join daemon");
    assert_eq!(control_request.get("method"), Some(&json!("getinfo")));
}

#[test]
fn daemon_rpc_failure_drops_the_request_but_not_the_loop() {
    let dir = TempDir::new().expect("tempdir");
    // No listener is bound, so the control-socket call fails.

    let mut plugin = Plugin::builder()
        .rpc_method(RpcMethod::new("alias", |ctx, _params| {
            Ok(ctx.rpc()?.get_info()?)
        }))
        .expect("register alias")
        .rpc_method(RpcMethod::new("bye", |_ctx, _params| {
            Ok(json!("Bye bye world!"))
        }))
        .expect("register bye")
        .build();

    let lightning_dir = dir.path().to_str().expect("UTF-8 tempdir").to_owned();
    let responses = converse(
        &mut plugin,
        &lightning_dir,
        &[
            r#"{"jsonrpc":"2.0","method":"alias","params":{},"id":"3"}"#,
            r#"{"jsonrpc":"2.0","method":"bye","params":{},"id":"4"}"#,
        ],
    );

    // Handshake responses plus bye; the failed alias request is dropped.
    assert_eq!(responses.len(), 3);
    assert_eq!(
        responses.get(2),
        Some(&json!({"jsonrpc": "2.0", "result": "Bye bye world!", "id": "4"}))
    );
}
