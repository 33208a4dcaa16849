//! Demonstration plugin for the Lightning daemon.
//!
//! Registers a `greeting` startup option, `hello`/`bye`/`peers` methods, a
//! subscription on `connect` notifications and a `peer_connected` hook,
//! then hands the process over to the dispatch loop. Point the daemon at
//! the built binary with `--plugin` to try it.
//!
//! Stdout belongs to the protocol, so all logging goes to stderr; set
//! `RUST_LOG=lucerna_plugin=debug` to watch the dispatch loop work.

use std::process::ExitCode;

use serde_json::{Value, json};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use lucerna_plugin::{Context, OptionKind, Plugin, PluginError, PluginOption, RpcMethod};

fn hello(ctx: &Context<'_>, _params: &Value) -> Result<Value, PluginError> {
    let greeting = ctx
        .option_value("greeting")
        .and_then(Value::as_str)
        .unwrap_or("Hello");
    Ok(json!(format!("{greeting} world!")))
}

fn peers(ctx: &Context<'_>, _params: &Value) -> Result<Value, PluginError> {
    Ok(ctx.rpc()?.list_peers(None, None)?)
}

fn build_plugin() -> Result<Plugin, PluginError> {
    Ok(Plugin::builder()
        .option(PluginOption::new(
            "greeting",
            "Hello",
            "Greeting used by the hello method",
            OptionKind::String,
        ))?
        .rpc_method(
            RpcMethod::new("hello", hello)
                .with_description("launch me so that I can greet the world"),
        )?
        .rpc_method(
            RpcMethod::new("bye", |_ctx, _params| Ok(json!("Bye bye world!")))
                .with_description("launch me so that I can say bye"),
        )?
        .rpc_method(
            RpcMethod::new("peers", peers)
                .with_description("list peers through the control socket"),
        )?
        .subscribe("connect", |_ctx, params| {
            info!(?params, "peer connected");
        })
        .hook("peer_connected", |_ctx, _params| {
            Ok(json!({"result": "continue"}))
        })
        .build())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut plugin = match build_plugin() {
        Ok(plugin) => plugin,
        Err(err) => {
            error!(%err, "failed to assemble plugin");
            return ExitCode::FAILURE;
        }
    };
    match plugin.run_stdio() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "plugin engine stopped");
            ExitCode::FAILURE
        }
    }
}
