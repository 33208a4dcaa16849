//! Unit tests for method descriptors.

use serde_json::json;

use crate::context::Context;

use super::*;

#[test]
fn builder_fills_metadata() {
    let method = RpcMethod::new("bye", |_ctx, _params| Ok(json!("Bye bye world!")))
        .with_usage("[name]")
        .with_description("say bye")
        .with_long_description("says bye to someone, or the world");
    assert_eq!(method.name(), "bye");
    assert_eq!(method.usage(), "[name]");
    assert_eq!(method.description(), "say bye");
    assert_eq!(method.long_description(), "says bye to someone, or the world");
}

#[test]
fn metadata_defaults_to_empty_strings() {
    let method = RpcMethod::new("noop", |_ctx, _params| Ok(json!({})));
    assert_eq!(method.usage(), "");
    assert_eq!(method.description(), "");
    assert_eq!(method.long_description(), "");
}

#[test]
fn invoke_passes_params_through_to_the_handler() {
    let method = RpcMethod::new("echo", |_ctx, params| Ok(params.clone()));
    let ctx = Context::new(None, &[]);
    let result = method
        .invoke(&ctx, &json!({"k": "v"}))
        .expect("handler result");
    assert_eq!(result, json!({"k": "v"}));
}

#[test]
fn invoke_surfaces_handler_errors() {
    let method = RpcMethod::new("boom", |_ctx, _params| {
        Err(crate::PluginError::handler("nope"))
    });
    let ctx = Context::new(None, &[]);
    let err = method.invoke(&ctx, &json!({})).expect_err("handler error");
    assert_eq!(err.to_string(), "nope");
}
