//! Unit tests for the plugin registry.

use serde_json::{Value, json};

use crate::error::PluginError;
use crate::method::RpcMethod;
use crate::options::{OptionKind, PluginOption};

use super::*;

fn method(name: &str) -> RpcMethod {
    RpcMethod::new(name, |_ctx, _params| Ok(json!({})))
}

fn option(name: &str) -> PluginOption {
    PluginOption::new(name, "", "", OptionKind::String)
}

// ---------------------------------------------------------------------------
// Method registration
// ---------------------------------------------------------------------------

#[test]
fn methods_keep_registration_order() {
    let mut registry = PluginRegistry::new();
    registry.register_method(method("bye")).expect("register bye");
    registry
        .register_method(method("hello"))
        .expect("register hello");
    registry
        .register_method(method("again"))
        .expect("register again");

    let names: Vec<&str> = registry.methods().iter().map(RpcMethod::name).collect();
    assert_eq!(names, vec!["bye", "hello", "again"]);
}

#[test]
fn duplicate_method_names_are_rejected() {
    let mut registry = PluginRegistry::new();
    registry.register_method(method("bye")).expect("first bye");
    let err = registry
        .register_method(method("bye"))
        .expect_err("second bye");
    assert!(matches!(err, PluginError::DuplicateMethod { name } if name == "bye"));
}

#[test]
fn reserved_names_are_rejected() {
    let mut registry = PluginRegistry::new();
    for name in ["init", "getmanifest"] {
        let err = registry
            .register_method(method(name))
            .expect_err("reserved name");
        assert!(matches!(err, PluginError::ReservedName { .. }));
    }
    assert!(registry.methods().is_empty());
}

#[test]
fn empty_method_names_are_rejected() {
    let mut registry = PluginRegistry::new();
    let err = registry.register_method(method("")).expect_err("empty name");
    assert!(matches!(err, PluginError::EmptyMethodName));
}

#[test]
fn method_lookup_finds_registered_names_only() {
    let mut registry = PluginRegistry::new();
    registry.register_method(method("bye")).expect("register bye");
    assert!(registry.method("bye").is_some());
    assert!(registry.method("hello").is_none());
}

// ---------------------------------------------------------------------------
// Option registration
// ---------------------------------------------------------------------------

#[test]
fn options_keep_registration_order() {
    let mut registry = PluginRegistry::new();
    registry
        .register_option(option("greeting"))
        .expect("register greeting");
    registry
        .register_option(option("verbose"))
        .expect("register verbose");

    let names: Vec<&str> = registry.options().iter().map(PluginOption::name).collect();
    assert_eq!(names, vec!["greeting", "verbose"]);
}

#[test]
fn duplicate_option_names_are_rejected() {
    let mut registry = PluginRegistry::new();
    registry
        .register_option(option("greeting"))
        .expect("first greeting");
    let err = registry
        .register_option(option("greeting"))
        .expect_err("second greeting");
    assert!(matches!(err, PluginError::DuplicateOption { name } if name == "greeting"));
}

// ---------------------------------------------------------------------------
// Subscriptions and hooks
// ---------------------------------------------------------------------------

#[test]
fn resubscribing_replaces_the_notification_handler() {
    let mut registry = PluginRegistry::new();
    registry.subscribe("connect", Box::new(|_ctx, _params| {}));
    registry.subscribe("connect", Box::new(|_ctx, _params| {}));

    let topics: Vec<&str> = registry.subscription_topics().collect();
    assert_eq!(topics, vec!["connect"]);
}

#[test]
fn rehooking_replaces_the_hook_handler() {
    let mut registry = PluginRegistry::new();
    registry.hook("peer_connected", Box::new(|_ctx, _params| Ok(json!(1))));
    registry.hook("peer_connected", Box::new(|_ctx, _params| Ok(json!(2))));

    let ctx = crate::context::Context::new(None, &[]);
    let handler = registry
        .hook_handler("peer_connected")
        .expect("hook handler");
    let result = handler(&ctx, &Value::Null).expect("hook result");
    assert_eq!(result, json!(2));
}

#[test]
fn hooks_and_methods_occupy_distinct_namespaces() {
    let mut registry = PluginRegistry::new();
    registry
        .register_method(method("clash"))
        .expect("register method");
    registry.hook("clash", Box::new(|_ctx, _params| Ok(json!({}))));

    assert!(registry.method("clash").is_some());
    assert!(registry.hook_handler("clash").is_some());
    assert!(registry.subscription("clash").is_none());
}

#[test]
fn topic_listings_cover_both_kinds() {
    let mut registry = PluginRegistry::new();
    registry.subscribe("connect", Box::new(|_ctx, _params| {}));
    registry.subscribe("warning", Box::new(|_ctx, _params| {}));
    registry.hook("peer_connected", Box::new(|_ctx, _params| Ok(json!({}))));

    let subscriptions: Vec<&str> = registry.subscription_topics().collect();
    let hooks: Vec<&str> = registry.hook_topics().collect();
    assert_eq!(subscriptions, vec!["connect", "warning"]);
    assert_eq!(hooks, vec!["peer_connected"]);
}
