//! Unit tests for option descriptors.

use rstest::rstest;
use serde_json::json;

use super::*;

#[rstest]
#[case::string(OptionKind::String, "string")]
#[case::int(OptionKind::Int, "int")]
#[case::bool(OptionKind::Bool, "bool")]
#[case::flag(OptionKind::Flag, "flag")]
fn kind_canonical_names(#[case] kind: OptionKind, #[case] expected: &str) {
    assert_eq!(kind.as_str(), expected);
    assert_eq!(kind.to_string(), expected);
    assert_eq!(serde_json::to_value(kind).expect("serialise"), json!(expected));
}

#[test]
fn new_option_has_no_value() {
    let option = PluginOption::new("greeting", "hi", "greeting text", OptionKind::String);
    assert_eq!(option.name(), "greeting");
    assert_eq!(option.default_value(), "hi");
    assert_eq!(option.description(), "greeting text");
    assert_eq!(option.kind(), OptionKind::String);
    assert!(option.value().is_none());
}

#[test]
fn bind_records_the_supplied_value() {
    let mut option = PluginOption::new("greeting", "hi", "greeting text", OptionKind::String);
    option.bind(json!("bonjour"));
    assert_eq!(option.value(), Some(&json!("bonjour")));
}
