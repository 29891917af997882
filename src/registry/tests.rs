use super::*;
use crate::config::ProviderConfig;
use crate::provider::testing::{stub_entry, StubProvider};
use std::sync::Arc;
use std::time::Duration;

fn names(entries: &[ProviderEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.name()).collect()
}

#[test]
fn test_provider_type_serialization() {
    assert_eq!(
        serde_json::to_string(&ProviderType::OpenAI).unwrap(),
        r#""openai""#
    );
    let parsed: ProviderType = serde_json::from_str(r#""generic""#).unwrap();
    assert_eq!(parsed, ProviderType::Generic);
    assert_eq!(ProviderType::OpenAI.to_string(), "openai");
}

#[test]
fn test_providers_for_model_sorted_by_priority() {
    let registry = ProviderRegistry::new(vec![
        stub_entry("c", 3, &["m"]),
        stub_entry("a", 1, &["m"]),
        stub_entry("b", 2, &["m", "other"]),
    ])
    .unwrap();

    assert_eq!(names(&registry.providers_for_model("m")), vec!["a", "b", "c"]);
    assert_eq!(names(&registry.providers_for_model("other")), vec!["b"]);
}

#[test]
fn test_equal_priority_keeps_registration_order() {
    let registry = ProviderRegistry::new(vec![
        stub_entry("second", 5, &["m"]),
        stub_entry("first", 1, &["m"]),
        stub_entry("third", 5, &["m"]),
    ])
    .unwrap();
    assert_eq!(
        names(&registry.providers_for_model("m")),
        vec!["first", "second", "third"]
    );
}

#[test]
fn test_disabled_providers_are_not_candidates() {
    let mut descriptor = ProviderDescriptor::new("off", "http://off", &["m"]);
    descriptor.enabled = false;
    let registry = ProviderRegistry::new(vec![
        ProviderEntry::new(descriptor, Arc::new(StubProvider::new("off"))),
        stub_entry("on", 9, &["m"]),
    ])
    .unwrap();

    assert_eq!(names(&registry.providers_for_model("m")), vec!["on"]);
    assert_eq!(registry.all_providers().len(), 2);
    assert!(registry.models().contains("m"));
}

#[test]
fn test_unknown_model_yields_empty() {
    let registry = ProviderRegistry::new(vec![stub_entry("a", 1, &["m"])]).unwrap();
    assert!(registry.providers_for_model("nope").is_empty());
}

#[test]
fn test_duplicate_names_rejected() {
    let result = ProviderRegistry::new(vec![stub_entry("a", 1, &["m"]), stub_entry("a", 2, &["n"])]);
    assert!(matches!(result, Err(RegistryError::DuplicateProvider(name)) if name == "a"));
}

#[test]
fn test_get_by_name() {
    let registry = ProviderRegistry::new(vec![stub_entry("a", 1, &["m"])]).unwrap();
    assert_eq!(registry.get("a").unwrap().descriptor.priority, 1);
    assert!(matches!(
        registry.get("zzz"),
        Err(RegistryError::ProviderNotFound(_))
    ));
}

#[test]
fn test_replace_swaps_whole_table() {
    let registry = ProviderRegistry::new(vec![stub_entry("old", 1, &["m"])]).unwrap();
    let before = registry.snapshot();

    registry
        .replace(vec![stub_entry("new", 1, &["m"]), stub_entry("extra", 2, &["n"])])
        .unwrap();

    // Holders of the previous generation keep a consistent view.
    assert_eq!(names(&before.providers_for_model("m")), vec!["old"]);
    assert_eq!(names(&registry.providers_for_model("m")), vec!["new"]);
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_failed_replace_keeps_current_table() {
    let registry = ProviderRegistry::new(vec![stub_entry("a", 1, &["m"])]).unwrap();
    let result = registry.replace(vec![stub_entry("x", 1, &["m"]), stub_entry("x", 1, &["m"])]);
    assert!(result.is_err());
    assert_eq!(names(&registry.providers_for_model("m")), vec!["a"]);
}

#[test]
fn test_descriptor_from_config() {
    let config: ProviderConfig = toml::from_str(
        r#"
        name = "vllm"
        url = "http://gpu:8000/"
        models = ["llama3", "llama3"]
        priority = 3
        timeout_seconds = 15
        max_retries = 2
        retry_delay_ms = 500
        rate_limit_rpm = 120
        "#,
    )
    .unwrap();
    let descriptor = ProviderDescriptor::from(&config);
    assert_eq!(descriptor.base_url, "http://gpu:8000");
    assert_eq!(descriptor.models.len(), 1);
    assert!(descriptor.serves("llama3"));
    assert_eq!(descriptor.timeout, Duration::from_secs(15));
    assert_eq!(descriptor.retry_delay, Some(Duration::from_millis(500)));

    let view = ProviderView::from(&descriptor);
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["type"], "generic");
    assert_eq!(json["retry_delay_ms"], 500);
    assert_eq!(json["rate_limit_rpm"], 120);
}

#[test]
fn test_view_omits_unset_overrides() {
    let view = ProviderView::from(&ProviderDescriptor::new("p", "http://p", &["m"]));
    let json = serde_json::to_value(&view).unwrap();
    assert!(json.get("max_retries").is_none());
    assert_eq!(json["timeout_seconds"], 60);
}
