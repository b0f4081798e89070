use std::collections::HashMap;

use super::*;

fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn minimal_config_uses_anthropic_defaults() {
    let cfg = LlmConfig::from_lookup(vars(&[("LLM_API_KEY_ENV", "BOARD_KEY"), ("BOARD_KEY", "secret")])).unwrap();
    assert_eq!(cfg.provider, LlmProviderKind::Anthropic);
    assert_eq!(cfg.model, LlmProviderKind::Anthropic.default_model());
    assert_eq!(cfg.api_key, "secret");
    assert_eq!(cfg.openai_base_url, DEFAULT_OPENAI_BASE_URL);
    assert_eq!(cfg.timeouts, LlmTimeouts::default());
    assert_eq!(cfg.retry, RetryPolicy::default());
}

#[test]
fn openai_with_overrides() {
    let cfg = LlmConfig::from_lookup(vars(&[
        ("LLM_PROVIDER", "OpenAI"),
        ("LLM_API_KEY_ENV", "OPENAI_API_KEY"),
        ("OPENAI_API_KEY", "sk-test"),
        ("LLM_OPENAI_BASE_URL", "http://localhost:11434/v1/"),
        ("LLM_MODEL", "llama3"),
        ("LLM_REQUEST_TIMEOUT_SECS", "30"),
        ("LLM_CONNECT_TIMEOUT_SECS", "3"),
        ("LLM_MAX_RETRIES", "0"),
        ("LLM_RETRY_BACKOFF_MS", "50"),
    ]))
    .unwrap();
    assert_eq!(cfg.provider, LlmProviderKind::OpenAi);
    assert_eq!(cfg.model, "llama3");
    assert_eq!(cfg.openai_base_url, "http://localhost:11434/v1");
    assert_eq!(cfg.timeouts.request(), Duration::from_secs(30));
    assert_eq!(cfg.timeouts.connect(), Duration::from_secs(3));
    assert_eq!(cfg.retry, RetryPolicy { max_retries: 0, backoff: Duration::from_millis(50) });
}

#[test]
fn missing_key_env_is_reported() {
    let err = LlmConfig::from_lookup(vars(&[])).unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey { var } if var == "LLM_API_KEY_ENV"));
}

#[test]
fn blank_key_counts_as_missing() {
    let err = LlmConfig::from_lookup(vars(&[("LLM_API_KEY_ENV", "K"), ("K", "  ")])).unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey { var } if var == "K"));
}

#[test]
fn unknown_provider_is_rejected() {
    let err = LlmConfig::from_lookup(vars(&[("LLM_PROVIDER", "mystery"), ("LLM_API_KEY_ENV", "K"), ("K", "v")]))
        .unwrap_err();
    assert!(matches!(err, LlmError::ConfigParse(msg) if msg.contains("mystery")));
}

#[test]
fn unparseable_numbers_fall_back() {
    let cfg = LlmConfig::from_lookup(vars(&[
        ("LLM_API_KEY_ENV", "K"),
        ("K", "v"),
        ("LLM_REQUEST_TIMEOUT_SECS", "soon"),
        ("LLM_MAX_RETRIES", "-1"),
    ]))
    .unwrap();
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    assert_eq!(cfg.retry.max_retries, DEFAULT_MAX_RETRIES);
}
