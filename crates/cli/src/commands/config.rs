use std::env;
use std::fs;
use std::path::Path;

use haggle_core::config::{resolve_config_path, AppConfig, LoadOptions};
use secrecy::{ExposeSecret, SecretString};
use toml::Value;

pub fn run(options: &LoadOptions) -> String {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let fields: Vec<(&str, String, &[&str])> = vec![
        ("llm.api_key", redact_secret(Some(&config.llm.api_key)), &["HAGGLE_LLM_API_KEY", "GEMINI_API_KEY"]),
        ("llm.base_url", config.llm.base_url.clone(), &["HAGGLE_LLM_BASE_URL"]),
        ("llm.model", config.llm.model.clone(), &["HAGGLE_LLM_MODEL"]),
        ("llm.timeout_secs", config.llm.timeout_secs.to_string(), &["HAGGLE_LLM_TIMEOUT_SECS"]),
        ("llm.max_retries", config.llm.max_retries.to_string(), &["HAGGLE_LLM_MAX_RETRIES"]),
        (
            "llm.retry_backoff_ms",
            config.llm.retry_backoff_ms.to_string(),
            &["HAGGLE_LLM_RETRY_BACKOFF_MS"],
        ),
        (
            "classifier.provider",
            format!("{:?}", config.classifier.provider).to_ascii_lowercase(),
            &["HAGGLE_CLASSIFIER_PROVIDER"],
        ),
        (
            "classifier.api_key",
            redact_secret(config.classifier.api_key.as_ref()),
            &["HAGGLE_CLASSIFIER_API_KEY", "HF_API_TOKEN"],
        ),
        ("classifier.base_url", config.classifier.base_url.clone(), &["HAGGLE_CLASSIFIER_BASE_URL"]),
        ("classifier.model", config.classifier.model.clone(), &["HAGGLE_CLASSIFIER_MODEL"]),
        (
            "classifier.timeout_secs",
            config.classifier.timeout_secs.to_string(),
            &["HAGGLE_CLASSIFIER_TIMEOUT_SECS"],
        ),
        ("server.bind_address", config.server.bind_address.clone(), &["HAGGLE_SERVER_BIND_ADDRESS"]),
        ("server.port", config.server.port.to_string(), &["HAGGLE_SERVER_PORT"]),
        (
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["HAGGLE_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        ("logging.level", config.logging.level.clone(), &["HAGGLE_LOGGING_LEVEL", "HAGGLE_LOG_LEVEL"]),
        (
            "logging.format",
            format!("{:?}", config.logging.format).to_ascii_lowercase(),
            &["HAGGLE_LOGGING_FORMAT", "HAGGLE_LOG_FORMAT"],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_keys) in fields {
        let source =
            field_source(key, env_keys, config_file_doc.as_ref(), config_file_path.as_deref());
        lines.push(render_line(key, &value, source));
    }

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_secret(secret: Option<&SecretString>) -> String {
    let Some(secret) = secret else {
        return "<unset>".to_string();
    };

    let trimmed = secret.expose_secret().trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    // Keep a short prefix so operators can tell which key is loaded.
    match trimmed.get(..4) {
        Some(prefix) if trimmed.len() > 12 => format!("{prefix}***"),
        _ => "<redacted>".to_string(),
    }
}
