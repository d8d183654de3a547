use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["haggle.toml", "config/haggle.toml"];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub classifier: ClassifierConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

#[derive(Clone, Debug)]
pub struct ClassifierConfig {
    pub provider: ClassifierProvider,
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierProvider {
    /// Hosted inference endpoint serving a pretrained sentiment model.
    Hosted,
    /// Offline keyword scoring, for local runs without network access.
    Lexicon,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub llm_api_key: Option<String>,
    pub llm_model: Option<String>,
    pub classifier_provider: Option<ClassifierProvider>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig {
                api_key: String::new().into(),
                base_url: "https://generativelanguage.googleapis.com".to_string(),
                model: "gemini-1.5-flash".to_string(),
                timeout_secs: 30,
                max_retries: 2,
                retry_backoff_ms: 500,
            },
            classifier: ClassifierConfig {
                provider: ClassifierProvider::Hosted,
                api_key: None,
                base_url: "https://router.huggingface.co/hf-inference".to_string(),
                model: "cardiffnlp/twitter-roberta-base-sentiment".to_string(),
                timeout_secs: 30,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8000,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl FromStr for ClassifierProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hosted" => Ok(Self::Hosted),
            "lexicon" => Ok(Self::Lexicon),
            other => Err(ConfigError::Validation(format!(
                "unsupported classifier provider `{other}` (expected hosted|lexicon)"
            ))),
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_CANDIDATES[0]));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(llm) = patch.llm {
            assign(&mut self.llm.api_key, llm.api_key.map(secret_value));
            assign(&mut self.llm.base_url, llm.base_url);
            assign(&mut self.llm.model, llm.model);
            assign(&mut self.llm.timeout_secs, llm.timeout_secs);
            assign(&mut self.llm.max_retries, llm.max_retries);
            assign(&mut self.llm.retry_backoff_ms, llm.retry_backoff_ms);
        }

        if let Some(classifier) = patch.classifier {
            assign(&mut self.classifier.provider, classifier.provider);
            if let Some(api_key) = classifier.api_key {
                self.classifier.api_key = Some(secret_value(api_key));
            }
            assign(&mut self.classifier.base_url, classifier.base_url);
            assign(&mut self.classifier.model, classifier.model);
            assign(&mut self.classifier.timeout_secs, classifier.timeout_secs);
        }

        if let Some(server) = patch.server {
            assign(&mut self.server.bind_address, server.bind_address);
            assign(&mut self.server.port, server.port);
            assign(&mut self.server.graceful_shutdown_secs, server.graceful_shutdown_secs);
        }

        if let Some(logging) = patch.logging {
            assign(&mut self.logging.level, logging.level);
            assign(&mut self.logging.format, logging.format);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let llm_api_key = read_env_alias(&["HAGGLE_LLM_API_KEY", "GEMINI_API_KEY"]);
        assign(&mut self.llm.api_key, llm_api_key.map(secret_value));
        assign(&mut self.llm.base_url, read_env("HAGGLE_LLM_BASE_URL"));
        assign(&mut self.llm.model, read_env("HAGGLE_LLM_MODEL"));
        assign(&mut self.llm.timeout_secs, parse_env("HAGGLE_LLM_TIMEOUT_SECS")?);
        assign(&mut self.llm.max_retries, parse_env("HAGGLE_LLM_MAX_RETRIES")?);
        assign(&mut self.llm.retry_backoff_ms, parse_env("HAGGLE_LLM_RETRY_BACKOFF_MS")?);

        // Provider and log format report the accepted values, not just the key.
        if let Some(value) = read_env("HAGGLE_CLASSIFIER_PROVIDER") {
            self.classifier.provider = value.parse()?;
        }
        if let Some(value) = read_env_alias(&["HAGGLE_CLASSIFIER_API_KEY", "HF_API_TOKEN"]) {
            self.classifier.api_key = Some(secret_value(value));
        }
        assign(&mut self.classifier.base_url, read_env("HAGGLE_CLASSIFIER_BASE_URL"));
        assign(&mut self.classifier.model, read_env("HAGGLE_CLASSIFIER_MODEL"));
        assign(&mut self.classifier.timeout_secs, parse_env("HAGGLE_CLASSIFIER_TIMEOUT_SECS")?);

        assign(&mut self.server.bind_address, read_env("HAGGLE_SERVER_BIND_ADDRESS"));
        assign(&mut self.server.port, parse_env("HAGGLE_SERVER_PORT")?);
        assign(
            &mut self.server.graceful_shutdown_secs,
            parse_env("HAGGLE_SERVER_GRACEFUL_SHUTDOWN_SECS")?,
        );

        assign(
            &mut self.logging.level,
            read_env_alias(&["HAGGLE_LOGGING_LEVEL", "HAGGLE_LOG_LEVEL"]),
        );
        if let Some(value) = read_env_alias(&["HAGGLE_LOGGING_FORMAT", "HAGGLE_LOG_FORMAT"]) {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        assign(&mut self.llm.api_key, overrides.llm_api_key.map(secret_value));
        assign(&mut self.llm.model, overrides.llm_model);
        assign(&mut self.classifier.provider, overrides.classifier_provider);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_llm(&self.llm)?;
        validate_classifier(&self.classifier)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    CONFIG_FILE_CANDIDATES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let expression = &rest[start + 2..];
        let end = expression.find('}').ok_or(ConfigError::UnterminatedInterpolation)?;
        let var = &expression[..end];
        let value = env::var(var)
            .map_err(|_| ConfigError::MissingEnvInterpolation { var: var.to_string() })?;
        output.push_str(&value);
        rest = &expression[end + 1..];
    }

    output.push_str(rest);
    Ok(output)
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.api_key.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "llm.api_key is required. Set HAGGLE_LLM_API_KEY (or GEMINI_API_KEY) to a key from https://aistudio.google.com/app/apikey".to_string(),
        ));
    }

    validate_http_url("llm.base_url", &llm.base_url)?;

    if llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
    }

    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if llm.max_retries > 10 {
        return Err(ConfigError::Validation("llm.max_retries must be at most 10".to_string()));
    }

    Ok(())
}

fn validate_classifier(classifier: &ClassifierConfig) -> Result<(), ConfigError> {
    if classifier.timeout_secs == 0 || classifier.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "classifier.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    match classifier.provider {
        ClassifierProvider::Hosted => {
            validate_http_url("classifier.base_url", &classifier.base_url)?;
            if classifier.model.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "classifier.model is required for the hosted classifier".to_string(),
                ));
            }
        }
        ClassifierProvider::Lexicon => {}
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn validate_http_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let value = value.trim();
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(ConfigError::Validation(format!("{key} must start with http:// or https://")));
    }
    Ok(())
}

fn assign<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// First non-empty value among `keys`, in order.
fn read_env_alias(keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| read_env(key))
}

fn parse_env<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    read_env(key)
        .map(|value| {
            value.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnvOverride {
                key: key.to_string(),
                value,
            })
        })
        .transpose()
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    llm: Option<LlmPatch>,
    classifier: Option<ClassifierPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    retry_backoff_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ClassifierPatch {
    provider: Option<ClassifierProvider>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
