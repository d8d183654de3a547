use haggle_agent::sentiment::classifier_from_config;
use haggle_core::config::{AppConfig, ClassifierProvider, LoadOptions};
use secrecy::ExposeSecret;
use serde::Serialize;

use super::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(options: &LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(options: &LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options.clone()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_llm_credential(&config));
            checks.push(check_classifier_backend(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["llm_credential", "classifier_backend"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_llm_credential(config: &AppConfig) -> DoctorCheck {
    let key = config.llm.api_key.expose_secret();
    if key.chars().any(char::is_whitespace) {
        return DoctorCheck {
            name: "llm_credential",
            status: CheckStatus::Fail,
            details: "llm.api_key contains whitespace; check for a stray newline or quote"
                .to_string(),
        };
    }

    DoctorCheck {
        name: "llm_credential",
        status: CheckStatus::Pass,
        details: format!("api key present for model `{}` at {}", config.llm.model, config.llm.base_url),
    }
}

fn check_classifier_backend(config: &AppConfig) -> DoctorCheck {
    let classifier = match classifier_from_config(&config.classifier) {
        Ok(classifier) => classifier,
        Err(error) => {
            return DoctorCheck {
                name: "classifier_backend",
                status: CheckStatus::Fail,
                details: format!("failed to build classifier: {error:#}"),
            };
        }
    };

    let details = match config.classifier.provider {
        ClassifierProvider::Lexicon => {
            format!("`{}` backend ready (offline keyword scoring)", classifier.name())
        }
        ClassifierProvider::Hosted => {
            let auth = if config.classifier.api_key.is_some() { "with" } else { "without" };
            format!(
                "`{}` backend ready for model `{}` at {} ({auth} api token)",
                classifier.name(),
                config.classifier.model,
                config.classifier.base_url
            )
        }
    };

    DoctorCheck { name: "classifier_backend", status: CheckStatus::Pass, details }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
