use haggle_agent::runtime::NegotiationRuntime;
use haggle_core::config::{AppConfig, LoadOptions};
use haggle_core::{ApplicationError, NegotiationRequest};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::CommandResult;

const COMMAND: &str = "negotiate";

/// Runs one exchange end to end and prints the reply as the HTTP surface
/// would return it.
///
/// Exit codes: 0 on a reply (including a price miss), 1 when the classifier
/// or the model fails, 2 for invalid input or configuration.
pub fn run(options: LoadOptions, product_price: Decimal, user_message: &str) -> CommandResult {
    let request = NegotiationRequest::new(product_price, user_message);
    if let Err(error) = request.validate() {
        return CommandResult::failure(COMMAND, "invalid_request", error.to_string(), 2);
    }

    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(COMMAND, "config_validation", error.to_string(), 2);
        }
    };

    let runtime = match NegotiationRuntime::from_config(&config) {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(COMMAND, "runtime_build", format!("{error:#}"), 1);
        }
    };

    let executor = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(executor) => executor,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "runtime_build",
                format!("failed to initialize async runtime: {error}"),
                1,
            );
        }
    };

    let correlation_id = Uuid::new_v4().to_string();
    match executor.block_on(runtime.handle(&request, &correlation_id)) {
        Ok(reply) => match serde_json::to_string_pretty(&reply) {
            Ok(output) => CommandResult { exit_code: 0, output },
            Err(error) => CommandResult::failure(COMMAND, "serialization", error.to_string(), 1),
        },
        Err(error) => failure_for(error),
    }
}

fn failure_for(error: ApplicationError) -> CommandResult {
    let (error_class, exit_code) = match &error {
        ApplicationError::Domain(_) => ("invalid_request", 2),
        ApplicationError::Configuration(_) => ("config_validation", 2),
        ApplicationError::Classifier(_) => ("classifier_unavailable", 1),
        ApplicationError::Provider(_) => ("provider_unavailable", 1),
    };
    CommandResult::failure(COMMAND, error_class, error.to_string(), exit_code)
}
