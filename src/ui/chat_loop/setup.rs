use std::sync::Arc;

use tracing::warn;

use super::ChatApp;
use crate::core::config::Config;
use crate::core::gateway::GeminiGateway;
use crate::core::orchestrator::ChatSession;
use crate::core::providers::{report, resolve_env_settings, ProviderResolutionError};
use crate::ui::terminal::TerminalSurface;
use crate::ui::theme::Theme;
use crate::utils::logging::LoggingState;

/// Build the chat session from config, environment, and CLI flags.
///
/// Missing credentials end the process with the provider error's exit code,
/// after printing the quick fixes.
pub fn bootstrap_session(
    model: Option<String>,
    log: Option<String>,
) -> Result<ChatApp<TerminalSurface<std::io::Stdout>>, Box<dyn std::error::Error>> {
    let (config, config_path) = match Config::get_config_path() {
        Ok(path) => (Config::load_from_path(&path)?, Some(path)),
        Err(err) => {
            warn!(error = %err, "using default settings; preferences will not be saved");
            (Config::default(), None)
        }
    };

    let settings = match resolve_env_settings(&config, model.as_deref()) {
        Ok(settings) => settings,
        Err(err) => std::process::exit(report(&err)),
    };
    let gateway = match GeminiGateway::new(settings) {
        Ok(gateway) => gateway,
        Err(err) => std::process::exit(report(&ProviderResolutionError::client_setup(&err))),
    };

    let logging = LoggingState::new(log)?;
    let surface = TerminalSurface::stdout(Theme::for_preference(config.theme_preference()));
    let session = ChatSession::new(Arc::new(gateway), surface, config.reveal_config())
        .with_logging(logging);

    Ok(ChatApp::new(session, config, config_path))
}
