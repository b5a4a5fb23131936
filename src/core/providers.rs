use crate::core::config::Config;
use crate::core::gateway::GatewaySettings;
use std::error::Error;
use std::fmt;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const FALLBACK_API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const BASE_URL_ENV: &str = "GEMINI_BASE_URL";

const QUICK_FIXES: &[&str] = &[
    "export GEMINI_API_KEY=...                          # Key from Google AI Studio",
    "export GEMINI_BASE_URL=https://proxy.example/v1beta # Optional: route through a proxy",
    "loanchat set model gemini-1.5-flash                # Optional: pick another model",
];

#[derive(Debug)]
pub struct ProviderResolutionError {
    message: String,
    quick_fixes: &'static [&'static str],
    exit_code: i32,
}

impl ProviderResolutionError {
    pub fn missing_api_key() -> Self {
        Self::new(
            format!(
                "❌ No API key found. Set {API_KEY_ENV} (or {FALLBACK_API_KEY_ENV}) to your Gemini API key."
            ),
            QUICK_FIXES,
            2,
        )
    }

    pub fn client_setup(err: &dyn Error) -> Self {
        Self::new(format!("❌ Could not set up the HTTP client: {err}"), &[], 1)
    }

    fn new(message: impl Into<String>, quick_fixes: &'static [&'static str], exit_code: i32) -> Self {
        Self {
            message: message.into(),
            quick_fixes,
            exit_code,
        }
    }

    pub fn quick_fixes(&self) -> &'static [&'static str] {
        self.quick_fixes
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }
}

impl fmt::Display for ProviderResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ProviderResolutionError {}

/// Resolve gateway settings from config, environment, and an optional model
/// override. `env` abstracts `std::env::var` so tests stay hermetic.
pub fn resolve_settings<F>(
    config: &Config,
    model_override: Option<&str>,
    env: F,
) -> Result<GatewaySettings, ProviderResolutionError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_blank = |name: &str| env(name).filter(|value| !value.trim().is_empty());

    let api_key = non_blank(API_KEY_ENV)
        .or_else(|| non_blank(FALLBACK_API_KEY_ENV))
        .ok_or_else(ProviderResolutionError::missing_api_key)?;

    let base_url = non_blank(BASE_URL_ENV)
        .map(|url| url.trim().trim_end_matches('/').to_string())
        .unwrap_or_else(|| config.base_url_or_default().to_string());

    let model = model_override
        .map(str::trim)
        .filter(|model| !model.is_empty())
        .unwrap_or_else(|| config.model_or_default())
        .to_string();

    Ok(GatewaySettings {
        base_url,
        model,
        api_key: api_key.trim().to_string(),
        timeout: config.request_timeout(),
    })
}

pub fn resolve_env_settings(
    config: &Config,
    model_override: Option<&str>,
) -> Result<GatewaySettings, ProviderResolutionError> {
    resolve_settings(config, model_override, |name| std::env::var(name).ok())
}

/// Print a resolution failure the way every entry point reports it, then
/// return the exit code to use.
pub fn report(err: &ProviderResolutionError) -> i32 {
    eprintln!("{err}");
    let fixes = err.quick_fixes();
    if !fixes.is_empty() {
        eprintln!();
        eprintln!("💡 Quick fixes:");
        for fix in fixes {
            eprintln!("  • {fix}");
        }
    }
    err.exit_code()
}
