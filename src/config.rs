use crate::errors::AppError;

pub const DEFAULT_AGENT_API_BASE: &str = "https://api.coze.com";

/// Read an env var, trimmed; missing or blank is an error naming the variable.
pub fn require_env(name: &str) -> Result<String, AppError> {
    match std::env::var(name) {
        Ok(value) => {
            let value = value.trim().to_string();
            if value.is_empty() {
                Err(AppError::MissingEnv { name: name.to_string() })
            } else {
                Ok(value)
            }
        }
        Err(_) => Err(AppError::MissingEnv { name: name.to_string() }),
    }
}

pub fn optional_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Upstream agent credentials, resolved per request so a misconfigured
/// deployment answers 503 instead of failing at startup.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub api_key: String,
    pub bot_id: String,
    pub api_base: String,
}

impl AgentConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let api_key = optional_env("COZE_API_KEY");
        let bot_id = optional_env("COZE_BOT_ID");
        let (api_key, bot_id) = match (api_key, bot_id) {
            (Some(k), Some(b)) => (k, b),
            (k, b) => {
                return Err(AppError::AgentNotConfigured {
                    detail: format!(
                        "Set the COZE_API_KEY and COZE_BOT_ID environment variables. \
                         Currently: apiKey={}, botId={}",
                        k.is_some(),
                        b.is_some()
                    ),
                });
            }
        };
        if bot_id == "0" {
            return Err(AppError::AgentNotConfigured {
                detail: format!("Bot id must not be empty or 0. Current value: \"{bot_id}\""),
            });
        }
        let api_base =
            optional_env("COZE_API_BASE").unwrap_or_else(|| DEFAULT_AGENT_API_BASE.to_string());
        Ok(Self { api_key, bot_id, api_base })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn missing_agent_key_is_a_configuration_error() {
        std::env::remove_var("COZE_API_KEY");
        std::env::remove_var("COZE_BOT_ID");
        let err = AgentConfig::from_env().unwrap_err();
        assert!(matches!(err, AppError::AgentNotConfigured { .. }));
    }

    #[test]
    #[serial]
    fn zero_bot_id_is_rejected() {
        std::env::set_var("COZE_API_KEY", "key");
        std::env::set_var("COZE_BOT_ID", "0");
        let err = AgentConfig::from_env().unwrap_err();
        assert!(matches!(err, AppError::AgentNotConfigured { .. }));
        std::env::remove_var("COZE_API_KEY");
        std::env::remove_var("COZE_BOT_ID");
    }

    #[test]
    #[serial]
    fn base_url_defaults_when_unset() {
        std::env::set_var("COZE_API_KEY", "key");
        std::env::set_var("COZE_BOT_ID", "bot-1");
        std::env::remove_var("COZE_API_BASE");
        let config = AgentConfig::from_env().unwrap();
        assert_eq!(config.api_base, DEFAULT_AGENT_API_BASE);
        std::env::remove_var("COZE_API_KEY");
        std::env::remove_var("COZE_BOT_ID");
    }
}
