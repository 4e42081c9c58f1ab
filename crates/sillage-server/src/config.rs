use thiserror::Error;

use sillage_llm::provider::Provider;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5001;
const DEFAULT_TASK_MAX_AGE_HOURS: i64 = 24;

/// Fatal configuration problems; the process refuses to start on any of
/// these rather than failing per-request.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown LLM_PROVIDER: {0}. Use 'groq' or 'gemini'")]
    UnknownProvider(String),

    #[error("{key} required for the {provider} provider")]
    MissingApiKey { provider: Provider, key: &'static str },

    #[error("Invalid {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Server configuration, resolved from the environment once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub provider: Provider,
    pub api_key: String,
    pub model_id: String,
    pub host: String,
    pub port: u16,
    pub task_max_age_hours: i64,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary lookup, so tests can
    /// supply values without mutating process-wide environment state.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let provider_name = get("LLM_PROVIDER").unwrap_or_else(|| "groq".into());
        let provider: Provider = provider_name
            .parse()
            .map_err(|_| ConfigError::UnknownProvider(provider_name.clone()))?;

        let (api_key, model_id) = match provider {
            Provider::Groq => {
                let key = get("GROQ_API_KEY")
                    .filter(|k| !k.is_empty())
                    .ok_or(ConfigError::MissingApiKey {
                        provider,
                        key: "GROQ_API_KEY",
                    })?;
                let model = get("GROQ_MODEL").unwrap_or_else(|| provider.default_model().into());
                (key, model)
            }
            Provider::Gemini => {
                let key = get("GEMINI_API_KEY")
                    .or_else(|| get("GOOGLE_API_KEY"))
                    .filter(|k| !k.is_empty())
                    .ok_or(ConfigError::MissingApiKey {
                        provider,
                        key: "GEMINI_API_KEY",
                    })?;
                let model = get("GEMINI_MODEL").unwrap_or_else(|| provider.default_model().into());
                (key, model)
            }
        };

        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.into());
        let port = match get("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };
        let task_max_age_hours = match get("TASK_MAX_AGE_HOURS") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "TASK_MAX_AGE_HOURS",
                value: raw,
            })?,
            None => DEFAULT_TASK_MAX_AGE_HOURS,
        };

        Ok(Self {
            provider,
            api_key,
            model_id,
            host,
            port,
            task_max_age_hours,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |key| map.get(key).map(|v| v.to_string())
    }

    #[test]
    fn groq_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[("GROQ_API_KEY", "gk")])).unwrap();
        assert_eq!(config.provider, Provider::Groq);
        assert_eq!(config.api_key, "gk");
        assert_eq!(config.model_id, "llama-3.3-70b-versatile");
        assert_eq!(config.bind_addr(), "0.0.0.0:5001");
        assert_eq!(config.task_max_age_hours, 24);
    }

    #[test]
    fn gemini_provider_with_model_override() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("LLM_PROVIDER", "gemini"),
            ("GEMINI_API_KEY", "gmk"),
            ("GEMINI_MODEL", "gemini-2.5-pro"),
        ]))
        .unwrap();
        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.model_id, "gemini-2.5-pro");
    }

    #[test]
    fn gemini_falls_back_to_google_api_key() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("LLM_PROVIDER", "gemini"),
            ("GOOGLE_API_KEY", "gok"),
        ]))
        .unwrap();
        assert_eq!(config.api_key, "gok");
    }

    #[test]
    fn missing_groq_key_is_fatal() {
        let err = ServerConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey { .. }));
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn empty_key_treated_as_missing() {
        let err = ServerConfig::from_lookup(lookup(&[("GROQ_API_KEY", "")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey { .. }));
    }

    #[test]
    fn unknown_provider_is_fatal() {
        let err =
            ServerConfig::from_lookup(lookup(&[("LLM_PROVIDER", "openai")])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProvider(_)));
        assert!(err.to_string().contains("openai"));
    }

    #[test]
    fn invalid_port_is_fatal() {
        let err = ServerConfig::from_lookup(lookup(&[
            ("GROQ_API_KEY", "gk"),
            ("PORT", "not-a-port"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "PORT", .. }));
    }

    #[test]
    fn host_port_and_max_age_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("GROQ_API_KEY", "gk"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("TASK_MAX_AGE_HOURS", "6"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.task_max_age_hours, 6);
    }
}
