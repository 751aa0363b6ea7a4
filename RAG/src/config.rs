use crate::augmentation::AugmentationPolicy;
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-preview-05-20";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "https://academic-chat-refine.lovable.app";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
pub const MAX_SEARCH_RESULTS: usize = 5;

/// Process-wide settings, read once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub search_api_key: Option<String>,
    pub search_engine_id: Option<String>,
    pub search_result_limit: usize,
    pub augmentation_policy: AugmentationPolicy,
    pub date_fast_path: bool,
    pub upstream_timeout: Duration,
    pub allowed_origin: String,
    pub bind_address: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            temperature: 0.3,
            max_output_tokens: 2048,
            search_api_key: None,
            search_engine_id: None,
            search_result_limit: 3,
            augmentation_policy: AugmentationPolicy::ModelDelegated,
            date_fast_path: true,
            upstream_timeout: Duration::from_secs(10),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source. Missing credentials are
    /// allowed; malformed optional settings are not.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let temperature = match get("GEMINI_TEMPERATURE") {
            Some(raw) => raw
                .parse::<f32>()
                .with_context(|| format!("GEMINI_TEMPERATURE is not a number: {raw}"))?,
            None => defaults.temperature,
        };

        let max_output_tokens = match get("GEMINI_MAX_OUTPUT_TOKENS") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("GEMINI_MAX_OUTPUT_TOKENS is not a positive integer: {raw}"))?,
            None => defaults.max_output_tokens,
        };

        let search_result_limit = match get("SEARCH_RESULT_LIMIT") {
            Some(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("SEARCH_RESULT_LIMIT is not a positive integer: {raw}"))?
                .clamp(1, MAX_SEARCH_RESULTS),
            None => defaults.search_result_limit,
        };

        let augmentation_policy = match get("AUGMENTATION_POLICY") {
            Some(raw) => raw.parse::<AugmentationPolicy>()?,
            None => defaults.augmentation_policy,
        };

        let date_fast_path = match get("DATE_FAST_PATH") {
            Some(raw) => parse_flag(&raw)
                .with_context(|| format!("DATE_FAST_PATH must be true or false: {raw}"))?,
            None => defaults.date_fast_path,
        };

        let upstream_timeout = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse::<u64>()
                    .with_context(|| format!("UPSTREAM_TIMEOUT_SECS is not a positive integer: {raw}"))?
                    .max(1),
            ),
            None => defaults.upstream_timeout,
        };

        Ok(Self {
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            temperature,
            max_output_tokens,
            search_api_key: get("GOOGLE_SEARCH_API_KEY"),
            search_engine_id: get("GOOGLE_SEARCH_CX"),
            search_result_limit,
            augmentation_policy,
            date_fast_path,
            upstream_timeout,
            allowed_origin: get("CORS_ALLOWED_ORIGIN").unwrap_or(defaults.allowed_origin),
            bind_address: get("BIND_ADDRESS").unwrap_or(defaults.bind_address),
        })
    }

    pub fn has_generation_credentials(&self) -> bool {
        self.gemini_api_key.is_some()
    }

    pub fn has_search_credentials(&self) -> bool {
        self.search_api_key.is_some() && self.search_engine_id.is_some()
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow::anyhow!("unrecognised flag value")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = config_from(&[]).unwrap();

        assert!(!config.has_generation_credentials());
        assert!(!config.has_search_credentials());
        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.search_result_limit, 3);
        assert_eq!(config.augmentation_policy, AugmentationPolicy::ModelDelegated);
        assert_eq!(config.allowed_origin, DEFAULT_ALLOWED_ORIGIN);
    }

    #[test]
    fn test_blank_credentials_count_as_missing() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "   "),
            ("GOOGLE_SEARCH_API_KEY", "key"),
            ("GOOGLE_SEARCH_CX", ""),
        ])
        .unwrap();

        assert!(config.gemini_api_key.is_none());
        assert!(!config.has_search_credentials());
    }

    #[test]
    fn test_search_limit_is_clamped() {
        let config = config_from(&[("SEARCH_RESULT_LIMIT", "50")]).unwrap();
        assert_eq!(config.search_result_limit, MAX_SEARCH_RESULTS);

        let config = config_from(&[("SEARCH_RESULT_LIMIT", "0")]).unwrap();
        assert_eq!(config.search_result_limit, 1);
    }

    #[test]
    fn test_reads_policy_and_timeout() {
        let config = config_from(&[
            ("AUGMENTATION_POLICY", "heuristic"),
            ("UPSTREAM_TIMEOUT_SECS", "4"),
            ("DATE_FAST_PATH", "off"),
        ])
        .unwrap();

        assert_eq!(config.augmentation_policy, AugmentationPolicy::Heuristic);
        assert_eq!(config.upstream_timeout, Duration::from_secs(4));
        assert!(!config.date_fast_path);
    }

    #[test]
    fn test_rejects_malformed_settings() {
        assert!(config_from(&[("AUGMENTATION_POLICY", "sometimes")]).is_err());
        assert!(config_from(&[("UPSTREAM_TIMEOUT_SECS", "soon")]).is_err());
        assert!(config_from(&[("GEMINI_TEMPERATURE", "warm")]).is_err());
    }
}
