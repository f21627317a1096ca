use std::time::Duration;

use crate::utils::uri::ensure_no_trailing_slash;
use crate::{Error, Result};
use derive_builder::Builder;
use secrecy::{ExposeSecret, SecretString};

pub const HF_TOKEN_ENV_VAR: &str = "HF_TOKEN";
pub const HF_MODEL_ENV_VAR: &str = "HF_MODEL";
pub const HF_INFERENCE_BASE_URL_ENV_VAR: &str = "HF_INFERENCE_BASE_URL";
pub const HF_TIMEOUT_SECS_ENV_VAR: &str = "HF_TIMEOUT_SECS";

pub const DEFAULT_MODEL: &str = "facebook/bart-large-cnn";
pub const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/hf-inference";

/// Everything a client needs to reach the inference endpoint.
///
/// Built once at startup and handed to [`crate::clients::huggingface::Client::from_config`].
/// No timeout is applied unless one is set.
#[derive(Debug, Clone, Builder)]
#[builder(derive(Debug))]
#[builder(setter(into))]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Config {
    pub api_key: SecretString,
    #[builder(default = "DEFAULT_MODEL.to_string()")]
    pub model: String,
    #[builder(default = "DEFAULT_BASE_URL.to_string()")]
    pub base_url: String,
    #[builder(default = "None", setter(strip_option))]
    pub timeout: Option<Duration>,
}

impl ConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(api_key) = &self.api_key {
            validate_api_key(api_key).map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

impl Config {
    pub fn new(api_key: &str) -> Result<Self> {
        let api_key = SecretString::from(api_key);
        validate_api_key(&api_key)?;
        Ok(Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key))
    }

    /// Same as [`Config::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> std::result::Result<String, std::env::VarError>,
    {
        let optional = |key: &str| -> Result<Option<String>> {
            match lookup(key) {
                Ok(value) if value.trim().is_empty() => Ok(None),
                Ok(value) => Ok(Some(value)),
                Err(std::env::VarError::NotPresent) => Ok(None),
                Err(e) => Err(Error::EnvVarError(key.to_string(), e)),
            }
        };

        let api_key = optional(HF_TOKEN_ENV_VAR)?
            .ok_or_else(|| Error::MissingCredential(HF_TOKEN_ENV_VAR.to_string()))?;

        let mut config = Self::new(&api_key)?;

        if let Some(model) = optional(HF_MODEL_ENV_VAR)? {
            config.model = model;
        }

        if let Some(base_url) = optional(HF_INFERENCE_BASE_URL_ENV_VAR)? {
            config.base_url = ensure_no_trailing_slash(base_url);
        }

        if let Some(timeout) = optional(HF_TIMEOUT_SECS_ENV_VAR)? {
            let secs = timeout
                .trim()
                .parse::<u64>()
                .map_err(|_| Error::InvalidConfigValue {
                    key: HF_TIMEOUT_SECS_ENV_VAR.to_string(),
                    value: timeout.clone(),
                })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

/// A credential must be non-blank and usable inside an `Authorization` header.
pub(crate) fn validate_api_key(api_key: &SecretString) -> Result<()> {
    let exposed = api_key.expose_secret();
    if exposed.trim().is_empty() {
        return Err(Error::InvalidCredential("credential is empty".to_string()));
    }
    if exposed.trim() != exposed {
        return Err(Error::InvalidCredential(
            "credential has leading or trailing whitespace".to_string(),
        ));
    }
    reqwest::header::HeaderValue::from_str(&format!("Bearer {exposed}")).map_err(|_| {
        Error::InvalidCredential("credential contains characters not allowed in a header".into())
    })?;
    Ok(())
}
