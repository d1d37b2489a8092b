use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

const DEFAULT_ENDPOINT: &str = "https://{instance}.openai.azure.com";
const DEFAULT_PROMPT_PATH: &str = "config/prompt.json";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Number of user/assistant example pairs the few-shot preamble carries.
pub const EXAMPLE_COUNT: usize = 3;

/// Process-wide configuration, loaded once in `main` and shared read-only.
#[derive(Debug, Clone)]
pub struct Settings {
    pub endpoint: String,
    pub instance_name: String,
    pub api_version: String,
    pub deployment_id: String,
    pub api_key: String,
    pub access_key: Option<String>,
    pub bind_addr: String,
    pub prompt: PromptSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptSettings {
    pub system_prompt: String,
    pub examples: Vec<PromptExample>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptExample {
    pub user: String,
    pub assistant: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| anyhow!("missing required environment variable {key}"))
        };

        let prompt_path =
            lookup("PROMPT_SETTINGS_PATH").unwrap_or_else(|| DEFAULT_PROMPT_PATH.to_string());

        Ok(Self {
            endpoint: lookup("OPENAI_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            instance_name: required("OPENAI_INSTANCE_NAME")?,
            api_version: required("OPENAI_API_VERSION")?,
            deployment_id: required("OPENAI_DEPLOYMENT_ID")?,
            api_key: required("OPENAI_KEY")?,
            access_key: lookup("FUNCTIONS_KEY")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            prompt: PromptSettings::load(&prompt_path)?,
        })
    }

    /// Endpoint template with the instance name substituted in, without a trailing slash.
    pub fn resolved_endpoint(&self) -> String {
        self.endpoint
            .replace("{instance}", &self.instance_name)
            .replace("{0}", &self.instance_name)
            .trim_end_matches('/')
            .to_string()
    }
}

impl PromptSettings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read prompt settings from {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid prompt settings in {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let parsed: PromptSettings = serde_json::from_str(raw)?;
        if parsed.examples.len() != EXAMPLE_COUNT {
            bail!(
                "expected {EXAMPLE_COUNT} prompt examples, found {}",
                parsed.examples.len()
            );
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::HashMap, io::Write};

    const PROMPT_JSON: &str = r#"{
        "system_prompt": "You are a helpful assistant.",
        "examples": [
            { "user": "u1", "assistant": "a1" },
            { "user": "u2", "assistant": "a2" },
            { "user": "u3", "assistant": "a3" }
        ]
    }"#;

    fn prompt_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PROMPT_JSON.as_bytes()).unwrap();
        file
    }

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn loads_settings_with_defaults() {
        let file = prompt_file();
        let path = file.path().to_string_lossy().to_string();
        let vars = env(&[
            ("OPENAI_INSTANCE_NAME", "contoso"),
            ("OPENAI_API_VERSION", "2024-02-01"),
            ("OPENAI_DEPLOYMENT_ID", "gpt-4o"),
            ("OPENAI_KEY", "secret"),
            ("PROMPT_SETTINGS_PATH", path.as_str()),
        ]);

        let settings = Settings::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(settings.bind_addr, "0.0.0.0:3000");
        assert!(settings.access_key.is_none());
        assert_eq!(
            settings.resolved_endpoint(),
            "https://contoso.openai.azure.com"
        );
        assert_eq!(settings.prompt.examples[2].assistant, "a3");
    }

    #[test]
    fn missing_key_is_an_error() {
        let file = prompt_file();
        let path = file.path().to_string_lossy().to_string();
        let vars = env(&[
            ("OPENAI_INSTANCE_NAME", "contoso"),
            ("OPENAI_API_VERSION", "2024-02-01"),
            ("OPENAI_DEPLOYMENT_ID", "gpt-4o"),
            ("PROMPT_SETTINGS_PATH", path.as_str()),
        ]);

        let err = Settings::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("OPENAI_KEY"));
    }

    #[test]
    fn positional_template_and_trailing_slash() {
        let file = prompt_file();
        let path = file.path().to_string_lossy().to_string();
        let vars = env(&[
            ("OPENAI_ENDPOINT", "https://{0}.example.com/"),
            ("OPENAI_INSTANCE_NAME", "fabrikam"),
            ("OPENAI_API_VERSION", "2024-02-01"),
            ("OPENAI_DEPLOYMENT_ID", "gpt-4o"),
            ("OPENAI_KEY", "secret"),
            ("FUNCTIONS_KEY", "  fn-key \n"),
            ("PROMPT_SETTINGS_PATH", path.as_str()),
        ]);

        let settings = Settings::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(settings.resolved_endpoint(), "https://fabrikam.example.com");
        assert_eq!(settings.access_key.as_deref(), Some("fn-key"));
    }

    #[test]
    fn rejects_wrong_example_count() {
        let raw = r#"{ "system_prompt": "s", "examples": [ { "user": "u", "assistant": "a" } ] }"#;
        let err = PromptSettings::parse(raw).unwrap_err();
        assert!(err.to_string().contains("expected 3"));
    }

    #[test]
    fn shipped_prompt_settings_parse() {
        let settings = PromptSettings::load(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/config/prompt.json"
        ))
        .unwrap();
        assert!(!settings.system_prompt.is_empty());
    }
}
