//! LLM configuration and provider selection.

use crate::types::LlmProvider;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";

const DEFAULT_TEMPERATURE: f64 = 0.2;
const DEFAULT_MAX_TOKENS: usize = 1024;

/// LLM configuration resolved from the environment at startup.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub preferred_provider: String,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub openai_model: String,
    pub anthropic_model: String,
    pub groq_model: String,
    pub temperature: f64,
    pub max_tokens: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            preferred_provider: "auto".into(),
            openai_api_key: None,
            anthropic_api_key: None,
            groq_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.into(),
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.into(),
            groq_model: DEFAULT_GROQ_MODEL.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

fn non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

impl LlmConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.preferred_provider =
            non_empty("LLM_PROVIDER").unwrap_or_else(|| "auto".into());
        config.openai_api_key = non_empty("OPENAI_API_KEY");
        config.anthropic_api_key = non_empty("ANTHROPIC_API_KEY");
        config.groq_api_key = non_empty("GROQ_API_KEY");
        if let Some(m) = non_empty("OPENAI_MODEL") {
            config.openai_model = m;
        }
        if let Some(m) = non_empty("ANTHROPIC_MODEL") {
            config.anthropic_model = m;
        }
        if let Some(m) = non_empty("GROQ_MODEL") {
            config.groq_model = m;
        }
        if let Some(t) = non_empty("LLM_TEMPERATURE").and_then(|v| v.parse().ok()) {
            config.temperature = t;
        }
        if let Some(n) = non_empty("LLM_MAX_TOKENS").and_then(|v| v.parse().ok()) {
            config.max_tokens = n;
        }
        config
    }

    /// Resolve which provider, model, and key to use.
    pub fn resolve_provider(&self) -> Option<(LlmProvider, String, String)> {
        // Explicit preference
        if self.preferred_provider != "auto" {
            return match self.preferred_provider.as_str() {
                "openai" => self
                    .openai_api_key
                    .as_ref()
                    .map(|k| (LlmProvider::OpenAI, self.openai_model.clone(), k.clone())),
                "anthropic" => self
                    .anthropic_api_key
                    .as_ref()
                    .map(|k| (LlmProvider::Anthropic, self.anthropic_model.clone(), k.clone())),
                "groq" => self
                    .groq_api_key
                    .as_ref()
                    .map(|k| (LlmProvider::Groq, self.groq_model.clone(), k.clone())),
                _ => None,
            };
        }

        // Auto mode: Anthropic > Groq > OpenAI
        if let Some(k) = &self.anthropic_api_key {
            return Some((LlmProvider::Anthropic, self.anthropic_model.clone(), k.clone()));
        }
        if let Some(k) = &self.groq_api_key {
            return Some((LlmProvider::Groq, self.groq_model.clone(), k.clone()));
        }
        if let Some(k) = &self.openai_api_key {
            return Some((LlmProvider::OpenAI, self.openai_model.clone(), k.clone()));
        }

        None
    }

    /// Whether any provider is configured.
    pub fn is_configured(&self) -> bool {
        self.resolve_provider().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_keys_resolves_none() {
        let config = LlmConfig::default();
        assert!(config.resolve_provider().is_none());
        assert!(!config.is_configured());
    }

    #[test]
    fn test_auto_prefers_anthropic() {
        let config = LlmConfig {
            openai_api_key: Some("ok".into()),
            anthropic_api_key: Some("ak".into()),
            groq_api_key: Some("gk".into()),
            ..Default::default()
        };
        let (provider, model, key) = config.resolve_provider().unwrap();
        assert_eq!(provider, LlmProvider::Anthropic);
        assert_eq!(model, DEFAULT_ANTHROPIC_MODEL);
        assert_eq!(key, "ak");
    }

    #[test]
    fn test_auto_falls_back_to_groq_then_openai() {
        let config = LlmConfig {
            openai_api_key: Some("ok".into()),
            groq_api_key: Some("gk".into()),
            ..Default::default()
        };
        assert_eq!(config.resolve_provider().unwrap().0, LlmProvider::Groq);

        let config = LlmConfig {
            openai_api_key: Some("ok".into()),
            ..Default::default()
        };
        assert_eq!(config.resolve_provider().unwrap().0, LlmProvider::OpenAI);
    }

    #[test]
    fn test_explicit_preference_requires_its_key() {
        let config = LlmConfig {
            preferred_provider: "openai".into(),
            anthropic_api_key: Some("ak".into()),
            ..Default::default()
        };
        // openai preferred but only anthropic key set
        assert!(config.resolve_provider().is_none());
    }
}
