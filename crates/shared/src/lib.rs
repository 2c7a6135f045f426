pub mod completion;
pub mod document;
pub mod events;
pub mod store;
pub mod version;

pub mod settings {
    use serde::{Deserialize, Serialize};

    pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/complete";

    fn default_endpoint() -> String {
        DEFAULT_ENDPOINT.to_string()
    }

    fn default_max_tokens() -> u32 {
        2048
    }

    fn default_quiet_period_ms() -> u64 {
        2000
    }

    fn default_snippet_debounce_ms() -> u64 {
        500
    }

    /// Language the assistant answers in
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Language {
        #[default]
        Zh,
        En,
    }

    impl Language {
        pub fn code(&self) -> &'static str {
            match self {
                Language::Zh => "zh",
                Language::En => "en",
            }
        }
    }

    impl std::str::FromStr for Language {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.trim().to_ascii_lowercase().as_str() {
                "zh" | "chinese" => Ok(Language::Zh),
                "en" | "english" => Ok(Language::En),
                other => Err(format!("unsupported language: {}", other)),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CompletionSettings {
        #[serde(default = "default_endpoint")]
        pub endpoint: String, // e.g., "http://127.0.0.1:8000/complete"
        #[serde(default = "default_max_tokens")]
        pub max_tokens: u32,
    }

    impl Default for CompletionSettings {
        fn default() -> Self {
            Self {
                endpoint: default_endpoint(),
                max_tokens: default_max_tokens(),
            }
        }
    }

    /// Inline completion preview while typing
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct AutocompleteSettings {
        #[serde(default)]
        pub enabled: bool,
        /// Quiet period after the last edit before a completion is requested
        #[serde(default = "default_quiet_period_ms")]
        pub quiet_period_ms: u64,
    }

    impl Default for AutocompleteSettings {
        fn default() -> Self {
            Self {
                enabled: false,
                quiet_period_ms: default_quiet_period_ms(),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PluginSettings {
        #[serde(default)]
        pub completion: CompletionSettings,
        #[serde(default)]
        pub language: Language,
        #[serde(default)]
        pub autocomplete: AutocompleteSettings,
        #[serde(default = "default_snippet_debounce_ms")]
        pub snippet_debounce_ms: u64,
    }

    impl Default for PluginSettings {
        fn default() -> Self {
            Self {
                completion: CompletionSettings::default(),
                language: Language::default(),
                autocomplete: AutocompleteSettings::default(),
                snippet_debounce_ms: default_snippet_debounce_ms(),
            }
        }
    }
}

pub mod agent_api {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ChatMessage {
        pub role: String, // "system" | "user" | "assistant"
        pub content: String,
    }

    impl ChatMessage {
        pub fn user(content: impl Into<String>) -> Self {
            Self {
                role: "user".to_string(),
                content: content.into(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::settings::*;

    #[test]
    fn test_settings_defaults() {
        let settings = PluginSettings::default();
        assert_eq!(settings.completion.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.completion.max_tokens, 2048);
        assert_eq!(settings.language, Language::Zh);
        assert!(!settings.autocomplete.enabled);
        assert_eq!(settings.autocomplete.quiet_period_ms, 2000);
        assert_eq!(settings.snippet_debounce_ms, 500);
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: PluginSettings =
            serde_json::from_str(r#"{"language":"en","completion":{"max_tokens":512}}"#).unwrap();
        assert_eq!(settings.language, Language::En);
        assert_eq!(settings.completion.max_tokens, 512);
        assert_eq!(settings.completion.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.snippet_debounce_ms, 500);
    }

    #[test]
    fn test_language_parse() {
        assert_eq!("EN".parse::<Language>(), Ok(Language::En));
        assert_eq!("zh".parse::<Language>(), Ok(Language::Zh));
        assert!("fr".parse::<Language>().is_err());
    }
}
