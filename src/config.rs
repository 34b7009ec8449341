use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Completion relay settings
    #[serde(default)]
    pub completion: CompletionConfig,
    /// Metadata catalog settings
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Enrichment behaviour
    #[serde(default)]
    pub enrich: EnrichConfig,
    /// Recommendation history settings
    #[serde(default)]
    pub history: HistoryConfig,
}

/// Configuration for the chat-completion relay
#[derive(Debug, Deserialize, Clone)]
pub struct CompletionConfig {
    /// API key for authentication (falls back to OPENROUTER_API_KEY)
    pub api_key: Option<String>,
    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_completion_base_url")]
    pub base_url: String,
    /// Model candidates, tried in rotation
    #[serde(default = "default_models")]
    pub models: Vec<String>,
    /// Maximum tokens to generate for recommendations
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature for recommendations
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate for translations
    #[serde(default = "default_translation_max_tokens")]
    pub translation_max_tokens: u32,
    /// Sampling temperature for translations
    #[serde(default = "default_translation_temperature")]
    pub translation_temperature: f32,
    /// Sent as HTTP-Referer for OpenRouter attribution
    pub referer: Option<String>,
    /// Sent as X-Title for OpenRouter attribution
    pub app_title: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_completion_base_url(),
            models: default_models(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            translation_max_tokens: default_translation_max_tokens(),
            translation_temperature: default_translation_temperature(),
            referer: None,
            app_title: None,
            timeout: default_timeout(),
        }
    }
}

/// Configuration for the movie/TV metadata catalog
#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// API key (falls back to TMDB_API_KEY); may be omitted behind a relay proxy
    pub api_key: Option<String>,
    /// Base URL of the catalog API
    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,
    /// Prefix for poster paths
    #[serde(default = "default_image_base")]
    pub image_base: String,
    /// Prefix for backdrop paths
    #[serde(default = "default_backdrop_base")]
    pub backdrop_base: String,
    /// Prefix for public catalog pages
    #[serde(default = "default_web_base")]
    pub web_base: String,
    /// Locale used for localized details
    #[serde(default = "default_language")]
    pub language: String,
    /// Region used for watch providers
    #[serde(default = "default_region")]
    pub region: String,
    /// Original-language tag whose localized art is preferred
    #[serde(default = "default_origin_language")]
    pub origin_language: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_catalog_base_url(),
            image_base: default_image_base(),
            backdrop_base: default_backdrop_base(),
            web_base: default_web_base(),
            language: default_language(),
            region: default_region(),
            origin_language: default_origin_language(),
            timeout: default_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EnrichConfig {
    /// Number of stubs resolved at once; 1 keeps strict sequential order of work
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Translate overviews that have no localized text
    #[serde(default)]
    pub translate_overviews: bool,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            translate_overviews: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    /// Directory for the file-backed store; nothing is recorded when unset
    pub path: Option<String>,
    /// Maximum entries retained
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: None,
            limit: default_history_limit(),
        }
    }
}

// Default value functions
fn default_completion_base_url() -> String {
    "https://openrouter.ai/api".to_string()
}

fn default_models() -> Vec<String> {
    vec![
        "openai/gpt-4.1-mini".to_string(),
        "google/gemma-3-1b-it:free".to_string(),
        "google/gemma-3-4b-it:free".to_string(),
        "meta-llama/llama-3.2-3b-instruct:free".to_string(),
        "mistralai/mistral-7b-instruct:free".to_string(),
    ]
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.7
}

fn default_translation_max_tokens() -> u32 {
    2048
}

fn default_translation_temperature() -> f32 {
    0.3
}

fn default_timeout() -> u64 {
    30
}

fn default_catalog_base_url() -> String {
    "https://api.themoviedb.org".to_string()
}

fn default_image_base() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_backdrop_base() -> String {
    "https://image.tmdb.org/t/p/w1280".to_string()
}

fn default_web_base() -> String {
    "https://www.themoviedb.org".to_string()
}

fn default_language() -> String {
    "tr-TR".to_string()
}

fn default_region() -> String {
    "TR".to_string()
}

fn default_origin_language() -> String {
    "tr".to_string()
}

fn default_concurrency() -> usize {
    1
}

fn default_history_limit() -> usize {
    20
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with FILM__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: FILM__COMPLETION__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    /// Completion API key from config or OPENROUTER_API_KEY
    pub fn completion_api_key(&self) -> Option<String> {
        self.completion
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENROUTER_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }

    /// Catalog API key from config or TMDB_API_KEY
    pub fn catalog_api_key(&self) -> Option<String> {
        self.catalog
            .api_key
            .clone()
            .or_else(|| std::env::var("TMDB_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }
}

/// Load configuration from file and environment variables
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: FILM__CATALOG__REGION
        .add_source(
            Environment::with_prefix("FILM")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("completion.models"),
        )
        .build()?;

    settings.try_deserialize()
}
