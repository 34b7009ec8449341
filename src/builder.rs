use std::path::PathBuf;

use chrono::Local;
use log::warn;

use crate::config::AppConfig;
use crate::history::{FileStore, History};
use crate::model::{ContentType, EnrichedRecommendation, Filters, Mood};
use crate::{RecommendError, Recommender};

/// Builder for configuring and executing a recommendation request
#[derive(Debug, Default)]
pub struct RecommendationBuilder {
    filters: Filters,
    prompt: String,
    translate_overviews: Option<bool>,
    history_dir: Option<PathBuf>,
    config: Option<AppConfig>,
    api_key: Option<String>,
    catalog_api_key: Option<String>,
}

impl RecommendationBuilder {
    /// Ask for films (the default)
    ///
    /// # Example
    /// ```
    /// use film_recommender::Recommender;
    ///
    /// let builder = Recommender::builder().film();
    /// ```
    pub fn film(mut self) -> Self {
        self.filters.content_type = ContentType::Film;
        self
    }

    /// Ask for series
    ///
    /// # Example
    /// ```
    /// use film_recommender::Recommender;
    ///
    /// let builder = Recommender::builder().dizi();
    /// ```
    pub fn dizi(mut self) -> Self {
        self.filters.content_type = ContentType::Dizi;
        self
    }

    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.filters.content_type = content_type;
        self
    }

    /// Add a category; may be called repeatedly
    ///
    /// # Example
    /// ```
    /// use film_recommender::Recommender;
    ///
    /// let builder = Recommender::builder()
    ///     .category("Bilim Kurgu")
    ///     .category("Gerilim");
    /// ```
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.filters.categories.push(category.into());
        self
    }

    pub fn mood(mut self, mood: Mood) -> Self {
        self.filters.mood = Some(mood);
        self
    }

    /// Free-text wish that takes priority over the other selections
    ///
    /// # Example
    /// ```
    /// use film_recommender::Recommender;
    ///
    /// let builder = Recommender::builder()
    ///     .prompt("Christopher Nolan tarzı zihin bükücü filmler");
    /// ```
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Translate overviews that the catalog only has in the original language.
    ///
    /// Overrides `enrich.translate_overviews` from configuration.
    pub fn translate_overviews(mut self, enabled: bool) -> Self {
        self.translate_overviews = Some(enabled);
        self
    }

    /// Record the request and its results in a file-backed history under `dir`
    pub fn history(mut self, dir: impl Into<PathBuf>) -> Self {
        self.history_dir = Some(dir.into());
        self
    }

    /// Use this configuration instead of loading `config.toml` and `FILM__*` variables
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the completion API key directly instead of relying on
    /// environment variables or config files.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn catalog_api_key(mut self, key: impl Into<String>) -> Self {
        self.catalog_api_key = Some(key.into());
        self
    }

    /// Build and execute the recommendation request
    ///
    /// # Errors
    /// Returns `RecommendError` if:
    /// - No completion API key is available
    /// - Every model candidate fails
    /// - The model reply contains no recoverable suggestions
    ///
    /// # Example
    /// ```no_run
    /// # use film_recommender::{Mood, Recommender};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let suggestions = Recommender::builder()
    ///     .dizi()
    ///     .category("Komedi")
    ///     .mood(Mood::Mutlu)
    ///     .build()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(self) -> Result<Vec<EnrichedRecommendation>, RecommendError> {
        let mut config = match self.config {
            Some(config) => config,
            None => AppConfig::load()?,
        };
        if let Some(key) = self.api_key {
            config.completion.api_key = Some(key);
        }
        if let Some(key) = self.catalog_api_key {
            config.catalog.api_key = Some(key);
        }
        if let Some(enabled) = self.translate_overviews {
            config.enrich.translate_overviews = enabled;
        }

        let history_dir = self
            .history_dir
            .or_else(|| config.history.path.as_ref().map(PathBuf::from));

        let recommender = Recommender::from_config(&config)?;
        let recommendations = recommender.recommend(&self.prompt, &self.filters).await?;

        if let Some(dir) = history_dir {
            let history = History::new(FileStore::new(dir)).with_limit(config.history.limit);
            if let Err(e) = history
                .record(&self.prompt, &self.filters, &recommendations, Local::now())
                .await
            {
                warn!("Failed to record history: {}", e);
            }
        }

        Ok(recommendations)
    }
}
