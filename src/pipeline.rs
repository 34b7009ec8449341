use crate::builder::RecommendationBuilder;
use crate::catalog::TmdbCatalog;
use crate::config::{AppConfig, CompletionConfig};
use crate::discover::{PersonProfile, TrendingTitle};
use crate::enrich::Enricher;
use crate::error::RecommendError;
use crate::extract::parse_recommendations;
use crate::model::{EnrichedRecommendation, Filters, MediaType};
use crate::providers::prompt::build_recommendation_prompt;
use crate::providers::{CompletionRequest, FallbackProvider, ModelRotation, OpenAIProvider};
use crate::translate::{translate_biography, translate_overviews, Translator};
use chrono::{Local, NaiveDate};
use log::{debug, info};

/// Prompt → completion → extraction → enrichment, with optional overview translation.
pub struct Recommender {
    fallback: FallbackProvider,
    rotation: ModelRotation,
    enricher: Enricher,
    completion: CompletionConfig,
    translate_overviews: bool,
}

impl Recommender {
    pub fn new(fallback: FallbackProvider, enricher: Enricher, completion: CompletionConfig) -> Self {
        Recommender {
            fallback,
            rotation: ModelRotation::default(),
            enricher,
            completion,
            translate_overviews: false,
        }
    }

    /// Wire the OpenRouter relay and TMDB from configuration.
    ///
    /// A completion API key is required; the catalog key is optional so a
    /// key-injecting proxy can be configured as `catalog.base_url`.
    pub fn from_config(config: &AppConfig) -> Result<Self, RecommendError> {
        let api_key = config.completion_api_key().ok_or_else(|| {
            RecommendError::BuilderError(
                "No completion API key. Set OPENROUTER_API_KEY or FILM__COMPLETION__API_KEY"
                    .to_string(),
            )
        })?;

        let provider = OpenAIProvider::new(&config.completion, api_key)?;
        let fallback =
            FallbackProvider::new(Box::new(provider), config.completion.models.clone())?;

        let catalog = TmdbCatalog::new(&config.catalog, config.catalog_api_key())?;
        let enricher = Enricher::new(Box::new(catalog), config.catalog.clone())
            .with_concurrency(config.enrich.concurrency);

        Ok(Recommender::new(fallback, enricher, config.completion.clone())
            .with_translation(config.enrich.translate_overviews))
    }

    pub fn builder() -> RecommendationBuilder {
        RecommendationBuilder::default()
    }

    /// Translate overviews that only exist in the catalog's fallback language
    pub fn with_translation(mut self, enabled: bool) -> Self {
        self.translate_overviews = enabled;
        self
    }

    pub fn rotation(&self) -> &ModelRotation {
        &self.rotation
    }

    /// Translator sharing this recommender's candidates and rotation
    pub fn translator(&self) -> Translator<'_> {
        Translator::new(
            &self.fallback,
            &self.rotation,
            self.completion.translation_max_tokens,
            self.completion.translation_temperature,
        )
    }

    pub async fn recommend(
        &self,
        user_prompt: &str,
        filters: &Filters,
    ) -> Result<Vec<EnrichedRecommendation>, RecommendError> {
        self.recommend_on(user_prompt, filters, Local::now().date_naive())
            .await
    }

    /// Same as [`Recommender::recommend`] with an explicit "today" for the prompt.
    pub async fn recommend_on(
        &self,
        user_prompt: &str,
        filters: &Filters,
        today: NaiveDate,
    ) -> Result<Vec<EnrichedRecommendation>, RecommendError> {
        let prompt = build_recommendation_prompt(filters, user_prompt, today);
        debug!("Recommendation prompt is {} chars", prompt.len());

        let request = CompletionRequest::from_prompt(
            prompt,
            self.completion.max_tokens,
            self.completion.temperature,
        );
        let completion = self.rotation.complete(&self.fallback, &request).await?;

        let stubs = parse_recommendations(&completion.content).into_stubs();
        if stubs.is_empty() {
            return Err(RecommendError::UnrecoverableParse);
        }
        info!("{} suggestion(s) from {}", stubs.len(), completion.model);

        let mut enriched = self
            .enricher
            .enrich_all(&stubs, filters.content_type.media_type())
            .await;

        if self.translate_overviews {
            translate_overviews(&mut enriched, &self.translator()).await;
        }

        Ok(enriched)
    }

    /// This week's trending titles of one kind
    pub async fn trending(
        &self,
        kind: MediaType,
        limit: usize,
    ) -> Result<Vec<TrendingTitle>, RecommendError> {
        self.enricher.discovery().trending(kind, limit).await
    }

    /// Person profile; the biography is translated along with overviews.
    pub async fn person(&self, id: u64) -> Result<PersonProfile, RecommendError> {
        let mut profile = self.enricher.discovery().person(id).await?;
        if self.translate_overviews {
            translate_biography(&mut profile, &self.translator()).await;
        }
        Ok(profile)
    }
}
