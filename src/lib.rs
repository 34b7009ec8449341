pub mod builder;
pub mod catalog;
pub mod config;
pub mod discover;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod history;
pub mod model;
pub mod pipeline;
pub mod providers;
pub mod sanitize;
pub mod translate;

pub use builder::RecommendationBuilder;
pub use discover::{KnownFor, PersonProfile, TrendingTitle};
pub use error::RecommendError;
pub use extract::{parse_recommendations, Extraction};
pub use history::{FileStore, History, HistoryEntry, KeyValueStore, MemoryStore};
pub use model::{
    CastMember, ContentType, EnrichedRecommendation, Filters, MediaType, Mood,
    RecommendationStub, WatchProvider,
};
pub use pipeline::Recommender;
pub use sanitize::sanitize;

/// Produce enriched recommendations using configuration from `config.toml`
/// and `FILM__*` environment variables.
pub async fn recommend(
    user_prompt: &str,
    filters: &Filters,
) -> Result<Vec<EnrichedRecommendation>, RecommendError> {
    let config = config::AppConfig::load()?;
    Recommender::from_config(&config)?
        .recommend(user_prompt, filters)
        .await
}
