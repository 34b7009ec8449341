//! Movie/TV metadata catalog abstraction
//!
//! The enrichment stage only needs a handful of lookups: title search, localized
//! details, watch providers, cast and trailer videos. Discovery adds weekly
//! trending titles, people and their combined credits. `TmdbCatalog` implements
//! them over the TMDB v3 API; tests plug in scripted catalogs.
use crate::error::BoxError;
use crate::model::{CastMember, MediaType, WatchProvider};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

mod tmdb;

pub use tmdb::TmdbCatalog;

/// One candidate returned by a title search
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResult {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
}

impl SearchResult {
    /// Movie title or series name
    pub fn display_title(&self) -> Option<&str> {
        non_empty(self.title.as_deref()).or_else(|| non_empty(self.name.as_deref()))
    }

    /// First four characters of the release or first-air date
    pub fn release_year(&self) -> Option<String> {
        let date = non_empty(self.release_date.as_deref())
            .or_else(|| non_empty(self.first_air_date.as_deref()))?;
        Some(date.chars().take(4).collect())
    }
}

/// Detail record, typically requested in a specific locale
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Details {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
}

impl Details {
    pub fn display_title(&self) -> Option<&str> {
        non_empty(self.title.as_deref()).or_else(|| non_empty(self.name.as_deref()))
    }
}

/// Offers for one region, split by how the title can be watched
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RegionProviders {
    #[serde(default)]
    pub flatrate: Vec<WatchProvider>,
    #[serde(default)]
    pub buy: Vec<WatchProvider>,
    #[serde(default)]
    pub rent: Vec<WatchProvider>,
}

impl RegionProviders {
    /// Subscription offers, else purchase, else rental.
    pub fn preferred(self) -> Vec<WatchProvider> {
        if !self.flatrate.is_empty() {
            self.flatrate
        } else if !self.buy.is_empty() {
            self.buy
        } else {
            self.rent
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Video {
    pub key: String,
    #[serde(default)]
    pub site: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub official: bool,
    #[serde(default)]
    pub published_at: Option<String>,
}

impl Video {
    pub fn is_youtube_trailer(&self) -> bool {
        self.site == "YouTube" && self.kind == "Trailer"
    }
}

/// Person record, typically requested in a specific locale
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Person {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub deathday: Option<String>,
    #[serde(default)]
    pub place_of_birth: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

/// One acting credit from a person's combined movie and TV credits
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PersonCredit {
    pub id: u64,
    #[serde(default)]
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Billing position; TMDB omits it for some TV credits
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default)]
    pub vote_count: Option<u64>,
}

impl PersonCredit {
    pub fn display_title(&self) -> Option<&str> {
        non_empty(self.title.as_deref()).or_else(|| non_empty(self.name.as_deref()))
    }
}

/// Lookups against a movie and series catalog
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Search titles of `kind` matching `query`
    async fn search(
        &self,
        kind: MediaType,
        query: &str,
        language: Option<&str>,
    ) -> Result<Vec<SearchResult>, BoxError>;

    /// Fetch the detail record for `id`
    async fn details(
        &self,
        kind: MediaType,
        id: u64,
        language: Option<&str>,
    ) -> Result<Details, BoxError>;

    /// Watch providers keyed by region code
    async fn watch_providers(
        &self,
        kind: MediaType,
        id: u64,
    ) -> Result<HashMap<String, RegionProviders>, BoxError>;

    /// Cast in billing order; series use aggregated credits
    async fn credits(&self, kind: MediaType, id: u64) -> Result<Vec<CastMember>, BoxError>;

    async fn videos(&self, kind: MediaType, id: u64) -> Result<Vec<Video>, BoxError>;

    /// Videos attached to one season of a series
    async fn season_videos(&self, id: u64, season: u32) -> Result<Vec<Video>, BoxError>;

    /// Titles of `kind` trending this week
    async fn trending(
        &self,
        kind: MediaType,
        language: Option<&str>,
    ) -> Result<Vec<SearchResult>, BoxError>;

    async fn person(&self, id: u64, language: Option<&str>) -> Result<Person, BoxError>;

    /// Acting credits of a person across movies and series
    async fn combined_credits(
        &self,
        person_id: u64,
        language: Option<&str>,
    ) -> Result<Vec<PersonCredit>, BoxError>;
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(id: u64, name: &str) -> WatchProvider {
        WatchProvider {
            provider_id: id,
            provider_name: name.to_string(),
            logo_path: None,
            display_priority: None,
        }
    }

    #[test]
    fn test_preferred_providers_order() {
        let all = RegionProviders {
            flatrate: vec![provider(8, "Netflix")],
            buy: vec![provider(2, "Apple TV")],
            rent: vec![provider(3, "Google Play")],
        };
        assert_eq!(all.preferred()[0].provider_name, "Netflix");

        let no_flatrate = RegionProviders {
            flatrate: vec![],
            buy: vec![],
            rent: vec![provider(3, "Google Play")],
        };
        assert_eq!(no_flatrate.preferred()[0].provider_name, "Google Play");

        assert!(RegionProviders::default().preferred().is_empty());
    }

    #[test]
    fn test_release_year() {
        let movie = SearchResult {
            release_date: Some("2010-07-15".to_string()),
            ..Default::default()
        };
        assert_eq!(movie.release_year().as_deref(), Some("2010"));

        let series = SearchResult {
            release_date: Some(String::new()),
            first_air_date: Some("2008-01-20".to_string()),
            ..Default::default()
        };
        assert_eq!(series.release_year().as_deref(), Some("2008"));

        assert!(SearchResult::default().release_year().is_none());
    }

    #[test]
    fn test_display_title_prefers_title_then_name() {
        let series = SearchResult {
            name: Some("Breaking Bad".to_string()),
            ..Default::default()
        };
        assert_eq!(series.display_title(), Some("Breaking Bad"));
    }

    #[test]
    fn test_person_credit_media_type() {
        let credit: PersonCredit = serde_json::from_str(
            r#"{"id":1396,"media_type":"tv","name":"Breaking Bad","character":"Walter White","episode_count":62}"#,
        )
        .unwrap();
        assert_eq!(credit.media_type, Some(MediaType::Tv));
        assert_eq!(credit.display_title(), Some("Breaking Bad"));
        assert!(credit.order.is_none());
    }

    #[test]
    fn test_video_deserializes_type_field() {
        let video: Video = serde_json::from_str(
            r#"{"key":"abc","site":"YouTube","type":"Trailer","official":true}"#,
        )
        .unwrap();
        assert!(video.is_youtube_trailer());
        assert!(video.official);
    }
}
