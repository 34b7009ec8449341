use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Catalog media kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the user asked for: films or series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Film,
    Dizi,
}

impl ContentType {
    /// Label used inside the prompt
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Film => "film",
            ContentType::Dizi => "dizi",
        }
    }

    pub fn media_type(&self) -> MediaType {
        match self {
            ContentType::Film => MediaType::Movie,
            ContentType::Dizi => MediaType::Tv,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Mutlu,
    Uzgun,
    Heyecanli,
    Rahat,
    Nostaljik,
}

impl Mood {
    /// Phrase inserted into the prompt for this mood
    pub fn description(&self) -> &'static str {
        match self {
            Mood::Mutlu => "mutlu ve neşeli",
            Mood::Uzgun => "üzgün ve duygusal",
            Mood::Heyecanli => "heyecanlı ve enerjik",
            Mood::Rahat => "rahat ve huzurlu",
            Mood::Nostaljik => "nostaljik",
        }
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mutlu" => Ok(Mood::Mutlu),
            "uzgun" => Ok(Mood::Uzgun),
            "heyecanli" => Ok(Mood::Heyecanli),
            "rahat" => Ok(Mood::Rahat),
            "nostaljik" => Ok(Mood::Nostaljik),
            other => Err(format!("Unknown mood: {}", other)),
        }
    }
}

/// Filters selected by the user for one request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    pub content_type: ContentType,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub mood: Option<Mood>,
}

/// A recommendation as recovered from model output, before catalog lookup.
///
/// Fields are kept as the model wrote them: `year` is not checked against the
/// calendar and titles may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationStub {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub title_tr: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub reason: String,
}

/// Viewing platform offering a title in the configured region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchProvider {
    pub provider_id: u64,
    pub provider_name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
    #[serde(default)]
    pub display_priority: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

/// A recommendation ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRecommendation {
    pub id: Option<u64>,
    pub title: String,
    pub title_tr: String,
    pub year: String,
    pub reason: String,
    pub poster: Option<String>,
    pub backdrop: Option<String>,
    pub overview: Option<String>,
    /// Original-language synopsis kept for later translation
    #[serde(default)]
    pub original_overview: Option<String>,
    #[serde(default)]
    pub needs_overview_translation: bool,
    pub rating: Option<String>,
    pub tmdb_url: String,
    pub providers: Vec<WatchProvider>,
    #[serde(default)]
    pub cast: Vec<CastMember>,
    pub media_type: MediaType,
    #[serde(default)]
    pub trailer_key: Option<String>,
}

impl EnrichedRecommendation {
    /// Record for a stub the catalog could not resolve.
    pub fn minimal(stub: &RecommendationStub, media_type: MediaType) -> Self {
        EnrichedRecommendation {
            id: None,
            title: stub.title.clone(),
            title_tr: stub.title_tr.clone(),
            year: stub.year.clone(),
            reason: stub.reason.clone(),
            poster: None,
            backdrop: None,
            overview: None,
            original_overview: None,
            needs_overview_translation: false,
            rating: None,
            tmdb_url: web_search_url(&stub.title),
            providers: Vec::new(),
            cast: Vec::new(),
            media_type,
            trailer_key: None,
        }
    }
}

/// Generic search-engine link used when no catalog page is known
pub fn web_search_url(title: &str) -> String {
    format!(
        "https://www.google.com/search?q={}",
        urlencoding::encode(&format!("{} izle", title))
    )
}
