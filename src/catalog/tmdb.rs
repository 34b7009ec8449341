use crate::catalog::{Catalog, Details, Person, PersonCredit, RegionProviders, SearchResult, Video};
use crate::config::CatalogConfig;
use crate::error::{BoxError, RecommendError};
use crate::model::{CastMember, MediaType};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// TMDB v3 client. The API key is optional so requests can go through a
/// relay that injects it.
pub struct TmdbCatalog {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Deserialize)]
struct Paged<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Deserialize)]
struct ProvidersResponse {
    #[serde(default)]
    results: HashMap<String, RegionProviders>,
}

#[derive(Deserialize)]
struct CreditsResponse {
    #[serde(default)]
    cast: Vec<CastMember>,
}

#[derive(Deserialize)]
struct AggregateCreditsResponse {
    #[serde(default)]
    cast: Vec<AggregateCastMember>,
}

#[derive(Deserialize)]
struct CombinedCreditsResponse {
    #[serde(default)]
    cast: Vec<PersonCredit>,
}

#[derive(Deserialize)]
struct AggregateCastMember {
    id: u64,
    name: String,
    #[serde(default)]
    profile_path: Option<String>,
    #[serde(default)]
    roles: Vec<Role>,
}

#[derive(Deserialize)]
struct Role {
    #[serde(default)]
    character: String,
}

impl From<AggregateCastMember> for CastMember {
    fn from(member: AggregateCastMember) -> Self {
        CastMember {
            id: member.id,
            name: member.name,
            character: member
                .roles
                .into_iter()
                .next()
                .map(|role| role.character)
                .unwrap_or_default(),
            profile_path: member.profile_path,
        }
    }
}

impl TmdbCatalog {
    pub fn new(config: &CatalogConfig, api_key: Option<String>) -> Result<Self, RecommendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(TmdbCatalog {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: Option<String>, base_url: String) -> Self {
        TmdbCatalog {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, BoxError> {
        let url = format!("{}/3/{}", self.base_url, path);
        debug!("GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.query(&[("api_key", key.as_str())]);
        }

        let response = request.query(query).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("Catalog returned status {} for {}: {}", status, path, body).into());
        }

        Ok(response.json::<T>().await?)
    }
}

fn language_query(language: Option<&str>) -> Vec<(&str, &str)> {
    language.map(|lang| vec![("language", lang)]).unwrap_or_default()
}

#[async_trait]
impl Catalog for TmdbCatalog {
    async fn search(
        &self,
        kind: MediaType,
        query: &str,
        language: Option<&str>,
    ) -> Result<Vec<SearchResult>, BoxError> {
        let mut params = vec![("query", query)];
        params.extend(language_query(language));

        let page: Paged<SearchResult> = self
            .get_json(&format!("search/{}", kind.as_str()), &params)
            .await?;
        Ok(page.results)
    }

    async fn details(
        &self,
        kind: MediaType,
        id: u64,
        language: Option<&str>,
    ) -> Result<Details, BoxError> {
        self.get_json(&format!("{}/{}", kind.as_str(), id), &language_query(language))
            .await
    }

    async fn watch_providers(
        &self,
        kind: MediaType,
        id: u64,
    ) -> Result<HashMap<String, RegionProviders>, BoxError> {
        let response: ProvidersResponse = self
            .get_json(&format!("{}/{}/watch/providers", kind.as_str(), id), &[])
            .await?;
        Ok(response.results)
    }

    async fn credits(&self, kind: MediaType, id: u64) -> Result<Vec<CastMember>, BoxError> {
        match kind {
            MediaType::Movie => {
                let credits: CreditsResponse =
                    self.get_json(&format!("movie/{}/credits", id), &[]).await?;
                Ok(credits.cast)
            }
            MediaType::Tv => {
                let credits: AggregateCreditsResponse = self
                    .get_json(&format!("tv/{}/aggregate_credits", id), &[])
                    .await?;
                Ok(credits.cast.into_iter().map(CastMember::from).collect())
            }
        }
    }

    async fn videos(&self, kind: MediaType, id: u64) -> Result<Vec<Video>, BoxError> {
        let page: Paged<Video> = self
            .get_json(&format!("{}/{}/videos", kind.as_str(), id), &[])
            .await?;
        Ok(page.results)
    }

    async fn season_videos(&self, id: u64, season: u32) -> Result<Vec<Video>, BoxError> {
        let page: Paged<Video> = self
            .get_json(&format!("tv/{}/season/{}/videos", id, season), &[])
            .await?;
        Ok(page.results)
    }

    async fn trending(
        &self,
        kind: MediaType,
        language: Option<&str>,
    ) -> Result<Vec<SearchResult>, BoxError> {
        let page: Paged<SearchResult> = self
            .get_json(
                &format!("trending/{}/week", kind.as_str()),
                &language_query(language),
            )
            .await?;
        Ok(page.results)
    }

    async fn person(&self, id: u64, language: Option<&str>) -> Result<Person, BoxError> {
        self.get_json(&format!("person/{}", id), &language_query(language))
            .await
    }

    async fn combined_credits(
        &self,
        person_id: u64,
        language: Option<&str>,
    ) -> Result<Vec<PersonCredit>, BoxError> {
        let credits: CombinedCreditsResponse = self
            .get_json(
                &format!("person/{}/combined_credits", person_id),
                &language_query(language),
            )
            .await?;
        Ok(credits.cast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_search_sends_key_and_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/3/search/movie")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("api_key".into(), "secret".into()),
                Matcher::UrlEncoded("query".into(), "Yüzüklerin Efendisi".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"page":1,"results":[{"id":120,"title":"The Lord of the Rings","original_language":"en","poster_path":"/p.jpg","vote_average":8.4,"release_date":"2001-12-18"}]}"#,
            )
            .create_async()
            .await;

        let catalog = TmdbCatalog::with_base_url(Some("secret".to_string()), server.url());
        let results = catalog
            .search(MediaType::Movie, "Yüzüklerin Efendisi", None)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 120);
        assert_eq!(results[0].vote_average, Some(8.4));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_details_with_language() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/3/tv/1396")
            .match_query(Matcher::UrlEncoded("language".into(), "tr-TR".into()))
            .with_status(200)
            .with_body(r#"{"id":1396,"name":"Breaking Bad","overview":"Lise kimya öğretmeni..."}"#)
            .create_async()
            .await;

        let catalog = TmdbCatalog::with_base_url(None, server.url());
        let details = catalog
            .details(MediaType::Tv, 1396, Some("tr-TR"))
            .await
            .unwrap();
        assert_eq!(details.display_title(), Some("Breaking Bad"));
        assert!(details.poster_path.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_watch_providers_by_region() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/3/movie/27205/watch/providers")
            .with_status(200)
            .with_body(
                r#"{"id":27205,"results":{"TR":{"link":"x","flatrate":[{"provider_id":8,"provider_name":"Netflix","logo_path":"/n.jpg","display_priority":1}]}}}"#,
            )
            .create_async()
            .await;

        let catalog = TmdbCatalog::with_base_url(None, server.url());
        let providers = catalog
            .watch_providers(MediaType::Movie, 27205)
            .await
            .unwrap();
        let tr = providers.get("TR").cloned().unwrap();
        assert_eq!(tr.preferred()[0].provider_name, "Netflix");
    }

    #[tokio::test]
    async fn test_tv_credits_use_first_role() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/3/tv/1396/aggregate_credits")
            .with_status(200)
            .with_body(
                r#"{"cast":[{"id":17419,"name":"Bryan Cranston","profile_path":null,"roles":[{"character":"Walter White","episode_count":62}]},{"id":84497,"name":"Aaron Paul","roles":[]}]}"#,
            )
            .create_async()
            .await;

        let catalog = TmdbCatalog::with_base_url(None, server.url());
        let cast = catalog.credits(MediaType::Tv, 1396).await.unwrap();
        assert_eq!(cast[0].character, "Walter White");
        assert_eq!(cast[1].character, "");
    }

    #[tokio::test]
    async fn test_trending_without_language() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/3/trending/tv/week")
            .with_status(200)
            .with_body(r#"{"results":[{"id":1396,"name":"Breaking Bad","poster_path":"/bb.jpg"}]}"#)
            .create_async()
            .await;

        let catalog = TmdbCatalog::with_base_url(None, server.url());
        let results = catalog.trending(MediaType::Tv, None).await.unwrap();
        assert_eq!(results[0].display_title(), Some("Breaking Bad"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_person_and_combined_credits() {
        let mut server = Server::new_async().await;
        let _person = server
            .mock("GET", "/3/person/6193")
            .match_query(Matcher::UrlEncoded("language".into(), "en-US".into()))
            .with_status(200)
            .with_body(
                r#"{"id":6193,"name":"Leonardo DiCaprio","biography":"American actor.","birthday":"1974-11-11","profile_path":"/leo.jpg"}"#,
            )
            .create_async()
            .await;
        let _credits = server
            .mock("GET", "/3/person/6193/combined_credits")
            .match_query(Matcher::UrlEncoded("language".into(), "tr-TR".into()))
            .with_status(200)
            .with_body(
                r#"{"id":6193,"cast":[{"id":27205,"media_type":"movie","title":"Başlangıç","character":"Cobb","order":0,"vote_count":37000}],"crew":[]}"#,
            )
            .create_async()
            .await;

        let catalog = TmdbCatalog::with_base_url(None, server.url());
        let person = catalog.person(6193, Some("en-US")).await.unwrap();
        assert_eq!(person.name, "Leonardo DiCaprio");
        assert_eq!(person.biography.as_deref(), Some("American actor."));
        assert!(person.deathday.is_none());

        let credits = catalog.combined_credits(6193, Some("tr-TR")).await.unwrap();
        assert_eq!(credits[0].display_title(), Some("Başlangıç"));
        assert_eq!(credits[0].media_type, Some(MediaType::Movie));
        assert_eq!(credits[0].order, Some(0));
    }

    #[tokio::test]
    async fn test_error_status_is_an_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/3/movie/1/videos")
            .match_query(Matcher::UrlEncoded("api_key".into(), "bad".into()))
            .with_status(401)
            .with_body(r#"{"status_message":"Invalid API key"}"#)
            .create_async()
            .await;

        let catalog = TmdbCatalog::with_base_url(Some("bad".to_string()), server.url());
        let err = catalog.videos(MediaType::Movie, 1).await.unwrap_err();
        assert!(err.to_string().contains("401"));
    }
}
