//! Typed client for the Overseerr REST API.
//!
//! Covers the three endpoints the bot uses: the pending-request listing, the
//! per-title metadata lookup, and the approve/decline actions.  All calls
//! authenticate with a static `X-Api-Key` header.

use crate::media::{Decision, MediaRequest, MediaType};
use anyhow::Result;

const API_KEY_HEADER: &str = "X-Api-Key";

/// Overseerr encodes request status numerically; 1 is pending approval.
pub const STATUS_PENDING: u8 = 1;

const TMDB_POSTER_PREFIX: &str = "https://image.tmdb.org/t/p/w600_and_h900_bestv2";

pub struct Client {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl Client {
    pub fn new(cfg: &crate::config::Overseerr) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
        }
    }

    /// Fetch the first page of pending requests.
    pub async fn pending_requests(&self) -> Result<RequestPage> {
        let url = format!(
            "{}/api/v1/request?take=20&skip=0&filter=pending",
            self.base_url
        );

        let page = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(page)
    }

    /// Fetch title metadata (name, year, overview, poster, seasons) for a
    /// request's underlying media.
    pub async fn media_details(
        &self,
        media_type: MediaType,
        tmdb_id: u64,
    ) -> Result<MediaDetails> {
        let url = format!(
            "{}/api/v1/{}/{}",
            self.base_url,
            media_type.api_slug(),
            tmdb_id
        );

        let details = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(details)
    }

    /// Apply a moderator decision to a request.  Non-2xx is an error; the
    /// caller decides whether to surface it to chat.
    pub async fn resolve_request(&self, request_id: &str, decision: Decision) -> Result<()> {
        let url = format!(
            "{}/api/v1/request/{}/{}",
            self.base_url,
            request_id,
            decision.api_action()
        );

        self.http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

/// One page of `GET /api/v1/request` results.
#[derive(Debug, serde::Deserialize)]
pub struct RequestPage {
    #[serde(default)]
    pub results: Vec<RequestSummary>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSummary {
    pub id: u64,
    pub status: u8,
    #[serde(default)]
    pub media: Option<MediaInfo>,
    #[serde(default)]
    pub requested_by: Option<Requester>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaInfo {
    #[serde(default)]
    pub tmdb_id: Option<u64>,
    #[serde(default)]
    pub media_type: Option<MediaType>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requester {
    #[serde(default)]
    pub display_name: Option<String>,
}

/// `GET /api/v1/{movie|tv}/{id}` response, reduced to the fields the embed
/// needs.  Movie responses use `title`/`releaseDate` where tv uses
/// `name`/`firstAirDate`; the aliases accept both.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDetails {
    #[serde(default, alias = "title")]
    pub name: Option<String>,
    #[serde(default, alias = "releaseDate")]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub seasons: Vec<Season>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub season_number: u64,
}

/// Normalize a polled request plus its metadata into the canonical record,
/// with best-effort fallbacks for anything Overseerr left out.
pub fn media_request_from(
    summary: &RequestSummary,
    media_type: MediaType,
    details: &MediaDetails,
) -> MediaRequest {
    let name = details.name.as_deref().unwrap_or("Unknown Title");
    let year = crate::media::release_year(details.first_air_date.as_deref());

    let poster_url = details
        .poster_path
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(|p| format!("{}{}", TMDB_POSTER_PREFIX, p));

    let requested_by = summary
        .requested_by
        .as_ref()
        .and_then(|r| r.display_name.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    MediaRequest {
        request_id: summary.id.to_string(),
        title: format!("{} ({})", name, year),
        description: details
            .overview
            .clone()
            .unwrap_or_else(|| "No description available.".to_string()),
        poster_url,
        requested_by,
        media_type,
        seasons: details
            .seasons
            .iter()
            .map(|s| s.season_number.to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PENDING_PAGE: &str = r#"{
        "pageInfo": { "pages": 1, "pageSize": 20, "results": 1, "page": 1 },
        "results": [
            {
                "id": 42,
                "status": 1,
                "media": { "id": 7, "tmdbId": 99, "mediaType": "tv", "status": 2 },
                "requestedBy": { "id": 3, "displayName": "alice" }
            }
        ]
    }"#;

    const TV_DETAILS: &str = r#"{
        "name": "Show",
        "firstAirDate": "2020-05-01",
        "overview": "A show.",
        "posterPath": "/abc.jpg",
        "seasons": [
            { "seasonNumber": 1, "episodeCount": 10 },
            { "seasonNumber": 2, "episodeCount": 8 }
        ]
    }"#;

    const MOVIE_DETAILS: &str = r#"{
        "title": "Film",
        "releaseDate": "1999-03-31",
        "overview": "A film."
    }"#;

    #[test]
    fn parses_pending_request_page() {
        let page: RequestPage = serde_json::from_str(PENDING_PAGE).unwrap();
        assert_eq!(page.results.len(), 1);

        let summary = &page.results[0];
        assert_eq!(summary.id, 42);
        assert_eq!(summary.status, STATUS_PENDING);

        let media = summary.media.as_ref().unwrap();
        assert_eq!(media.tmdb_id, Some(99));
        assert_eq!(media.media_type, Some(MediaType::Tv));
    }

    #[test]
    fn normalizes_tv_request() {
        let page: RequestPage = serde_json::from_str(PENDING_PAGE).unwrap();
        let details: MediaDetails = serde_json::from_str(TV_DETAILS).unwrap();

        let request = media_request_from(&page.results[0], MediaType::Tv, &details);

        assert_eq!(request.request_id, "42");
        assert_eq!(request.title, "Show (2020)");
        assert_eq!(request.requested_by, "alice");
        assert_eq!(request.seasons, vec!["1", "2"]);
        assert_eq!(
            request.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w600_and_h900_bestv2/abc.jpg")
        );
    }

    #[test]
    fn movie_details_use_aliased_fields() {
        let page: RequestPage = serde_json::from_str(PENDING_PAGE).unwrap();
        let details: MediaDetails = serde_json::from_str(MOVIE_DETAILS).unwrap();

        let request = media_request_from(&page.results[0], MediaType::Movie, &details);

        assert_eq!(request.title, "Film (1999)");
        assert_eq!(request.poster_url, None);
        assert!(request.seasons.is_empty());
    }

    #[test]
    fn sparse_details_fall_back() {
        let page: RequestPage = serde_json::from_str(PENDING_PAGE).unwrap();
        let details: MediaDetails = serde_json::from_str("{}").unwrap();

        let request = media_request_from(&page.results[0], MediaType::Tv, &details);

        assert_eq!(request.title, "Unknown Title (Unknown Year)");
        assert_eq!(request.description, "No description available.");
    }
}
