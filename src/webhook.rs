//! Push-side request source: a small axum server that accepts Overseerr
//! webhook notifications and hands them to the Discord event loop.
//!
//! The HTTP task never touches shared state directly.  Accepted payloads
//! cross the task boundary over a bounded mpsc channel and are dispatched as
//! `Event::RequestArrived` by the relay task, which runs with the gateway's
//! context.  Overseerr treats any non-200 as a delivery failure and retries,
//! so the endpoint acknowledges everything and logs what it discards.

use crate::context::Shared;
use crate::event::Event;
use crate::log_internal;
use crate::media::{MediaRequest, MediaType};
use anyhow::{anyhow, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Name of the `extra[]` entry carrying the requested season list.
const SEASONS_EXTRA: &str = "Requested Seasons";

pub async fn serve(bind_address: String, tx: mpsc::Sender<MediaRequest>) -> Result<()> {
    let app = Router::new()
        .route("/webhook", post(receive))
        .with_state(tx);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .map_err(|e| anyhow!("Could not bind webhook listener on `{}`: {}", bind_address, e))?;

    log_internal!("Webhook listener on {}", bind_address);

    axum::serve(listener, app).await.map_err(Into::into)
}

/// Always replies `200 {"status":"success"}`; the caller never learns of
/// downstream failures.
async fn receive(State(tx): State<mpsc::Sender<MediaRequest>>, body: Bytes) -> Json<Value> {
    match parse_notification(&body) {
        Ok(request) => {
            if tx.send(request).await.is_err() {
                log_internal!("Webhook inbox closed; dropping notification");
            }
        }
        Err(err) => log_internal!("Discarding webhook payload: {}", err),
    }

    Json(json!({ "status": "success" }))
}

/// Drain the webhook inbox inside the gateway's scheduling context.
pub async fn relay(
    shared: Arc<Shared>,
    discord_ctx: serenity::all::Context,
    mut inbox: mpsc::Receiver<MediaRequest>,
) {
    while let Some(request) = inbox.recv().await {
        Event::RequestArrived(request)
            .handle(shared.ctx(&discord_ctx))
            .await;
    }
}

/// Overseerr webhook notification body, reduced to the fields we map.
#[derive(Debug, serde::Deserialize)]
struct Payload {
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    request: Option<PayloadRequest>,
    #[serde(default)]
    media: Option<PayloadMedia>,
    #[serde(default)]
    extra: Vec<PayloadExtra>,
}

#[derive(Debug, serde::Deserialize)]
struct PayloadRequest {
    request_id: String,
    #[serde(default, rename = "requestedBy_username")]
    requested_by_username: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct PayloadMedia {
    #[serde(default)]
    media_type: Option<MediaType>,
}

#[derive(Debug, serde::Deserialize)]
struct PayloadExtra {
    name: String,
    #[serde(default)]
    value: Option<String>,
}

fn parse_notification(body: &[u8]) -> Result<MediaRequest> {
    let payload: Payload = serde_json::from_slice(body)?;
    payload.into_media_request()
}

impl Payload {
    /// Map the pushed fields straight into the canonical record.  Push
    /// delivery is assumed exactly-once, so there is no dedup and no
    /// supplementary metadata fetch.
    fn into_media_request(self) -> Result<MediaRequest> {
        let request = self
            .request
            .ok_or_else(|| anyhow!("payload has no request section"))?;

        let media_type = self
            .media
            .and_then(|m| m.media_type)
            .ok_or_else(|| anyhow!("payload has no media type"))?;

        let seasons = self
            .extra
            .iter()
            .find(|extra| extra.name == SEASONS_EXTRA)
            .and_then(|extra| extra.value.as_deref())
            .map(|value| {
                value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(MediaRequest {
            request_id: request.request_id,
            title: self.subject.unwrap_or_else(|| "Unknown Title".to_string()),
            description: self
                .message
                .unwrap_or_else(|| "No description available.".to_string()),
            poster_url: self.image.filter(|url| !url.is_empty()),
            requested_by: request
                .requested_by_username
                .unwrap_or_else(|| "Unknown".to_string()),
            media_type,
            seasons,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TV_NOTIFICATION: &str = r#"{
        "notification_type": "MEDIA_PENDING",
        "subject": "Show (2020)",
        "message": "A show.",
        "image": "https://image.tmdb.org/t/p/w600_and_h900_bestv2/abc.jpg",
        "request": {
            "request_id": "42",
            "requestedBy_username": "alice"
        },
        "media": {
            "media_type": "tv",
            "tmdbId": "99"
        },
        "extra": [
            { "name": "Requested Seasons", "value": "1, 2" }
        ]
    }"#;

    #[test]
    fn maps_tv_notification() {
        let request = parse_notification(TV_NOTIFICATION.as_bytes()).unwrap();

        assert_eq!(request.request_id, "42");
        assert_eq!(request.title, "Show (2020)");
        assert_eq!(request.requested_by, "alice");
        assert_eq!(request.media_type, MediaType::Tv);
        assert_eq!(request.seasons, vec!["1", "2"]);
        assert_eq!(
            request.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w600_and_h900_bestv2/abc.jpg")
        );
    }

    #[test]
    fn movie_notification_has_no_seasons() {
        let request = parse_notification(
            br#"{
                "subject": "Film (1999)",
                "message": "A film.",
                "request": { "request_id": "7" },
                "media": { "media_type": "movie" }
            }"#,
        )
        .unwrap();

        assert_eq!(request.media_type, MediaType::Movie);
        assert!(request.seasons.is_empty());
        assert_eq!(request.requested_by, "Unknown");
        assert_eq!(request.poster_url, None);
    }

    #[test]
    fn rejects_payload_without_request_section() {
        assert!(parse_notification(br#"{ "subject": "hi" }"#).is_err());
        assert!(parse_notification(b"not json").is_err());
    }
}
