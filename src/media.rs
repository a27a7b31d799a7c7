//! Canonical media-request model shared by the poll and webhook adapters,
//! plus the embed rendering that both the notifier and the moderation
//! reconciler operate on.
//!
//! The embed footer (`Request ID: <id>`) is the only link between a Discord
//! message and the Overseerr request it represents.  There is no side table;
//! losing the footer means losing the request.

use serenity::all::{Colour, ReactionType};
use serenity::builder::{CreateEmbed, CreateEmbedFooter};

/// Footer prefix used to correlate reaction events back to requests.
pub const REQUEST_ID_MARKER: &str = "Request ID: ";

pub const APPROVE_EMOJI: &str = "\u{2705}"; // ✅
pub const DECLINE_EMOJI: &str = "\u{274C}"; // ❌

/// The color Plex uses for its branding.  Pending notifications use it.
const PLEX_ORANGE: Colour = Colour::new(0x00E5_A00D);
const APPROVED_GREEN: Colour = Colour::new(0x002E_CC71);
const DECLINED_RED: Colour = Colour::new(0x00E7_4C3C);

/// A single media request, normalized from either a polled Overseerr request
/// or a pushed webhook payload.  Immutable once constructed; lives for one
/// notification cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRequest {
    pub request_id: String,
    /// Display title, already including the release year for the poll
    /// variant (webhook payloads carry a pre-composed subject line).
    pub title: String,
    pub description: String,
    pub poster_url: Option<String>,
    pub requested_by: String,
    pub media_type: MediaType,
    /// Season numbers as strings, in Overseerr's order.  Empty for movies.
    pub seasons: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    /// Path segment in Overseerr's metadata endpoint.
    pub fn api_slug(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MediaType::Movie => write!(f, "Movie"),
            MediaType::Tv => write!(f, "Tv"),
        }
    }
}

/// Moderator verdict on a request, derived from the reaction emoji.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Decline,
}

impl Decision {
    /// Final path segment of `POST /api/v1/request/{id}/...`.
    pub fn api_action(&self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Decline => "decline",
        }
    }

    pub fn status_text(&self) -> &'static str {
        match self {
            Decision::Approve => "Request approved!",
            Decision::Decline => "Request declined!",
        }
    }

    fn colour(&self) -> Colour {
        match self {
            Decision::Approve => APPROVED_GREEN,
            Decision::Decline => DECLINED_RED,
        }
    }
}

/// Map a reaction emoji to a moderation decision, if it is one of ours.
pub fn decision_for(emoji: &ReactionType) -> Option<Decision> {
    match emoji {
        ReactionType::Unicode(s) if s == APPROVE_EMOJI => Some(Decision::Approve),
        ReactionType::Unicode(s) if s == DECLINE_EMOJI => Some(Decision::Decline),
        _ => None,
    }
}

pub fn footer_text(request_id: &str) -> String {
    format!("{}{}", REQUEST_ID_MARKER, request_id)
}

/// Extract the request id from an embed footer.  Returns `None` for any text
/// that does not carry the marker, which is how reactions on unrelated
/// messages get rejected.
pub fn parse_request_id(footer: &str) -> Option<&str> {
    footer.strip_prefix(REQUEST_ID_MARKER)
}

/// Release year shown in the embed title: first four characters of a
/// date-like string, or a placeholder when the date is absent or too short.
pub fn release_year(date: Option<&str>) -> String {
    date.and_then(|d| d.get(..4))
        .map(str::to_string)
        .unwrap_or_else(|| "Unknown Year".to_string())
}

/// Build the notification embed for a pending request.
pub fn notification_embed(request: &MediaRequest) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(&request.title)
        .description(&request.description)
        .colour(PLEX_ORANGE)
        .footer(CreateEmbedFooter::new(footer_text(&request.request_id)))
        .field("Requested By", &request.requested_by, true)
        .field("Type", request.media_type.to_string(), true);

    if let Some(url) = &request.poster_url {
        embed = embed.thumbnail(url);
    }

    // Discord rejects embed fields with empty values, so an empty season
    // list omits the field entirely.
    if request.media_type == MediaType::Tv && !request.seasons.is_empty() {
        embed = embed.field("Seasons", request.seasons.join(", "), true);
    }

    embed
}

/// Mutate an embed into its terminal form: outcome color plus a `Status`
/// field.  Applied exactly once per message, right before its reactions are
/// cleared.
pub fn apply_decision(embed: CreateEmbed, decision: Decision) -> CreateEmbed {
    embed
        .colour(decision.colour())
        .field("Status", decision.status_text(), true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> MediaRequest {
        MediaRequest {
            request_id: "42".to_string(),
            title: "Show (2020)".to_string(),
            description: "A show.".to_string(),
            poster_url: Some("https://image.tmdb.org/t/p/w600_and_h900_bestv2/x.jpg".to_string()),
            requested_by: "alice".to_string(),
            media_type: MediaType::Tv,
            seasons: vec!["1".to_string(), "2".to_string()],
        }
    }

    fn field_names(embed: &serde_json::Value) -> Vec<String> {
        embed["fields"]
            .as_array()
            .map(|fields| {
                fields
                    .iter()
                    .map(|f| f["name"].as_str().unwrap_or_default().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn footer_round_trip() {
        let footer = footer_text("42");
        assert_eq!(footer, "Request ID: 42");
        assert_eq!(parse_request_id(&footer), Some("42"));
    }

    #[test]
    fn unrelated_footer_yields_no_id() {
        assert_eq!(parse_request_id("Some other footer"), None);
        assert_eq!(parse_request_id(""), None);
        // Marker must be a prefix, not merely present.
        assert_eq!(parse_request_id("see Request ID: 42"), None);
    }

    #[test]
    fn year_derivation() {
        assert_eq!(release_year(Some("2020-05-01")), "2020");
        assert_eq!(release_year(Some("20")), "Unknown Year");
        assert_eq!(release_year(None), "Unknown Year");
    }

    #[test]
    fn emoji_mapping_is_exclusive() {
        let approve = ReactionType::Unicode(APPROVE_EMOJI.to_string());
        let decline = ReactionType::Unicode(DECLINE_EMOJI.to_string());
        let other = ReactionType::Unicode("\u{1F440}".to_string());

        assert_eq!(decision_for(&approve), Some(Decision::Approve));
        assert_eq!(decision_for(&decline), Some(Decision::Decline));
        assert_eq!(decision_for(&other), None);
    }

    #[test]
    fn notification_embed_layout() {
        let embed = serde_json::to_value(notification_embed(&sample_request())).unwrap();

        assert_eq!(embed["title"], "Show (2020)");
        assert_eq!(embed["footer"]["text"], "Request ID: 42");

        let fields = embed["fields"].as_array().unwrap();
        let seasons = fields.iter().find(|f| f["name"] == "Seasons").unwrap();
        assert_eq!(seasons["value"], "1, 2");

        assert!(!field_names(&embed).contains(&"Status".to_string()));
    }

    #[test]
    fn movie_embed_has_no_seasons_field() {
        let request = MediaRequest {
            media_type: MediaType::Movie,
            seasons: Vec::new(),
            ..sample_request()
        };
        let embed = serde_json::to_value(notification_embed(&request)).unwrap();
        assert!(!field_names(&embed).contains(&"Seasons".to_string()));
    }

    #[test]
    fn decision_appends_status_and_recolors() {
        let embed = notification_embed(&sample_request());
        let decided = serde_json::to_value(apply_decision(embed, Decision::Approve)).unwrap();

        assert_eq!(decided["color"], 0x002E_CC71);
        let fields = decided["fields"].as_array().unwrap();
        let status = fields.iter().find(|f| f["name"] == "Status").unwrap();
        assert_eq!(status["value"], "Request approved!");
    }
}
