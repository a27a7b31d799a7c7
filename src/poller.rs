//! Periodic Overseerr poll: fetch pending requests, drop the ones already
//! announced, enrich the rest with title metadata, and hand them to the
//! notification plugin through the normal event dispatch.

use crate::context::Shared;
use crate::event::Event;
use crate::log_internal;
use crate::overseerr::{RequestPage, RequestSummary, STATUS_PENDING};
use crate::volatile_state::DedupLedger;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

pub async fn run(shared: Arc<Shared>, discord_ctx: serenity::all::Context) {
    let interval_seconds = shared.cfg.read().await.overseerr.poll_interval_seconds;

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_seconds.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    log_internal!("Polling Overseerr every {} seconds", interval_seconds);

    loop {
        ticker.tick().await;
        if let Err(err) = poll_once(&shared, &discord_ctx).await {
            log_internal!("Overseerr poll failed: {}", err);
        }
    }
}

/// One poll cycle.  A page-level fetch failure aborts the cycle; per-request
/// failures skip just that request.  Requests stay out of the ledger until
/// they are actually rendered, so anything skipped here is retried on the
/// next cycle.
async fn poll_once(shared: &Arc<Shared>, discord_ctx: &serenity::all::Context) -> anyhow::Result<()> {
    let page = shared.overseerr.pending_requests().await?;

    let fresh: Vec<u64> = {
        let vstate = shared.vstate.read().await;
        fresh_pending(&page, &vstate.ledger)
            .into_iter()
            .map(|summary| summary.id)
            .collect()
    };

    if fresh.is_empty() {
        return Ok(());
    }

    log_internal!("Found {} new pending request(s)", fresh.len());

    for summary in page.results.iter().filter(|s| fresh.contains(&s.id)) {
        let Some(media) = &summary.media else {
            log_internal!("Request {} has no media record; skipping", summary.id);
            continue;
        };
        let (Some(tmdb_id), Some(media_type)) = (media.tmdb_id, media.media_type) else {
            log_internal!("Request {} is missing tmdb id or media type; skipping", summary.id);
            continue;
        };

        let details = match shared.overseerr.media_details(media_type, tmdb_id).await {
            Ok(details) => details,
            Err(err) => {
                log_internal!(
                    "Could not fetch metadata for request {}: {}",
                    summary.id,
                    err
                );
                continue;
            }
        };

        let request = crate::overseerr::media_request_from(summary, media_type, &details);
        Event::RequestArrived(request)
            .handle(shared.ctx(discord_ctx))
            .await;
    }

    Ok(())
}

/// Pending results that have not been announced yet.
fn fresh_pending<'a>(page: &'a RequestPage, ledger: &DedupLedger) -> Vec<&'a RequestSummary> {
    page.results
        .iter()
        .filter(|summary| summary.status == STATUS_PENDING)
        .filter(|summary| !ledger.has(&summary.id.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> RequestPage {
        serde_json::from_str(
            r#"{
                "results": [
                    { "id": 42, "status": 1 },
                    { "id": 43, "status": 1 },
                    { "id": 44, "status": 2 }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn skips_already_announced_requests() {
        let page = page();
        let mut ledger = DedupLedger::new();
        ledger.mark("42".to_string());

        let fresh: Vec<u64> = fresh_pending(&page, &ledger).iter().map(|s| s.id).collect();
        assert_eq!(fresh, vec![43]);
    }

    #[test]
    fn second_cycle_with_same_data_yields_nothing() {
        let page = page();
        let mut ledger = DedupLedger::new();

        for summary in fresh_pending(&page, &ledger) {
            ledger.mark(summary.id.to_string());
        }

        assert!(fresh_pending(&page, &ledger).is_empty());
    }

    #[test]
    fn non_pending_statuses_are_ignored() {
        let page = page();
        let ledger = DedupLedger::new();

        let fresh: Vec<u64> = fresh_pending(&page, &ledger).iter().map(|s| s.id).collect();
        assert_eq!(fresh, vec![42, 43]);
    }
}
