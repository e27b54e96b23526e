use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use queue_core::{FrameReply, QueryDecision, QuerySet, Resolution, TOP_FRAME_ID};
use queue_logging::{queue_debug, queue_trace};
use tokio::time::timeout;

use crate::host::BrowserHost;

/// Queries every frame of the active tab for its hovered link.
///
/// All frames are asked at once, each under its own `frame_timeout`. The
/// first frame in enumeration order with a non-empty answer wins; pending
/// queries are dropped as soon as that answer is certain. Without any link
/// the active tab's URL is used.
pub async fn resolve_hovered_link(host: &dyn BrowserHost, frame_timeout: Duration) -> Resolution {
    let Some(tab) = host.active_tab().await else {
        queue_debug!("No active tab to resolve a hovered link in");
        return Resolution::NoCandidate { tab_id: None };
    };
    let frame_ids = host
        .frame_ids(tab.id)
        .await
        .filter(|ids| !ids.is_empty())
        .unwrap_or_else(|| vec![TOP_FRAME_ID]);

    let mut queries = QuerySet::new(frame_ids);
    let tab_id = tab.id;
    let mut pending: FuturesUnordered<_> = queries
        .frame_ids()
        .map(|frame_id| async move {
            let reply = timeout(frame_timeout, host.query_hovered_link(tab_id, frame_id)).await;
            (frame_id, reply)
        })
        .collect();

    let mut cursor = None;
    while let Some((frame_id, reply)) = pending.next().await {
        let reply = match reply {
            Ok(Ok(reply)) => {
                if frame_id == TOP_FRAME_ID {
                    cursor = reply.cursor;
                }
                FrameReply::Answered(reply.href)
            }
            Ok(Err(err)) => {
                queue_debug!("Frame {frame_id} unreachable: {err}");
                FrameReply::Unreachable
            }
            Err(_) => {
                queue_debug!("Frame {frame_id} timed out after {frame_timeout:?}");
                FrameReply::TimedOut
            }
        };
        queries.record(frame_id, reply);
        if queries.decision() != QueryDecision::Pending {
            break;
        }
    }
    drop(pending);

    match queries.candidate(&tab.url) {
        Some(candidate) => {
            queue_trace!("Resolved {:?} candidate {}", candidate.source, candidate.href);
            Resolution::Found {
                candidate,
                tab_id: Some(tab_id),
                cursor,
            }
        }
        None => Resolution::NoCandidate {
            tab_id: Some(tab_id),
        },
    }
}
