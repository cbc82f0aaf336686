use crate::{
    browser::session::LivePage,
    capture::{capture::capture, snapshot_model::FormSnapshot},
    replay::{
        replay::{ReplayEngine, ReplayRequest},
        strategy::{FillMode, FillReport},
    },
};

pub mod agent;
pub mod browser;
pub mod capture;
pub mod cli;
pub mod dom;
pub mod replay;
pub mod store;
pub mod trace;

/// Capture the current form state of a live page.
pub fn capture_page(page: &LivePage) -> FormSnapshot {
    page.read(capture)
}

/// Replay a snapshot into a page with the default engine, waiting for the
/// strategy to finish.
pub async fn replay_snapshot(snapshot: FormSnapshot, mode: FillMode, page: &LivePage) -> FillReport {
    ReplayEngine::default()
        .replay(&ReplayRequest::new(snapshot, mode), page)
        .await
}
