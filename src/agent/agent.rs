use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use crate::agent::agent_model::{AgentRequest, AgentResponse};
use crate::browser::session::LivePage;
use crate::capture::capture::capture;
use crate::replay::replay::ReplayEngine;
use crate::replay::strategy::FillReport;

/// The page-embedded endpoint: answers capture and fill requests for one page.
///
/// Fill requests are acknowledged immediately; the replay keeps running in
/// the background. `settle` waits for those replays.
pub struct PageAgent {
    page: LivePage,
    engine: Arc<ReplayEngine>,
    pending: Mutex<Vec<JoinHandle<FillReport>>>,
}

impl PageAgent {
    pub fn new(page: LivePage, engine: Arc<ReplayEngine>) -> Self {
        PageAgent {
            page,
            engine,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn page(&self) -> &LivePage {
        &self.page
    }

    pub fn url(&self) -> String {
        self.page.url()
    }

    pub fn handle(&self, request: AgentRequest) -> AgentResponse {
        match request {
            AgentRequest::CaptureForm => {
                let snapshot = self.page.read(capture);
                AgentResponse::captured(snapshot)
            }
            AgentRequest::FillForm { data } => {
                let page = self.page.clone();
                let engine = Arc::clone(&self.engine);
                let handle = tokio::spawn(async move { engine.replay(&data, &page).await });
                let mut pending = self.pending.lock().unwrap_or_else(|p| p.into_inner());
                // finished replays nobody settled are only kept until the next fill
                pending.retain(|h| !h.is_finished());
                pending.push(handle);
                AgentResponse::ok()
            }
        }
    }

    /// Handle one raw JSON message and produce the JSON reply.
    pub fn handle_json(&self, message: &str) -> String {
        let response = match serde_json::from_str::<AgentRequest>(message) {
            Ok(request) => self.handle(request),
            Err(e) => {
                tracing::warn!(error = %e, "rejecting malformed agent request");
                AgentResponse::failed(format!("malformed request: {}", e))
            }
        };
        serde_json::to_string(&response).unwrap_or_else(|e| {
            format!(r#"{{"success":false,"error":"{}"}}"#, e.to_string().replace('"', "'"))
        })
    }

    /// Wait for every replay started so far.
    pub async fn settle(&self) -> Vec<FillReport> {
        let handles: Vec<_> = std::mem::take(
            &mut *self.pending.lock().unwrap_or_else(|p| p.into_inner()),
        );

        let mut reports = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => tracing::warn!(error = %e, "replay task ended abnormally"),
            }
        }
        reports
    }
}
