mod common;

use std::sync::Arc;

use common::{checked, page_from, pages, value_of};
use form_replay::agent::agent::PageAgent;
use form_replay::agent::agent_model::{AgentRequest, AgentResponse, NoticeKind};
use form_replay::agent::coordinator::{Coordinator, is_restricted_url};
use form_replay::browser::session::LivePage;
use form_replay::capture::snapshot_model::FormSnapshot;
use form_replay::replay::pacing::Pacing;
use form_replay::replay::replay::ReplayEngine;
use form_replay::replay::strategy::FillMode;
use form_replay::store::kv_store::MemoryStore;
use form_replay::store::repository::FormRepository;
use serde_json::{Value, json};

fn agent_for(page: LivePage) -> PageAgent {
    PageAgent::new(page, Arc::new(ReplayEngine::new(Pacing::immediate())))
}

fn coordinator() -> Coordinator<MemoryStore> {
    let repo = FormRepository::new(MemoryStore::new());
    repo.initialize().unwrap();
    Coordinator::new(repo)
}

fn saved_id(coordinator: &Coordinator<MemoryStore>) -> String {
    coordinator.repository().get().unwrap()[0].id.clone()
}

// ============================================================================
// Page agent message channel
// ============================================================================

#[tokio::test]
async fn capture_request_returns_snapshot() {
    let agent = agent_for(page_from(pages::agree_and_email()));

    let reply: Value = serde_json::from_str(&agent.handle_json(r#"{"action":"captureForm"}"#)).unwrap();

    assert_eq!(reply["success"], true);
    assert_eq!(reply["data"]["url"], "https://example.com/newsletter");
    assert_eq!(reply["data"]["fields"].as_array().unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn fill_request_is_acknowledged_before_replay_finishes() {
    let page = page_from(pages::blank_signup());
    let agent = agent_for(page.clone());
    let snapshot = form_replay::capture_page(&page_from(pages::filled_signup()));

    let mut message = serde_json::to_value(&snapshot).unwrap();
    message["fillMode"] = json!("human");
    let request = json!({ "action": "fillForm", "data": message }).to_string();

    let reply: AgentResponse = serde_json::from_str(&agent.handle_json(&request)).unwrap();
    assert_eq!(reply, AgentResponse::ok());
    assert_eq!(value_of(&page, "email"), "");

    let reports = agent.settle().await;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].mode, FillMode::Human);
    assert_eq!(value_of(&page, "email"), "a@b.com");
    assert!(checked(&page, "plan-pro"));
}

#[tokio::test]
async fn malformed_requests_get_failure_replies() {
    let agent = agent_for(page_from(pages::email_target()));

    for message in [
        "not json",
        r#"{"action":"explode"}"#,
        r#"{"action":"fillForm"}"#,
        r#"{"action":"fillForm","data":{"url":"u","title":"t","timestamp":1,"fields":[],"fillMode":"turbo"}}"#,
    ] {
        let reply: AgentResponse = serde_json::from_str(&agent.handle_json(message)).unwrap();
        assert!(!reply.success, "accepted {}", message);
        assert!(reply.error.unwrap().starts_with("malformed request"));
    }
    assert!(agent.settle().await.is_empty());
}

#[test]
fn request_wire_format() {
    let request: AgentRequest = serde_json::from_value(json!({ "action": "captureForm" })).unwrap();
    assert_eq!(request, AgentRequest::CaptureForm);

    let reply = serde_json::to_value(AgentResponse::failed("boom")).unwrap();
    assert_eq!(reply, json!({ "success": false, "error": "boom" }));
}

// ============================================================================
// Coordinator: save
// ============================================================================

#[tokio::test]
async fn save_stores_snapshot_with_fresh_id() {
    let coordinator = coordinator();
    let agent = agent_for(page_from(pages::filled_signup()));

    let notice = coordinator.save_current_form(Some(&agent));

    assert_eq!(notice.kind, NoticeKind::Success);
    assert_eq!(notice.message, "Form saved! (8 fields captured)");
    let forms = coordinator.repository().get().unwrap();
    assert_eq!(forms.len(), 1);
    assert!(forms[0].id.starts_with("form_"));
    assert_eq!(forms[0].title, "Sign up");
}

#[tokio::test]
async fn save_refuses_page_without_fillable_fields() {
    let coordinator = coordinator();
    let agent = agent_for(page_from(pages::blank_signup()));

    let notice = coordinator.save_current_form(Some(&agent));

    assert!(notice.is_error());
    assert_eq!(notice.message, "No form fields found on this page");
    assert!(coordinator.repository().get().unwrap().is_empty());
}

#[tokio::test]
async fn save_refuses_restricted_pages() {
    let coordinator = coordinator();
    let agent = agent_for(page_from(json!({
        "url": "chrome://settings",
        "body": [{ "tag": "input", "id": "q", "value": "x" }]
    })));

    let notice = coordinator.save_current_form(Some(&agent));

    assert!(notice.is_error());
    assert_eq!(notice.message, "Cannot access this page: chrome://settings");
    assert!(coordinator.repository().get().unwrap().is_empty());
}

#[test]
fn save_without_tab_is_an_error_notice() {
    let notice = coordinator().save_current_form(None);
    assert!(notice.is_error());
    assert_eq!(notice.message, "No active tab found");
}

#[test]
fn restricted_schemes() {
    assert!(is_restricted_url("chrome://extensions"));
    assert!(is_restricted_url("edge://settings"));
    assert!(is_restricted_url("about:blank"));
    assert!(!is_restricted_url("https://example.com/about:blank"));
}

// ============================================================================
// Coordinator: auto-fill
// ============================================================================

#[tokio::test(start_paused = true)]
async fn auto_fill_uses_stored_mode_on_another_page() {
    let coordinator = coordinator();
    coordinator.save_current_form(Some(&agent_for(page_from(pages::filled_signup()))));
    coordinator.set_fill_mode(FillMode::Slow);
    let id = saved_id(&coordinator);

    let target = page_from(pages::blank_signup());
    let agent = agent_for(target.clone());
    let notice = coordinator.auto_fill(&id, Some(&agent), None);

    assert_eq!(notice.message, "Auto-fill started!");
    let reports = agent.settle().await;
    assert_eq!(reports[0].mode, FillMode::Slow);
    assert_eq!(reports[0].filled(), 8);
    assert_eq!(value_of(&target, "bio"), "Hello there");
}

#[tokio::test(start_paused = true)]
async fn auto_fill_mode_override_wins() {
    let coordinator = coordinator();
    coordinator.save_current_form(Some(&agent_for(page_from(pages::filled_signup()))));
    let id = saved_id(&coordinator);

    let agent = agent_for(page_from(pages::blank_signup()));
    coordinator.auto_fill(&id, Some(&agent), Some(FillMode::Silent));

    let reports = agent.settle().await;
    assert_eq!(reports[0].mode, FillMode::Silent);
    assert_eq!(agent.page().read(|doc| doc.events().len()), 0);
}

#[tokio::test]
async fn auto_fill_unknown_id_is_an_error_notice() {
    let coordinator = coordinator();
    let agent = agent_for(page_from(pages::blank_signup()));

    let notice = coordinator.auto_fill("form_0_missing", Some(&agent), None);

    assert!(notice.is_error());
    assert_eq!(notice.message, "Form not found: form_0_missing");
    assert!(agent.settle().await.is_empty());
}

#[tokio::test]
async fn auto_fill_on_restricted_page_is_refused() {
    let coordinator = coordinator();
    coordinator.save_current_form(Some(&agent_for(page_from(pages::filled_signup()))));
    let id = saved_id(&coordinator);

    let agent = agent_for(page_from(json!({ "url": "about:blank", "body": [] })));
    let notice = coordinator.auto_fill(&id, Some(&agent), None);

    assert!(notice.is_error());
    assert!(agent.settle().await.is_empty());
}

// ============================================================================
// Coordinator: delete, export, import
// ============================================================================

#[tokio::test]
async fn delete_reports_outcome() {
    let coordinator = coordinator();
    coordinator.save_current_form(Some(&agent_for(page_from(pages::filled_signup()))));
    let id = saved_id(&coordinator);

    assert_eq!(coordinator.delete(&id).message, "Form deleted");
    assert!(coordinator.repository().get().unwrap().is_empty());
    assert!(coordinator.delete(&id).is_error());
}

#[test]
fn export_of_empty_collection_is_refused() {
    let (json, notice) = coordinator().export();
    assert!(json.is_none());
    assert_eq!(notice.message, "No forms to export");
}

#[tokio::test]
async fn export_then_import_elsewhere_round_trips() {
    let source = coordinator();
    source.save_current_form(Some(&agent_for(page_from(pages::filled_signup()))));
    source.save_current_form(Some(&agent_for(page_from(pages::agree_and_email()))));

    let (json, notice) = source.export();
    let json = json.unwrap();
    assert_eq!(notice.message, "Exported 2 form(s)");

    let target = coordinator();
    let (outcome, notice) = target.import(&json);
    assert_eq!(notice.message, "Imported 2 new form(s)");
    assert_eq!(outcome.added.len(), 2);

    let (again, notice) = target.import(&json);
    assert!(again.added.is_empty());
    assert_eq!(notice.message, "Imported 0 new form(s)");

    let stored: Vec<FormSnapshot> = target.repository().get().unwrap();
    assert_eq!(stored, source.repository().get().unwrap());
}

#[test]
fn import_of_file_without_valid_forms_is_refused() {
    let coordinator = coordinator();

    let (outcome, notice) = coordinator.import(r#"[{"id":"a","url":"u","title":"t","timestamp":1}]"#);
    assert_eq!(outcome.valid, 0);
    assert_eq!(notice.message, "No valid forms found in file");

    let (_, notice) = coordinator.import(r#"{"id":"a"}"#);
    assert!(notice.is_error());
    assert!(notice.message.starts_with("Invalid file format"));
    assert!(coordinator.repository().get().unwrap().is_empty());
}

#[test]
fn set_fill_mode_persists_preference() {
    let coordinator = coordinator();
    let notice = coordinator.set_fill_mode(FillMode::Paste);

    assert_eq!(notice.message, "Fill mode set to paste");
    assert_eq!(coordinator.repository().fill_mode().unwrap(), FillMode::Paste);
}

#[tokio::test(start_paused = true)]
async fn finished_replays_are_pruned_when_a_new_fill_starts() {
    let agent = agent_for(page_from(pages::blank_signup()));
    let snapshot = form_replay::capture_page(&page_from(pages::filled_signup()));
    let fill = || {
        let data = form_replay::replay::replay::ReplayRequest::new(snapshot.clone(), FillMode::Instant);
        agent.handle(AgentRequest::FillForm { data })
    };

    assert!(fill().success);
    tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    assert!(fill().success);

    let reports = agent.settle().await;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].filled(), 8);
}
