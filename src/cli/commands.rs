use std::sync::Arc;

use chrono::{Local, TimeZone};

use crate::agent::agent::PageAgent;
use crate::agent::agent_model::Notice;
use crate::agent::coordinator::Coordinator;
use crate::agent::error::FormError;
use crate::browser::session::LivePage;
use crate::capture::snapshot_model::FormSnapshot;
use crate::replay::pacing::Pacing;
use crate::replay::replay::ReplayEngine;
use crate::replay::strategy::{FillMode, FillReport};
use crate::store::kv_store::JsonFileStore;
use crate::store::repository::FormRepository;
use crate::store::transfer::export_filename;
use crate::trace::logger::TraceLogger;

pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Coordinator over the JSON store file, initialised on first use.
pub fn open_coordinator(store_path: &str) -> Result<Coordinator<JsonFileStore>, FormError> {
    let repo = FormRepository::new(JsonFileStore::new(store_path));
    repo.initialize()?;
    Ok(Coordinator::new(repo))
}

fn print_notice(notice: &Notice) {
    if notice.is_error() {
        eprintln!("error: {}", notice.message);
    } else {
        println!("{}", notice.message);
    }
}

// ============================================================================
// capture subcommand
// ============================================================================

pub fn cmd_capture(store_path: &str, page_path: &str) -> CliResult<Notice> {
    let coordinator = open_coordinator(store_path)?;
    let page = LivePage::open(page_path)?;
    let agent = PageAgent::new(page, Arc::new(ReplayEngine::default()));

    let notice = coordinator.save_current_form(Some(&agent));
    print_notice(&notice);
    Ok(notice)
}

// ============================================================================
// list subcommand
// ============================================================================

pub fn cmd_list(store_path: &str) -> CliResult<()> {
    let coordinator = open_coordinator(store_path)?;
    let forms = coordinator.repository().list()?;

    if forms.is_empty() {
        println!("No saved forms yet");
        return Ok(());
    }

    println!("{} saved form(s):", forms.len());
    for form in &forms {
        println!("{}", format_form_line(form));
    }
    Ok(())
}

/// `<id>  <title>  Oct 17, 2026 05:48 AM  3 fields  <url>`
pub fn format_form_line(form: &FormSnapshot) -> String {
    let when = Local
        .timestamp_millis_opt(form.timestamp)
        .single()
        .map(|t| t.format("%b %-d, %Y %I:%M %p").to_string())
        .unwrap_or_else(|| "unknown date".to_string());

    format!(
        "  {}  {}  {}  {} fields  {}",
        form.id,
        form.title,
        when,
        form.fields.len(),
        form.url
    )
}

// ============================================================================
// fill subcommand
// ============================================================================

/// Replay a saved form into a page fixture and write the result.
pub async fn cmd_fill(
    store_path: &str,
    id: &str,
    page_path: &str,
    mode: Option<FillMode>,
    output: Option<&str>,
    pacing: Pacing,
    trace: Option<&str>,
) -> CliResult<Option<FillReport>> {
    let coordinator = open_coordinator(store_path)?;
    let page = LivePage::open(page_path)?;

    let mut engine = ReplayEngine::new(pacing);
    if let Some(path) = trace {
        engine = engine.with_tracer(TraceLogger::new(path));
    }
    let agent = PageAgent::new(page.clone(), Arc::new(engine));

    let notice = coordinator.auto_fill(id, Some(&agent), mode);
    print_notice(&notice);
    if notice.is_error() {
        return Ok(None);
    }

    let report = agent.settle().await.into_iter().next();
    if let Some(report) = &report {
        println!(
            "{}: {} filled, {} not found, {} failed, {} skipped",
            report.mode.display_name(),
            report.filled(),
            report.not_found(),
            report.failed(),
            report.skipped()
        );
    }

    page.save(output.unwrap_or(page_path))?;
    Ok(report)
}

// ============================================================================
// delete / reset / mode subcommands
// ============================================================================

pub fn cmd_delete(store_path: &str, id: &str) -> CliResult<Notice> {
    let notice = open_coordinator(store_path)?.delete(id);
    print_notice(&notice);
    Ok(notice)
}

pub fn cmd_reset(store_path: &str) -> CliResult<()> {
    open_coordinator(store_path)?.repository().reset()?;
    println!("All saved forms deleted");
    Ok(())
}

pub fn cmd_mode(store_path: &str, mode: Option<FillMode>) -> CliResult<FillMode> {
    let coordinator = open_coordinator(store_path)?;
    match mode {
        Some(m) => {
            print_notice(&coordinator.set_fill_mode(m));
            Ok(m)
        }
        None => {
            let current = coordinator.repository().fill_mode()?;
            println!("{}", current);
            Ok(current)
        }
    }
}

// ============================================================================
// export / import subcommands
// ============================================================================

pub fn cmd_export(store_path: &str, output: Option<&str>) -> CliResult<Option<String>> {
    let coordinator = open_coordinator(store_path)?;
    let (json, notice) = coordinator.export();

    let Some(json) = json else {
        print_notice(&notice);
        return Ok(None);
    };

    let path = output
        .map(str::to_string)
        .unwrap_or_else(|| export_filename(chrono::Utc::now()));
    std::fs::write(&path, json).map_err(|e| FormError::io(&path, e))?;

    print_notice(&notice);
    println!("Wrote {}", path);
    Ok(Some(path))
}

pub fn cmd_import(store_path: &str, file: &str) -> CliResult<usize> {
    let coordinator = open_coordinator(store_path)?;
    let text = std::fs::read_to_string(file).map_err(|e| FormError::io(file, e))?;

    let (outcome, notice) = coordinator.import(&text);
    print_notice(&notice);
    Ok(outcome.added.len())
}
