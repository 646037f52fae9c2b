//! Command handlers for recapctl.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use recap_common::ui::{self, colors, symbols};
use recap_common::{
    PipelineConfig, PipelineInput, PipelineReport, RecapError, RunErrorKind, RunStatus,
};

const KEY_WIDTH: usize = 15;
const BAR_WIDTH: usize = 20;

/// Handle `recapctl run`
pub fn run(
    input_path: &Path,
    config_path: Option<&Path>,
    now: Option<&str>,
    json: bool,
    output: Option<&Path>,
) -> Result<()> {
    let report = execute(input_path, config_path, now)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if let Some(path) = output {
        let schedule = serde_json::to_string_pretty(&report.updated_srs_schedule)?;
        fs::write(path, schedule)
            .with_context(|| format!("writing schedule to {}", path.display()))?;
    }

    fail_if_failed(&report)
}

/// Handle `recapctl due`
pub fn due(input_path: &Path, config_path: Option<&Path>, now: Option<&str>) -> Result<()> {
    let report = execute(input_path, config_path, now)?;
    ui::print_header("recapctl", env!("CARGO_PKG_VERSION"));
    print_due_block(&report);
    ui::print_footer();
    fail_if_failed(&report)
}

/// Handle `recapctl path`
pub fn path(input_path: &Path, config_path: Option<&Path>, now: Option<&str>) -> Result<()> {
    let report = execute(input_path, config_path, now)?;
    ui::print_header("recapctl", env!("CARGO_PKG_VERSION"));
    print_path_block(&report);
    ui::print_footer();
    fail_if_failed(&report)
}

/// Handle `recapctl report`
pub fn report(input_path: &Path, config_path: Option<&Path>, now: Option<&str>) -> Result<()> {
    let report = execute(input_path, config_path, now)?;
    ui::print_header("recapctl", env!("CARGO_PKG_VERSION"));
    print_summary_block(&report);
    ui::print_footer();
    fail_if_failed(&report)
}

fn execute(
    input_path: &Path,
    config_path: Option<&Path>,
    now: Option<&str>,
) -> Result<PipelineReport> {
    let input = load_snapshot(input_path)
        .with_context(|| format!("loading snapshot {}", input_path.display()))?;
    let config = load_config(config_path)?;
    let now_ms = resolve_now(now)?;
    Ok(recap_engine::run_with_config(&input, now_ms, &config))
}

pub(crate) fn load_snapshot(path: &Path) -> Result<PipelineInput, RecapError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub(crate) fn load_config(path: Option<&Path>) -> Result<PipelineConfig, RecapError> {
    match path {
        None => Ok(PipelineConfig::default()),
        Some(path) => {
            let raw = fs::read_to_string(path)?;
            PipelineConfig::from_toml_str(&raw)
        }
    }
}

/// Resolve the injected clock: epoch ms, RFC 3339, or the wall clock.
pub(crate) fn resolve_now(raw: Option<&str>) -> Result<i64, RecapError> {
    match raw {
        None => Ok(Utc::now().timestamp_millis()),
        Some(value) => {
            if let Ok(ms) = value.parse::<i64>() {
                return Ok(ms);
            }
            DateTime::parse_from_rfc3339(value)
                .map(|dt| dt.timestamp_millis())
                .map_err(|_| RecapError::BadTimestamp(value.to_string()))
        }
    }
}

/// A failed report becomes a process-level error with the right exit code.
fn fail_if_failed(report: &PipelineReport) -> Result<()> {
    let Some(run_err) = &report.error else {
        return Ok(());
    };
    let err = match run_err.kind {
        RunErrorKind::StageComputation => RecapError::StageComputation {
            stage: run_err.stage.clone().unwrap_or_default(),
            message: run_err.message.clone(),
        },
        RunErrorKind::InvalidInput => RecapError::InvalidInput(run_err.message.clone()),
    };
    Err(err.into())
}

fn print_report(report: &PipelineReport) {
    ui::print_header("recapctl", env!("CARGO_PKG_VERSION"));
    print_summary_block(report);
    print_mastery_block(report);
    print_gaps_block(report);
    print_path_block(report);
    print_due_block(report);
    print_next_block(report);
    ui::print_footer();
}

fn print_summary_block(report: &PipelineReport) {
    let status_color = match report.status {
        RunStatus::Completed => colors::OK,
        RunStatus::Failed => colors::ERR,
        RunStatus::Pending => colors::WARN,
    };
    ui::print_kv_status("status", &report.status.to_string(), status_color, KEY_WIDTH);

    let score = report.summary.readiness_score;
    println!(
        "{:width$} {} {}{:>3}/100{}",
        "readiness",
        ui::progress_bar(score as f32 / 100.0, BAR_WIDTH),
        ui::score_color(score),
        score,
        colors::RESET,
        width = KEY_WIDTH
    );
    ui::print_kv(
        "topics",
        &format!(
            "{} strong / {} weak / {} gaps",
            report.summary.strength_count,
            report.summary.weakness_count,
            report.summary.gap_count
        ),
        KEY_WIDTH,
    );
    ui::print_kv(
        "reviews_due",
        &report.summary.review_due.to_string(),
        KEY_WIDTH,
    );
    if report.summary.avg_time_spent_ms > 0 {
        ui::print_kv(
            "avg_answer",
            &format!("{}s", report.summary.avg_time_spent_ms / 1000),
            KEY_WIDTH,
        );
    }
    if let Some(err) = &report.error {
        ui::print_kv_status("error", &err.message, colors::ERR, KEY_WIDTH);
    }
    println!();
}

fn print_mastery_block(report: &PipelineReport) {
    if report.mastery.is_empty() {
        return;
    }
    ui::print_section("mastery", "confidence-weighted score per topic");
    for (tag, score) in &report.mastery {
        println!(
            "  {:18} {} {}{:>3}{}",
            tag,
            ui::progress_bar(*score as f32 / 100.0, BAR_WIDTH),
            ui::score_color(*score),
            score,
            colors::RESET
        );
    }
    println!();
}

fn print_gaps_block(report: &PipelineReport) {
    if report.knowledge_gaps.is_empty() {
        return;
    }
    ui::print_section("gaps", "weak topics ranked by severity");
    for gap in &report.knowledge_gaps {
        println!(
            "  {}{:8}{} {:18} {:2} errors  {}{}{}",
            colors::ERR,
            gap.severity.to_string(),
            colors::RESET,
            gap.topic,
            gap.error_count,
            colors::DIM,
            gap.recommendation,
            colors::RESET
        );
    }
    println!();
}

fn print_path_block(report: &PipelineReport) {
    if report.recommended_path.is_empty() {
        ui::print_section("path", "no learning path yet - answer more questions");
        println!();
        return;
    }
    ui::print_section("path", "recommended learning phases");
    for phase in &report.recommended_path {
        println!(
            "  {}{}. {}{} ({}, {})",
            colors::BOLD,
            phase.phase_number,
            phase.name,
            colors::RESET,
            phase.difficulty,
            phase.estimated_time
        );
        println!(
            "     {}{}{}",
            colors::DIM,
            phase.focus_topics.join(", "),
            colors::RESET
        );
    }
    println!();
}

fn print_due_block(report: &PipelineReport) {
    if report.due_for_review.is_empty() {
        ui::print_section("reviews", "nothing due");
        println!();
        return;
    }
    ui::print_section("reviews", "most overdue first");
    for item in &report.due_for_review {
        let age = if item.overdue_days == 0 {
            "due now".to_string()
        } else {
            format!("{}d overdue", item.overdue_days)
        };
        println!(
            "  {} {:20} {}{}{}",
            symbols::ARROW,
            item.question_id,
            colors::WARN,
            age,
            colors::RESET
        );
    }
    println!();
}

fn print_next_block(report: &PipelineReport) {
    if report.next_question_criteria.is_empty() {
        return;
    }
    ui::print_section("next", "practice criteria for the question bank");
    for criteria in &report.next_question_criteria {
        let source = match criteria.source {
            recap_common::CriteriaSource::Phase => "phase",
            recap_common::CriteriaSource::Gap => "gap",
        };
        println!(
            "  {}{:6}{} {} x{} ({}{})",
            colors::CYAN,
            source,
            colors::RESET,
            criteria.tags.join(", "),
            criteria.count,
            criteria.difficulty,
            if criteria.exclude_already_answered {
                ", unseen only"
            } else {
                ""
            }
        );
    }
    println!();
}
