//! Console Output
//!
//! Result card and closing summaries, written to stdout so they show up
//! regardless of the log filter.

use std::fmt::Write as _;

use index_core::{IndexProfile, ScoreResult};

use crate::news_monitor::MonitorReport;
use crate::pipeline::RunReport;

const CARD_WIDTH: usize = 51;

fn rule() -> String {
    "═".repeat(55)
}

/// `62` for whole scores, `41.5` otherwise
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.0}")
    } else {
        format!("{score}")
    }
}

fn factor_value(value: Option<&Option<f64>>) -> String {
    value
        .copied()
        .flatten()
        .map_or_else(|| "N/A".to_string(), format_score)
}

/// Boxed verdict with reason, factor breakdown and per-token scores
pub fn result_card(profile: &IndexProfile, result: &ScoreResult) -> String {
    let mut out = String::new();
    let title = format!("   {} INDEX:  {:>3} / 100", profile.name.to_uppercase(), format_score(result.score));
    let label = format!("   Label: {}", result.label);

    let _ = writeln!(out, "\n{}", rule());
    let _ = writeln!(out, "  ┌{}┐", "─".repeat(CARD_WIDTH));
    let _ = writeln!(out, "  │{title:<CARD_WIDTH$}│");
    let _ = writeln!(out, "  │{label:<CARD_WIDTH$}│");
    let _ = writeln!(out, "  └{}┘", "─".repeat(CARD_WIDTH));
    let _ = writeln!(out, "\n  Reason: {}", result.reason);

    if !result.factors.is_empty() {
        let width = profile.factors.iter().map(|f| f.title.chars().count()).max().unwrap_or(0) + 1;
        let _ = writeln!(out, "\n  Factor Breakdown:");
        for spec in profile.factors {
            let name = format!("{}:", spec.title);
            let _ = writeln!(out, "    {name:<width$} {}", factor_value(result.factors.get(spec.key)));
        }
    }

    if let Some(tokens) = result.token_scores.as_ref().filter(|t| !t.is_empty()) {
        let _ = writeln!(out, "\n  Per-Token Scores:");
        for (symbol, token) in tokens {
            let _ = writeln!(
                out,
                "    {symbol}: {} ({}) - {}",
                format_score(token.score),
                token.label,
                token.summary
            );
        }
    }

    out.push_str(&rule());
    out
}

/// Closing lines of a scoring run
pub fn run_summary(report: &RunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule());
    let _ = writeln!(out, ">> Done!");
    let _ = writeln!(out, ">> Score: {} ({})", format_score(report.result.score), report.result.label);
    for line in &report.highlights {
        let _ = writeln!(out, ">> {line}");
    }
    let _ = writeln!(
        out,
        ">> Data: {} headlines + {} market factors",
        report.headlines.len(),
        report.factors_available
    );
    let _ = writeln!(out, ">> Saved: {}", if report.saved { "yes" } else { "no" });
    out.push_str(&rule());
    out
}

/// Closing lines of a news monitor pass
pub fn monitor_summary(report: &MonitorReport) -> String {
    let count = |value: Option<u64>| value.map_or_else(|| "unknown".to_string(), |n| n.to_string());
    let rule = "=".repeat(50);
    format!(
        "\n{rule}\n>> Done!\n>> Sent: {}/{}\n>> Skipped/failed: {}/{}\n>> News in database: {} (was {})\n{rule}",
        report.sent,
        report.total,
        report.skipped(),
        report.total,
        count(report.count_after),
        count(report.count_before)
    )
}
