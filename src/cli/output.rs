//! Output formatting helpers for CLI commands

use crate::dispatch::{ProviderHealthReport, ProviderStatus};
use crate::health::HealthTier;
use crate::registry::ProviderView;
use crate::resilience::CircuitState;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

/// Format the provider catalog as a table
pub fn format_providers_table(providers: &[ProviderView]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Name", "URL", "Type", "Priority", "Models", "Enabled", "Limits",
    ]);

    for p in providers {
        let enabled = if p.enabled {
            "yes".green().to_string()
        } else {
            "no".dimmed().to_string()
        };

        table.add_row(vec![
            Cell::new(&p.name),
            Cell::new(&p.url),
            Cell::new(p.provider_type),
            Cell::new(p.priority),
            Cell::new(p.models.join(", ")),
            Cell::new(enabled),
            Cell::new(limits_summary(p)),
        ]);
    }

    table.to_string()
}

fn limits_summary(p: &ProviderView) -> String {
    let mut parts = vec![format!("timeout {}s", p.timeout_seconds)];
    if let Some(rpm) = p.rate_limit_rpm {
        parts.push(format!("{} rpm", rpm));
    }
    if let Some(retries) = p.max_retries {
        parts.push(format!("{} attempts", retries));
    }
    if let Some(delay) = p.retry_delay_ms {
        parts.push(format!("base {}ms", delay));
    }
    parts.join(", ")
}

/// Format the provider catalog as JSON
pub fn format_providers_json(providers: &[ProviderView]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({ "providers": providers }))
}

/// Format a live status report as a table
pub fn format_status_table(report: &ProviderHealthReport) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Provider", "Tier", "Circuit", "Samples", "Latency", "Errors", "Score",
    ]);

    for (name, status) in report {
        table.add_row(status_row(name, status));
    }

    table.to_string()
}

fn status_row(name: &str, status: &ProviderStatus) -> Vec<Cell> {
    let name = if status.enabled {
        name.to_string()
    } else {
        format!("{} (disabled)", name).dimmed().to_string()
    };
    let circuit = match status.breaker.state {
        CircuitState::Closed => "closed".green().to_string(),
        CircuitState::HalfOpen => "half-open".yellow().to_string(),
        CircuitState::Open => format!(
            "open ({}/{})",
            status.breaker.failure_count, status.breaker.failure_threshold
        )
        .red()
        .to_string(),
    };

    vec![
        Cell::new(name),
        Cell::new(tier_display(status.tier)),
        Cell::new(circuit),
        Cell::new(status.metrics.window_len),
        Cell::new(format!("{:.0}ms", status.metrics.average_latency_ms)),
        Cell::new(format!("{:.1}%", status.metrics.error_rate_pct)),
        Cell::new(format!("{:.2}", status.metrics.performance_score)),
    ]
}

/// Colored label for a health tier
pub fn tier_display(tier: HealthTier) -> String {
    let label = tier.to_string();
    match tier {
        HealthTier::Excellent | HealthTier::Good => label.green().to_string(),
        HealthTier::Fair => label.yellow().to_string(),
        HealthTier::Poor | HealthTier::Unhealthy => label.red().to_string(),
    }
}

/// Format a live status report as JSON
pub fn format_status_json(report: &ProviderHealthReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({ "providers": report }))
}
