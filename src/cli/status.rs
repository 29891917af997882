//! Status command implementation

use crate::cli::output::{format_status_json, format_status_table};
use crate::cli::StatusArgs;
use crate::dispatch::ProviderHealthReport;
use crate::health::HealthTier;
use colored::Colorize;
use std::time::Duration;

/// Fetch the status report from a running server.
///
/// With `check` the server runs one probe round first (`POST /check`).
pub async fn fetch_status(
    base_url: &str,
    check: bool,
) -> Result<ProviderHealthReport, Box<dyn std::error::Error>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    let base = base_url.trim_end_matches('/');

    let response = if check {
        client.post(format!("{}/check", base)).send().await?
    } else {
        client.get(format!("{}/status", base)).send().await?
    };

    let response = response.error_for_status()?;
    Ok(response.json::<ProviderHealthReport>().await?)
}

fn summary_line(report: &ProviderHealthReport) -> String {
    let enabled = report.values().filter(|s| s.enabled).count();
    let routable = report
        .values()
        .filter(|s| s.enabled && s.tier.is_routable())
        .count();
    let unproven = report
        .values()
        .filter(|s| s.enabled && s.tier == HealthTier::Unhealthy && s.metrics.window_len == 0)
        .count();

    let headline = format!("{}/{} providers routable", routable, enabled);
    let headline = if routable == enabled && enabled > 0 {
        headline.green()
    } else if routable > 0 {
        headline.yellow()
    } else {
        headline.red()
    };

    if unproven > 0 {
        format!("{} ({} not yet observed)", headline, unproven)
    } else {
        headline.to_string()
    }
}

/// Handle status command
pub async fn handle_status(args: &StatusArgs) -> Result<String, Box<dyn std::error::Error>> {
    let report = fetch_status(&args.url, args.check).await?;
    if args.json {
        return Ok(format_status_json(&report)?);
    }
    Ok(format!("{}\n{}", summary_line(&report), format_status_table(&report)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn report_body() -> serde_json::Value {
        json!({
            "vllm-a": {
                "tier": "excellent",
                "metrics": {
                    "total_requests": 20,
                    "successful_requests": 20,
                    "failed_requests": 0,
                    "window_len": 20,
                    "average_latency_ms": 120.0,
                    "error_rate_pct": 0.0,
                    "performance_score": 0.12,
                    "last_request_time": null
                },
                "breaker": {
                    "state": "closed",
                    "failure_count": 0,
                    "failure_threshold": 5,
                    "last_failure_at": null
                },
                "enabled": true,
                "priority": 10,
                "models": ["llama3"]
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_status_parses_report() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(report_body()))
            .mount(&server)
            .await;

        let report = fetch_status(&server.uri(), false).await.unwrap();
        let status = &report["vllm-a"];
        assert_eq!(status.tier, HealthTier::Excellent);
        assert_eq!(status.metrics.window_len, 20);
        assert!(status.rate_limit_remaining.is_none());
    }

    #[tokio::test]
    async fn test_fetch_status_with_check_posts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/check"))
            .respond_with(ResponseTemplate::new(200).set_body_json(report_body()))
            .expect(1)
            .mount(&server)
            .await;

        let report = fetch_status(&format!("{}/", server.uri()), true).await.unwrap();
        assert_eq!(report.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_status_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        assert!(fetch_status(&server.uri(), false).await.is_err());
    }

    #[test]
    fn test_summary_line_counts() {
        let report: ProviderHealthReport = serde_json::from_value(report_body()).unwrap();
        assert!(summary_line(&report).contains("1/1 providers routable"));
    }
}
