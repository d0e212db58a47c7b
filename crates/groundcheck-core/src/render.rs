//! Markdown rendering of a `ValidationReport` for human reviewers.

use groundcheck_contracts::finding::{Category, ValidationFinding, ValidationReport};

/// Render `report` as a Markdown document.
///
/// Sections: summary, tool usage, then one section per finding category.
/// Output depends only on the report, so it is as deterministic as `validate`.
pub fn render_markdown(report: &ValidationReport) -> String {
    let mut out = String::new();

    let verdict = if report.overall_passed { "PASS" } else { "FAIL" };
    out.push_str("# Validation Report\n\n");
    out.push_str(&format!("- **Response:** `{}`\n", report.response_id.0));
    out.push_str(&format!("- **Evaluated at:** {}\n", report.evaluated_at.to_rfc3339()));
    out.push_str(&format!("- **Verdict:** {verdict}\n"));
    out.push_str(&format!("- **Critical findings:** {}\n", report.critical_count()));
    out.push_str(&format!("- **Fresh data:** {}\n", percent(report.fresh_data_ratio)));
    out.push_str(&format!("- **Price accuracy:** {}\n", percent(report.price_accurate_ratio)));
    out.push_str(&format!("- **Hallucination indicators:** {}\n\n", report.hallucination_count));

    let usage = &report.tool_usage;
    out.push_str("## Tool Usage\n\n");
    out.push_str(&format!("- **Total calls:** {}\n", usage.total_calls));
    let tools: Vec<&str> = usage.tools_used.iter().map(|t| t.as_str()).collect();
    out.push_str(&format!(
        "- **Tools used:** {}\n",
        if tools.is_empty() { "none".to_string() } else { tools.join(", ") }
    ));
    if let Some(avg) = usage.avg_duration_ms {
        out.push_str(&format!("- **Average call duration:** {avg:.0} ms\n"));
    }
    if !usage.data_sources.is_empty() {
        out.push_str("- **Data sources:**\n");
        for source in &usage.data_sources {
            out.push_str(&format!("  - {source}\n"));
        }
    }
    out.push('\n');

    for (category, title, empty) in [
        (Category::PriceAccuracy, "Price Validation", "No price claims to validate."),
        (Category::Freshness, "Data Freshness", "No timestamped tool data."),
        (Category::Hallucination, "Hallucination Indicators", "No hallucination indicators detected."),
        (Category::ToolUsage, "Tool Usage Checks", "No tool usage checks ran."),
    ] {
        out.push_str(&format!("## {title}\n\n"));
        let findings: Vec<&ValidationFinding> = report.in_category(category).collect();
        if findings.is_empty() {
            out.push_str(empty);
            out.push_str("\n\n");
            continue;
        }
        out.push_str("| Status | Severity | Check | Subject | Detail |\n");
        out.push_str("|---|---|---|---|---|\n");
        for finding in findings {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                if finding.passed { "ok" } else { "FAIL" },
                finding.severity,
                finding.check,
                cell(&finding.subject),
                cell(&finding.message),
            ));
        }
        out.push('\n');
    }

    out
}

fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// Keep a value inside one table cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use groundcheck_contracts::{
        finding::Severity,
        tool::ToolName,
        trace::{ResponseId, ToolUsageSummary},
    };

    use super::*;

    fn report(findings: Vec<ValidationFinding>) -> ValidationReport {
        ValidationReport::from_findings(
            ResponseId::new(),
            Utc.with_ymd_and_hms(2024, 12, 18, 14, 35, 0).unwrap(),
            findings,
            ToolUsageSummary {
                total_calls: 2,
                tools_used: vec![ToolName::WebSearch, ToolName::FetchPrice],
                avg_duration_ms: Some(412.0),
                data_sources: vec!["https://www.coindesk.com/price/bitcoin".to_string()],
            },
        )
    }

    #[test]
    fn renders_summary_and_sections() {
        let md = render_markdown(&report(vec![
            ValidationFinding::pass(Category::PriceAccuracy, "price_accuracy", "BTC-USD", "within tolerance"),
            ValidationFinding::fail(
                Category::Hallucination,
                "stale_language",
                "as of my last update",
                "relies on training data",
                Severity::Critical,
            ),
        ]));

        assert!(md.contains("**Verdict:** FAIL"), "{md}");
        assert!(md.contains("**Price accuracy:** 100.0%"), "{md}");
        assert!(md.contains("web_search, fetch_price"), "{md}");
        assert!(md.contains("412 ms"), "{md}");
        assert!(md.contains("| FAIL | critical | stale_language |"), "{md}");
        assert!(md.contains("No timestamped tool data."), "{md}");
    }

    #[test]
    fn escapes_table_separators() {
        let md = render_markdown(&report(vec![ValidationFinding::fail(
            Category::Hallucination,
            "uncited_claim",
            "BTC-USD",
            "| Asset | Price |\n| BTC | $1 |",
            Severity::Warning,
        )]));
        assert!(md.contains("\\| Asset \\| Price \\| \\| BTC"), "{md}");
        assert!(md.contains("**Verdict:** PASS"), "a warning must not fail the verdict");
    }
}
