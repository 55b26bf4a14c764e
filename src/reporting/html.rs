//! # HTML Reporting Module / HTML 报告模块
//!
//! This module renders a self-contained HTML report: summary counts, one row
//! per test case, and the issues of each case with their screenshot and
//! rewritten page artifact.
//!
//! 此模块渲染一个自包含的 HTML 报告：汇总计数、每个测试用例一行，
//! 以及每个用例的问题及其截图和重写后的页面产物。

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::core::models::{AuditResult, RunOutcome};
use crate::infra::{fs as cvd_fs, t};

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = include_str!("assets/report.css");

/// Generates the HTML report for `outcome` and writes it to `output_path`.
///
/// # Arguments / 参数
/// * `outcome` - Results of the completed test cases
///               已完成测试用例的结果
/// * `target` - The page that was tested
///              被测试的页面
/// * `output_path` - The file path where the HTML report will be saved
///                   保存 HTML 报告的文件路径
pub fn generate_html_report(outcome: &RunOutcome, target: &str, output_path: &Path) -> Result<()> {
    let html = render_html_report(outcome, target);
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(output_path, html)
        .with_context(|| format!("Failed to write HTML report: {}", output_path.display()))?;
    Ok(())
}

/// Builds the report markup.
pub fn render_html_report(outcome: &RunOutcome, target: &str) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        "<!DOCTYPE html><html><head><meta charset='utf-8'><title>{}</title>",
        escape_html(&t!("html_report.title"))
    ));
    html.push_str("<style>");
    html.push_str(HTML_STYLE);
    html.push_str("</style>");
    html.push_str("</head><body>");
    html.push_str(&format!("<h1>{}</h1>", escape_html(&t!("html_report.main_header"))));
    html.push_str(&format!(
        "<p class='target'>{} <code>{}</code></p>",
        escape_html(&t!("html_report.target")),
        escape_html(target)
    ));

    let total = outcome.results.len();
    let with_issues = outcome.results.iter().filter(|r| r.has_issues()).count();
    html.push_str("<div class='summary'>");
    html.push_str(&summary_card("total", &t!("html_report.summary.total"), total));
    html.push_str(&summary_card("clean", &t!("html_report.summary.clean"), total - with_issues));
    html.push_str(&summary_card("issues", &t!("html_report.summary.with_issues"), with_issues));
    html.push_str(&summary_card(
        "issue-count",
        &t!("html_report.summary.issue_count"),
        outcome.total_issues(),
    ));
    html.push_str("</div>");

    html.push_str("<table><thead><tr>");
    for key in [
        "html_report.table.header.name",
        "html_report.table.header.mode",
        "html_report.table.header.deficiency",
        "html_report.table.header.issues",
        "html_report.table.header.duration",
        "html_report.table.header.screenshot",
    ] {
        html.push_str(&format!("<th>{}</th>", escape_html(&t!(key))));
    }
    html.push_str("</tr></thead><tbody>");

    for result in &outcome.results {
        html.push_str(&result_row(result));
    }

    html.push_str("</tbody></table>");
    html.push_str("</body></html>");
    html
}

fn summary_card(class: &str, label: &str, value: usize) -> String {
    format!(
        "<div class='card {}'><span class='value'>{}</span><span class='label'>{}</span></div>",
        class,
        value,
        escape_html(label)
    )
}

fn result_row(result: &AuditResult) -> String {
    let status_class = if result.has_issues() { "issues" } else { "clean" };
    let deficiency = result
        .case
        .deficiency
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    let screenshot_url = cvd_fs::file_url(&result.screenshot);

    let mut row = format!("<tr class='{}'>", status_class);
    row.push_str(&format!("<td>{}</td>", escape_html(result.case_name())));
    row.push_str(&format!("<td>{}</td>", result.case.display_mode));
    row.push_str(&format!("<td>{}</td>", escape_html(&deficiency)));
    row.push_str(&format!("<td class='issues-cell'>{}</td>", result.issues.len()));
    row.push_str(&format!("<td>{:.2?}</td>", result.duration));
    row.push_str(&format!(
        "<td><a href='{}'>{}</a></td>",
        escape_html(&screenshot_url),
        escape_html(&t!("html_report.open"))
    ));
    row.push_str("</tr>");

    if result.has_issues() || result.artifact.is_some() {
        row.push_str("<tr class='details'><td colspan='6'><details>");
        row.push_str(&format!(
            "<summary>{}</summary>",
            escape_html(&t!("html_report.toggle_issues", count = result.issues.len()))
        ));
        if let Some(artifact) = &result.artifact {
            row.push_str(&format!(
                "<p class='artifact'>{} <a href='{}'>{}</a></p>",
                escape_html(&t!("html_report.artifact")),
                escape_html(&cvd_fs::file_url(artifact)),
                escape_html(&artifact.display().to_string())
            ));
        }
        for issue in &result.issues {
            row.push_str("<div class='issue'>");
            row.push_str(&format!("<div class='code'>{}</div>", escape_html(&issue.code)));
            row.push_str(&format!("<div class='message'>{}</div>", escape_html(&issue.message)));
            row.push_str(&format!("<pre class='context'>{}</pre>", escape_html(&issue.context)));
            row.push_str(&format!("<div class='selector'>{}</div>", escape_html(&issue.selector)));
            row.push_str("</div>");
        }
        row.push_str("</details></td></tr>");
    }

    row
}

/// Simple HTML escape function to replace special characters with their HTML entities
/// 简单的 HTML 转义函数，用 HTML 实体替换特殊字符
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
