//! # Console Reporting Module / 控制台报告模块
//!
//! Prints the issues found by each test case, a per-case summary table and the
//! details of an aborted run.
//!
//! 打印每个测试用例发现的问题、每个用例的摘要表格以及中止运行的详细信息。

use colored::*;

use crate::core::models::{AuditResult, Issue, RunOutcome};
use crate::core::orchestrator::MatrixAbort;
use crate::infra::t;

/// Longest context excerpt printed on an issue line, in characters.
const CONTEXT_EXCERPT_LEN: usize = 80;

/// Renders one issue as a single line:
///
/// ```text
/// Light Mode (protanopia) > WCAG2AAA.Principle1.Guideline1_4.1_4_6.G17.Fail: This element has insufficient contrast ... | <p class="muted">...</p> | html > body > p
/// ```
///
/// Whitespace runs in the context are collapsed and long contexts are cut to an excerpt.
///
/// 将单个问题渲染为一行。上下文中的连续空白会被合并，过长的上下文会被截断为摘录。
pub fn format_issue(case_name: &str, issue: &Issue) -> String {
    format!(
        "{} > {}: {} | {} | {}",
        case_name.blue().bold(),
        issue.code.red().bold(),
        issue.message,
        context_excerpt(&issue.context).bright_black().italic(),
        issue.selector.bright_black(),
    )
}

fn context_excerpt(context: &str) -> String {
    let collapsed = context.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= CONTEXT_EXCERPT_LEN {
        return collapsed;
    }
    let mut excerpt: String = collapsed.chars().take(CONTEXT_EXCERPT_LEN).collect();
    excerpt.push_str("...");
    excerpt
}

/// Writes every issue of every result to stderr, in matrix order.
/// Results without issues print nothing.
///
/// 按矩阵顺序将每个结果的每个问题写入 stderr。没有问题的结果不打印任何内容。
pub fn print_issues(results: &[AuditResult]) {
    for result in results.iter().filter(|r| r.has_issues()) {
        for issue in &result.issues {
            eprintln!("{}", format_issue(result.case_name(), issue));
        }
    }
}

/// Prints a formatted summary of the completed test cases.
///
/// # Output Format / 输出格式
/// ```text
/// --- Matrix Summary ---
///   - Status     | Test Case                          | Mode   | Deficiency     |   Issues |   Duration
///   - Clean      | Light Mode                         | light  | -              |        0 |      1.23s
///   - Issues     | Light Mode (protanopia)            | light  | protanopia     |        2 |      0.98s
/// ```
pub fn print_summary(outcome: &RunOutcome) {
    println!("\n{}", t!("summary.banner").bold());
    println!(
        "  - {:<10} | {:<34} | {:<6} | {:<14} | {:>8} | {:>10}",
        t!("summary.header.status"),
        t!("summary.header.name"),
        t!("summary.header.mode"),
        t!("summary.header.deficiency"),
        t!("summary.header.issues"),
        t!("summary.header.duration"),
    );

    for result in &outcome.results {
        let status = if result.has_issues() {
            t!("summary.status.issues").red()
        } else {
            t!("summary.status.clean").green()
        };
        let deficiency = result.case.deficiency.map(|d| d.as_str()).unwrap_or("-");
        println!(
            "  - {:<10} | {:<34} | {:<6} | {:<14} | {:>8} | {:>10}",
            status,
            result.case_name(),
            result.case.display_mode.as_str(),
            deficiency,
            result.issues.len(),
            format!("{:.2?}", result.duration),
        );
    }

    if outcome.any_issues() {
        println!(
            "\n{}",
            t!(
                "summary.issues_found",
                count = outcome.total_issues(),
                cases = outcome.results.iter().filter(|r| r.has_issues()).count()
            )
            .red()
            .bold()
        );
    } else {
        println!("\n{}", t!("summary.all_clean").green().bold());
    }
}

/// Prints why the matrix stopped early.
/// 打印矩阵提前停止的原因。
pub fn print_abort(abort: &MatrixAbort) {
    println!("\n{}", t!("abort.banner").red().bold());
    println!("{}", "-".repeat(80));
    match (&abort.case, &abort.stage) {
        (Some(case), Some(stage)) => println!(
            "{}",
            t!("abort.case_failed", name = case.cyan(), stage = stage)
        ),
        _ => println!("{}", t!("abort.run_failed")),
    }
    println!("{} {}", "Error:".red(), abort.source);
    println!(
        "{}",
        t!(
            "abort.completed_before",
            count = abort.completed.results.len()
        )
        .dimmed()
    );
    println!("{}", "-".repeat(80));
}
