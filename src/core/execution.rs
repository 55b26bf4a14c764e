//! # Test Case Execution Module / 测试用例执行模块
//!
//! This module runs a single test case against the shared browser session:
//! open a page, emulate the color scheme, navigate, optionally swap in the
//! deficiency-simulated styles, audit, capture a screenshot, close the page.
//!
//! 此模块针对共享浏览器会话运行单个测试用例：
//! 打开页面、模拟配色方案、导航、按需换入缺陷模拟样式、审计、截图、关闭页面。

use colored::*;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

use crate::{
    core::{
        error::{CvdError, CvdResult},
        models::{AuditResult, Issue, Standard, TestCase},
        snapshot::PageSnapshotService,
        stylesheet,
    },
    infra::{
        browser::{AuditEngine, BrowserPage, BrowserSession},
        fs, t,
    },
};

/// The audit always asks for the strictest standard.
/// 审计始终请求最严格的标准。
pub const AUDIT_STANDARD: Standard = Standard::Wcag2AAA;

/// The step a test case was performing.
/// 测试用例正在执行的步骤。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CaseStage {
    OpenPage,
    EmulateColorScheme,
    Navigate,
    RewriteStyles,
    MaterializeArtifact,
    Audit,
    Capture,
    ClosePage,
}

impl fmt::Display for CaseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CaseStage::OpenPage => "opening the page",
            CaseStage::EmulateColorScheme => "emulating the color scheme",
            CaseStage::Navigate => "navigating to the target",
            CaseStage::RewriteStyles => "rewriting styles",
            CaseStage::MaterializeArtifact => "writing the rewritten page",
            CaseStage::Audit => "auditing",
            CaseStage::Capture => "capturing the screenshot",
            CaseStage::ClosePage => "closing the page",
        };
        f.write_str(s)
    }
}

/// A test case that did not complete.
#[derive(Debug, Error)]
#[error("test case '{case}' failed while {stage}: {source}")]
pub struct CaseFailure {
    pub case: String,
    pub stage: CaseStage,
    #[source]
    pub source: CvdError,
}

/// Everything a test case needs besides the session and the audit engine.
/// 除会话和审计引擎外，测试用例所需的一切。
#[derive(Debug, Clone, Copy)]
pub struct CaseContext<'a> {
    /// Canonical location of the page under test.
    pub target: &'a str,
    /// Styles extracted once from the target, shared by all deficiency cases.
    pub original_styles: &'a str,
    pub screenshot_dir: &'a Path,
    pub snapshots: &'a PageSnapshotService,
}

struct Completed {
    issues: Vec<Issue>,
    audited_target: String,
    artifact: Option<PathBuf>,
    screenshot: PathBuf,
}

/// Runs one test case to completion.
///
/// The page opened for the case is closed before this returns, whether the
/// case succeeded or not. Failures are not retried.
///
/// 运行单个测试用例直至完成。
/// 无论用例成功与否，为其打开的页面都会在返回前关闭。失败不会重试。
///
/// # Arguments
/// * `session` - The browser session shared by the whole matrix
/// * `audit` - The audit engine
/// * `case` - The test case to run
/// * `ctx` - Target, extracted styles and output locations
pub async fn run_test_case<S, A>(
    session: &S,
    audit: &A,
    case: &TestCase,
    ctx: &CaseContext<'_>,
) -> Result<AuditResult, CaseFailure>
where
    S: BrowserSession,
    A: AuditEngine<S::Page>,
{
    let deficiency_label = case
        .deficiency
        .map(|d| d.to_string())
        .unwrap_or_else(|| t!("case.no_deficiency").to_string());
    println!(
        "{}",
        t!(
            "case.started",
            name = &case.name,
            mode = case.display_mode,
            deficiency = deficiency_label
        )
        .blue()
    );

    let start_time = Instant::now();
    let page = session
        .new_page()
        .await
        .map_err(|source| failure(case, CaseStage::OpenPage, source))?;

    let mut stage = CaseStage::EmulateColorScheme;
    let outcome = drive_case(session, audit, &page, case, ctx, &mut stage).await;
    let closed = page.close().await;

    let completed = match (outcome, closed) {
        (Ok(completed), Ok(())) => completed,
        (Err(source), _) => return Err(failure(case, stage, source)),
        (Ok(_), Err(source)) => return Err(failure(case, CaseStage::ClosePage, source)),
    };

    let duration = start_time.elapsed();
    let duration_str = format!("{:.2}", duration.as_secs_f64());
    if completed.issues.is_empty() {
        println!(
            "{}",
            t!("case.finished_clean", name = &case.name, duration = &duration_str).green()
        );
    } else {
        println!(
            "{}",
            t!(
                "case.finished_issues",
                name = &case.name,
                count = completed.issues.len(),
                duration = &duration_str
            )
            .yellow()
        );
    }

    Ok(AuditResult {
        case: case.clone(),
        issues: completed.issues,
        audited_target: completed.audited_target,
        artifact: completed.artifact,
        screenshot: completed.screenshot,
        duration,
    })
}

async fn drive_case<S, A>(
    session: &S,
    audit: &A,
    page: &S::Page,
    case: &TestCase,
    ctx: &CaseContext<'_>,
    stage: &mut CaseStage,
) -> CvdResult<Completed>
where
    S: BrowserSession,
    A: AuditEngine<S::Page>,
{
    *stage = CaseStage::EmulateColorScheme;
    page.emulate_color_scheme(case.display_mode).await?;

    *stage = CaseStage::Navigate;
    page.goto(ctx.target).await?;

    let mut artifact = None;
    let audited_target = match case.deficiency {
        Some(deficiency) => {
            *stage = CaseStage::RewriteStyles;
            let rewrite = stylesheet::rewrite_detailed(ctx.original_styles, deficiency)?;

            *stage = CaseStage::MaterializeArtifact;
            let handle = ctx
                .snapshots
                .materialize_with_styles(session, ctx.target, &rewrite.css)
                .await?;
            println!(
                "{}",
                t!(
                    "case.styles_rewritten",
                    count = rewrite.rewritten,
                    deficiency = deficiency,
                    path = handle.path().display()
                )
                .dimmed()
            );
            let url = handle.url();
            artifact = Some(handle.into_path());
            url
        }
        None => ctx.target.to_string(),
    };

    *stage = CaseStage::Audit;
    let issues = audit.audit(&audited_target, AUDIT_STANDARD, page).await?;

    *stage = CaseStage::Capture;
    let screenshot = fs::screenshot_path(ctx.screenshot_dir, &case.name);
    page.screenshot(&screenshot).await?;

    *stage = CaseStage::ClosePage;
    Ok(Completed {
        issues,
        audited_target,
        artifact,
        screenshot,
    })
}

fn failure(case: &TestCase, stage: CaseStage, source: CvdError) -> CaseFailure {
    CaseFailure {
        case: case.name.clone(),
        stage,
        source,
    }
}
