//! # Matrix Orchestration Module / 矩阵编排模块
//!
//! Runs an ordered list of test cases against one browser session, strictly
//! one after another, and aggregates their audit results.
//!
//! 针对单个浏览器会话严格依次运行有序的测试用例列表，并汇总其审计结果。

use colored::*;
use std::path::PathBuf;
use thiserror::Error;

use crate::{
    core::{
        error::CvdError,
        execution::{run_test_case, CaseContext, CaseFailure, CaseStage},
        models::{AuditResult, RunOutcome, TestCase},
        snapshot::PageSnapshotService,
    },
    infra::{
        browser::{AuditEngine, BrowserSession},
        t,
    },
};

/// The matrix stopped before every case completed.
///
/// `completed` holds the results of the cases that finished first, in order,
/// so they can still be reported.
///
/// 矩阵在所有用例完成之前停止。
/// `completed` 按顺序保存先完成的用例结果，以便仍可报告。
#[derive(Debug, Error)]
#[error("{}", describe_abort(.case.as_deref(), .stage.as_ref(), .source))]
pub struct MatrixAbort {
    pub completed: RunOutcome,
    /// The case that failed; `None` when the failure happened outside a case
    /// (style extraction or session shutdown).
    pub case: Option<String>,
    pub stage: Option<CaseStage>,
    #[source]
    pub source: CvdError,
}

fn describe_abort(case: Option<&str>, stage: Option<&CaseStage>, source: &CvdError) -> String {
    match (case, stage) {
        (Some(case), Some(stage)) => format!("test case '{case}' failed while {stage}: {source}"),
        (Some(case), None) => format!("test case '{case}' failed: {source}"),
        _ => source.to_string(),
    }
}

/// Owns the run-wide settings and drives the test cases in order.
/// 持有运行范围的设置，并按顺序驱动测试用例。
#[derive(Debug, Clone)]
pub struct MatrixOrchestrator {
    target: String,
    screenshot_dir: PathBuf,
    snapshots: PageSnapshotService,
}

impl MatrixOrchestrator {
    pub fn new(target: impl Into<String>, screenshot_dir: impl Into<PathBuf>, snapshots: PageSnapshotService) -> Self {
        Self {
            target: target.into(),
            screenshot_dir: screenshot_dir.into(),
            snapshots,
        }
    }

    /// Runs `cases` in list order and closes `session` afterwards.
    ///
    /// The session is closed whether the run completes or aborts. The first
    /// failing case stops the matrix; the remaining cases are not run.
    ///
    /// 按列表顺序运行 `cases`，之后关闭 `session`。
    /// 无论运行完成还是中止，会话都会被关闭。第一个失败的用例会停止矩阵，其余用例不会运行。
    pub async fn run<S, A>(&self, session: S, audit: &A, cases: &[TestCase]) -> Result<RunOutcome, MatrixAbort>
    where
        S: BrowserSession,
        A: AuditEngine<S::Page>,
    {
        let mut results = Vec::with_capacity(cases.len());
        let outcome = self.run_cases(&session, audit, cases, &mut results).await;
        let closed = session.close().await;

        match (outcome, closed) {
            (Ok(()), Ok(())) => Ok(RunOutcome::new(results)),
            (Err(abort), _) => Err(abort.into_abort(results)),
            (Ok(()), Err(source)) => Err(MatrixAbort {
                completed: RunOutcome::new(results),
                case: None,
                stage: None,
                source,
            }),
        }
    }

    async fn run_cases<S, A>(
        &self,
        session: &S,
        audit: &A,
        cases: &[TestCase],
        results: &mut Vec<AuditResult>,
    ) -> Result<(), Interrupted>
    where
        S: BrowserSession,
        A: AuditEngine<S::Page>,
    {
        println!("{}", t!("matrix.extracting_styles", target = &self.target).cyan());
        let original_styles = self
            .snapshots
            .extract_styles(session, &self.target)
            .await
            .map_err(Interrupted::Styles)?;

        let ctx = CaseContext {
            target: &self.target,
            original_styles: &original_styles,
            screenshot_dir: &self.screenshot_dir,
            snapshots: &self.snapshots,
        };

        // Sequential on purpose: one case fully finishes, page closed, before the next starts.
        for (index, case) in cases.iter().enumerate() {
            println!(
                "{}",
                t!("matrix.progress", current = index + 1, total = cases.len()).bold()
            );
            let result = run_test_case(session, audit, case, &ctx)
                .await
                .map_err(Interrupted::Case)?;
            results.push(result);
        }

        Ok(())
    }
}

enum Interrupted {
    Styles(CvdError),
    Case(CaseFailure),
}

impl Interrupted {
    fn into_abort(self, results: Vec<AuditResult>) -> MatrixAbort {
        let completed = RunOutcome::new(results);
        match self {
            Interrupted::Styles(source) => MatrixAbort {
                completed,
                case: None,
                stage: None,
                source,
            },
            Interrupted::Case(failure) => MatrixAbort {
                completed,
                case: Some(failure.case),
                stage: Some(failure.stage),
                source: failure.source,
            },
        }
    }
}
