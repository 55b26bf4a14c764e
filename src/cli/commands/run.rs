//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command: it loads `CvdMatrix.toml`, plans
//! the test cases, starts the browser bridge and drives the matrix, then
//! reports the results and maps them to an exit code.
//!
//! 此模块实现 `run` 命令：加载 `CvdMatrix.toml`、规划测试用例、启动浏览器桥接并驱动矩阵，
//! 然后报告结果并将其映射为退出码。

use anyhow::{Context, Result};
use colored::*;
use std::{env, fs, path::PathBuf, process::ExitCode};
use tokio::signal;

use crate::{
    cli::{EXIT_FATAL, EXIT_ISSUES},
    core::{
        config::{self, LoadedConfig},
        models::RunOutcome,
        orchestrator::MatrixOrchestrator,
        planner,
        snapshot::PageSnapshotService,
    },
    infra::{
        bridge::{BridgeOptions, NodeBridge, Pa11yAudit},
        command, t,
    },
    reporting::{generate_html_report, print_abort, print_issues, print_summary, write_json_report},
};

/// Arguments of the `run` subcommand.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: PathBuf,
    pub target: Option<String>,
    pub screenshots: Option<PathBuf>,
    pub only: Vec<String>,
    pub html: Option<PathBuf>,
    pub json: Option<PathBuf>,
    /// `--lang` was given, so the config's `language` must not override it.
    pub explicit_language: bool,
}

/// Executes the run command with the provided arguments.
///
/// # Returns
/// `0` when every case is clean, `1` when any completed case reported issues,
/// `2` when the matrix aborted. Errors before the matrix starts are returned as `Err`.
///
/// 执行 run 命令。所有用例无问题时返回 `0`，任何已完成用例报告问题时返回 `1`，
/// 矩阵中止时返回 `2`。矩阵开始前的错误以 `Err` 返回。
pub async fn execute(options: RunOptions) -> Result<ExitCode> {
    let loaded = config::load_config(&options.config)?;
    if !options.explicit_language {
        rust_i18n::set_locale(crate::match_locale(&loaded.config.language));
    }

    println!("{}", t!("loading_config", path = loaded.path.display()));

    let target = loaded.resolve_target(options.target.as_deref())?;
    let screenshot_dir = resolve_screenshot_dir(&loaded, options.screenshots.as_ref())?;
    fs::create_dir_all(&screenshot_dir)
        .with_context(|| t!("run.screenshot_dir_failed", path = screenshot_dir.display()).to_string())?;
    let artifact_dir = loaded.artifact_dir()?;

    println!("{}", t!("run.target", target = &target).cyan());
    println!("{}", t!("run.screenshots", path = screenshot_dir.display()).cyan());

    let plan = planner::plan_execution(&loaded.config, &options.only)?;
    if plan.filtered_count > 0 {
        println!(
            "{}",
            t!(
                "run.filtered_cases",
                filtered = plan.filtered_count,
                total = plan.cases_to_run.len()
            )
            .yellow()
        );
    }
    if plan.cases_to_run.is_empty() {
        println!("{}", t!("run.no_cases").green());
        return Ok(ExitCode::SUCCESS);
    }

    let (program, args) = loaded.node_command()?;
    let working_dir = loaded.browser_working_dir()?;
    let node_version = command::check_node_available(&program, &args, &working_dir).await?;
    println!("{}", t!("run.node_detected", version = &node_version).dimmed());

    let bridge_options = BridgeOptions {
        program,
        args,
        working_dir,
        headless: loaded.config.browser.headless,
        launch_args: loaded.config.browser.launch_args.clone(),
    };
    let session = NodeBridge::launch(&bridge_options)
        .await
        .with_context(|| t!("run.launch_failed").to_string())?;

    println!(
        "{}",
        t!("run.starting", count = plan.cases_to_run.len()).bold()
    );

    let orchestrator = MatrixOrchestrator::new(
        target.clone(),
        screenshot_dir,
        PageSnapshotService::new(artifact_dir),
    );

    // Dropping the run future drops the bridge, which kills the Node process.
    let outcome = tokio::select! {
        outcome = orchestrator.run(session, &Pa11yAudit, &plan.cases_to_run) => outcome,
        _ = signal::ctrl_c() => {
            println!("\n{}", t!("shutdown_signal").yellow());
            return Ok(ExitCode::from(EXIT_FATAL));
        }
    };

    match outcome {
        Ok(outcome) => {
            report(&outcome, &target, &options);
            if outcome.any_issues() {
                Ok(ExitCode::from(EXIT_ISSUES))
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
        Err(abort) => {
            report(&abort.completed, &target, &options);
            print_abort(&abort);
            Ok(ExitCode::from(EXIT_FATAL))
        }
    }
}

fn resolve_screenshot_dir(loaded: &LoadedConfig, cli_dir: Option<&PathBuf>) -> Result<PathBuf> {
    match cli_dir {
        Some(dir) if dir.is_absolute() => Ok(dir.clone()),
        Some(dir) => Ok(env::current_dir()
            .context("Failed to read the current directory")?
            .join(dir)),
        None => loaded.screenshot_dir(),
    }
}

/// Issues first, then the summary, then the optional report files.
/// Report file failures are printed but do not change the exit code.
fn report(outcome: &RunOutcome, target: &str, options: &RunOptions) {
    print_issues(&outcome.results);
    print_summary(outcome);

    if let Some(report_path) = &options.html {
        println!("\n{}", t!("run.html_report", path = report_path.display()));
        if let Err(e) = generate_html_report(outcome, target, report_path) {
            eprintln!("{} {:#}", t!("run.html_report_failed").red(), e);
        }
    }

    if let Some(report_path) = &options.json {
        println!("{}", t!("run.json_report", path = report_path.display()));
        if let Err(e) = write_json_report(outcome, target, report_path) {
            eprintln!("{} {:#}", t!("run.json_report_failed").red(), e);
        }
    }
}
