//! # Command Execution Module / 命令执行模块
//!
//! Spawns short-lived helper commands and captures their output. Used to
//! check that the Node runtime is present before the bridge is launched.
//!
//! 派生短生命周期的辅助命令并捕获其输出。
//! 用于在启动桥接之前检查 Node 运行时是否存在。

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::infra::t;

/// Spawns a command, captures its stdout and stderr.
/// The output streams are read concurrently and combined into a single string.
///
/// # Arguments
/// * `cmd` - The `tokio::process::Command` to execute.
///
/// # Returns
/// A tuple containing:
/// - The `ExitStatus` of the process wrapped in an `io::Result`.
/// - The combined stdout and stderr as a `String`.
///
/// 派生一个命令，捕获其 stdout 和 stderr。
/// 输出流被并发读取并合并到一个字符串中。
pub async fn spawn_and_capture(
    mut cmd: tokio::process::Command,
) -> (std::io::Result<std::process::ExitStatus>, String) {
    let mut child = match cmd
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => return (Err(e), String::new()),
    };

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return (
            Err(std::io::Error::other(t!("command.capture_failed").to_string())),
            String::new(),
        );
    };

    let output = Arc::new(tokio::sync::Mutex::new(String::new()));

    let stdout_output = Arc::clone(&output);
    let stdout_handle = tokio::spawn(async move {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut output = stdout_output.lock().await;
            output.push_str(&line);
            output.push('\n');
        }
    });

    let stderr_output = Arc::clone(&output);
    let stderr_handle = tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut output = stderr_output.lock().await;
            output.push_str(&line);
            output.push('\n');
        }
    });

    let status = child.wait().await;

    // Join the readers so no trailing output is lost.
    if let Err(e) = stdout_handle.await {
        eprintln!("Failed to join stdout task: {}", e);
    }
    if let Err(e) = stderr_handle.await {
        eprintln!("Failed to join stderr task: {}", e);
    }

    (status, output.lock().await.clone())
}

/// Runs `<program> [args..] --version` and returns the reported version.
///
/// Fails with a readable message when the program cannot be started or exits
/// unsuccessfully, which is the usual symptom of Node not being installed.
///
/// 运行 `<program> [args..] --version` 并返回报告的版本。
/// 当程序无法启动或退出失败时（通常是未安装 Node），返回可读的错误消息。
pub async fn check_node_available(program: &str, args: &[String], working_dir: &Path) -> Result<String> {
    let mut cmd = tokio::process::Command::new(program);
    cmd.args(args).arg("--version").current_dir(working_dir);

    let (status, output) = spawn_and_capture(cmd).await;
    let status = status.with_context(|| t!("command.node_missing", program = program).to_string())?;
    if !status.success() {
        bail!(
            "{}\n{}",
            t!("command.node_failed", program = program, status = status),
            output.trim()
        );
    }

    Ok(output.trim().to_string())
}
