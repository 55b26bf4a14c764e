//! # Rewrite Command Module / 重写命令模块
//!
//! Runs the style rewriter on a CSS file without a browser.
//! 在没有浏览器的情况下对 CSS 文件运行样式重写器。

use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::Path;

use crate::core::models::Deficiency;
use crate::core::stylesheet;
use crate::infra::t;

/// Rewrites `input` for `deficiency` and writes the result to `output`, or to stdout.
///
/// The counts are reported on stderr so stdout carries only the style sheet.
///
/// 为 `deficiency` 重写 `input`，并将结果写入 `output` 或 stdout。
/// 计数信息输出到 stderr，以便 stdout 只包含样式表。
pub fn execute(input: &Path, deficiency: Deficiency, output: Option<&Path>) -> Result<()> {
    let css = fs::read_to_string(input)
        .with_context(|| t!("rewrite.read_failed", path = input.display()).to_string())?;
    let rewrite = stylesheet::rewrite_detailed(&css, deficiency)
        .with_context(|| t!("rewrite.parse_failed", path = input.display()).to_string())?;

    match output {
        Some(path) => {
            fs::write(path, &rewrite.css)
                .with_context(|| t!("rewrite.write_failed", path = path.display()).to_string())?;
            eprintln!(
                "{} {}",
                "✔".green(),
                t!("rewrite.written", path = path.display())
            );
        }
        None => print!("{}", rewrite.css),
    }

    eprintln!(
        "{}",
        t!(
            "rewrite.summary",
            rewritten = rewrite.rewritten,
            skipped = rewrite.passed_through,
            deficiency = deficiency
        )
        .dimmed()
    );
    Ok(())
}
