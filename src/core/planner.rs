//! # Test Execution Planner Module / 测试执行计划模块
//!
//! Turns the configuration into the ordered list of test cases to run:
//! explicit cases first, then the cases generated from the `[matrix]` table,
//! then the `--only` filter.
//!
//! 将配置转换为要运行的有序测试用例列表：
//! 先是显式用例，然后是由 `[matrix]` 表生成的用例，最后应用 `--only` 过滤。

use anyhow::{bail, Result};
use std::collections::HashSet;

use crate::core::config::{MatrixConfig, MatrixSpec};
use crate::core::models::{Deficiency, DisplayMode, TestCase};
use crate::infra::fs::screenshot_stem;
use crate::infra::t;

/// Represents a complete execution plan for a matrix run.
/// 表示一次矩阵运行的完整执行计划。
#[derive(Debug)]
pub struct ExecutionPlan {
    /// The cases to run, in order.
    /// 要运行的用例，按顺序排列。
    pub cases_to_run: Vec<TestCase>,
    /// The number of cases removed by the `--only` filter.
    /// 被 `--only` 过滤掉的用例数量。
    pub filtered_count: usize,
}

/// The matrix used when the configuration names no cases at all:
/// the unmodified light page, then one case per deficiency.
///
/// 配置中未指定任何用例时使用的矩阵：未修改的浅色页面，然后每种缺陷一个用例。
pub fn default_cases() -> Vec<TestCase> {
    std::iter::once(TestCase::generated(DisplayMode::Light, None))
        .chain(
            Deficiency::ALL
                .iter()
                .map(|d| TestCase::generated(DisplayMode::Light, Some(*d))),
        )
        .collect()
}

/// Expands a `[matrix]` table. For each display mode: the baseline (if
/// requested), then one case per deficiency in the listed order.
///
/// 展开 `[matrix]` 表。对每种显示模式：先是基线（如有需要），然后按列出顺序每种缺陷一个用例。
pub fn expand_matrix(spec: &MatrixSpec) -> Vec<TestCase> {
    let mut cases = Vec::new();
    for mode in &spec.display_modes {
        if spec.include_baseline {
            cases.push(TestCase::generated(*mode, None));
        }
        cases.extend(
            spec.deficiencies
                .iter()
                .map(|d| TestCase::generated(*mode, Some(*d))),
        );
    }
    cases
}

/// Creates an execution plan for the given configuration.
///
/// # Arguments
/// * `config` - The parsed configuration
/// * `only` - Case-insensitive name fragments; when non-empty, a case is kept if its
///   name contains any of them
///
/// # Returns
/// An `ExecutionPlan`, or an error if two cases share a name or would share a
/// screenshot file
pub fn plan_execution(config: &MatrixConfig, only: &[String]) -> Result<ExecutionPlan> {
    let mut cases = config.cases.clone();
    if let Some(spec) = &config.matrix {
        cases.extend(expand_matrix(spec));
    }
    if cases.is_empty() && config.matrix.is_none() {
        cases = default_cases();
    }

    // Keyed like the screenshot file, so no two cases write the same image,
    // even on a case-insensitive file system.
    let mut seen = HashSet::new();
    for case in &cases {
        if !seen.insert(screenshot_stem(&case.name).to_lowercase()) {
            bail!(t!("planner.duplicate_case", name = &case.name).to_string());
        }
    }

    let total = cases.len();
    let cases_to_run: Vec<TestCase> = if only.is_empty() {
        cases
    } else {
        let needles: Vec<String> = only.iter().map(|s| s.to_lowercase()).collect();
        cases
            .into_iter()
            .filter(|case| {
                let name = case.name.to_lowercase();
                needles.iter().any(|needle| name.contains(needle.as_str()))
            })
            .collect()
    };

    Ok(ExecutionPlan {
        filtered_count: total - cases_to_run.len(),
        cases_to_run,
    })
}
