//! # Data Models Module / 数据模型模块
//!
//! This module defines the data structures that flow through the matrix:
//! the test case descriptor, the two closed enumerations it is built from,
//! audit issues, per-case audit results and the aggregated run outcome.
//!
//! 此模块定义了在矩阵中流转的数据结构：
//! 测试用例描述、构成它的两个封闭枚举、审计问题、
//! 单个用例的审计结果以及汇总的运行结果。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::core::error::CvdError;

/// The `prefers-color-scheme` value emulated before navigation.
/// 导航前模拟的 `prefers-color-scheme` 值。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Light,
    Dark,
}

impl DisplayMode {
    /// All display modes, in their canonical order.
    pub const ALL: [DisplayMode; 2] = [DisplayMode::Light, DisplayMode::Dark];

    /// The media feature value sent to the browser.
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Light => "light",
            DisplayMode::Dark => "dark",
        }
    }

    /// Human-readable label used when generating case names ("Light Mode").
    /// 生成用例名称时使用的可读标签（"Light Mode"）。
    pub fn label(&self) -> &'static str {
        match self {
            DisplayMode::Light => "Light Mode",
            DisplayMode::Dark => "Dark Mode",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(DisplayMode::Light),
            "dark" => Ok(DisplayMode::Dark),
            other => Err(format!("unknown display mode '{other}' (expected light or dark)")),
        }
    }
}

/// A color vision deficiency with a simulation model.
///
/// Names coming from configuration or the command line go through `FromStr`,
/// which is the only place an unrecognized kind can surface
/// (as [`CvdError::UnsupportedDeficiency`]).
///
/// 具有模拟模型的色觉缺陷。
/// 来自配置或命令行的名称通过 `FromStr` 解析，
/// 这是唯一可能出现未知类型的地方（即 [`CvdError::UnsupportedDeficiency`]）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Deficiency {
    Protanopia,
    Deuteranopia,
    Tritanopia,
    Achromatopsia,
}

impl Deficiency {
    pub const ALL: [Deficiency; 4] = [
        Deficiency::Protanopia,
        Deficiency::Deuteranopia,
        Deficiency::Tritanopia,
        Deficiency::Achromatopsia,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Deficiency::Protanopia => "protanopia",
            Deficiency::Deuteranopia => "deuteranopia",
            Deficiency::Tritanopia => "tritanopia",
            Deficiency::Achromatopsia => "achromatopsia",
        }
    }
}

impl fmt::Display for Deficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Deficiency {
    type Err = CvdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "protanopia" => Ok(Deficiency::Protanopia),
            "deuteranopia" => Ok(Deficiency::Deuteranopia),
            "tritanopia" => Ok(Deficiency::Tritanopia),
            "achromatopsia" => Ok(Deficiency::Achromatopsia),
            _ => Err(CvdError::UnsupportedDeficiency(s.to_string())),
        }
    }
}

impl TryFrom<String> for Deficiency {
    type Error = CvdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Represents a single entry of the test matrix.
/// 代表测试矩阵中的单个条目。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Unique, human-readable name. Also keys the screenshot file.
    /// 唯一的可读名称，同时用作截图文件名。
    pub name: String,
    /// Color scheme emulated before navigation.
    /// 导航前模拟的配色方案。
    #[serde(alias = "color_scheme")]
    pub display_mode: DisplayMode,
    /// Optional deficiency whose simulation is applied to the page styles.
    /// 可选的色觉缺陷，其模拟将应用于页面样式。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deficiency: Option<Deficiency>,
}

impl TestCase {
    pub fn new(name: impl Into<String>, display_mode: DisplayMode, deficiency: Option<Deficiency>) -> Self {
        Self {
            name: name.into(),
            display_mode,
            deficiency,
        }
    }

    /// Builds a case with the conventional name, e.g. `Light Mode (protanopia)`.
    /// 使用约定名称构建用例，例如 `Light Mode (protanopia)`。
    pub fn generated(display_mode: DisplayMode, deficiency: Option<Deficiency>) -> Self {
        let name = match deficiency {
            Some(d) => format!("{} ({})", display_mode.label(), d),
            None => display_mode.label().to_string(),
        };
        Self::new(name, display_mode, deficiency)
    }
}

/// Compliance standard requested from the audit engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Standard {
    #[serde(rename = "WCAG2A")]
    Wcag2A,
    #[serde(rename = "WCAG2AA")]
    Wcag2AA,
    #[serde(rename = "WCAG2AAA")]
    Wcag2AAA,
}

impl Standard {
    pub fn as_str(&self) -> &'static str {
        match self {
            Standard::Wcag2A => "WCAG2A",
            Standard::Wcag2AA => "WCAG2AA",
            Standard::Wcag2AAA => "WCAG2AAA",
        }
    }
}

impl fmt::Display for Standard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding reported by the audit engine.
/// 审计引擎报告的单个问题。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub code: String,
    pub message: String,
    /// Raw markup snippet of the offending element.
    /// 问题元素的原始标记片段。
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub selector: String,
    /// Issue type as reported by the engine (`error`, `warning`, `notice`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// The audit result of one test case. Never mutated after creation.
/// 单个测试用例的审计结果。创建后不再修改。
#[derive(Debug, Clone, Serialize)]
pub struct AuditResult {
    pub case: TestCase,
    pub issues: Vec<Issue>,
    /// Location that was handed to the audit engine.
    pub audited_target: String,
    /// The rewritten page artifact, present only for deficiency cases.
    /// 重写后的页面产物，仅在缺陷用例中存在。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<PathBuf>,
    pub screenshot: PathBuf,
    pub duration: Duration,
}

impl AuditResult {
    pub fn case_name(&self) -> &str {
        &self.case.name
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// Aggregate of every completed test case, in matrix order.
/// 所有已完成测试用例的汇总，按矩阵顺序排列。
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunOutcome {
    pub results: Vec<AuditResult>,
}

impl RunOutcome {
    pub fn new(results: Vec<AuditResult>) -> Self {
        Self { results }
    }

    /// `true` iff at least one result carries an issue. Always derived from `results`.
    /// 当且仅当至少一个结果包含问题时为 `true`。始终由 `results` 推导。
    pub fn any_issues(&self) -> bool {
        self.results.iter().any(AuditResult::has_issues)
    }

    pub fn total_issues(&self) -> usize {
        self.results.iter().map(|r| r.issues.len()).sum()
    }
}
