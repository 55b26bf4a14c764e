//! # Configuration Module / 配置模块
//!
//! Parses `CvdMatrix.toml` and resolves the paths it contains relative to the
//! directory of the config file.
//!
//! 解析 `CvdMatrix.toml`，并将其中的路径相对于配置文件所在目录进行解析。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::models::{Deficiency, DisplayMode, TestCase};
use crate::infra::{fs as cvd_fs, t};

/// Default name of the configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "CvdMatrix.toml";

/// Represents the entire matrix configuration, loaded from a TOML file.
/// 代表从 TOML 文件加载的整个矩阵配置。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatrixConfig {
    /// The language for console output (e.g., "en", "zh-CN").
    /// 控制台输出的语言（例如 "en", "zh-CN"）。
    #[serde(default = "default_language")]
    pub language: String,

    /// The page under test: a path relative to the config file, or an
    /// `http(s)://` / `file://` URL. May be overridden on the command line.
    /// 被测页面：相对于配置文件的路径，或 URL。可在命令行中覆盖。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Directory screenshots are written to.
    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: String,

    /// Directory rewritten page artifacts are written to; the system temp dir when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_dir: Option<String>,

    #[serde(default)]
    pub browser: BrowserConfig,

    /// Shorthand that the planner expands into generated cases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<MatrixSpec>,

    /// Explicit cases, run before any generated ones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cases: Vec<TestCase>,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            target: None,
            screenshot_dir: default_screenshot_dir(),
            artifact_dir: None,
            browser: BrowserConfig::default(),
            matrix: None,
            cases: Vec::new(),
        }
    }
}

/// How the browser bridge process is started.
/// 浏览器桥接进程的启动方式。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BrowserConfig {
    /// Program (plus arguments, shell-split) that runs the bridge script.
    #[serde(default = "default_node_command")]
    pub node_command: String,

    /// Directory in which `puppeteer` and `pa11y` can be resolved.
    /// 可以解析 `puppeteer` 和 `pa11y` 的目录。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,

    #[serde(default = "default_true")]
    pub headless: bool,

    /// Extra arguments passed to the browser at launch.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub launch_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            node_command: default_node_command(),
            working_dir: None,
            headless: true,
            launch_args: Vec::new(),
        }
    }
}

/// The `[matrix]` table: every display mode crossed with every deficiency.
/// `[matrix]` 表：每种显示模式与每种缺陷的组合。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MatrixSpec {
    #[serde(default = "default_display_modes")]
    pub display_modes: Vec<DisplayMode>,

    #[serde(default = "default_deficiencies")]
    pub deficiencies: Vec<Deficiency>,

    /// Adds the unmodified case for each display mode, ahead of its deficiency cases.
    #[serde(default = "default_true")]
    pub include_baseline: bool,
}

impl Default for MatrixSpec {
    fn default() -> Self {
        Self {
            display_modes: default_display_modes(),
            deficiencies: default_deficiencies(),
            include_baseline: true,
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_screenshot_dir() -> String {
    ".".to_string()
}

fn default_node_command() -> String {
    "node".to_string()
}

fn default_true() -> bool {
    true
}

fn default_display_modes() -> Vec<DisplayMode> {
    vec![DisplayMode::Light]
}

fn default_deficiencies() -> Vec<Deficiency> {
    Deficiency::ALL.to_vec()
}

/// A parsed configuration together with the directory its relative paths are anchored at.
/// 已解析的配置，以及其相对路径所锚定的目录。
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: MatrixConfig,
    /// Canonical path of the config file.
    pub path: PathBuf,
    pub base_dir: PathBuf,
}

impl LoadedConfig {
    /// Wraps an in-memory configuration whose relative paths resolve against `base_dir`.
    pub fn from_parts(config: MatrixConfig, base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            config,
            path: base_dir.join(DEFAULT_CONFIG_FILE),
            base_dir,
        }
    }

    /// Resolves the target, preferring `override_target` (relative to the
    /// current directory) over the configured one (relative to the config file).
    ///
    /// 解析目标页面，`override_target`（相对于当前目录）优先于配置中的目标（相对于配置文件）。
    pub fn resolve_target(&self, override_target: Option<&str>) -> Result<String> {
        match override_target {
            Some(target) => {
                let cwd = std::env::current_dir().context("Failed to read the current directory")?;
                cvd_fs::resolve_target(target, &cwd)
            }
            None => {
                let target = self
                    .config
                    .target
                    .as_deref()
                    .with_context(|| t!("config.missing_target", path = self.path.display()).to_string())?;
                cvd_fs::resolve_target(target, &self.base_dir)
            }
        }
    }

    pub fn screenshot_dir(&self) -> Result<PathBuf> {
        cvd_fs::expand_path(&self.config.screenshot_dir, &self.base_dir)
    }

    pub fn artifact_dir(&self) -> Result<Option<PathBuf>> {
        self.config
            .artifact_dir
            .as_deref()
            .map(|dir| cvd_fs::expand_path(dir, &self.base_dir))
            .transpose()
    }

    pub fn browser_working_dir(&self) -> Result<PathBuf> {
        match self.config.browser.working_dir.as_deref() {
            Some(dir) => cvd_fs::expand_path(dir, &self.base_dir),
            None => Ok(self.base_dir.clone()),
        }
    }

    /// Splits `browser.node_command` into program and arguments.
    /// 将 `browser.node_command` 拆分为程序和参数。
    pub fn node_command(&self) -> Result<(String, Vec<String>)> {
        split_command(&self.config.browser.node_command)
    }
}

/// Splits a shell-style command line into its program and arguments.
pub fn split_command(command: &str) -> Result<(String, Vec<String>)> {
    let mut parts = shlex::split(command)
        .filter(|parts| !parts.is_empty())
        .with_context(|| t!("config.invalid_node_command", command = command).to_string())?;
    let program = parts.remove(0);
    Ok((program, parts))
}

/// Reads and parses the configuration file at `path`.
///
/// Unknown deficiency names are rejected here, with the same message the
/// simulation would produce.
///
/// 读取并解析 `path` 处的配置文件。未知的缺陷名称在此处被拒绝。
pub fn load_config(path: &Path) -> Result<LoadedConfig> {
    let canonical = fs::canonicalize(path)
        .with_context(|| t!("config.read_failed", path = path.display()).to_string())?;
    let content = fs::read_to_string(&canonical)
        .with_context(|| t!("config.read_failed", path = canonical.display()).to_string())?;
    let config = parse_config(&content)?;

    let base_dir = canonical
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    Ok(LoadedConfig {
        config,
        path: canonical,
        base_dir,
    })
}

/// Parses configuration text.
pub fn parse_config(content: &str) -> Result<MatrixConfig> {
    toml::from_str(content).with_context(|| t!("config.parse_failed").to_string())
}
