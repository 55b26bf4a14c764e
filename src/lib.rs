//! # CVD Matrix Library / CVD Matrix 库
//!
//! This library checks a web page for accessibility issues that only appear
//! for readers with a color-vision deficiency. It rewrites the page's colors
//! through a deficiency simulation and runs an accessibility audit against
//! every {display mode × deficiency} combination of a test matrix.
//!
//! 此库检查网页中仅对色觉缺陷读者出现的无障碍问题。
//! 它通过缺陷模拟重写页面颜色，并针对测试矩阵中每个 {显示模式 × 缺陷} 组合运行无障碍审计。
//!
//! ## Modules / 模块
//!
//! - `core` - Color simulation, style rewriting, data models and the matrix engine
//! - `infra` - Browser contracts, the Node bridge, command execution and file system helpers
//! - `reporting` - Console, HTML and JSON reports
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 颜色模拟、样式重写、数据模型和矩阵引擎
//! - `infra` - 浏览器契约、Node 桥接、命令执行和文件系统辅助
//! - `reporting` - 控制台、HTML 和 JSON 报告
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use core::config;
pub use core::execution;
pub use core::models;
pub use rust_i18n::t;

/// Initializes the application's internationalization (i18n) based on the system locale.
///
/// This function detects the user's system locale and sets the appropriate
/// language for the application's user interface. It attempts to match the full
/// locale (e.g., "zh-CN"), then just the language code (e.g., "en"), and
/// finally falls back to the default language ("en").
pub fn init() {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    rust_i18n::set_locale(match_locale(&locale));
}

/// Picks the best available locale for `requested`.
/// 为 `requested` 选择最合适的可用语言。
pub fn match_locale(requested: &str) -> &'static str {
    let available_locales = rust_i18n::available_locales!();

    if let Some(exact) = available_locales
        .iter()
        .find(|l| l.eq_ignore_ascii_case(requested))
        .copied()
    {
        return exact;
    }
    requested
        .split(['-', '_'])
        .next()
        .and_then(|lang_code| {
            available_locales
                .iter()
                .find(|l| l.split('-').next().is_some_and(|base| base.eq_ignore_ascii_case(lang_code)))
        })
        .copied()
        .unwrap_or("en")
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
