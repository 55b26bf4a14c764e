//! # Reporting Module / 报告模块
//!
//! This module handles the display and export of matrix results: colored
//! console output with internationalization support, a styled HTML report and
//! a JSON report.
//!
//! 此模块处理矩阵结果的显示和导出：支持国际化的彩色控制台输出、
//! 样式化的 HTML 报告以及 JSON 报告。

pub mod console;
pub mod html;
pub mod json;

// Re-export common reporting functions
pub use console::{print_abort, print_issues, print_summary};
pub use html::generate_html_report;
pub use json::write_json_report;
