//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for CVD Matrix: the browser
//! and audit contracts, the Node bridge that implements them, command
//! execution, file system operations and i18n support.
//!
//! 此模块为 CVD Matrix 提供基础设施服务：浏览器与审计契约、实现它们的 Node 桥接、
//! 命令执行、文件系统操作以及国际化支持。

pub mod bridge;
pub mod browser;
pub mod command;
pub mod fs;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
