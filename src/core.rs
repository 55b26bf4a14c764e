//! # Core Module / 核心模块
//!
//! This module contains the core functionality of CVD Matrix: data models,
//! configuration, color simulation, style rewriting, page snapshots and the
//! sequential test execution engine.
//!
//! 此模块包含 CVD Matrix 的核心功能：数据模型、配置、颜色模拟、
//! 样式重写、页面快照以及顺序测试执行引擎。

pub mod color;
pub mod config;
pub mod error;
pub mod execution;
pub mod models;
pub mod orchestrator;
pub mod planner;
pub mod snapshot;
pub mod stylesheet;

// Re-exports
pub use error::{CvdError, CvdResult};
pub use execution::run_test_case;
pub use models::{AuditResult, RunOutcome, TestCase};
pub use orchestrator::{MatrixAbort, MatrixOrchestrator};
