//! # Error Module / 错误模块
//!
//! Error taxonomy shared by the simulation, rewriting, snapshot and matrix layers.
//!
//! 模拟、重写、快照和矩阵各层共享的错误分类。

use thiserror::Error;

/// Errors produced by the core pipeline.
/// 核心管道产生的错误。
#[derive(Error, Debug)]
pub enum CvdError {
    /// A deficiency name that no simulation model exists for.
    /// 没有对应模拟模型的色觉缺陷名称。
    #[error("unsupported color vision deficiency: '{0}' (expected protanopia, deuteranopia, tritanopia or achromatopsia)")]
    UnsupportedDeficiency(String),

    /// The extracted styles could not be parsed.
    /// 提取的样式无法解析。
    #[error("malformed style sheet at line {line}, column {column}: {reason}")]
    MalformedStyleSheet {
        line: u32,
        column: u32,
        reason: String,
    },

    /// The page has no `<style>` element to extract or replace.
    #[error("no <style> block found in {0}")]
    NoStyleBlockFound(String),

    /// Failure reported by the browser or audit collaborator, passed through as-is.
    /// 浏览器或审计协作方报告的失败，原样传递。
    #[error("browser bridge error: {0}")]
    Bridge(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CvdResult<T> = Result<T, CvdError>;
