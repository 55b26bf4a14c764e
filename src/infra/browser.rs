//! # Browser Contracts Module / 浏览器契约模块
//!
//! Traits describing the external collaborators the core drives: a headless
//! browser session with its pages, and the accessibility audit engine.
//! The Node bridge in [`crate::infra::bridge`] implements all three; tests
//! substitute in-memory fakes.
//!
//! 描述核心所驱动的外部协作方的 trait：无头浏览器会话及其页面，以及无障碍审计引擎。
//! [`crate::infra::bridge`] 中的 Node 桥接实现了全部三个 trait；测试中使用内存替身。

#![allow(async_fn_in_trait)]

use std::path::Path;

use crate::core::error::CvdResult;
use crate::core::models::{DisplayMode, Issue, Standard};

/// A running browser, shared by every test case of one matrix run.
/// 一个运行中的浏览器，在一次矩阵运行的所有测试用例之间共享。
pub trait BrowserSession {
    type Page: BrowserPage;

    /// Opens a fresh page. Pages are never reused across test cases.
    async fn new_page(&self) -> CvdResult<Self::Page>;

    /// Shuts the browser down.
    async fn close(self) -> CvdResult<()>;
}

/// A single page (tab) of a [`BrowserSession`].
pub trait BrowserPage {
    /// Sets the `prefers-color-scheme` media feature. Must be called before navigation.
    /// 设置 `prefers-color-scheme` 媒体特性。必须在导航前调用。
    async fn emulate_color_scheme(&self, mode: DisplayMode) -> CvdResult<()>;

    async fn goto(&self, url: &str) -> CvdResult<()>;

    /// Text content of the first `<style>` element, or `None` if the page has none.
    async fn first_style_text(&self) -> CvdResult<Option<String>>;

    /// Replaces the content of the first `<style>` element.
    /// Returns `false` if the page has no such element.
    async fn replace_first_style(&self, css: &str) -> CvdResult<bool>;

    /// Serialized markup of the current document.
    async fn content(&self) -> CvdResult<String>;

    async fn screenshot(&self, path: &Path) -> CvdResult<()>;

    async fn close(self) -> CvdResult<()>;
}

/// The accessibility audit engine.
///
/// The engine is handed the already-open page so that the color scheme
/// emulation applied by the caller stays in effect while it navigates to `target`.
///
/// 无障碍审计引擎。
/// 引擎接收已打开的页面，使调用方应用的配色方案模拟在其导航到 `target` 时仍然生效。
pub trait AuditEngine<P: BrowserPage> {
    async fn audit(&self, target: &str, standard: Standard, page: &P) -> CvdResult<Vec<Issue>>;
}

/// Combines the result of a body with the result of releasing the resource it used.
/// The body's error wins; a release error is reported only when the body succeeded.
///
/// 将主体结果与释放其所用资源的结果合并。
/// 主体错误优先；仅当主体成功时才报告释放错误。
pub fn release<T>(body: CvdResult<T>, released: CvdResult<()>) -> CvdResult<T> {
    let value = body?;
    released?;
    Ok(value)
}
