//! # Page Snapshot Module / 页面快照模块
//!
//! Reads the first `<style>` block out of the live page and materializes
//! isolated copies of the page whose style block has been replaced.
//!
//! 从实时页面中读取第一个 `<style>` 块，并生成样式块被替换后的隔离页面副本。

use std::path::{Path, PathBuf};

use crate::core::error::{CvdError, CvdResult};
use crate::infra::browser::{release, BrowserPage, BrowserSession};
use crate::infra::fs;

/// A materialized page copy on disk.
/// 磁盘上已生成的页面副本。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactHandle {
    path: PathBuf,
}

impl ArtifactHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Navigable location of the artifact.
    pub fn url(&self) -> String {
        fs::file_url(&self.path)
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

/// Extracts styles from, and writes style-replaced copies of, the target page.
#[derive(Debug, Clone, Default)]
pub struct PageSnapshotService {
    artifact_dir: Option<PathBuf>,
}

impl PageSnapshotService {
    /// # Arguments
    /// * `artifact_dir` - Where artifacts are written; the system temp dir when `None`
    pub fn new(artifact_dir: Option<PathBuf>) -> Self {
        Self { artifact_dir }
    }

    /// Returns the text of the first `<style>` block of `target`.
    ///
    /// Fails with [`CvdError::NoStyleBlockFound`] if the page has none.
    /// The page used for the lookup is closed before returning, on success or failure.
    ///
    /// 返回 `target` 第一个 `<style>` 块的文本。
    /// 如果页面没有样式块，返回 [`CvdError::NoStyleBlockFound`]。
    /// 用于查找的页面在返回前总会被关闭，无论成功与否。
    pub async fn extract_styles<S: BrowserSession>(&self, session: &S, target: &str) -> CvdResult<String> {
        let page = session.new_page().await?;
        let styles = read_first_style(&page, target).await;
        let closed = page.close().await;
        release(styles, closed)
    }

    /// Loads `target`, swaps the content of its first `<style>` block for
    /// `new_styles`, and persists the resulting markup to a uniquely named file.
    ///
    /// 加载 `target`，将其第一个 `<style>` 块的内容替换为 `new_styles`，
    /// 并将生成的标记持久化到一个唯一命名的文件中。
    pub async fn materialize_with_styles<S: BrowserSession>(
        &self,
        session: &S,
        target: &str,
        new_styles: &str,
    ) -> CvdResult<ArtifactHandle> {
        let page = session.new_page().await?;
        let markup = replaced_markup(&page, target, new_styles).await;
        let closed = page.close().await;
        let markup = release(markup, closed)?;

        let path = fs::write_artifact(self.artifact_dir.as_deref(), &markup)?;
        Ok(ArtifactHandle { path })
    }
}

async fn read_first_style<P: BrowserPage>(page: &P, target: &str) -> CvdResult<String> {
    page.goto(target).await?;
    page.first_style_text()
        .await?
        .ok_or_else(|| CvdError::NoStyleBlockFound(target.to_string()))
}

async fn replaced_markup<P: BrowserPage>(page: &P, target: &str, new_styles: &str) -> CvdResult<String> {
    page.goto(target).await?;
    if !page.replace_first_style(new_styles).await? {
        return Err(CvdError::NoStyleBlockFound(target.to_string()));
    }
    page.content().await
}
