//! # File System Operations Module / 文件系统操作模块
//!
//! This module provides the file system helpers of the matrix: writing
//! uniquely named page artifacts, resolving the target page location and
//! deriving screenshot paths.
//!
//! 此模块提供矩阵所需的文件系统辅助功能：写入唯一命名的页面产物、
//! 解析目标页面位置以及生成截图路径。

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const ARTIFACT_PREFIX: &str = "cvd-matrix-";
const ARTIFACT_SUFFIX: &str = ".html";

/// Writes `html` to a new, uniquely named file and keeps it on disk.
///
/// The file is created exclusively by `tempfile`, so two calls never return
/// the same path. Nothing deletes it afterwards; cleanup is left to the caller
/// or the operating system's temp directory policy.
///
/// 将 `html` 写入一个新的唯一命名文件并保留在磁盘上。
/// 文件由 `tempfile` 独占创建，因此两次调用永远不会返回相同路径。
/// 之后不会删除该文件；清理由调用方或操作系统的临时目录策略负责。
///
/// # Arguments
/// * `dir` - Directory to create the file in; the system temp dir when `None`
/// * `html` - Full page markup
pub fn write_artifact(dir: Option<&Path>, html: &str) -> std::io::Result<PathBuf> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(ARTIFACT_PREFIX).suffix(ARTIFACT_SUFFIX);

    let mut file = match dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            builder.tempfile_in(dir)?
        }
        None => builder.tempfile()?,
    };

    file.write_all(html.as_bytes())?;
    file.flush()?;

    let (_, path) = file.keep().map_err(|e| e.error)?;
    Ok(path)
}

/// Converts a local path into a `file://` URL.
///
/// Characters that would change how the URL is read (`%`, `#`, `?`, spaces,
/// control and non-ASCII bytes) are percent-encoded.
///
/// 将本地路径转换为 `file://` URL。会改变 URL 含义的字符
///（`%`、`#`、`?`、空格、控制字符和非 ASCII 字节）会被百分号编码。
pub fn file_url(path: &Path) -> String {
    let display = path.display().to_string().replace('\\', "/");
    let encoded = percent_encode_path(&display);
    if encoded.starts_with('/') {
        format!("file://{encoded}")
    } else {
        format!("file:///{encoded}")
    }
}

fn percent_encode_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'%' | b'#' | b'?' | b' ' | b'"' | b'<' | b'>' | b'`' | b'{' | b'}' => {
                out.push_str(&format!("%{byte:02X}"));
            }
            b if b.is_ascii_control() || !b.is_ascii() => out.push_str(&format!("%{b:02X}")),
            b => out.push(b as char),
        }
    }
    out
}

/// Resolves the configured target into a navigable URL.
///
/// URLs (`http://`, `https://`, `file://`) pass through unchanged; anything else
/// is treated as a path relative to `base_dir` and must exist.
///
/// 将配置的目标解析为可导航的 URL。
/// URL（`http://`、`https://`、`file://`）原样通过；其他内容视为相对于 `base_dir` 的路径，且必须存在。
pub fn resolve_target(target: &str, base_dir: &Path) -> Result<String> {
    if is_url(target) {
        return Ok(target.to_string());
    }

    let path = expand_path(target, base_dir)?;
    let absolute = absolute_path(&path)?;
    Ok(file_url(&absolute))
}

pub fn is_url(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("file://")
}

/// Expands `~` and environment variables, then anchors relative paths at `base_dir`.
/// 展开 `~` 和环境变量，然后将相对路径锚定到 `base_dir`。
pub fn expand_path(raw: &str, base_dir: &Path) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw)
        .with_context(|| format!("Failed to expand path: {raw}"))?
        .to_string();
    let path = PathBuf::from(expanded);
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(base_dir.join(path))
    }
}

/// Path of the screenshot for a test case, keyed by its display name.
/// Path separators in the name are replaced so the file stays inside `dir`.
///
/// 测试用例截图的路径，以其显示名称为键。
/// 名称中的路径分隔符会被替换，以确保文件位于 `dir` 内。
pub fn screenshot_path(dir: &Path, case_name: &str) -> PathBuf {
    dir.join(format!("{}.png", screenshot_stem(case_name)))
}

/// File stem of a case's screenshot.
/// 用例截图的文件名主干。
pub fn screenshot_stem(case_name: &str) -> String {
    case_name
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') || c.is_control() { '_' } else { c })
        .collect()
}

/// Gets the absolute path from a potentially relative path.
///
/// # Returns
/// Canonicalized absolute path, or an error if the path doesn't exist
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("Failed to resolve path: {}", path.display()))
}
