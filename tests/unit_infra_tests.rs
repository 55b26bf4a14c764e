//! # Infrastructure Unit Tests / 基础设施单元测试
//!
//! Tests command output capture, the Node preflight check and the file
//! system helpers used for artifacts, targets and screenshots.
//!
//! 测试命令输出捕获、Node 预检以及用于产物、目标和截图的文件系统辅助函数。

use cvd_matrix::infra::command::{check_node_available, spawn_and_capture};
use cvd_matrix::infra::fs::{file_url, is_url, resolve_target, screenshot_path, write_artifact};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tokio::process::Command;

#[cfg(test)]
mod command_tests {
    use super::*;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_spawn_and_capture_collects_both_streams() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("echo to-stdout; echo to-stderr 1>&2");
        let (status, output) = spawn_and_capture(cmd).await;
        assert!(status.unwrap().success());
        assert!(output.contains("to-stdout"));
        assert!(output.contains("to-stderr"));
    }

    #[tokio::test]
    async fn test_spawn_and_capture_reports_spawn_errors() {
        let cmd = Command::new("definitely-not-a-real-program-cvd");
        let (status, output) = spawn_and_capture(cmd).await;
        assert!(status.is_err());
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_missing_node_is_reported_by_name() {
        let dir = TempDir::new().unwrap();
        let err = check_node_available("definitely-not-a-real-node", &[], dir.path())
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("definitely-not-a-real-node"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_version_command_is_an_error() {
        let dir = TempDir::new().unwrap();
        let args = vec!["-c".to_string(), "exit 3".to_string()];
        assert!(check_node_available("sh", &args, dir.path()).await.is_err());
    }
}

#[cfg(test)]
mod fs_tests {
    use super::*;

    #[test]
    fn test_artifacts_are_unique_and_persist() {
        let dir = TempDir::new().unwrap();
        let first = write_artifact(Some(dir.path()), "<html>1</html>").unwrap();
        let second = write_artifact(Some(dir.path()), "<html>2</html>").unwrap();

        assert_ne!(first, second);
        assert_eq!(fs::read_to_string(&first).unwrap(), "<html>1</html>");
        assert_eq!(fs::read_to_string(&second).unwrap(), "<html>2</html>");
        assert_eq!(first.extension().unwrap(), "html");
    }

    #[test]
    fn test_artifact_dir_is_created() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b");
        let path = write_artifact(Some(&nested), "x").unwrap();
        assert!(path.starts_with(&nested));
    }

    #[test]
    fn test_file_url() {
        assert_eq!(file_url(Path::new("/tmp/page.html")), "file:///tmp/page.html");
    }

    #[test]
    fn test_file_url_encodes_reserved_characters() {
        assert_eq!(
            file_url(Path::new("/tmp/my pages/#1?x=50%.html")),
            "file:///tmp/my%20pages/%231%3Fx=50%25.html"
        );
        assert_eq!(file_url(Path::new("/tmp/café.html")), "file:///tmp/caf%C3%A9.html");
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.test"));
        assert!(is_url("HTTP://example.test"));
        assert!(is_url("file:///tmp/x.html"));
        assert!(!is_url("index.html"));
        assert!(!is_url("/srv/www/index.html"));
    }

    #[test]
    fn test_resolve_local_target() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<style></style>").unwrap();

        let url = resolve_target("index.html", dir.path()).unwrap();
        let canonical = fs::canonicalize(dir.path().join("index.html")).unwrap();
        assert_eq!(url, file_url(&canonical));

        assert!(resolve_target("missing.html", dir.path()).is_err());
    }

    #[test]
    fn test_screenshot_path_is_named_after_the_case() {
        let dir = Path::new("/shots");
        assert_eq!(
            screenshot_path(dir, "Dark Mode (protanopia)"),
            Path::new("/shots/Dark Mode (protanopia).png")
        );
        assert_eq!(screenshot_path(dir, "a/b:c"), Path::new("/shots/a_b_c.png"));
    }
}
