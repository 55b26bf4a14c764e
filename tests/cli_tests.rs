//! # CLI Integration Tests / CLI 集成测试
//!
//! Runs the `cvd-matrix` binary for the subcommands that need no browser,
//! and for the `run` paths that end before the browser is started.
//!
//! 针对不需要浏览器的子命令，以及在启动浏览器之前结束的 `run` 路径，运行 `cvd-matrix` 二进制。

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn cvd_matrix() -> Command {
    let mut cmd = Command::cargo_bin("cvd-matrix").unwrap();
    cmd.arg("--lang").arg("en");
    cmd
}

#[cfg(test)]
mod simulate_command_tests {
    use super::*;

    #[test]
    fn test_simulate_prints_the_simulated_color() {
        cvd_matrix()
            .args(["simulate", "#ff0000", "-d", "protanopia"])
            .assert()
            .success()
            .stdout(predicate::str::diff("#6d5f00\n"));
    }

    #[test]
    fn test_simulate_accepts_colors_without_hash() {
        cvd_matrix()
            .args(["simulate", "336699", "--deficiency", "achromatopsia"])
            .assert()
            .success()
            .stdout(predicate::str::contains("#636363"));
    }

    #[test]
    fn test_simulate_rejects_invalid_colors() {
        cvd_matrix()
            .args(["simulate", "#12345", "-d", "tritanopia"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("is not a hex color"));
    }

    #[test]
    fn test_simulate_rejects_unknown_deficiency() {
        cvd_matrix()
            .args(["simulate", "#fff", "-d", "sepia"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unsupported color vision deficiency"));
    }
}

#[cfg(test)]
mod rewrite_command_tests {
    use super::*;

    #[test]
    fn test_rewrite_to_stdout() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("site.css");
        fs::write(&input, "p { color: #ff0000; }\n").unwrap();

        cvd_matrix()
            .arg("rewrite")
            .arg(&input)
            .args(["-d", "protanopia"])
            .assert()
            .success()
            .stdout(predicate::str::diff("p { color: #6d5f00; }\n"))
            .stderr(predicate::str::contains("1 color(s) rewritten"));
    }

    #[test]
    fn test_rewrite_to_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("site.css");
        let output = dir.path().join("out.css");
        fs::write(&input, "a { color: #fff; border-color: #12345 }").unwrap();

        cvd_matrix()
            .arg("rewrite")
            .arg(&input)
            .args(["-d", "deuteranopia", "-o"])
            .arg(&output)
            .assert()
            .success()
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("1 left unchanged"));

        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "a { color: #ffffff; border-color: #12345 }"
        );
    }

    #[test]
    fn test_rewrite_reports_malformed_css() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("broken.css");
        fs::write(&input, "a { color: #fff").unwrap();

        cvd_matrix()
            .arg("rewrite")
            .arg(&input)
            .args(["-d", "protanopia"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("malformed style sheet"));
    }
}

#[cfg(test)]
mod init_command_tests {
    use super::*;

    #[test]
    fn test_init_creates_config_and_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();

        cvd_matrix()
            .current_dir(dir.path())
            .args(["init", "--non-interactive"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created CvdMatrix.toml"));

        let content = fs::read_to_string(dir.path().join("CvdMatrix.toml")).unwrap();
        assert!(content.contains("target = \"index.html\""));
        assert!(content.contains("[matrix]"));
        assert!(content.contains("achromatopsia"));

        cvd_matrix()
            .current_dir(dir.path())
            .args(["init", "--non-interactive"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("--force"));

        cvd_matrix()
            .current_dir(dir.path())
            .args(["init", "--non-interactive", "--force"])
            .assert()
            .success();
    }
}

#[cfg(test)]
mod run_command_tests {
    use super::*;

    #[test]
    fn test_run_with_missing_config_is_fatal() {
        let dir = TempDir::new().unwrap();

        cvd_matrix()
            .current_dir(dir.path())
            .arg("run")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("CvdMatrix.toml"));
    }

    #[test]
    fn test_run_with_invalid_config_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("CvdMatrix.toml"), "[matrix]\ndeficiencies = [\"sepia\"]\n").unwrap();

        cvd_matrix()
            .current_dir(dir.path())
            .arg("run")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("sepia"));
    }

    #[test]
    fn test_run_with_empty_plan_exits_cleanly() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("CvdMatrix.toml"),
            "target = \"https://example.test/\"\n\n[matrix]\ndisplay_modes = []\n",
        )
        .unwrap();

        cvd_matrix()
            .current_dir(dir.path())
            .arg("run")
            .assert()
            .success()
            .stdout(predicate::str::contains("No test cases to run."));
    }

    #[test]
    fn test_only_filter_matching_nothing_exits_cleanly() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("CvdMatrix.toml"), "target = \"https://example.test/\"\n").unwrap();

        cvd_matrix()
            .current_dir(dir.path())
            .args(["run", "--only", "no-such-case"])
            .assert()
            .success()
            .stdout(predicate::str::contains("5 case(s) skipped by --only"));
    }

    #[test]
    fn test_missing_subcommand_shows_help() {
        cvd_matrix().assert().failure().stderr(predicate::str::contains("Usage"));
    }
}
