//! # Matrix Initialization Module / 矩阵初始化模块
//!
//! This module creates a starter `CvdMatrix.toml`, either from defaults or
//! through an interactive command-line wizard.
//!
//! 此模块创建初始的 `CvdMatrix.toml`，可以使用默认值，也可以通过交互式命令行向导。
//!
//! ## Features / 功能特性
//!
//! - **Interactive Wizard**: asks for the target page, display modes and deficiencies
//! - **Overwrite Protection**: confirmation before replacing an existing file, unless `--force`
//!
//! - **交互式向导**: 询问目标页面、显示模式和色觉缺陷
//! - **覆盖保护**: 替换现有文件前进行确认，除非使用 `--force`

use anyhow::{bail, Context, Result};
use colored::*;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect};
use std::fs;
use std::path::Path;

use crate::core::config::{MatrixConfig, MatrixSpec, DEFAULT_CONFIG_FILE};
use crate::core::models::{Deficiency, DisplayMode};
use crate::infra::t;

const DEFAULT_TARGET: &str = "index.html";

/// Runs the wizard (or writes the defaults) to generate `CvdMatrix.toml` in
/// the current directory.
///
/// 运行向导（或写入默认值）以在当前目录生成 `CvdMatrix.toml`。
pub fn run_init_wizard(non_interactive: bool, force: bool) -> Result<()> {
    init_in(Path::new(DEFAULT_CONFIG_FILE), non_interactive, force)
}

/// Same as [`run_init_wizard`], writing to `config_path`.
pub fn init_in(config_path: &Path, non_interactive: bool, force: bool) -> Result<()> {
    let theme = ColorfulTheme::default();

    if !non_interactive {
        println!("\n{}", t!("init_wizard_welcome").cyan().bold());
        println!("{}", t!("init_wizard_description"));
    }

    if config_path.exists() && !force {
        if non_interactive {
            bail!(t!("init_exists_non_interactive", path = config_path.display()).to_string());
        }
        let confirmation = Confirm::with_theme(&theme)
            .with_prompt(t!("init_overwrite_prompt", path = config_path.display()))
            .default(false)
            .interact()
            .context(t!("init_user_confirmation_failed").to_string())?;
        if !confirmation {
            println!("{}", t!("init_aborted"));
            return Ok(());
        }
    }

    let config = if non_interactive {
        default_config()
    } else {
        prompt_config(&theme)?
    };

    write_config(config_path, &config)
}

/// The configuration written by `init --non-interactive`.
pub fn default_config() -> MatrixConfig {
    MatrixConfig {
        language: rust_i18n::locale().to_string(),
        target: Some(DEFAULT_TARGET.to_string()),
        matrix: Some(MatrixSpec::default()),
        ..MatrixConfig::default()
    }
}

fn prompt_config(theme: &ColorfulTheme) -> Result<MatrixConfig> {
    let target: String = Input::with_theme(theme)
        .with_prompt(t!("init_target_prompt"))
        .default(DEFAULT_TARGET.to_string())
        .interact_text()
        .context(t!("init_user_confirmation_failed").to_string())?;

    let mode_labels: Vec<&str> = DisplayMode::ALL.iter().map(|m| m.label()).collect();
    let mode_selection = MultiSelect::with_theme(theme)
        .with_prompt(t!("init_modes_prompt"))
        .items(&mode_labels)
        .defaults(&[true, false])
        .interact()
        .context(t!("init_user_confirmation_failed").to_string())?;

    let deficiency_labels: Vec<&str> = Deficiency::ALL.iter().map(|d| d.as_str()).collect();
    let deficiency_selection = MultiSelect::with_theme(theme)
        .with_prompt(t!("init_deficiencies_prompt"))
        .items(&deficiency_labels)
        .defaults(&[true; 4])
        .interact()
        .context(t!("init_user_confirmation_failed").to_string())?;

    let include_baseline = Confirm::with_theme(theme)
        .with_prompt(t!("init_baseline_prompt"))
        .default(true)
        .interact()
        .context(t!("init_user_confirmation_failed").to_string())?;

    let mut display_modes: Vec<DisplayMode> =
        mode_selection.into_iter().map(|i| DisplayMode::ALL[i]).collect();
    if display_modes.is_empty() {
        println!("{}", t!("init_no_modes_selected").yellow());
        display_modes.push(DisplayMode::Light);
    }
    let deficiencies: Vec<Deficiency> = deficiency_selection
        .into_iter()
        .map(|i| Deficiency::ALL[i])
        .collect();

    Ok(MatrixConfig {
        language: rust_i18n::locale().to_string(),
        target: Some(target),
        matrix: Some(MatrixSpec {
            display_modes,
            deficiencies,
            include_baseline,
        }),
        ..MatrixConfig::default()
    })
}

fn write_config(path: &Path, config: &MatrixConfig) -> Result<()> {
    let toml_string =
        toml::to_string_pretty(config).context(t!("init_serialize_failed").to_string())?;

    fs::write(path, toml_string)
        .with_context(|| t!("init_write_failed", path = path.display()).to_string())?;

    println!(
        "\n{} {}",
        "✔".green(),
        t!("init_success_created", path = path.display()).bold()
    );
    println!("{}", t!("init_usage_hint"));

    Ok(())
}
