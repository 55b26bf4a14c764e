//! # Simulate Command Module / 模拟命令模块
//!
//! Prints how a single hex color is perceived under a deficiency.
//! 打印单个十六进制颜色在某种色觉缺陷下的感知效果。

use anyhow::{bail, Result};

use crate::core::color::HexColor;
use crate::core::models::Deficiency;
use crate::infra::t;

/// Prints the simulated color of `color` to stdout.
///
/// `color` may omit the leading `#`.
pub fn execute(color: &str, deficiency: Deficiency) -> Result<()> {
    println!("{}", simulate_literal(color, deficiency)?);
    Ok(())
}

/// Normalizes and simulates a user-supplied color literal.
pub fn simulate_literal(color: &str, deficiency: Deficiency) -> Result<String> {
    let trimmed = color.trim();
    let literal = if trimmed.starts_with('#') {
        trimmed.to_string()
    } else {
        format!("#{trimmed}")
    };

    let Some(parsed) = HexColor::parse(&literal) else {
        bail!(t!("simulate.invalid_color", color = color).to_string());
    };
    Ok(parsed.simulate(deficiency).to_hex())
}
