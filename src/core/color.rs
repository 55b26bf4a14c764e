//! # Color Deficiency Simulation Module / 色觉缺陷模拟模块
//!
//! Hex color parsing and the simulation of color vision deficiencies.
//!
//! Dichromacies (protanopia, deuteranopia, tritanopia) use the full-severity
//! matrices of Machado, Oliveira & Fernandes (2009), applied in linear RGB.
//! Achromatopsia collapses each color to its relative luminance.
//! Simulated colors are always written as `#rrggbb`; an alpha channel in the
//! input is parsed but dropped.
//!
//! 十六进制颜色解析与色觉缺陷模拟。
//! 二色视（红色盲、绿色盲、蓝色盲）使用 Machado 等人（2009）的完全严重度矩阵，
//! 在线性 RGB 空间中应用。全色盲将每种颜色折叠为其相对亮度。
//! 模拟后的颜色始终写为 `#rrggbb`；输入中的 alpha 通道会被解析但丢弃。

use std::fmt;

use crate::core::models::Deficiency;

/// An 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Canonical lowercase `#rrggbb` form.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A parsed hex color literal, normalized from any of the
/// `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa` forms.
///
/// 已解析的十六进制颜色字面量，可从 `#rgb`、`#rgba`、`#rrggbb`
/// 或 `#rrggbbaa` 任一形式规范化而来。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor {
    pub rgb: Rgb,
    pub alpha: Option<u8>,
}

impl HexColor {
    /// Parses a literal that starts with `#`. Returns `None` for anything that
    /// is not 3, 4, 6 or 8 hex digits, so callers can pass such text through.
    ///
    /// 解析以 `#` 开头的字面量。对于不是 3、4、6 或 8 位十六进制数字的内容返回 `None`，
    /// 调用方可以原样保留这些文本。
    pub fn parse(literal: &str) -> Option<Self> {
        let digits = literal.strip_prefix('#')?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        let expanded: String = match digits.len() {
            3 | 4 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 | 8 => digits.to_string(),
            _ => return None,
        };

        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
        let rgb = Rgb::new(channel(0)?, channel(2)?, channel(4)?);
        let alpha = if expanded.len() == 8 { Some(channel(6)?) } else { None };

        Some(Self { rgb, alpha })
    }

    /// Serializes to the six-digit `#rrggbb` form. Alpha is not written back.
    ///
    /// 序列化为六位 `#rrggbb` 形式。alpha 不会被写回。
    pub fn to_hex(&self) -> String {
        self.rgb.to_hex()
    }

    /// Simulates the RGB part. The result carries no alpha, so every
    /// simulated literal serializes to six digits.
    ///
    /// 模拟 RGB 部分。结果不带 alpha，因此每个模拟后的字面量都序列化为六位。
    pub fn simulate(&self, deficiency: Deficiency) -> Self {
        Self {
            rgb: simulate(self.rgb, deficiency),
            alpha: None,
        }
    }
}

type Matrix = [[f64; 3]; 3];

const PROTANOPIA: Matrix = [
    [0.152286, 1.052583, -0.204868],
    [0.114503, 0.786281, 0.099216],
    [-0.003882, -0.048116, 1.051998],
];

const DEUTERANOPIA: Matrix = [
    [0.367322, 0.860646, -0.227968],
    [0.280085, 0.672501, 0.047413],
    [-0.011820, 0.042940, 0.968881],
];

const TRITANOPIA: Matrix = [
    [1.255528, -0.076749, -0.178779],
    [-0.078411, 0.930809, 0.147602],
    [0.004733, 0.691367, 0.303900],
];

// Rec. 709 luminance weights, also used by WCAG relative luminance.
const LUMINANCE: [f64; 3] = [0.2126, 0.7152, 0.0722];

/// Maps a color to how it is perceived under `deficiency`.
///
/// Pure and deterministic; the result is rounded and clamped to `0..=255`.
///
/// 将颜色映射为在 `deficiency` 下的感知颜色。
/// 纯函数且确定性；结果四舍五入并限制在 `0..=255`。
pub fn simulate(color: Rgb, deficiency: Deficiency) -> Rgb {
    let linear = [
        srgb_to_linear(color.r),
        srgb_to_linear(color.g),
        srgb_to_linear(color.b),
    ];

    let out = match deficiency {
        Deficiency::Protanopia => apply(&PROTANOPIA, linear),
        Deficiency::Deuteranopia => apply(&DEUTERANOPIA, linear),
        Deficiency::Tritanopia => apply(&TRITANOPIA, linear),
        Deficiency::Achromatopsia => {
            let y = LUMINANCE[0] * linear[0] + LUMINANCE[1] * linear[1] + LUMINANCE[2] * linear[2];
            [y, y, y]
        }
    };

    Rgb::new(
        linear_to_srgb(out[0]),
        linear_to_srgb(out[1]),
        linear_to_srgb(out[2]),
    )
}

/// Convenience wrapper over [`HexColor::parse`] and [`HexColor::simulate`].
/// Returns `None` when `literal` is not a hex color.
pub fn simulate_hex(literal: &str, deficiency: Deficiency) -> Option<String> {
    HexColor::parse(literal).map(|c| c.simulate(deficiency).to_hex())
}

fn apply(m: &Matrix, v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

fn srgb_to_linear(channel: u8) -> f64 {
    let v = channel as f64 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(value: f64) -> u8 {
    let v = value.clamp(0.0, 1.0);
    let encoded = if v <= 0.0031308 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    };
    (encoded * 255.0).round().clamp(0.0, 255.0) as u8
}
