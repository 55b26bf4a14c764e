//! # Color Simulation Unit Tests / 颜色模拟单元测试
//!
//! Tests hex parsing and the deficiency simulation against known values.
//!
//! 针对已知值测试十六进制解析和缺陷模拟。

use cvd_matrix::core::color::{simulate, simulate_hex, HexColor, Rgb};
use cvd_matrix::models::Deficiency;

#[cfg(test)]
mod hex_parsing_tests {
    use super::*;

    #[test]
    fn test_all_hex_forms_normalize_to_six_digits() {
        assert_eq!(HexColor::parse("#f00").unwrap().to_hex(), "#ff0000");
        assert_eq!(HexColor::parse("#FF0000").unwrap().to_hex(), "#ff0000");
        assert_eq!(HexColor::parse("#f008").unwrap().to_hex(), "#ff0000");
        assert_eq!(HexColor::parse("#ff000080").unwrap().to_hex(), "#ff0000");
    }

    #[test]
    fn test_alpha_is_only_present_for_four_and_eight_digits() {
        assert_eq!(HexColor::parse("#336699").unwrap().alpha, None);
        assert_eq!(HexColor::parse("#3698").unwrap().alpha, Some(0x88));
        assert_eq!(HexColor::parse("#33669900").unwrap().alpha, Some(0));
    }

    #[test]
    fn test_non_colors_are_rejected() {
        for literal in ["#", "#12", "#12345", "#1234567", "#123456789", "#ggg", "#main", "336699"] {
            assert_eq!(HexColor::parse(literal), None, "{literal} should not parse");
        }
    }
}

#[cfg(test)]
mod simulation_tests {
    use super::*;

    #[test]
    fn test_known_values_for_pure_red() {
        let expected = [
            (Deficiency::Protanopia, "#6d5f00"),
            (Deficiency::Deuteranopia, "#a39000"),
            (Deficiency::Tritanopia, "#ff000f"),
            (Deficiency::Achromatopsia, "#7f7f7f"),
        ];
        for (deficiency, hex) in expected {
            assert_eq!(simulate_hex("#ff0000", deficiency).as_deref(), Some(hex), "{deficiency}");
        }
    }

    #[test]
    fn test_known_values_for_green_and_blue() {
        assert_eq!(simulate_hex("#00ff00", Deficiency::Protanopia).as_deref(), Some("#ffe500"));
        assert_eq!(simulate_hex("#00ff00", Deficiency::Achromatopsia).as_deref(), Some("#dcdcdc"));
        assert_eq!(simulate_hex("#0000ff", Deficiency::Protanopia).as_deref(), Some("#0059ff"));
        assert_eq!(simulate_hex("#0000ff", Deficiency::Achromatopsia).as_deref(), Some("#4c4c4c"));
    }

    #[test]
    fn test_known_values_for_mid_tone() {
        let expected = [
            (Deficiency::Protanopia, "#50699b"),
            (Deficiency::Deuteranopia, "#425f98"),
            (Deficiency::Tritanopia, "#007278"),
            (Deficiency::Achromatopsia, "#636363"),
        ];
        for (deficiency, hex) in expected {
            assert_eq!(simulate_hex("#336699", deficiency).as_deref(), Some(hex), "{deficiency}");
        }
    }

    #[test]
    fn test_neutral_colors_are_fixed_points() {
        for deficiency in Deficiency::ALL {
            for gray in [Rgb::new(0, 0, 0), Rgb::new(255, 255, 255), Rgb::new(128, 128, 128)] {
                assert_eq!(simulate(gray, deficiency), gray, "{gray} under {deficiency}");
            }
        }
    }

    #[test]
    fn test_achromatopsia_output_is_gray() {
        for color in [Rgb::new(12, 200, 99), Rgb::new(255, 0, 255), Rgb::new(3, 4, 5)] {
            let out = simulate(color, Deficiency::Achromatopsia);
            assert_eq!(out.r, out.g);
            assert_eq!(out.g, out.b);
        }
    }

    #[test]
    fn test_alpha_is_dropped_by_simulation() {
        assert_eq!(simulate_hex("#ff000080", Deficiency::Protanopia).as_deref(), Some("#6d5f00"));
        assert_eq!(simulate_hex("#f008", Deficiency::Protanopia).as_deref(), Some("#6d5f00"));
        assert_eq!(HexColor::parse("#f008").unwrap().simulate(Deficiency::Protanopia).alpha, None);
    }

    #[test]
    fn test_every_hex_form_simulates_to_six_digits() {
        let forms = ["#f00", "#f008", "#ff0000", "#ff000080", "#ABC", "#abcd", "#336699", "#33669900"];
        for literal in forms {
            for deficiency in Deficiency::ALL {
                let out = simulate_hex(literal, deficiency).unwrap();
                assert_eq!(out.len(), 7, "{literal} under {deficiency} gave {out}");
                assert!(out[1..].bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
            }
        }
    }

    #[test]
    fn test_simulation_is_deterministic() {
        let color = Rgb::new(17, 170, 68);
        for deficiency in Deficiency::ALL {
            assert_eq!(simulate(color, deficiency), simulate(color, deficiency));
        }
    }

    #[test]
    fn test_invalid_literal_yields_none() {
        assert_eq!(simulate_hex("#xyz", Deficiency::Tritanopia), None);
        assert_eq!(simulate_hex("red", Deficiency::Tritanopia), None);
    }

    #[test]
    fn test_unknown_deficiency_name_is_an_error() {
        let err = "deuteranomaly".parse::<Deficiency>().unwrap_err();
        assert!(err.to_string().contains("deuteranomaly"));
    }
}
