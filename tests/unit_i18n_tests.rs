//! # I18n Unit Tests / I18n 单元测试
//!
//! Tests locale matching and the translations shipped in `locales/`.
//! Translations are looked up with an explicit locale so the tests do not
//! depend on the process-wide current locale.
//!
//! 测试语言匹配以及 `locales/` 中提供的翻译。
//! 翻译查找使用显式语言，因此测试不依赖进程级的当前语言。

use cvd_matrix::match_locale;
use rust_i18n::t;

// Same catalog as the library, loaded into this test crate for `t!`.
rust_i18n::i18n!("locales", fallback = "en");

#[cfg(test)]
mod locale_matching_tests {
    use super::*;

    #[test]
    fn test_exact_match_ignores_case() {
        assert_eq!(match_locale("en"), "en");
        assert_eq!(match_locale("zh-CN"), "zh-CN");
        assert_eq!(match_locale("ZH-cn"), "zh-CN");
    }

    #[test]
    fn test_language_code_fallback() {
        assert_eq!(match_locale("en-US"), "en");
        assert_eq!(match_locale("en_GB"), "en");
        assert_eq!(match_locale("zh-TW"), "zh-CN");
        assert_eq!(match_locale("zh_Hans"), "zh-CN");
    }

    #[test]
    fn test_unknown_locales_fall_back_to_english() {
        assert_eq!(match_locale("fr-FR"), "en");
        assert_eq!(match_locale(""), "en");
        assert_eq!(match_locale("invalid-lang"), "en");
    }
}

#[cfg(test)]
mod translation_tests {
    use super::*;

    #[test]
    fn test_english_translations() {
        assert_eq!(t!("summary.banner", locale = "en"), "--- Matrix Summary ---");
        assert_eq!(t!("summary.all_clean", locale = "en"), "No accessibility issues found.");
    }

    #[test]
    fn test_chinese_translations() {
        assert_eq!(t!("summary.banner", locale = "zh-CN"), "--- 矩阵摘要 ---");
        assert_eq!(t!("summary.all_clean", locale = "zh-CN"), "未发现无障碍问题。");
    }

    #[test]
    fn test_placeholders_are_interpolated() {
        let en = t!("summary.issues_found", locale = "en", count = 3, cases = 2);
        assert_eq!(en, "3 issue(s) found in 2 test case(s).");

        let zh = t!("simulate.invalid_color", locale = "zh-CN", color = "#xyz");
        assert!(zh.starts_with("'#xyz' 不是十六进制颜色"));
    }

    #[test]
    fn test_unknown_locale_uses_english_fallback() {
        assert_eq!(t!("summary.banner", locale = "fr"), "--- Matrix Summary ---");
    }
}
