//! 语言检测
//!
//! 调用方未指定语言时，根据输入文本的字符集粗略判断

/// 检测文本语言：含假名为日语，含 CJK 统一表意文字为中文，其余为英语
pub fn detect_language(text: &str) -> &'static str {
    if text.chars().any(is_kana) {
        "ja"
    } else if text.chars().any(is_cjk_ideograph) {
        "zh"
    } else {
        "en"
    }
}

/// 规范化调用方传入的语言提示，空值视为未指定
pub fn language_hint(raw: Option<&str>) -> Option<String> {
    raw.map(|lang| lang.trim().to_lowercase())
        .filter(|lang| !lang.is_empty())
}

#[inline]
fn is_kana(ch: char) -> bool {
    matches!(ch, '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}')
}

#[inline]
fn is_cjk_ideograph(ch: char) -> bool {
    matches!(ch, '\u{4E00}'..='\u{9FFF}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language("Hello world"), "en");
        assert_eq!(detect_language("你好，世界"), "zh");
        assert_eq!(detect_language("こんにちは"), "ja");
        // 汉字与假名混排按日语处理
        assert_eq!(detect_language("日本語のテキスト"), "ja");
        assert_eq!(detect_language(""), "en");
    }

    #[test]
    fn test_language_hint() {
        assert_eq!(language_hint(Some(" EN ")), Some("en".to_string()));
        assert_eq!(language_hint(Some("  ")), None);
        assert_eq!(language_hint(None), None);
    }
}
