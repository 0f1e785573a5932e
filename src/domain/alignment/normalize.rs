//! 单词比较键

/// 计算比较键：小写，仅保留字母和数字
///
/// `"Don't!"` -> `"dont"`，`"—"` -> `""`
pub fn normalize_key(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("Hello,"), "hello");
        assert_eq!(normalize_key("Don't!"), "dont");
        assert_eq!(normalize_key("\"Well-known\""), "wellknown");
        assert_eq!(normalize_key("42"), "42");
        assert_eq!(normalize_key("—"), "");
        assert_eq!(normalize_key("Élan"), "élan");
        assert_eq!(normalize_key("你好。"), "你好");
    }
}
