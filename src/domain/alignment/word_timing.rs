//! Alignment Context - Value Objects

use serde::{Deserialize, Serialize};

/// 对齐后端输出的原始 token（时间单位：秒）
///
/// token 是后端自己的转写单元，不保证与原文单词一一对应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAlignmentToken {
    pub token: String,
    pub start: f64,
    pub end: f64,
}

impl RawAlignmentToken {
    pub fn new(token: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            token: token.into(),
            start,
            end,
        }
    }
}

/// 单词时间戳（时间单位：秒）
///
/// 不变量（对序列）：
/// - 按 start 非递减
/// - start <= end
/// - end[i] <= start[i + 1]，允许停顿间隙
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

impl WordTiming {
    pub fn new(word: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            word: word.into(),
            start,
            end,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// 检查序列是否满足单调、无重叠约束
pub fn is_well_ordered(words: &[WordTiming]) -> bool {
    words.iter().all(|w| w.start <= w.end)
        && words
            .windows(2)
            .all(|pair| pair[0].start <= pair[1].start && pair[0].end <= pair[1].start)
}

/// 四舍五入到毫秒
pub fn round_millis(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_ordered() {
        let ok = vec![
            WordTiming::new("a", 0.0, 0.2),
            WordTiming::new("b", 0.3, 0.5),
            WordTiming::new("c", 0.5, 0.5),
        ];
        assert!(is_well_ordered(&ok));

        let overlap = vec![WordTiming::new("a", 0.0, 0.4), WordTiming::new("b", 0.3, 0.5)];
        assert!(!is_well_ordered(&overlap));

        let inverted = vec![WordTiming::new("a", 0.4, 0.2)];
        assert!(!is_well_ordered(&inverted));

        assert!(is_well_ordered(&[]));
    }

    #[test]
    fn test_round_millis() {
        assert_eq!(round_millis(0.12345), 0.123);
        assert_eq!(round_millis(0.1236), 0.124);
        assert_eq!(round_millis(0.32), 0.32);
    }
}
