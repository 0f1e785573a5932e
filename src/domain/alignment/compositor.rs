//! 单词对齐合成器
//!
//! 把对齐后端的 token 流映射回调用方原文的单词序列。
//!
//! 后端转写与原文不一定一致（数字展开、同音替换、插入语气词、漏词），
//! 这里的策略：
//! 1. 原文按空白分词，每个词计算比较键
//! 2. token 流同样分词、清洗、按开始时间稳定排序
//! 3. 贪心双游标匹配；不匹配时在有限窗口内向前查找重新同步
//! 4. 找不到匹配的词按位置在相邻锚点之间线性插值
//! 5. 后处理保证单调、无重叠
//!
//! 纯函数，无隐藏状态：相同输入总是得到相同输出。

use super::normalize::normalize_key;
use super::word_timing::{round_millis, RawAlignmentToken, WordTiming};

/// 默认重新同步窗口
pub const RESYNC_WINDOW: usize = 3;

/// 原文单词
struct Word<'a> {
    text: &'a str,
    key: String,
}

/// 清洗后的 token
#[derive(Debug, Clone)]
struct Token {
    key: String,
    start: f64,
    end: f64,
}

type Span = (f64, f64);

/// 合成单词时间戳（默认窗口）
///
/// 输出长度总是等于 `original_text` 的空白分词数；空文本返回空序列。
/// `audio_duration` 用于尾部插值以及完全没有 token 时的均分。
pub fn compose(
    original_text: &str,
    raw_tokens: &[RawAlignmentToken],
    audio_duration: f64,
) -> Vec<WordTiming> {
    compose_with_window(original_text, raw_tokens, audio_duration, RESYNC_WINDOW)
}

/// 合成单词时间戳（指定重新同步窗口，最小为 1）
pub fn compose_with_window(
    original_text: &str,
    raw_tokens: &[RawAlignmentToken],
    audio_duration: f64,
    window: usize,
) -> Vec<WordTiming> {
    let words: Vec<Word<'_>> = original_text
        .split_whitespace()
        .map(|text| Word {
            text,
            key: normalize_key(text),
        })
        .collect();

    if words.is_empty() {
        return Vec::new();
    }

    let tokens = segment_tokens(raw_tokens);
    let duration = tokens
        .iter()
        .map(|t| t.end)
        .fold(sanitize_time(audio_duration), f64::max);

    let matched = match_words(&words, &tokens, window.max(1));
    let spans = interpolate(&matched, duration);

    finalize(words.iter().map(|w| w.text), spans)
}

/// 将原始 token 直接整理为单词时间戳（没有参考文本时使用）
///
/// 去掉首尾空白和空 token，时间清洗后同样满足单调、无重叠约束
pub fn words_from_tokens(raw_tokens: &[RawAlignmentToken]) -> Vec<WordTiming> {
    let mut cleaned: Vec<(&str, Span)> = raw_tokens
        .iter()
        .filter_map(|t| {
            let word = t.token.trim();
            (!word.is_empty()).then(|| (word, sanitize_span(t.start, t.end)))
        })
        .collect();
    cleaned.sort_by(|a, b| a.1 .0.total_cmp(&b.1 .0));

    let (texts, spans): (Vec<&str>, Vec<Span>) = cleaned.into_iter().unzip();
    finalize(texts.into_iter(), spans)
}

/// token 分词：多词 token 均分时间；丢弃标点等空键 token
fn segment_tokens(raw_tokens: &[RawAlignmentToken]) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(raw_tokens.len());

    for raw in raw_tokens {
        let (start, end) = sanitize_span(raw.start, raw.end);
        let parts: Vec<&str> = raw.token.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        let step = (end - start) / parts.len() as f64;
        for (idx, part) in parts.iter().enumerate() {
            let key = normalize_key(part);
            if key.is_empty() {
                continue;
            }
            let part_start = start + step * idx as f64;
            let part_end = if idx + 1 == parts.len() {
                end
            } else {
                start + step * (idx + 1) as f64
            };
            tokens.push(Token {
                key,
                start: part_start,
                end: part_end,
            });
        }
    }

    // sort_by 是稳定排序，时间相同的 token 保持后端原顺序
    tokens.sort_by(|a, b| a.start.total_cmp(&b.start));
    tokens
}

fn sanitize_time(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn sanitize_span(start: f64, end: f64) -> Span {
    let start = sanitize_time(start);
    let end = if end.is_finite() { end.max(start) } else { start };
    (start, end)
}

/// 贪心匹配，返回每个原文单词的时间段（未匹配为 None）
fn match_words(words: &[Word<'_>], tokens: &[Token], window: usize) -> Vec<Option<Span>> {
    let mut spans: Vec<Option<Span>> = vec![None; words.len()];
    let (mut i, mut j) = (0, 0);

    while i < words.len() && j < tokens.len() {
        // 纯标点的词没有可比较内容，留给插值
        if words[i].key.is_empty() {
            i += 1;
            continue;
        }

        if words[i].key == tokens[j].key {
            spans[i] = Some((tokens[j].start, tokens[j].end));
            i += 1;
            j += 1;
            continue;
        }

        // 一个词被后端拆成多个 token
        if let Some(n) = merged_token_run(&words[i].key, &tokens[j..], window) {
            spans[i] = Some((tokens[j].start, tokens[j + n - 1].end));
            i += 1;
            j += n;
            continue;
        }

        // 多个词被后端合成一个 token
        if let Some(n) = merged_word_run(&words[i..], &tokens[j].key, window) {
            split_span(&words[i..i + n], (tokens[j].start, tokens[j].end), &mut spans[i..i + n]);
            i += n;
            j += 1;
            continue;
        }

        match resync(words, tokens, i, j, window) {
            Some((skipped_words, skipped_tokens)) => {
                // 等长替换（如同音词）直接沿用被替换 token 的时间
                if skipped_words == skipped_tokens {
                    for k in 0..skipped_words {
                        if !words[i + k].key.is_empty() {
                            let token = &tokens[j + k];
                            spans[i + k] = Some((token.start, token.end));
                        }
                    }
                }
                i += skipped_words;
                j += skipped_tokens;
            }
            None => i += 1,
        }
    }

    spans
}

/// 连续 n (2..=window) 个 token 拼接后等于 key
fn merged_token_run(key: &str, tokens: &[Token], window: usize) -> Option<usize> {
    let mut joined = String::new();
    for (idx, token) in tokens.iter().take(window).enumerate() {
        joined.push_str(&token.key);
        if !key.starts_with(joined.as_str()) {
            return None;
        }
        if idx > 0 && joined.len() == key.len() {
            return Some(idx + 1);
        }
    }
    None
}

/// 连续 n (2..=window) 个原文单词拼接后等于 key
fn merged_word_run(words: &[Word<'_>], key: &str, window: usize) -> Option<usize> {
    let mut joined = String::new();
    for (idx, word) in words.iter().take(window).enumerate() {
        if word.key.is_empty() {
            return None;
        }
        joined.push_str(&word.key);
        if !key.starts_with(joined.as_str()) {
            return None;
        }
        if idx > 0 && joined.len() == key.len() {
            return Some(idx + 1);
        }
    }
    None
}

/// 按比较键长度把一个时间段分给多个单词
fn split_span(words: &[Word<'_>], span: Span, out: &mut [Option<Span>]) {
    let total: usize = words.iter().map(|w| w.key.chars().count()).sum();
    let width = span.1 - span.0;
    let mut cursor = span.0;
    let mut consumed = 0usize;

    for (idx, word) in words.iter().enumerate() {
        consumed += word.key.chars().count();
        let end = if idx + 1 == words.len() {
            span.1
        } else {
            span.0 + width * consumed as f64 / total.max(1) as f64
        };
        out[idx] = Some((cursor, end));
        cursor = end;
    }
}

/// 在窗口内寻找最近的同步点 (跳过的单词数, 跳过的 token 数)
///
/// 按跳过总数从小到大搜索；总数相同时优先跳过 token（后端插入语气词更常见）
fn resync(
    words: &[Word<'_>],
    tokens: &[Token],
    i: usize,
    j: usize,
    window: usize,
) -> Option<(usize, usize)> {
    for total in 1..=window * 2 {
        for skipped_words in 0..=total.min(window) {
            let skipped_tokens = total - skipped_words;
            if skipped_tokens > window {
                continue;
            }
            let (wi, tj) = (i + skipped_words, j + skipped_tokens);
            if wi >= words.len() || tj >= tokens.len() {
                continue;
            }
            if !words[wi].key.is_empty() && words[wi].key == tokens[tj].key {
                return Some((skipped_words, skipped_tokens));
            }
        }
    }
    None
}

/// 未匹配的连续单词在左右锚点之间按位置均分
fn interpolate(matched: &[Option<Span>], duration: f64) -> Vec<Span> {
    let mut spans = Vec::with_capacity(matched.len());
    let mut prev_end = 0.0_f64;
    let mut k = 0;

    while k < matched.len() {
        if let Some(span) = matched[k] {
            spans.push(span);
            prev_end = span.1;
            k += 1;
            continue;
        }

        let run_end = (k..matched.len())
            .find(|&m| matched[m].is_some())
            .unwrap_or(matched.len());
        let right = matched
            .get(run_end)
            .copied()
            .flatten()
            .map(|(start, _)| start)
            .unwrap_or(duration);

        let left = prev_end;
        let right = right.max(left);
        let run_len = (run_end - k) as f64;
        for pos in 0..(run_end - k) {
            let start = left + (right - left) * pos as f64 / run_len;
            let end = left + (right - left) * (pos + 1) as f64 / run_len;
            spans.push((start, end));
        }

        prev_end = right;
        k = run_end;
    }

    spans
}

/// 后处理：start 单调、end >= start、截断重叠、毫秒取整
fn finalize<'a>(texts: impl Iterator<Item = &'a str>, spans: Vec<Span>) -> Vec<WordTiming> {
    let mut timings: Vec<WordTiming> = texts
        .zip(spans)
        .map(|(text, (start, end))| WordTiming::new(text, start, end))
        .collect();

    let mut floor = 0.0_f64;
    for timing in timings.iter_mut() {
        timing.start = timing.start.max(floor);
        timing.end = timing.end.max(timing.start);
        floor = timing.start;
    }

    for idx in 1..timings.len() {
        let next_start = timings[idx].start;
        let prev = &mut timings[idx - 1];
        if prev.end > next_start {
            prev.end = next_start;
        }
    }

    // 取整是单调的，不会破坏上面的约束
    for timing in timings.iter_mut() {
        timing.start = round_millis(timing.start);
        timing.end = round_millis(timing.end);
    }

    timings
}
