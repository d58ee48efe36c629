//! 文本提取工具
//!
//! 数字、话题、提及都从已取得的文本中解析,不再访问页面

use regex::Regex;
use std::sync::OnceLock;

fn digits_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("有效的数字正则"))
}

fn hashtag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#(\w+)").expect("有效的话题正则"))
}

fn mention_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@(\w+)").expect("有效的提及正则"))
}

/// 提取第一段连续数字
///
/// 例: "12 Replies. Reply" → Some(12); "Reply" → None
///
/// 没有数字时返回 None 而不是 0: 只有标签里明确写着 0 才报告 0
pub fn extract_digits(text: &str) -> Option<u64> {
    digits_regex()
        .find(text)
        .and_then(|m| m.as_str().parse::<u64>().ok())
}

/// 提取正文中的话题 (不含 # 前缀),保持出现顺序
pub fn extract_hashtags(content: &str) -> Vec<String> {
    capture_all(hashtag_regex(), content)
}

/// 提取正文中的提及 (不含 @ 前缀),保持出现顺序
pub fn extract_mentions(content: &str) -> Vec<String> {
    capture_all(mention_regex(), content)
}

fn capture_all(re: &Regex, text: &str) -> Vec<String> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// 取多行文本的第一行
pub fn first_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or("")
}
