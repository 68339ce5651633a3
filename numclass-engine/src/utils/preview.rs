//! 规则源码日志预览
use std::fmt::{self, Write};

/// 规则源码的单行预览（用于 trace/warn 日志与未识别规则的错误信息）
/// 多行 def 规则按空白切词后以单个空格拼接，超过 max_chars 个字符时截断并以 … 结尾
pub struct Preview<'a> {
    source: &'a str,
    max_chars: usize,
}

pub fn preview_compact(source: &str, max_chars: usize) -> Preview<'_> {
    Preview { source, max_chars }
}

impl fmt::Display for Preview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut remaining = self.max_chars;
        for (i, word) in self.source.split_whitespace().enumerate() {
            let separator = if i == 0 { None } else { Some(' ') };
            for ch in separator.into_iter().chain(word.chars()) {
                if remaining == 0 {
                    return f.write_char('…');
                }
                f.write_char(ch)?;
                remaining -= 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_collapses_whitespace() {
        let source = "def div7(x):\n    if x % 7:\n        return False\n";
        assert_eq!(
            preview_compact(source, 80).to_string(),
            "def div7(x): if x % 7: return False"
        );
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview_compact("lambda x: x % 5 == 0", 8).to_string(), "lambda x…");
        assert_eq!(preview_compact("prime", 5).to_string(), "prime");
        assert_eq!(preview_compact("  \n ", 5).to_string(), "");
    }
}
