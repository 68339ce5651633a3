//! 规则源码词法分析
//! 将 lambda 表达式 / def 函数定义切分为 Token 流
//! def 函数体对缩进敏感：按行计算缩进宽度，输出 Newline / Indent / Dedent

use std::fmt;

use num_bigint::BigInt;

use super::ParseError;

/// 制表符对齐宽度
const TAB_WIDTH: usize = 8;

/// Token 类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Int(BigInt),
    Ident(String),

    // 关键字
    Lambda,
    Def,
    Return,
    If,
    Elif,
    Else,
    And,
    Or,
    Not,
    True,
    False,
    None,
    Pass,

    // 运算符
    Plus,
    Minus,
    Star,
    DoubleStar,
    DoubleSlash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Assign,

    // 分隔符
    LParen,
    RParen,
    Colon,
    Comma,

    // 行结构
    Newline,
    Indent,
    Dedent,
    Eof,
}

impl TokenKind {
    fn keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "lambda" => Self::Lambda,
            "def" => Self::Def,
            "return" => Self::Return,
            "if" => Self::If,
            "elif" => Self::Elif,
            "else" => Self::Else,
            "and" => Self::And,
            "or" => Self::Or,
            "not" => Self::Not,
            "True" => Self::True,
            "False" => Self::False,
            "None" => Self::None,
            "pass" => Self::Pass,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Int(n) => return write!(f, "number {}", n),
            Self::Ident(name) => return write!(f, "name '{}'", name),
            Self::Lambda => "'lambda'",
            Self::Def => "'def'",
            Self::Return => "'return'",
            Self::If => "'if'",
            Self::Elif => "'elif'",
            Self::Else => "'else'",
            Self::And => "'and'",
            Self::Or => "'or'",
            Self::Not => "'not'",
            Self::True => "'True'",
            Self::False => "'False'",
            Self::None => "'None'",
            Self::Pass => "'pass'",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Star => "'*'",
            Self::DoubleStar => "'**'",
            Self::DoubleSlash => "'//'",
            Self::Percent => "'%'",
            Self::EqEq => "'=='",
            Self::NotEq => "'!='",
            Self::Lt => "'<'",
            Self::Le => "'<='",
            Self::Gt => "'>'",
            Self::Ge => "'>='",
            Self::Assign => "'='",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::Colon => "':'",
            Self::Comma => "','",
            Self::Newline => "end of line",
            Self::Indent => "indent",
            Self::Dedent => "dedent",
            Self::Eof => "end of input",
        };
        f.write_str(text)
    }
}

/// 带位置信息的 Token（行列均从1开始）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

/// 词法分析入口
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    Lexer::new().run(source)
}

struct Lexer {
    tokens: Vec<Token>,
    indents: Vec<usize>,
    // 括号嵌套深度，深度>0时换行属于隐式续行
    depth: usize,
    logical_has_tokens: bool,
    last_paren: (usize, usize),
}

impl Lexer {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            indents: vec![0],
            depth: 0,
            logical_has_tokens: false,
            last_paren: (1, 1),
        }
    }

    fn push(&mut self, kind: TokenKind, line: usize, column: usize) {
        if !matches!(kind, TokenKind::Indent | TokenKind::Dedent | TokenKind::Newline) {
            self.logical_has_tokens = true;
        }
        self.tokens.push(Token { kind, line, column });
    }

    fn run(mut self, source: &str) -> Result<Vec<Token>, ParseError> {
        let mut end = (1, 1);

        for (idx, raw_line) in source.lines().enumerate() {
            let line_no = idx + 1;
            let chars: Vec<char> = raw_line.chars().collect();
            end = (line_no, chars.len() + 1);

            // 1. 计算缩进宽度
            let mut width = 0;
            let mut pos = 0;
            while pos < chars.len() {
                match chars[pos] {
                    ' ' => width += 1,
                    '\t' => width = (width / TAB_WIDTH + 1) * TAB_WIDTH,
                    '\x0c' => width = 0,
                    _ => break,
                }
                pos += 1;
            }

            // 空行 / 纯注释行不参与缩进计算
            if pos >= chars.len() || chars[pos] == '#' {
                continue;
            }

            // 2. 逻辑行起始处理缩进
            if self.depth == 0 {
                self.handle_indent(width, line_no, pos + 1)?;
            }

            // 3. 扫描本行 Token
            self.scan_line(&chars, pos, line_no)?;

            // 4. 逻辑行结束
            if self.depth == 0 && self.logical_has_tokens {
                self.push(TokenKind::Newline, line_no, chars.len() + 1);
                self.logical_has_tokens = false;
            }
        }

        if self.depth > 0 {
            let (line, column) = self.last_paren;
            return Err(ParseError::new("'(' was never closed", line, column));
        }

        while self.indents.len() > 1 {
            self.indents.pop();
            self.push(TokenKind::Dedent, end.0, end.1);
        }
        self.push(TokenKind::Eof, end.0, end.1);

        Ok(self.tokens)
    }

    fn handle_indent(&mut self, width: usize, line: usize, column: usize) -> Result<(), ParseError> {
        let current = self.indents.last().copied().unwrap_or(0);
        if width > current {
            self.indents.push(width);
            self.push(TokenKind::Indent, line, column);
            return Ok(());
        }

        while width < self.indents.last().copied().unwrap_or(0) {
            self.indents.pop();
            self.push(TokenKind::Dedent, line, column);
        }
        if width != self.indents.last().copied().unwrap_or(0) {
            return Err(ParseError::new(
                "unindent does not match any outer indentation level",
                line,
                column,
            ));
        }
        Ok(())
    }

    fn scan_line(&mut self, chars: &[char], mut pos: usize, line: usize) -> Result<(), ParseError> {
        let peek_is = |pos: usize, expected: char| chars.get(pos + 1) == Some(&expected);

        while pos < chars.len() {
            let c = chars[pos];
            let column = pos + 1;

            match c {
                ' ' | '\t' | '\x0c' => pos += 1,
                '#' => break,
                '0'..='9' => {
                    let start = pos;
                    while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '_') {
                        pos += 1;
                    }
                    if pos < chars.len() && (chars[pos].is_ascii_alphabetic() || chars[pos] == '_') {
                        return Err(ParseError::new("invalid decimal literal", line, column));
                    }
                    let digits: String = chars[start..pos].iter().filter(|ch| **ch != '_').collect();
                    let value = digits
                        .parse::<BigInt>()
                        .map_err(|_| ParseError::new("invalid decimal literal", line, column))?;
                    self.push(TokenKind::Int(value), line, column);
                }
                c if c.is_ascii_alphabetic() || c == '_' => {
                    let start = pos;
                    while pos < chars.len() && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '_') {
                        pos += 1;
                    }
                    let word: String = chars[start..pos].iter().collect();
                    let kind = TokenKind::keyword(&word).unwrap_or(TokenKind::Ident(word));
                    self.push(kind, line, column);
                }
                '(' => {
                    self.depth += 1;
                    self.last_paren = (line, column);
                    self.push(TokenKind::LParen, line, column);
                    pos += 1;
                }
                ')' => {
                    if self.depth == 0 {
                        return Err(ParseError::new("unmatched ')'", line, column));
                    }
                    self.depth -= 1;
                    self.push(TokenKind::RParen, line, column);
                    pos += 1;
                }
                '*' if peek_is(pos, '*') => {
                    self.push(TokenKind::DoubleStar, line, column);
                    pos += 2;
                }
                '/' if peek_is(pos, '/') => {
                    self.push(TokenKind::DoubleSlash, line, column);
                    pos += 2;
                }
                '/' => {
                    return Err(ParseError::new(
                        "true division '/' is not supported, use '//'",
                        line,
                        column,
                    ));
                }
                '=' if peek_is(pos, '=') => {
                    self.push(TokenKind::EqEq, line, column);
                    pos += 2;
                }
                '!' if peek_is(pos, '=') => {
                    self.push(TokenKind::NotEq, line, column);
                    pos += 2;
                }
                '<' if peek_is(pos, '=') => {
                    self.push(TokenKind::Le, line, column);
                    pos += 2;
                }
                '>' if peek_is(pos, '=') => {
                    self.push(TokenKind::Ge, line, column);
                    pos += 2;
                }
                _ => {
                    let kind = match c {
                        '+' => TokenKind::Plus,
                        '-' => TokenKind::Minus,
                        '*' => TokenKind::Star,
                        '%' => TokenKind::Percent,
                        '=' => TokenKind::Assign,
                        '<' => TokenKind::Lt,
                        '>' => TokenKind::Gt,
                        ':' => TokenKind::Colon,
                        ',' => TokenKind::Comma,
                        other => {
                            return Err(ParseError::new(
                                format!("unexpected character '{}'", other),
                                line,
                                column,
                            ));
                        }
                    };
                    self.push(kind, line, column);
                    pos += 1;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_lambda() {
        assert_eq!(
            kinds("lambda x: x % 5 == 0"),
            vec![
                TokenKind::Lambda,
                TokenKind::Ident("x".into()),
                TokenKind::Colon,
                TokenKind::Ident("x".into()),
                TokenKind::Percent,
                TokenKind::Int(BigInt::from(5)),
                TokenKind::EqEq,
                TokenKind::Int(BigInt::from(0)),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_indented_block() {
        let source = "def f(x):\n    if x:\n        return 1\n    return 2";
        let kinds = kinds(source);
        let indents = kinds.iter().filter(|k| **k == TokenKind::Indent).count();
        let dedents = kinds.iter().filter(|k| **k == TokenKind::Dedent).count();
        assert_eq!(indents, 2);
        assert_eq!(dedents, 2);
        assert_eq!(kinds.last(), Some(&TokenKind::Eof));
    }

    #[test]
    fn test_blank_and_comment_lines_are_ignored() {
        let source = "def f(x):\n\n    # 注释\n    return x  # 行尾注释\n";
        let kinds = kinds(source);
        assert_eq!(kinds.iter().filter(|k| **k == TokenKind::Newline).count(), 2);
    }

    #[test]
    fn test_parentheses_join_lines() {
        let kinds = kinds("lambda x: (x %\n 3 == 0)");
        assert_eq!(kinds.iter().filter(|k| **k == TokenKind::Newline).count(), 1);
        assert!(!kinds.contains(&TokenKind::Indent));
    }

    #[test]
    fn test_number_with_separators() {
        assert_eq!(
            kinds("1_000_000")[0],
            TokenKind::Int(BigInt::from(1_000_000))
        );
    }

    #[test]
    fn test_true_division_is_rejected() {
        let err = tokenize("lambda x: x / 2").unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 13);
        assert!(err.message.contains("'//'"));
    }

    #[test]
    fn test_bad_dedent() {
        let err = tokenize("def f(x):\n    if x:\n        return 1\n  return 2").unwrap_err();
        assert_eq!(err.line, 4);
        assert!(err.message.contains("unindent"));
    }

    #[test]
    fn test_unclosed_paren() {
        let err = tokenize("lambda x: (x + 1").unwrap_err();
        assert_eq!((err.line, err.column), (1, 11));
    }
}
