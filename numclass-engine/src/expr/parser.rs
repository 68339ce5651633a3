//! 规则源码语法分析（递归下降）
//! 仅支持受限子集：单参数 lambda 表达式，以及由 if/elif/else、赋值、return 组成的单参数 def

use super::ast::{BinaryOp, BoolOp, CmpOp, Expr, FunctionDef, Lambda, Stmt, UnaryOp};
use super::lexer::{tokenize, Token, TokenKind};
use super::ParseError;

/// 表达式最大嵌套层数（括号、一元运算、运算符链均计入）
pub const MAX_NESTING: usize = 100;
/// if 语句块最大嵌套层数
pub const MAX_BLOCKS: usize = 20;

/// 解析 lambda 规则源码，允许外层包裹括号：(lambda x: x % 2 == 0)
pub fn parse_lambda(source: &str) -> Result<Lambda, ParseError> {
    let tokens = tokenize(source.trim())?;
    let mut parser = Parser::new(tokens);

    let mut wrapped = 0;
    while parser.eat(&TokenKind::LParen) {
        wrapped += 1;
    }
    let lambda = parser.lambda()?;
    for _ in 0..wrapped {
        parser.expect(&TokenKind::RParen)?;
    }

    parser.skip_newlines();
    parser.expect_eof()?;
    Ok(lambda)
}

/// 解析 def 规则源码
pub fn parse_function(source: &str) -> Result<FunctionDef, ParseError> {
    let tokens = tokenize(source.trim_end())?;
    let mut parser = Parser::new(tokens);
    let function = parser.function_def()?;
    parser.expect_eof()?;
    Ok(function)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    // 当前表达式嵌套层数，递归下降与语法树深度均受其约束
    depth: usize,
    blocks: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            blocks: 0,
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error_here("too many nested parentheses"));
        }
        self.depth += 1;
        Ok(())
    }

    fn error_here(&self, message: &str) -> ParseError {
        let token = self.peek();
        ParseError::new(message, token.line, token.column)
    }

    fn leave(&mut self, levels: usize) {
        self.depth -= levels;
    }

    // ======================== Token 游标 ========================
    fn peek(&self) -> &Token {
        // tokenize 保证末尾必有 Eof
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn peek_second_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos + 1).map(|t| &t.kind)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self) -> ParseError {
        let token = self.peek();
        ParseError::new(format!("unexpected {}", token.kind), token.line, token.column)
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let token = self.peek();
            Err(ParseError::new(
                format!("expected {}, found {}", kind, token.kind),
                token.line,
                token.column,
            ))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            other => {
                let token = self.peek();
                Err(ParseError::new(
                    format!("expected {}, found {}", what, other),
                    token.line,
                    token.column,
                ))
            }
        }
    }

    fn skip_newlines(&mut self) {
        while self.eat(&TokenKind::Newline) {}
    }

    fn expect_eof(&mut self) -> Result<(), ParseError> {
        if self.check(&TokenKind::Eof) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    // ======================== 顶层结构 ========================
    fn lambda(&mut self) -> Result<Lambda, ParseError> {
        self.expect(&TokenKind::Lambda)?;
        let param = self.single_param(&TokenKind::Colon)?;
        self.expect(&TokenKind::Colon)?;
        let body = self.expr()?;
        Ok(Lambda { param, body })
    }

    fn function_def(&mut self) -> Result<FunctionDef, ParseError> {
        self.expect(&TokenKind::Def)?;
        let name = self.expect_ident("function name")?;
        self.expect(&TokenKind::LParen)?;
        let param = self.single_param(&TokenKind::RParen)?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Colon)?;
        let body = self.suite()?;
        Ok(FunctionDef { name, param, body })
    }

    /// 读取唯一参数名，零参数或多参数均视为语法错误
    fn single_param(&mut self, closer: &TokenKind) -> Result<String, ParseError> {
        if self.check(closer) {
            let token = self.peek();
            return Err(ParseError::new(
                "rule must take exactly one parameter",
                token.line,
                token.column,
            ));
        }
        let param = self.expect_ident("parameter name")?;
        if self.check(&TokenKind::Comma) {
            let token = self.peek();
            return Err(ParseError::new(
                "rule must take exactly one parameter",
                token.line,
                token.column,
            ));
        }
        Ok(param)
    }

    // ======================== 语句 ========================
    fn suite(&mut self) -> Result<Vec<Stmt>, ParseError> {
        if !self.eat(&TokenKind::Newline) {
            // 单行函数体：def f(x): return x
            let stmt = self.simple_stmt()?;
            self.end_of_statement()?;
            return Ok(vec![stmt]);
        }

        if !self.eat(&TokenKind::Indent) {
            let token = self.peek();
            return Err(ParseError::new("expected an indented block", token.line, token.column));
        }

        let mut body = Vec::new();
        while !self.check(&TokenKind::Dedent) && !self.check(&TokenKind::Eof) {
            body.push(self.stmt()?);
        }
        self.eat(&TokenKind::Dedent);
        Ok(body)
    }

    fn stmt(&mut self) -> Result<Stmt, ParseError> {
        if self.eat(&TokenKind::If) {
            if self.blocks >= MAX_BLOCKS {
                return Err(self.error_here("too many statically nested blocks"));
            }
            self.blocks += 1;
            let stmt = self.if_stmt();
            self.blocks -= 1;
            return stmt;
        }
        let stmt = self.simple_stmt()?;
        self.end_of_statement()?;
        Ok(stmt)
    }

    fn end_of_statement(&mut self) -> Result<(), ParseError> {
        match self.peek_kind() {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof | TokenKind::Dedent => Ok(()),
            _ => Err(self.unexpected()),
        }
    }

    fn if_stmt(&mut self) -> Result<Stmt, ParseError> {
        let mut branches = Vec::new();

        let cond = self.expr()?;
        self.expect(&TokenKind::Colon)?;
        branches.push((cond, self.suite()?));

        while self.eat(&TokenKind::Elif) {
            let cond = self.expr()?;
            self.expect(&TokenKind::Colon)?;
            branches.push((cond, self.suite()?));
        }

        let otherwise = if self.eat(&TokenKind::Else) {
            self.expect(&TokenKind::Colon)?;
            self.suite()?
        } else {
            Vec::new()
        };

        Ok(Stmt::If { branches, otherwise })
    }

    fn simple_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Return => {
                self.advance();
                if matches!(
                    self.peek_kind(),
                    TokenKind::Newline | TokenKind::Eof | TokenKind::Dedent
                ) {
                    Ok(Stmt::Return(None))
                } else {
                    Ok(Stmt::Return(Some(self.expr()?)))
                }
            }
            TokenKind::Pass => {
                self.advance();
                Ok(Stmt::Pass)
            }
            TokenKind::Ident(target) if self.peek_second_kind() == Some(&TokenKind::Assign) => {
                self.advance();
                self.advance();
                let value = self.expr()?;
                Ok(Stmt::Assign { target, value })
            }
            TokenKind::Def | TokenKind::Lambda | TokenKind::Elif | TokenKind::Else => {
                Err(self.unexpected())
            }
            _ => Ok(Stmt::Expr(self.expr()?)),
        }
    }

    // ======================== 表达式（优先级由低到高） ========================
    fn expr(&mut self) -> Result<Expr, ParseError> {
        self.enter()?;
        let expr = self.conditional();
        self.leave(1);
        expr
    }

    fn conditional(&mut self) -> Result<Expr, ParseError> {
        let then = self.or_expr()?;
        if !self.eat(&TokenKind::If) {
            return Ok(then);
        }
        let cond = self.or_expr()?;
        self.expect(&TokenKind::Else)?;
        let otherwise = self.expr()?;
        Ok(Expr::Conditional {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn or_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.and_expr()?;
        let mut chained = 0;
        while self.eat(&TokenKind::Or) {
            // 左结合链每多一个运算符，语法树加深一层
            self.enter()?;
            chained += 1;
            let right = self.and_expr()?;
            left = Expr::Logic {
                op: BoolOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        self.leave(chained);
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.not_expr()?;
        let mut chained = 0;
        while self.eat(&TokenKind::And) {
            self.enter()?;
            chained += 1;
            let right = self.not_expr()?;
            left = Expr::Logic {
                op: BoolOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        self.leave(chained);
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&TokenKind::Not) {
            self.enter()?;
            let operand = self.not_expr();
            self.leave(1);
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand?),
            });
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let first = self.arith()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => CmpOp::Eq,
                TokenKind::NotEq => CmpOp::NotEq,
                TokenKind::Lt => CmpOp::Lt,
                TokenKind::Le => CmpOp::Le,
                TokenKind::Gt => CmpOp::Gt,
                TokenKind::Ge => CmpOp::Ge,
                _ => break,
            };
            self.advance();
            rest.push((op, self.arith()?));
        }

        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare {
                first: Box::new(first),
                rest,
            })
        }
    }

    fn arith(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.term()?;
        let mut chained = 0;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            self.enter()?;
            chained += 1;
            let right = self.term()?;
            left = binary(op, left, right);
        }
        self.leave(chained);
        Ok(left)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.factor()?;
        let mut chained = 0;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::DoubleSlash => BinaryOp::FloorDiv,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            self.enter()?;
            chained += 1;
            let right = self.factor()?;
            left = binary(op, left, right);
        }
        self.leave(chained);
        Ok(left)
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Pos,
            _ => return self.power(),
        };
        self.advance();
        self.enter()?;
        let operand = self.factor();
        self.leave(1);
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand?),
        })
    }

    fn power(&mut self) -> Result<Expr, ParseError> {
        let base = self.atom()?;
        if self.eat(&TokenKind::DoubleStar) {
            // 右结合：2 ** -1 / 2 ** 3 ** 2
            self.enter()?;
            let exponent = self.factor();
            self.leave(1);
            return Ok(binary(BinaryOp::Pow, base, exponent?));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Int(value) => {
                self.advance();
                Ok(Expr::Int(value))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Bool(false))
            }
            TokenKind::None => {
                self.advance();
                Ok(Expr::None)
            }
            TokenKind::Ident(name) => {
                self.advance();
                if !self.eat(&TokenKind::LParen) {
                    return Ok(Expr::Name(name));
                }
                let arg = self.expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(Expr::Call {
                    func: name,
                    arg: Box::new(arg),
                })
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(inner)
            }
            _ => Err(self.unexpected()),
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn test_parse_simple_lambda() {
        let lambda = parse_lambda("lambda x: x % 5 == 0").unwrap();
        assert_eq!(lambda.param, "x");
        assert_eq!(
            lambda.body,
            Expr::Compare {
                first: Box::new(binary(
                    BinaryOp::Mod,
                    Expr::Name("x".into()),
                    Expr::Int(BigInt::from(5))
                )),
                rest: vec![(CmpOp::Eq, Expr::Int(BigInt::from(0)))],
            }
        );
    }

    #[test]
    fn test_incomplete_lambda_reports_position() {
        let err = parse_lambda("lambda x: x % 5 == ").unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 19);
        assert_eq!(
            err.to_string(),
            "invalid syntax: unexpected end of line (line 1, column 19)"
        );
    }

    #[test]
    fn test_lambda_arity_is_checked() {
        assert!(parse_lambda("lambda: True").unwrap_err().message.contains("exactly one"));
        assert!(parse_lambda("lambda a, b: a").unwrap_err().message.contains("exactly one"));
    }

    #[test]
    fn test_parse_multiline_function() {
        let source = "def div7(x):\n    if x % 7:\n        return False\n    else:\n        return True";
        let function = parse_function(source).unwrap();
        assert_eq!(function.name, "div7");
        assert_eq!(function.param, "x");
        assert_eq!(function.body.len(), 1);
        match &function.body[0] {
            Stmt::If { branches, otherwise } => {
                assert_eq!(branches.len(), 1);
                assert_eq!(otherwise, &vec![Stmt::Return(Some(Expr::Bool(true)))]);
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_broken_function_reports_line_two() {
        let source = "def div7(x):\n    if x % :\n        return False\n    else:\n        return True";
        let err = parse_function(source).unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_single_line_function_and_elif() {
        let function = parse_function("def f(n): return n > 3").unwrap();
        assert_eq!(function.body.len(), 1);

        let source = "def g(n):\n    r = n % 3\n    if r == 0:\n        return 1\n    elif r == 1:\n        pass\n    return 0\n";
        let function = parse_function(source).unwrap();
        assert_eq!(function.body.len(), 3);
        assert!(matches!(&function.body[1], Stmt::If { branches, .. } if branches.len() == 2));
    }

    #[test]
    fn test_power_binds_tighter_than_unary_minus() {
        let lambda = parse_lambda("lambda x: -x ** 2").unwrap();
        assert!(matches!(lambda.body, Expr::Unary { op: UnaryOp::Neg, .. }));
    }

    #[test]
    fn test_wrapped_lambda() {
        let lambda = parse_lambda("(lambda x: x % 2 == 0)").unwrap();
        assert_eq!(lambda.param, "x");
        assert!(parse_lambda("((lambda n: n > 1))").is_ok());
        assert!(parse_lambda("(lambda x: x) )").is_err());
    }

    #[test]
    fn test_nesting_is_limited() {
        assert!(parse_lambda(&format!("lambda x: {}x{}", "(".repeat(50), ")".repeat(50))).is_ok());

        let err = parse_lambda(&format!("lambda x: {}x{}", "(".repeat(150), ")".repeat(150))).unwrap_err();
        assert_eq!(err.message, "too many nested parentheses");
        assert_eq!(err.line, 1);

        assert!(parse_lambda(&format!("lambda x: {}x", "-".repeat(150))).is_err());
        assert!(parse_lambda(&format!("lambda x: {}x", "not ".repeat(150))).is_err());
        assert!(parse_lambda(&format!("lambda x: x{}", " + x".repeat(150))).is_err());
        assert!(parse_lambda(&format!("lambda x: x{}", " ** x".repeat(150))).is_err());
    }

    #[test]
    fn test_nested_if_is_limited() {
        let mut source = String::from("def f(x):\n");
        for level in 1..=30 {
            source.push_str(&format!("{}if x:\n", " ".repeat(level)));
        }
        source.push_str(&format!("{}return x", " ".repeat(31)));
        assert_eq!(parse_function(&source).unwrap_err().message, "too many statically nested blocks");
    }

    #[test]
    fn test_trailing_statement_after_def_is_rejected() {
        let err = parse_function("def f(x):\n    return x\nf(3)").unwrap_err();
        assert_eq!(err.line, 3);
    }
}
