//! 规则语法树定义
use num_bigint::BigInt;

/// 一元运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
}

/// 二元算术运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    FloorDiv,
    Mod,
    Pow,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::FloorDiv => "//",
            Self::Mod => "%",
            Self::Pow => "**",
        }
    }
}

/// 比较运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// 布尔连接符（短路求值，返回操作数本身）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

/// 表达式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Int(BigInt),
    Bool(bool),
    None,
    Name(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// 链式比较：a < b < c
    Compare {
        first: Box<Expr>,
        rest: Vec<(CmpOp, Expr)>,
    },
    Logic {
        op: BoolOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// 条件表达式：then if cond else otherwise
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    /// 单参数调用（abs 或函数自身递归）
    Call {
        func: String,
        arg: Box<Expr>,
    },
}

/// 语句（def 函数体）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    If {
        branches: Vec<(Expr, Vec<Stmt>)>,
        otherwise: Vec<Stmt>,
    },
    Return(Option<Expr>),
    Assign {
        target: String,
        value: Expr,
    },
    Expr(Expr),
    Pass,
}

/// 匿名单参数谓词：lambda x: <expr>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lambda {
    pub param: String,
    pub body: Expr,
}

/// 具名单参数函数：def name(x): <suite>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    pub name: String,
    pub param: String,
    pub body: Vec<Stmt>,
}
