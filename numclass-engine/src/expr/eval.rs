//! 受限规则解释器
//! 仅操作单个整数参数及函数内局部变量，无任何 I/O 与全局状态
//! 整除 / 取模采用向下取整约定（余数符号与除数一致）：-7 % 5 == 3，-7 // 2 == -4

use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};
use rustc_hash::FxHashMap;
use thiserror::Error;

use super::ast::{BinaryOp, BoolOp, CmpOp, Expr, FunctionDef, Lambda, Stmt, UnaryOp};

/// 最大递归深度
pub const MAX_CALL_DEPTH: usize = 64;
/// `**` 允许的最大指数
pub const MAX_EXPONENT: u32 = 4096;
/// 表达式求值最大嵌套深度（跨递归调用累计）
pub const MAX_EVAL_DEPTH: usize = 500;

/// 求值错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("integer division or modulo by zero")]
    DivisionByZero,

    #[error("name '{0}' is not defined")]
    UndefinedName(String),

    #[error("'{0}' object is not callable")]
    NotCallable(&'static str),

    #[error("unsupported operand type(s) for {op}: '{left}' and '{right}'")]
    UnsupportedOperand {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("bad operand type for unary {op}: '{operand}'")]
    BadUnaryOperand {
        op: &'static str,
        operand: &'static str,
    },

    #[error("'{op}' not supported between instances of '{left}' and '{right}'")]
    Unorderable {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("negative exponents are not supported")]
    NegativeExponent,

    #[error("exponent exceeds the limit of {}", MAX_EXPONENT)]
    ExponentTooLarge,

    #[error("maximum recursion depth exceeded")]
    RecursionLimit,

    #[error("expression is nested too deeply")]
    NestingLimit,
}

/// 运行时值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(BigInt),
    Bool(bool),
    None,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::None => "NoneType",
        }
    }

    /// 真值判定：非零整数、True 为真
    pub fn truthy(&self) -> bool {
        match self {
            Self::Int(n) => !n.is_zero(),
            Self::Bool(b) => *b,
            Self::None => false,
        }
    }

    /// 数值视图（bool 按 0/1 参与运算）
    fn as_int(&self) -> Option<BigInt> {
        match self {
            Self::Int(n) => Some(n.clone()),
            Self::Bool(b) => Some(BigInt::from(u8::from(*b))),
            Self::None => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::None => f.write_str("None"),
        }
    }
}

/// 语句执行流向
enum Flow {
    Next,
    Return(Value),
}

type Scope = FxHashMap<String, Value>;

/// 调用 lambda 谓词
pub fn call_lambda(lambda: &Lambda, arg: &BigInt) -> Result<Value, EvalError> {
    let mut scope = Scope::default();
    scope.insert(lambda.param.clone(), Value::Int(arg.clone()));
    Interpreter::new(None).eval(&lambda.body, &scope)
}

/// 调用 def 谓词
pub fn call_function(function: &FunctionDef, arg: &BigInt) -> Result<Value, EvalError> {
    Interpreter::new(Some(function)).invoke(Value::Int(arg.clone()))
}

struct Interpreter<'a> {
    // 当前可递归调用的函数（lambda 无名称，不可自调用）
    function: Option<&'a FunctionDef>,
    depth: usize,
    eval_depth: usize,
}

impl<'a> Interpreter<'a> {
    fn new(function: Option<&'a FunctionDef>) -> Self {
        Self {
            function,
            depth: 0,
            eval_depth: 0,
        }
    }

    fn invoke(&mut self, arg: Value) -> Result<Value, EvalError> {
        let Some(function) = self.function else {
            return Ok(Value::None);
        };
        if self.depth >= MAX_CALL_DEPTH {
            return Err(EvalError::RecursionLimit);
        }

        self.depth += 1;
        let mut scope = Scope::default();
        scope.insert(function.param.clone(), arg);
        let flow = self.exec_block(&function.body, &mut scope);
        self.depth -= 1;

        match flow? {
            Flow::Return(value) => Ok(value),
            Flow::Next => Ok(Value::None),
        }
    }

    // ======================== 语句执行 ========================
    fn exec_block(&mut self, body: &[Stmt], scope: &mut Scope) -> Result<Flow, EvalError> {
        for stmt in body {
            if let Flow::Return(value) = self.exec(stmt, scope)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Next)
    }

    fn exec(&mut self, stmt: &Stmt, scope: &mut Scope) -> Result<Flow, EvalError> {
        match stmt {
            Stmt::Return(None) => Ok(Flow::Return(Value::None)),
            Stmt::Return(Some(expr)) => Ok(Flow::Return(self.eval(expr, scope)?)),
            Stmt::Assign { target, value } => {
                let value = self.eval(value, scope)?;
                scope.insert(target.clone(), value);
                Ok(Flow::Next)
            }
            Stmt::Expr(expr) => {
                self.eval(expr, scope)?;
                Ok(Flow::Next)
            }
            Stmt::Pass => Ok(Flow::Next),
            Stmt::If { branches, otherwise } => {
                for (cond, body) in branches {
                    if self.eval(cond, scope)?.truthy() {
                        return self.exec_block(body, scope);
                    }
                }
                self.exec_block(otherwise, scope)
            }
        }
    }

    // ======================== 表达式求值 ========================
    fn eval(&mut self, expr: &Expr, scope: &Scope) -> Result<Value, EvalError> {
        if self.eval_depth >= MAX_EVAL_DEPTH {
            return Err(EvalError::NestingLimit);
        }
        self.eval_depth += 1;
        let value = self.eval_node(expr, scope);
        self.eval_depth -= 1;
        value
    }

    fn eval_node(&mut self, expr: &Expr, scope: &Scope) -> Result<Value, EvalError> {
        match expr {
            Expr::Int(n) => Ok(Value::Int(n.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::None => Ok(Value::None),
            Expr::Name(name) => scope
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UndefinedName(name.clone())),
            Expr::Unary { op, operand } => {
                let value = self.eval(operand, scope)?;
                unary(*op, value)
            }
            Expr::Binary { op, left, right } => {
                let left = self.eval(left, scope)?;
                let right = self.eval(right, scope)?;
                arithmetic(*op, &left, &right)
            }
            Expr::Compare { first, rest } => {
                let mut left = self.eval(first, scope)?;
                for (op, right) in rest {
                    let right = self.eval(right, scope)?;
                    if !compare(*op, &left, &right)? {
                        return Ok(Value::Bool(false));
                    }
                    left = right;
                }
                Ok(Value::Bool(true))
            }
            Expr::Logic { op, left, right } => {
                let left = self.eval(left, scope)?;
                match (op, left.truthy()) {
                    (BoolOp::And, false) | (BoolOp::Or, true) => Ok(left),
                    _ => self.eval(right, scope),
                }
            }
            Expr::Conditional { cond, then, otherwise } => {
                if self.eval(cond, scope)?.truthy() {
                    self.eval(then, scope)
                } else {
                    self.eval(otherwise, scope)
                }
            }
            Expr::Call { func, arg } => {
                // 局部变量优先遮蔽内置名
                if let Some(shadowed) = scope.get(func) {
                    return Err(EvalError::NotCallable(shadowed.type_name()));
                }
                let arg = self.eval(arg, scope)?;
                match func.as_str() {
                    "abs" => match arg.as_int() {
                        Some(n) => Ok(Value::Int(n.abs())),
                        None => Err(EvalError::BadUnaryOperand {
                            op: "abs()",
                            operand: arg.type_name(),
                        }),
                    },
                    name if self.function.is_some_and(|f| f.name == name) => self.invoke(arg),
                    _ => Err(EvalError::UndefinedName(func.clone())),
                }
            }
        }
    }
}

fn unary(op: UnaryOp, value: Value) -> Result<Value, EvalError> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!value.truthy())),
        UnaryOp::Neg | UnaryOp::Pos => {
            let symbol = if op == UnaryOp::Neg { "-" } else { "+" };
            let n = value.as_int().ok_or(EvalError::BadUnaryOperand {
                op: symbol,
                operand: value.type_name(),
            })?;
            Ok(Value::Int(if op == UnaryOp::Neg { -n } else { n }))
        }
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let (Some(a), Some(b)) = (left.as_int(), right.as_int()) else {
        return Err(EvalError::UnsupportedOperand {
            op: op.symbol(),
            left: left.type_name(),
            right: right.type_name(),
        });
    };

    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::FloorDiv => {
            if b.is_zero() {
                return Err(EvalError::DivisionByZero);
            }
            a.div_floor(&b)
        }
        BinaryOp::Mod => {
            if b.is_zero() {
                return Err(EvalError::DivisionByZero);
            }
            a.mod_floor(&b)
        }
        BinaryOp::Pow => {
            if b.is_negative() {
                return Err(EvalError::NegativeExponent);
            }
            let exponent = b
                .to_u32()
                .filter(|e| *e <= MAX_EXPONENT)
                .ok_or(EvalError::ExponentTooLarge)?;
            num_traits::pow(a, exponent as usize)
        }
    };

    Ok(Value::Int(result))
}

fn compare(op: CmpOp, left: &Value, right: &Value) -> Result<bool, EvalError> {
    let ordering = match (left.as_int(), right.as_int()) {
        (Some(a), Some(b)) => Some(a.cmp(&b)),
        _ => None,
    };

    match (op, ordering) {
        (CmpOp::Eq, Some(ord)) => Ok(ord == Ordering::Equal),
        (CmpOp::NotEq, Some(ord)) => Ok(ord != Ordering::Equal),
        // 含 None 的相等比较：仅 None == None 成立
        (CmpOp::Eq, None) => Ok(left == right),
        (CmpOp::NotEq, None) => Ok(left != right),
        (CmpOp::Lt, Some(ord)) => Ok(ord == Ordering::Less),
        (CmpOp::Le, Some(ord)) => Ok(ord != Ordering::Greater),
        (CmpOp::Gt, Some(ord)) => Ok(ord == Ordering::Greater),
        (CmpOp::Ge, Some(ord)) => Ok(ord != Ordering::Less),
        (op, None) => Err(EvalError::Unorderable {
            op: op.symbol(),
            left: left.type_name(),
            right: right.type_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{parse_function, parse_lambda};

    fn lambda_at(source: &str, n: i64) -> Result<Value, EvalError> {
        call_lambda(&parse_lambda(source).unwrap(), &BigInt::from(n))
    }

    fn function_at(source: &str, n: i64) -> Result<Value, EvalError> {
        call_function(&parse_function(source).unwrap(), &BigInt::from(n))
    }

    #[test]
    fn test_floored_modulo_and_division() {
        assert_eq!(lambda_at("lambda x: x % 5", -7), Ok(Value::Int(BigInt::from(3))));
        assert_eq!(lambda_at("lambda x: x // 2", -7), Ok(Value::Int(BigInt::from(-4))));
        assert_eq!(lambda_at("lambda x: x % -5", 7), Ok(Value::Int(BigInt::from(-3))));
        assert_eq!(lambda_at("lambda x: x % 5 == 0", -10), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(lambda_at("lambda x: 10 % (x - 10)", 10), Err(EvalError::DivisionByZero));
        assert_eq!(
            EvalError::DivisionByZero.to_string(),
            "integer division or modulo by zero"
        );
    }

    #[test]
    fn test_chained_comparison_and_logic() {
        assert_eq!(lambda_at("lambda x: 0 < x < 10", 5), Ok(Value::Bool(true)));
        assert_eq!(lambda_at("lambda x: 0 < x < 10", 10), Ok(Value::Bool(false)));
        assert!(lambda_at("lambda x: x > 3 and x % 2 == 0", 4).unwrap().truthy());
        assert!(!lambda_at("lambda x: not (x > 3 or x == 1)", 4).unwrap().truthy());
        // and/or 返回操作数本身
        assert_eq!(lambda_at("lambda x: x % 3 or 7", 9), Ok(Value::Int(BigInt::from(7))));
    }

    #[test]
    fn test_conditional_expression_and_abs() {
        assert_eq!(
            lambda_at("lambda x: abs(x) if x < 0 else x * 2", -4),
            Ok(Value::Int(BigInt::from(4)))
        );
        assert_eq!(lambda_at("lambda x: 2 ** 10 == x", 1024), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_power_limits() {
        assert_eq!(lambda_at("lambda x: x ** -1", 2), Err(EvalError::NegativeExponent));
        assert_eq!(lambda_at("lambda x: x ** 5000", 2), Err(EvalError::ExponentTooLarge));
    }

    #[test]
    fn test_undefined_name() {
        assert_eq!(
            lambda_at("lambda x: y > 1", 3),
            Err(EvalError::UndefinedName("y".into()))
        );
        assert_eq!(
            lambda_at("lambda x: print(x)", 3),
            Err(EvalError::UndefinedName("print".into()))
        );
        assert_eq!(lambda_at("lambda x: x(1)", 3), Err(EvalError::NotCallable("int")));
    }

    #[test]
    fn test_none_handling() {
        assert_eq!(lambda_at("lambda x: None == None", 1), Ok(Value::Bool(true)));
        assert_eq!(lambda_at("lambda x: None == 0", 1), Ok(Value::Bool(false)));
        assert!(matches!(
            lambda_at("lambda x: None < x", 1),
            Err(EvalError::Unorderable { .. })
        ));
        assert!(matches!(
            lambda_at("lambda x: None + x", 1),
            Err(EvalError::UnsupportedOperand { .. })
        ));
    }

    #[test]
    fn test_function_body() {
        let source = "def div7(x):\n    if x % 7:\n        return False\n    else:\n        return True";
        assert_eq!(function_at(source, 14), Ok(Value::Bool(true)));
        assert_eq!(function_at(source, 10), Ok(Value::Bool(false)));
    }

    #[test]
    fn test_function_locals_and_fallthrough() {
        let source = "def f(n):\n    r = n % 3\n    if r == 0:\n        return True\n";
        assert_eq!(function_at(source, 9), Ok(Value::Bool(true)));
        assert_eq!(function_at(source, 10), Ok(Value::None));
    }

    #[test]
    fn test_deep_expression_tree() {
        // 语法分析器无法产出的深度，直接构造语法树
        let mut body = Expr::Name("x".into());
        for _ in 0..(MAX_EVAL_DEPTH + 10) {
            body = Expr::Binary {
                op: BinaryOp::Add,
                left: Box::new(body),
                right: Box::new(Expr::Int(BigInt::from(1))),
            };
        }
        let lambda = Lambda {
            param: "x".into(),
            body,
        };
        assert_eq!(call_lambda(&lambda, &BigInt::from(0)), Err(EvalError::NestingLimit));
    }

    #[test]
    fn test_recursion_and_limit() {
        let digit_sum = "def ds(n):\n    if n < 10:\n        return n\n    return n % 10 + ds(n // 10)";
        assert_eq!(function_at(digit_sum, 1234), Ok(Value::Int(BigInt::from(10))));

        let forever = "def loop(n):\n    return loop(n + 1)";
        assert_eq!(function_at(forever, 0), Err(EvalError::RecursionLimit));
    }
}
