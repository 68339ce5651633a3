//! 内置谓词：素数 / 偶数 / 奇数
use num_bigint::BigInt;
use num_bigint::BigUint;
use num_integer::{Integer, Roots};
use num_traits::{ToPrimitive, Zero};

/// 内置规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinRule {
    Prime,
    Even,
    Odd,
}

impl BuiltinRule {
    /// 按规则源码精确匹配内置名
    pub fn from_source(source: &str) -> Option<Self> {
        match source {
            "prime" => Some(Self::Prime),
            "even" => Some(Self::Even),
            "odd" => Some(Self::Odd),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Prime => "prime",
            Self::Even => "even",
            Self::Odd => "odd",
        }
    }

    #[inline]
    pub fn test(self, number: &BigInt) -> bool {
        match self {
            Self::Prime => is_prime(number),
            Self::Even => is_even(number),
            Self::Odd => is_odd(number),
        }
    }
}

/// 素数判定（按绝对值，|n| <= 1 非素数）
/// 对 2..=isqrt(|n|) 逐一试除；|n| 落在 u64 内时走原生整数快路径
pub fn is_prime(number: &BigInt) -> bool {
    let magnitude = number.magnitude();
    match magnitude.to_u64() {
        Some(n) => is_prime_u64(n),
        None => is_prime_big(magnitude),
    }
}

fn is_prime_u64(n: u64) -> bool {
    if n <= 1 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let limit = Roots::sqrt(&n);
    let mut divisor = 3;
    while divisor <= limit {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}

fn is_prime_big(n: &BigUint) -> bool {
    // 进入此分支时 n 已超出 u64，必然 > 1
    if n.is_even() {
        return false;
    }
    let limit = n.sqrt();
    let two = BigUint::from(2u8);
    let mut divisor = BigUint::from(3u8);
    while divisor <= limit {
        if (n % &divisor).is_zero() {
            return false;
        }
        divisor += &two;
    }
    true
}

/// 偶数判定（n mod 2 == 0）
#[inline]
pub fn is_even(number: &BigInt) -> bool {
    number.is_even()
}

/// 奇数判定（n mod 2 != 0）
#[inline]
pub fn is_odd(number: &BigInt) -> bool {
    number.is_odd()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(n: i64) -> BigInt {
        BigInt::from(n)
    }

    #[test]
    fn test_prime_small_values() {
        for n in [-1, 0, 1, 4, 9, -9, 15, 25, 49] {
            assert!(!is_prime(&big(n)), "{} should not be prime", n);
        }
        for n in [2, 3, 5, 7, -7, 11, 13, 97, -97] {
            assert!(is_prime(&big(n)), "{} should be prime", n);
        }
    }

    #[test]
    fn test_prime_large_values() {
        assert!(is_prime(&big(1_000_000_007)));
        assert!(is_prime(&big(-1_000_000_007)));
        // 2^63 - 1 = 7^2 * 73 * 127 * 337 * 92737 * 649657
        assert!(!is_prime(&big(i64::MAX)));
        // 超出 u64：2^64 为偶数，2^64 + 1 = 274177 * 67280421310721
        let beyond_u64: BigInt = BigInt::from(u64::MAX) + 1u8;
        assert!(!is_prime(&beyond_u64));
        assert!(!is_prime(&(beyond_u64 + 1u8)));
    }

    #[test]
    fn test_parity() {
        assert!(is_even(&big(2)));
        assert!(!is_even(&big(3)));
        assert!(is_odd(&big(3)));
        assert!(!is_odd(&big(2)));
        assert!(is_even(&big(-4)));
        assert!(is_odd(&big(-3)));
        assert!(is_even(&big(0)));
    }

    #[test]
    fn test_builtin_dispatch() {
        assert_eq!(BuiltinRule::from_source("prime"), Some(BuiltinRule::Prime));
        assert_eq!(BuiltinRule::from_source("Prime"), None);
        assert_eq!(BuiltinRule::from_source(" even"), None);
        assert!(BuiltinRule::Odd.test(&big(9)));
        assert_eq!(BuiltinRule::Even.name(), "even");
    }
}
