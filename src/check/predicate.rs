//! 内置谓词，配合 `CheckInvocation::predicate` 使用

/// 两个浮点数在给定精度内相等
pub fn is_near(val1: f64, val2: f64, precision: f64) -> bool {
    (val1 - val2).abs() <= precision
}

/// 值在闭区间内（`from_inclusive <= val <= to_inclusive`）
pub fn is_between<T: PartialOrd>(val: T, from_inclusive: T, to_inclusive: T) -> bool {
    from_inclusive <= val && val <= to_inclusive
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_near() {
        assert!(is_near(2.95, 3.0, 0.1));
        assert!(is_near(3.0, 3.0, 0.0));
        assert!(!is_near(2.8, 3.0, 0.1));
        assert!(!is_near(f64::NAN, 3.0, 0.1));
    }

    #[test]
    fn test_is_between() {
        assert!(is_between(5, 1, 10));
        assert!(is_between(1, 1, 10));
        assert!(is_between(10, 1, 10));
        assert!(!is_between(11, 1, 10));
        assert!(is_between("b", "a", "c"));
    }
}
