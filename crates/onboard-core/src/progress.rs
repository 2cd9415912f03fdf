/// Completion percentage as an integer in `[0, 100]`.
///
/// `total == 0` yields 0 — never a division by zero. Both the optimistic
/// in-memory path and the pre-persist path call this, so it must stay a
/// pure function of its arguments.
pub fn percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_zero() {
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn full_is_one_hundred() {
        assert_eq!(percentage(7, 7), 100);
    }

    #[test]
    fn rounds_to_nearest() {
        assert_eq!(percentage(1, 10), 10);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(3, 7), 43);
    }

    #[test]
    fn stays_in_bounds() {
        for total in 0..=20usize {
            for completed in 0..=total {
                let p = percentage(completed, total);
                assert!(p <= 100, "percentage({completed}, {total}) = {p}");
            }
        }
    }
}
