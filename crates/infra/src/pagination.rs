#[derive(Debug, Clone, Copy)]
pub struct LimitOffset {
    pub limit: i64,
    pub offset: i64,
}

impl Default for LimitOffset {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

impl LimitOffset {
    /// Clamp to sane bounds so a client cannot request the whole table.
    pub fn clamped(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.unwrap_or(50).clamp(1, 100),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_limit_to_bounds() {
        assert_eq!(LimitOffset::clamped(Some(1000), None).limit, 100);
        assert_eq!(LimitOffset::clamped(Some(0), None).limit, 1);
        assert_eq!(LimitOffset::clamped(None, Some(-5)).offset, 0);
    }
}
