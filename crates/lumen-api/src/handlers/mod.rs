//! API handlers
//!
//! Author: hephaex@gmail.com

pub mod documents;
pub mod health;
pub mod query;
pub mod search;

use crate::error::AppError;

/// Resolve a requested result count against the configured bounds
pub(crate) fn resolve_top_k(
    requested: Option<i64>,
    default_top_k: usize,
    max_top_k: usize,
) -> Result<usize, AppError> {
    match requested {
        None => Ok(default_top_k),
        Some(k) if k <= 0 => Err(AppError::BadRequest(format!(
            "top_k must be positive, got {k}"
        ))),
        Some(k) if k as u64 > max_top_k as u64 => Err(AppError::BadRequest(format!(
            "top_k must not exceed {max_top_k}"
        ))),
        Some(k) => Ok(k as usize),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_top_k() {
        assert_eq!(resolve_top_k(None, 5, 50).unwrap(), 5);
        assert_eq!(resolve_top_k(Some(12), 5, 50).unwrap(), 12);
        assert_eq!(resolve_top_k(Some(50), 5, 50).unwrap(), 50);
        assert!(resolve_top_k(Some(0), 5, 50).is_err());
        assert!(resolve_top_k(Some(-3), 5, 50).is_err());
        assert!(resolve_top_k(Some(51), 5, 50).is_err());
    }
}
