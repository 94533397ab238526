//! Result type alias for Vigil

use super::errors::VigilError;

/// Result type alias for Vigil operations
///
/// # Examples
///
/// ```
/// use vigil::domain::result::Result;
/// use vigil::domain::errors::VigilError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(VigilError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, VigilError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{QueryError, VigilError};

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(VigilError::Validation("test error".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> std::result::Result<u64, QueryError> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
