use chrono::NaiveDate;

use crate::error::{Result, StoreError};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validate a task title and return it trimmed.
pub fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Validation("title must not be empty".into()));
    }
    Ok(trimmed.to_string())
}

/// Validate an optional due date. Empty text means no due date; anything
/// else must be a real calendar date written as YYYY-MM-DD.
pub fn validate_due(due: Option<&str>) -> Result<Option<String>> {
    let Some(raw) = due.map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(None);
    };
    if raw.len() != 10 || NaiveDate::parse_from_str(raw, DATE_FORMAT).is_err() {
        return Err(StoreError::Validation(format!(
            "due date '{raw}' is not a valid YYYY-MM-DD date"
        )));
    }
    Ok(Some(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_titles() {
        assert_eq!(validate_title("foo").unwrap(), "foo");
        assert_eq!(validate_title("  padded  ").unwrap(), "padded");
    }

    #[test]
    fn invalid_titles() {
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
        assert!(validate_title("\t\n").is_err());
    }

    #[test]
    fn due_dates() {
        assert_eq!(validate_due(None).unwrap(), None);
        assert_eq!(validate_due(Some("")).unwrap(), None);
        assert_eq!(
            validate_due(Some("2025-02-28")).unwrap().as_deref(),
            Some("2025-02-28")
        );
        assert!(validate_due(Some("2025-02-30")).is_err());
        assert!(validate_due(Some("2025-2-3")).is_err());
        assert!(validate_due(Some("tomorrow")).is_err());
    }
}
