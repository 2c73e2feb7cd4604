use crate::utils::error::{MergeUserError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(MergeUserError::ConfigValidationError {
            field: field_name.to_string(),
            message: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(MergeUserError::ConfigValidationError {
            field: field_name.to_string(),
            message: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_required_setting(name: &str, value: Option<String>) -> Result<String> {
    value.ok_or_else(|| MergeUserError::MissingSettingError {
        name: name.to_string(),
    })
}

pub fn validate_non_empty_string(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MergeUserError::InvalidSettingError {
            name: name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Parses a whole, non-negative number of days. Anything else is rejected
/// instead of falling back to a default.
pub fn parse_non_negative_days(name: &str, value: &str) -> Result<u32> {
    let trimmed = value.trim();
    match trimmed.parse::<i64>() {
        Ok(days) if days < 0 => Err(MergeUserError::InvalidSettingError {
            name: name.to_string(),
            value: value.to_string(),
            reason: "Number of days cannot be negative".to_string(),
        }),
        Ok(days) => u32::try_from(days).map_err(|_| MergeUserError::InvalidSettingError {
            name: name.to_string(),
            value: value.to_string(),
            reason: format!("Number of days must be at most {}", u32::MAX),
        }),
        Err(e) => Err(MergeUserError::InvalidSettingError {
            name: name.to_string(),
            value: value.to_string(),
            reason: format!("Not a whole number: {}", e),
        }),
    }
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(MergeUserError::ConfigValidationError {
            field: field_name.to_string(),
            message: format!("Value {} must be between {} and {}", value, min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_non_negative_days() {
        assert_eq!(parse_non_negative_days("disabledForDays", "30").unwrap(), 30);
        assert_eq!(parse_non_negative_days("disabledForDays", " 0 ").unwrap(), 0);
        assert!(parse_non_negative_days("disabledForDays", "-1").is_err());
        assert!(parse_non_negative_days("disabledForDays", "thirty").is_err());
        assert!(parse_non_negative_days("disabledForDays", "").is_err());
        assert!(parse_non_negative_days("disabledForDays", "1.5").is_err());
    }

    #[test]
    fn test_validate_required_setting() {
        assert_eq!(
            validate_required_setting("defaultUser", Some("admin".to_string())).unwrap(),
            "admin"
        );
        assert!(matches!(
            validate_required_setting("defaultUser", None),
            Err(MergeUserError::MissingSettingError { .. })
        ));
    }

    #[test]
    fn test_validate_path_and_range() {
        assert!(validate_path("store.path", "./accounts.json").is_ok());
        assert!(validate_path("store.path", "").is_err());
        assert!(validate_path("store.path", "a\0b").is_err());
        assert!(validate_range("schedule.interval_minutes", 5, 1, 1440).is_ok());
        assert!(validate_range("schedule.interval_minutes", 0, 1, 1440).is_err());
    }
}
