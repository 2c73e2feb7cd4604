use crate::domain::ports::ConfigurationSource;
use crate::utils::error::Result;
use crate::utils::validation::{
    parse_non_negative_days, validate_non_empty_string, validate_required_setting,
};

pub const DISABLED_FOR_DAYS: &str = "disabledForDays";
pub const DEFAULT_USER: &str = "defaultUser";

/// The two settings a run needs. Read once at the start of every run and not
/// touched again until the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSettings {
    pub threshold_days: u32,
    pub default_user: String,
}

impl MergeSettings {
    pub fn load(source: &dyn ConfigurationSource) -> Result<Self> {
        let raw_days = validate_required_setting(DISABLED_FOR_DAYS, source.get_setting(DISABLED_FOR_DAYS)?)?;
        let threshold_days = parse_non_negative_days(DISABLED_FOR_DAYS, &raw_days)?;

        let default_user = validate_required_setting(DEFAULT_USER, source.get_setting(DEFAULT_USER)?)?;
        validate_non_empty_string(DEFAULT_USER, &default_user)?;

        Ok(Self {
            threshold_days,
            default_user: default_user.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapSettings;
    use crate::utils::error::MergeUserError;

    #[test]
    fn test_load_settings() {
        let source = MapSettings::from_pairs([(DISABLED_FOR_DAYS, "30"), (DEFAULT_USER, "admin")]);
        let settings = MergeSettings::load(&source).unwrap();

        assert_eq!(settings.threshold_days, 30);
        assert_eq!(settings.default_user, "admin");
    }

    #[test]
    fn test_missing_threshold_is_an_error() {
        let source = MapSettings::from_pairs([(DEFAULT_USER, "admin")]);
        let err = MergeSettings::load(&source).unwrap_err();

        assert!(matches!(err, MergeUserError::MissingSettingError { ref name } if name == DISABLED_FOR_DAYS));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_non_numeric_threshold_is_an_error() {
        let source = MapSettings::from_pairs([(DISABLED_FOR_DAYS, "a month"), (DEFAULT_USER, "admin")]);
        assert!(matches!(
            MergeSettings::load(&source),
            Err(MergeUserError::InvalidSettingError { .. })
        ));
    }

    #[test]
    fn test_blank_default_user_is_an_error() {
        let source = MapSettings::from_pairs([(DISABLED_FOR_DAYS, "30"), (DEFAULT_USER, "  ")]);
        assert!(MergeSettings::load(&source).is_err());

        let source = MapSettings::from_pairs([(DISABLED_FOR_DAYS, "30")]);
        assert!(matches!(
            MergeSettings::load(&source),
            Err(MergeUserError::MissingSettingError { .. })
        ));
    }
}
