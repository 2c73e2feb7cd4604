use crate::domain::model::Account;
use chrono::{DateTime, TimeDelta, Utc};

/// A disabled account becomes eligible once `last_modified + threshold_days`
/// lies strictly before `now`.
pub fn is_eligible(account: &Account, now: DateTime<Utc>, threshold_days: u32) -> bool {
    if account.active {
        return false;
    }

    TimeDelta::try_days(i64::from(threshold_days))
        .and_then(|threshold| account.last_modified.checked_add_signed(threshold))
        .is_some_and(|expires| expires < now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disabled_since(days_ago: i64, now: DateTime<Utc>) -> Account {
        Account::new("bob", "bob@x.com", false, now - TimeDelta::days(days_ago))
    }

    #[test]
    fn test_disabled_past_threshold_is_eligible() {
        let now = Utc::now();
        assert!(is_eligible(&disabled_since(40, now), now, 30));
    }

    #[test]
    fn test_disabled_within_threshold_is_not_eligible() {
        let now = Utc::now();
        assert!(!is_eligible(&disabled_since(29, now), now, 30));
    }

    #[test]
    fn test_boundary_is_not_eligible() {
        let now = Utc::now();
        assert!(!is_eligible(&disabled_since(30, now), now, 30));

        let just_past = Account::new(
            "bob",
            "bob@x.com",
            false,
            now - TimeDelta::days(30) - TimeDelta::seconds(1),
        );
        assert!(is_eligible(&just_past, now, 30));
    }

    #[test]
    fn test_active_account_is_never_eligible() {
        let now = Utc::now();
        let mut account = disabled_since(400, now);
        account.active = true;
        assert!(!is_eligible(&account, now, 0));
    }

    #[test]
    fn test_zero_threshold() {
        let now = Utc::now();
        assert!(is_eligible(&disabled_since(1, now), now, 0));
        assert!(!is_eligible(&disabled_since(0, now), now, 0));
    }

    #[test]
    fn test_huge_threshold_does_not_overflow() {
        let now = Utc::now();
        assert!(!is_eligible(&disabled_since(40, now), now, u32::MAX));
    }
}
