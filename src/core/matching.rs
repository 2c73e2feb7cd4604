//! Domain matching used to pick a merge target.
//!
//! Domains are compared as exact strings. `Example.com` and `example.com`
//! are different organisations here, which mirrors how the account store
//! compares them.

use crate::domain::model::Account;

/// Returns everything after the first `@`, or `None` when there is no `@`.
pub fn extract_domain(address: &str) -> Option<&str> {
    address.split_once('@').map(|(_, domain)| domain)
}

/// Ids of the active accounts that share `disabled`'s domain, ascending.
///
/// The first entry is the merge target, so the ordering matters. An account
/// without a usable domain matches nothing, not even another account without
/// one.
pub fn select_candidates<'a, I>(disabled: &Account, active_accounts: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a Account>,
{
    let Some(domain) = extract_domain(&disabled.email).filter(|d| !d.is_empty()) else {
        return Vec::new();
    };

    let mut candidates: Vec<&str> = active_accounts
        .into_iter()
        .filter(|account| account.active && account.id != disabled.id)
        .filter(|account| extract_domain(&account.email) == Some(domain))
        .map(|account| account.id.as_str())
        .collect();

    candidates.sort_unstable();
    candidates
}
