//! Permission scopes granted by the DodoIS authorization server.

use std::collections::BTreeSet;

use crate::error::{ApiError, Result};

pub const OPENID: &str = "openid";
pub const OFFLINE_ACCESS: &str = "offline_access";
pub const PROFILE: &str = "profile";
pub const PHONE: &str = "phone";
pub const SALES: &str = "sales";
pub const SHARED: &str = "shared";
pub const USER_ROLE_READ: &str = "user.role:read";
pub const STAFF_SHIFTS_READ: &str = "staffshifts:read";
pub const STAFF_MEMBERS_READ: &str = "staffmembers:read";
pub const ORGANIZATION_STRUCTURE: &str = "organizationstructure";
pub const FRANCHISEE_READ: &str = "franchisee:read";
pub const UNIT_READ: &str = "unit:read";
pub const UNIT_SHIFTS_READ: &str = "unitshifts:read";

/// Fail with `MissingScopes` naming every required scope absent from `granted`.
pub fn validate_scopes<S: AsRef<str>>(granted: &[S], required: &[&str]) -> Result<()> {
    let granted: BTreeSet<&str> = granted.iter().map(AsRef::as_ref).collect();
    let missing: BTreeSet<&str> = required
        .iter()
        .copied()
        .filter(|scope| !granted.contains(scope))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(ApiError::MissingScopes {
        missing: missing.into_iter().map(str::to_string).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing(err: ApiError) -> Vec<String> {
        match err {
            ApiError::MissingScopes { missing } => missing,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn subset_passes() {
        let granted = vec![OPENID, SALES, USER_ROLE_READ];
        assert!(validate_scopes(&granted, &[SALES, USER_ROLE_READ]).is_ok());
    }

    #[test]
    fn empty_requirement_always_passes() {
        let granted: Vec<String> = Vec::new();
        assert!(validate_scopes(&granted, &[]).is_ok());
    }

    #[test]
    fn names_exactly_the_difference() {
        let granted = vec![SALES.to_string(), SHARED.to_string()];
        let err = validate_scopes(&granted, &[USER_ROLE_READ, SALES, STAFF_SHIFTS_READ]).unwrap_err();
        assert_eq!(missing(err), vec![STAFF_SHIFTS_READ, USER_ROLE_READ]);
    }

    #[test]
    fn duplicates_in_requirement_are_reported_once() {
        let granted: Vec<&str> = Vec::new();
        let err = validate_scopes(&granted, &[SHARED, SHARED]).unwrap_err();
        assert_eq!(missing(err), vec![SHARED]);
    }

    #[test]
    fn failure_iff_not_subset() {
        let universe = [OPENID, SALES, SHARED, USER_ROLE_READ];
        for granted_mask in 0u8..16 {
            for required_mask in 0u8..16 {
                let pick = |mask: u8| -> Vec<&str> {
                    universe
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| mask & (1 << i) != 0)
                        .map(|(_, s)| *s)
                        .collect()
                };
                let granted = pick(granted_mask);
                let required = pick(required_mask);
                let is_subset = required_mask & !granted_mask == 0;
                let result = validate_scopes(&granted, &required);
                assert_eq!(result.is_ok(), is_subset, "granted={granted:?} required={required:?}");
                if let Err(err) = result {
                    assert_eq!(missing(err), pick(required_mask & !granted_mask));
                }
            }
        }
    }
}
