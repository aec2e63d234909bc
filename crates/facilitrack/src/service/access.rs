//! Membership and role checks run before any facility-scoped operation.

use facilitrack_core::authz::{require_role, AuthzError, Principal};
use facilitrack_core::facility::{Membership, Role};
use facilitrack_core::storage::MembershipRepository;
use uuid::Uuid;

use super::Result;

/// Requires `principal` to be a member of the facility.
///
/// A missing membership is reported as [`AuthzError::NotMember`]; other
/// storage failures pass through unchanged.
pub(crate) async fn require_membership(
    memberships: &dyn MembershipRepository,
    principal: &Principal,
    facility_id: Uuid,
) -> Result<Membership> {
    match memberships
        .get_membership(&principal.email, facility_id)
        .await
    {
        Ok(membership) => Ok(membership),
        Err(err) if err.is_not_found() => {
            tracing::warn!(
                facility_id = %facility_id,
                email = %principal.email,
                "Authorization denied: no membership"
            );
            Err(AuthzError::NotMember { facility_id }.into())
        }
        Err(err) => Err(err.into()),
    }
}

/// Requires the caller's role claim to be Owner.
pub(crate) fn require_owner(principal: &Principal) -> Result<()> {
    require_role(principal, &[Role::Owner]).map_err(|err| {
        tracing::warn!(
            email = %principal.email,
            role = %principal.role,
            "Authorization denied: insufficient role"
        );
        err.into()
    })
}
