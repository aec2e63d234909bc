use chrono::Utc;
use facilitrack_core::authz::{AuthzError, Principal};
use facilitrack_core::facility::{validate_new_user, Membership, NewUser, User};

use super::{FacilityService, Result};

impl FacilityService {
    /// Registers a user. The password is hashed before it is stored.
    pub async fn register_user(&self, new_user: NewUser) -> Result<User> {
        validate_new_user(&new_user)?;

        let user = new_user.into_user(Utc::now())?;
        self.users.insert_user(&user).await?;

        tracing::info!(email = %user.email, role = %user.role, "registered user");
        Ok(user)
    }

    /// Checks an email and password pair.
    ///
    /// An unknown email and a wrong password fail the same way.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Principal> {
        let user = match self.users.get_user(email).await {
            Ok(user) => user,
            Err(err) if err.is_not_found() => return Err(AuthzError::InvalidCredentials.into()),
            Err(err) => return Err(err.into()),
        };

        if !user.password_hash.verify(password) {
            tracing::warn!(email = %email, "authentication failed");
            return Err(AuthzError::InvalidCredentials.into());
        }
        Ok(Principal::from(&user))
    }

    /// Facilities the caller is a member of.
    pub async fn list_my_facilities(&self, principal: &Principal) -> Result<Vec<Membership>> {
        Ok(self
            .users
            .list_facilities_for_user(&principal.email)
            .await?)
    }
}
