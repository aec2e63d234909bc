use async_trait::async_trait;
use facilitrack_core::facility::{Membership, User};
use facilitrack_core::storage::{RepositoryError, Result, UserRepository};

use super::{on_condition, TableRepository};
use crate::storage::conversions::{item_to_membership, item_to_user, user_to_item};
use crate::storage::keys::{self, FACILITY_PREFIX};
use crate::storage::store::{KeyQuery, PutCondition, SortCondition};

#[async_trait]
impl UserRepository for TableRepository {
    async fn insert_user(&self, user: &User) -> Result<()> {
        let item = user_to_item(user)?;

        self.store
            .put_item(item, PutCondition::KeyAbsent)
            .await
            .map_err(|e| on_condition(e, || RepositoryError::duplicate("User", &user.email)))?;

        tracing::debug!(email = %user.email, role = %user.role, "inserted user");
        Ok(())
    }

    async fn get_user(&self, email: &str) -> Result<User> {
        let key = keys::user_key(email)?;

        match self.store.get_item(&key).await? {
            Some(item) => item_to_user(&item),
            None => Err(RepositoryError::not_found("User", email)),
        }
    }

    async fn list_facilities_for_user(&self, email: &str) -> Result<Vec<Membership>> {
        let query = KeyQuery::primary(
            keys::user_partition(email)?,
            SortCondition::BeginsWith(FACILITY_PREFIX.to_string()),
        );

        let items = self.store.query(&query).await?;
        items.iter().map(item_to_membership).collect()
    }
}
