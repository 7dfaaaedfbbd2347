use sales_common::Secret;

use crate::{db_types::IntegrationCredential, traits::StoreError};

#[allow(async_fn_in_trait)]
pub trait IntegrationStore {
    async fn get_credential(&self, user_id: i64, provider: &str) -> Result<Option<Secret<String>>, StoreError>;

    /// Every user with a stored credential for `provider`, in user id order.
    async fn list_users_with_integration(&self, provider: &str) -> Result<Vec<IntegrationCredential>, StoreError>;

    /// Stores the user's token for `provider`, replacing the previous one.
    async fn save_integration(&self, user_id: i64, provider: &str, token: &Secret<String>) -> Result<(), StoreError>;
}
