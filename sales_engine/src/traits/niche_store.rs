use crate::traits::StoreError;

#[allow(async_fn_in_trait)]
pub trait NicheStore {
    async fn get_niche(&self, user_id: i64, sku: &str) -> Result<Option<String>, StoreError>;

    /// Maps `sku` to `niche` for this user, replacing any previous mapping.
    async fn assign_niche(&self, user_id: i64, sku: &str, niche: &str) -> Result<(), StoreError>;
}
