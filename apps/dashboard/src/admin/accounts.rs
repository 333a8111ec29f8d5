use std::marker::PhantomData;

use serde_json::{json, Value};

use super::{action_path, echoed};
use crate::errors::ApiError;
use crate::http_client::ApiClient;
use crate::models::ListItem;

/// Status toggles shared by employer, candidate and admin accounts.
pub struct AccountApi<T> {
    client: ApiClient,
    endpoint: &'static str,
    _account: PhantomData<fn() -> T>,
}

impl<T: ListItem> AccountApi<T> {
    pub fn new(client: ApiClient, endpoint: &'static str) -> Self {
        Self {
            client,
            endpoint,
            _account: PhantomData,
        }
    }

    /// Blocks or unblocks the account. Returns the updated record when echoed.
    pub async fn set_active(&self, id: &str, is_active: bool) -> Result<Option<T>, ApiError> {
        let body: Value = self
            .client
            .patch(&action_path(self.endpoint, id, "status"), &json!({"isActive": is_active}))
            .await?;
        Ok(echoed(body))
    }
}
