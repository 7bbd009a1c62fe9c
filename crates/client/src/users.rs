//! User endpoints.

use reqwest::Method;
use tokio_util::sync::CancellationToken;

use elite_core::UserId;

use crate::rest::is_truthy;
use crate::{AuthorizedClient, ClientError, TokenSource, UserModel, UserPatchRequest};

pub const USERS_PATH: &str = "/user";

impl<T: TokenSource> AuthorizedClient<T> {
    pub async fn list_users(&self, cancel: &CancellationToken) -> Result<Vec<UserModel>, ClientError> {
        self.request(Method::GET, USERS_PATH)
            .cancel_on(cancel)
            .send_json()
            .await
    }

    pub async fn get_user_detail_by_id(
        &self,
        id: UserId,
        cancel: &CancellationToken,
    ) -> Result<UserModel, ClientError> {
        self.request(Method::GET, &format!("{USERS_PATH}/{id}"))
            .cancel_on(cancel)
            .send_json()
            .await
    }

    /// Partial update; `Ok(false)` when the backend answers with a falsy body.
    pub async fn patch_user_detail(
        &self,
        id: UserId,
        payload: &UserPatchRequest,
        cancel: &CancellationToken,
    ) -> Result<bool, ClientError> {
        let reply = self
            .request(Method::PATCH, &format!("{USERS_PATH}/{id}"))
            .json(payload)
            .cancel_on(cancel)
            .send_value()
            .await?;
        Ok(is_truthy(&reply))
    }
}
