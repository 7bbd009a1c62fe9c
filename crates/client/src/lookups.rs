//! Reference data used to populate selection inputs.

use reqwest::Method;
use tokio_util::sync::CancellationToken;

use crate::{AuthorizedClient, ClientError, CodeModel, CountryModel, TokenSource};

pub const COUNTRIES_PATH: &str = "/config/country";
pub const CODES_BY_TYPE_PATH: &str = "/config/code/type";

/// Code type of the gender table.
pub const GENDER_CODE_TYPE: &str = "GENDER";

impl<T: TokenSource> AuthorizedClient<T> {
    pub async fn get_countries(&self, cancel: &CancellationToken) -> Result<Vec<CountryModel>, ClientError> {
        self.request(Method::GET, COUNTRIES_PATH)
            .cancel_on(cancel)
            .send_json()
            .await
    }

    pub async fn get_code_details_by_type_code(
        &self,
        type_code: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<CodeModel>, ClientError> {
        if type_code.is_empty()
            || !type_code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ClientError::InvalidConfig(format!("invalid code type '{type_code}'")));
        }
        self.request(Method::GET, &format!("{CODES_BY_TYPE_PATH}/{type_code}"))
            .cancel_on(cancel)
            .send_json()
            .await
    }
}
