/*

   Identity of the caller. Tokens are never inspected locally, they are
   handed to the external authentication api which answers with a user id.

*/

pub mod filters;
pub mod graphql;

use std::time::Duration;

use thiserror::Error;
use tokio::sync::OnceCell;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authorization token missing")]
    MissingToken,
    #[error("Invalid Authorization header format")]
    InvalidFormat,
    #[error("authentication API returned error")]
    Rejected(reqwest::StatusCode),
    #[error("invalid response from authentication API")]
    InvalidResponse,
    #[error("authentication API request failed: {0}")]
    Request(#[from] reqwest::Error),
}


/// The raw value of a well formed authorization header, "Bearer " prefix included.
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct BearerToken(String);

impl BearerToken {

    pub fn from_header(header:Option<&str>) -> Result<Self,AuthError> {
        match header {
            None | Some("") => Err(AuthError::MissingToken),
            Some(h) if h.starts_with("Bearer ") => Ok(BearerToken(h.to_owned())),
            Some(_) => Err(AuthError::InvalidFormat)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}


#[async_trait::async_trait]
pub trait AuthApi : Send + Sync {
    async fn fetch_user_id(&self, token: &BearerToken) -> Result<i64,AuthError>;
}

pub struct HttpAuthApi {
    client : reqwest::Client,
    url : reqwest::Url
}

impl HttpAuthApi {
    pub fn new(url:reqwest::Url,timeout:Duration) -> Result<Self,AuthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(HttpAuthApi { client, url })
    }
}

#[async_trait::async_trait]
impl AuthApi for HttpAuthApi {

    #[tracing::instrument(skip_all)]
    async fn fetch_user_id(&self, token: &BearerToken) -> Result<i64,AuthError> {

        let response = self.client.get(self.url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::AUTHORIZATION, token.as_str())
            .body("{}")
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            tracing::debug!("authentication api answered with status {status}");
            return Err(AuthError::Rejected(status))
        }

        let body : serde_json::Value = response.json().await.map_err(|e|{
            tracing::debug!("authentication api returned a body that is not json: {e:?}");
            AuthError::InvalidResponse
        })?;

        user_id_from_response(&body)
    }
}

fn user_id_from_response(body:&serde_json::Value) -> Result<i64,AuthError> {
    let value = body.get("userId").ok_or(AuthError::InvalidResponse)?;
    value.as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .ok_or(AuthError::InvalidResponse)
}


/// Request scoped identity of the caller. The user id is resolved through the
/// auth api on first use and then reused for the rest of the request.
pub struct RequestIdentity {
    token : BearerToken,
    user_id : OnceCell<i64>
}

impl RequestIdentity {

    pub fn new(token:BearerToken) -> Self {
        RequestIdentity { token, user_id: OnceCell::new() }
    }

    pub fn resolved(token:BearerToken,user_id:i64) -> Self {
        RequestIdentity { token, user_id: OnceCell::new_with(Some(user_id)) }
    }

    pub async fn user_id(&self, auth:&dyn AuthApi) -> Result<i64,AuthError> {
        self.user_id
            .get_or_try_init(|| auth.fetch_user_id(&self.token))
            .await
            .copied()
    }
}

/// A caller whose token has already been exchanged for a user id.
#[derive(Debug,Clone)]
pub struct Caller {
    pub user_id : i64,
    pub token : BearerToken
}

impl Caller {
    pub fn identity(&self) -> RequestIdentity {
        RequestIdentity::resolved(self.token.clone(), self.user_id)
    }
}
