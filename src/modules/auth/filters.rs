use std::sync::Arc;

use warp::{Filter, Rejection};

use super::{AuthApi, BearerToken, Caller};

/// Rejection for requests that are not (or could not be) authenticated.
/// The message is returned to the client as is.
#[derive(Debug)]
pub struct Unauthorized(pub String);

impl warp::reject::Reject for Unauthorized {}


/// Requires a well formed bearer authorization header without resolving it.
pub fn bearer_token() -> impl Filter<Extract = (BearerToken,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and_then(|header: Option<String>| async move {
            BearerToken::from_header(header.as_deref())
                .map_err(|e| warp::reject::custom(Unauthorized(e.to_string())))
        })
}

/// Requires a bearer token that the auth api accepts.
pub fn authenticated(auth: Arc<dyn AuthApi>) -> impl Filter<Extract = (Caller,), Error = Rejection> + Clone {
    bearer_token()
        .and(warp::any().map(move || auth.clone()))
        .and_then(resolve_caller)
}

#[tracing::instrument(skip_all)]
async fn resolve_caller(token: BearerToken, auth: Arc<dyn AuthApi>) -> Result<Caller, Rejection> {
    match auth.fetch_user_id(&token).await {
        Ok(user_id) => Ok(Caller { user_id, token }),
        Err(e) => {
            tracing::info!("Failed to resolve caller: {e}");
            Err(warp::reject::custom(Unauthorized(e.to_string())))
        }
    }
}
