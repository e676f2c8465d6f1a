use std::sync::Arc;

use async_graphql::{Context, Object, Result};

use super::{AuthApi, RequestIdentity};

#[derive(Default)]
pub struct AuthQueryRoot;

#[Object]
impl AuthQueryRoot {

    /// Id of the user that owns the token used for this request
    #[tracing::instrument(skip_all)]
    async fn user_id<'ctx>(&self, ctx: &Context<'ctx>) -> Result<i64> {
        caller_id(ctx).await
    }
}

pub(crate) async fn caller_id(ctx: &Context<'_>) -> Result<i64> {
    let identity = ctx.data_opt::<RequestIdentity>().ok_or("no authorization token found")?;
    let auth = ctx.data::<Arc<dyn AuthApi>>()?;
    Ok(identity.user_id(auth.as_ref()).await?)
}

/// Operations that name a user must be issued by that same user.
pub(crate) async fn ensure_caller_is(ctx: &Context<'_>, user_id: i64) -> Result<()> {
    if caller_id(ctx).await? != user_id {
        return Err("userId does not match the authenticated user".into())
    }
    Ok(())
}
