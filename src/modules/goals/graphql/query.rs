use std::sync::Arc;

use async_graphql::{Context, Object, Result};
use tracing::debug;

use crate::modules::auth::graphql::ensure_caller_is;
use crate::modules::goals::factory::GoalFactory;
use super::types::{GoalQueryRoot, GoalView};

#[Object]
impl GoalQueryRoot {

    /// The active goal of a user, if there is one
    #[tracing::instrument(skip(self,ctx))]
    async fn get_goal_by_id<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        user_id: i64
    ) -> Result<Option<GoalView>> {

        ensure_caller_is(ctx, user_id).await?;

        let factory = ctx.data::<Arc<dyn GoalFactory>>()?;
        debug!("Handling request to fetch goal");
        Ok(factory.get_goal_by_user_id(user_id).await?.map(GoalView::from))
    }
}
