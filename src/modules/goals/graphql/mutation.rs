use std::sync::Arc;

use async_graphql::{Context, Object, Result};
use tracing::{debug, info};

use crate::modules::auth::graphql::ensure_caller_is;
use crate::modules::goals::factory::{FactoryError, GoalFactory};
use crate::modules::goals::state::RepositoryError;
use crate::types::{Goal, GoalInput};
use super::types::{GoalMutationRoot, GoalView};

const ALREADY_ACTIVE : &str = "user already has an active goal";
const NOT_OWNED : &str = "goal not found or does not belong to the user";

/// Loads the goal of `user_id` and makes sure it is the one called `goal_id`.
async fn owned_goal(factory:&dyn GoalFactory, goal_id:&str, user_id:i64) -> Result<Goal> {
    let existing = factory.get_goal_by_user_id(user_id).await.map_err(|e|{
        tracing::warn!("goal lookup for user {user_id} failed: {e}");
        async_graphql::Error::new("failed to retrieve goal")
    })?;
    match existing {
        Some(goal) if goal.goal_id == goal_id => Ok(goal),
        _ => Err(NOT_OWNED.into())
    }
}

#[Object]
impl GoalMutationRoot {

    #[tracing::instrument(skip(self,ctx))]
    async fn create_goal<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        user_id: i64,
        weight: f64,
        #[graphql(name = "body_structure")] body_structure: String
    ) -> Result<GoalView> {

        ensure_caller_is(ctx, user_id).await?;
        let factory = ctx.data::<Arc<dyn GoalFactory>>()?;

        if let Ok(Some(_)) = factory.get_goal_by_user_id(user_id).await {
            return Err(ALREADY_ACTIVE.into())
        }

        let input = GoalInput { user_id, weight, body_structure };
        match factory.create_goal(input).await {
            Ok(goal) => {
                info!("registered goal {} for user {}",goal.goal_id,user_id);
                Ok(goal.into())
            },
            // someone else won the race between the check above and the insert
            Err(FactoryError::Repository(RepositoryError::Conflict(_))) => Err(ALREADY_ACTIVE.into()),
            Err(e) => Err(e.into())
        }
    }

    #[tracing::instrument(skip(self,ctx))]
    async fn update_goal<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        goal_id: String,
        user_id: i64,
        weight: f64,
        #[graphql(name = "body_structure")] body_structure: String
    ) -> Result<GoalView> {

        ensure_caller_is(ctx, user_id).await?;
        let factory = ctx.data::<Arc<dyn GoalFactory>>()?;

        owned_goal(factory.as_ref(), &goal_id, user_id).await?;

        let input = GoalInput { user_id, weight, body_structure };
        match factory.update_goal(user_id, input).await {
            Ok(goal) => {
                debug!("updated goal {goal_id}");
                Ok(goal.into())
            },
            Err(FactoryError::NotFound(_)) => Err(NOT_OWNED.into()),
            Err(e) => Err(e.into())
        }
    }

    #[tracing::instrument(skip(self,ctx))]
    async fn delete_goal<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        goal_id: String,
        user_id: i64
    ) -> Result<bool> {

        ensure_caller_is(ctx, user_id).await?;
        let factory = ctx.data::<Arc<dyn GoalFactory>>()?;

        owned_goal(factory.as_ref(), &goal_id, user_id).await?;

        let removed = factory.delete_goal(user_id).await?;
        if removed {
            info!("deleted goal {goal_id} of user {user_id}");
        }
        Ok(removed)
    }
}
