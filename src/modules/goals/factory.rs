use std::sync::Arc;

use thiserror::Error;

use crate::types::{Goal, GoalInput};
use super::state::{GoalRepository, RepositoryError};

#[derive(Error, Debug)]
pub enum FactoryError {
    #[error("invalid goal input data")]
    InvalidInput,
    #[error("no active goal found for user {0}")]
    NotFound(i64),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Business rules around goal documents, shared by the graphql resolvers
/// and the rest handlers.
#[async_trait::async_trait]
pub trait GoalFactory : Send + Sync {
    async fn create_goal(&self, input: GoalInput) -> Result<Goal,FactoryError>;
    async fn update_goal(&self, user_id: i64, input: GoalInput) -> Result<Goal,FactoryError>;
    async fn get_goal_by_user_id(&self, user_id: i64) -> Result<Option<Goal>,FactoryError>;
    async fn delete_goal(&self, user_id: i64) -> Result<bool,FactoryError>;
}

pub struct ConcreteGoalFactory {
    repository : Arc<dyn GoalRepository>
}

impl ConcreteGoalFactory {
    pub fn new(repository: Arc<dyn GoalRepository>) -> Self {
        ConcreteGoalFactory { repository }
    }
}

#[async_trait::async_trait]
impl GoalFactory for ConcreteGoalFactory {

    async fn create_goal(&self, input: GoalInput) -> Result<Goal,FactoryError> {
        if !input.is_valid() {
            return Err(FactoryError::InvalidInput)
        }
        Ok(self.repository.create(input.into()).await?)
    }

    /// Overwrites weight and body structure as given. Unlike creation, no
    /// validation is applied here.
    async fn update_goal(&self, user_id: i64, input: GoalInput) -> Result<Goal,FactoryError> {
        let mut existing = self.repository.get_by_user_id(user_id).await?
            .ok_or(FactoryError::NotFound(user_id))?;

        existing.weight = input.weight;
        existing.body_structure = input.body_structure;

        match self.repository.update(user_id, existing).await {
            Ok(goal) => Ok(goal),
            // deleted between the read above and the write
            Err(RepositoryError::NotFound(id)) => Err(FactoryError::NotFound(id)),
            Err(e) => Err(e.into())
        }
    }

    async fn get_goal_by_user_id(&self, user_id: i64) -> Result<Option<Goal>,FactoryError> {
        Ok(self.repository.get_by_user_id(user_id).await?)
    }

    async fn delete_goal(&self, user_id: i64) -> Result<bool,FactoryError> {
        Ok(self.repository.delete(user_id).await?)
    }
}
