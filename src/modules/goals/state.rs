use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sled::IVec;
use thiserror::Error;
use tracing::debug;

use crate::types::Goal;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),
    #[error("corrupt goal document: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("a goal already exists for user {0}")]
    Conflict(i64),
    #[error("no goal exists for user {0}")]
    NotFound(i64),
    #[error("the goal of user {0} was modified concurrently")]
    ConcurrentModification(i64),
    #[error("goal store operation '{0}' timed out")]
    Timeout(&'static str),
    #[error("goal store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Persistence for goal documents. Every user owns at most one goal,
/// so the user id is the natural key for all operations.
#[async_trait::async_trait]
pub trait GoalRepository : Send + Sync {
    async fn create(&self, goal: Goal) -> Result<Goal,RepositoryError>;
    async fn update(&self, user_id: i64, goal: Goal) -> Result<Goal,RepositoryError>;
    async fn get_by_user_id(&self, user_id: i64) -> Result<Option<Goal>,RepositoryError>;
    async fn delete(&self, user_id: i64) -> Result<bool,RepositoryError>;
}


#[derive(Debug,Clone)]
pub struct SledGoalRepository {
    db : sled::Db,
    goals_db : sled::Tree,
    timeout : Duration
}

impl SledGoalRepository {

    pub fn new(db:&sled::Db, collection:&str, timeout:Duration) -> Result<Self,RepositoryError> {
        let goals_db = db.open_tree(collection)?;
        Ok(SledGoalRepository {
            db: db.clone(),
            goals_db,
            timeout
        })
    }

    #[cfg(test)]
    pub fn new_temporary() -> Self {
        let db = sled::Config::new().temporary(true).open().expect("temporary db should open");
        Self::new(&db, "ptrainer_goals", Duration::from_secs(10)).expect("temporary tree should open")
    }

    fn key(user_id:i64) -> [u8;8] {
        user_id.to_be_bytes()
    }

    fn decode(v:&IVec) -> Result<Goal,RepositoryError> {
        Ok(serde_json::from_slice(v)?)
    }

    // 24 hex chars: 4 bytes of unix time followed by a unique counter.
    fn new_goal_id(db:&sled::Db) -> Result<String,RepositoryError> {
        let secs = SystemTime::now().duration_since(UNIX_EPOCH).map(|d|d.as_secs()).unwrap_or_default();
        let counter = db.generate_id()?;
        Ok(format!("{:08x}{:016x}", secs as u32, counter))
    }

    /// Writes `goal` over the document `current`, failing if the stored
    /// document is no longer `current`. The id and owner are kept.
    fn replace(tree:&sled::Tree, user_id:i64, current:IVec, goal:Goal) -> Result<Goal,RepositoryError> {
        let existing = Self::decode(&current)?;
        let updated = Goal {
            goal_id: existing.goal_id,
            user_id,
            weight: goal.weight,
            body_structure: goal.body_structure,
        };
        let serialized = serde_json::to_vec(&updated)?;
        match tree.compare_and_swap(Self::key(user_id), Some(current), Some(serialized))? {
            Ok(()) => Ok(updated),
            Err(_) => Err(RepositoryError::ConcurrentModification(user_id))
        }
    }

    /// sled is synchronous, so each operation is moved to the blocking pool
    /// and bounded by the configured timeout.
    async fn run<T,F>(&self, operation:&'static str, f:F) -> Result<T,RepositoryError>
        where
            T : Send + 'static,
            F : FnOnce(sled::Db,sled::Tree) -> Result<T,RepositoryError> + Send + 'static
    {
        let db = self.db.clone();
        let tree = self.goals_db.clone();
        let task = tokio::task::spawn_blocking(move || f(db,tree));
        match tokio::time::timeout(self.timeout, task).await {
            Ok(joined) => joined?,
            Err(_) => {
                tracing::warn!("goal store operation '{operation}' exceeded {:?}",self.timeout);
                Err(RepositoryError::Timeout(operation))
            }
        }
    }
}

#[async_trait::async_trait]
impl GoalRepository for SledGoalRepository {

    #[tracing::instrument(skip_all, fields(user_id = goal.user_id))]
    async fn create(&self, goal: Goal) -> Result<Goal,RepositoryError> {
        self.run("create", move |db,tree| {
            let mut goal = goal;
            goal.goal_id = Self::new_goal_id(&db)?;
            let serialized = serde_json::to_vec(&goal)?;
            match tree.compare_and_swap(Self::key(goal.user_id), None as Option<&[u8]>, Some(serialized))? {
                Ok(()) => {
                    debug!("stored goal {} for user {}",goal.goal_id,goal.user_id);
                    Ok(goal)
                },
                Err(_) => Err(RepositoryError::Conflict(goal.user_id))
            }
        }).await
    }

    #[tracing::instrument(skip(self,goal))]
    async fn update(&self, user_id: i64, goal: Goal) -> Result<Goal,RepositoryError> {
        self.run("update", move |_db,tree| {
            let key = Self::key(user_id);
            let current = match tree.get(key)? {
                Some(v) => v,
                None => return Err(RepositoryError::NotFound(user_id))
            };
            Self::replace(&tree, user_id, current, goal)
        }).await
    }

    #[tracing::instrument(skip(self))]
    async fn get_by_user_id(&self, user_id: i64) -> Result<Option<Goal>,RepositoryError> {
        self.run("get_by_user_id", move |_db,tree| {
            match tree.get(Self::key(user_id))? {
                Some(v) => Ok(Some(Self::decode(&v)?)),
                None => Ok(None)
            }
        }).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, user_id: i64) -> Result<bool,RepositoryError> {
        self.run("delete", move |_db,tree| {
            Ok(tree.remove(Self::key(user_id))?.is_some())
        }).await
    }
}
