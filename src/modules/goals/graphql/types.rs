use async_graphql::SimpleObject;
use serde::Serialize;

use crate::types::Goal;

/// Public shape of a goal, shared by the graphql schema and the rest api.
#[derive(Clone,Debug,PartialEq,Serialize,SimpleObject,utoipa::ToSchema)]
#[graphql(name = "Goal")]
pub struct GoalView {

    #[serde(rename = "goalId")]
    pub goal_id : String,

    #[serde(rename = "userId")]
    pub user_id : i64,

    pub weight : f64,

    #[graphql(name = "body_structure")]
    pub body_structure : String,
}

impl From<Goal> for GoalView {
    fn from(goal: Goal) -> Self {
        GoalView {
            goal_id: goal.goal_id,
            user_id: goal.user_id,
            weight: goal.weight,
            body_structure: goal.body_structure
        }
    }
}

#[derive(Default)]
pub struct GoalQueryRoot;

#[derive(Default)]
pub struct GoalMutationRoot;
