// The rest endpoints are thin wrappers: they authenticate the caller and then
// run the matching graphql operation on the caller's behalf.

use std::sync::Arc;

use async_graphql::Variables;
use bytes::Bytes;
use serde::Deserialize;
use warp::{filters::BoxedFilter, http::StatusCode, reject::Rejection, reply::Reply, Filter};
use utoipa::{ToSchema, OpenApi};

use crate::modules::auth::{filters::authenticated, Caller};
use crate::modules::goals::graphql::types::GoalView;
use crate::modules::{graphql_reply, GoalSchema, MAX_BODY_BYTES};
use crate::types::Goal;
use crate::state::GlobalState;


const NO_ACTIVE_GOAL : &str = "No active goal found for the user";

const CREATE_GOAL_MUTATION : &str = r#"
    mutation CreateGoal($userId: Int!, $weight: Float!, $bodyStructure: String!) {
        createGoal(userId: $userId, weight: $weight, body_structure: $bodyStructure) {
            goalId
            userId
            weight
            body_structure
        }
    }
"#;

const UPDATE_GOAL_MUTATION : &str = r#"
    mutation UpdateGoal($goalId: String!, $userId: Int!, $weight: Float!, $bodyStructure: String!) {
        updateGoal(goalId: $goalId, userId: $userId, weight: $weight, body_structure: $bodyStructure) {
            goalId
            userId
            weight
            body_structure
        }
    }
"#;


#[derive(OpenApi)]
#[openapi(
    paths(
        register_goal,
        modify_goal,
        get_goal
    ),
    components(schemas(GoalRequest, GoalView, GoalRecord)),
    tags(
        (name = "Goals", description = "Registration and lookup of the caller's goal")
    )
)]
struct ApiDoc;


/// Body of the register and modify requests. Missing fields fall back to
/// their zero values and are then rejected by validation.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct GoalRequest {
    weight: f64,
    body_structure: String,
}

/// A stored goal as returned by `GET /get/goal`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct GoalRecord {
    goal_id: String,
    user_id: i64,
    weight: f64,
    body_structure: String,
}

impl From<Goal> for GoalRecord {
    fn from(goal: Goal) -> Self {
        GoalRecord {
            goal_id: goal.goal_id,
            user_id: goal.user_id,
            weight: goal.weight,
            body_structure: goal.body_structure
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl warp::reject::Reject for ApiError {}

impl ApiError {
    fn rejection(status:StatusCode,message:&str) -> Rejection {
        warp::reject::custom(ApiError { status, message: message.to_string() })
    }
}

fn parse_goal_request(body:&Bytes) -> Result<GoalRequest,Rejection> {
    serde_json::from_slice(body).map_err(|e|{
        tracing::debug!("rejecting goal request body: {e}");
        ApiError::rejection(StatusCode::BAD_REQUEST, "Failed to parse request body")
    })
}


pub fn routes(state: Arc<GlobalState>, schema: GoalSchema) -> BoxedFilter<(impl Reply,)> {

    let state_for_modify = state.clone();
    let state_for_get = state.clone();
    let with_schema = warp::any().map(move || schema.clone());

    let register = warp::path!("register" / "goal")
        .and(warp::post())
        .and(authenticated(state.auth.clone()))
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and(with_schema.clone())
        .and_then(register_goal);

    let modify = warp::path!("modify" / "goal")
        .and(warp::post())
        .and(authenticated(state.auth.clone()))
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and(warp::any().map(move || state_for_modify.clone()))
        .and(with_schema)
        .and_then(modify_goal);

    let get = warp::path!("get" / "goal")
        .and(warp::get())
        .and(authenticated(state.auth.clone()))
        .and(warp::any().map(move || state_for_get.clone()))
        .and_then(get_goal);

    let api_doc_route = warp::path("api-doc.json")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| warp::reply::json(&ApiDoc::openapi()));

    api_doc_route.or(register).or(modify).or(get).boxed()
}


#[utoipa::path(
    post,
    path = "/register/goal",
    tag = "Goals",
    request_body = GoalRequest,
    responses(
        (status = 200, description = "Goal registered, wrapped in a 'createGoal' object", body = GoalView),
        (status = 400, description = "Failed to parse request body"),
        (status = 401, description = "Missing, malformed or rejected bearer token"),
        (status = 413, description = "Request body too large"),
        (status = 500, description = "The goal could not be registered, for example because one is already active")
    )
)]
#[tracing::instrument(skip_all, fields(user_id = caller.user_id))]
async fn register_goal(caller: Caller, body: Bytes, schema: GoalSchema) -> Result<impl Reply, Rejection> {

    let goal = parse_goal_request(&body)?;

    let request = async_graphql::Request::new(CREATE_GOAL_MUTATION)
        .variables(Variables::from_json(serde_json::json!({
            "userId": caller.user_id,
            "weight": goal.weight,
            "bodyStructure": goal.body_structure
        })))
        .data(caller.identity());

    let response = schema.execute(request).await;
    Ok(graphql_reply(response, StatusCode::INTERNAL_SERVER_ERROR))
}


#[utoipa::path(
    post,
    path = "/modify/goal",
    tag = "Goals",
    request_body = GoalRequest,
    responses(
        (status = 200, description = "Goal updated, wrapped in an 'updateGoal' object", body = GoalView),
        (status = 400, description = "Failed to parse request body"),
        (status = 401, description = "Missing, malformed or rejected bearer token"),
        (status = 404, description = "The caller has no active goal"),
        (status = 413, description = "Request body too large"),
        (status = 500, description = "The goal could not be updated")
    )
)]
#[tracing::instrument(skip_all, fields(user_id = caller.user_id))]
async fn modify_goal(caller: Caller, body: Bytes, state: Arc<GlobalState>, schema: GoalSchema) -> Result<impl Reply, Rejection> {

    let goal = parse_goal_request(&body)?;

    let existing = match state.factory.get_goal_by_user_id(caller.user_id).await {
        Ok(Some(existing)) => existing,
        Ok(None) => return Err(ApiError::rejection(StatusCode::NOT_FOUND, NO_ACTIVE_GOAL)),
        Err(e) => {
            tracing::warn!("goal lookup failed: {e}");
            return Err(ApiError::rejection(StatusCode::NOT_FOUND, NO_ACTIVE_GOAL))
        }
    };

    let request = async_graphql::Request::new(UPDATE_GOAL_MUTATION)
        .variables(Variables::from_json(serde_json::json!({
            "goalId": existing.goal_id,
            "userId": caller.user_id,
            "weight": goal.weight,
            "bodyStructure": goal.body_structure
        })))
        .data(caller.identity());

    let response = schema.execute(request).await;
    Ok(graphql_reply(response, StatusCode::INTERNAL_SERVER_ERROR))
}


#[utoipa::path(
    get,
    path = "/get/goal",
    tag = "Goals",
    responses(
        (status = 200, description = "The caller's active goal", body = GoalRecord),
        (status = 401, description = "Missing, malformed or rejected bearer token"),
        (status = 404, description = "The caller has no active goal"),
        (status = 500, description = "Failed to retrieve goal")
    )
)]
#[tracing::instrument(skip_all, fields(user_id = caller.user_id))]
async fn get_goal(caller: Caller, state: Arc<GlobalState>) -> Result<impl Reply, Rejection> {
    match state.factory.get_goal_by_user_id(caller.user_id).await {
        Ok(Some(goal)) => Ok(warp::reply::json(&GoalRecord::from(goal))),
        Ok(None) => Err(ApiError::rejection(StatusCode::NOT_FOUND, NO_ACTIVE_GOAL)),
        Err(e) => {
            tracing::warn!("goal lookup failed: {e}");
            Err(ApiError::rejection(StatusCode::INTERNAL_SERVER_ERROR, "Failed to retrieve goal"))
        }
    }
}
