use std::sync::Arc;

use async_graphql::Variables;

use crate::modules::auth::tests::StaticAuthApi;
use crate::modules::auth::{AuthApi, BearerToken, RequestIdentity};
use crate::modules::goals::factory::{ConcreteGoalFactory, GoalFactory};
use crate::modules::goals::state::{GoalRepository, RepositoryError, SledGoalRepository};
use crate::modules::{create_schema, GoalSchema};
use crate::state::GlobalState;
use crate::types::{Goal, GoalInput};

fn setup() -> (GoalSchema, Arc<dyn GoalFactory>) {
    setup_with(Arc::new(SledGoalRepository::new_temporary()))
}

fn setup_with(repository: Arc<dyn GoalRepository>) -> (GoalSchema, Arc<dyn GoalFactory>) {
    let factory : Arc<dyn GoalFactory> = Arc::new(ConcreteGoalFactory::new(repository));
    let auth : Arc<dyn AuthApi> = Arc::new(
        StaticAuthApi::default()
            .with_user("alice",1)
            .with_user("bob",2)
    );
    let state = GlobalState::new(factory.clone(), auth);
    (create_schema(&state), factory)
}

async fn execute_as(schema:&GoalSchema,token:&str,query:&str,variables:serde_json::Value) -> async_graphql::Response {
    let token = BearerToken::from_header(Some(format!("Bearer {token}").as_str())).unwrap();
    let request = async_graphql::Request::new(query)
        .variables(Variables::from_json(variables))
        .data(RequestIdentity::new(token));
    schema.execute(request).await
}

fn first_error(response:&async_graphql::Response) -> String {
    response.errors.first().map(|e|e.message.clone()).unwrap_or_default()
}

const CREATE : &str = r#"
    mutation ($userId: Int!, $weight: Float!, $body: String!) {
        createGoal(userId: $userId, weight: $weight, body_structure: $body) { goalId userId weight body_structure }
    }
"#;

const UPDATE : &str = r#"
    mutation ($goalId: String!, $userId: Int!, $weight: Float!, $body: String!) {
        updateGoal(goalId: $goalId, userId: $userId, weight: $weight, body_structure: $body) { goalId userId weight body_structure }
    }
"#;

const GET : &str = r#"
    query ($userId: Int!) {
        getGoalById(userId: $userId) { goalId userId weight body_structure }
    }
"#;

#[tokio::test]
async fn user_id_is_resolved_from_the_token() {
    let (schema,_) = setup();
    let response = execute_as(&schema, "bob", "{ userId }", serde_json::json!({})).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(response.data.into_json().unwrap(), serde_json::json!({ "userId": 2 }));
}

#[tokio::test]
async fn user_id_without_token() {
    let (schema,_) = setup();
    let response = schema.execute("{ userId }").await;
    assert_eq!(first_error(&response), "no authorization token found");
}

#[tokio::test]
async fn unknown_token_fails_resolution() {
    let (schema,_) = setup();
    let response = execute_as(&schema, "mallory", "{ userId }", serde_json::json!({})).await;
    assert_eq!(first_error(&response), "authentication API returned error");
}

#[tokio::test]
async fn create_goal() {
    let (schema,factory) = setup();
    let response = execute_as(&schema, "alice", CREATE, serde_json::json!({
        "userId": 1, "weight": 72.5, "body": "athletic"
    })).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let data = response.data.into_json().unwrap();
    let goal = &data["createGoal"];
    assert_eq!(goal["userId"], 1);
    assert_eq!(goal["weight"], 72.5);
    assert_eq!(goal["body_structure"], "athletic");

    let stored = factory.get_goal_by_user_id(1).await.unwrap().unwrap();
    assert_eq!(goal["goalId"], stored.goal_id.as_str());
}

#[tokio::test]
async fn only_one_active_goal_per_user() {
    let (schema,_) = setup();
    let vars = serde_json::json!({ "userId": 1, "weight": 72.5, "body": "athletic" });
    assert!(execute_as(&schema, "alice", CREATE, vars.clone()).await.errors.is_empty());

    let second = execute_as(&schema, "alice", CREATE, vars).await;
    assert_eq!(first_error(&second), "user already has an active goal");
}

/// Never has a goal on lookup, yet every insert collides with one.
struct RacingRepository;

#[async_trait::async_trait]
impl GoalRepository for RacingRepository {
    async fn create(&self, goal: Goal) -> Result<Goal,RepositoryError> {
        Err(RepositoryError::Conflict(goal.user_id))
    }
    async fn update(&self, user_id: i64, _goal: Goal) -> Result<Goal,RepositoryError> {
        Err(RepositoryError::NotFound(user_id))
    }
    async fn get_by_user_id(&self, _user_id: i64) -> Result<Option<Goal>,RepositoryError> {
        Ok(None)
    }
    async fn delete(&self, _user_id: i64) -> Result<bool,RepositoryError> {
        Ok(false)
    }
}

#[tokio::test]
async fn insert_conflict_after_lookup_reports_active_goal() {
    let (schema,_) = setup_with(Arc::new(RacingRepository));
    let response = execute_as(&schema, "alice", CREATE, serde_json::json!({
        "userId": 1, "weight": 72.5, "body": "athletic"
    })).await;
    assert_eq!(first_error(&response), "user already has an active goal");
}

#[tokio::test]
async fn create_goal_validates_input() {
    let (schema,_) = setup();
    let response = execute_as(&schema, "alice", CREATE, serde_json::json!({
        "userId": 1, "weight": -1.0, "body": "athletic"
    })).await;
    assert_eq!(first_error(&response), "invalid goal input data");
}

#[tokio::test]
async fn cannot_act_on_behalf_of_someone_else() {
    let (schema,_) = setup();
    let response = execute_as(&schema, "alice", CREATE, serde_json::json!({
        "userId": 2, "weight": 72.5, "body": "athletic"
    })).await;
    assert_eq!(first_error(&response), "userId does not match the authenticated user");

    let response = execute_as(&schema, "alice", GET, serde_json::json!({ "userId": 2 })).await;
    assert_eq!(first_error(&response), "userId does not match the authenticated user");
}

#[tokio::test]
async fn update_goal_requires_ownership() {
    let (schema,factory) = setup();
    let created = factory.create_goal(GoalInput { user_id: 1, weight: 90.0, body_structure: "bulky".into() }).await.unwrap();

    let wrong_id = execute_as(&schema, "alice", UPDATE, serde_json::json!({
        "goalId": "000000000000000000000000", "userId": 1, "weight": 85.0, "body": "lean"
    })).await;
    assert_eq!(first_error(&wrong_id), "goal not found or does not belong to the user");

    let ok = execute_as(&schema, "alice", UPDATE, serde_json::json!({
        "goalId": created.goal_id, "userId": 1, "weight": 85.0, "body": "lean"
    })).await;
    assert!(ok.errors.is_empty(), "{:?}", ok.errors);
    let data = ok.data.into_json().unwrap();
    assert_eq!(data["updateGoal"]["goalId"], created.goal_id.as_str());
    assert_eq!(data["updateGoal"]["weight"], 85.0);
    assert_eq!(data["updateGoal"]["body_structure"], "lean");
}

#[tokio::test]
async fn update_goal_without_goal() {
    let (schema,_) = setup();
    let response = execute_as(&schema, "bob", UPDATE, serde_json::json!({
        "goalId": "000000000000000000000000", "userId": 2, "weight": 85.0, "body": "lean"
    })).await;
    assert_eq!(first_error(&response), "goal not found or does not belong to the user");
}

#[tokio::test]
async fn get_goal_by_id() {
    let (schema,factory) = setup();

    let empty = execute_as(&schema, "bob", GET, serde_json::json!({ "userId": 2 })).await;
    assert!(empty.errors.is_empty());
    assert_eq!(empty.data.into_json().unwrap(), serde_json::json!({ "getGoalById": null }));

    factory.create_goal(GoalInput { user_id: 2, weight: 60.0, body_structure: "slim".into() }).await.unwrap();
    let found = execute_as(&schema, "bob", GET, serde_json::json!({ "userId": 2 })).await;
    let data = found.data.into_json().unwrap();
    assert_eq!(data["getGoalById"]["weight"], 60.0);
    assert_eq!(data["getGoalById"]["body_structure"], "slim");
}

#[tokio::test]
async fn delete_goal() {
    let (schema,factory) = setup();
    let created = factory.create_goal(GoalInput { user_id: 2, weight: 60.0, body_structure: "slim".into() }).await.unwrap();

    let query = "mutation ($goalId: String!) { deleteGoal(goalId: $goalId, userId: 2) }";
    let response = execute_as(&schema, "bob", query, serde_json::json!({ "goalId": created.goal_id })).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(response.data.into_json().unwrap(), serde_json::json!({ "deleteGoal": true }));
    assert!(factory.get_goal_by_user_id(2).await.unwrap().is_none());
}

#[test]
fn schema_exposes_snake_case_body_structure() {
    let (schema,_) = setup();
    let sdl = schema.sdl();
    assert!(sdl.contains("body_structure: String!"));
    assert!(sdl.contains("goalId: String!"));
    assert!(sdl.contains("createGoal("));
    assert!(sdl.contains("deleteGoal("));
}
