use std::convert::Infallible;
use std::sync::Arc;
pub(crate) mod auth;
pub(crate) mod goals;
use async_graphql::{EmptySubscription, Schema, http::GraphiQLSource};
use async_graphql_warp::GraphQLBadRequest;

use warp::{Filter, filters::BoxedFilter, http::{Response as HttpResponse, StatusCode}, reject::Rejection};

use crate::state::GlobalState;

use self::auth::{BearerToken, RequestIdentity, filters::{bearer_token, Unauthorized}, graphql::AuthQueryRoot};
use self::goals::graphql::types::{GoalMutationRoot, GoalQueryRoot};
use self::goals::restapi::ApiError;

#[derive(async_graphql::MergedObject, Default)]
pub struct Query(
   GoalQueryRoot,
   AuthQueryRoot
);

#[derive(async_graphql::MergedObject, Default)]
pub struct Mutation(
   GoalMutationRoot
);

pub type GoalSchema = Schema<Query,Mutation,EmptySubscription>;

/// Upper bound for request bodies read into memory.
pub(crate) const MAX_BODY_BYTES : u64 = 16 * 1024;


/// The factory and the auth api are available to every resolver, the identity
/// of the caller is attached to each request separately.
pub fn create_schema(global_state: &GlobalState) -> GoalSchema {
   Schema::build(
         Query::default(),
         Mutation::default(),
         EmptySubscription
      )
      .data(global_state.factory.clone())
      .data(global_state.auth.clone())
      .finish()
}


/// Successful executions reply with the bare `data` object, failed ones with
/// `{"errors": [...]}` and the given status.
pub(crate) fn graphql_reply(response: async_graphql::Response, error_status: StatusCode) -> warp::reply::WithStatus<warp::reply::Json> {
   if response.errors.is_empty() {
      warp::reply::with_status(warp::reply::json(&response.data), StatusCode::OK)
   } else {
      let errors = serde_json::json!({ "errors": response.errors });
      warp::reply::with_status(warp::reply::json(&errors), error_status)
   }
}


/// Creates all routes with state management pre-wired
pub fn get_all(global_state: Arc<GlobalState>) -> BoxedFilter<(impl warp::Reply,)> {

   let schema = create_schema(&global_state);

   let cors = warp::cors()
      .allow_any_origin()
      .allow_methods(vec!["POST", "GET", "OPTIONS"])
      .allow_headers(vec!["Content-Type","Authorization","origin"]);

   let graphiql = warp::path("graphiql")
      .and(warp::path::end())
      .and(warp::get())
      .map(|| {
         HttpResponse::builder()
            .header("content-type", "text/html")
            .body(GraphiQLSource::build().endpoint("/").finish())
      });

   let rest_api_routes = goals::restapi::routes(global_state.clone(), schema.clone());

   graphiql
      .or(rest_api_routes)
      .or(graphql_filter(schema))
      .recover(handle_rejection)
      .with(cors)
      .with(warp::trace::request())
      .boxed()
}


/// GET requests may carry the graphql request as a json body, otherwise the
/// query string (or the POST body) is used.
fn graphql_filter(schema: GoalSchema) -> BoxedFilter<(impl warp::Reply,)> {

   let schema_for_body = schema.clone();
   let get_with_body = warp::get()
      .and(warp::body::content_length_limit(MAX_BODY_BYTES))
      .and(warp::body::json::<async_graphql::Request>())
      .map(move |request: async_graphql::Request| (schema_for_body.clone(), request));

   let graphql_request = get_with_body
      .or(async_graphql_warp::graphql(schema))
      .unify();

   warp::path::end()
      .and(bearer_token())
      .and(graphql_request)
      .and_then(
         |token: BearerToken, (schema,request) : ( GoalSchema, async_graphql::Request )
         |async move {
            let response = schema.execute(request.data(RequestIdentity::new(token))).await;
            Ok::<_, Rejection>(graphql_reply(response, StatusCode::BAD_REQUEST))
         }).boxed()
}


async fn handle_rejection(err: Rejection) -> Result<impl warp::Reply, Infallible> {

   let (message,status) =
      if let Some(Unauthorized(message)) = err.find::<Unauthorized>() {
         (message.clone(), StatusCode::UNAUTHORIZED)
      } else if let Some(api_error) = err.find::<ApiError>() {
         (api_error.message.clone(), api_error.status)
      } else if let Some(GraphQLBadRequest(e)) = err.find::<GraphQLBadRequest>() {
         (e.to_string(), StatusCode::BAD_REQUEST)
      } else if err.is_not_found() {
         ("404 page not found".to_string(), StatusCode::NOT_FOUND)
      } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
         ("Payload Too Large".to_string(), StatusCode::PAYLOAD_TOO_LARGE)
      } else if err.find::<warp::reject::LengthRequired>().is_some() {
         ("Length Required".to_string(), StatusCode::LENGTH_REQUIRED)
      } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
         ("Method Not Allowed".to_string(), StatusCode::METHOD_NOT_ALLOWED)
      } else {
         tracing::warn!("Invalid Request: {:?}", err);
         ("INTERNAL_SERVER_ERROR".to_string(), StatusCode::INTERNAL_SERVER_ERROR)
      };

   Ok(warp::reply::with_status(message, status))
}
