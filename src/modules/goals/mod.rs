pub mod state;
pub mod factory;
pub mod graphql;
pub mod restapi;
