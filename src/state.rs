
use std::sync::Arc;

use crate::modules::auth::AuthApi;
use crate::modules::goals::factory::GoalFactory;

/// Long lived dependencies shared by every request.
pub struct GlobalState {
    pub factory : Arc<dyn GoalFactory>,
    pub auth : Arc<dyn AuthApi>,
}

impl GlobalState {
    pub fn new(factory: Arc<dyn GoalFactory>, auth: Arc<dyn AuthApi>) -> Self {
        Self {
            factory,
            auth
        }
    }
}
