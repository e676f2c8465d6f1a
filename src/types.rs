
/// A goal document as it is persisted in the goal store.
/// There is at most one of these per user.
#[derive(Debug,Clone,PartialEq,serde::Serialize,serde::Deserialize)]
pub struct Goal {

    /// Assigned by the store when the goal is first created.
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub goal_id : String,

    pub user_id : i64,

    pub weight : f64,

    pub body_structure : String,
}

#[derive(Debug,Clone,PartialEq)]
pub struct GoalInput {
    pub user_id : i64,
    pub weight : f64,
    pub body_structure : String,
}

impl GoalInput {
    pub fn is_valid(&self) -> bool {
        // written this way so that NaN weights are rejected too
        self.user_id != 0 && self.weight > 0.0
    }
}

impl From<GoalInput> for Goal {
    fn from(input: GoalInput) -> Self {
        Goal {
            goal_id: String::new(),
            user_id: input.user_id,
            weight: input.weight,
            body_structure: input.body_structure
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_document_uses_underscore_id() {
        let goal = Goal { goal_id: "abc".into(), user_id: 7, weight: 80.5, body_structure: "lean".into() };
        let json = serde_json::to_value(&goal).unwrap();
        assert_eq!(json["_id"], "abc");
        assert_eq!(json["user_id"], 7);
        assert_eq!(json["body_structure"], "lean");
    }

    #[test]
    fn new_goals_are_stored_without_id() {
        let goal : Goal = GoalInput { user_id: 7, weight: 80.5, body_structure: "lean".into() }.into();
        let json = serde_json::to_value(&goal).unwrap();
        assert!(json.get("_id").is_none());
    }

    #[test]
    fn input_validation() {
        let valid = GoalInput { user_id: 1, weight: 70.0, body_structure: "".into() };
        assert!(valid.is_valid());
        assert!(!GoalInput { user_id: 0, ..valid.clone() }.is_valid());
        assert!(!GoalInput { weight: 0.0, ..valid.clone() }.is_valid());
        assert!(!GoalInput { weight: -3.0, ..valid.clone() }.is_valid());
        assert!(!GoalInput { weight: f64::NAN, ..valid }.is_valid());
    }
}
