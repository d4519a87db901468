use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use std::str::FromStr;

use crate::error::DbError;

/////*============== TUNE MOUNTAIN ==============*/
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "spotifyID")]
    pub spotify_id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// A recorded play-through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "sessionID")]
    pub session_id: i64,
    pub score: f64,
    #[serde(rename = "songID")]
    pub song_id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "gameVersion")]
    pub game_version: String,
}

/// A session as submitted, before storage assigns it an ID.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewSession {
    pub score: f64,
    #[serde(rename = "songID")]
    pub song_id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "gameVersion")]
    pub game_version: String,
}

/// A single timestamped action within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input {
    #[serde(rename = "sessionID")]
    pub session_id: i64,
    pub action: String,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// The sessions of one user, or a leaderboard slice when `user_id` is absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionList {
    #[serde(rename = "userID", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub sessions: Vec<Session>,
}

/// A session together with its inputs, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionDetail {
    #[serde(rename = "sessionInfo")]
    pub session_info: Session,
    pub inputs: Vec<Input>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputBatch {
    #[serde(rename = "sessionID")]
    pub session_id: i64,
    #[serde(rename = "inputsAdded")]
    pub inputs_added: Vec<Input>,
}

/// Tables that can be dumped wholesale for the demo visualizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Users,
    Sessions,
    Inputs,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Users => "users",
            Category::Sessions => "sessions",
            Category::Inputs => "inputs",
        }
    }
}

impl FromStr for Category {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "users" => Ok(Category::Users),
            "sessions" => Ok(Category::Sessions),
            "inputs" => Ok(Category::Inputs),
            other => Err(DbError::TypeMismatch(format!("unknown category '{other}'"))),
        }
    }
}

/// Every row of one category, serialized under the category's name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryRows {
    Users(Vec<User>),
    Sessions(Vec<Session>),
    Inputs(Vec<Input>),
}

impl CategoryRows {
    pub fn len(&self) -> usize {
        match self {
            CategoryRows::Users(rows) => rows.len(),
            CategoryRows::Sessions(rows) => rows.len(),
            CategoryRows::Inputs(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub const FEEDBACK_FIELDS: [&str; 15] = [
    "songID", "q1", "q2", "q3", "q4", "q5", "q6", "q7", "q8", "q9", "q10", "q11", "q12", "q13",
    "q14",
];

/// The only feedback field that may be left empty.
pub const OPTIONAL_FEEDBACK_FIELD: &str = "q14";

/// A feedback form with nested answers already flattened to strings.
pub type FeedbackForm = Map<String, Value>;

/////*============== DATA VISUALIZATION SURVEY ==============*/
pub const BUILDING_KEY: &str = "buildingName";
pub const RESPONSE_ID_KEY: &str = "responseID";

/// Survey questions in column order.
pub const QUESTION_KEYS: [&str; 23] = [
    "STUDY_QUALITY_0",
    "STUDY_QUALITY_1",
    "STUDY_QUALITY_2",
    "STUDY_QUALITY_3",
    "STUDY_QUALITY_4",
    "STUDY_QUALITY_5",
    "STUDY_QUALITY_6",
    "STUDY_QUALITY_7",
    "STUDY_QUALITY_8",
    "STUDY_QUALITY_9",
    "STUDY_QUALITY_10",
    "LIVING_AND_EATING_0",
    "LIVING_AND_EATING_1",
    "LIVING_AND_EATING_2",
    "LIVING_AND_EATING_3",
    "LIVING_AND_EATING_4",
    "LIVING_AND_EATING_5",
    "LIVING_AND_EATING_6",
    "MISC_0",
    "MISC_1",
    "MISC_2",
    "MISC_3",
    "MISC_4",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub name: String,
    pub category: String,
}

/// Who answered a survey. Every answer is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyProfile {
    #[serde(rename = "gradeLevel", default)]
    pub grade_level: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub residence: Option<String>,
}

/// One profile plus its per-building responses, submitted together.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SurveySubmission {
    pub profile: SurveyProfile,
    pub responses: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyReceipt {
    #[serde(rename = "responseID")]
    pub response_id: i64,
    #[serde(rename = "responsesAdded")]
    pub responses_added: usize,
}

/// Answers to the A3 chart-reading exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct A3Answer {
    pub ans_radar: String,
    pub user_ans_radar: String,
    pub ans_ring: String,
    pub user_ans_ring: String,
    pub ans_bar: String,
    pub user_ans_bar: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn session_lists_omit_missing_user() {
        let list = SessionList { user_id: None, sessions: vec![] };
        assert_eq!(serde_json::to_value(&list).unwrap(), json!({ "sessions": [] }));
    }

    #[test]
    fn category_rows_nest_under_category_name() {
        let rows = CategoryRows::Users(vec![User {
            spotify_id: String::from("id"),
            display_name: String::from("name"),
            image_url: String::from("url"),
        }]);
        assert_eq!(
            serde_json::to_value(&rows).unwrap(),
            json!({ "users": [{ "spotifyID": "id", "displayName": "name", "imageUrl": "url" }] })
        );
    }

    #[test]
    fn categories_parse_from_route_names() {
        assert_eq!("inputs".parse::<Category>().unwrap(), Category::Inputs);
        assert_eq!(Category::Sessions.as_str(), "sessions");
        assert!("feedbackFormResponses".parse::<Category>().is_err());
    }
}
