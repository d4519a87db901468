//! Statement construction. Nothing here touches a connection until a caller runs the
//! returned [`Statement`]; all payload validation happens while building.

use itertools::Itertools;
use rusqlite::{
    Connection, Row,
    types::{Value as SqlValue, ValueRef},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{
    error::{DBResult, DbError},
    leaderboard::LeaderboardQuery,
    models::{
        self, A3Answer, BUILDING_KEY, Building, Category, FEEDBACK_FIELDS, Input, NewSession,
        QUESTION_KEYS, SurveyProfile, User,
    },
};

/// SQL text plus its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Statement {
    fn new(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self { sql: sql.into(), params }
    }

    /// Runs the statement, returning the number of affected rows.
    pub fn execute(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.prepare(&self.sql)?
            .execute(rusqlite::params_from_iter(self.params.iter()))
    }

    pub fn query_map<T, F>(&self, conn: &Connection, f: F) -> DBResult<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = conn.prepare(&self.sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(self.params.iter()), f)?
            .collect::<rusqlite::Result<Vec<T>>>()?;
        Ok(rows)
    }

    /// The first row, if any.
    pub fn query_optional<T, F>(&self, conn: &Connection, f: F) -> DBResult<Option<T>>
    where
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = conn.prepare(&self.sql)?;
        let mut rows = stmt.query(rusqlite::params_from_iter(self.params.iter()))?;
        Ok(rows.next()?.map(f).transpose()?)
    }
}

/// Bound variables SQLite accepts in one statement.
pub const MAX_BOUND_PARAMS: usize = 32_766;

/// Splits rows of `width` values into as few `INSERT`s as the bound-variable limit allows.
///
/// `head` is everything up to and including `VALUES`. Run the result in one transaction
/// to keep the batch all-or-nothing.
fn multi_row_insert(head: &str, width: usize, rows: Vec<Vec<SqlValue>>) -> Vec<Statement> {
    let row = format!("({})", vec!["?"; width].join(", "));
    let per_statement = (MAX_BOUND_PARAMS / width).max(1);

    rows.into_iter()
        .chunks(per_statement)
        .into_iter()
        .map(|chunk| {
            let chunk: Vec<_> = chunk.collect();
            let placeholders = vec![row.as_str(); chunk.len()].join(", ");
            Statement::new(format!("{head} {placeholders}"), chunk.concat())
        })
        .collect()
}

/// Runs statements in order, returning the total number of affected rows.
pub fn execute_all(stmts: &[Statement], conn: &Connection) -> rusqlite::Result<usize> {
    stmts.iter().map(|stmt| stmt.execute(conn)).sum()
}

/////*============== VALIDATION ==============*/
/// Deserializes a request payload. Any shape or type problem is a `TypeMismatch`.
pub fn parse<T: DeserializeOwned>(payload: &Value) -> DBResult<T> {
    Ok(T::deserialize(payload)?)
}

fn require_non_empty(field: &str, value: &str) -> DBResult<()> {
    if value.is_empty() {
        return Err(DbError::TypeMismatch(format!("`{field}` must be a non-empty string")));
    }
    Ok(())
}

fn require_array<'a>(payload: &'a Value, what: &str) -> DBResult<&'a [Value]> {
    match payload {
        Value::Array(items) if items.is_empty() => {
            Err(DbError::MalformedBatch(format!("{what} must not be empty")))
        }
        Value::Array(items) => Ok(items),
        _ => Err(DbError::MalformedBatch(format!("{what} must be an array"))),
    }
}

/// Converts a JSON value to something SQLite can store. Booleans become 1/0 and
/// objects or arrays are stored as their JSON text.
pub fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        nested => SqlValue::Text(nested.to_string()),
    }
}

/// Reads a row of any shape into a JSON object keyed by column name.
pub fn row_to_map(row: &Row<'_>) -> rusqlite::Result<Map<String, Value>> {
    let names = row.as_ref().column_names();
    let mut map = Map::with_capacity(names.len());
    for (idx, name) in names.into_iter().enumerate() {
        let value = match row.get_ref(idx)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::from(i),
            ValueRef::Real(f) => Value::from(f),
            ValueRef::Text(text) => Value::String(String::from_utf8_lossy(text).into_owned()),
            ValueRef::Blob(bytes) => Value::from(bytes.to_vec()),
        };
        map.insert(name.to_string(), value);
    }
    Ok(map)
}

/////*============== USERS ==============*/
/// Validates a user payload: all three fields must be non-empty strings.
pub fn insert_user(payload: &Value) -> DBResult<(User, Statement)> {
    let user: User = parse(payload)?;
    require_non_empty("spotifyID", &user.spotify_id)?;
    require_non_empty("displayName", &user.display_name)?;
    require_non_empty("imageUrl", &user.image_url)?;

    let stmt = Statement::new(
        "INSERT INTO users (spotifyID, displayName, imageUrl) VALUES (?1, ?2, ?3)",
        vec![
            SqlValue::Text(user.spotify_id.clone()),
            SqlValue::Text(user.display_name.clone()),
            SqlValue::Text(user.image_url.clone()),
        ],
    );
    Ok((user, stmt))
}

pub fn select_user(spotify_id: &str) -> Statement {
    Statement::new(
        "SELECT * FROM users WHERE spotifyID = ?1",
        vec![SqlValue::Text(spotify_id.to_string())],
    )
}

/////*============== SESSIONS ==============*/
pub fn insert_session(payload: &Value) -> DBResult<(NewSession, Statement)> {
    let session: NewSession = parse(payload)?;
    if !session.score.is_finite() {
        return Err(DbError::TypeMismatch(String::from("`score` must be a finite number")));
    }

    let stmt = Statement::new(
        "INSERT INTO sessions (score, songID, userID, gameVersion) VALUES (?1, ?2, ?3, ?4)",
        vec![
            SqlValue::Real(session.score),
            SqlValue::Text(session.song_id.clone()),
            SqlValue::Text(session.user_id.clone()),
            SqlValue::Text(session.game_version.clone()),
        ],
    );
    Ok((session, stmt))
}

pub fn select_sessions_of_user(user_id: &str) -> Statement {
    Statement::new(
        "SELECT * FROM sessions WHERE userID = ?1 ORDER BY sessionID",
        vec![SqlValue::Text(user_id.to_string())],
    )
}

pub fn select_session(session_id: i64) -> Statement {
    Statement::new(
        "SELECT * FROM sessions WHERE sessionID = ?1",
        vec![SqlValue::Integer(session_id)],
    )
}

/// Highest scores first, bounded by the query's clamped limit. Equal scores fall back to
/// the older session first.
pub fn top_sessions(query: &LeaderboardQuery) -> Statement {
    let optional_text = |value: &Option<String>| match value {
        Some(text) => SqlValue::Text(text.clone()),
        None => SqlValue::Null,
    };

    Statement::new(
        "SELECT * FROM sessions
         WHERE (?1 IS NULL OR userID = ?1)
           AND (?2 IS NULL OR gameVersion = ?2)
         ORDER BY score DESC, sessionID ASC
         LIMIT ?3",
        vec![
            optional_text(&query.user_id),
            optional_text(&query.game_version),
            SqlValue::Integer(query.limit()),
        ],
    )
}

/////*============== INPUTS ==============*/
/// Validates every element before producing the batch's inserts.
///
/// One bad element rejects the whole batch, as does an element naming a different session
/// than the first.
pub fn insert_inputs(payload: &Value) -> DBResult<(Vec<Input>, Vec<Statement>)> {
    require_array(payload, "inputs")?;
    let inputs: Vec<Input> = parse(payload)?;

    let session_id = inputs[0].session_id;
    if let Some(stray) = inputs.iter().find(|input| input.session_id != session_id) {
        return Err(DbError::TypeMismatch(format!(
            "batch mixes sessions {session_id} and {}",
            stray.session_id
        )));
    }

    let rows = inputs
        .iter()
        .map(|input| {
            vec![
                SqlValue::Integer(input.session_id),
                SqlValue::Text(input.action.clone()),
                SqlValue::Text(input.timestamp.clone()),
                SqlValue::Text(input.kind.clone()),
            ]
        })
        .collect();

    let stmts = multi_row_insert(
        "INSERT INTO inputs (sessionID, action, timestamp, type) VALUES",
        4,
        rows,
    );
    Ok((inputs, stmts))
}

pub fn select_inputs_of_session(session_id: i64) -> Statement {
    Statement::new(
        "SELECT * FROM inputs WHERE sessionID = ?1 ORDER BY rowid",
        vec![SqlValue::Integer(session_id)],
    )
}

/// Dumps one whole table. The table name comes from a closed set, never from input.
pub fn select_all(category: Category) -> Statement {
    let sql = match category {
        Category::Users => "SELECT * FROM users",
        Category::Sessions => "SELECT * FROM sessions ORDER BY sessionID",
        Category::Inputs => "SELECT * FROM inputs ORDER BY rowid",
    };
    Statement::new(sql, vec![])
}

/////*============== FEEDBACK ==============*/
/// Binds an already-encoded feedback form. Absent fields are stored as NULL.
pub fn insert_feedback_form(form: &models::FeedbackForm) -> Statement {
    let columns = FEEDBACK_FIELDS.join(", ");
    let placeholders = (1..=FEEDBACK_FIELDS.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let params = FEEDBACK_FIELDS
        .iter()
        .map(|field| form.get(*field).map_or(SqlValue::Null, to_sql_value))
        .collect();

    Statement::new(
        format!("INSERT INTO feedbackFormResponses ({columns}) VALUES ({placeholders})"),
        params,
    )
}

pub fn select_feedback_forms() -> Statement {
    Statement::new("SELECT * FROM feedbackFormResponses ORDER BY formID", vec![])
}

pub fn insert_irb_name(name: &str) -> DBResult<Statement> {
    require_non_empty("name", name)?;
    Ok(Statement::new(
        "INSERT INTO IRBNames (name) VALUES (?1)",
        vec![SqlValue::Text(name.to_string())],
    ))
}

/////*============== SURVEY ==============*/
pub fn insert_building(building: &Building) -> Statement {
    Statement::new(
        "INSERT INTO WPISurveyBuildings (name, category) VALUES (?1, ?2)",
        vec![
            SqlValue::Text(building.name.clone()),
            SqlValue::Text(building.category.clone()),
        ],
    )
}

pub fn insert_profile(profile: &SurveyProfile) -> Statement {
    let optional_text = |value: &Option<String>| {
        value.as_ref().map_or(SqlValue::Null, |text| SqlValue::Text(text.clone()))
    };

    Statement::new(
        "INSERT INTO WPISurveyProfiles (gradeLevel, age, major, residence) VALUES (?1, ?2, ?3, ?4)",
        vec![
            optional_text(&profile.grade_level),
            profile.age.map_or(SqlValue::Null, SqlValue::Integer),
            optional_text(&profile.major),
            optional_text(&profile.residence),
        ],
    )
}

/// Maps each response's question keys onto the response columns, keyed by `profile_id`.
///
/// Missing or empty answers become NULL and booleans become 1/0. Keys outside the known
/// question set are ignored.
pub fn insert_responses(responses: &Value, profile_id: i64) -> DBResult<(usize, Vec<Statement>)> {
    let responses = require_array(responses, "responses")?;
    let width = QUESTION_KEYS.len() + 2;

    let mut rows = Vec::with_capacity(responses.len());
    for response in responses {
        let Value::Object(response) = response else {
            return Err(DbError::TypeMismatch(String::from("each response must be an object")));
        };
        let building = response
            .get(BUILDING_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| DbError::TypeMismatch(format!("`{BUILDING_KEY}` must be a string")))?;

        let mut row = Vec::with_capacity(width);
        row.push(SqlValue::Integer(profile_id));
        row.push(SqlValue::Text(building.to_string()));
        row.extend(QUESTION_KEYS.iter().map(|key| match response.get(*key) {
            None | Some(Value::Null) => SqlValue::Null,
            Some(Value::String(s)) if s.is_empty() => SqlValue::Null,
            Some(answer) => to_sql_value(answer),
        }));
        rows.push(row);
    }

    let head = format!(
        "INSERT INTO WPISurveyResponses (responseID, {BUILDING_KEY}, {}) VALUES",
        QUESTION_KEYS.join(", ")
    );
    Ok((responses.len(), multi_row_insert(&head, width, rows)))
}

pub fn select_all_responses() -> Statement {
    Statement::new("SELECT * FROM WPISurveyResponses ORDER BY responseID, rowid", vec![])
}

pub fn insert_a3_answer(payload: &Value) -> DBResult<(A3Answer, Statement)> {
    let answer: A3Answer = parse(payload)?;
    let fields = [
        ("ansRadar", &answer.ans_radar),
        ("userAnsRadar", &answer.user_ans_radar),
        ("ansRing", &answer.ans_ring),
        ("userAnsRing", &answer.user_ans_ring),
        ("ansBar", &answer.ans_bar),
        ("userAnsBar", &answer.user_ans_bar),
    ];
    for (field, value) in fields {
        require_non_empty(field, value)?;
    }

    let params = fields.iter().map(|(_, value)| SqlValue::Text(value.to_string())).collect();
    let stmt = Statement::new(
        "INSERT INTO a3Answers (ansRadar, userAnsRadar, ansRing, userAnsRing, ansBar, userAnsBar)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params,
    );
    Ok((answer, stmt))
}

pub fn select_a3_answers() -> Statement {
    Statement::new("SELECT * FROM a3Answers ORDER BY rowid", vec![])
}
