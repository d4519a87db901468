use rusqlite::Connection;

use crate::{error::DBResult, pool::Pool};

pub const USERS_SCHEMA: &str =
    "CREATE TABLE IF NOT EXISTS users (
        spotifyID      TEXT        PRIMARY KEY,
        displayName    TEXT        NOT NULL,
        imageUrl       TEXT        NOT NULL
    )";

pub const SESSIONS_SCHEMA: &str =
    "CREATE TABLE IF NOT EXISTS sessions (
        sessionID      INTEGER     PRIMARY KEY AUTOINCREMENT,
        score          REAL        NOT NULL,
        songID         TEXT        NOT NULL,
        userID         TEXT        NOT NULL    REFERENCES users(spotifyID),
        gameVersion    TEXT        NOT NULL
    )";

pub const INPUTS_SCHEMA: &str =
    "CREATE TABLE IF NOT EXISTS inputs (
        sessionID      INTEGER     NOT NULL    REFERENCES sessions(sessionID),
        action         TEXT        NOT NULL,
        timestamp      TEXT        NOT NULL,
        type           TEXT        NOT NULL
    )";

// Answers are left untyped: they may be numbers, text, or JSON-encoded objects.
pub const FEEDBACK_SCHEMA: &str =
    "CREATE TABLE IF NOT EXISTS feedbackFormResponses (
        formID         INTEGER     PRIMARY KEY,
        songID,
        q1, q2, q3, q4, q5, q6, q7, q8, q9, q10, q11, q12, q13,
        q14
    )";

pub const IRB_NAMES_SCHEMA: &str =
    "CREATE TABLE IF NOT EXISTS IRBNames (
        name           TEXT        NOT NULL
    )";

pub const SURVEY_BUILDINGS_SCHEMA: &str =
    "CREATE TABLE IF NOT EXISTS WPISurveyBuildings (
        name           TEXT        PRIMARY KEY,
        category       TEXT        NOT NULL
    )";

pub const SURVEY_PROFILES_SCHEMA: &str =
    "CREATE TABLE IF NOT EXISTS WPISurveyProfiles (
        profileID      INTEGER     PRIMARY KEY AUTOINCREMENT,
        gradeLevel     TEXT,
        age            INTEGER,
        major          TEXT,
        residence      TEXT
    )";

pub const SURVEY_RESPONSES_SCHEMA: &str =
    "CREATE TABLE IF NOT EXISTS WPISurveyResponses (
        responseID           INTEGER     NOT NULL    REFERENCES WPISurveyProfiles(profileID),
        buildingName         TEXT        NOT NULL,

        STUDY_QUALITY_0, STUDY_QUALITY_1, STUDY_QUALITY_2, STUDY_QUALITY_3,
        STUDY_QUALITY_4, STUDY_QUALITY_5, STUDY_QUALITY_6, STUDY_QUALITY_7,
        STUDY_QUALITY_8, STUDY_QUALITY_9, STUDY_QUALITY_10,

        LIVING_AND_EATING_0, LIVING_AND_EATING_1, LIVING_AND_EATING_2,
        LIVING_AND_EATING_3, LIVING_AND_EATING_4, LIVING_AND_EATING_5,
        LIVING_AND_EATING_6,

        MISC_0, MISC_1, MISC_2, MISC_3, MISC_4
    )";

pub const A3_ANSWERS_SCHEMA: &str =
    "CREATE TABLE IF NOT EXISTS a3Answers (
        ansRadar       TEXT        NOT NULL,
        userAnsRadar   TEXT        NOT NULL,
        ansRing        TEXT        NOT NULL,
        userAnsRing    TEXT        NOT NULL,
        ansBar         TEXT        NOT NULL,
        userAnsBar     TEXT        NOT NULL
    )";

const ALL_SCHEMAS: [(&str, &str); 9] = [
    ("users", USERS_SCHEMA),
    ("sessions", SESSIONS_SCHEMA),
    ("inputs", INPUTS_SCHEMA),
    ("feedbackFormResponses", FEEDBACK_SCHEMA),
    ("IRBNames", IRB_NAMES_SCHEMA),
    ("WPISurveyBuildings", SURVEY_BUILDINGS_SCHEMA),
    ("WPISurveyProfiles", SURVEY_PROFILES_SCHEMA),
    ("WPISurveyResponses", SURVEY_RESPONSES_SCHEMA),
    ("a3Answers", A3_ANSWERS_SCHEMA),
];

/// Creates every table that doesn't exist yet.
pub fn create_tables(conn: &Connection) -> DBResult<()> {
    for (table, schema) in ALL_SCHEMAS {
        log::debug!("[create_tables] creating {table} table...");
        conn.execute(schema, [])?;
    }

    Ok(())
}

pub async fn initialize_db(pool: &Pool) -> DBResult<()> {
    pool.run(|conn| create_tables(conn)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_created_idempotently() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count as usize, ALL_SCHEMAS.len());
    }
}
