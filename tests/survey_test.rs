mod common;

use serde_json::json;

use common::Fixture;
use tunedb::{
    DbError,
    envelope::{self, FAILURE},
    models::Building,
    survey::CAMPUS_BUILDINGS,
};

fn submission() -> serde_json::Value {
    json!({
        "profile": { "gradeLevel": "Junior", "age": 20, "major": "CS", "residence": "off-campus" },
        "responses": [
            { "buildingName": "Gordon Library", "STUDY_QUALITY_0": 5, "MISC_0": true, "MISC_1": false },
            { "buildingName": "Gordon Library", "STUDY_QUALITY_0": 3, "MISC_0": true, "MISC_1": "" },
            { "buildingName": "Olin Hall", "STUDY_QUALITY_0": 2, "LIVING_AND_EATING_3": 4 },
        ],
    })
}

#[tokio::test]
async fn seeding_buildings_is_idempotent() {
    let fx = Fixture::new().await;
    let db = fx.survey();

    assert_eq!(db.seed_buildings().await.unwrap(), CAMPUS_BUILDINGS.len());
    assert_eq!(db.seed_buildings().await.unwrap(), 0);

    let extra = [
        Building { name: String::from("Gordon Library"), category: String::from("Academic") },
        Building { name: String::from("Innovation Studio"), category: String::from("Academic") },
    ];
    assert_eq!(db.insert_buildings(&extra).await.unwrap(), 1);
}

#[tokio::test]
async fn survey_submission_returns_receipt() {
    let fx = Fixture::new().await;
    let db = fx.survey();

    let first = db.insert_survey_response(&submission()).await.unwrap();
    let second = db.insert_survey_response(&submission()).await.unwrap();

    assert_eq!(first.responses_added, 3);
    assert!(second.response_id > first.response_id);

    let rows = db.fetch_all_responses().await.unwrap();
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0]["responseID"], json!(first.response_id));
    assert_eq!(rows[0]["MISC_0"], json!(1));
    assert_eq!(rows[1]["MISC_1"], json!(null));
}

#[tokio::test]
async fn rejected_responses_leave_no_profile_behind() {
    let fx = Fixture::new().await;
    let db = fx.survey();

    let mut bad = submission();
    bad["responses"][2] = json!({ "STUDY_QUALITY_0": 1 });
    assert!(matches!(
        db.insert_survey_response(&bad).await,
        Err(DbError::TypeMismatch(_))
    ));

    let mut empty = submission();
    empty["responses"] = json!([]);
    assert!(matches!(
        db.insert_survey_response(&empty).await,
        Err(DbError::MalformedBatch(_))
    ));

    assert!(db.fetch_all_responses().await.unwrap().is_empty());
    let receipt = db.insert_survey_response(&submission()).await.unwrap();
    assert_eq!(receipt.response_id, 1);
}

#[tokio::test]
async fn averages_are_grouped_by_building() {
    let fx = Fixture::new().await;
    let db = fx.survey();
    db.insert_survey_response(&submission()).await.unwrap();

    let averages = db.fetch_response_averages().await.unwrap();

    let library = &averages["Gordon Library"];
    assert_eq!(library["STUDY_QUALITY_0"], 4.0);
    assert_eq!(library["MISC_0"], 2.0);
    assert_eq!(library["MISC_1"], 0.0);
    assert!(!library.contains_key("STUDY_QUALITY_1"));
    assert!(!library.contains_key("responseID"));

    let olin = &averages["Olin Hall"];
    assert_eq!(olin["STUDY_QUALITY_0"], 2.0);
    assert_eq!(olin["LIVING_AND_EATING_3"], 4.0);
}

#[tokio::test]
async fn configured_choice_questions_are_summed() {
    let fx = Fixture::with_config(|config| {
        config.choice_questions = vec![String::from("STUDY_QUALITY_0")];
    })
    .await;
    let db = fx.survey();
    db.insert_survey_response(&submission()).await.unwrap();

    let averages = db.fetch_response_averages().await.unwrap();
    assert_eq!(averages["Gordon Library"]["STUDY_QUALITY_0"], 8.0);
    assert_eq!(averages["Gordon Library"]["MISC_0"], 1.0);
}

#[tokio::test]
async fn no_responses_means_no_averages() {
    let fx = Fixture::new().await;

    let reply = envelope::reply(fx.survey().fetch_response_averages().await, FAILURE).unwrap();
    assert!(reply.payload.is_empty());
}

#[tokio::test]
async fn a3_answers_are_stored_in_order() {
    let fx = Fixture::new().await;
    let db = fx.survey();

    for round in ["1", "2"] {
        db.insert_a3_answer(&json!({
            "ansRadar": round, "userAnsRadar": "3",
            "ansRing": "12", "userAnsRing": "10",
            "ansBar": "0.4", "userAnsBar": "0.5",
        }))
        .await
        .unwrap();
    }

    let answers = db.fetch_a3_answers().await.unwrap();
    assert_eq!(answers.len(), 2);
    assert_eq!(answers[0].ans_radar, "1");
    assert_eq!(answers[1].user_ans_bar, "0.5");

    let err = db.insert_a3_answer(&json!({ "ansRadar": "1" })).await.unwrap_err();
    assert_eq!(err.error_code(), 20);
}

#[tokio::test]
async fn large_response_batches_are_stored_whole() {
    let fx = Fixture::new().await;
    let db = fx.survey();

    let responses: Vec<_> = (0..3_000)
        .map(|i| json!({ "buildingName": "Gordon Library", "STUDY_QUALITY_0": i % 5 + 1 }))
        .collect();
    let receipt = db
        .insert_survey_response(&json!({ "profile": {}, "responses": responses }))
        .await
        .unwrap();

    assert_eq!(receipt.responses_added, 3_000);
    assert_eq!(db.fetch_all_responses().await.unwrap().len(), 3_000);
    assert_eq!(db.fetch_response_averages().await.unwrap()["Gordon Library"]["STUDY_QUALITY_0"], 3.0);
}
