use itertools::Itertools;
use serde_json::{Map, Value};

use std::collections::{BTreeMap, HashSet};

use crate::models::{BUILDING_KEY, RESPONSE_ID_KEY};

/// Per-building, per-question statistics.
pub type Averages = BTreeMap<String, BTreeMap<String, f64>>;

/// Yes/no questions, counted rather than averaged unless configured otherwise.
pub fn default_choice_questions() -> Vec<String> {
    (0..5).map(|i| format!("MISC_{i}")).collect()
}

/// Summarizes raw survey rows by building.
#[derive(Debug, Clone)]
pub struct Aggregator {
    choice_questions: HashSet<String>,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(default_choice_questions())
    }
}

impl Aggregator {
    pub fn new<I, S>(choice_questions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { choice_questions: choice_questions.into_iter().map(Into::into).collect() }
    }

    pub fn is_choice(&self, question: &str) -> bool {
        self.choice_questions.contains(question)
    }

    /// Groups rows by building and reduces each question's answers.
    ///
    /// Choice questions are summed (their answers are already 0/1); everything else is
    /// averaged. Null and non-numeric answers are skipped, and a question with no usable
    /// answers for a building is left out of that building's map. Rows without a building
    /// name are ignored.
    pub fn aggregate(&self, rows: &[Map<String, Value>]) -> Averages {
        rows.iter()
            .filter_map(|row| row.get(BUILDING_KEY).and_then(Value::as_str).map(|b| (b, row)))
            .into_group_map()
            .into_iter()
            .map(|(building, rows)| (building.to_string(), self.summarize(&rows)))
            .collect()
    }

    fn summarize(&self, rows: &[&Map<String, Value>]) -> BTreeMap<String, f64> {
        let mut answers: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for row in rows {
            for (question, answer) in row.iter() {
                if question == BUILDING_KEY || question == RESPONSE_ID_KEY {
                    continue;
                }
                if let Some(value) = numeric_answer(answer) {
                    answers.entry(question.as_str()).or_default().push(value);
                }
            }
        }

        answers
            .into_iter()
            .map(|(question, values)| {
                let sum: f64 = values.iter().sum();
                let stat = if self.is_choice(question) { sum } else { sum / values.len() as f64 };
                (question.to_string(), stat)
            })
            .collect()
    }
}

/// Reads an answer as a number. Booleans count as 0/1; numeric strings are parsed.
fn numeric_answer(answer: &Value) -> Option<f64> {
    match answer {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
