use serde_json::{Map, Value};

use crate::{models::CandidateSuggestion, services::providers::GenerationError};

const DEFAULT_MATCH_SCORE: i64 = 85;

fn malformed(reason: impl Into<String>) -> GenerationError {
    GenerationError::MalformedOutput(reason.into())
}

fn required_text(object: &Map<String, Value>, field: &str) -> Result<String, GenerationError> {
    match object.get(field) {
        Some(Value::String(text)) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        Some(Value::Number(number)) if field == "gameId" => Ok(number.to_string()),
        Some(_) => Err(malformed(format!("`{}` is empty or not a string", field))),
        None => Err(malformed(format!("missing `{}`", field))),
    }
}

fn match_score(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|score| score.round() as i64))
            .unwrap_or(DEFAULT_MATCH_SCORE),
        _ => DEFAULT_MATCH_SCORE,
    }
}

fn similar_to(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Decodes raw generator output into a candidate suggestion
///
/// The whole (trimmed) text must be one JSON object. `gameId`, `title` and
/// `reasoning` are required; a numeric `gameId` is accepted as its decimal
/// string. `matchScore` defaults to 85 and `similarTo` to empty.
pub fn parse_suggestion(raw: &str) -> Result<CandidateSuggestion, GenerationError> {
    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|e| malformed(format!("not valid JSON: {}", e)))?;

    let Value::Object(object) = value else {
        return Err(malformed("expected a JSON object"));
    };

    Ok(CandidateSuggestion {
        game_id: required_text(&object, "gameId")?,
        title: required_text(&object, "title")?,
        reasoning: required_text(&object, "reasoning")?,
        match_score: match_score(object.get("matchScore")),
        similar_to: similar_to(object.get("similarTo")),
    })
}
