//! `/api/leaderboard` handlers.

use std::time::{SystemTime, UNIX_EPOCH};

use aimtrainer_shared::protocol::{
    round1, ErrorResponse, GameMode, LeaderboardEntry, SubmitResponse, DEFAULT_LIMIT, MAX_LIMIT,
    MAX_SCORE, NAME_MAX_CHARS, TAG_MAX_CHARS,
};
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use rand::Rng;
use serde::Deserialize;
use serde_json::Value;

use crate::state::AppState;
use crate::store::{ScoreRecord, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Leaderboard not configured")]
    NotConfigured,
    #[error("Invalid payload")]
    InvalidPayload,
    #[error("Invalid score")]
    InvalidScore,
    #[error("Invalid mode")]
    InvalidMode,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Internal server error")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidPayload | Self::InvalidScore | Self::InvalidMode => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Store(e) = &self {
            tracing::error!("leaderboard store failed: {}", e);
        }
        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        if status == StatusCode::METHOD_NOT_ALLOWED {
            return (status, [(header::ALLOW, "GET, POST")], body).into_response();
        }
        (status, body).into_response()
    }
}

/// A submission that passed validation, normalized for storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub mode: GameMode,
    pub name: String,
    pub tag: String,
    pub score: u32,
    pub accuracy: f64,
    pub hits: u32,
    pub misses: u32,
}

/// Any truthy scalar as text: a non-empty string, a non-zero number, or
/// `true`. Arrays and objects are not names.
fn present_text(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Lenient numeric coercion; anything unusable is 0.
fn number_or_zero(v: Option<&Value>) -> f64 {
    let n = match v {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

fn count(v: Option<&Value>) -> u32 {
    number_or_zero(v).round().max(0.0) as u32
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

pub fn parse_submission(body: &Value) -> Result<Submission, ApiError> {
    let obj = body.as_object().ok_or(ApiError::InvalidPayload)?;

    let mode = obj.get("mode").and_then(Value::as_str).filter(|s| !s.is_empty());
    let name = present_text(obj.get("name"));
    let tag = present_text(obj.get("tag"));
    let score = obj.get("score").filter(|v| !v.is_null());
    let (Some(mode), Some(name), Some(tag), Some(score)) = (mode, name, tag, score) else {
        return Err(ApiError::InvalidPayload);
    };
    let mode = GameMode::parse(mode).ok_or(ApiError::InvalidPayload)?;

    let score = score
        .as_f64()
        .filter(|s| (0.0..=MAX_SCORE).contains(s))
        .ok_or(ApiError::InvalidScore)?;

    Ok(Submission {
        mode,
        name: truncate(&name, NAME_MAX_CHARS),
        tag: truncate(&tag, TAG_MAX_CHARS),
        score: score.round() as u32,
        accuracy: round1(number_or_zero(obj.get("accuracy"))),
        hits: count(obj.get("hits")),
        misses: count(obj.get("misses")),
    })
}

/// Leading integer of `s` after whitespace and an optional sign, so
/// `"10abc"` is 10 and `"1.9"` is 1.
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Overlong digit runs saturate; the result is clamped anyway.
    let n = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -n } else { n })
}

/// Missing, zero or unparsable means the default; otherwise 1..=MAX_LIMIT.
pub fn parse_limit(raw: Option<&str>) -> usize {
    match raw.and_then(leading_int) {
        None | Some(0) => DEFAULT_LIMIT,
        Some(n) => n.clamp(1, MAX_LIMIT as i64) as usize,
    }
}

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `<unix-ms>-<6 base36 chars>`
pub fn new_entry_id(now_ms: u64, rng: &mut impl Rng) -> String {
    let suffix: String = (0..6)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("{}-{}", now_ms, suffix)
}

fn unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// `POST /api/leaderboard`: record a finished session.
pub async fn submit_score(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SubmitResponse>, ApiError> {
    let store = state.store()?;
    let value: Value = serde_json::from_slice(&body).map_err(|_| ApiError::InvalidPayload)?;
    let sub = parse_submission(&value)?;

    let ts = unix_ms();
    let id = new_entry_id(ts, &mut rand::thread_rng());
    let record = ScoreRecord {
        id: id.clone(),
        name: sub.name,
        tag: sub.tag,
        score: sub.score,
        accuracy: sub.accuracy,
        hits: sub.hits,
        misses: sub.misses,
        ts,
    };
    store.insert(sub.mode, record, state.max_entries_per_mode)?;
    tracing::info!("{} score {} submitted as {}", sub.mode.as_str(), sub.score, id);

    Ok(Json(SubmitResponse { ok: true, id }))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub mode: Option<String>,
    pub limit: Option<String>,
}

/// `GET /api/leaderboard?mode=&limit=`: top entries, best first.
pub async fn list_scores(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let store = state.store()?;
    let mode = query
        .mode
        .as_deref()
        .and_then(GameMode::parse)
        .ok_or(ApiError::InvalidMode)?;
    let limit = parse_limit(query.limit.as_deref());

    let entries = store
        .top(mode, limit)?
        .into_iter()
        .enumerate()
        .map(|(i, record)| record.into_entry(i as u32 + 1))
        .collect();
    Ok(Json(entries))
}

/// Any other method. An unconfigured leaderboard still answers 503 first.
pub async fn method_not_allowed(State(state): State<AppState>) -> ApiError {
    match state.store() {
        Ok(_) => ApiError::MethodNotAllowed,
        Err(e) => e,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use serde_json::json;

    fn valid_body() -> Value {
        json!({
            "mode": "GRIDSHOT",
            "name": "ada",
            "tag": "ada#1234",
            "score": 4210.6,
            "accuracy": 87.25,
            "hits": 45,
            "misses": 7
        })
    }

    #[test]
    fn valid_submission_is_normalized() {
        let sub = parse_submission(&valid_body()).unwrap();
        assert_eq!(sub.mode, GameMode::Gridshot);
        assert_eq!(sub.score, 4211);
        assert_eq!(sub.accuracy, 87.3);
        assert_eq!((sub.hits, sub.misses), (45, 7));
    }

    #[test]
    fn missing_fields_are_invalid_payload() {
        for field in ["mode", "name", "tag", "score"] {
            let mut body = valid_body();
            body.as_object_mut().unwrap().remove(field);
            assert!(
                matches!(parse_submission(&body), Err(ApiError::InvalidPayload)),
                "missing {}",
                field
            );
        }
    }

    #[test]
    fn empty_name_is_invalid_payload() {
        let mut body = valid_body();
        body["name"] = json!("");
        assert!(matches!(parse_submission(&body), Err(ApiError::InvalidPayload)));
    }

    #[test]
    fn unknown_mode_is_invalid_payload() {
        let mut body = valid_body();
        body["mode"] = json!("gridshot");
        assert!(matches!(parse_submission(&body), Err(ApiError::InvalidPayload)));
    }

    #[test]
    fn non_object_is_invalid_payload() {
        assert!(matches!(parse_submission(&json!([1, 2])), Err(ApiError::InvalidPayload)));
    }

    #[test]
    fn score_range_is_enforced() {
        let mut body = valid_body();
        body["score"] = json!(1_000_000);
        assert!(matches!(parse_submission(&body), Err(ApiError::InvalidScore)));
        body["score"] = json!(-1);
        assert!(matches!(parse_submission(&body), Err(ApiError::InvalidScore)));
        body["score"] = json!("500");
        assert!(matches!(parse_submission(&body), Err(ApiError::InvalidScore)));
        body["score"] = json!(999_999);
        assert_eq!(parse_submission(&body).unwrap().score, 999_999);
        body["score"] = json!(0);
        assert_eq!(parse_submission(&body).unwrap().score, 0);
    }

    #[test]
    fn long_name_and_tag_are_truncated() {
        let mut body = valid_body();
        body["name"] = json!("x".repeat(40));
        body["tag"] = json!("y".repeat(40));
        let sub = parse_submission(&body).unwrap();
        assert_eq!(sub.name.chars().count(), 20);
        assert_eq!(sub.tag.chars().count(), 30);
    }

    #[test]
    fn sloppy_stats_are_coerced() {
        let mut body = valid_body();
        body["accuracy"] = json!("nope");
        body["hits"] = json!("12");
        body["misses"] = json!(-3);
        let sub = parse_submission(&body).unwrap();
        assert_eq!(sub.accuracy, 0.0);
        assert_eq!(sub.hits, 12);
        assert_eq!(sub.misses, 0);
    }

    #[test]
    fn numeric_name_is_accepted() {
        let mut body = valid_body();
        body["name"] = json!(1337);
        assert_eq!(parse_submission(&body).unwrap().name, "1337");
    }

    #[test]
    fn boolean_name_follows_truthiness() {
        let mut body = valid_body();
        body["name"] = json!(true);
        body["tag"] = json!(true);
        let sub = parse_submission(&body).unwrap();
        assert_eq!(sub.name, "true");
        assert_eq!(sub.tag, "true");

        body["name"] = json!(false);
        assert!(matches!(parse_submission(&body), Err(ApiError::InvalidPayload)));
        body["name"] = json!(["ada"]);
        assert!(matches!(parse_submission(&body), Err(ApiError::InvalidPayload)));
    }

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(parse_limit(None), 50);
        assert_eq!(parse_limit(Some("abc")), 50);
        assert_eq!(parse_limit(Some("0")), 50);
        assert_eq!(parse_limit(Some("10")), 10);
        assert_eq!(parse_limit(Some("500")), 100);
        assert_eq!(parse_limit(Some("-4")), 1);
    }

    #[test]
    fn limit_uses_leading_integer() {
        assert_eq!(parse_limit(Some("10abc")), 10);
        assert_eq!(parse_limit(Some("1.9")), 1);
        assert_eq!(parse_limit(Some("  7 ")), 7);
        assert_eq!(parse_limit(Some("+12")), 12);
        assert_eq!(parse_limit(Some("0.5")), 50);
        assert_eq!(parse_limit(Some("-")), 50);
        assert_eq!(parse_limit(Some("99999999999999999999999")), 100);
    }

    #[test]
    fn entry_id_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let id = new_entry_id(1_700_000_000_123, &mut rng);
        let (ts, suffix) = id.split_once('-').unwrap();
        assert_eq!(ts, "1700000000123");
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn error_statuses() {
        assert_eq!(ApiError::NotConfigured.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ApiError::InvalidScore.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            ApiError::Store(StoreError::Poisoned).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Store(StoreError::Poisoned).to_string(),
            "Internal server error"
        );
    }
}
