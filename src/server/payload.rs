use serde_json::{Map, Value};

/// Body did not parse as a JSON object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPayload;

/// Parse a submission body. An empty body counts as `{}`.
pub fn parse_body(body: &[u8]) -> Result<Map<String, Value>, InvalidPayload> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(InvalidPayload),
    }
}

/// Numeric value of the `score` field, lenient the way browsers coerce form
/// input: numbers pass through, numeric strings parse, booleans count as
/// 1/0, and anything else (missing, null, garbage) becomes 0.
pub fn coerce_score(payload: &Map<String, Value>) -> f64 {
    payload.get("score").map(coerce_number).unwrap_or(0.0)
}

fn coerce_number(value: &Value) -> f64 {
    let n = match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_numeric_str(s),
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [single @ (Value::Number(_) | Value::String(_))] => coerce_number(single),
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

fn parse_numeric_str(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    // f64's parser also takes "inf"/"nan" spellings; those are not numbers here
    if trimmed.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Clamp a coerced score to a storable integer
pub fn to_score(n: f64) -> u64 {
    if n.is_finite() && n > 0.0 {
        n.trunc() as u64
    } else {
        0
    }
}

/// Read the stored counter. Missing or unreadable text counts as 0.
pub fn parse_stored(text: Option<&str>) -> Option<u64> {
    let text = match text {
        Some(t) => t.trim(),
        None => return Some(0),
    };
    if let Ok(n) = text.parse::<u64>() {
        return Some(n);
    }
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(to_score(n)),
        _ => None,
    }
}
