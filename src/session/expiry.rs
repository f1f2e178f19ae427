//! Access token expiry check.
//!
//! Only the `exp` claim of the payload segment is read. The signature is never
//! verified here; the resource service does that. Anything that cannot be
//! decoded counts as expired.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use chrono::Utc;
use serde_json::Value;

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// JWTs use the url-safe alphabet; some issuers emit the standard one.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// Returns true unless `token` carries an `exp` claim in the future.
pub fn is_expired(token: Option<&str>) -> bool {
    is_expired_at(token, Utc::now().timestamp_millis())
}

/// Same as [`is_expired`] against an explicit clock, in milliseconds since epoch.
pub fn is_expired_at(token: Option<&str>, now_ms: i64) -> bool {
    match token.and_then(expiry_seconds) {
        Some(exp) => exp * 1000.0 <= now_ms as f64,
        None => true,
    }
}

/// Reads the `exp` claim, or `None` if the token is not decodable.
fn expiry_seconds(token: &str) -> Option<f64> {
    let payload = token.split('.').nth(1)?;

    let bytes = URL_SAFE_LENIENT
        .decode(payload)
        .or_else(|_| STANDARD_LENIENT.decode(payload))
        .ok()?;

    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(claims) => claims.get("exp").and_then(Value::as_f64),
        _ => None,
    }
}
