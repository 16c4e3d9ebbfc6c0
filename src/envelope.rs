//! Builds the delivery envelope from raw measurement output.

use serde_json::Value;

use crate::error::RelayError;

/// JSON field the producer identity is written to.
pub const IDENTITY_FIELD: &str = "machine_name";

/// Decode `raw_text` as a JSON object, tag it with `producer_identity`, and
/// re-serialize it to canonical form.
///
/// Output that is not a JSON object yields [`RelayError::Decode`]; the caller
/// is expected to fall back to delivering `raw_text` verbatim, so no
/// information is lost on that path. Pure transform, no side effects.
pub fn build_envelope(raw_text: &str, producer_identity: &str) -> Result<String, RelayError> {
    let mut value: Value = serde_json::from_str(raw_text).map_err(|e| RelayError::Decode {
        reason: e.to_string(),
    })?;

    let Some(object) = value.as_object_mut() else {
        return Err(RelayError::Decode {
            reason: "top-level value is not an object".to_string(),
        });
    };

    object.insert(
        IDENTITY_FIELD.to_string(),
        Value::String(producer_identity.to_string()),
    );

    Ok(value.to_string())
}
