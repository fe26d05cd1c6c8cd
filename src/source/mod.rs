//! Snapshot sources.
//!
//! A [`DataSource`] produces one decoded [`Payload`] per call. The poll loop
//! calls it once per tick and treats any error as a skipped tick.

pub mod file;
pub mod http;

pub use file::FileSource;
pub use http::HttpSource;

use crate::error::FetchError;
use crate::models::{Payload, Snapshot};
use futures::future::BoxFuture;
use serde_json::Value;

/// Something that can be polled for the latest snapshot.
pub trait DataSource: Send + Sync {
    /// Fetch and decode the latest payload.
    fn fetch(&self) -> BoxFuture<'_, Result<Payload, FetchError>>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// Decode a poll response body.
///
/// `{}` is the no-data sentinel. Any other object must carry an integer
/// `timestamp` and a `detections` array whose items each have a string
/// `class` and a numeric `confidence`; anything else is malformed. An
/// empty `detections` array is valid data.
pub fn parse_payload(body: &[u8]) -> Result<Payload, FetchError> {
    let value: Value = serde_json::from_slice(body)?;

    match value {
        Value::Object(ref map) if map.is_empty() => Ok(Payload::Empty),
        Value::Object(_) => {
            let snapshot: Snapshot = serde_json::from_value(value)?;
            Ok(Payload::Snapshot(snapshot))
        }
        other => Err(FetchError::Malformed(format!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
