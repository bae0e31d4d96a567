//! Storage trigger events and their delivery envelopes.
//!
//! Three encodings are accepted:
//!
//! - CloudEvents structured mode: `{"specversion": .., "data": {bucket, ..}}`
//! - background functions: `{"data": {bucket, ..}, "context": {..}}`
//! - CloudEvents binary mode or a bare resource: `{bucket, ..}`, with the
//!   event metadata carried out of band (see [`TriggerContext`]).

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// The storage object change that triggered an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerEvent {
    /// Bucket that received the new object.
    pub bucket: String,
    /// Name of the object that was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Object generation, as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<String>,
    /// Content type of the new object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Size of the new object in bytes, as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl TriggerEvent {
    /// Creates an event for `bucket` with no object details.
    pub fn for_bucket(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            name: None,
            generation: None,
            content_type: None,
            size: None,
        }
    }

    /// Sets the triggering object name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Checks that the event names a bucket.
    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            return Err(Error::invalid_input().with_message("event has an empty bucket name"));
        }

        Ok(())
    }
}

/// Delivery metadata for an event. Logged only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerContext {
    /// Unique event id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// Event type, e.g. `google.cloud.storage.object.v1.finalized`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Time the event occurred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
    /// Resource or subject the event refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
}

impl TriggerContext {
    /// Fills fields that are unset here from `other`.
    pub fn or(self, other: TriggerContext) -> Self {
        Self {
            event_id: self.event_id.or(other.event_id),
            event_type: self.event_type.or(other.event_type),
            timestamp: self.timestamp.or(other.timestamp),
            resource: self.resource.or(other.resource),
        }
    }
}

/// A parsed trigger: the event and its delivery metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    /// The object change.
    pub event: TriggerEvent,
    /// Delivery metadata.
    pub context: TriggerContext,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope {
    Structured(StructuredEvent),
    Background(BackgroundEvent),
    Bare(TriggerEvent),
}

#[derive(Deserialize)]
struct StructuredEvent {
    #[allow(dead_code)]
    specversion: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "type")]
    event_type: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    time: Option<Timestamp>,
    data: TriggerEvent,
}

#[derive(Deserialize)]
struct BackgroundEvent {
    data: TriggerEvent,
    #[serde(default)]
    context: BackgroundContext,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackgroundContext {
    #[serde(default)]
    event_id: Option<String>,
    #[serde(default)]
    event_type: Option<String>,
    #[serde(default)]
    timestamp: Option<Timestamp>,
    #[serde(default)]
    resource: Option<Value>,
}

impl Trigger {
    /// Parses any of the supported envelope encodings.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let envelope: Envelope = serde_json::from_slice(body).map_err(|err| {
            Error::from_source(crate::ErrorKind::InvalidInput, err)
                .with_message("body is not a storage trigger event")
        })?;

        let trigger = match envelope {
            Envelope::Structured(event) => Self {
                context: TriggerContext {
                    event_id: event.id,
                    event_type: event.event_type,
                    timestamp: event.time,
                    resource: event.subject.or(event.source),
                },
                event: event.data,
            },
            Envelope::Background(event) => Self {
                context: TriggerContext {
                    event_id: event.context.event_id,
                    event_type: event.context.event_type,
                    timestamp: event.context.timestamp,
                    resource: event.context.resource.and_then(resource_name),
                },
                event: event.data,
            },
            Envelope::Bare(event) => Self {
                event,
                context: TriggerContext::default(),
            },
        };

        trigger.event.validate()?;
        Ok(trigger)
    }

    /// Supplements the parsed context with out-of-band metadata.
    pub fn with_context(mut self, context: TriggerContext) -> Self {
        self.context = context.or(self.context);
        self
    }
}

impl From<TriggerEvent> for Trigger {
    fn from(event: TriggerEvent) -> Self {
        Self {
            event,
            context: TriggerContext::default(),
        }
    }
}

/// Background resources are either a plain string or `{ "name": .. }`.
fn resource_name(resource: Value) -> Option<String> {
    match resource {
        Value::String(name) => Some(name),
        Value::Object(mut map) => match map.remove("name") {
            Some(Value::String(name)) => Some(name),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ErrorKind;

    fn parse(value: Value) -> Result<Trigger> {
        Trigger::from_slice(value.to_string().as_bytes())
    }

    #[test]
    fn parses_structured_cloud_event() {
        let trigger = parse(json!({
            "specversion": "1.0",
            "id": "1234",
            "type": "google.cloud.storage.object.v1.finalized",
            "source": "//storage.googleapis.com/projects/_/buckets/imgs",
            "subject": "objects/a.tif",
            "time": "2024-05-01T12:00:00Z",
            "data": { "bucket": "imgs", "name": "a.tif", "size": "1024" }
        }))
        .unwrap();

        assert_eq!(trigger.event.bucket, "imgs");
        assert_eq!(trigger.event.name.as_deref(), Some("a.tif"));
        assert_eq!(trigger.event.size.as_deref(), Some("1024"));
        assert_eq!(trigger.context.event_id.as_deref(), Some("1234"));
        assert_eq!(trigger.context.resource.as_deref(), Some("objects/a.tif"));
        assert!(trigger.context.timestamp.is_some());
    }

    #[test]
    fn parses_background_event_with_object_resource() {
        let trigger = parse(json!({
            "data": { "bucket": "imgs", "name": "b.tif" },
            "context": {
                "eventId": "42",
                "eventType": "google.storage.object.finalize",
                "resource": { "service": "storage.googleapis.com", "name": "projects/_/buckets/imgs/objects/b.tif" }
            }
        }))
        .unwrap();

        assert_eq!(trigger.event.bucket, "imgs");
        assert_eq!(
            trigger.context.event_type.as_deref(),
            Some("google.storage.object.finalize")
        );
        assert_eq!(
            trigger.context.resource.as_deref(),
            Some("projects/_/buckets/imgs/objects/b.tif")
        );
    }

    #[test]
    fn parses_bare_resource() {
        let trigger = parse(json!({ "bucket": "imgs", "contentType": "image/tiff" })).unwrap();
        assert_eq!(trigger.event.bucket, "imgs");
        assert_eq!(trigger.event.content_type.as_deref(), Some("image/tiff"));
        assert_eq!(trigger.context, TriggerContext::default());
    }

    #[test]
    fn rejects_missing_or_empty_bucket() {
        let error = parse(json!({ "name": "a.tif" })).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);

        let error = parse(json!({ "bucket": "  " })).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn out_of_band_context_takes_precedence() {
        let trigger = parse(json!({ "bucket": "imgs" }))
            .unwrap()
            .with_context(TriggerContext {
                event_id: Some("ce-1".into()),
                ..Default::default()
            });

        assert_eq!(trigger.context.event_id.as_deref(), Some("ce-1"));
        assert!(trigger.context.event_type.is_none());
    }
}
