use serde::{Deserialize, Deserializer, Serialize};

/// One successful poll result from the metadata endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "DocumentIncarnation", default)]
    pub document_incarnation: i64,

    #[serde(rename = "Events", default, deserialize_with = "null_as_default")]
    pub events: Vec<Event>,
}

/// A single scheduled maintenance event as reported upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    #[serde(rename = "EventId", deserialize_with = "null_as_default")]
    pub event_id: String,

    /// e.g. Reboot, Redeploy, Freeze
    #[serde(rename = "EventType", deserialize_with = "null_as_default")]
    pub event_type: String,

    #[serde(rename = "ResourceType", deserialize_with = "null_as_default")]
    pub resource_type: String,

    #[serde(rename = "Resources", deserialize_with = "null_as_default")]
    pub resources: Vec<String>,

    /// e.g. Scheduled, Started
    #[serde(rename = "EventStatus", deserialize_with = "null_as_default")]
    pub event_status: String,

    /// Raw timestamp string, empty when the event has no lower bound
    #[serde(rename = "NotBefore", deserialize_with = "null_as_default")]
    pub not_before: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
