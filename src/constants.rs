/// Metric and protocol constants shared across the exporter.
/// Exposed metric names are part of the scrape contract; do not rename them.

// Event families rebuilt on every successful poll
pub const DOCUMENT_INCARNATION_METRIC: &str = "scheduledevent_document_incarnation";
pub const EVENT_METRIC: &str = "scheduledevent_event";

pub const DOCUMENT_INCARNATION_HELP: &str = "Scheduled events document incarnation";
pub const EVENT_HELP: &str =
    "Scheduled event (value: NotBefore as unix seconds, 1 if unset, 0 if unparseable)";

// Label names, in exposition order
pub const LABEL_EVENT_ID: &str = "eventID";
pub const LABEL_EVENT_TYPE: &str = "eventType";
pub const LABEL_RESOURCE_TYPE: &str = "resourceType";
pub const LABEL_RESOURCE: &str = "resource";
pub const LABEL_EVENT_STATUS: &str = "eventStatus";
pub const LABEL_NOT_BEFORE: &str = "notBefore";

/// Sample value for an event without a NotBefore timestamp
pub const VALUE_NO_TIMESTAMP: f64 = 1.0;
/// Sample value for an event whose NotBefore could not be parsed
pub const VALUE_BAD_TIMESTAMP: f64 = 0.0;

// The metadata service only answers requests that opt in with this header
pub const METADATA_HEADER: &str = "Metadata";
pub const METADATA_HEADER_VALUE: &str = "true";

pub const DEFAULT_API_URL: &str =
    "http://169.254.169.254/metadata/scheduledevents?api-version=2017-08-01";

pub const METRICS_PATH: &str = "/metrics";
pub const HEALTH_PATH: &str = "/healthz";
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";
