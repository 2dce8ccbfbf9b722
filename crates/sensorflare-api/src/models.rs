// Wire shapes for the Sensorflare API responses.
//
// Field names here are the service's and must match exactly. Most list
// endpoints are re-shaped into maps by the endpoint modules; these types
// only exist to pull the load-bearing fields out of the JSON.

use serde::{Deserialize, Serialize};

/// `GET dashboards` envelope.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DashboardsEnvelope {
    pub dashboards: Vec<IdName>,
}

/// `GET dashboards/{id}/resources` envelope.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DashboardResourcesEnvelope {
    pub resources: Vec<IdUri>,
}

/// `{ "id": .., "name": .. }` entry used by dashboards and gateways.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IdName {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IdUri {
    pub id: i64,
    pub uri: String,
}

/// Raw `resource/{uri}/description` body. Every field is optional on the
/// wire; a missing `isa` means the service has no details for the URI.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawResourceDescription {
    pub name: Option<String>,
    pub isa: Option<String>,
    pub observes: Option<String>,
    pub controls: Option<String>,
}

/// What a resource is, as reported by its `isa` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Sensor,
    Actuator,
    Other,
}

impl ResourceKind {
    /// Classify an `isa` value. Matching ignores ASCII case.
    pub fn from_isa(isa: &str) -> Self {
        if isa.eq_ignore_ascii_case("sensor") {
            Self::Sensor
        } else if isa.eq_ignore_ascii_case("actuator") {
            Self::Actuator
        } else {
            Self::Other
        }
    }
}

/// Normalized resource details.
///
/// `observes` and `controls` are empty strings when the service omitted
/// them. `name` is always populated; see
/// [`SensorflareClient::get_resource_details`](crate::SensorflareClient::get_resource_details)
/// for how it is derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceDetails {
    pub name: String,
    pub isa: String,
    pub observes: String,
    pub controls: String,
}

impl ResourceDetails {
    pub fn kind(&self) -> ResourceKind {
        ResourceKind::from_isa(&self.isa)
    }
}
