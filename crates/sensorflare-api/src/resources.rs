// Resource endpoints
//
// Sensors and actuators addressed by URI. `resources()` deals with a list
// whose elements are JSON-ish fragments rather than JSON values; those are
// split by hand, see `parse_resource_fragment`.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::{SensorflareClient, parse_json};
use crate::error::Error;
use crate::models::{RawResourceDescription, ResourceDetails, ResourceKind};

impl SensorflareClient {
    /// Normalized details of a resource, or `None` when the service reports
    /// no `isa` for it.
    ///
    /// `GET resource/{uri}/description`. When the description carries no
    /// `name`, one is derived: a sensor is named after what it `observes`,
    /// an actuator after what it `controls`, and anything else after its
    /// URI minus the first path segment.
    pub async fn get_resource_details(
        &self,
        resource_uri: &str,
    ) -> Result<Option<ResourceDetails>, Error> {
        let raw: RawResourceDescription = self
            .get_json(&format!(
                "resource/{}/description",
                resource_uri.replace(' ', "%20")
            ))
            .await?;
        Ok(normalize_details(raw, resource_uri))
    }

    /// All resources of the user, key → value.
    ///
    /// `GET resource`. Each array element is a string such as
    /// `{"temperature":"gw1/temp"}`; the key is the text before the first
    /// `:` and the value the text up to the next one, with `{`, `}` and `"`
    /// stripped from both.
    pub async fn resources(&self) -> Result<BTreeMap<String, String>, Error> {
        let fragments: Vec<String> = self.get_json("resource").await?;
        let mut out = BTreeMap::new();
        for fragment in &fragments {
            if let Some((key, value)) = parse_resource_fragment(fragment) {
                out.insert(key, value);
            } else {
                warn!(fragment = fragment.as_str(), "skipping resource entry without ':' separator");
            }
        }
        Ok(out)
    }

    /// Raw description body of a resource.
    ///
    /// `GET resource/{uri}/description`
    pub async fn resource_description(&self, resource_uri: &str) -> Result<String, Error> {
        self.get_page(&format!("resource/{resource_uri}/description"))
            .await
    }

    /// `GET resource/{resource_id}/property/{property_id}`
    pub async fn resource_remove_property(
        &self,
        resource_id: i64,
        property_id: i64,
    ) -> Result<bool, Error> {
        self.get_ok(&format!("resource/{resource_id}/property/{property_id}"))
            .await
    }

    /// Remove every property of a resource.
    ///
    /// `GET resource/{resource_id}/property`
    pub async fn resource_clear_property(&self, resource_id: i64) -> Result<bool, Error> {
        self.get_ok(&format!("resource/{resource_id}/property"))
            .await
    }

    /// Drive an actuator (or overwrite a reading) with a new value.
    ///
    /// `POST report/set/{value}/{uri}` with no body. Succeeds iff the reply
    /// has a `status` equal to "ok" in any case.
    pub async fn set_resource_value(&self, resource_uri: &str, value: f64) -> Result<bool, Error> {
        debug!(resource_uri, value, "setting resource value");
        let body = self
            .post_page(&format!("report/set/{value:?}/{resource_uri}"), &[])
            .await?;
        let reply: Value = parse_json(&body)?;
        Ok(reply
            .get("status")
            .and_then(Value::as_str)
            .is_some_and(|s| s.eq_ignore_ascii_case("ok")))
    }
}

fn normalize_details(raw: RawResourceDescription, resource_uri: &str) -> Option<ResourceDetails> {
    let isa = raw.isa?;

    let name = match raw.name {
        Some(name) => name,
        None => match (ResourceKind::from_isa(&isa), &raw.observes, &raw.controls) {
            (ResourceKind::Sensor, Some(observes), _) => observes.clone(),
            (ResourceKind::Actuator, _, Some(controls)) => controls.clone(),
            _ => name_from_uri(resource_uri),
        },
    };

    Some(ResourceDetails {
        name,
        isa,
        observes: raw.observes.unwrap_or_default(),
        controls: raw.controls.unwrap_or_default(),
    })
}

/// Drop the first `/`-separated segment of a URI. Trailing empty segments
/// are ignored, so `gw/temp/` names as `temp`.
fn name_from_uri(uri: &str) -> String {
    let mut parts: Vec<&str> = uri.split('/').collect();
    while parts.len() > 1 && parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    parts.get(1..).map(|rest| rest.join("/")).unwrap_or_default()
}

/// Split a `{"key":"value"}`-style fragment. `None` when there is no `:`.
fn parse_resource_fragment(fragment: &str) -> Option<(String, String)> {
    let mut parts = fragment.split(':');
    let key = parts.next()?;
    let value = parts.next()?;
    Some((strip_fragment_chars(key), strip_fragment_chars(value)))
}

fn strip_fragment_chars(s: &str) -> String {
    s.chars().filter(|c| !matches!(c, '{' | '}' | '"')).collect()
}
