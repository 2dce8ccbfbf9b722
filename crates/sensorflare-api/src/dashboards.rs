// Dashboard endpoints
//
// Listing, creation, deletion, location, and the resource membership of a
// dashboard. Action endpoints report success through the `{status, code}`
// acknowledgement rather than the HTTP status.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::client::{SensorflareClient, parse_json};
use crate::error::Error;
use crate::models::{DashboardResourcesEnvelope, DashboardsEnvelope};

impl SensorflareClient {
    /// Dashboard names of the authenticated user.
    ///
    /// `GET dashboard`
    pub async fn dashboards(&self) -> Result<Vec<String>, Error> {
        self.get_json("dashboard").await
    }

    /// Dashboards keyed by id.
    ///
    /// `GET dashboards` → `{ "dashboards": [{ "id", "name" }, ...] }`.
    /// On duplicate ids the last entry wins.
    pub async fn get_dashboards(&self) -> Result<BTreeMap<i64, String>, Error> {
        let envelope: DashboardsEnvelope = self.get_json("dashboards").await?;
        Ok(envelope
            .dashboards
            .into_iter()
            .map(|d| (d.id, d.name))
            .collect())
    }

    /// Resources attached to a dashboard, id → URI.
    ///
    /// `GET dashboards/{id}/resources`
    pub async fn get_dashboard_resources(
        &self,
        dashboard_id: i64,
    ) -> Result<BTreeMap<i64, String>, Error> {
        let envelope: DashboardResourcesEnvelope = self
            .get_json(&format!("dashboards/{dashboard_id}/resources"))
            .await?;
        Ok(envelope
            .resources
            .into_iter()
            .map(|r| (r.id, r.uri))
            .collect())
    }

    /// Opaque hash that changes whenever the dashboard's resources do.
    ///
    /// `GET dashboard/{id}/resources/description/hash`, body returned as is.
    pub async fn get_dashboard_refresh_hash(&self, dashboard_id: i64) -> Result<String, Error> {
        self.get_page(&format!(
            "dashboard/{dashboard_id}/resources/description/hash"
        ))
        .await
    }

    /// `GET dashboard/create/{name}`
    pub async fn create_dashboard(&self, name: &str) -> Result<Value, Error> {
        debug!(name, "creating dashboard");
        self.get_json(&format!("dashboard/create/{name}")).await
    }

    /// Set a dashboard's geolocation.
    ///
    /// `POST dashboard/{id}/location/` with form fields `longitude`, `latitude`.
    pub async fn dashboard_set_location(
        &self,
        dashboard_id: i64,
        longitude: f64,
        latitude: f64,
    ) -> Result<Value, Error> {
        debug!(dashboard_id, longitude, latitude, "setting dashboard location");
        let body = self
            .post_page(
                &format!("dashboard/{dashboard_id}/location/"),
                &[
                    ("longitude", format!("{longitude:?}")),
                    ("latitude", format!("{latitude:?}")),
                ],
            )
            .await?;
        parse_json(&body)
    }

    /// Attach a resource. Returns the service's JSON reply re-serialized.
    ///
    /// `GET dashboard/{id}/add/resource/{uri}`
    pub async fn dashboard_add_resource(
        &self,
        dashboard_id: i64,
        resource_uri: &str,
    ) -> Result<String, Error> {
        let reply: Value = self
            .get_json(&format!("dashboard/{dashboard_id}/add/resource/{resource_uri}"))
            .await?;
        Ok(reply.to_string())
    }

    /// `GET dashboard/{id}/disconnect/{uri}`
    pub async fn dashboard_remove_resource(
        &self,
        dashboard_id: i64,
        resource_uri: &str,
    ) -> Result<bool, Error> {
        self.get_ok(&format!("dashboard/{dashboard_id}/disconnect/{resource_uri}"))
            .await
    }

    /// Delete a dashboard. Succeeds iff the reply's `code` is 200.
    ///
    /// `GET dashboard/delete/{id}`
    pub async fn dashboard_delete(&self, dashboard_id: i64) -> Result<bool, Error> {
        debug!(dashboard_id, "deleting dashboard");
        let body = self.get_page(&format!("dashboard/delete/{dashboard_id}")).await?;
        let reply: Value = parse_json(&body)?;
        let code = reply
            .get("code")
            .and_then(Value::as_i64)
            .ok_or(Error::UnexpectedShape {
                expected: "integer `code` field",
                body,
            })?;
        Ok(code == 200)
    }

    /// `GET dashboard/{id}/featured/{uri}`
    pub async fn dashboard_set_featured_resource(
        &self,
        dashboard_id: i64,
        resource_uri: &str,
    ) -> Result<bool, Error> {
        self.get_ok(&format!("dashboard/{dashboard_id}/featured/{resource_uri}"))
            .await
    }

    /// Full dashboard document.
    ///
    /// `GET dashboard/{id}`
    pub async fn dashboard(&self, dashboard_id: i64) -> Result<Value, Error> {
        self.get_json(&format!("dashboard/{dashboard_id}")).await
    }

    /// Resource names of a dashboard, looked up by dashboard name.
    ///
    /// `GET dashboard/{name}/resource`
    pub async fn dashboard_resources(&self, dashboard_name: &str) -> Result<Vec<String>, Error> {
        self.get_json(&format!("dashboard/{dashboard_name}/resource"))
            .await
    }
}
