// Schedule and report endpoints
//
// Schedules are cron-triggered payloads. Reports expose the latest reading
// of a resource as raw text.

use serde_json::Value;
use tracing::debug;

use crate::client::SensorflareClient;
use crate::error::Error;

impl SensorflareClient {
    /// Schedule names of the authenticated user.
    ///
    /// `GET schedule`
    pub async fn schedules(&self) -> Result<Vec<String>, Error> {
        self.get_json("schedule").await
    }

    /// Create a schedule. Returns the service's JSON reply re-serialized.
    ///
    /// `GET schedule/{key_name}/{cron}/{payload}/{after}/{payload2}`. The
    /// values are joined into the path verbatim.
    pub async fn schedule_create(
        &self,
        key_name: &str,
        cron_schedule: &str,
        payload: &str,
        after: i64,
        payload2: &str,
    ) -> Result<String, Error> {
        debug!(key_name, cron_schedule, after, "creating schedule");
        let reply: Value = self
            .get_json(&format!(
                "schedule/{key_name}/{cron_schedule}/{payload}/{after}/{payload2}"
            ))
            .await?;
        Ok(reply.to_string())
    }

    /// `GET schedule/{id}`
    pub async fn schedule_delete(&self, schedule_id: i64) -> Result<bool, Error> {
        self.get_ok(&format!("schedule/{schedule_id}")).await
    }

    /// Latest report for a resource, raw body.
    ///
    /// `GET report/latest/{uri}`
    pub async fn summary(&self, resource_uri: &str) -> Result<String, Error> {
        self.get_page(&format!("report/latest/{resource_uri}")).await
    }

    /// Same request and result as [`summary`](Self::summary).
    pub async fn string_summary(&self, resource_uri: &str) -> Result<String, Error> {
        self.summary(resource_uri).await
    }
}
