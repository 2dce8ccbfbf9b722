// Gateway and device endpoints

use std::collections::BTreeMap;

use serde_json::Value;

use crate::client::SensorflareClient;
use crate::error::Error;
use crate::models::IdName;

impl SensorflareClient {
    /// Device names of the authenticated user.
    ///
    /// `GET device`
    pub async fn devices(&self) -> Result<Vec<String>, Error> {
        self.get_json("device").await
    }

    /// Gateways keyed by id. Last entry wins on duplicate ids.
    ///
    /// `GET gateway` → `[{ "id", "name" }, ...]`
    pub async fn gateways(&self) -> Result<BTreeMap<i64, String>, Error> {
        let gateways: Vec<IdName> = self.get_json("gateway").await?;
        Ok(gateways.into_iter().map(|g| (g.id, g.name)).collect())
    }

    /// `GET gateway/{name}`
    pub async fn gateway_view_info(&self, gateway_name: &str) -> Result<Value, Error> {
        self.get_json(&format!("gateway/{gateway_name}")).await
    }

    /// Store a key/value property on the gateway.
    ///
    /// `GET gateway/{key}/{value}`
    pub async fn gateway_add_property(&self, key: &str, value: &str) -> Result<bool, Error> {
        self.get_ok(&format!("gateway/{key}/{value}")).await
    }
}
