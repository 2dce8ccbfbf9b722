// sensorflare-api: Async Rust client for the Sensorflare IoT dashboard API

pub mod auth;
pub mod client;
pub mod dashboards;
pub mod error;
pub mod gateways;
pub mod models;
pub mod resources;
pub mod schedules;
pub mod transport;

pub use auth::Credentials;
pub use client::{DEFAULT_BASE_URL, SensorflareClient, is_ok_response, normalize_base_url};
pub use error::Error;
pub use models::{ResourceDetails, ResourceKind};
pub use transport::{TlsMode, TransportConfig, USER_AGENT};
