//! REST client for reservation and room endpoints.
//!
//! The overlay coordinator is the only consumer. Every method waits for the
//! server response before the caller mutates local state — there are no
//! optimistic writes here, so a failed call leaves nothing to roll back.
//!
//! No retry: REST failures surface as an error message in the chat log and
//! the user decides what to do next.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::AppError;
use crate::model::{Reservation, Room};

/// The REST surface the overlay coordinator depends on. Implemented by
/// [`ApiClient`] for real use; tests inject a scripted fake.
#[async_trait]
pub trait FrontDeskApi: Send + Sync {
    async fn create_reservation(&self, data: &Value) -> Result<Reservation, AppError>;
    async fn update_reservation(&self, id: i64, data: &Value) -> Result<Reservation, AppError>;
    async fn delete_reservation(&self, id: i64) -> Result<(), AppError>;
    async fn create_room(&self, data: &Value) -> Result<Room, AppError>;
    async fn update_room(&self, id: i64, data: &Value) -> Result<Room, AppError>;
    async fn delete_room(&self, id: i64) -> Result<(), AppError>;
    async fn complete_sale(&self, data: &Value) -> Result<Value, AppError>;
}

pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Api(format!("http client build failed: {e}")))?;
        Ok(Self { base_url: config.base_url.clone(), http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn check(res: reqwest::Response, what: &str) -> Result<reqwest::Response, AppError> {
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(AppError::Api(format!("{what} failed ({status}): {body}")));
        }
        Ok(res)
    }
}

#[async_trait]
impl FrontDeskApi for ApiClient {
    // ── Reservations ──────────────────────────────────────────────────

    async fn create_reservation(&self, data: &Value) -> Result<Reservation, AppError> {
        let res = self
            .http
            .post(self.url("/reservations"))
            .json(data)
            .send()
            .await
            .map_err(|e| AppError::Api(format!("create reservation request: {e}")))?;
        Self::check(res, "create reservation")
            .await?
            .json::<Reservation>()
            .await
            .map_err(|e| AppError::Api(format!("create reservation parse: {e}")))
    }

    async fn update_reservation(&self, id: i64, data: &Value) -> Result<Reservation, AppError> {
        let res = self
            .http
            .put(self.url(&format!("/reservations/{id}")))
            .json(data)
            .send()
            .await
            .map_err(|e| AppError::Api(format!("update reservation request: {e}")))?;
        Self::check(res, "update reservation")
            .await?
            .json::<Reservation>()
            .await
            .map_err(|e| AppError::Api(format!("update reservation parse: {e}")))
    }

    async fn delete_reservation(&self, id: i64) -> Result<(), AppError> {
        let res = self
            .http
            .delete(self.url(&format!("/reservations/{id}")))
            .send()
            .await
            .map_err(|e| AppError::Api(format!("delete reservation request: {e}")))?;
        Self::check(res, "delete reservation").await.map(|_| ())
    }

    // ── Rooms ─────────────────────────────────────────────────────────

    async fn create_room(&self, data: &Value) -> Result<Room, AppError> {
        let res = self
            .http
            .post(self.url("/rooms"))
            .json(data)
            .send()
            .await
            .map_err(|e| AppError::Api(format!("create room request: {e}")))?;
        Self::check(res, "create room")
            .await?
            .json::<Room>()
            .await
            .map_err(|e| AppError::Api(format!("create room parse: {e}")))
    }

    async fn update_room(&self, id: i64, data: &Value) -> Result<Room, AppError> {
        let res = self
            .http
            .put(self.url(&format!("/rooms/{id}")))
            .json(data)
            .send()
            .await
            .map_err(|e| AppError::Api(format!("update room request: {e}")))?;
        Self::check(res, "update room")
            .await?
            .json::<Room>()
            .await
            .map_err(|e| AppError::Api(format!("update room parse: {e}")))
    }

    async fn delete_room(&self, id: i64) -> Result<(), AppError> {
        let res = self
            .http
            .delete(self.url(&format!("/rooms/{id}")))
            .send()
            .await
            .map_err(|e| AppError::Api(format!("delete room request: {e}")))?;
        Self::check(res, "delete room").await.map(|_| ())
    }

    // ── Sales ─────────────────────────────────────────────────────────

    async fn complete_sale(&self, data: &Value) -> Result<Value, AppError> {
        let res = self
            .http
            .post(self.url("/sales"))
            .json(data)
            .send()
            .await
            .map_err(|e| AppError::Api(format!("complete sale request: {e}")))?;
        Self::check(res, "complete sale")
            .await?
            .json::<Value>()
            .await
            .map_err(|e| AppError::Api(format!("complete sale parse: {e}")))
    }
}
