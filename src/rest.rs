//! Authoritative order read path.
//!
//! The push stream has no resume/replay cursor, so a reconnect is a gap in
//! the event stream. Consumers reconcile truth from this REST client rather
//! than from accumulated events alone.

use std::time::Duration;

use reqwest::Client;

use crate::error::OrdercastError;
use crate::events::Order;
use crate::session::SessionIdentity;

pub struct OrdersApi {
    base_url: String,
    client: Client,
}

impl OrdersApi {
    pub fn new(base_url: String) -> Result<Self, OrdercastError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { base_url, client })
    }

    /// Fetch the venue's current active orders.
    pub async fn fetch_active_orders(
        &self,
        identity: &SessionIdentity,
    ) -> Result<Vec<Order>, OrdercastError> {
        let url = format!("{}/orders", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[("venueId", identity.venue_id.as_str())])
            .bearer_auth(&identity.token)
            .send()
            .await?
            .error_for_status()?;

        let orders = response.json::<Vec<Order>>().await?;
        Ok(orders)
    }
}
