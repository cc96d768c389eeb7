// src/services/xendit_client.rs
// DOCUMENTATION: Xendit payment gateway client
// PURPOSE: Create hosted invoices for donations and wallet top-ups

use crate::config::Config;
use crate::errors::ApiError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Xendit invoice API client
/// DOCUMENTATION: Authenticates with the secret key via HTTP basic auth.
/// Without a key the client runs in simulation mode and fabricates invoices
/// that point back at this service, which keeps development flows working.
pub struct XenditClient {
    /// HTTP client for making requests
    client: Client,
    /// Xendit secret API key
    secret_key: String,
    /// Base URL for the Xendit API
    base_url: String,
    /// Our public base URL, used for redirects and simulated invoices
    app_base_url: String,
    /// Invoice validity in seconds
    invoice_duration: u64,
}

/// Body of POST /v2/invoices
#[derive(Debug, Serialize)]
pub struct CreateInvoiceRequest<'a> {
    pub external_id: &'a str,
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_email: Option<&'a str>,
    pub description: String,
    pub invoice_duration: u64,
    pub currency: &'static str,
    pub success_redirect_url: String,
    pub failure_redirect_url: String,
}

/// Invoice returned by Xendit
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Invoice {
    pub id: String,
    pub external_id: String,
    pub status: String,
    pub amount: f64,
    pub invoice_url: String,
    pub expiry_date: Option<String>,
}

/// Error body returned by Xendit
#[derive(Debug, Deserialize)]
struct XenditErrorBody {
    error_code: Option<String>,
    message: Option<String>,
}

impl XenditClient {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            secret_key: config.xendit_secret_key.clone(),
            base_url: config.xendit_api_url.trim_end_matches('/').to_string(),
            app_base_url: config.base_url.trim_end_matches('/').to_string(),
            invoice_duration: config.invoice_duration_seconds,
        }
    }

    pub fn is_simulated(&self) -> bool {
        self.secret_key.is_empty()
    }

    /// Create a hosted invoice
    ///
    /// # Arguments
    /// * `external_id` - Our reference, echoed back in the webhook
    /// * `amount` - Amount in IDR
    /// * `payer_email` - Optional email Xendit sends the receipt to
    /// * `description` - Shown on the invoice page
    /// * `return_path` - Path on our site the payer is redirected to
    pub async fn create_invoice(
        &self,
        external_id: &str,
        amount: i64,
        payer_email: Option<&str>,
        description: &str,
        return_path: &str,
    ) -> Result<Invoice, ApiError> {
        if self.is_simulated() {
            log::info!("Simulated invoice for {} ({} IDR)", external_id, amount);
            return Ok(self.simulated_invoice(external_id, amount));
        }

        let url = format!("{}/v2/invoices", self.base_url);
        let body = CreateInvoiceRequest {
            external_id,
            amount,
            payer_email,
            description: description.to_string(),
            invoice_duration: self.invoice_duration,
            currency: "IDR",
            success_redirect_url: format!("{}{}?status=success", self.app_base_url, return_path),
            failure_redirect_url: format!("{}{}?status=failed", self.app_base_url, return_path),
        };

        log::debug!("Creating Xendit invoice: external_id={}, amount={}", external_id, amount);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.secret_key, Some(""))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                log::error!("Xendit request failed: {}", e);
                ApiError::ExternalApiError(format!("Request failed: {}", e))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            log::error!("Xendit rate limit hit");
            return Err(ApiError::RateLimitExceeded);
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<XenditErrorBody>(&text)
                .ok()
                .map(|b| {
                    format!(
                        "{}: {}",
                        b.error_code.unwrap_or_else(|| "UNKNOWN".into()),
                        b.message.unwrap_or_default()
                    )
                })
                .unwrap_or(text);
            log::error!("Xendit API error {}: {}", status, message);
            return Err(ApiError::ExternalApiError(format!("API error {}: {}", status, message)));
        }

        let invoice: Invoice = response.json().await.map_err(|e| {
            log::error!("Failed to parse Xendit invoice: {}", e);
            ApiError::ExternalApiError(format!("Parse error: {}", e))
        })?;

        log::info!("Created Xendit invoice {} for {}", invoice.id, external_id);
        Ok(invoice)
    }

    fn simulated_invoice(&self, external_id: &str, amount: i64) -> Invoice {
        Invoice {
            id: format!("sim-{}", uuid::Uuid::new_v4().simple()),
            external_id: external_id.to_string(),
            status: "PENDING".to_string(),
            amount: amount as f64,
            invoice_url: format!("{}/payments/simulate/{}", self.app_base_url, external_id),
            expiry_date: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_invoice_without_key() {
        let config = Config::for_tests();
        let client = XenditClient::new(&config);
        assert!(client.is_simulated());

        let invoice = tokio_test::block_on(client.create_invoice(
            "DON-abc",
            50_000,
            None,
            "Donation",
            "/donations/DON-abc",
        ))
        .unwrap();

        assert!(invoice.id.starts_with("sim-"));
        assert_eq!(invoice.external_id, "DON-abc");
        assert_eq!(
            invoice.invoice_url,
            "http://localhost:8080/payments/simulate/DON-abc"
        );
    }

    #[test]
    fn test_invoice_request_serialization() {
        let body = CreateInvoiceRequest {
            external_id: "TOPUP-1",
            amount: 100_000,
            payer_email: None,
            description: "Wallet top-up".into(),
            invoice_duration: 3600,
            currency: "IDR",
            success_redirect_url: "https://example.com/ok".into(),
            failure_redirect_url: "https://example.com/fail".into(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["external_id"], "TOPUP-1");
        assert_eq!(json["amount"], 100_000);
        assert!(json.get("payer_email").is_none());
    }
}
