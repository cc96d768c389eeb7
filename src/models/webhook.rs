// src/models/webhook.rs
// DOCUMENTATION: Payment gateway invoice callback payload
// PURPOSE: Parse Xendit invoice webhooks and describe how they move a payment

use serde::{Deserialize, Serialize};

use super::donation::PaymentStatus;

/// Invoice callback body sent by Xendit
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InvoiceCallback {
    /// Xendit invoice id
    pub id: Option<String>,
    /// Our reference (`DON-...` or `TOPUP-...`)
    pub external_id: String,
    /// PAID, SETTLED, EXPIRED, ...
    pub status: String,
    pub amount: Option<f64>,
    pub paid_amount: Option<f64>,
    pub payment_method: Option<String>,
    pub payment_channel: Option<String>,
    pub paid_at: Option<String>,
}

/// Gateway-side invoice status, normalised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceEvent {
    Paid,
    Settled,
    Expired,
    Failed,
    Unknown,
}

impl InvoiceEvent {
    pub fn parse(status: &str) -> Self {
        match status.trim().to_ascii_uppercase().as_str() {
            "PAID" | "SUCCEEDED" | "COMPLETED" => InvoiceEvent::Paid,
            "SETTLED" => InvoiceEvent::Settled,
            "EXPIRED" => InvoiceEvent::Expired,
            "FAILED" => InvoiceEvent::Failed,
            _ => InvoiceEvent::Unknown,
        }
    }
}

/// Outcome of applying an invoice event to a payment row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: PaymentStatus,
    /// Whether the amount must be credited (campaign total or wallet)
    pub credit: bool,
}

/// Decide how an event moves a payment. `None` means the event changes nothing,
/// which is how replayed or out-of-order webhooks are absorbed.
pub fn plan_transition(current: PaymentStatus, event: InvoiceEvent) -> Option<Transition> {
    use PaymentStatus::*;

    match (current, event) {
        (Pending, InvoiceEvent::Paid) => Some(Transition { next: Paid, credit: true }),
        (Pending, InvoiceEvent::Settled) => Some(Transition { next: Settled, credit: true }),
        (Paid, InvoiceEvent::Settled) => Some(Transition { next: Settled, credit: false }),
        (Pending, InvoiceEvent::Expired) => Some(Transition { next: Expired, credit: false }),
        (Pending, InvoiceEvent::Failed) => Some(Transition { next: Failed, credit: false }),
        _ => None,
    }
}

/// Webhook acknowledgement; always returned with HTTP 200
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub duplicate: bool,
}

impl WebhookAck {
    pub fn processed(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            duplicate: false,
        }
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            duplicate: true,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            duplicate: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PaymentStatus::*;

    #[test]
    fn test_parse_event() {
        assert_eq!(InvoiceEvent::parse("PAID"), InvoiceEvent::Paid);
        assert_eq!(InvoiceEvent::parse("succeeded"), InvoiceEvent::Paid);
        assert_eq!(InvoiceEvent::parse("COMPLETED"), InvoiceEvent::Paid);
        assert_eq!(InvoiceEvent::parse("SETTLED"), InvoiceEvent::Settled);
        assert_eq!(InvoiceEvent::parse("EXPIRED"), InvoiceEvent::Expired);
        assert_eq!(InvoiceEvent::parse("FAILED"), InvoiceEvent::Failed);
        assert_eq!(InvoiceEvent::parse("PENDING"), InvoiceEvent::Unknown);
    }

    #[test]
    fn test_first_success_credits_once() {
        let first = plan_transition(Pending, InvoiceEvent::Paid).unwrap();
        assert_eq!(first, Transition { next: Paid, credit: true });

        // replay of the same PAID callback
        assert_eq!(plan_transition(Paid, InvoiceEvent::Paid), None);

        // settlement after payment moves status without crediting again
        let settle = plan_transition(Paid, InvoiceEvent::Settled).unwrap();
        assert_eq!(settle, Transition { next: Settled, credit: false });
        assert_eq!(plan_transition(Settled, InvoiceEvent::Settled), None);
    }

    #[test]
    fn test_settled_straight_from_pending_credits() {
        let t = plan_transition(Pending, InvoiceEvent::Settled).unwrap();
        assert!(t.credit);
        assert_eq!(t.next, Settled);
    }

    #[test]
    fn test_failure_events() {
        assert_eq!(
            plan_transition(Pending, InvoiceEvent::Expired),
            Some(Transition { next: Expired, credit: false })
        );
        assert_eq!(
            plan_transition(Pending, InvoiceEvent::Failed),
            Some(Transition { next: Failed, credit: false })
        );
        // a late expiry never undoes a payment
        assert_eq!(plan_transition(Paid, InvoiceEvent::Expired), None);
        assert_eq!(plan_transition(Expired, InvoiceEvent::Paid), None);
        assert_eq!(plan_transition(Pending, InvoiceEvent::Unknown), None);
    }

    #[test]
    fn test_ack_serialization() {
        let json = serde_json::to_value(WebhookAck::processed("ok")).unwrap();
        assert!(json.get("duplicate").is_none());
        let json = serde_json::to_value(WebhookAck::duplicate("seen")).unwrap();
        assert_eq!(json["duplicate"], true);
    }
}
