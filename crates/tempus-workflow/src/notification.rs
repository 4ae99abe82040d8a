//! # Notification Hand-Off
//!
//! Templated SMS/WhatsApp message requests, rendered and queued on workflow
//! state transitions. Fire-and-forget: the workflow enqueues into the
//! notification outbox and moves on; a failure to enqueue is logged and
//! never affects the transaction outcome. An external sender drains the
//! outbox.

use serde_json::json;
use tracing::{debug, warn};

use tempus_db::NotificationOutboxRepository;

// =============================================================================
// Templates
// =============================================================================

/// Template fired when a sale completes.
pub const TEMPLATE_SALE_COMPLETED: &str = "sale_completed";
/// Template fired when a service ticket becomes ready for pickup.
pub const TEMPLATE_SERVICE_READY: &str = "service_ready";
/// Template fired when a serviced watch is handed back.
pub const TEMPLATE_SERVICE_DELIVERED: &str = "service_delivered";

/// Returns the message body for a template, with `{placeholder}` variables.
fn template_body(template_id: &str) -> Option<&'static str> {
    match template_id {
        TEMPLATE_SALE_COMPLETED => Some(
            "Thank you for your purchase, {customer_name}! Invoice {invoice_number}, total {total}.",
        ),
        TEMPLATE_SERVICE_READY => {
            Some("Hi {customer_name}, your {watch_brand} is serviced and ready for pickup.")
        }
        TEMPLATE_SERVICE_DELIVERED => {
            Some("Hi {customer_name}, thank you for collecting your {watch_brand}.")
        }
        _ => None,
    }
}

/// Renders a template by substituting `{key}` placeholders.
///
/// Unknown placeholders are left in place; unknown templates return `None`.
pub fn render_template(template_id: &str, variables: &[(&str, String)]) -> Option<String> {
    let mut body = template_body(template_id)?.to_string();

    for (key, value) in variables {
        body = body.replace(&format!("{{{key}}}"), value);
    }

    Some(body)
}

// =============================================================================
// Notifier
// =============================================================================

/// Queues rendered notifications into the outbox.
#[derive(Debug, Clone)]
pub struct Notifier {
    outbox: NotificationOutboxRepository,
}

impl Notifier {
    /// Creates a new Notifier.
    pub fn new(outbox: NotificationOutboxRepository) -> Self {
        Notifier { outbox }
    }

    /// Renders and enqueues a message. Fire-and-forget: every failure path
    /// is logged and swallowed.
    pub async fn notify(
        &self,
        owner_id: &str,
        recipient: &str,
        template_id: &str,
        variables: &[(&str, String)],
    ) {
        let Some(body) = render_template(template_id, variables) else {
            warn!(template_id = %template_id, "Unknown notification template, skipping");
            return;
        };

        let vars_json = json!(variables
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<std::collections::BTreeMap<_, _>>())
        .to_string();

        match self
            .outbox
            .enqueue(owner_id, recipient, template_id, &vars_json, &body)
            .await
        {
            Ok(entry) => {
                debug!(id = %entry.id, template_id = %template_id, "Notification queued");
            }
            Err(err) => {
                warn!(template_id = %template_id, error = %err, "Failed to queue notification");
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempus_db::{Database, DbConfig};

    #[test]
    fn test_render_sale_completed() {
        let body = render_template(
            TEMPLATE_SALE_COMPLETED,
            &[
                ("customer_name", "Ayesha".to_string()),
                ("invoice_number", "#0001".to_string()),
                ("total", "Rs 200.00".to_string()),
            ],
        )
        .unwrap();
        assert_eq!(
            body,
            "Thank you for your purchase, Ayesha! Invoice #0001, total Rs 200.00."
        );
    }

    #[test]
    fn test_render_unknown_template() {
        assert!(render_template("no_such_template", &[]).is_none());
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        let body = render_template(
            TEMPLATE_SERVICE_READY,
            &[("customer_name", "Ali".to_string())],
        )
        .unwrap();
        assert!(body.contains("{watch_brand}"));
    }

    #[tokio::test]
    async fn test_notify_enqueues() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let notifier = Notifier::new(db.outbox());

        notifier
            .notify(
                "owner-1",
                "+923001234567",
                TEMPLATE_SERVICE_READY,
                &[
                    ("customer_name", "Ali".to_string()),
                    ("watch_brand", "Omega".to_string()),
                ],
            )
            .await;

        let pending = db.outbox().get_pending(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(
            pending[0].body,
            "Hi Ali, your Omega is serviced and ready for pickup."
        );
    }

    /// Enqueue failures are swallowed, not surfaced.
    #[tokio::test]
    async fn test_notify_swallows_failure() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let notifier = Notifier::new(db.outbox());
        db.close().await;

        // Must not panic or return an error
        notifier
            .notify(
                "owner-1",
                "+923001234567",
                TEMPLATE_SERVICE_READY,
                &[("customer_name", "Ali".to_string())],
            )
            .await;
    }
}
