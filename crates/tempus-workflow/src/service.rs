//! # Service Ticket Workflow
//!
//! Opens watch service/repair tickets and advances them through
//! `received → in_progress → ready → delivered`. Entering `ready` or
//! `delivered` queues the matching customer notification (fire-and-forget).

use chrono::Utc;
use tracing::info;

use crate::context::UserContext;
use crate::error::WorkflowResult;
use crate::notification::{Notifier, TEMPLATE_SERVICE_DELIVERED, TEMPLATE_SERVICE_READY};
use tempus_core::validation::validate_ticket_draft;
use tempus_core::{CoreError, ServiceTicket, ServiceTicketDraft, TicketStatus};
use tempus_db::repository::service::generate_ticket_id;
use tempus_db::Database;

/// Orchestrates service ticket creation and progress.
#[derive(Debug, Clone)]
pub struct ServiceWorkflow {
    db: Database,
    notifier: Notifier,
}

impl ServiceWorkflow {
    /// Creates a new ServiceWorkflow.
    pub fn new(db: Database) -> Self {
        let notifier = Notifier::new(db.outbox());
        ServiceWorkflow { db, notifier }
    }

    /// Opens a new ticket in `received`.
    ///
    /// ## Returns
    /// The ticket's identifier.
    pub async fn open_ticket(
        &self,
        user: &UserContext,
        draft: &ServiceTicketDraft,
    ) -> WorkflowResult<String> {
        let owner_id = user.require()?;
        validate_ticket_draft(draft)?;

        let now = Utc::now();
        let ticket = ServiceTicket {
            id: generate_ticket_id(),
            owner_id: owner_id.to_string(),
            customer_name: draft.customer_name.trim().to_string(),
            customer_phone: draft.customer_phone.clone(),
            watch_brand: draft.watch_brand.trim().to_string(),
            watch_model: draft.watch_model.clone(),
            issue: draft.issue.trim().to_string(),
            status: TicketStatus::Received,
            estimated_cost_cents: draft.estimated_cost_cents,
            created_at: now,
            updated_at: now,
        };

        self.db.service_tickets().insert(&ticket).await?;

        info!(ticket_id = %ticket.id, "Service ticket opened");
        Ok(ticket.id)
    }

    /// Advances a ticket to a new status (forward-only).
    pub async fn advance_ticket(
        &self,
        user: &UserContext,
        ticket_id: &str,
        target: TicketStatus,
    ) -> WorkflowResult<()> {
        let owner_id = user.require()?;

        let ticket = self
            .db
            .service_tickets()
            .get_by_id(owner_id, ticket_id)
            .await?
            .ok_or_else(|| CoreError::TicketNotFound(ticket_id.to_string()))?;

        if !ticket.status.can_transition_to(target) {
            return Err(CoreError::InvalidTicketTransition {
                ticket_id: ticket_id.to_string(),
                from: format!("{:?}", ticket.status),
                to: format!("{target:?}"),
            }
            .into());
        }

        self.db
            .service_tickets()
            .set_status(owner_id, ticket_id, target)
            .await?;

        if target.notifies_customer() && target != ticket.status {
            if let Some(phone) = &ticket.customer_phone {
                let template = match target {
                    TicketStatus::Delivered => TEMPLATE_SERVICE_DELIVERED,
                    _ => TEMPLATE_SERVICE_READY,
                };
                self.notifier
                    .notify(
                        owner_id,
                        phone,
                        template,
                        &[
                            ("customer_name", ticket.customer_name.clone()),
                            ("watch_brand", ticket.watch_brand.clone()),
                        ],
                    )
                    .await;
            }
        }

        info!(ticket_id = %ticket_id, status = ?target, "Service ticket advanced");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
