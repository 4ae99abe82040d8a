//! # Service Ticket Repository
//!
//! Database operations for watch service/repair tickets.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tempus_core::{ServiceTicket, TicketStatus};

const TICKET_COLUMNS: &str = "id, owner_id, customer_name, customer_phone, watch_brand, \
     watch_model, issue, status, estimated_cost_cents, created_at, updated_at";

/// Repository for service ticket database operations.
#[derive(Debug, Clone)]
pub struct ServiceTicketRepository {
    pool: SqlitePool,
}

impl ServiceTicketRepository {
    /// Creates a new ServiceTicketRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ServiceTicketRepository { pool }
    }

    /// Gets a ticket by ID.
    pub async fn get_by_id(&self, owner_id: &str, id: &str) -> DbResult<Option<ServiceTicket>> {
        let ticket = sqlx::query_as::<_, ServiceTicket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM service_tickets WHERE id = ?1 AND owner_id = ?2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ticket)
    }

    /// Lists tickets for an owner, newest first.
    pub async fn list(&self, owner_id: &str, limit: u32) -> DbResult<Vec<ServiceTicket>> {
        let tickets = sqlx::query_as::<_, ServiceTicket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM service_tickets \
             WHERE owner_id = ?1 ORDER BY created_at DESC LIMIT ?2"
        ))
        .bind(owner_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(tickets)
    }

    /// Inserts a new ticket.
    pub async fn insert(&self, ticket: &ServiceTicket) -> DbResult<()> {
        debug!(id = %ticket.id, "Inserting service ticket");

        sqlx::query(
            r#"
            INSERT INTO service_tickets (
                id, owner_id, customer_name, customer_phone, watch_brand,
                watch_model, issue, status, estimated_cost_cents, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&ticket.id)
        .bind(&ticket.owner_id)
        .bind(&ticket.customer_name)
        .bind(&ticket.customer_phone)
        .bind(&ticket.watch_brand)
        .bind(&ticket.watch_model)
        .bind(&ticket.issue)
        .bind(ticket.status)
        .bind(ticket.estimated_cost_cents)
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Sets a ticket's status.
    ///
    /// Transition legality is the workflow's concern; this just persists.
    pub async fn set_status(&self, owner_id: &str, id: &str, status: TicketStatus) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE service_tickets SET status = ?3, updated_at = ?4 \
             WHERE id = ?1 AND owner_id = ?2",
        )
        .bind(id)
        .bind(owner_id)
        .bind(status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ServiceTicket", id));
        }

        Ok(())
    }
}

/// Generates a new service ticket ID.
pub fn generate_ticket_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    const OWNER: &str = "owner-1";

    fn ticket() -> ServiceTicket {
        let now = Utc::now();
        ServiceTicket {
            id: generate_ticket_id(),
            owner_id: OWNER.to_string(),
            customer_name: "Ali Raza".to_string(),
            customer_phone: Some("+923001234567".to_string()),
            watch_brand: "Omega".to_string(),
            watch_model: Some("Seamaster".to_string()),
            issue: "crown does not screw down".to_string(),
            status: TicketStatus::Received,
            estimated_cost_cents: 15_000,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_set_status() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.service_tickets();

        let t = ticket();
        repo.insert(&t).await.unwrap();

        repo.set_status(OWNER, &t.id, TicketStatus::Ready)
            .await
            .unwrap();

        let fetched = repo.get_by_id(OWNER, &t.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, TicketStatus::Ready);
    }

    #[tokio::test]
    async fn test_set_status_unknown_ticket() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .service_tickets()
            .set_status(OWNER, "missing", TicketStatus::Ready)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
