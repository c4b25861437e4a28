//! Picking order lifecycle
//!
//! Drives a picking order through `open → in_progress → completed` (or
//! `cancelled`). State changes are guarded by the transition matrix in the
//! shared crate; completion is an all-or-nothing gate over the lines.
//!
//! Each order carries a version counter bumped on every mutation. Callers
//! that pass their last-seen version get a compare-and-swap: a stale write is
//! rejected with `OptimisticLockFailure` instead of silently clobbering a
//! concurrent picker session. The transitions themselves run inside a
//! transaction holding a row lock on the order.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::{
    clamp_pick_quantity, unsatisfied_lines, validate_bin_location, validate_document_number,
    validate_quantity_positive, DocumentRef, Pagination, PickingOrder, PickingOrderLine,
    PickingOrderStatus,
};

/// Picking service managing work orders and their lines
#[derive(Clone)]
pub struct PickingService {
    db: PgPool,
}

const ORDER_COLUMNS: &str = "id, business_id, picking_number, source_document_type, \
     source_document_id, picker_id, status, version, created_at, updated_at, completed_at";

const LINE_COLUMNS: &str = "id, order_id, item_id, bin_location, bin_zone, lot_number, \
     required_quantity, picked_quantity, picked, position";

/// Database row for a picking order
#[derive(Debug, FromRow)]
struct PickingOrderRow {
    id: Uuid,
    business_id: Uuid,
    picking_number: String,
    source_document_type: String,
    source_document_id: Uuid,
    picker_id: Option<Uuid>,
    status: String,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<PickingOrderRow> for PickingOrder {
    type Error = AppError;

    fn try_from(row: PickingOrderRow) -> Result<Self, Self::Error> {
        let status = PickingOrderStatus::parse(&row.status)
            .ok_or_else(|| AppError::Internal(format!("Unknown order status: {}", row.status)))?;
        Ok(PickingOrder {
            id: row.id,
            business_id: row.business_id,
            picking_number: row.picking_number,
            source_document_type: row.source_document_type,
            source_document_id: row.source_document_id,
            picker_id: row.picker_id,
            status,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
            completed_at: row.completed_at,
        })
    }
}

/// Database row for a picking order line
#[derive(Debug, FromRow)]
struct PickingLineRow {
    id: Uuid,
    order_id: Uuid,
    item_id: Uuid,
    bin_location: String,
    bin_zone: String,
    lot_number: Option<String>,
    required_quantity: Decimal,
    picked_quantity: Decimal,
    picked: bool,
    position: i32,
}

impl From<PickingLineRow> for PickingOrderLine {
    fn from(row: PickingLineRow) -> Self {
        PickingOrderLine {
            id: row.id,
            order_id: row.order_id,
            item_id: row.item_id,
            bin_location: row.bin_location,
            bin_zone: row.bin_zone,
            lot_number: row.lot_number,
            required_quantity: row.required_quantity,
            picked_quantity: row.picked_quantity,
            picked: row.picked,
            position: row.position,
        }
    }
}

/// Input for creating a picking order from an outbound document
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePickingOrderInput {
    #[validate(length(min = 1, max = 64))]
    pub picking_number: String,
    /// Outbound document this order fulfills
    pub source: DocumentRef,
    #[validate]
    pub lines: Vec<CreatePickingLineInput>,
}

/// One line of a new picking order
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePickingLineInput {
    pub item_id: Uuid,
    #[validate(length(min = 1, max = 32))]
    pub bin_location: String,
    #[validate(length(max = 32))]
    pub bin_zone: String,
    pub lot_number: Option<String>,
    pub required_quantity: Decimal,
}

/// Input for assigning or clearing a picker
#[derive(Debug, Deserialize)]
pub struct AssignPickerInput {
    pub picker_id: Option<Uuid>,
}

/// Input for confirming a picked line
#[derive(Debug, Deserialize)]
pub struct UpdateLineInput {
    pub picked_quantity: Decimal,
    pub picked: bool,
    /// Batch the picker actually took, pinned on confirmation
    pub lot_number: Option<String>,
    /// Last order version seen by the caller; mismatch rejects the write
    pub expected_version: Option<i64>,
}

/// A picking order together with its lines
#[derive(Debug, Serialize)]
pub struct PickingOrderWithLines {
    #[serde(flatten)]
    pub order: PickingOrder,
    pub lines: Vec<PickingOrderLine>,
}

impl PickingService {
    /// Create a new PickingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a picking order with its lines
    ///
    /// Called by the outbound-document process; the order starts `open` with
    /// lines in document order.
    pub async fn create_order(
        &self,
        business_id: Uuid,
        input: CreatePickingOrderInput,
    ) -> AppResult<PickingOrderWithLines> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        if let Err(msg) = validate_document_number(&input.picking_number) {
            return Err(AppError::Validation {
                field: "picking_number".to_string(),
                message: msg.to_string(),
                message_th: "ต้องระบุเลขที่เอกสารหยิบสินค้า".to_string(),
            });
        }

        if input.lines.is_empty() {
            return Err(AppError::Validation {
                field: "lines".to_string(),
                message: "A picking order needs at least one line".to_string(),
                message_th: "ใบหยิบสินค้าต้องมีอย่างน้อยหนึ่งรายการ".to_string(),
            });
        }

        for line in &input.lines {
            if validate_quantity_positive(line.required_quantity).is_err() {
                return Err(AppError::Validation {
                    field: "required_quantity".to_string(),
                    message: "Required quantity must be positive".to_string(),
                    message_th: "ปริมาณที่ต้องการต้องเป็นค่าบวก".to_string(),
                });
            }
            if let Err(msg) = validate_bin_location(&line.bin_location) {
                return Err(AppError::Validation {
                    field: "bin_location".to_string(),
                    message: msg.to_string(),
                    message_th: "ตำแหน่งจัดเก็บไม่ถูกต้อง".to_string(),
                });
            }
        }

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM picking_orders WHERE business_id = $1 AND picking_number = $2",
        )
        .bind(business_id)
        .bind(&input.picking_number)
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Err(AppError::DuplicateEntry("picking_number".to_string()));
        }

        let mut tx = self.db.begin().await?;

        let order_row = sqlx::query_as::<_, PickingOrderRow>(&format!(
            r#"
            INSERT INTO picking_orders (business_id, picking_number, source_document_type, source_document_id, status)
            VALUES ($1, $2, $3, $4, 'open')
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(business_id)
        .bind(&input.picking_number)
        .bind(&input.source.document_type)
        .bind(input.source.document_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            // A racing create can slip past the COUNT check above and land
            // on the unique constraint instead
            match &e {
                sqlx::Error::Database(db)
                    if db.constraint() == Some("picking_orders_unique_number") =>
                {
                    AppError::DuplicateEntry("picking_number".to_string())
                }
                _ => AppError::DatabaseError(e),
            }
        })?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for (position, line) in input.lines.iter().enumerate() {
            let row = sqlx::query_as::<_, PickingLineRow>(&format!(
                r#"
                INSERT INTO picking_order_lines (order_id, item_id, bin_location, bin_zone, lot_number, required_quantity, position)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING {LINE_COLUMNS}
                "#
            ))
            .bind(order_row.id)
            .bind(line.item_id)
            .bind(&line.bin_location)
            .bind(&line.bin_zone)
            .bind(&line.lot_number)
            .bind(line.required_quantity)
            .bind(position as i32)
            .fetch_one(&mut *tx)
            .await?;
            lines.push(row.into());
        }

        tx.commit().await?;

        Ok(PickingOrderWithLines {
            order: order_row.try_into()?,
            lines,
        })
    }

    /// Get a picking order with its lines
    pub async fn get_order(
        &self,
        business_id: Uuid,
        order_id: Uuid,
    ) -> AppResult<PickingOrderWithLines> {
        let row = sqlx::query_as::<_, PickingOrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM picking_orders WHERE id = $1 AND business_id = $2"
        ))
        .bind(order_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Picking order".to_string()))?;

        let lines = self.fetch_order_lines(order_id).await?;

        Ok(PickingOrderWithLines {
            order: row.try_into()?,
            lines,
        })
    }

    /// List picking orders, optionally filtered by status
    pub async fn list_orders(
        &self,
        business_id: Uuid,
        status: Option<PickingOrderStatus>,
        pagination: &Pagination,
    ) -> AppResult<Vec<PickingOrder>> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, PickingOrderRow>(&format!(
                    r#"
                    SELECT {ORDER_COLUMNS} FROM picking_orders
                    WHERE business_id = $1 AND status = $2
                    ORDER BY created_at DESC
                    LIMIT $3 OFFSET $4
                    "#
                ))
                .bind(business_id)
                .bind(status.as_str())
                .bind(pagination.per_page as i64)
                .bind(pagination.offset() as i64)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, PickingOrderRow>(&format!(
                    r#"
                    SELECT {ORDER_COLUMNS} FROM picking_orders
                    WHERE business_id = $1
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    "#
                ))
                .bind(business_id)
                .bind(pagination.per_page as i64)
                .bind(pagination.offset() as i64)
                .fetch_all(&self.db)
                .await?
            }
        };

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Assign or clear the picker on a non-terminal order
    ///
    /// Assigning a picker to an `open` order is a guarded transition to
    /// `in_progress`; clearing the picker leaves the status alone.
    pub async fn assign_picker(
        &self,
        business_id: Uuid,
        order_id: Uuid,
        picker_id: Option<Uuid>,
    ) -> AppResult<PickingOrder> {
        let mut tx = self.db.begin().await?;

        let order = Self::lock_order(&mut tx, business_id, order_id).await?;

        if order.status.is_terminal() {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot assign a picker to a {} order",
                order.status
            )));
        }

        let next_status = if picker_id.is_some()
            && order.status.can_transition_to(PickingOrderStatus::InProgress)
        {
            PickingOrderStatus::InProgress
        } else {
            order.status
        };

        let row = sqlx::query_as::<_, PickingOrderRow>(&format!(
            r#"
            UPDATE picking_orders
            SET picker_id = $1, status = $2, version = version + 1, updated_at = NOW()
            WHERE id = $3
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(picker_id)
        .bind(next_status.as_str())
        .bind(order_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        row.try_into()
    }

    /// Confirm a picked line
    ///
    /// The confirmed quantity is clamped to non-negative. Over-picking is
    /// tolerated but logged; the completion gate only checks the lower bound.
    /// First line activity on an `open` order moves it to `in_progress`.
    pub async fn update_line(
        &self,
        business_id: Uuid,
        order_id: Uuid,
        line_id: Uuid,
        input: UpdateLineInput,
    ) -> AppResult<PickingOrderLine> {
        let mut tx = self.db.begin().await?;

        let order = Self::lock_order(&mut tx, business_id, order_id).await?;

        if order.status.is_terminal() {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot update lines of a {} order",
                order.status
            )));
        }

        if let Some(expected) = input.expected_version {
            if expected != order.version {
                return Err(AppError::OptimisticLockFailure(format!(
                    "order {} is at version {}, caller saw {}",
                    order.picking_number, order.version, expected
                )));
            }
        }

        let picked_quantity = clamp_pick_quantity(input.picked_quantity);

        let row = sqlx::query_as::<_, PickingLineRow>(&format!(
            r#"
            UPDATE picking_order_lines
            SET picked_quantity = $1, picked = $2, lot_number = COALESCE($3, lot_number)
            WHERE id = $4 AND order_id = $5
            RETURNING {LINE_COLUMNS}
            "#
        ))
        .bind(picked_quantity)
        .bind(input.picked)
        .bind(&input.lot_number)
        .bind(line_id)
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Picking line".to_string()))?;

        let line: PickingOrderLine = row.into();

        if line.is_over_picked() {
            tracing::warn!(
                order = %order.picking_number,
                line = %line.id,
                required = %line.required_quantity,
                picked = %line.picked_quantity,
                "line over-picked"
            );
        }

        // First line activity on an open order moves it along
        let next_status = if order.status.can_transition_to(PickingOrderStatus::InProgress) {
            PickingOrderStatus::InProgress
        } else {
            order.status
        };

        sqlx::query(
            r#"
            UPDATE picking_orders
            SET status = $1, version = version + 1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(next_status.as_str())
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(line)
    }

    /// Complete a picking order
    ///
    /// All-or-nothing gate: every line must be confirmed picked with at least
    /// its required quantity, otherwise nothing changes. Completing an
    /// already-completed order is a no-op returning the stored order. The
    /// downstream goods-issue process consumes the stock; this transition
    /// does not touch lot quantities.
    pub async fn complete(&self, business_id: Uuid, order_id: Uuid) -> AppResult<PickingOrder> {
        let mut tx = self.db.begin().await?;

        let order = Self::lock_order(&mut tx, business_id, order_id).await?;

        if order.status == PickingOrderStatus::Completed {
            tx.commit().await?;
            tracing::info!(order = %order.picking_number, "repeat completion ignored");
            return Ok(order);
        }
        if !order.status.can_transition_to(PickingOrderStatus::Completed) {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot complete a {} order",
                order.status
            )));
        }

        let lines = Self::fetch_lines_tx(&mut tx, order_id).await?;
        let blockers = unsatisfied_lines(&lines);
        if lines.is_empty() || !blockers.is_empty() {
            return Err(AppError::IncompleteLines(format!(
                "{} of {} lines not fully picked",
                blockers.len(),
                lines.len()
            )));
        }

        let row = sqlx::query_as::<_, PickingOrderRow>(&format!(
            r#"
            UPDATE picking_orders
            SET status = 'completed', completed_at = NOW(), version = version + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(order = %order.picking_number, "picking order completed");

        row.try_into()
    }

    /// Cancel a picking order
    ///
    /// Repeat cancellation is a no-op; a completed order cannot be cancelled.
    pub async fn cancel(&self, business_id: Uuid, order_id: Uuid) -> AppResult<PickingOrder> {
        let mut tx = self.db.begin().await?;

        let order = Self::lock_order(&mut tx, business_id, order_id).await?;

        if order.status == PickingOrderStatus::Cancelled {
            tx.commit().await?;
            return Ok(order);
        }
        if !order.status.can_transition_to(PickingOrderStatus::Cancelled) {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot cancel a {} order",
                order.status
            )));
        }

        let row = sqlx::query_as::<_, PickingOrderRow>(&format!(
            r#"
            UPDATE picking_orders
            SET status = 'cancelled', version = version + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(order = %order.picking_number, "picking order cancelled");

        row.try_into()
    }

    /// Orders idle beyond the staleness window
    ///
    /// Abandoned picks otherwise sit half-confirmed forever; this feed lets
    /// the host application reopen or escalate them.
    pub async fn list_stale_orders(
        &self,
        business_id: Uuid,
        idle_hours: i64,
    ) -> AppResult<Vec<PickingOrder>> {
        let cutoff = Utc::now() - Duration::hours(idle_hours);

        let rows = sqlx::query_as::<_, PickingOrderRow>(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM picking_orders
            WHERE business_id = $1
              AND status IN ('open', 'in_progress')
              AND updated_at < $2
            ORDER BY updated_at ASC
            "#
        ))
        .bind(business_id)
        .bind(cutoff)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Fetch lines of an order in document position order
    pub async fn fetch_order_lines(&self, order_id: Uuid) -> AppResult<Vec<PickingOrderLine>> {
        let rows = sqlx::query_as::<_, PickingLineRow>(&format!(
            r#"
            SELECT {LINE_COLUMNS} FROM picking_order_lines
            WHERE order_id = $1
            ORDER BY position ASC
            "#
        ))
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn lock_order(
        tx: &mut Transaction<'_, Postgres>,
        business_id: Uuid,
        order_id: Uuid,
    ) -> AppResult<PickingOrder> {
        let row = sqlx::query_as::<_, PickingOrderRow>(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM picking_orders
            WHERE id = $1 AND business_id = $2
            FOR UPDATE
            "#
        ))
        .bind(order_id)
        .bind(business_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Picking order".to_string()))?;

        row.try_into()
    }

    async fn fetch_lines_tx(
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
    ) -> AppResult<Vec<PickingOrderLine>> {
        let rows = sqlx::query_as::<_, PickingLineRow>(&format!(
            r#"
            SELECT {LINE_COLUMNS} FROM picking_order_lines
            WHERE order_id = $1
            ORDER BY position ASC
            "#
        ))
        .bind(order_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
