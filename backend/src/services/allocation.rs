//! Lot allocation engine
//!
//! Planning is read-only: `plan` fetches the lots on hand and runs the pure
//! FEFO walk from the shared crate, so calling it twice with unchanged data
//! returns an identical plan and commits nothing.
//!
//! Reservation is the write side. Two concurrent planners can otherwise be
//! promised the same units, so `reserve` re-checks every lot with a
//! compare-and-swap on its version column inside one transaction and hands
//! back a token. The token is later committed (stock consumed) or released
//! (hold returned); abandoned tokens can be bulk-released after a TTL.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock_lot::StockLotService;
use shared::{
    build_allocation_plan, AllocationPlan, LotReservation, LotReservationLine, ReservationStatus,
};

/// Allocation service: plans and reserves stock lots for outbound demand
#[derive(Clone)]
pub struct AllocationService {
    db: PgPool,
    lots: StockLotService,
}

/// Database row for a reservation
#[derive(Debug, FromRow)]
struct ReservationRow {
    id: Uuid,
    business_id: Uuid,
    item_id: Uuid,
    location_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReservationRow> for LotReservation {
    type Error = AppError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        let status = ReservationStatus::parse(&row.status).ok_or_else(|| {
            AppError::Internal(format!("Unknown reservation status: {}", row.status))
        })?;
        Ok(LotReservation {
            id: row.id,
            business_id: row.business_id,
            item_id: row.item_id,
            location_id: row.location_id,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Database row for a reservation line
#[derive(Debug, FromRow)]
struct ReservationLineRow {
    id: Uuid,
    reservation_id: Uuid,
    lot_id: Uuid,
    lot_number: String,
    quantity: Decimal,
}

impl From<ReservationLineRow> for LotReservationLine {
    fn from(row: ReservationLineRow) -> Self {
        LotReservationLine {
            id: row.id,
            reservation_id: row.reservation_id,
            lot_id: row.lot_id,
            lot_number: row.lot_number,
            quantity: row.quantity,
        }
    }
}

/// Result of a successful reservation
#[derive(Debug, Serialize)]
pub struct ReservationReceipt {
    pub reservation_id: Uuid,
    pub plan: AllocationPlan,
}

impl AllocationService {
    /// Create a new AllocationService instance
    pub fn new(db: PgPool) -> Self {
        let lots = StockLotService::new(db.clone());
        Self { db, lots }
    }

    /// Build a fulfillment plan without reserving anything
    ///
    /// Degenerate input (non-positive demand, unknown item or location)
    /// yields an empty plan rather than an error.
    pub async fn plan(
        &self,
        business_id: Uuid,
        item_id: Uuid,
        location_id: Uuid,
        required_quantity: Decimal,
        warning_days: i64,
    ) -> AppResult<AllocationPlan> {
        self.plan_as_of(
            business_id,
            item_id,
            location_id,
            required_quantity,
            warning_days,
            Utc::now().date_naive(),
        )
        .await
    }

    /// Build a plan relative to an explicit reference date
    pub async fn plan_as_of(
        &self,
        business_id: Uuid,
        item_id: Uuid,
        location_id: Uuid,
        required_quantity: Decimal,
        warning_days: i64,
        today: NaiveDate,
    ) -> AppResult<AllocationPlan> {
        if required_quantity <= Decimal::ZERO {
            return Ok(AllocationPlan::empty(required_quantity));
        }

        let lots = self
            .lots
            .get_available_lots(business_id, item_id, location_id)
            .await?;

        Ok(build_allocation_plan(
            lots,
            required_quantity,
            today,
            warning_days,
        ))
    }

    /// Plan and atomically reserve the suggested lots
    ///
    /// Each suggested lot is re-checked with a compare-and-swap on its
    /// version; any concurrent change rolls the whole reservation back with
    /// `OptimisticLockFailure` so the caller can refetch and retry.
    pub async fn reserve(
        &self,
        business_id: Uuid,
        item_id: Uuid,
        location_id: Uuid,
        required_quantity: Decimal,
        warning_days: i64,
    ) -> AppResult<ReservationReceipt> {
        if required_quantity <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "required_quantity".to_string(),
                message: "Required quantity must be positive".to_string(),
                message_th: "ปริมาณที่ต้องการต้องเป็นค่าบวก".to_string(),
            });
        }

        let plan = self
            .plan(
                business_id,
                item_id,
                location_id,
                required_quantity,
                warning_days,
            )
            .await?;

        if !plan.can_fulfill {
            return Err(AppError::InsufficientStock(format!(
                "{} available of {} required",
                plan.total_available, required_quantity
            )));
        }

        let mut tx = self.db.begin().await?;

        let reservation_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO lot_reservations (business_id, item_id, location_id, status)
            VALUES ($1, $2, $3, 'active')
            RETURNING id
            "#,
        )
        .bind(business_id)
        .bind(item_id)
        .bind(location_id)
        .fetch_one(&mut *tx)
        .await?;

        for pick in &plan.suggestion {
            // Version seen when the plan was built; a mismatch means another
            // caller touched this lot in the meantime
            let seen_version = plan
                .lots
                .iter()
                .find(|c| c.lot.id == pick.lot_id)
                .map(|c| c.lot.version)
                .ok_or_else(|| {
                    AppError::Internal("Suggestion references a lot outside the plan".to_string())
                })?;

            let result = sqlx::query(
                r#"
                UPDATE stock_lots
                SET reserved_quantity = reserved_quantity + $1,
                    version = version + 1,
                    updated_at = NOW()
                WHERE id = $2 AND business_id = $3 AND version = $4
                  AND quantity - reserved_quantity >= $1
                "#,
            )
            .bind(pick.pick_quantity)
            .bind(pick.lot_id)
            .bind(business_id)
            .bind(seen_version)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Transaction rolls back on drop
                return Err(AppError::OptimisticLockFailure(format!(
                    "lot {} changed while reserving",
                    pick.lot_number
                )));
            }

            sqlx::query(
                r#"
                INSERT INTO lot_reservation_lines (reservation_id, lot_id, lot_number, quantity)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(reservation_id)
            .bind(pick.lot_id)
            .bind(&pick.lot_number)
            .bind(pick.pick_quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            %reservation_id,
            %item_id,
            %location_id,
            %required_quantity,
            "reserved {} lots",
            plan.suggestion.len()
        );

        Ok(ReservationReceipt {
            reservation_id,
            plan,
        })
    }

    /// Consume reserved stock on pick confirmation
    ///
    /// Decrements on-hand and reserved quantity together for every line of
    /// the token. Repeat commits are a no-op; a released token cannot be
    /// committed.
    pub async fn commit(
        &self,
        business_id: Uuid,
        reservation_id: Uuid,
    ) -> AppResult<LotReservation> {
        let mut tx = self.db.begin().await?;

        let row = Self::lock_reservation(&mut tx, business_id, reservation_id).await?;
        let reservation = LotReservation::try_from(row)?;

        match reservation.status {
            ReservationStatus::Committed => {
                tx.commit().await?;
                return Ok(reservation);
            }
            ReservationStatus::Released => {
                return Err(AppError::Conflict {
                    resource: "reservation".to_string(),
                    message: "Reservation was already released".to_string(),
                    message_th: "การจองถูกยกเลิกไปแล้ว".to_string(),
                });
            }
            ReservationStatus::Active => {}
        }

        let lines = Self::fetch_lines(&mut tx, reservation_id).await?;

        for line in &lines {
            let result = sqlx::query(
                r#"
                UPDATE stock_lots
                SET quantity = quantity - $1,
                    reserved_quantity = reserved_quantity - $1,
                    version = version + 1,
                    updated_at = NOW()
                WHERE id = $2 AND quantity >= $1 AND reserved_quantity >= $1
                "#,
            )
            .bind(line.quantity)
            .bind(line.lot_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(AppError::OptimisticLockFailure(format!(
                    "lot {} no longer holds the reserved quantity",
                    line.lot_number
                )));
            }
        }

        let updated = Self::set_status(&mut tx, reservation_id, ReservationStatus::Committed).await?;
        tx.commit().await?;

        tracing::info!(%reservation_id, "reservation committed, stock consumed");

        LotReservation::try_from(updated)
    }

    /// Return reserved stock to availability
    ///
    /// Idempotent: releasing an already-released token is a no-op.
    pub async fn release(
        &self,
        business_id: Uuid,
        reservation_id: Uuid,
    ) -> AppResult<LotReservation> {
        let mut tx = self.db.begin().await?;

        let row = Self::lock_reservation(&mut tx, business_id, reservation_id).await?;
        let reservation = LotReservation::try_from(row)?;

        match reservation.status {
            ReservationStatus::Released => {
                tx.commit().await?;
                return Ok(reservation);
            }
            ReservationStatus::Committed => {
                return Err(AppError::Conflict {
                    resource: "reservation".to_string(),
                    message: "Reservation was already committed".to_string(),
                    message_th: "การจองถูกตัดสต็อกไปแล้ว".to_string(),
                });
            }
            ReservationStatus::Active => {}
        }

        let lines = Self::fetch_lines(&mut tx, reservation_id).await?;

        for line in &lines {
            let result = sqlx::query(
                r#"
                UPDATE stock_lots
                SET reserved_quantity = reserved_quantity - $1,
                    version = version + 1,
                    updated_at = NOW()
                WHERE id = $2 AND reserved_quantity >= $1
                "#,
            )
            .bind(line.quantity)
            .bind(line.lot_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(AppError::OptimisticLockFailure(format!(
                    "lot {} no longer holds the reserved quantity",
                    line.lot_number
                )));
            }
        }

        let updated = Self::set_status(&mut tx, reservation_id, ReservationStatus::Released).await?;
        tx.commit().await?;

        tracing::info!(%reservation_id, "reservation released");

        LotReservation::try_from(updated)
    }

    /// Release all active reservations older than the TTL
    ///
    /// Covers plans abandoned without an explicit release. Returns the number
    /// of reservations released.
    pub async fn release_stale(
        &self,
        business_id: Uuid,
        older_than_minutes: i64,
    ) -> AppResult<u64> {
        let cutoff = Utc::now() - Duration::minutes(older_than_minutes);

        let stale_ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM lot_reservations
            WHERE business_id = $1 AND status = 'active' AND created_at < $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(business_id)
        .bind(cutoff)
        .fetch_all(&self.db)
        .await?;

        let mut released = 0u64;
        for id in stale_ids {
            match self.release(business_id, id).await {
                Ok(_) => released += 1,
                // A racing commit or release is fine; skip and keep going
                Err(AppError::Conflict { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        if released > 0 {
            tracing::warn!(released, older_than_minutes, "released stale reservations");
        }

        Ok(released)
    }

    /// Get a reservation with its lines
    pub async fn get_reservation(
        &self,
        business_id: Uuid,
        reservation_id: Uuid,
    ) -> AppResult<(LotReservation, Vec<LotReservationLine>)> {
        let row = sqlx::query_as::<_, ReservationRow>(
            r#"
            SELECT id, business_id, item_id, location_id, status, created_at, updated_at
            FROM lot_reservations
            WHERE id = $1 AND business_id = $2
            "#,
        )
        .bind(reservation_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Reservation".to_string()))?;

        let lines = sqlx::query_as::<_, ReservationLineRow>(
            r#"
            SELECT id, reservation_id, lot_id, lot_number, quantity
            FROM lot_reservation_lines
            WHERE reservation_id = $1
            ORDER BY lot_number ASC
            "#,
        )
        .bind(reservation_id)
        .fetch_all(&self.db)
        .await?;

        Ok((
            LotReservation::try_from(row)?,
            lines.into_iter().map(Into::into).collect(),
        ))
    }

    async fn lock_reservation(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        business_id: Uuid,
        reservation_id: Uuid,
    ) -> AppResult<ReservationRow> {
        sqlx::query_as::<_, ReservationRow>(
            r#"
            SELECT id, business_id, item_id, location_id, status, created_at, updated_at
            FROM lot_reservations
            WHERE id = $1 AND business_id = $2
            FOR UPDATE
            "#,
        )
        .bind(reservation_id)
        .bind(business_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Reservation".to_string()))
    }

    async fn fetch_lines(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        reservation_id: Uuid,
    ) -> AppResult<Vec<LotReservationLine>> {
        let lines = sqlx::query_as::<_, ReservationLineRow>(
            r#"
            SELECT id, reservation_id, lot_id, lot_number, quantity
            FROM lot_reservation_lines
            WHERE reservation_id = $1
            "#,
        )
        .bind(reservation_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(lines.into_iter().map(Into::into).collect())
    }

    async fn set_status(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        reservation_id: Uuid,
        status: ReservationStatus,
    ) -> AppResult<ReservationRow> {
        let row = sqlx::query_as::<_, ReservationRow>(
            r#"
            UPDATE lot_reservations
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, business_id, item_id, location_id, status, created_at, updated_at
            "#,
        )
        .bind(status.as_str())
        .bind(reservation_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row)
    }
}
