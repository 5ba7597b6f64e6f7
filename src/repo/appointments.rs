// src/repo/appointments.rs

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use super::{PgQueryAs, Record, Repo, insert, replace, select_one_sql};
use crate::error::DbError;
use crate::models::{Appointment, AppointmentInput};
use crate::validation::{self, ValidationError};

impl Record for Appointment {
    type Input = AppointmentInput;

    const RESOURCE: &'static str = "appointment";
    const TABLE: &'static str = "appointments";
    const COLUMNS: &'static [&'static str] = &[
        "patient_id",
        "employee_id",
        "service_id",
        "clinic_id",
        "start_datetime",
        "end_datetime",
        "status",
        "appointment_type",
        "notes",
        "medical_notes",
        "cancellation_reason",
        "payment_status",
        "payment_amount",
    ];
    const READ_COLUMNS: &'static str = "id, patient_id, employee_id, service_id, clinic_id, \
        start_datetime, end_datetime, status, appointment_type, notes, medical_notes, \
        cancellation_reason, payment_status, payment_amount, created_at, updated_at";
    const ORDER_BY: &'static str = "start_datetime DESC, id DESC";
    const TOUCHED_ON_UPDATE: Option<&'static str> = Some("updated_at");

    fn validate(input: &AppointmentInput) -> Result<(), ValidationError> {
        validation::appointment(input)
    }

    fn bind<'q, O>(input: &'q AppointmentInput, query: PgQueryAs<'q, O>) -> PgQueryAs<'q, O> {
        query
            .bind(input.patient_id)
            .bind(input.employee_id)
            .bind(input.service_id)
            .bind(input.clinic_id)
            .bind(input.start_datetime)
            .bind(input.end_datetime)
            .bind(input.status)
            .bind(input.appointment_type)
            .bind(&input.notes)
            .bind(&input.medical_notes)
            .bind(&input.cancellation_reason)
            .bind(input.payment_status)
            .bind(input.payment_amount)
    }
}

/// First active appointment of `$1` intersecting the half-open `[$2, $3)`,
/// ignoring row `$4`. Touching endpoints do not intersect.
/// The excluded statuses are exactly those for which
/// `AppointmentStatus::is_active` is false.
const OVERLAP_SQL: &str = r#"
    SELECT id, start_datetime, end_datetime
    FROM appointments
    WHERE employee_id = $1
      AND status NOT IN ('CANCELLED', 'NO_SHOW')
      AND start_datetime < $3
      AND end_datetime > $2
      AND ($4::bigint IS NULL OR id <> $4)
    ORDER BY start_datetime ASC, id ASC
    LIMIT 1
"#;

/// Serializes booking for one employee until the surrounding transaction ends.
async fn lock_employee(conn: &mut PgConnection, employee_id: i64) -> Result<(), DbError> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(employee_id)
        .execute(conn)
        .await?;
    Ok(())
}

async fn ensure_slot_free(
    conn: &mut PgConnection,
    input: &AppointmentInput,
    exclude_id: Option<i64>,
) -> Result<(), DbError> {
    let blocking: Option<(i64, DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(OVERLAP_SQL)
        .bind(input.employee_id)
        .bind(input.start_datetime)
        .bind(input.end_datetime)
        .bind(exclude_id)
        .fetch_optional(conn)
        .await?;

    if let Some((other, start, end)) = blocking {
        tracing::warn!(
            employee_id = input.employee_id,
            blocking_appointment = other,
            "rejected overlapping appointment"
        );
        return Err(DbError::Conflict(format!(
            "employee {} already has appointment {} from {} to {}",
            input.employee_id,
            other,
            start.to_rfc3339(),
            end.to_rfc3339()
        )));
    }
    Ok(())
}

/// Appointment store. Reads and deletes are plain table operations; writes
/// check interval overlap and status lifecycle under a per-employee lock.
pub struct AppointmentRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> AppointmentRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Appointment>, DbError> {
        Repo::<Appointment>::new(self.pool).list().await
    }

    pub async fn get(&self, id: i64) -> Result<Appointment, DbError> {
        Repo::<Appointment>::new(self.pool).get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        Repo::<Appointment>::new(self.pool).delete(id).await
    }

    pub async fn create(&self, input: &AppointmentInput) -> Result<Appointment, DbError> {
        validation::appointment(input)?;
        if !input.status.is_initial() {
            tracing::warn!(status = %input.status, "rejected appointment with non-initial status");
            return Err(DbError::InvalidTransition {
                from: None,
                to: input.status,
            });
        }

        let mut tx = self.pool.begin().await?;
        lock_employee(&mut tx, input.employee_id).await?;
        ensure_slot_free(&mut tx, input, None).await?;
        let created = insert::<Appointment>(&mut *tx, input).await?;
        tx.commit().await?;

        tracing::info!(
            appointment_id = created.id,
            employee_id = created.employee_id,
            "created appointment"
        );
        Ok(created)
    }

    /// Full replace. The status may only move along the lifecycle, and the
    /// new interval must not collide with the employee's other bookings.
    pub async fn update(&self, id: i64, input: &AppointmentInput) -> Result<Appointment, DbError> {
        validation::appointment(input)?;

        let mut tx = self.pool.begin().await?;

        let sql = format!("{} FOR UPDATE", select_one_sql::<Appointment>());
        let current: Appointment = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(DbError::NotFound {
                resource: Appointment::RESOURCE,
                id,
            })?;

        if !current.status.can_transition_to(input.status) {
            tracing::warn!(
                appointment_id = id,
                from = %current.status,
                to = %input.status,
                terminal = current.status.is_terminal(),
                "rejected status transition"
            );
            return Err(DbError::InvalidTransition {
                from: Some(current.status),
                to: input.status,
            });
        }

        // Reassignment locks both employees, always in ascending order.
        let mut employees = vec![current.employee_id, input.employee_id];
        employees.sort_unstable();
        employees.dedup();
        for employee_id in employees {
            lock_employee(&mut tx, employee_id).await?;
        }

        if input.status.is_active() {
            ensure_slot_free(&mut tx, input, Some(id)).await?;
        }

        let updated = replace::<Appointment>(&mut *tx, id, input).await?;
        tx.commit().await?;

        tracing::info!(appointment_id = id, status = %updated.status, "updated appointment");
        Ok(updated)
    }
}
