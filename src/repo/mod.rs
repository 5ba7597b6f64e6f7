//! Table-driven repositories.
//!
//! Every entity table is described once by a [`Record`] impl (table name,
//! writable columns in bind order, read columns, ordering key, binder and a
//! validation hook); [`Repo`] turns that description into parameterized
//! `SELECT`/`INSERT`/`UPDATE`/`DELETE` statements.
//!
//! Appointment writes do not go through [`Repo::create`]/[`Repo::update`];
//! they need overlap and lifecycle checks inside a transaction, see
//! [`appointments::AppointmentRepo`].

use std::marker::PhantomData;

use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, PgExecutor, PgPool, Postgres};

use crate::error::DbError;
use crate::validation::ValidationError;

pub mod appointments;
pub mod clinics;
pub mod employees;
pub mod patients;
pub mod services;
pub mod waiting_list;

pub use appointments::AppointmentRepo;

pub type PgQueryAs<'q, O> = QueryAs<'q, Postgres, O, PgArguments>;

pub trait Record: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static {
    /// Request body accepted by create and full-replace update.
    type Input: Send + Sync;

    /// Singular name used in error messages ("clinic 4 not found").
    const RESOURCE: &'static str;
    const TABLE: &'static str;
    /// Writable columns, in the order [`Record::bind`] binds them.
    const COLUMNS: &'static [&'static str];
    /// Column list for `SELECT`/`RETURNING`.
    const READ_COLUMNS: &'static str;
    const ORDER_BY: &'static str;
    /// Timestamp column refreshed on every update, if the table has one.
    const TOUCHED_ON_UPDATE: Option<&'static str> = None;

    fn validate(input: &Self::Input) -> Result<(), ValidationError>;

    fn bind<'q, O>(input: &'q Self::Input, query: PgQueryAs<'q, O>) -> PgQueryAs<'q, O>;
}

/* ============================================================
   SQL builders
   ============================================================ */

pub(crate) fn select_all_sql<R: Record>() -> String {
    format!(
        "SELECT {} FROM {} ORDER BY {}",
        R::READ_COLUMNS,
        R::TABLE,
        R::ORDER_BY
    )
}

pub(crate) fn select_one_sql<R: Record>() -> String {
    format!("SELECT {} FROM {} WHERE id = $1", R::READ_COLUMNS, R::TABLE)
}

pub(crate) fn insert_sql<R: Record>() -> String {
    let placeholders: Vec<String> = (1..=R::COLUMNS.len()).map(|i| format!("${i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        R::TABLE,
        R::COLUMNS.join(", "),
        placeholders.join(", "),
        R::READ_COLUMNS
    )
}

/// The row id is bound last, after every writable column.
pub(crate) fn update_sql<R: Record>() -> String {
    let mut assignments: Vec<String> = R::COLUMNS
        .iter()
        .enumerate()
        .map(|(i, col)| format!("{col} = ${}", i + 1))
        .collect();
    if let Some(col) = R::TOUCHED_ON_UPDATE {
        assignments.push(format!("{col} = now()"));
    }
    format!(
        "UPDATE {} SET {} WHERE id = ${} RETURNING {}",
        R::TABLE,
        assignments.join(", "),
        R::COLUMNS.len() + 1,
        R::READ_COLUMNS
    )
}

pub(crate) fn delete_sql<R: Record>() -> String {
    format!("DELETE FROM {} WHERE id = $1", R::TABLE)
}

/* ============================================================
   Executor-generic statements (usable on a pool or inside a tx)
   ============================================================ */

pub(crate) async fn fetch_one<'e, R: Record>(
    exec: impl PgExecutor<'e>,
    id: i64,
) -> Result<R, DbError> {
    let sql = select_one_sql::<R>();
    sqlx::query_as::<_, R>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?
        .ok_or(DbError::NotFound {
            resource: R::RESOURCE,
            id,
        })
}

pub(crate) async fn insert<'e, R: Record>(
    exec: impl PgExecutor<'e>,
    input: &R::Input,
) -> Result<R, DbError> {
    let sql = insert_sql::<R>();
    let row = R::bind(input, sqlx::query_as::<_, R>(&sql))
        .fetch_one(exec)
        .await?;
    Ok(row)
}

pub(crate) async fn replace<'e, R: Record>(
    exec: impl PgExecutor<'e>,
    id: i64,
    input: &R::Input,
) -> Result<R, DbError> {
    let sql = update_sql::<R>();
    R::bind(input, sqlx::query_as::<_, R>(&sql))
        .bind(id)
        .fetch_optional(exec)
        .await?
        .ok_or(DbError::NotFound {
            resource: R::RESOURCE,
            id,
        })
}

/* ============================================================
   Repo
   ============================================================ */

pub struct Repo<'a, R> {
    pool: &'a PgPool,
    _record: PhantomData<fn() -> R>,
}

impl<'a, R: Record> Repo<'a, R> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }

    /// Every row, ordered by the table's documented key. No paging.
    pub async fn list(&self) -> Result<Vec<R>, DbError> {
        let sql = select_all_sql::<R>();
        let rows = sqlx::query_as::<_, R>(&sql).fetch_all(self.pool).await?;
        tracing::debug!(table = R::TABLE, count = rows.len(), "listed rows");
        Ok(rows)
    }

    pub async fn get(&self, id: i64) -> Result<R, DbError> {
        fetch_one::<R>(self.pool, id).await
    }

    pub async fn create(&self, input: &R::Input) -> Result<R, DbError> {
        R::validate(input)?;
        let row = insert::<R>(self.pool, input).await?;
        tracing::info!(table = R::TABLE, "created row");
        Ok(row)
    }

    /// Full replace of every writable column.
    pub async fn update(&self, id: i64, input: &R::Input) -> Result<R, DbError> {
        R::validate(input)?;
        let row = replace::<R>(self.pool, id, input).await?;
        tracing::info!(table = R::TABLE, id, "updated row");
        Ok(row)
    }

    /// Hard delete. Rows still referenced by other tables fail with a
    /// constraint violation.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let sql = delete_sql::<R>();
        let result = sqlx::query(&sql).bind(id).execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: R::RESOURCE,
                id,
            });
        }
        tracing::info!(table = R::TABLE, id, "deleted row");
        Ok(())
    }
}
