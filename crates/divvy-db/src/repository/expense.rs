//! # Expense Repository
//!
//! Database operations for expenses and their splits.
//!
//! ## Atomic Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(new_expense)                                                    │
//! │       │                                                                 │
//! │       ├── find_existing(payer + participants)   (read)                 │
//! │       ├── plan_expense(new, &existing)          (pure, may reject)     │
//! │       ▼                                                                 │
//! │  save_plan(plan)                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │    INSERT INTO expenses ...                                             │
//! │    INSERT INTO expense_splits ...  × N                                  │
//! │  COMMIT            (any failure: the transaction drops and rolls back) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A rejected plan never opens a transaction. A plan that slips past the
//! existence check (a user removed in between) is still stopped by the
//! foreign keys, and the rollback leaves no partial split set behind.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::user::UserRepository;
use divvy_core::{
    plan_expense, Expense, ExpensePayload, ExpensePlan, ExpenseSplit, LedgerEntry, NewExpense,
    SplitMethod,
};

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
struct ExpenseRecord {
    id: String,
    amount_cents: i64,
    description: String,
    split_method: SplitMethod,
    payer_id: String,
    created_at: DateTime<Utc>,
}

impl From<ExpenseRecord> for Expense {
    fn from(record: ExpenseRecord) -> Self {
        Expense {
            id: record.id,
            amount_cents: record.amount_cents,
            description: record.description,
            split_method: record.split_method,
            payer_id: record.payer_id,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SplitRecord {
    expense_id: String,
    user_id: String,
    amount_cents: i64,
    percentage: Option<String>,
}

impl TryFrom<SplitRecord> for ExpenseSplit {
    type Error = DbError;

    fn try_from(record: SplitRecord) -> Result<Self, Self::Error> {
        let percentage = record
            .percentage
            .map(|text| {
                Decimal::from_str(&text).map_err(|_| DbError::InvalidData {
                    column: "expense_splits.percentage".to_string(),
                    value: text,
                })
            })
            .transpose()?;

        Ok(ExpenseSplit {
            expense_id: record.expense_id,
            user_id: record.user_id,
            amount_cents: record.amount_cents,
            percentage,
        })
    }
}

/// Attaches splits to their expenses, keeping expense order.
fn assemble(expenses: Vec<ExpenseRecord>, splits: Vec<SplitRecord>) -> DbResult<Vec<LedgerEntry>> {
    let mut by_expense: HashMap<String, Vec<ExpenseSplit>> = HashMap::new();
    for record in splits {
        let split = ExpenseSplit::try_from(record)?;
        by_expense.entry(split.expense_id.clone()).or_default().push(split);
    }

    Ok(expenses
        .into_iter()
        .map(|record| {
            let splits = by_expense.remove(&record.id).unwrap_or_default();
            LedgerEntry {
                expense: record.into(),
                splits,
            }
        })
        .collect())
}

const EXPENSE_COLUMNS: &str = "e.id, e.amount_cents, e.description, e.split_method, e.payer_id, e.created_at";

const SPLIT_COLUMNS: &str = "s.expense_id, s.user_id, s.amount_cents, s.percentage";

const INVOLVES_USER: &str = "(e.payer_id = ?1 OR EXISTS (
    SELECT 1 FROM expense_splits x WHERE x.expense_id = e.id AND x.user_id = ?1
))";

// =============================================================================
// Repository
// =============================================================================

/// Repository for expense database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ExpenseRepository::new(pool);
///
/// let entry = repo.create(&new_expense).await?;
/// let mine = repo.list_for_user(&user_id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Validates, splits and stores an expense.
    ///
    /// ## Errors
    /// * `Core(..)` - any split rule violation; nothing is written
    /// * `ForeignKeyViolation` - a user vanished after validation; rolled back
    pub async fn create(&self, new: &NewExpense) -> DbResult<LedgerEntry> {
        let mut referenced = vec![new.payer_id.as_str()];
        referenced.extend(new.split.participant_ids());

        let existing = UserRepository::new(self.pool.clone())
            .find_existing(&referenced)
            .await?;

        let plan = plan_expense(new, &existing)?;
        self.save_plan(plan).await
    }

    /// Parses a wire payload and creates the expense it describes.
    pub async fn create_from_payload(&self, payload: ExpensePayload) -> DbResult<LedgerEntry> {
        let new = payload.into_new_expense()?;
        self.create(&new).await
    }

    /// Stores a planned expense and all of its splits in one transaction.
    pub async fn save_plan(&self, plan: ExpensePlan) -> DbResult<LedgerEntry> {
        let entry = plan.into_ledger_entry(Uuid::new_v4().to_string(), Utc::now());
        let expense = &entry.expense;

        debug!(
            id = %expense.id,
            payer_id = %expense.payer_id,
            amount = %expense.amount(),
            split_method = %expense.split_method,
            splits = entry.splits.len(),
            "Saving expense"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO expenses (id, amount_cents, description, split_method, payer_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&expense.id)
        .bind(expense.amount_cents)
        .bind(&expense.description)
        .bind(expense.split_method)
        .bind(&expense.payer_id)
        .bind(expense.created_at)
        .execute(&mut *tx)
        .await?;

        for (position, split) in entry.splits.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO expense_splits (expense_id, user_id, position, amount_cents, percentage)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(&split.expense_id)
            .bind(&split.user_id)
            .bind(position as i64)
            .bind(split.amount_cents)
            .bind(split.percentage.map(|p| p.to_string()))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(id = %expense.id, "Expense created");
        Ok(entry)
    }

    /// Gets an expense with its splits.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<LedgerEntry>> {
        let expense = sqlx::query_as::<_, ExpenseRecord>(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses e WHERE e.id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(expense) = expense else {
            return Ok(None);
        };

        let splits = sqlx::query_as::<_, SplitRecord>(&format!(
            "SELECT {SPLIT_COLUMNS} FROM expense_splits s WHERE s.expense_id = ?1 ORDER BY s.position"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(assemble(vec![expense], splits)?.pop())
    }

    /// Lists every expense with its splits, oldest first.
    pub async fn list(&self) -> DbResult<Vec<LedgerEntry>> {
        let expenses = sqlx::query_as::<_, ExpenseRecord>(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses e ORDER BY e.created_at, e.id"
        ))
        .fetch_all(&self.pool)
        .await?;

        let splits = sqlx::query_as::<_, SplitRecord>(&format!(
            "SELECT {SPLIT_COLUMNS} FROM expense_splits s ORDER BY s.expense_id, s.position"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = expenses.len(), "Listed expenses");
        assemble(expenses, splits)
    }

    /// Lists expenses the user paid for or participates in, oldest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<LedgerEntry>> {
        let expenses = sqlx::query_as::<_, ExpenseRecord>(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses e WHERE {INVOLVES_USER} ORDER BY e.created_at, e.id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let splits = sqlx::query_as::<_, SplitRecord>(&format!(
            "SELECT {SPLIT_COLUMNS} FROM expense_splits s
             JOIN expenses e ON e.id = s.expense_id
             WHERE {INVOLVES_USER}
             ORDER BY s.expense_id, s.position"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(user_id = %user_id, count = expenses.len(), "Listed expenses for user");
        assemble(expenses, splits)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
