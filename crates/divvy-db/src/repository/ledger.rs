//! # Ledger Repository
//!
//! Derived views over the stored ledger: the balance sheet and per-user
//! statements. Nothing here is stored; every call reads the current rows
//! and runs the Balance Aggregator from `divvy-core`.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use crate::repository::expense::ExpenseRepository;
use crate::repository::user::UserRepository;
use divvy_core::{BalanceSheet, MemoryLedger, UserStatement};

/// Repository for balance computations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    fn expenses(&self) -> ExpenseRepository {
        ExpenseRepository::new(self.pool.clone())
    }

    /// Loads every user and ledger entry into an in-memory ledger.
    ///
    /// The snapshot implements `LedgerSource`, so any core aggregation can
    /// run against it.
    pub async fn snapshot(&self) -> DbResult<MemoryLedger> {
        let users = self.users().list().await?;
        let entries = self.expenses().list().await?;

        debug!(users = users.len(), expenses = entries.len(), "Loaded ledger snapshot");
        Ok(MemoryLedger::from_parts(users, entries))
    }

    /// Computes the balance sheet for every user.
    pub async fn balance_sheet(&self) -> DbResult<BalanceSheet> {
        let snapshot = self.snapshot().await?;
        let sheet = BalanceSheet::from_ledger(snapshot.users(), snapshot.entries());

        info!(users = sheet.len(), total_net = %sheet.total_net(), "Balance sheet computed");
        Ok(sheet)
    }

    /// Computes one user's statement, or `None` for an unknown user.
    pub async fn user_statement(&self, user_id: &str) -> DbResult<Option<UserStatement>> {
        let Some(user) = self.users().get_by_id(user_id).await? else {
            return Ok(None);
        };

        let entries = self.expenses().list_for_user(user_id).await?;
        debug!(user_id = %user_id, expenses = entries.len(), "Building user statement");
        Ok(Some(UserStatement::for_user(user, &entries)))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::config::DbConfig;
    use crate::error::DbError;
    use crate::pool::Database;
    use divvy_core::{
        generate_balance_sheet, CoreError, Money, NewExpense, NewUser, PercentageShare,
        SplitRequest, User,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    async fn setup() -> (Database, Vec<User>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut users = Vec::new();
        for name in ["A", "B", "C"] {
            users.push(
                db.users()
                    .create(&NewUser {
                        name: name.to_string(),
                        email: format!("{}@divvy.test", name.to_lowercase()),
                        mobile: "+15550000000".to_string(),
                    })
                    .await
                    .unwrap(),
            );
        }
        (db, users)
    }

    fn percentage(payer: &User, amount: i64, shares: &[(&User, Decimal)]) -> NewExpense {
        NewExpense {
            payer_id: payer.id.clone(),
            amount: Money::from_cents(amount),
            description: "Party".to_string(),
            split: SplitRequest::Percentage {
                percentages: shares
                    .iter()
                    .map(|(u, p)| PercentageShare {
                        user_id: u.id.clone(),
                        percentage: *p,
                    })
                    .collect(),
            },
        }
    }

    #[tokio::test]
    async fn test_empty_ledger() {
        let (db, users) = setup().await;
        let sheet = db.ledger().balance_sheet().await.unwrap();

        assert_eq!(sheet.len(), users.len());
        assert!(sheet.entries().all(|b| b.total_paid.is_zero() && b.total_owed.is_zero()));
    }

    #[tokio::test]
    async fn test_dinner_scenario() {
        let (db, users) = setup().await;
        let (a, b, c) = (&users[0], &users[1], &users[2]);

        db.expenses()
            .create(&NewExpense {
                payer_id: a.id.clone(),
                amount: Money::from_cents(30000),
                description: "Dinner".to_string(),
                split: SplitRequest::Equal {
                    participants: vec![a.id.clone(), b.id.clone(), c.id.clone()],
                },
            })
            .await
            .unwrap();

        let sheet = db.ledger().balance_sheet().await.unwrap();
        let row = sheet.get(&a.id).unwrap();
        assert_eq!(row.email, "a@divvy.test");
        assert_eq!(row.total_paid, Money::from_cents(30000));
        assert_eq!(row.total_owed, Money::from_cents(10000));
        assert_eq!(row.net_balance, Money::from_cents(20000));
        assert_eq!(sheet.get(&b.id).unwrap().net_balance, Money::from_cents(-10000));
        assert!(sheet.total_net().is_zero());
    }

    #[tokio::test]
    async fn test_rejected_percentages_leave_balances_untouched() {
        let (db, users) = setup().await;
        let (a, b, c) = (&users[0], &users[1], &users[2]);

        let result = db
            .expenses()
            .create(&percentage(a, 100000, &[(a, dec!(50)), (b, dec!(30)), (c, dec!(30))]))
            .await;
        assert!(matches!(
            result,
            Err(DbError::Core(CoreError::PercentageMismatch { total })) if total == dec!(110)
        ));

        let sheet = db.ledger().balance_sheet().await.unwrap();
        assert!(sheet.entries().all(|b| b.net_balance.is_zero()));
    }

    #[tokio::test]
    async fn test_snapshot_matches_stored_sheet() {
        let (db, users) = setup().await;
        let (a, b, c) = (&users[0], &users[1], &users[2]);
        db.expenses()
            .create(&percentage(b, 100000, &[(a, dec!(50)), (b, dec!(30)), (c, dec!(20))]))
            .await
            .unwrap();

        let snapshot = db.ledger().snapshot().await.unwrap();
        let from_snapshot = generate_balance_sheet(&snapshot).unwrap();
        let stored = db.ledger().balance_sheet().await.unwrap();

        assert_eq!(from_snapshot, stored);
        assert_eq!(stored.get(&b.id).unwrap().net_balance, Money::from_cents(70000));
    }

    #[tokio::test]
    async fn test_user_statement() {
        let (db, users) = setup().await;
        let (a, b, c) = (&users[0], &users[1], &users[2]);
        db.expenses()
            .create(&percentage(a, 1000, &[(b, dec!(60)), (c, dec!(40))]))
            .await
            .unwrap();

        let statement = db.ledger().user_statement(&a.id).await.unwrap().unwrap();
        assert_eq!(statement.lines.len(), 1);
        assert!(statement.lines[0].paid_by_user);
        assert!(statement.lines[0].owed_share.is_zero());
        assert_eq!(statement.net_balance, Money::from_cents(1000));

        let statement = db.ledger().user_statement(&c.id).await.unwrap().unwrap();
        assert_eq!(statement.total_owed, Money::from_cents(400));

        assert!(db.ledger().user_statement("nobody").await.unwrap().is_none());
    }
}
