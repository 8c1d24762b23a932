use super::row::{self, StoredTransaction};
use crate::domain::currency::Currency;
use crate::domain::money::Money;
use crate::domain::ports::TransactionStore;
use crate::domain::transaction::Transaction;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

const SCHEMA: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS transactions (
        id       TEXT PRIMARY KEY NOT NULL,
        date     TEXT NOT NULL,
        status   TEXT NOT NULL,
        order_id TEXT NOT NULL,
        currency TEXT NOT NULL,
        amount   TEXT NOT NULL,
        version  INTEGER NOT NULL DEFAULT 0
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_transactions_order_id ON transactions (order_id)",
];

const SELECT_COLUMNS: &str = "SELECT id, date, status, order_id, currency, amount, version FROM transactions";

/// Bind parameters per `IN (...)` query, below SQLite's historical limit of 999.
const IN_CHUNK: usize = 500;

const UPSERT: &str = r#"
    INSERT INTO transactions (id, date, status, order_id, currency, amount, version)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)
    ON CONFLICT(id) DO UPDATE SET
        date = excluded.date,
        status = excluded.status,
        order_id = excluded.order_id,
        currency = excluded.currency,
        amount = excluded.amount,
        version = transactions.version + 1
"#;

/// Relational store backed by SQLite through `sqlx`.
///
/// Everything lives in the single `transactions` table. Dates are stored as
/// fixed-width RFC 3339 text (nanosecond precision, `Z` suffix) so text order
/// equals time order, and amounts as decimal text so their scale survives.
#[derive(Clone)]
pub struct SqliteTransactionStore {
    pool: SqlitePool,
}

impl SqliteTransactionStore {
    /// Connects to a database URL such as `sqlite://transactions.db`, creating the file if needed.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Self::with_pool(pool).await
    }

    /// Opens a private in-memory database.
    ///
    /// The pool is pinned to one connection that never expires, since every
    /// SQLite connection to `:memory:` would otherwise see its own empty database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    /// Wraps an existing pool and makes sure the schema exists.
    pub async fn with_pool(pool: SqlitePool) -> Result<Self> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        Ok(Self { pool })
    }

    /// Current optimistic-lock version of a row.
    pub async fn version_of(&self, id: Uuid) -> Result<Option<u64>> {
        let version = sqlx::query_scalar::<_, i64>("SELECT version FROM transactions WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(version.map(|v| v as u64))
    }

    async fn upsert(conn: &mut SqliteConnection, txn: &Transaction) -> Result<()> {
        let value = txn.value();
        sqlx::query(UPSERT)
            .bind(txn.id().to_string())
            .bind(encode_date(txn.date()))
            .bind(txn.status())
            .bind(txn.order_id())
            .bind(value.currency().code())
            .bind(value.amount().to_string())
            .execute(conn)
            .await?;
        Ok(())
    }

    async fn fetch_where(&self, clause: &str, binds: &[String]) -> Result<Vec<Transaction>> {
        let sql = format!("{SELECT_COLUMNS} {clause}");
        let mut query = sqlx::query_as::<_, TransactionRow>(&sql);
        for value in binds {
            query = query.bind(value.as_str());
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| row.into_domain().map(|stored| stored.transaction))
            .collect()
    }

    /// `SELECT ... WHERE <column> IN (...)`, issued in chunks of [`IN_CHUNK`] values
    /// and ordered by `(date, id)` across chunks. Callers skip empty lists.
    async fn fetch_in(&self, column: &str, values: &[String]) -> Result<Vec<Transaction>> {
        let mut found = Vec::new();
        for chunk in values.chunks(IN_CHUNK) {
            let mut builder = QueryBuilder::<Sqlite>::new(SELECT_COLUMNS);
            builder.push(format!(" WHERE {column} IN ("));
            let mut separated = builder.separated(", ");
            for value in chunk {
                separated.push_bind(value.clone());
            }
            separated.push_unseparated(")");

            let rows = builder
                .build_query_as::<TransactionRow>()
                .fetch_all(&self.pool)
                .await?;
            for row in rows {
                found.push(row.into_domain()?.transaction);
            }
        }
        row::sort_chronologically(&mut found);
        found.dedup_by_key(|txn| txn.id());
        Ok(found)
    }
}

#[async_trait]
impl TransactionStore for SqliteTransactionStore {
    async fn save(&self, txn: Transaction) -> Result<Transaction> {
        debug!(id = %txn.id(), order_id = txn.order_id(), "saving transaction");
        let mut conn = self.pool.acquire().await?;
        Self::upsert(&mut conn, &txn).await?;
        Ok(txn)
    }

    async fn save_all(&self, txns: Vec<Transaction>) -> Result<Vec<Transaction>> {
        debug!(count = txns.len(), "saving transaction batch");
        let mut tx = self.pool.begin().await?;
        for txn in &txns {
            Self::upsert(&mut tx, txn).await?;
        }
        tx.commit().await?;
        Ok(txns)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>> {
        Ok(self
            .fetch_where("WHERE id = ?1", &[id.to_string()])
            .await?
            .into_iter()
            .next())
    }

    async fn find_all_by_id(&self, ids: &[Uuid]) -> Result<Vec<Transaction>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let keys: Vec<String> = ids.iter().map(Uuid::to_string).collect();
        let found: HashMap<Uuid, Transaction> = self
            .fetch_in("id", &keys)
            .await?
            .into_iter()
            .map(|txn| (txn.id(), txn))
            .collect();
        Ok(row::in_request_order(ids, found))
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool> {
        let found = sqlx::query_scalar::<_, i64>("SELECT 1 FROM transactions WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn count(&self) -> Result<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn find_all(&self) -> Result<Vec<Transaction>> {
        self.fetch_where("ORDER BY date, id", &[]).await
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<()> {
        debug!(%id, "deleting transaction");
        let result = sqlx::query("DELETE FROM transactions WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(PaymentError::NotFound(id));
        }
        Ok(())
    }

    async fn delete_all_by_id(&self, ids: &[Uuid]) -> Result<()> {
        debug!(count = ids.len(), "deleting transaction batch");
        let mut tx = self.pool.begin().await?;
        for id in ids {
            sqlx::query("DELETE FROM transactions WHERE id = ?1")
                .bind(id.to_string())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Transaction>> {
        Ok(self
            .fetch_where(
                "WHERE order_id = ?1 ORDER BY date, id LIMIT 1",
                &[order_id.to_string()],
            )
            .await?
            .into_iter()
            .next())
    }

    async fn find_by_transaction_id_and_order_id(
        &self,
        id: Uuid,
        order_id: &str,
    ) -> Result<Option<Transaction>> {
        Ok(self
            .fetch_where(
                "WHERE id = ?1 AND order_id = ?2",
                &[id.to_string(), order_id.to_string()],
            )
            .await?
            .into_iter()
            .next())
    }

    async fn find_all_by_order_ids(&self, order_ids: &[String]) -> Result<Vec<Transaction>> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch_in("order_id", order_ids).await
    }
}

fn encode_date(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Internal row type for SQLx. Not exposed outside the adapter.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: String,
    date: String,
    status: String,
    order_id: String,
    currency: String,
    amount: String,
    version: i64,
}

impl TransactionRow {
    fn into_domain(self) -> Result<StoredTransaction> {
        let id = Uuid::parse_str(&self.id).map_err(PaymentError::persistence)?;
        let date = DateTime::parse_from_rfc3339(&self.date)
            .map_err(PaymentError::persistence)?
            .with_timezone(&Utc);
        let currency = Currency::from_code(&self.currency)?;
        let amount = Decimal::from_str(&self.amount).map_err(PaymentError::persistence)?;

        Ok(StoredTransaction {
            transaction: Transaction::new(
                id,
                date,
                self.status,
                self.order_id,
                Money::new(currency, amount),
            ),
            version: self.version as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn txn(order_id: &str) -> Transaction {
        Transaction::new(
            Uuid::new_v4(),
            Utc::now(),
            "accepted",
            order_id,
            Money::new(Currency::INR, dec!(99.90)),
        )
    }

    #[test]
    fn test_date_text_sorts_like_time() {
        let early = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let late = early + chrono::Duration::nanoseconds(1);
        assert_eq!(encode_date(early), "2024-01-02T03:04:05.000000000Z");
        assert!(encode_date(early) < encode_date(late));
    }

    #[tokio::test]
    async fn test_sqlite_round_trip_keeps_scale() {
        let store = SqliteTransactionStore::in_memory().await.unwrap();
        let tx = txn("O1");

        store.save(tx.clone()).await.unwrap();
        let back = store.find_by_id(tx.id()).await.unwrap().unwrap();

        assert_eq!(back, tx);
        assert_eq!(back.date(), tx.date());
        assert_eq!(back.value().amount().to_string(), "99.90");
    }

    #[tokio::test]
    async fn test_sqlite_lookups_beyond_one_chunk() {
        let store = SqliteTransactionStore::in_memory().await.unwrap();
        let txns: Vec<Transaction> = (0..IN_CHUNK * 2 + 7)
            .map(|i| txn(&format!("O{i}")))
            .collect();
        store.save_all(txns.clone()).await.unwrap();

        let ids: Vec<Uuid> = txns.iter().map(Transaction::id).collect();
        assert_eq!(store.find_all_by_id(&ids).await.unwrap(), txns);

        let orders: Vec<String> = txns.iter().map(|t| t.order_id().to_string()).collect();
        let by_order = store.find_all_by_order_ids(&orders).await.unwrap();
        assert_eq!(by_order.len(), txns.len());
        assert!(
            by_order
                .windows(2)
                .all(|w| (w[0].date(), w[0].id()) <= (w[1].date(), w[1].id()))
        );
    }

    #[tokio::test]
    async fn test_sqlite_upsert_bumps_version() {
        let store = SqliteTransactionStore::in_memory().await.unwrap();
        let tx = txn("O1");

        store.save(tx.clone()).await.unwrap();
        assert_eq!(store.version_of(tx.id()).await.unwrap(), Some(0));

        store.save(tx.with_status("failed", Utc::now())).await.unwrap();
        assert_eq!(store.version_of(tx.id()).await.unwrap(), Some(1));
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.version_of(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sqlite_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("txns.db").display());
        let tx = txn("O1");

        let store = SqliteTransactionStore::connect(&url).await.unwrap();
        store.save(tx.clone()).await.unwrap();
        store.pool.close().await;

        let reopened = SqliteTransactionStore::connect(&url).await.unwrap();
        assert_eq!(reopened.find_by_id(tx.id()).await.unwrap(), Some(tx));
    }
}
