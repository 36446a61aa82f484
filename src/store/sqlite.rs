//! SQLite-backed document store
//!
//! Member-scoped records (bookings, ledger, wallet, payments, settings) are
//! kept as JSON payloads keyed by `(user_id, id)`, the same shape the portal
//! used for its documents. Accounts, credentials, and sessions get real
//! columns so email uniqueness and token lookups are enforced by SQLite.
//!
//! A single connection sits behind a mutex; every method is one short
//! critical section.

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, TransactionBehavior};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::error::{StoreError, StoreResult};
use super::records::{Credential, Session, StoredRegistration, UserProfile};
use crate::forms::RegistrationKind;
use crate::loyalty::{
    Booking, BookingStatus, PaymentMethod, PaymentTransaction, PointTransaction, Preferences,
};

pub const DB_FILE: &str = "kuriftu.db";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        full_name TEXT NOT NULL,
        age INTEGER NOT NULL,
        email TEXT NOT NULL UNIQUE,
        created_at INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS credentials (
        user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
        salt TEXT NOT NULL,
        digest TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS sessions (
        token TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at INTEGER NOT NULL,
        expires_at INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_sessions_expiry ON sessions(expires_at);
    CREATE TABLE IF NOT EXISTS registrations (
        id TEXT PRIMARY KEY,
        collection TEXT NOT NULL,
        payload TEXT NOT NULL,
        submitted_at INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_registrations_collection
        ON registrations(collection, submitted_at);
    CREATE TABLE IF NOT EXISTS bookings (
        user_id TEXT NOT NULL,
        id TEXT NOT NULL,
        sort_date TEXT NOT NULL,
        payload TEXT NOT NULL,
        PRIMARY KEY (user_id, id)
    );
    CREATE TABLE IF NOT EXISTS point_transactions (
        user_id TEXT NOT NULL,
        id TEXT NOT NULL,
        sort_date TEXT NOT NULL,
        payload TEXT NOT NULL,
        PRIMARY KEY (user_id, id)
    );
    CREATE TABLE IF NOT EXISTS payment_methods (
        user_id TEXT NOT NULL,
        id TEXT NOT NULL,
        position INTEGER NOT NULL,
        payload TEXT NOT NULL,
        PRIMARY KEY (user_id, id)
    );
    CREATE TABLE IF NOT EXISTS payment_transactions (
        user_id TEXT NOT NULL,
        id TEXT NOT NULL,
        sort_date TEXT NOT NULL,
        payload TEXT NOT NULL,
        PRIMARY KEY (user_id, id)
    );
    CREATE TABLE IF NOT EXISTS preferences (
        user_id TEXT PRIMARY KEY,
        payload TEXT NOT NULL
    );
";

/// Member-scoped document tables
#[derive(Debug, Clone, Copy)]
enum Table {
    Bookings,
    PointTransactions,
    PaymentTransactions,
}

impl Table {
    fn name(&self) -> &'static str {
        match self {
            Table::Bookings => "bookings",
            Table::PointTransactions => "point_transactions",
            Table::PaymentTransactions => "payment_transactions",
        }
    }
}

/// Outcome of [`Store::book_with_points`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redemption {
    /// Booking and redeem entry written; balance after the redemption
    Applied { balance: i64 },
    /// Nothing written
    Insufficient { available: i64 },
}

/// Table sizes for readiness checks and the CLI summary
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct StoreStats {
    pub users: u64,
    pub sessions: u64,
    pub registrations: u64,
    pub bookings: u64,
    pub point_transactions: u64,
}

pub struct Store {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl Store {
    /// Create or open the database under `data_dir`
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(DB_FILE);

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            ",
        )?;
        conn.execute_batch(SCHEMA)?;

        tracing::info!(path = %path.display(), "Opened store");

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path),
        })
    }

    /// Private database that disappears with the store
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Database file path, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    /// Round-trip a trivial query
    pub fn ping(&self) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    pub fn stats(&self) -> StoreResult<StoreStats> {
        let conn = self.conn()?;
        let count = |table: &str| -> StoreResult<u64> {
            let n: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
            Ok(n as u64)
        };
        Ok(StoreStats {
            users: count("users")?,
            sessions: count("sessions")?,
            registrations: count("registrations")?,
            bookings: count("bookings")?,
            point_transactions: count("point_transactions")?,
        })
    }

    // ---------------------------------------------------------------------
    // Accounts
    // ---------------------------------------------------------------------

    /// Insert a profile and its credential atomically
    ///
    /// Fails with [`StoreError::Duplicate`] when the email is taken.
    pub fn create_user(&self, profile: &UserProfile, credential: &Credential) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let taken: Option<String> = tx
            .query_row(
                "SELECT id FROM users WHERE email = ?",
                params![profile.email],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            return Err(StoreError::Duplicate(profile.email.clone()));
        }

        tx.execute(
            "INSERT INTO users (id, full_name, age, email, created_at) VALUES (?, ?, ?, ?, ?)",
            params![
                profile.id,
                profile.full_name,
                profile.age,
                profile.email,
                profile.created_at.timestamp_millis()
            ],
        )?;
        tx.execute(
            "INSERT INTO credentials (user_id, salt, digest) VALUES (?, ?, ?)",
            params![profile.id, credential.salt, credential.digest],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn user(&self, id: &str) -> StoreResult<Option<UserProfile>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, full_name, age, email, created_at FROM users WHERE id = ?",
        )?;
        let row = stmt.query_row(params![id], user_from_row).optional()?;
        Ok(row)
    }

    /// Look up an account and its credential by (normalized) email
    pub fn user_by_email(&self, email: &str) -> StoreResult<Option<(UserProfile, Credential)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT u.id, u.full_name, u.age, u.email, u.created_at, c.salt, c.digest
             FROM users u JOIN credentials c ON c.user_id = u.id
             WHERE u.email = ?",
        )?;
        let row = stmt
            .query_row(params![email], |row| {
                let profile = user_from_row(row)?;
                let credential = Credential {
                    salt: row.get(5)?,
                    digest: row.get(6)?,
                };
                Ok((profile, credential))
            })
            .optional()?;
        Ok(row)
    }

    pub fn insert_session(&self, session: &Session) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
            params![
                session.token,
                session.user_id,
                session.created_at.timestamp_millis(),
                session.expires_at.timestamp_millis()
            ],
        )?;
        Ok(())
    }

    pub fn session(&self, token: &str) -> StoreResult<Option<Session>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = ?",
        )?;
        let row = stmt
            .query_row(params![token], |row| {
                Ok(Session {
                    token: row.get(0)?,
                    user_id: row.get(1)?,
                    created_at: millis_to_datetime(row.get(2)?),
                    expires_at: millis_to_datetime(row.get(3)?),
                })
            })
            .optional()?;
        Ok(row)
    }

    /// Returns whether a session was removed
    pub fn delete_session(&self, token: &str) -> StoreResult<bool> {
        let conn = self.conn()?;
        let n = conn.execute("DELETE FROM sessions WHERE token = ?", params![token])?;
        Ok(n > 0)
    }

    /// Drop every session that expired before `now`
    pub fn purge_expired_sessions(&self, now: DateTime<Utc>) -> StoreResult<usize> {
        let conn = self.conn()?;
        let n = conn.execute(
            "DELETE FROM sessions WHERE expires_at <= ?",
            params![now.timestamp_millis()],
        )?;
        Ok(n)
    }

    // ---------------------------------------------------------------------
    // Registrations
    // ---------------------------------------------------------------------

    /// Write a form submission and return its new document id
    ///
    /// The stored document carries a `submittedAt` timestamp.
    pub fn add_registration(
        &self,
        collection: &str,
        document: &serde_json::Value,
    ) -> StoreResult<String> {
        let known = [
            RegistrationKind::Bed,
            RegistrationKind::Spa,
            RegistrationKind::Dining,
        ]
        .iter()
        .any(|k| k.collection() == collection);
        if !known {
            return Err(StoreError::UnknownCollection(collection.to_string()));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let submitted_at = Utc::now();
        let mut document = document.clone();
        if let Some(fields) = document.as_object_mut() {
            fields.insert(
                "submittedAt".to_string(),
                serde_json::Value::String(submitted_at.to_rfc3339()),
            );
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO registrations (id, collection, payload, submitted_at) VALUES (?, ?, ?, ?)",
            params![
                id,
                collection,
                serde_json::to_string(&document)?,
                submitted_at.timestamp_millis()
            ],
        )?;

        tracing::debug!(collection, id = %id, "Stored registration");
        Ok(id)
    }

    /// Submissions in a collection, oldest first
    pub fn registrations(&self, collection: &str) -> StoreResult<Vec<StoredRegistration>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, collection, payload, submitted_at FROM registrations
             WHERE collection = ? ORDER BY submitted_at, rowid",
        )?;
        let rows = stmt.query_map(params![collection], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, collection, payload, submitted_at) = row?;
            out.push(StoredRegistration {
                id,
                collection,
                document: serde_json::from_str(&payload)?,
                submitted_at: millis_to_datetime(submitted_at),
            });
        }
        Ok(out)
    }

    // ---------------------------------------------------------------------
    // Member documents
    // ---------------------------------------------------------------------

    /// Insert or replace a booking
    pub fn put_booking(&self, user_id: &str, booking: &Booking) -> StoreResult<()> {
        self.put_document(
            Table::Bookings,
            user_id,
            &booking.id,
            &booking.check_in.to_string(),
            booking,
        )
    }

    pub fn booking(&self, user_id: &str, id: &str) -> StoreResult<Option<Booking>> {
        self.document(Table::Bookings, user_id, id)
    }

    /// Bookings ordered by check-in, latest first
    pub fn bookings(&self, user_id: &str) -> StoreResult<Vec<Booking>> {
        self.documents(Table::Bookings, user_id)
    }

    pub fn put_transaction(&self, user_id: &str, tx: &PointTransaction) -> StoreResult<()> {
        self.put_document(
            Table::PointTransactions,
            user_id,
            &tx.id,
            &tx.date.to_string(),
            tx,
        )
    }

    /// Ledger entries, newest first
    pub fn transactions(&self, user_id: &str) -> StoreResult<Vec<PointTransaction>> {
        self.documents(Table::PointTransactions, user_id)
    }

    pub fn put_payment_transaction(
        &self,
        user_id: &str,
        tx: &PaymentTransaction,
    ) -> StoreResult<()> {
        self.put_document(
            Table::PaymentTransactions,
            user_id,
            &tx.id,
            &tx.date.to_string(),
            tx,
        )
    }

    pub fn payment_transactions(&self, user_id: &str) -> StoreResult<Vec<PaymentTransaction>> {
        self.documents(Table::PaymentTransactions, user_id)
    }

    pub fn payment_transaction(
        &self,
        user_id: &str,
        id: &str,
    ) -> StoreResult<Option<PaymentTransaction>> {
        self.document(Table::PaymentTransactions, user_id, id)
    }

    /// Member's point balance
    pub fn balance(&self, user_id: &str) -> StoreResult<i64> {
        let conn = self.conn()?;
        ledger_balance(&conn, user_id)
    }

    /// Write a points-paid booking together with its redeem entry
    ///
    /// The balance check and both writes share one immediate transaction, so
    /// concurrent redemptions cannot overdraw the ledger. Nothing is written
    /// when the balance does not cover the redemption.
    pub fn book_with_points(
        &self,
        user_id: &str,
        booking: &Booking,
        redemption: &PointTransaction,
    ) -> StoreResult<Redemption> {
        let needed = redemption.points.abs();
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let available = ledger_balance(&tx, user_id)?;
        if needed > available {
            return Ok(Redemption::Insufficient { available });
        }

        insert_document(
            &tx,
            Table::Bookings,
            user_id,
            &booking.id,
            &booking.check_in.to_string(),
            booking,
        )?;
        insert_document(
            &tx,
            Table::PointTransactions,
            user_id,
            &redemption.id,
            &redemption.date.to_string(),
            redemption,
        )?;
        tx.commit()?;

        Ok(Redemption::Applied {
            balance: available - needed,
        })
    }

    /// Persist a cancelled booking with its ledger and charge adjustments
    ///
    /// Returns `false` and writes nothing if the stored booking is no longer
    /// upcoming.
    pub fn commit_cancellation(
        &self,
        user_id: &str,
        booking: &Booking,
        ledger: &[PointTransaction],
        charge: Option<&PaymentTransaction>,
    ) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let stored: Option<Booking> = select_document(&tx, Table::Bookings, user_id, &booking.id)?;
        if !matches!(stored, Some(b) if b.status == BookingStatus::Upcoming) {
            return Ok(false);
        }

        insert_document(
            &tx,
            Table::Bookings,
            user_id,
            &booking.id,
            &booking.check_in.to_string(),
            booking,
        )?;
        for entry in ledger {
            insert_document(
                &tx,
                Table::PointTransactions,
                user_id,
                &entry.id,
                &entry.date.to_string(),
                entry,
            )?;
        }
        if let Some(charge) = charge {
            insert_document(
                &tx,
                Table::PaymentTransactions,
                user_id,
                &charge.id,
                &charge.date.to_string(),
                charge,
            )?;
        }
        tx.commit()?;
        Ok(true)
    }

    /// Replace the whole wallet in one transaction
    pub fn replace_payment_methods(
        &self,
        user_id: &str,
        methods: &[PaymentMethod],
    ) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM payment_methods WHERE user_id = ?",
            params![user_id],
        )?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO payment_methods (user_id, id, position, payload) VALUES (?, ?, ?, ?)",
            )?;
            for (position, method) in methods.iter().enumerate() {
                stmt.execute(params![
                    user_id,
                    method.id,
                    position as i64,
                    serde_json::to_string(method)?
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Wallet in insertion order
    pub fn payment_methods(&self, user_id: &str) -> StoreResult<Vec<PaymentMethod>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT payload FROM payment_methods WHERE user_id = ? ORDER BY position",
        )?;
        let rows = stmt.query_map(params![user_id], |row| row.get::<_, String>(0))?;
        decode_rows(rows)
    }

    pub fn put_preferences(&self, user_id: &str, prefs: &Preferences) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO preferences (user_id, payload) VALUES (?, ?)",
            params![user_id, serde_json::to_string(prefs)?],
        )?;
        Ok(())
    }

    pub fn preferences(&self, user_id: &str) -> StoreResult<Option<Preferences>> {
        let conn = self.conn()?;
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM preferences WHERE user_id = ?",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        payload
            .map(|p| serde_json::from_str(&p).map_err(StoreError::from))
            .transpose()
    }

    fn put_document<T: Serialize>(
        &self,
        table: Table,
        user_id: &str,
        id: &str,
        sort_date: &str,
        value: &T,
    ) -> StoreResult<()> {
        let conn = self.conn()?;
        insert_document(&conn, table, user_id, id, sort_date, value)
    }

    fn document<T: DeserializeOwned>(
        &self,
        table: Table,
        user_id: &str,
        id: &str,
    ) -> StoreResult<Option<T>> {
        let conn = self.conn()?;
        select_document(&conn, table, user_id, id)
    }

    fn documents<T: DeserializeOwned>(&self, table: Table, user_id: &str) -> StoreResult<Vec<T>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT payload FROM {} WHERE user_id = ? ORDER BY sort_date DESC, rowid DESC",
            table.name()
        );
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params![user_id], |row| row.get::<_, String>(0))?;
        decode_rows(rows)
    }
}

fn insert_document<T: Serialize>(
    conn: &Connection,
    table: Table,
    user_id: &str,
    id: &str,
    sort_date: &str,
    value: &T,
) -> StoreResult<()> {
    let sql = format!(
        "INSERT OR REPLACE INTO {} (user_id, id, sort_date, payload) VALUES (?, ?, ?, ?)",
        table.name()
    );
    conn.prepare_cached(&sql)?.execute(params![
        user_id,
        id,
        sort_date,
        serde_json::to_string(value)?
    ])?;
    Ok(())
}

fn select_document<T: DeserializeOwned>(
    conn: &Connection,
    table: Table,
    user_id: &str,
    id: &str,
) -> StoreResult<Option<T>> {
    let sql = format!(
        "SELECT payload FROM {} WHERE user_id = ? AND id = ?",
        table.name()
    );
    let payload: Option<String> = conn
        .prepare_cached(&sql)?
        .query_row(params![user_id, id], |row| row.get(0))
        .optional()?;
    payload
        .map(|p| serde_json::from_str(&p).map_err(StoreError::from))
        .transpose()
}

/// Sum of signed ledger deltas for a member
fn ledger_balance(conn: &Connection, user_id: &str) -> StoreResult<i64> {
    let mut stmt =
        conn.prepare_cached("SELECT payload FROM point_transactions WHERE user_id = ?")?;
    let rows = stmt.query_map(params![user_id], |row| row.get::<_, String>(0))?;
    let entries: Vec<PointTransaction> = decode_rows(rows)?;
    Ok(entries.iter().map(|tx| tx.points).sum())
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserProfile> {
    Ok(UserProfile {
        id: row.get(0)?,
        full_name: row.get(1)?,
        age: row.get(2)?,
        email: row.get(3)?,
        created_at: millis_to_datetime(row.get(4)?),
    })
}

fn decode_rows<T, I>(rows: I) -> StoreResult<Vec<T>>
where
    T: DeserializeOwned,
    I: Iterator<Item = rusqlite::Result<String>>,
{
    let mut out = Vec::new();
    for payload in rows {
        out.push(serde_json::from_str(&payload?)?);
    }
    Ok(out)
}

fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loyalty::seed;
    use chrono::{Duration, NaiveDate};
    use serde_json::json;
    use tempfile::tempdir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn profile(email: &str) -> UserProfile {
        UserProfile {
            id: uuid::Uuid::new_v4().to_string(),
            full_name: "Abebe Kebede".to_string(),
            age: 34,
            email: email.to_string(),
            created_at: Utc::now(),
        }
    }

    fn credential() -> Credential {
        Credential {
            salt: "00ff".to_string(),
            digest: "abcd".to_string(),
        }
    }

    #[test]
    fn test_store_creation() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        assert!(store.path().unwrap().ends_with(DB_FILE));
        store.ping().unwrap();
        assert_eq!(store.stats().unwrap(), StoreStats::default());
    }

    #[test]
    fn test_create_user_rejects_duplicate_email() {
        let store = Store::in_memory().unwrap();
        let first = profile("guest@kuriftu.com");
        store.create_user(&first, &credential()).unwrap();

        let err = store
            .create_user(&profile("guest@kuriftu.com"), &credential())
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));

        let (found, cred) = store.user_by_email("guest@kuriftu.com").unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert_eq!(cred, credential());
        assert!(store.user_by_email("other@kuriftu.com").unwrap().is_none());
    }

    #[test]
    fn test_sessions() {
        let store = Store::in_memory().unwrap();
        let user = profile("guest@kuriftu.com");
        store.create_user(&user, &credential()).unwrap();

        let now = Utc::now();
        let session = Session {
            token: "tok-1".to_string(),
            user_id: user.id.clone(),
            created_at: now,
            expires_at: now + Duration::minutes(5),
        };
        store.insert_session(&session).unwrap();
        let loaded = store.session("tok-1").unwrap().unwrap();
        assert_eq!(loaded.user_id, user.id);
        assert_eq!(
            loaded.expires_at.timestamp_millis(),
            session.expires_at.timestamp_millis()
        );

        assert_eq!(store.purge_expired_sessions(now).unwrap(), 0);
        assert_eq!(
            store
                .purge_expired_sessions(now + Duration::minutes(10))
                .unwrap(),
            1
        );
        assert!(!store.delete_session("tok-1").unwrap());
    }

    #[test]
    fn test_add_registration_stamps_document() {
        let store = Store::in_memory().unwrap();
        let id = store
            .add_registration("spa-registrations", &json!({"fullName": "Abebe"}))
            .unwrap();

        let stored = store.registrations("spa-registrations").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
        assert_eq!(stored[0].document["fullName"], "Abebe");
        assert!(stored[0].document["submittedAt"].is_string());
        assert!(store.registrations("bed-registrations").unwrap().is_empty());
    }

    #[test]
    fn test_add_registration_unknown_collection() {
        let store = Store::in_memory().unwrap();
        let err = store
            .add_registration("gym-registrations", &json!({}))
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownCollection(_)));
    }

    #[test]
    fn test_member_documents() {
        let store = Store::in_memory().unwrap();
        for booking in seed::bookings(today()) {
            store.put_booking("u1", &booking).unwrap();
        }
        for tx in seed::point_history(today()) {
            store.put_transaction("u1", &tx).unwrap();
        }

        let bookings = store.bookings("u1").unwrap();
        assert_eq!(bookings.len(), 6);
        assert!(bookings
            .windows(2)
            .all(|w| w[0].check_in >= w[1].check_in));
        assert!(store.bookings("u2").unwrap().is_empty());

        let booking = store.booking("u1", "booking-1").unwrap().unwrap();
        assert_eq!(booking.confirmation_number, "KR12345");

        let txs = store.transactions("u1").unwrap();
        assert_eq!(txs.len(), 10);
        assert_eq!(txs[0].id, "tx-1");
    }

    #[test]
    fn test_replace_payment_methods_keeps_order() {
        let store = Store::in_memory().unwrap();
        let mut methods = seed::payment_methods(today());
        store.replace_payment_methods("u1", &methods).unwrap();

        methods.reverse();
        store.replace_payment_methods("u1", &methods).unwrap();
        let loaded = store.payment_methods("u1").unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, "card-2");
    }

    #[test]
    fn test_book_with_points_checks_balance() {
        let store = Store::in_memory().unwrap();
        store
            .put_transaction("u1", &PointTransaction::earn("tx-1", today(), "Stay", 6_000))
            .unwrap();

        let mut booking = seed::bookings(today()).remove(0);
        booking.id = "booking-new".to_string();
        let redeem = PointTransaction::redeem("tx-2", today(), "Stay Redemption", 5_000);
        assert_eq!(
            store.book_with_points("u1", &booking, &redeem).unwrap(),
            Redemption::Applied { balance: 1_000 }
        );
        assert_eq!(store.balance("u1").unwrap(), 1_000);

        booking.id = "booking-other".to_string();
        let again = PointTransaction::redeem("tx-3", today(), "Stay Redemption", 5_000);
        assert_eq!(
            store.book_with_points("u1", &booking, &again).unwrap(),
            Redemption::Insufficient { available: 1_000 }
        );
        assert!(store.booking("u1", "booking-other").unwrap().is_none());
        assert_eq!(store.transactions("u1").unwrap().len(), 2);
    }

    #[test]
    fn test_concurrent_redemptions_never_overdraw() {
        let dir = tempdir().unwrap();
        let store = std::sync::Arc::new(Store::open(dir.path()).unwrap());
        store
            .put_transaction("u1", &PointTransaction::earn("tx-0", today(), "Stay", 5_750))
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = std::sync::Arc::clone(&store);
                std::thread::spawn(move || {
                    let mut booking = seed::bookings(today()).remove(0);
                    booking.id = format!("booking-{}", i);
                    let redeem =
                        PointTransaction::redeem(format!("tx-r{}", i), today(), "Stay", 5_000);
                    store.book_with_points("u1", &booking, &redeem).unwrap()
                })
            })
            .collect();

        let applied = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|r| matches!(r, Redemption::Applied { .. }))
            .count();
        assert_eq!(applied, 1);
        assert_eq!(store.balance("u1").unwrap(), 750);
    }

    #[test]
    fn test_commit_cancellation_only_once() {
        let store = Store::in_memory().unwrap();
        let mut booking = seed::bookings(today()).remove(0);
        assert_eq!(booking.status, BookingStatus::Upcoming);
        store.put_booking("u1", &booking).unwrap();

        booking.status = BookingStatus::Cancelled;
        let refund = [PointTransaction::earn("tx-refund", today(), "Refund", 500)];
        assert!(store
            .commit_cancellation("u1", &booking, &refund, None)
            .unwrap());
        assert_eq!(store.balance("u1").unwrap(), 500);

        let again = [PointTransaction::earn("tx-refund-2", today(), "Refund", 500)];
        assert!(!store
            .commit_cancellation("u1", &booking, &again, None)
            .unwrap());
        assert_eq!(store.balance("u1").unwrap(), 500);
        assert_eq!(
            store.booking("u1", &booking.id).unwrap().unwrap().status,
            BookingStatus::Cancelled
        );
    }

    #[test]
    fn test_preferences_round_trip() {
        let store = Store::in_memory().unwrap();
        assert!(store.preferences("u1").unwrap().is_none());

        let prefs = Preferences {
            theme: "dark".to_string(),
            ..Default::default()
        };
        store.put_preferences("u1", &prefs).unwrap();
        assert_eq!(store.preferences("u1").unwrap().unwrap(), prefs);
    }

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        {
            let store = Store::open(dir.path()).unwrap();
            store
                .add_registration("bed-registrations", &json!({"fullName": "Abebe"}))
                .unwrap();
        }
        let store = Store::open(dir.path()).unwrap();
        assert_eq!(store.stats().unwrap().registrations, 1);
    }
}
