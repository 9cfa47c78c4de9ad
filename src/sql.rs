//! # MySQL Database Wrapper
//!
//! A simplified, opinionated interface to the timetabler MySQL database,
//! built around a globally shared, lazily-initialized connection pool.
//!
//! The solve pipeline talks to the store in three distinct phases: bulk
//! reads, one outbound solver call, one write transaction. The helpers here
//! cover the first and last of those: plain query functions for the reads,
//! and [`transaction`] for the atomic schedule write.
//!
//! ## Configuration
//!
//! The connection is configured via environment variables:
//! - `DATABASE_URL`: a full MySQL URL; takes precedence when set.
//! - `MYSQL_PASSWORD`: password for the `root` user (default: empty).
//! - `MYSQL_SOCKET`: (Optional) path to a local MySQL socket file.
//! - `MYSQL_HOSTNAME`: (Optional) hostname of the MySQL server.

use anyhow::Result;
use mysql;
use mysql::prelude::*;
use mysql::*;
use once_cell::sync::Lazy;
use std::env;

/// A global, lazily-initialized MySQL connection pool.
///
/// The connection URL is constructed at first use from environment
/// variables, so callers never pass connection objects around.
static CLIENT: Lazy<mysql::Pool> = Lazy::new(|| {
    let url = match env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            let password = env::var("MYSQL_PASSWORD").unwrap_or_else(|_| "".into());
            // Prefer a local socket when MYSQL_SOCKET is set, otherwise TCP.
            match env::var("MYSQL_SOCKET") {
                Ok(socket) => format!(
                    "mysql://root:{}@localhost:3306/timetabler?socket={}",
                    password, socket
                ),
                Err(_) => format!(
                    "mysql://root:{}@{}:3306/timetabler",
                    password,
                    env::var("MYSQL_HOSTNAME").as_deref().unwrap_or("127.0.0.1")
                ),
            }
        }
    };
    let opts = Opts::from_url(&url).expect("Invalid MySQL URL");
    let pool = Pool::new(opts).expect("Failed to create MySQL pool");
    eprintln!("MySQL connection established.");
    pool
});

/// Executes a query that is expected to return multiple rows.
pub fn select(query: &str, params: impl Into<Params>) -> Result<Vec<Row>> {
    let mut conn = CLIENT.get_conn()?;
    conn.exec_map(query, params, |r| Row { row: r })
        .map_err(|e| e.into())
}

/// Executes a query that is expected to return at most one row.
pub fn row(query: &str, params: impl Into<Params>) -> Result<Option<Row>> {
    Ok(CLIENT
        .get_conn()?
        .exec_first(query, params)?
        .map(|r| Row { row: r }))
}

/// Executes a query that is expected to return a single cell (one row, one
/// column). Returns `None` when no row matched.
pub fn cell<T: FromValue>(query: &str, params: impl Into<Params>) -> Result<Option<T>> {
    match row(query, params)? {
        Some(row) => Ok(Some(row.at(0)?)),
        None => Ok(None),
    }
}

/// Executes a statement that does not return rows (e.g., UPDATE, DDL).
///
/// # Returns
/// A `Result` containing the number of affected rows.
pub fn exec(query: &str, params: impl Into<Params>) -> Result<u64> {
    let mut conn = CLIENT.get_conn()?;
    conn.exec_drop(query, params)?;
    Ok(conn.affected_rows())
}

/// Executes an INSERT statement and returns the last insert ID.
pub fn insert(query: &str, params: impl Into<Params>) -> Result<u64> {
    let mut conn = CLIENT.get_conn()?;
    conn.exec_drop(query, params)?;
    Ok(conn.last_insert_id())
}

/// Executes a statement multiple times with different parameters in a single
/// batch. More efficient than executing the same statement repeatedly.
pub fn exec_batch<P, I>(query: &str, params: I) -> Result<()>
where
    P: Into<Params>,
    I: IntoIterator<Item = P>,
{
    let mut conn = CLIENT.get_conn()?;
    conn.exec_batch(query, params)?;
    Ok(())
}

/// Runs `f` inside a database transaction on a single pooled connection.
///
/// Commits when `f` returns `Ok`, rolls back when it returns `Err`; either
/// way the closure's result is passed through. Readers never observe a
/// partially-applied transaction.
pub fn transaction<T, F>(f: F) -> Result<T>
where
    F: FnOnce(&mut Transaction<'_>) -> Result<T>,
{
    let mut conn = CLIENT.get_conn()?;
    let mut tx = conn.start_transaction(TxOpts::default())?;
    match f(&mut tx) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(e) => {
            tx.rollback()?;
            Err(e)
        }
    }
}

/// A wrapper around `mysql::Row` with more ergonomic data access methods.
pub struct Row {
    row: mysql::Row,
}

impl Row {
    /// Gets an optional value from the row by column index.
    ///
    /// # Returns
    /// `Ok(Some(T))` if the value is not NULL.
    /// `Ok(None)` if the value is NULL.
    /// `Err` if the value cannot be converted to type `T`.
    pub fn at_option<T>(&self, idx: usize) -> Result<Option<T>>
    where
        T: FromValue,
    {
        match self.row.get_opt::<mysql::Value, usize>(idx) {
            Some(Ok(mysql::Value::NULL)) => None,
            Some(Ok(x)) => Some(mysql::from_value_opt::<T>(x.clone())),
            Some(Err(e)) => Some(Err(e)),
            None => None,
        }
        .transpose()
        .map_err(|e| {
            anyhow::anyhow!(
                "Error in column {} (#{}): {}",
                self.row.columns_ref()[idx].name_str(),
                idx,
                e
            )
        })
    }

    /// Gets a required value from the row by column index.
    pub fn at<T>(&self, idx: usize) -> Result<T>
    where
        T: FromValue,
    {
        self.at_option(idx)?.ok_or_else(|| {
            anyhow::anyhow!(
                "Column {} (#{}) is unexpectedly null",
                self.row.columns_ref()[idx].name_str(),
                idx
            )
        })
    }

    /// Finds the index of a column by its name.
    fn idx(&self, name: &str) -> Result<usize> {
        self.row
            .columns()
            .iter()
            .position(|c| c.name_str() == name)
            .ok_or_else(|| anyhow::anyhow!("Column {} is not found", name))
    }

    /// Gets a required value from the row by column name.
    pub fn get<T>(&self, name: &str) -> Result<T>
    where
        T: FromValue,
    {
        self.at(self.idx(name)?)
    }

    /// Gets an optional value from the row by column name.
    pub fn get_option<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromValue,
    {
        self.at_option(self.idx(name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mysql::params;

    #[test]
    #[ignore]
    fn cell_select_literal() -> Result<()> {
        let v: Option<i64> = cell("SELECT 1", ())?;
        assert_eq!(v, Some(1));
        Ok(())
    }

    #[test]
    #[ignore]
    fn row_and_named_access() -> Result<()> {
        let r = row("SELECT 42 AS a, NULL AS b", ())?.expect("row should exist");
        let a: i64 = r.get("a")?;
        let b: Option<i64> = r.get_option("b")?;
        assert_eq!(a, 42);
        assert_eq!(b, None);
        let a0: i64 = r.at(0)?;
        assert_eq!(a0, 42);
        Ok(())
    }

    #[test]
    #[ignore]
    fn transaction_rolls_back_on_error() -> Result<()> {
        // The closure fails after an insert; nothing must be visible after.
        let mut conn = CLIENT.get_conn()?;
        conn.exec_drop(
            "CREATE TABLE IF NOT EXISTS tmp_tx_probe (id INT AUTO_INCREMENT PRIMARY KEY, v INT)",
            (),
        )?;
        conn.exec_drop("DELETE FROM tmp_tx_probe", ())?;

        let r: Result<()> = transaction(|tx| {
            tx.exec_drop("INSERT INTO tmp_tx_probe(v) VALUES (1)", ())?;
            anyhow::bail!("boom");
        });
        assert!(r.is_err());

        let cnt: Option<i64> = cell("SELECT COUNT(*) FROM tmp_tx_probe", ())?;
        assert_eq!(cnt, Some(0));
        exec("DROP TABLE tmp_tx_probe", ())?;
        Ok(())
    }
}
