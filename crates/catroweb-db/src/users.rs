use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::Database;
use crate::models::{ProgramRow, UserRow};

pub struct NewUser<'a> {
    pub id: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub upload_token: &'a str,
}

const USER_COLUMNS: &str =
    "id, username, email, password, enabled, super_admin, upload_token, created_at";

impl Database {
    // -- Users --

    /// Inserts an enabled, non-admin account.
    pub fn create_user(&self, user: &NewUser<'_>) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password, upload_token)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (user.id, user.username, user.email, user.password_hash, user.upload_token),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    /// True if `value` is already somebody's username or email. Both
    /// comparisons are case-insensitive through the column collation.
    pub fn is_identifier_taken(&self, value: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let taken = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1 OR email = ?1)",
                [value],
                |row| row.get(0),
            )?;
            Ok(taken)
        })
    }

    pub fn set_super_admin(&self, user_id: &str, super_admin: bool) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE users SET super_admin = ?1 WHERE id = ?2",
                rusqlite::params![super_admin, user_id],
            )?;
            Ok(())
        })
    }

    pub fn set_enabled(&self, user_id: &str, enabled: bool) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE users SET enabled = ?1 WHERE id = ?2",
                rusqlite::params![enabled, user_id],
            )?;
            Ok(())
        })
    }

    // -- Programs --

    pub fn create_program(&self, id: &str, user_id: &str, name: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO programs (id, user_id, name) VALUES (?1, ?2, ?3)",
                (id, user_id, name),
            )?;
            Ok(())
        })
    }

    pub fn get_program(&self, id: &str) -> Result<Option<ProgramRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, user_id, name, created_at FROM programs WHERE id = ?1",
                    [id],
                    |row| {
                        Ok(ProgramRow {
                            id: row.get(0)?,
                            user_id: row.get(1)?,
                            name: row.get(2)?,
                            created_at: row.get(3)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn delete_program(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let deleted = conn.execute("DELETE FROM programs WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }
}

/// True if `err` is a UNIQUE constraint failure, such as a username or email
/// inserted by a concurrent registration.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _))
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {} FROM users WHERE {} = ?1", USER_COLUMNS, column);
    let row = conn.query_row(&sql, [value], map_user).optional()?;
    Ok(row)
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        enabled: row.get(4)?,
        super_admin: row.get(5)?,
        upload_token: row.get(6)?,
        created_at: row.get(7)?,
    })
}
