use anyhow::{Result, anyhow};
use rusqlite::OptionalExtension;

use catroweb_types::like::LikeType;

use crate::Database;
use crate::models::ProgramLikeRow;

impl Database {
    /// Plain insert. A second like with the same (program, user, type)
    /// violates the primary key and is returned as an error.
    pub fn insert_like(&self, program_id: &str, user_id: &str, like_type: LikeType) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO program_like (program_id, user_id, type) VALUES (?1, ?2, ?3)",
                rusqlite::params![program_id, user_id, like_type.as_i64()],
            )?;
            Ok(())
        })
    }

    /// Insert unless the like already exists. Returns true if a row was added.
    /// An existing row keeps its original `created_at`.
    pub fn add_like(&self, program_id: &str, user_id: &str, like_type: LikeType) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let added = conn.execute(
                "INSERT OR IGNORE INTO program_like (program_id, user_id, type) VALUES (?1, ?2, ?3)",
                rusqlite::params![program_id, user_id, like_type.as_i64()],
            )?;
            Ok(added > 0)
        })
    }

    pub fn remove_like(&self, program_id: &str, user_id: &str, like_type: LikeType) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let removed = conn.execute(
                "DELETE FROM program_like WHERE program_id = ?1 AND user_id = ?2 AND type = ?3",
                rusqlite::params![program_id, user_id, like_type.as_i64()],
            )?;
            Ok(removed > 0)
        })
    }

    pub fn get_like(
        &self,
        program_id: &str,
        user_id: &str,
        like_type: LikeType,
    ) -> Result<Option<ProgramLikeRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT program_id, user_id, type, created_at FROM program_like
                     WHERE program_id = ?1 AND user_id = ?2 AND type = ?3",
                    rusqlite::params![program_id, user_id, like_type.as_i64()],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, i64>(2)?,
                            row.get::<_, String>(3)?,
                        ))
                    },
                )
                .optional()?;

            row.map(|(program_id, user_id, raw_type, created_at)| {
                Ok(ProgramLikeRow {
                    program_id,
                    user_id,
                    like_type: decode_type(raw_type)?,
                    created_at,
                })
            })
            .transpose()
        })
    }

    /// Number of likes per type for a program. Types without likes are omitted.
    pub fn like_counts(&self, program_id: &str) -> Result<Vec<(LikeType, u64)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT type, COUNT(*) FROM program_like
                 WHERE program_id = ?1
                 GROUP BY type
                 ORDER BY type",
            )?;
            let rows = stmt
                .query_map([program_id], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(raw_type, count)| Ok((decode_type(raw_type)?, count as u64)))
                .collect()
        })
    }

    pub fn user_like_types(&self, program_id: &str, user_id: &str) -> Result<Vec<LikeType>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT type FROM program_like WHERE program_id = ?1 AND user_id = ?2 ORDER BY type",
            )?;
            let rows = stmt
                .query_map([program_id, user_id], |row| row.get::<_, i64>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter().map(decode_type).collect()
        })
    }
}

fn decode_type(raw: i64) -> Result<LikeType> {
    LikeType::from_i64(raw).ok_or_else(|| anyhow!("Corrupt like type {} in program_like", raw))
}
