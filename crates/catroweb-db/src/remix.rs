use std::collections::BTreeSet;

use anyhow::Result;
use rusqlite::types::Value;
use rusqlite::params_from_iter;

use crate::models::ScratchRemixRelationRow;
use crate::{Database, ID_BATCH_SIZE, placeholders};

impl Database {
    /// Record that `child_id` was remixed from the Scratch program `parent_id`.
    pub fn insert_scratch_relation(&self, parent_id: i64, child_id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO scratch_program_remix_relation (scratch_parent_id, catrobat_child_id)
                 VALUES (?1, ?2)",
                rusqlite::params![parent_id, child_id],
            )?;
            Ok(())
        })
    }

    /// Distinct relations whose child is one of `program_ids`, ordered by
    /// child then parent. Any number of ids is accepted.
    pub fn get_scratch_relations_of_programs(
        &self,
        program_ids: &[String],
    ) -> Result<Vec<ScratchRemixRelationRow>> {
        let ids: Vec<&String> = program_ids.iter().collect::<BTreeSet<_>>().into_iter().collect();
        if ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let mut found = BTreeSet::new();
            for batch in ids.chunks(ID_BATCH_SIZE) {
                let sql = format!(
                    "SELECT scratch_parent_id, catrobat_child_id
                     FROM scratch_program_remix_relation
                     WHERE catrobat_child_id IN ({})",
                    placeholders(1, batch.len())
                );

                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params_from_iter(batch.iter()), |row| {
                    Ok((row.get::<_, String>(1)?, row.get::<_, i64>(0)?))
                })?;
                for row in rows {
                    found.insert(row?);
                }
            }

            Ok(found
                .into_iter()
                .map(|(child, parent)| ScratchRemixRelationRow {
                    scratch_parent_id: parent,
                    catrobat_child_id: child,
                })
                .collect())
        })
    }

    /// Delete the relations of `child_id` whose parent is in `parent_ids`.
    /// Returns the number of removed rows.
    pub fn remove_scratch_parent_relations(&self, child_id: &str, parent_ids: &[i64]) -> Result<usize> {
        let parents: Vec<i64> = parent_ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        if parents.is_empty() {
            return Ok(0);
        }

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let mut removed = 0;
            for batch in parents.chunks(ID_BATCH_SIZE) {
                let sql = format!(
                    "DELETE FROM scratch_program_remix_relation
                     WHERE catrobat_child_id = ?1 AND scratch_parent_id IN ({})",
                    placeholders(2, batch.len())
                );

                let params = std::iter::once(Value::Text(child_id.to_string()))
                    .chain(batch.iter().map(|id| Value::Integer(*id)));
                removed += tx.execute(&sql, params_from_iter(params))?;
            }
            tx.commit()?;
            Ok(removed)
        })
    }

    pub fn remove_all_scratch_relations(&self) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let removed = conn.execute("DELETE FROM scratch_program_remix_relation", [])?;
            Ok(removed)
        })
    }
}
