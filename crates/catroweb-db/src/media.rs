use std::collections::BTreeSet;

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, params_from_iter};

use crate::models::{MediaCategoryRow, MediaFileRow, MediaPackageRow};
use crate::{Database, ID_BATCH_SIZE, placeholders};

const FILE_SELECT: &str = "
    SELECT f.id, f.name, f.category_id, c.name, p.name, f.extension, f.author,
           f.flavors, f.active, f.downloads, c.priority
    FROM media_package_file f
    JOIN media_package_category c ON c.id = f.category_id
    JOIN media_package p ON p.id = c.package_id";

const FILE_ORDER: &str = "ORDER BY c.priority DESC, f.id";

pub struct NewMediaFile<'a> {
    pub name: &'a str,
    pub category_id: i64,
    pub extension: &'a str,
    pub author: &'a str,
    pub flavors: &'a str,
    pub active: bool,
}

impl Database {
    // -- Packages --

    pub fn insert_media_package(&self, name: &str, name_url: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO media_package (name, name_url) VALUES (?1, ?2)",
                (name, name_url),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Exact, case-sensitive match on the display name.
    pub fn get_media_package_by_name(&self, name: &str) -> Result<Option<MediaPackageRow>> {
        self.with_conn(|conn| query_package(conn, "name", name))
    }

    /// Exact match on the URL slug.
    pub fn get_media_package_by_name_url(&self, name_url: &str) -> Result<Option<MediaPackageRow>> {
        self.with_conn(|conn| query_package(conn, "name_url", name_url))
    }

    // -- Categories --

    pub fn insert_media_category(&self, name: &str, package_id: i64, priority: i64) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO media_package_category (name, package_id, priority) VALUES (?1, ?2, ?3)",
                rusqlite::params![name, package_id, priority],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Categories of one package, or of every package when `package_id` is `None`.
    pub fn get_media_categories(&self, package_id: Option<i64>) -> Result<Vec<MediaCategoryRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, package_id, priority FROM media_package_category
                 WHERE ?1 IS NULL OR package_id = ?1
                 ORDER BY priority DESC, id",
            )?;
            let rows = stmt
                .query_map([package_id], |row| {
                    Ok(MediaCategoryRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        package_id: row.get(2)?,
                        priority: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Files --

    pub fn insert_media_file(&self, file: &NewMediaFile<'_>) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO media_package_file (name, category_id, extension, author, flavors, active)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    file.name,
                    file.category_id,
                    file.extension,
                    file.author,
                    file.flavors,
                    file.active
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Active files across the whole library.
    pub fn get_all_media_files(&self) -> Result<Vec<MediaFileRow>> {
        self.with_conn(|conn| {
            let sql = format!("{} WHERE f.active = 1 {}", FILE_SELECT, FILE_ORDER);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], map_file)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Active files in any of the given categories, highest category
    /// priority first.
    pub fn get_media_files_of_categories(&self, category_ids: &[i64]) -> Result<Vec<MediaFileRow>> {
        let ids: Vec<i64> = category_ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        if ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let mut files = Vec::new();
            for batch in ids.chunks(ID_BATCH_SIZE) {
                let sql = format!(
                    "{} WHERE f.active = 1 AND f.category_id IN ({})",
                    FILE_SELECT,
                    placeholders(1, batch.len())
                );
                let mut stmt = conn.prepare(&sql)?;
                for row in stmt.query_map(params_from_iter(batch.iter()), map_file)? {
                    files.push(row?);
                }
            }

            // Same order as FILE_ORDER, across batches
            files.sort_by(|a, b| {
                b.category_priority
                    .cmp(&a.category_priority)
                    .then(a.id.cmp(&b.id))
            });
            Ok(files)
        })
    }

    /// A single active file.
    pub fn get_media_file(&self, id: i64) -> Result<Option<MediaFileRow>> {
        self.with_conn(|conn| {
            let sql = format!("{} WHERE f.active = 1 AND f.id = ?1", FILE_SELECT);
            let row = conn.query_row(&sql, [id], map_file).optional()?;
            Ok(row)
        })
    }

    pub fn increment_media_file_downloads(&self, id: i64) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE media_package_file SET downloads = downloads + 1 WHERE id = ?1",
                [id],
            )?;
            Ok(())
        })
    }
}

fn query_package(conn: &Connection, column: &str, value: &str) -> Result<Option<MediaPackageRow>> {
    let sql = format!("SELECT id, name, name_url FROM media_package WHERE {} = ?1", column);
    let row = conn
        .query_row(&sql, [value], |row| {
            Ok(MediaPackageRow {
                id: row.get(0)?,
                name: row.get(1)?,
                name_url: row.get(2)?,
            })
        })
        .optional()?;
    Ok(row)
}

fn map_file(row: &Row<'_>) -> rusqlite::Result<MediaFileRow> {
    Ok(MediaFileRow {
        id: row.get(0)?,
        name: row.get(1)?,
        category_id: row.get(2)?,
        category_name: row.get(3)?,
        package_name: row.get(4)?,
        extension: row.get(5)?,
        author: row.get(6)?,
        flavors: row.get(7)?,
        active: row.get(8)?,
        downloads: row.get(9)?,
        category_priority: row.get(10)?,
    })
}
