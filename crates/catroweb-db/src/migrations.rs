use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (users, programs, remix relations, likes)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id            TEXT PRIMARY KEY,
                username      TEXT NOT NULL UNIQUE COLLATE NOCASE,
                email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
                password      TEXT NOT NULL,
                enabled       INTEGER NOT NULL DEFAULT 1,
                super_admin   INTEGER NOT NULL DEFAULT 0,
                upload_token  TEXT NOT NULL,
                created_at    TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE programs (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name        TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE scratch_program_remix_relation (
                scratch_parent_id  INTEGER NOT NULL,
                catrobat_child_id  TEXT NOT NULL REFERENCES programs(id) ON DELETE CASCADE,
                PRIMARY KEY (scratch_parent_id, catrobat_child_id)
            );

            CREATE INDEX idx_scratch_remix_child
                ON scratch_program_remix_relation(catrobat_child_id);

            CREATE TABLE program_like (
                program_id  TEXT NOT NULL REFERENCES programs(id) ON DELETE CASCADE,
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                type        INTEGER NOT NULL CHECK (type IN (1, 2, 3, 4)),
                created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
                PRIMARY KEY (program_id, user_id, type)
            );

            CREATE TRIGGER program_like_created_at_immutable
                BEFORE UPDATE OF created_at ON program_like
                WHEN NEW.created_at IS NOT OLD.created_at
            BEGIN
                SELECT RAISE(ABORT, 'program_like.created_at is immutable');
            END;

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    if version < 2 {
        info!("Running migration v2 (media library)");
        conn.execute_batch(
            "
            CREATE TABLE media_package (
                id        INTEGER PRIMARY KEY,
                name      TEXT NOT NULL,
                name_url  TEXT NOT NULL UNIQUE
            );

            CREATE TABLE media_package_category (
                id          INTEGER PRIMARY KEY,
                name        TEXT NOT NULL,
                package_id  INTEGER NOT NULL REFERENCES media_package(id) ON DELETE CASCADE,
                priority    INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE media_package_file (
                id           INTEGER PRIMARY KEY,
                name         TEXT NOT NULL,
                category_id  INTEGER NOT NULL REFERENCES media_package_category(id) ON DELETE CASCADE,
                extension    TEXT NOT NULL,
                author       TEXT NOT NULL DEFAULT '',
                flavors      TEXT NOT NULL DEFAULT '',
                active       INTEGER NOT NULL DEFAULT 1,
                downloads    INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX idx_media_file_category
                ON media_package_file(category_id);

            INSERT INTO schema_version (version) VALUES (2);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, 2);
    }
}
