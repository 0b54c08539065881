use std::path::Path;

use rusqlite::{Connection, OpenFlags, Row, params};

use crate::error::StoreError;

use super::model::Track;

/// Row order for [`TrackStore::scan_page`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScanOrder {
    Id,
}

/// Row filters for [`TrackStore::filter_page`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackFilter {
    /// `file_path_correct = false`
    Misplaced,
    /// Exact `file_path` match.
    Path(String),
}

/// The catalog as seen by the reconciliation engine.
///
/// Writes accumulate until [`commit`](TrackStore::commit); nothing else is an
/// isolation boundary.
pub trait TrackStore {
    /// First row stored under `path`, if any.
    fn find_by_path(&mut self, path: &str) -> Result<Option<Track>, StoreError>;
    /// Insert or update; assigns `track.id` on insert.
    fn upsert(&mut self, track: &mut Track) -> Result<(), StoreError>;
    fn delete(&mut self, tracks: &[Track]) -> Result<(), StoreError>;
    fn scan_page(
        &mut self,
        order: ScanOrder,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Track>, StoreError>;
    fn filter_page(
        &mut self,
        filter: &TrackFilter,
        limit: usize,
    ) -> Result<Vec<Track>, StoreError>;
    /// Distinct paths with their row counts, highest count first.
    fn group_by_path_with_count(&mut self, limit: usize) -> Result<Vec<(String, u64)>, StoreError>;
    fn count(&mut self) -> Result<u64, StoreError>;
    fn commit(&mut self) -> Result<(), StoreError>;
}

const COLUMNS: &str = "id, file_path, target_file_path, file_path_correct, modification_date, \
                       album, artist, title, track, genre, genre_description";

/// SQLite-backed catalog.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA synchronous = NORMAL;",
        )?;
        migrate(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        migrate(&conn)?;
        Ok(Self { conn })
    }

    fn begin(&self) -> Result<(), StoreError> {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN")?;
        }
        Ok(())
    }

    fn query_tracks(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Track>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, track_from_row)?;
        let mut tracks = Vec::new();
        for row in rows {
            tracks.push(row?);
        }
        Ok(tracks)
    }
}

impl Drop for SqliteStore {
    fn drop(&mut self) {
        if !self.conn.is_autocommit() {
            let _ = self.conn.execute_batch("ROLLBACK");
        }
    }
}

fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS tracks (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            file_path         TEXT NOT NULL,
            target_file_path  TEXT,
            file_path_correct INTEGER NOT NULL DEFAULT 0,
            modification_date INTEGER,
            album             TEXT,
            artist            TEXT NOT NULL,
            title             TEXT,
            track             TEXT,
            genre             INTEGER,
            genre_description TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_filepath ON tracks(file_path);
        CREATE INDEX IF NOT EXISTS idx_filepathcorrect ON tracks(file_path_correct);
        PRAGMA user_version = 1;",
    )
}

fn track_from_row(row: &Row<'_>) -> rusqlite::Result<Track> {
    Ok(Track {
        id: row.get(0)?,
        file_path: row.get(1)?,
        target_file_path: row.get(2)?,
        file_path_correct: row.get(3)?,
        modification_date: row.get(4)?,
        album: row.get(5)?,
        artist: row.get(6)?,
        title: row.get(7)?,
        track: row.get(8)?,
        genre: row.get(9)?,
        genre_description: row.get(10)?,
    })
}

impl TrackStore for SqliteStore {
    fn find_by_path(&mut self, path: &str) -> Result<Option<Track>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM tracks WHERE file_path = ?1 ORDER BY id LIMIT 1");
        Ok(self.query_tracks(&sql, params![path])?.into_iter().next())
    }

    fn upsert(&mut self, track: &mut Track) -> Result<(), StoreError> {
        self.begin()?;
        match track.id {
            Some(id) => {
                self.conn.execute(
                    "UPDATE tracks SET file_path = ?2, target_file_path = ?3, file_path_correct = ?4,
                        modification_date = ?5, album = ?6, artist = ?7, title = ?8, track = ?9,
                        genre = ?10, genre_description = ?11
                     WHERE id = ?1",
                    params![
                        id,
                        track.file_path,
                        track.target_file_path,
                        track.file_path_correct,
                        track.modification_date,
                        track.album,
                        track.artist,
                        track.title,
                        track.track,
                        track.genre,
                        track.genre_description,
                    ],
                )?;
            }
            None => {
                self.conn.execute(
                    "INSERT INTO tracks (file_path, target_file_path, file_path_correct,
                        modification_date, album, artist, title, track, genre, genre_description)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    params![
                        track.file_path,
                        track.target_file_path,
                        track.file_path_correct,
                        track.modification_date,
                        track.album,
                        track.artist,
                        track.title,
                        track.track,
                        track.genre,
                        track.genre_description,
                    ],
                )?;
                track.id = Some(self.conn.last_insert_rowid());
            }
        }
        Ok(())
    }

    fn delete(&mut self, tracks: &[Track]) -> Result<(), StoreError> {
        if tracks.is_empty() {
            return Ok(());
        }
        self.begin()?;
        let mut stmt = self.conn.prepare("DELETE FROM tracks WHERE id = ?1")?;
        for id in tracks.iter().filter_map(|t| t.id) {
            stmt.execute(params![id])?;
        }
        Ok(())
    }

    fn scan_page(
        &mut self,
        order: ScanOrder,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Track>, StoreError> {
        let order_by = match order {
            ScanOrder::Id => "id",
        };
        let sql = format!("SELECT {COLUMNS} FROM tracks ORDER BY {order_by} LIMIT ?1 OFFSET ?2");
        self.query_tracks(&sql, params![limit as i64, offset as i64])
    }

    fn filter_page(
        &mut self,
        filter: &TrackFilter,
        limit: usize,
    ) -> Result<Vec<Track>, StoreError> {
        match filter {
            TrackFilter::Misplaced => {
                let sql = format!("SELECT {COLUMNS} FROM tracks WHERE file_path_correct = 0 LIMIT ?1");
                self.query_tracks(&sql, params![limit as i64])
            }
            TrackFilter::Path(path) => {
                let sql =
                    format!("SELECT {COLUMNS} FROM tracks WHERE file_path = ?1 ORDER BY id LIMIT ?2");
                self.query_tracks(&sql, params![path, limit as i64])
            }
        }
    }

    fn group_by_path_with_count(&mut self, limit: usize) -> Result<Vec<(String, u64)>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT file_path, COUNT(*) AS amount FROM tracks
             GROUP BY file_path
             ORDER BY amount DESC, file_path
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
        })?;
        let mut groups = Vec::new();
        for row in rows {
            groups.push(row?);
        }
        Ok(groups)
    }

    fn count(&mut self) -> Result<u64, StoreError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tracks", [], |row| row.get(0))?;
        Ok(n as u64)
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(path: &str, artist: &str) -> Track {
        Track {
            artist: Some(artist.into()),
            title: Some("Title".into()),
            ..Track::new(path)
        }
    }

    #[test]
    fn open_creates_schema_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("catalog.sqlite3");
        let mut store = SqliteStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.count().unwrap(), 0);
        drop(store);
        // second open must not fail on the existing schema
        let mut store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn upsert_assigns_id_then_updates_in_place() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut t = row("/a.mp3", "A");
        store.upsert(&mut t).unwrap();
        let id = t.id.unwrap();

        t.file_path = "/b.mp3".into();
        t.file_path_correct = true;
        store.upsert(&mut t).unwrap();
        store.commit().unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.find_by_path("/a.mp3").unwrap(), None);
        let found = store.find_by_path("/b.mp3").unwrap().unwrap();
        assert_eq!(found.id, Some(id));
        assert!(found.file_path_correct);
    }

    #[test]
    fn find_by_path_returns_first_of_duplicates() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut first = row("/dup.mp3", "First");
        let mut second = row("/dup.mp3", "Second");
        store.upsert(&mut first).unwrap();
        store.upsert(&mut second).unwrap();
        let found = store.find_by_path("/dup.mp3").unwrap().unwrap();
        assert_eq!(found.artist.as_deref(), Some("First"));
    }

    #[test]
    fn group_by_path_orders_by_count_desc() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        for path in ["/x.mp3", "/y.mp3", "/y.mp3", "/z.mp3", "/z.mp3", "/z.mp3"] {
            store.upsert(&mut row(path, "A")).unwrap();
        }
        let groups = store.group_by_path_with_count(2).unwrap();
        assert_eq!(
            groups,
            vec![("/z.mp3".to_string(), 3), ("/y.mp3".to_string(), 2)]
        );
    }

    #[test]
    fn filter_and_scan_pages() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        for (i, correct) in [true, false, false, true].into_iter().enumerate() {
            let mut t = row(&format!("/{i}.mp3"), "A");
            t.file_path_correct = correct;
            store.upsert(&mut t).unwrap();
        }
        assert_eq!(store.filter_page(&TrackFilter::Misplaced, 10).unwrap().len(), 2);
        assert_eq!(store.filter_page(&TrackFilter::Misplaced, 1).unwrap().len(), 1);
        assert_eq!(
            store
                .filter_page(&TrackFilter::Path("/3.mp3".into()), 10)
                .unwrap()
                .len(),
            1
        );

        let page = store.scan_page(ScanOrder::Id, 2, 10).unwrap();
        let paths: Vec<&str> = page.iter().map(|t| t.file_path.as_str()).collect();
        assert_eq!(paths, vec!["/2.mp3", "/3.mp3"]);
    }

    #[test]
    fn delete_removes_rows_by_id() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut a = row("/a.mp3", "A");
        let mut b = row("/b.mp3", "B");
        store.upsert(&mut a).unwrap();
        store.upsert(&mut b).unwrap();
        store.delete(&[a]).unwrap();
        store.commit().unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert!(store.find_by_path("/b.mp3").unwrap().is_some());
    }

    #[test]
    fn uncommitted_writes_are_rolled_back_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.sqlite3");
        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.upsert(&mut row("/kept.mp3", "A")).unwrap();
            store.commit().unwrap();
            store.upsert(&mut row("/lost.mp3", "A")).unwrap();
        }
        let mut store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert!(store.find_by_path("/lost.mp3").unwrap().is_none());
    }
}
