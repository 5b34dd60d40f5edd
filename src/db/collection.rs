//! Collection table operations
//!
//! Append-only writes plus the duplicate check used by the confirmation
//! workflow, and the read queries backing the collection API. List
//! fields (labels, formats, tracklist, ...) are stored as joined strings,
//! matching the spreadsheet-era row layout.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::models::ReleaseDetail;
use crate::types::{CollectionStore, StoreError};

/// One persisted collection row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CdRecord {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub year: Option<i64>,
    pub genre: Option<String>,
    pub style: Option<String>,
    pub tracklist: Option<String>,
    pub labels: Option<String>,
    pub formats: Option<String>,
    pub images: Option<String>,
    pub discogs_id: Option<String>,
}

/// SQLite-backed collection store.
pub struct SqliteCollection {
    pool: SqlitePool,
}

impl SqliteCollection {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn join_or_none(values: &[String], separator: &str) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        Some(values.join(separator))
    }
}

#[async_trait::async_trait]
impl CollectionStore for SqliteCollection {
    /// Duplicate policy: catalogue id first, then case-insensitive exact
    /// match on the (title, artist) pair.
    async fn is_duplicate(&self, detail: &ReleaseDetail) -> Result<bool, StoreError> {
        let by_id: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM cds WHERE discogs_id = ?1 LIMIT 1")
                .bind(detail.discogs_id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        if by_id.is_some() {
            return Ok(true);
        }

        let by_pair: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM cds WHERE lower(title) = lower(?1) AND lower(artist) = lower(?2) LIMIT 1",
        )
        .bind(&detail.title)
        .bind(&detail.artist)
        .fetch_optional(&self.pool)
        .await?;

        Ok(by_pair.is_some())
    }

    async fn append(&self, detail: &ReleaseDetail) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO cds (title, artist, year, genre, style, tracklist, labels, formats, images, discogs_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&detail.title)
        .bind(&detail.artist)
        .bind(detail.year.map(i64::from))
        .bind(join_or_none(&detail.genres, ", "))
        .bind(join_or_none(&detail.styles, ", "))
        .bind(join_or_none(&detail.tracklist, " | "))
        .bind(join_or_none(&detail.labels, "; "))
        .bind(join_or_none(&detail.formats, "; "))
        .bind(join_or_none(&detail.images, "; "))
        .bind(detail.discogs_id.to_string())
        .execute(&self.pool)
        .await?;

        tracing::info!(
            discogs_id = detail.discogs_id,
            title = %detail.title,
            artist = %detail.artist,
            "Appended release to collection"
        );

        Ok(())
    }
}

/// All CDs in the collection.
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<CdRecord>, StoreError> {
    let records = sqlx::query_as::<_, CdRecord>("SELECT * FROM cds ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(records)
}

/// One CD by its row id.
pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<CdRecord>, StoreError> {
    let record = sqlx::query_as::<_, CdRecord>("SELECT * FROM cds WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(record)
}

/// CDs whose title contains `title` (case-insensitive).
pub async fn search_by_title(pool: &SqlitePool, title: &str) -> Result<Vec<CdRecord>, StoreError> {
    let pattern = format!("%{}%", title);
    let records =
        sqlx::query_as::<_, CdRecord>("SELECT * FROM cds WHERE title LIKE ?1 ORDER BY id")
            .bind(pattern)
            .fetch_all(pool)
            .await?;
    Ok(records)
}

/// CDs whose artist contains `artist` (case-insensitive).
pub async fn search_by_artist(
    pool: &SqlitePool,
    artist: &str,
) -> Result<Vec<CdRecord>, StoreError> {
    let pattern = format!("%{}%", artist);
    let records =
        sqlx::query_as::<_, CdRecord>("SELECT * FROM cds WHERE artist LIKE ?1 ORDER BY id")
            .bind(pattern)
            .fetch_all(pool)
            .await?;
    Ok(records)
}
