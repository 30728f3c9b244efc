//! PostgreSQL terminology store
//!
//! Reads the `namaste_codes`, `icd_mappings` and (when present)
//! `encounter_records` tables. System, code, text, target and minimum
//! confidence predicates are pushed down; equivalence bands are left to the
//! engine.

use async_trait::async_trait;
use ayush_mapping::{
    EncounterStore, Error, LinkQuery, LinkRecord, LinkStore, MappingRow, Result, SearchRow, System,
    TermQuery, TermRecord, TermStore, DEFAULT_CONFIDENCE,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::config::DatabaseConfig;

type TermColumns = (String, String, Option<String>, String);
type JoinedColumns = (
    String,
    String,
    Option<String>,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<f64>,
);

pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .connect(&config.url)
        .await?;
    Ok(pool)
}

#[derive(Clone)]
pub struct PgTerminologyStore {
    pool: PgPool,
}

impl PgTerminologyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn term_record((code, display, native_term, system): TermColumns) -> TermRecord {
    TermRecord {
        code,
        display,
        native_term,
        system,
    }
}

fn split_joined(row: JoinedColumns) -> (TermRecord, Option<LinkRecord>) {
    let (code, display, native_term, system, source_code, target_code, target_title, confidence) =
        row;
    let term = term_record((code, display, native_term, system));
    let link = source_code.map(|source_code| LinkRecord {
        source_code,
        target_code,
        target_title,
        confidence,
    });
    (term, link)
}

/// `%text%` with LIKE wildcards in `text` escaped.
fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl TermStore for PgTerminologyStore {
    async fn get_term(&self, system: System, code: &str) -> Result<Option<TermRecord>> {
        let row = sqlx::query_as::<_, TermColumns>(
            "SELECT code, display, native_term, system
             FROM namaste_codes
             WHERE LOWER(system) = $1 AND code = $2
             LIMIT 1",
        )
        .bind(system.as_str())
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::store)?;

        Ok(row.map(term_record))
    }

    async fn find_terms(&self, query: &TermQuery) -> Result<Vec<SearchRow>> {
        let rows = sqlx::query_as::<_, JoinedColumns>(
            "WITH matched AS (
                 SELECT code, display, native_term, system
                 FROM namaste_codes
                 WHERE ($1::text IS NULL OR LOWER(system) = $1)
                   AND ($2::text IS NULL
                        OR code ILIKE $2
                        OR display ILIKE $2
                        OR native_term ILIKE $2)
                 ORDER BY display, code
                 LIMIT $3 OFFSET $4
             )
             SELECT m.code, m.display, m.native_term, m.system,
                    im.namc_code, im.icd_code, im.icd_title,
                    CAST(im.similarity_score AS DOUBLE PRECISION)
             FROM matched m
             LEFT JOIN icd_mappings im ON im.namc_code = m.code
             ORDER BY m.display, m.code, COALESCE(im.similarity_score, $5) DESC",
        )
        .bind(query.system.map(|s| s.as_str()))
        .bind(query.text.as_deref().map(contains_pattern))
        .bind(query.limit.map(|l| l as i64))
        .bind(query.offset as i64)
        .bind(DEFAULT_CONFIDENCE)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::store)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let (term, link) = split_joined(row);
                SearchRow { term, link }
            })
            .collect())
    }

    async fn count_terms(&self, system: Option<System>) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM namaste_codes WHERE ($1::text IS NULL OR LOWER(system) = $1)",
        )
        .bind(system.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await
        .map_err(Error::store)?;

        Ok(count.max(0) as u64)
    }

    async fn system_counts(&self) -> Result<Vec<(String, u64)>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT system, COUNT(*) FROM namaste_codes GROUP BY system")
                .fetch_all(&self.pool)
                .await
                .map_err(Error::store)?;

        Ok(rows
            .into_iter()
            .map(|(system, count)| (system, count.max(0) as u64))
            .collect())
    }

    async fn all_terms(&self) -> Result<Vec<TermRecord>> {
        let rows = sqlx::query_as::<_, TermColumns>(
            "SELECT code, display, native_term, system FROM namaste_codes",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::store)?;

        Ok(rows.into_iter().map(term_record).collect())
    }
}

#[async_trait]
impl LinkStore for PgTerminologyStore {
    async fn get_links(&self, query: &LinkQuery) -> Result<Vec<MappingRow>> {
        let rows = sqlx::query_as::<_, JoinedColumns>(
            "SELECT nc.code, nc.display, nc.native_term, nc.system,
                    im.namc_code, im.icd_code, im.icd_title,
                    CAST(im.similarity_score AS DOUBLE PRECISION)
             FROM icd_mappings im
             JOIN namaste_codes nc ON nc.code = im.namc_code
             WHERE ($1::text IS NULL OR LOWER(nc.system) = $1)
               AND ($2::text IS NULL OR nc.code = $2)
               AND (NOT $3 OR TRIM(COALESCE(im.icd_code, '')) <> '')
               AND ($4::float8 IS NULL OR COALESCE(im.similarity_score, $5) >= $4)
             ORDER BY COALESCE(im.similarity_score, $5) DESC",
        )
        .bind(query.system.map(|s| s.as_str()))
        .bind(query.code.as_deref())
        .bind(query.predicate.require_target)
        .bind(query.predicate.min_confidence)
        .bind(DEFAULT_CONFIDENCE)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::store)?;

        let mut mappings = Vec::with_capacity(rows.len());
        for row in rows {
            if let (term, Some(link)) = split_joined(row) {
                mappings.push(MappingRow { term, link });
            }
        }
        Ok(mappings)
    }

    async fn all_links(&self) -> Result<Vec<LinkRecord>> {
        let rows: Vec<(String, Option<String>, Option<String>, Option<f64>)> = sqlx::query_as(
            "SELECT namc_code, icd_code, icd_title, CAST(similarity_score AS DOUBLE PRECISION)
             FROM icd_mappings",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::store)?;

        Ok(rows
            .into_iter()
            .map(|(source_code, target_code, target_title, confidence)| LinkRecord {
                source_code,
                target_code,
                target_title,
                confidence,
            })
            .collect())
    }

    async fn count_links(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM icd_mappings")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::store)?;

        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl EncounterStore for PgTerminologyStore {
    async fn count_encounters(&self) -> Result<Option<u64>> {
        let exists: bool =
            sqlx::query_scalar("SELECT to_regclass('encounter_records') IS NOT NULL")
                .fetch_one(&self.pool)
                .await
                .map_err(Error::store)?;
        if !exists {
            tracing::warn!("encounter_records table not found, reporting 0 encounters");
            return Ok(None);
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM encounter_records")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::store)?;

        Ok(Some(count.max(0) as u64))
    }
}
