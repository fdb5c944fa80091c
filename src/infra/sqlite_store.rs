use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params, params_from_iter, Connection, Row};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::app::ports::{PostingSourcePort, RelatedPostingsPort, ResultSinkPort};
use crate::config::{is_identifier, TableConfig};
use crate::constants::{ANALYSIS_DATE_COLUMN, RELATED_JOBS_COLUMN};
use crate::domain::{
    ColumnKind, FieldValue, PostingField, PostingQuery, PostingSummary, RankedResult, RawPosting, RelatedQuery,
    ResultTable,
};
use crate::error::{AnalyticsError, Result};
use crate::observability::metrics;
use crate::pipeline::processing::related::select_related;

/// Which posting table an import writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingTable {
    /// Every posting ever seen
    Complete,
    /// Currently open postings, used for related lookups
    Latest,
}

/// One exported result table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedTable {
    pub table: &'static str,
    pub rows: usize,
    pub path: PathBuf,
}

/// SQLite-backed posting source, related lookup, and result sink.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    tables: TableConfig,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P, tables: TableConfig) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init(conn, tables)
    }

    pub fn open_in_memory(tables: TableConfig) -> Result<Self> {
        Self::init(Connection::open_in_memory()?, tables)
    }

    fn init(conn: Connection, tables: TableConfig) -> Result<Self> {
        for name in [&tables.complete, &tables.latest] {
            if !is_identifier(name) {
                return Err(AnalyticsError::Config(format!("invalid table name '{}'", name)));
            }
            conn.execute_batch(&posting_table_sql(name))?;
        }
        debug!("Posting tables ready: {}, {}", tables.complete, tables.latest);
        Ok(Self {
            conn: Mutex::new(conn),
            tables,
        })
    }

    fn table_name(&self, which: PostingTable) -> &str {
        match which {
            PostingTable::Complete => &self.tables.complete,
            PostingTable::Latest => &self.tables.latest,
        }
    }

    /// Append postings to a posting table in one transaction.
    pub async fn import(&self, postings: &[RawPosting], which: PostingTable) -> Result<usize> {
        let table = self.table_name(which).to_string();
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        {
            let columns = posting_columns();
            let placeholders = vec!["?"; PostingField::ALL.len()].join(", ");
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table, columns, placeholders
            ))?;
            for posting in postings {
                stmt.execute(params_from_iter(PostingField::ALL.iter().map(|f| posting.get(*f))))?;
            }
        }
        tx.commit()?;

        metrics::import::postings_imported(&table, postings.len());
        info!("Imported {} postings into {}", postings.len(), table);
        Ok(postings.len())
    }

    pub async fn count(&self, which: PostingTable) -> Result<usize> {
        let table = self.table_name(which);
        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Row count of a result table, or `None` if it was never written.
    pub async fn result_count(&self, table: &ResultTable) -> Result<Option<usize>> {
        let conn = self.conn.lock().await;
        if !table_exists(&conn, table.table)? {
            return Ok(None);
        }
        let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table.table), [], |row| row.get(0))?;
        Ok(Some(count as usize))
    }

    /// Stored rows of a result table as JSON objects, or `None` if it was
    /// never written. List columns and `related_jobs` come back as arrays.
    pub async fn export_table(&self, table: &ResultTable) -> Result<Option<Vec<Value>>> {
        let conn = self.conn.lock().await;
        if !table_exists(&conn, table.table)? {
            return Ok(None);
        }

        let mut kinds: Vec<(&str, ColumnKind)> = table.columns.iter().map(|c| (c.name, c.kind)).collect();
        kinds.push((RELATED_JOBS_COLUMN, ColumnKind::Json));
        kinds.push((ANALYSIS_DATE_COLUMN, ColumnKind::Text));

        let names: Vec<&str> = kinds.iter().map(|(name, _)| *name).collect();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} ORDER BY id",
            names.join(", "),
            table.table
        ))?;
        let mut rows = stmt.query([])?;
        let mut exported = Vec::new();
        while let Some(row) = rows.next()? {
            let mut object = Map::new();
            for (i, (name, kind)) in kinds.iter().enumerate() {
                object.insert((*name).to_string(), json_cell(row.get_ref(i)?, *kind));
            }
            exported.push(Value::Object(object));
        }
        Ok(Some(exported))
    }

    /// Write `<dir>/<table>.json` for every stored table among `tables`.
    pub async fn export_to_dir<'a, I>(&self, tables: I, dir: &Path) -> Result<Vec<ExportedTable>>
    where
        I: IntoIterator<Item = &'a ResultTable>,
    {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::new();
        for table in tables {
            let Some(rows) = self.export_table(table).await? else {
                debug!("Skipping {}: no stored results", table.table);
                continue;
            };
            let path = dir.join(format!("{}.json", table.table));
            std::fs::write(&path, serde_json::to_string_pretty(&rows)?)?;
            written.push(ExportedTable {
                table: table.table,
                rows: rows.len(),
                path,
            });
        }
        Ok(written)
    }
}

#[async_trait]
impl PostingSourcePort for SqliteStore {
    async fn fetch(&self, query: &PostingQuery) -> Result<Vec<RawPosting>> {
        let filter = query
            .sql_where()
            .map(|clause| format!(" WHERE {}", clause))
            .unwrap_or_default();
        let sql = format!(
            "SELECT {} FROM {}{} ORDER BY id",
            posting_columns(),
            self.tables.complete,
            filter
        );

        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut postings = Vec::new();
        while let Some(row) = rows.next()? {
            let posting = posting_from_row(row)?;
            // SQL only narrows; date windows and numeric parsing are decided here
            if query.matches(&posting) {
                postings.push(posting);
            }
        }
        debug!("Fetched {} postings from {}", postings.len(), self.tables.complete);
        Ok(postings)
    }
}

#[async_trait]
impl RelatedPostingsPort for SqliteStore {
    async fn find_related(&self, query: &RelatedQuery, limit: usize) -> Result<Vec<PostingSummary>> {
        let (clause, args) = query.sql_where();
        let filter = clause.map(|c| format!(" WHERE {}", c)).unwrap_or_default();
        let sql = format!(
            "SELECT {} FROM {}{} ORDER BY id",
            posting_columns(),
            self.tables.latest,
            filter
        );

        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(args.iter()))?;
        let mut candidates = Vec::new();
        while let Some(row) = rows.next()? {
            candidates.push(posting_from_row(row)?);
        }
        Ok(select_related(&candidates, query, limit))
    }
}

#[async_trait]
impl ResultSinkPort for SqliteStore {
    async fn replace_all(&self, table: &ResultTable, rows: &[RankedResult]) -> Result<usize> {
        if !is_identifier(table.table) {
            return Err(AnalyticsError::Config(format!("invalid table name '{}'", table.table)));
        }
        let analysis_date = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        tx.execute_batch(&result_table_sql(table))?;
        {
            let mut names: Vec<&str> = table.columns.iter().map(|c| c.name).collect();
            names.push(RELATED_JOBS_COLUMN);
            names.push(ANALYSIS_DATE_COLUMN);
            let placeholders = vec!["?"; names.len()].join(", ");
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table.table,
                names.join(", "),
                placeholders
            ))?;

            for row in rows {
                let mut values = table
                    .columns
                    .iter()
                    .map(|c| sql_value(row.get(c.name)))
                    .collect::<Result<Vec<_>>>()?;
                values.push(SqlValue::Text(row.related_jobs_json()?));
                values.push(SqlValue::Text(analysis_date.clone()));
                stmt.execute(params_from_iter(values.iter()))?;
            }
        }
        tx.commit()?;

        debug!("Replaced {} with {} rows", table.table, rows.len());
        Ok(rows.len())
    }
}

fn posting_columns() -> String {
    PostingField::ALL
        .iter()
        .map(|f| f.column())
        .collect::<Vec<_>>()
        .join(", ")
}

fn posting_table_sql(table: &str) -> String {
    let columns: Vec<String> = PostingField::ALL
        .iter()
        .map(|f| format!("{} TEXT", f.column()))
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    id INTEGER PRIMARY KEY AUTOINCREMENT,\n    {}\n);",
        table,
        columns.join(",\n    ")
    )
}

/// Drop and recreate so the stored shape always follows the column list.
fn result_table_sql(table: &ResultTable) -> String {
    let mut columns: Vec<String> = table
        .columns
        .iter()
        .map(|c| format!("{} {}", c.name, c.kind.sql_type()))
        .collect();
    columns.push(format!("{} TEXT", RELATED_JOBS_COLUMN));
    columns.push(format!("{} TEXT", ANALYSIS_DATE_COLUMN));
    format!(
        "DROP TABLE IF EXISTS {0};\nCREATE TABLE {0} (\n    id INTEGER PRIMARY KEY AUTOINCREMENT,\n    {1}\n);",
        table.table,
        columns.join(",\n    ")
    )
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
    let mut rows = stmt.query(params![table])?;
    Ok(rows.next()?.is_some())
}

fn posting_from_row(row: &Row<'_>) -> Result<RawPosting> {
    let mut posting = RawPosting::default();
    for (i, field) in PostingField::ALL.iter().enumerate() {
        posting.set(*field, text_cell(row.get_ref(i)?));
    }
    Ok(posting)
}

/// Posting columns are TEXT, but rows written by other tools may carry
/// numbers; keep their textual form.
fn text_cell(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
    }
}

fn json_cell(value: ValueRef<'_>, kind: ColumnKind) -> Value {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes).into_owned();
            if kind == ColumnKind::Json {
                serde_json::from_str(&text).unwrap_or(Value::String(text))
            } else {
                Value::String(text)
            }
        }
    }
}

fn sql_value(value: Option<&FieldValue>) -> Result<SqlValue> {
    Ok(match value {
        Some(FieldValue::Int(v)) => SqlValue::Integer(*v),
        Some(FieldValue::Float(v)) => SqlValue::Real(*v),
        Some(FieldValue::Text(v)) => SqlValue::Text(v.clone()),
        Some(FieldValue::List(v)) => SqlValue::Text(serde_json::to_string(v)?),
        Some(FieldValue::Null) | None => SqlValue::Null,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Column, Condition, RelatedFilter};

    static DEMO: ResultTable = ResultTable {
        analysis: "demo",
        table: "analysis_demo",
        columns: &[Column::text("job_title"), Column::int("job_count"), Column::json("skills")],
    };

    fn posting(title: &str, company: &str, salary: Option<&str>) -> RawPosting {
        RawPosting {
            title: Some(title.to_string()),
            company: Some(company.to_string()),
            salary: salary.map(str::to_string),
            ..Default::default()
        }
    }

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory(TableConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn imported_postings_come_back_in_order() {
        let store = store();
        let postings = vec![
            posting("Developer", "Acme", Some("10 LPA")),
            posting("Analyst", "Globex", None),
        ];
        assert_eq!(store.import(&postings, PostingTable::Complete).await.unwrap(), 2);
        assert_eq!(store.count(PostingTable::Complete).await.unwrap(), 2);
        assert_eq!(store.count(PostingTable::Latest).await.unwrap(), 0);

        let fetched = store.fetch(&PostingQuery::all()).await.unwrap();
        assert_eq!(fetched, postings);

        let salaried = store
            .fetch(&PostingQuery::all().require(Condition::NonEmpty(PostingField::Salary)))
            .await
            .unwrap();
        assert_eq!(salaried.len(), 1);
        assert_eq!(salaried[0].title.as_deref(), Some("Developer"));
    }

    #[tokio::test]
    async fn related_lookup_reads_latest_table() {
        let store = store();
        store
            .import(&[posting("Old Developer", "Acme", None)], PostingTable::Complete)
            .await
            .unwrap();
        store
            .import(
                &[posting("Rust Developer", "Acme", None), posting("Designer", "Acme", None)],
                PostingTable::Latest,
            )
            .await
            .unwrap();

        let query = RelatedQuery::new(RelatedFilter::TitleContains("developer".to_string()));
        let related = store.find_related(&query, 5).await.unwrap();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].title.as_deref(), Some("Rust Developer"));
    }

    #[tokio::test]
    async fn replace_all_overwrites_and_exports() {
        let store = store();
        assert_eq!(store.result_count(&DEMO).await.unwrap(), None);

        let row = RankedResult::new(RelatedQuery::any())
            .with("job_title", "Developer")
            .with("job_count", 4usize)
            .with("skills", vec!["Rust".to_string(), "SQL".to_string()]);
        store.replace_all(&DEMO, &[row.clone(), row.clone()]).await.unwrap();
        store.replace_all(&DEMO, &[row]).await.unwrap();
        assert_eq!(store.result_count(&DEMO).await.unwrap(), Some(1));

        let exported = store.export_table(&DEMO).await.unwrap().unwrap();
        assert_eq!(exported.len(), 1);
        assert_eq!(exported[0]["job_title"], "Developer");
        assert_eq!(exported[0]["job_count"], 4);
        assert_eq!(exported[0]["skills"], serde_json::json!(["Rust", "SQL"]));
        assert_eq!(exported[0][RELATED_JOBS_COLUMN], serde_json::json!([]));
        assert!(exported[0][ANALYSIS_DATE_COLUMN].as_str().is_some());
    }

    #[test]
    fn rejects_unsafe_table_names() {
        let tables = TableConfig {
            complete: "jobs; DROP TABLE x".to_string(),
            latest: "jobs_latest".to_string(),
        };
        assert!(matches!(
            SqliteStore::open_in_memory(tables),
            Err(AnalyticsError::Config(_))
        ));
    }
}
