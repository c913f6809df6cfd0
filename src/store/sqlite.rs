use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;

use super::schema_gen::{generate_create_table, generate_indexes};
use crate::schema::{tables, DependencyResolver, TableSchema};
use crate::table::columns;
use crate::table::Cell;

/// The lookup entities a project points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reference {
    Stage,
    WorkType,
    ResponsibleArea,
    District,
    Neighborhood,
    Company,
    ContractType,
    FundingSource,
}

impl Reference {
    /// Load order: a neighborhood needs its district first
    pub const ALL: [Reference; 8] = [
        Reference::Stage,
        Reference::WorkType,
        Reference::ResponsibleArea,
        Reference::District,
        Reference::Neighborhood,
        Reference::Company,
        Reference::ContractType,
        Reference::FundingSource,
    ];

    pub fn schema(self) -> &'static TableSchema {
        match self {
            Reference::Stage => &tables::STAGE,
            Reference::WorkType => &tables::WORK_TYPE,
            Reference::ResponsibleArea => &tables::RESPONSIBLE_AREA,
            Reference::District => &tables::DISTRICT,
            Reference::Neighborhood => &tables::NEIGHBORHOOD,
            Reference::Company => &tables::COMPANY,
            Reference::ContractType => &tables::CONTRACT_TYPE,
            Reference::FundingSource => &tables::FUNDING_SOURCE,
        }
    }

    pub fn table(self) -> &'static str {
        self.schema().name
    }

    /// The distinguishing (unique) column
    pub fn field(self) -> &'static str {
        match self {
            Reference::District => "number",
            _ => "name",
        }
    }

    /// Cleaned-table column the distinct values come from
    pub fn source_column(self) -> &'static str {
        match self {
            Reference::Stage => columns::STAGE,
            Reference::WorkType => columns::WORK_TYPE,
            Reference::ResponsibleArea => columns::RESPONSIBLE_AREA,
            Reference::District => columns::DISTRICT,
            Reference::Neighborhood => columns::NEIGHBORHOOD,
            Reference::Company => columns::TENDER_COMPANY,
            Reference::ContractType => columns::CONTRACT_TYPE,
            Reference::FundingSource => columns::FUNDING_SOURCE,
        }
    }

    /// Project column holding the foreign key
    pub fn project_column(self) -> &'static str {
        match self {
            Reference::Stage => "stage_id",
            Reference::WorkType => "work_type_id",
            Reference::ResponsibleArea => "responsible_area_id",
            Reference::District => "district_id",
            Reference::Neighborhood => "neighborhood_id",
            Reference::Company => "company_id",
            Reference::ContractType => "contract_type_id",
            Reference::FundingSource => "funding_source_id",
        }
    }

    /// Whether every project must point at one
    pub fn required(self) -> bool {
        matches!(
            self,
            Reference::Stage | Reference::WorkType | Reference::ResponsibleArea | Reference::District
        )
    }
}

/// Result of an insert that may collide with an existing row
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(i64),
    /// An equal row was already stored
    Existing(i64),
    /// The database refused the row (unique, NOT NULL or FK constraint)
    Conflict(String),
}

impl InsertOutcome {
    pub fn id(&self) -> Option<i64> {
        match self {
            InsertOutcome::Inserted(id) | InsertOutcome::Existing(id) => Some(*id),
            InsertOutcome::Conflict(_) => None,
        }
    }
}

/// Extract the message of a constraint violation, pass other errors through
pub(crate) fn constraint_violation(err: rusqlite::Error) -> Result<String> {
    match &err {
        rusqlite::Error::SqliteFailure(e, msg) if e.code == ErrorCode::ConstraintViolation => {
            Ok(msg.clone().unwrap_or_else(|| e.to_string()))
        }
        _ => Err(err.into()),
    }
}

/// Single connection to the works database
pub struct Store {
    pub(crate) conn: Connection,
}

impl Store {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;
        let store = Self::configure(conn)?;
        log::info!("Connected to {}", db_path.display());
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::configure(conn)
    }

    fn configure(conn: Connection) -> Result<Self> {
        // journal_mode returns a row, so it cannot go through execute_batch
        let mode: String = conn
            .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
            .context("Failed to enable WAL journal")?;
        log::debug!("journal_mode = {}", mode);

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;

        Ok(Self { conn })
    }

    /// Close the connection, reporting any error from SQLite
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| anyhow!(e))
            .context("Failed to close database")
    }

    /// Create every table that does not exist yet, parents first
    pub fn init_schema(&self) -> Result<()> {
        let schemas = DependencyResolver::new()
            .all_tables_ordered()
            .map_err(|e| anyhow!(e))?;

        for schema in &schemas {
            let sql = generate_create_table(schema);
            self.conn
                .execute(&sql, [])
                .with_context(|| format!("Failed to create table: {}", schema.name))?;

            for index_sql in generate_indexes(schema) {
                self.conn
                    .execute(&index_sql, [])
                    .with_context(|| format!("Failed to create index for: {}", schema.name))?;
            }
        }

        log::info!("Schema ready ({} tables)", schemas.len());
        Ok(())
    }

    /// Exact-match lookup on the distinguishing field.
    /// `IS` is used so a missing value finds a stored NULL.
    pub fn lookup(&self, reference: Reference, value: &Cell) -> Result<Option<i64>> {
        let sql = format!(
            "SELECT id FROM {} WHERE {} IS ?1",
            reference.table(),
            reference.field()
        );
        self.conn
            .query_row(&sql, [value], |row| row.get(0))
            .optional()
            .with_context(|| format!("Failed to look up {} in {}", value, reference.table()))
    }

    /// Insert a reference value unless an equal one exists.
    /// Not valid for neighborhoods, which also need a district.
    pub fn insert_or_get(&self, reference: Reference, value: &Cell) -> Result<InsertOutcome> {
        if reference == Reference::Neighborhood {
            return Err(anyhow!("neighborhoods are inserted with insert_neighborhood"));
        }
        if let Some(id) = self.lookup(reference, value)? {
            return Ok(InsertOutcome::Existing(id));
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES (?1)",
            reference.table(),
            reference.field()
        );
        match self.conn.execute(&sql, [value]) {
            Ok(_) => Ok(InsertOutcome::Inserted(self.conn.last_insert_rowid())),
            Err(e) => constraint_violation(e).map(InsertOutcome::Conflict),
        }
    }

    pub fn insert_neighborhood(&self, name: &Cell, district_id: i64) -> Result<InsertOutcome> {
        if let Some(id) = self.lookup(Reference::Neighborhood, name)? {
            return Ok(InsertOutcome::Existing(id));
        }

        match self.conn.execute(
            "INSERT INTO neighborhood (name, district_id) VALUES (?1, ?2)",
            params![name, district_id],
        ) {
            Ok(_) => Ok(InsertOutcome::Inserted(self.conn.last_insert_rowid())),
            Err(e) => constraint_violation(e).map(InsertOutcome::Conflict),
        }
    }

    /// Values of a reference table's distinguishing field, in id order
    pub fn reference_values(&self, reference: Reference) -> Result<Vec<Cell>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY id",
            reference.field(),
            reference.table()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            let value: rusqlite::types::Value = row.get(0)?;
            Ok(match value {
                rusqlite::types::Value::Integer(i) => Cell::Integer(i),
                rusqlite::types::Value::Real(f) => Cell::Real(f),
                rusqlite::types::Value::Text(s) => Cell::Text(s),
                _ => Cell::Null,
            })
        })?;
        let values = rows
            .collect::<rusqlite::Result<Vec<Cell>>>()
            .with_context(|| format!("Failed to read {}", reference.table()))?;
        Ok(values)
    }

    pub fn count(&self, table: &str) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let count: i64 = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .with_context(|| format!("Failed to count rows of {}", table))?;
        Ok(count as u64)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
