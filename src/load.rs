use anyhow::Result;
use std::collections::HashMap;

use crate::store::{InsertOutcome, ProjectData, Reference, Store};
use crate::table::columns::*;
use crate::table::{Cell, Table};

/// Counts for one reference pass
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReferenceCounts {
    pub inserted: usize,
    pub existing: usize,
    pub conflicts: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    pub references: HashMap<Reference, ReferenceCounts>,
    pub projects_inserted: usize,
    pub project_conflicts: usize,
    /// Rows skipped because a required reference could not be resolved
    pub unresolved: usize,
}

impl LoadSummary {
    pub fn reference(&self, reference: Reference) -> ReferenceCounts {
        self.references.get(&reference).copied().unwrap_or_default()
    }
}

/// District numbers arrive as integers or as whole reals
fn district_number(value: &Cell) -> Cell {
    match value.as_exact_i64() {
        Some(n) => Cell::Integer(n),
        None => value.clone(),
    }
}

/// Load a cleaned table: every reference pass first, then one project per row.
///
/// Nothing here runs inside a transaction; a failure part way leaves the
/// rows written so far in place.
pub fn load(store: &Store, table: &Table) -> Result<LoadSummary> {
    let mut summary = LoadSummary::default();

    for reference in Reference::ALL {
        let counts = load_reference(store, table, reference)?;
        log::info!(
            "{}: {} inserted, {} already present, {} rejected",
            reference.table(),
            counts.inserted,
            counts.existing,
            counts.conflicts
        );
        summary.references.insert(reference, counts);
    }

    for row in 0..table.len() {
        let Some(data) = resolve_row(store, table, row)? else {
            summary.unresolved += 1;
            continue;
        };

        match store.insert_project(&data)? {
            // Projects have no lookup step, so `Existing` never comes back here
            InsertOutcome::Inserted(_) | InsertOutcome::Existing(_) => {
                summary.projects_inserted += 1
            }
            InsertOutcome::Conflict(msg) => {
                log::warn!(
                    "Could not insert project {:?} (row {}): {}",
                    data.name.as_deref().unwrap_or("<sin nombre>"),
                    row,
                    msg
                );
                summary.project_conflicts += 1;
            }
        }
    }

    log::info!(
        "project: {} inserted, {} rejected, {} unresolved",
        summary.projects_inserted,
        summary.project_conflicts,
        summary.unresolved
    );

    Ok(summary)
}

/// Insert the distinct values of one source column as reference rows
fn load_reference(store: &Store, table: &Table, reference: Reference) -> Result<ReferenceCounts> {
    let mut counts = ReferenceCounts::default();

    for value in table.unique(reference.source_column()) {
        let outcome = match reference {
            Reference::Neighborhood => match neighborhood_district(store, table, &value)? {
                Some(district_id) => store.insert_neighborhood(&value, district_id)?,
                None => InsertOutcome::Conflict(format!("district of {} is not loaded", value)),
            },
            Reference::District => store.insert_or_get(reference, &district_number(&value))?,
            _ => store.insert_or_get(reference, &value)?,
        };

        match outcome {
            InsertOutcome::Inserted(id) => {
                log::debug!("{} {} -> id {}", reference.table(), value, id);
                counts.inserted += 1;
            }
            InsertOutcome::Existing(_) => {
                log::warn!("{} {:?} already exists, skipped", reference.table(), value.to_string());
                counts.existing += 1;
            }
            InsertOutcome::Conflict(msg) => {
                log::warn!("Could not insert {} into {}: {}", value, reference.table(), msg);
                counts.conflicts += 1;
            }
        }
    }

    Ok(counts)
}

/// District id of the first row naming this neighborhood.
/// Assumes a neighborhood name always maps to the same district.
fn neighborhood_district(store: &Store, table: &Table, name: &Cell) -> Result<Option<i64>> {
    let Some(row) = table.first_row_where(NEIGHBORHOOD, name) else {
        return Ok(None);
    };
    let district = district_number(table.get(row, DISTRICT));
    store.lookup(Reference::District, &district)
}

/// Resolve the foreign keys of one row. `None` when a required one is missing.
fn resolve_row(store: &Store, table: &Table, row: usize) -> Result<Option<ProjectData>> {
    let mut ids: HashMap<Reference, Option<i64>> = HashMap::new();

    for reference in Reference::ALL {
        let mut value = table.get(row, reference.source_column()).clone();
        if reference == Reference::District {
            value = district_number(&value);
        }
        let id = store.lookup(reference, &value)?;

        if id.is_none() && (reference.required() || !value.is_null()) {
            log::warn!(
                "Row {}: no {} matches {}, project skipped",
                row,
                reference.table(),
                value
            );
            return Ok(None);
        }
        ids.insert(reference, id);
    }

    let id = |r: Reference| ids.get(&r).copied().flatten();
    let cell = |c: &'static str| table.get(row, c);

    // Required ids were checked above
    Ok(Some(ProjectData {
        name: cell(NAME).as_text(),
        contract_amount: cell(CONTRACT_AMOUNT).as_f64(),
        start_date: cell(START_DATE).as_text(),
        initial_end_date: cell(INITIAL_END_DATE).as_text(),
        duration_months: cell(DURATION_MONTHS).as_f64(),
        percent_complete: cell(PERCENT_COMPLETE).as_i64(),
        contract_number: cell(CONTRACT_NUMBER).as_text(),
        labor_headcount: cell(LABOR_HEADCOUNT).as_i64(),
        featured: cell(FEATURED).as_text(),
        case_number: cell(CASE_NUMBER).as_text(),
        stage_id: id(Reference::Stage).unwrap_or_default(),
        work_type_id: id(Reference::WorkType).unwrap_or_default(),
        responsible_area_id: id(Reference::ResponsibleArea).unwrap_or_default(),
        district_id: id(Reference::District).unwrap_or_default(),
        neighborhood_id: id(Reference::Neighborhood),
        company_id: id(Reference::Company),
        contract_type_id: id(Reference::ContractType),
        funding_source_id: id(Reference::FundingSource),
    }))
}
