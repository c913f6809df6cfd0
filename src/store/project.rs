use anyhow::{Context, Result};
use rusqlite::{named_params, OptionalExtension, Row};
use std::fmt;

use super::sqlite::{constraint_violation, InsertOutcome, Store};

/// Row id of a project, used as the explicit handle through the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectId(pub i64);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Every stored field of a project except its id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectData {
    pub name: Option<String>,
    pub contract_amount: Option<f64>,
    pub start_date: Option<String>,
    pub initial_end_date: Option<String>,
    pub duration_months: Option<f64>,
    pub percent_complete: Option<i64>,
    pub contract_number: Option<String>,
    pub labor_headcount: Option<i64>,
    pub featured: Option<String>,
    pub case_number: Option<String>,
    pub stage_id: i64,
    pub work_type_id: i64,
    pub responsible_area_id: i64,
    pub district_id: i64,
    pub neighborhood_id: Option<i64>,
    pub company_id: Option<i64>,
    pub contract_type_id: Option<i64>,
    pub funding_source_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: ProjectId,
    pub data: ProjectData,
}

/// Result of writing back a modified project
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved,
    Conflict(String),
}

const PROJECT_COLUMNS: &str = "id, name, contract_amount, start_date, initial_end_date, \
     duration_months, percent_complete, contract_number, labor_headcount, featured, \
     case_number, stage_id, work_type_id, responsible_area_id, district_id, \
     neighborhood_id, company_id, contract_type_id, funding_source_id";

fn project_from_row(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: ProjectId(row.get(0)?),
        data: ProjectData {
            name: row.get(1)?,
            contract_amount: row.get(2)?,
            start_date: row.get(3)?,
            initial_end_date: row.get(4)?,
            duration_months: row.get(5)?,
            percent_complete: row.get(6)?,
            contract_number: row.get(7)?,
            labor_headcount: row.get(8)?,
            featured: row.get(9)?,
            case_number: row.get(10)?,
            stage_id: row.get(11)?,
            work_type_id: row.get(12)?,
            responsible_area_id: row.get(13)?,
            district_id: row.get(14)?,
            neighborhood_id: row.get(15)?,
            company_id: row.get(16)?,
            contract_type_id: row.get(17)?,
            funding_source_id: row.get(18)?,
        },
    })
}

impl Store {
    /// Insert a new row. Only `Inserted` or `Conflict` are returned; a repeated
    /// name is a conflict, not an existing row.
    pub fn insert_project(&self, data: &ProjectData) -> Result<InsertOutcome> {
        let result = self.conn.execute(
            "INSERT INTO project (name, contract_amount, start_date, initial_end_date, \
             duration_months, percent_complete, contract_number, labor_headcount, featured, \
             case_number, stage_id, work_type_id, responsible_area_id, district_id, \
             neighborhood_id, company_id, contract_type_id, funding_source_id) \
             VALUES (:name, :contract_amount, :start_date, :initial_end_date, \
             :duration_months, :percent_complete, :contract_number, :labor_headcount, :featured, \
             :case_number, :stage_id, :work_type_id, :responsible_area_id, :district_id, \
             :neighborhood_id, :company_id, :contract_type_id, :funding_source_id)",
            named_params! {
                ":name": data.name,
                ":contract_amount": data.contract_amount,
                ":start_date": data.start_date,
                ":initial_end_date": data.initial_end_date,
                ":duration_months": data.duration_months,
                ":percent_complete": data.percent_complete,
                ":contract_number": data.contract_number,
                ":labor_headcount": data.labor_headcount,
                ":featured": data.featured,
                ":case_number": data.case_number,
                ":stage_id": data.stage_id,
                ":work_type_id": data.work_type_id,
                ":responsible_area_id": data.responsible_area_id,
                ":district_id": data.district_id,
                ":neighborhood_id": data.neighborhood_id,
                ":company_id": data.company_id,
                ":contract_type_id": data.contract_type_id,
                ":funding_source_id": data.funding_source_id,
            },
        );

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted(self.conn.last_insert_rowid())),
            Err(e) => constraint_violation(e).map(InsertOutcome::Conflict),
        }
    }

    pub fn get_project(&self, id: ProjectId) -> Result<Option<Project>> {
        let sql = format!("SELECT {} FROM project WHERE id = ?1", PROJECT_COLUMNS);
        self.conn
            .query_row(&sql, [id.0], project_from_row)
            .optional()
            .with_context(|| format!("Failed to read project {}", id))
    }

    /// Write every field of `project` back to its row
    pub fn save_project(&self, project: &Project) -> Result<SaveOutcome> {
        let data = &project.data;
        let result = self.conn.execute(
            "UPDATE project SET name = :name, contract_amount = :contract_amount, \
             start_date = :start_date, initial_end_date = :initial_end_date, \
             duration_months = :duration_months, percent_complete = :percent_complete, \
             contract_number = :contract_number, labor_headcount = :labor_headcount, \
             featured = :featured, case_number = :case_number, stage_id = :stage_id, \
             work_type_id = :work_type_id, responsible_area_id = :responsible_area_id, \
             district_id = :district_id, neighborhood_id = :neighborhood_id, \
             company_id = :company_id, contract_type_id = :contract_type_id, \
             funding_source_id = :funding_source_id \
             WHERE id = :id",
            named_params! {
                ":id": project.id.0,
                ":name": data.name,
                ":contract_amount": data.contract_amount,
                ":start_date": data.start_date,
                ":initial_end_date": data.initial_end_date,
                ":duration_months": data.duration_months,
                ":percent_complete": data.percent_complete,
                ":contract_number": data.contract_number,
                ":labor_headcount": data.labor_headcount,
                ":featured": data.featured,
                ":case_number": data.case_number,
                ":stage_id": data.stage_id,
                ":work_type_id": data.work_type_id,
                ":responsible_area_id": data.responsible_area_id,
                ":district_id": data.district_id,
                ":neighborhood_id": data.neighborhood_id,
                ":company_id": data.company_id,
                ":contract_type_id": data.contract_type_id,
                ":funding_source_id": data.funding_source_id,
            },
        );

        match result {
            Ok(_) => Ok(SaveOutcome::Saved),
            Err(e) => constraint_violation(e).map(SaveOutcome::Conflict),
        }
    }

    /// Ids of every project currently in the given stage
    pub fn projects_in_stage(&self, stage_id: i64) -> Result<Vec<ProjectId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM project WHERE stage_id = ?1 ORDER BY id")?;
        let ids = stmt
            .query_map([stage_id], |row| row.get(0).map(ProjectId))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list projects by stage")?;
        Ok(ids)
    }
}
