use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::io::{self, Write};

use crate::lifecycle::STAGE_FINISHED;
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageCount {
    pub stage: String,
    pub projects: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkTypeTotal {
    pub work_type: String,
    pub projects: i64,
    pub contract_amount: Option<f64>,
}

/// The fixed indicator batch, in print order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicators {
    pub areas: Vec<String>,
    pub work_types: Vec<String>,
    pub projects_per_stage: Vec<StageCount>,
    pub totals_per_work_type: Vec<WorkTypeTotal>,
    /// Neighborhoods of districts 1 to 3
    pub neighborhoods_first_districts: Vec<String>,
    pub finished_in_district_1: i64,
    pub finished_in_district_1_amount: Option<f64>,
    pub within_24_months: i64,
    /// `None` when there are no projects at all
    pub finished_percentage: Option<f64>,
    pub total_labor: Option<i64>,
    pub total_contract_amount: Option<f64>,
}

fn strings(conn: &Connection, sql: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let values = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()
        .with_context(|| format!("Report query failed: {}", sql))?;
    Ok(values)
}

impl Indicators {
    pub fn collect(store: &Store) -> Result<Self> {
        let conn = store.connection();

        let areas = strings(conn, "SELECT name FROM responsible_area ORDER BY id")?;
        let work_types = strings(conn, "SELECT name FROM work_type ORDER BY id")?;

        let mut stmt = conn.prepare(
            "SELECT s.name, COUNT(p.id) FROM stage s \
             LEFT JOIN project p ON p.stage_id = s.id \
             GROUP BY s.id ORDER BY s.id",
        )?;
        let projects_per_stage = stmt
            .query_map([], |row| {
                Ok(StageCount {
                    stage: row.get(0)?,
                    projects: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to count projects per stage")?;

        let mut stmt = conn.prepare(
            "SELECT w.name, COUNT(p.id), SUM(p.contract_amount) FROM work_type w \
             LEFT JOIN project p ON p.work_type_id = w.id \
             GROUP BY w.id ORDER BY w.id",
        )?;
        let totals_per_work_type = stmt
            .query_map([], |row| {
                Ok(WorkTypeTotal {
                    work_type: row.get(0)?,
                    projects: row.get(1)?,
                    contract_amount: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to total projects per work type")?;

        let neighborhoods_first_districts = strings(
            conn,
            "SELECT n.name FROM neighborhood n JOIN district d ON d.id = n.district_id \
             WHERE d.number <= 3 ORDER BY n.id",
        )?;

        let (finished_in_district_1, finished_in_district_1_amount): (i64, Option<f64>) = conn
            .query_row(
                "SELECT COUNT(p.id), SUM(p.contract_amount) FROM project p \
                 JOIN stage s ON s.id = p.stage_id \
                 JOIN district d ON d.id = p.district_id \
                 WHERE s.name = ?1 AND d.number = 1",
                params![STAGE_FINISHED],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .context("Failed to total finished projects in district 1")?;

        let within_24_months: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM project WHERE duration_months <= 24",
                [],
                |row| row.get(0),
            )
            .context("Failed to count projects within 24 months")?;

        let (total, finished): (i64, i64) = conn
            .query_row(
                "SELECT COUNT(p.id), COUNT(s.id) FROM project p \
                 LEFT JOIN stage s ON s.id = p.stage_id AND s.name = ?1",
                params![STAGE_FINISHED],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .context("Failed to count finished projects")?;
        let finished_percentage = finished_percentage(finished, total);

        let (total_labor, total_contract_amount): (Option<i64>, Option<f64>) = conn
            .query_row(
                "SELECT SUM(labor_headcount), SUM(contract_amount) FROM project",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .context("Failed to total labor and investment")?;

        Ok(Self {
            areas,
            work_types,
            projects_per_stage,
            totals_per_work_type,
            neighborhoods_first_districts,
            finished_in_district_1,
            finished_in_district_1_amount,
            within_24_months,
            finished_percentage,
            total_labor,
            total_contract_amount,
        })
    }

    /// Print the batch in its fixed order
    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "\nÁreas responsables:")?;
        for area in &self.areas {
            writeln!(out, "{}", area)?;
        }

        writeln!(out, "\nTipos de obra:")?;
        for work_type in &self.work_types {
            writeln!(out, "{}", work_type)?;
        }

        writeln!(out, "\nCantidad de obras por etapa:")?;
        for count in &self.projects_per_stage {
            writeln!(out, "{}: {} obras", count.stage, count.projects)?;
        }

        writeln!(out, "\nCantidad de obras y monto total de inversión por tipo de obra:")?;
        for total in &self.totals_per_work_type {
            writeln!(
                out,
                "-{}: {} obras, Monto total de inversión: {}",
                total.work_type,
                total.projects,
                amount(total.contract_amount)
            )?;
        }

        writeln!(out, "\nListado de todos los barrios pertenecientes a las comunas 1, 2 y 3:")?;
        for name in &self.neighborhoods_first_districts {
            writeln!(out, "{}", name)?;
        }

        writeln!(out, "\nCantidad de obras finalizadas y monto total de inversión en la comuna 1:")?;
        writeln!(out, "Obras finalizadas en la comuna 1: {}", self.finished_in_district_1)?;
        writeln!(
            out,
            "Monto total de inversión en obras finalizadas de la comuna 1: {}",
            amount(self.finished_in_district_1_amount)
        )?;

        writeln!(out, "\nCantidad de obras con un plazo menor o igual a 24 meses:")?;
        writeln!(out, "{}", self.within_24_months)?;

        writeln!(out, "\nPorcentaje de obras finalizadas:")?;
        writeln!(out, "{}", percentage(self.finished_percentage))?;

        writeln!(out, "\nCantidad total de mano de obra empleada:")?;
        writeln!(out, "{}", self.total_labor.unwrap_or(0))?;

        writeln!(out, "\nMonto total de inversión:")?;
        writeln!(
            out,
            "El monto total de inversión es de: {}",
            amount(self.total_contract_amount)
        )?;

        Ok(())
    }
}

pub fn finished_percentage(finished: i64, total: i64) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(finished as f64 / total as f64 * 100.0)
    }
}

pub fn percentage(value: Option<f64>) -> String {
    match value {
        Some(p) => format!("{:.2} %", p),
        None => "sin datos".to_string(),
    }
}

fn amount(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "0".to_string(),
    }
}
