use anyhow::{bail, Result};

use super::prompt::Prompter;
use super::validate::{parse_amount, parse_featured, parse_integer, InputError};
use super::{STAGE_DRAFT, STAGE_FINISHED, STAGE_TERMINATED};
use crate::store::{InsertOutcome, Project, ProjectData, ProjectId, Reference, SaveOutcome, Store};
use crate::table::Cell;

/// Id of a stage, creating it the first time it is needed
pub fn ensure_stage(store: &Store, name: &str) -> Result<i64> {
    match store.insert_or_get(Reference::Stage, &Cell::from(name))? {
        InsertOutcome::Inserted(id) | InsertOutcome::Existing(id) => Ok(id),
        InsertOutcome::Conflict(msg) => bail!("Could not create stage {}: {}", name, msg),
    }
}

/// Ask until the answer names an existing reference row
fn ask_reference(
    store: &Store,
    prompter: &mut impl Prompter,
    reference: Reference,
    question: &str,
) -> Result<i64> {
    loop {
        let answer = prompter.ask(question)?;
        let value = match reference {
            Reference::District => Cell::Integer(parse_integer("district number", &answer)?),
            _ => Cell::Text(answer),
        };

        if let Some(id) = store.lookup(reference, &value)? {
            return Ok(id);
        }
        prompter.say(&format!(
            "El valor ingresado ({}) no existe en la base de datos\nPor favor ingrese un valor existente",
            value
        ));
    }
}

fn ask_integer(prompter: &mut impl Prompter, field: &'static str, question: &str) -> Result<i64> {
    let answer = prompter.ask(question)?;
    Ok(parse_integer(field, &answer)?)
}

fn optional(answer: String) -> Option<String> {
    if answer.is_empty() {
        None
    } else {
        Some(answer)
    }
}

fn fetch(store: &Store, id: ProjectId) -> Result<Project> {
    match store.get_project(id)? {
        Some(project) => Ok(project),
        None => bail!("Project {} does not exist", id),
    }
}

/// Persist a step; a constraint conflict is reported and the row stays as it was
fn save(store: &Store, prompter: &mut impl Prompter, project: &Project) -> Result<SaveOutcome> {
    let outcome = store.save_project(project)?;
    match &outcome {
        SaveOutcome::Saved => prompter.say("Se ha guardado con éxito"),
        SaveOutcome::Conflict(msg) => {
            log::warn!("Project {} not saved: {}", project.id, msg);
            prompter.say(&format!("Error al actualizar los datos: {}", msg));
        }
    }
    Ok(outcome)
}

/// Create a draft project. `None` when the row was refused (duplicate name).
pub fn new_project(store: &Store, prompter: &mut impl Prompter) -> Result<Option<ProjectId>> {
    let stage_id = ensure_stage(store, STAGE_DRAFT)?;

    let name = prompter.ask("Ingresar el nombre de obra que se va realizar: ")?;
    let work_type_id = ask_reference(
        store,
        prompter,
        Reference::WorkType,
        "Ingresar el tipo de obra que se va realizar: ",
    )?;
    let responsible_area_id = ask_reference(
        store,
        prompter,
        Reference::ResponsibleArea,
        "Ingresar el area responsable de la obra: ",
    )?;
    let neighborhood_id = ask_reference(
        store,
        prompter,
        Reference::Neighborhood,
        "Ingresar el barrio en el que se realizará la obra: ",
    )?;
    let district_id = ask_reference(
        store,
        prompter,
        Reference::District,
        "Ingresar la comuna en la que se realizará la obra: ",
    )?;

    let data = ProjectData {
        name: Some(name),
        stage_id,
        work_type_id,
        responsible_area_id,
        district_id,
        neighborhood_id: Some(neighborhood_id),
        ..Default::default()
    };

    match store.insert_project(&data)? {
        InsertOutcome::Inserted(id) | InsertOutcome::Existing(id) => {
            prompter.say("Nuevo proyecto creado con éxito");
            log::info!("Created draft project #{}", id);
            Ok(Some(ProjectId(id)))
        }
        InsertOutcome::Conflict(msg) => {
            log::warn!("Draft project {:?} refused: {}", data.name, msg);
            prompter.say(&format!("No se pudo cargar el proyecto: {}", msg));
            Ok(None)
        }
    }
}

pub fn start_contracting(
    store: &Store,
    prompter: &mut impl Prompter,
    id: ProjectId,
) -> Result<SaveOutcome> {
    let mut project = fetch(store, id)?;

    let contract_type_id = ask_reference(
        store,
        prompter,
        Reference::ContractType,
        "Ingresar el tipo de contratación: ",
    )?;
    let contract_number = prompter.ask("Ingresar el número de contratación: ")?;
    let amount = prompter.ask("Ingresar el monto del contrato: ")?;
    let amount = parse_amount("contract amount", &amount)?;

    project.data.contract_type_id = Some(contract_type_id);
    project.data.contract_number = optional(contract_number);
    project.data.contract_amount = Some(amount);

    save(store, prompter, &project)
}

pub fn award(store: &Store, prompter: &mut impl Prompter, id: ProjectId) -> Result<SaveOutcome> {
    let mut project = fetch(store, id)?;

    let company_id = ask_reference(
        store,
        prompter,
        Reference::Company,
        "Ingresar el nombre de la empresa: ",
    )?;
    let case_number = prompter.ask("Ingresar el número de expediente: ")?;

    project.data.company_id = Some(company_id);
    project.data.case_number = optional(case_number);

    save(store, prompter, &project)
}

pub fn start_work(
    store: &Store,
    prompter: &mut impl Prompter,
    id: ProjectId,
) -> Result<SaveOutcome> {
    let mut project = fetch(store, id)?;

    let featured = loop {
        let answer =
            prompter.ask("Indicar si la obra se categoriza como destacada (SI/NO): ")?;
        match parse_featured(&answer) {
            Some(flag) => break flag,
            None => prompter.say("La respuesta no es válida.\nIngresar la respuesta nuevamente"),
        }
    };
    let start_date = prompter.ask("Indicar la fecha en la que se iniciará la obra: ")?;
    let end_date = prompter.ask("Indicar la fecha en la que se estima finalizar la obra: ")?;
    let funding_source_id = ask_reference(
        store,
        prompter,
        Reference::FundingSource,
        "Ingresar la fuente de financiamiento: ",
    )?;
    let labor = ask_integer(
        prompter,
        "labor headcount",
        "Indicar la cantidad de mano de obra: ",
    )?;

    project.data.featured = Some(featured);
    project.data.start_date = optional(start_date);
    project.data.initial_end_date = optional(end_date);
    project.data.funding_source_id = Some(funding_source_id);
    project.data.labor_headcount = Some(labor);

    save(store, prompter, &project)
}

/// Percent complete is stored as given; the range is not checked
pub fn update_progress(
    store: &Store,
    prompter: &mut impl Prompter,
    id: ProjectId,
) -> Result<SaveOutcome> {
    let mut project = fetch(store, id)?;
    let percent = ask_integer(
        prompter,
        "percent complete",
        "Indicar el porcentaje de avance de la obra: ",
    )?;
    project.data.percent_complete = Some(percent);
    save(store, prompter, &project)
}

pub fn extend_duration(
    store: &Store,
    prompter: &mut impl Prompter,
    id: ProjectId,
) -> Result<SaveOutcome> {
    let mut project = fetch(store, id)?;
    let months = ask_integer(
        prompter,
        "duration in months",
        "Indicar la cantidad de meses que lleva la obra en ejecución: ",
    )?;
    project.data.duration_months = Some(months as f64);
    save(store, prompter, &project)
}

/// Adds to the current headcount; a project without one starts from zero.
/// A total past `i64::MAX` is rejected as invalid input.
pub fn add_labor(
    store: &Store,
    prompter: &mut impl Prompter,
    id: ProjectId,
) -> Result<SaveOutcome> {
    let mut project = fetch(store, id)?;
    let extra = ask_integer(
        prompter,
        "labor headcount",
        "Ingresar cuánta mano de obra se incorporará: ",
    )?;
    let current = project.data.labor_headcount.unwrap_or(0);
    let total = current
        .checked_add(extra)
        .ok_or_else(|| InputError::InvalidNumber {
            field: "labor headcount",
            input: extra.to_string(),
        })?;
    project.data.labor_headcount = Some(total);
    save(store, prompter, &project)
}

pub fn complete(store: &Store, prompter: &mut impl Prompter, id: ProjectId) -> Result<SaveOutcome> {
    let stage_id = ensure_stage(store, STAGE_FINISHED)?;
    let mut project = fetch(store, id)?;
    project.data.percent_complete = Some(100);
    project.data.stage_id = stage_id;
    save(store, prompter, &project)
}

pub fn terminate(
    store: &Store,
    prompter: &mut impl Prompter,
    id: ProjectId,
) -> Result<SaveOutcome> {
    let stage_id = ensure_stage(store, STAGE_TERMINATED)?;
    let mut project = fetch(store, id)?;
    project.data.stage_id = stage_id;
    save(store, prompter, &project)
}

