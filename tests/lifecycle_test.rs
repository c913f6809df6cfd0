//! Scripted runs of the project lifecycle against an in-memory store.

use obras_urbanas::lifecycle::{
    self, manage, run_workflow, InputError, PromptError, ScriptedPrompter, STAGE_DRAFT,
    STAGE_FINISHED, STAGE_TERMINATED,
};
use obras_urbanas::store::{ProjectData, ProjectId, Reference, Store};
use obras_urbanas::table::Cell;

fn seeded_store() -> Store {
    let store = Store::open_in_memory().unwrap();
    store.init_schema().unwrap();

    let insert = |reference, value: Cell| {
        store
            .insert_or_get(reference, &value)
            .unwrap()
            .id()
            .unwrap()
    };
    insert(Reference::Stage, Cell::from(STAGE_FINISHED));
    insert(Reference::WorkType, Cell::from("Arquitectura"));
    insert(Reference::ResponsibleArea, Cell::from("Ministerio de Educación"));
    let district = insert(Reference::District, Cell::Integer(14));
    insert(Reference::Company, Cell::from("ACME SA"));
    insert(Reference::ContractType, Cell::from("Licitación Pública"));
    insert(Reference::FundingSource, Cell::from("GCBA"));
    store
        .insert_neighborhood(&Cell::from("Palermo"), district)
        .unwrap();

    store
}

fn stage_name(store: &Store, id: ProjectId) -> String {
    store
        .connection()
        .query_row(
            "SELECT s.name FROM project p JOIN stage s ON s.id = p.stage_id WHERE p.id = ?1",
            [id.0],
            |r| r.get(0),
        )
        .unwrap()
}

/// Answers up to and including the closing choice
fn full_run(name: &str, closing: &str) -> Vec<String> {
    [
        name,
        // new_project, with one unknown work type first
        "Inexistente",
        "Arquitectura",
        "Ministerio de Educación",
        "Palermo",
        "14",
        // start_contracting
        "Licitación Pública",
        "CD-123/2024",
        "1500000,50",
        // award
        "ACME SA",
        "EX-2024-99",
        // start_work, with one invalid featured flag first
        "Tal vez",
        "SI",
        "2024-01-10",
        "2025-06-30",
        "GCBA",
        "40",
        // update_progress
        "35",
        // extend_duration
        "SI",
        "18",
        // add_labor
        "SI",
        "5",
        // closing choice, with one out of range first
        "7",
        closing,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[test]
fn test_terminate_creates_stage_on_demand() {
    let store = seeded_store();
    assert!(store
        .lookup(Reference::Stage, &Cell::from(STAGE_TERMINATED))
        .unwrap()
        .is_none());

    let mut prompter = ScriptedPrompter::new(full_run("Escuela Palermo", "2"));
    let id = run_workflow(&store, &mut prompter).unwrap().unwrap();

    assert_eq!(prompter.remaining(), 0);
    assert_eq!(stage_name(&store, id), STAGE_TERMINATED);

    let project = store.get_project(id).unwrap().unwrap().data;
    assert_eq!(project.name.as_deref(), Some("Escuela Palermo"));
    assert_eq!(project.contract_amount, Some(1_500_000.5));
    assert_eq!(project.contract_number.as_deref(), Some("CD-123/2024"));
    assert_eq!(project.case_number.as_deref(), Some("EX-2024-99"));
    assert_eq!(project.featured.as_deref(), Some("SI"));
    assert_eq!(project.start_date.as_deref(), Some("2024-01-10"));
    assert_eq!(project.duration_months, Some(18.0));
    assert_eq!(project.percent_complete, Some(35));
    assert_eq!(project.labor_headcount, Some(45));
    assert!(project.company_id.is_some());
    assert!(project.funding_source_id.is_some());

    assert!(prompter
        .transcript
        .iter()
        .any(|line| line.contains("(Inexistente) no existe")));
}

#[test]
fn test_complete_forces_full_progress() {
    let store = seeded_store();
    let mut prompter = ScriptedPrompter::new(full_run("Escuela Palermo", "1"));

    let id = run_workflow(&store, &mut prompter).unwrap().unwrap();

    assert_eq!(stage_name(&store, id), STAGE_FINISHED);
    let project = store.get_project(id).unwrap().unwrap().data;
    assert_eq!(project.percent_complete, Some(100));
}

#[test]
fn test_steps_target_their_own_project() {
    let store = seeded_store();
    let draft = lifecycle::ensure_stage(&store, STAGE_DRAFT).unwrap();
    let lookup = |r, v: Cell| store.lookup(r, &v).unwrap().unwrap();
    let existing = ProjectData {
        name: Some("Obra previa".into()),
        stage_id: draft,
        work_type_id: lookup(Reference::WorkType, Cell::from("Arquitectura")),
        responsible_area_id: lookup(
            Reference::ResponsibleArea,
            Cell::from("Ministerio de Educación"),
        ),
        district_id: lookup(Reference::District, Cell::Integer(14)),
        ..Default::default()
    };
    let other = ProjectId(store.insert_project(&existing).unwrap().id().unwrap());

    let mut prompter = ScriptedPrompter::new(full_run("Escuela Palermo", "1"));
    let id = run_workflow(&store, &mut prompter).unwrap().unwrap();

    assert_ne!(id, other);
    assert_eq!(store.get_project(other).unwrap().unwrap().data, existing);
    assert_eq!(stage_name(&store, other), STAGE_DRAFT);
}

#[test]
fn test_duplicate_name_stops_before_any_step() {
    let store = seeded_store();
    let mut first = ScriptedPrompter::new(full_run("Escuela Palermo", "2"));
    run_workflow(&store, &mut first).unwrap().unwrap();

    let mut answers = full_run("Escuela Palermo", "2");
    answers.truncate(6);
    let mut second = ScriptedPrompter::new(answers);

    assert_eq!(run_workflow(&store, &mut second).unwrap(), None);
    assert_eq!(store.count("project").unwrap(), 1);
    assert!(second
        .transcript
        .iter()
        .any(|line| line.starts_with("No se pudo cargar el proyecto")));
}

#[test]
fn test_malformed_amount_aborts() {
    let store = seeded_store();
    let mut answers = full_run("Escuela Palermo", "2");
    answers[8] = "un millón".to_string();
    let mut prompter = ScriptedPrompter::new(answers);

    let err = run_workflow(&store, &mut prompter).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<InputError>(),
        Some(InputError::InvalidNumber { .. })
    ));
}

#[test]
fn test_unknown_reference_loop_ends_when_input_runs_out() {
    let store = seeded_store();
    let mut prompter = ScriptedPrompter::new(["Escuela", "Inexistente", "Tampoco"]);

    let err = run_workflow(&store, &mut prompter).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PromptError>(),
        Some(PromptError::Exhausted(_))
    ));
}

#[test]
fn test_manage_loops_until_no() {
    let store = seeded_store();
    let mut answers = vec!["quizás".to_string(), "SI".to_string()];
    answers.extend(full_run("Escuela 1", "1"));
    answers.push("SI".to_string());
    answers.extend(full_run("Escuela 2", "2"));
    answers.push("NO".to_string());
    let mut prompter = ScriptedPrompter::new(answers);

    assert_eq!(manage(&store, &mut prompter).unwrap(), 2);
    assert_eq!(store.count("project").unwrap(), 2);
    assert_eq!(prompter.remaining(), 0);
}

#[test]
fn test_labor_total_past_i64_is_rejected() {
    let store = seeded_store();
    let draft = lifecycle::ensure_stage(&store, STAGE_DRAFT).unwrap();
    let lookup = |r, v: Cell| store.lookup(r, &v).unwrap().unwrap();
    let data = ProjectData {
        name: Some("Escuela Palermo".into()),
        stage_id: draft,
        work_type_id: lookup(Reference::WorkType, Cell::from("Arquitectura")),
        responsible_area_id: lookup(
            Reference::ResponsibleArea,
            Cell::from("Ministerio de Educación"),
        ),
        district_id: lookup(Reference::District, Cell::Integer(14)),
        labor_headcount: Some(40),
        ..Default::default()
    };
    let id = ProjectId(store.insert_project(&data).unwrap().id().unwrap());

    let mut prompter = ScriptedPrompter::new([i64::MAX.to_string()]);
    let err = lifecycle::add_labor(&store, &mut prompter, id).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<InputError>(),
        Some(InputError::InvalidNumber { field: "labor headcount", .. })
    ));
    let stored = store.get_project(id).unwrap().unwrap().data;
    assert_eq!(stored.labor_headcount, Some(40));
}
