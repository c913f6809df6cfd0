//! Interactive lifecycle of a single project
//!
//! A project is created in the draft stage, filled in step by step while it
//! stays there, and finally completed or terminated. Every step works on the
//! `ProjectId` returned by `new_project`, never on "whichever project is in
//! the draft stage".

pub mod prompt;
pub mod steps;
pub mod validate;

pub use prompt::{ConsolePrompter, PromptError, Prompter, ScriptedPrompter};
pub use steps::*;
pub use validate::{Closing, InputError};

use anyhow::Result;

use crate::store::{ProjectId, Store};
use validate::{parse_closing, parse_yes_no};

pub const STAGE_DRAFT: &str = "Proyecto";
pub const STAGE_FINISHED: &str = "Finalizada";
pub const STAGE_TERMINATED: &str = "Rescindida";

/// Ask a SI/NO question until one of the two is given
pub fn ask_yes_no(prompter: &mut impl Prompter, question: &str) -> Result<bool> {
    loop {
        let answer = prompter.ask(question)?;
        match parse_yes_no(&answer) {
            Some(yes) => return Ok(yes),
            None => prompter.say("La respuesta no es válida.\nIngresar la respuesta nuevamente"),
        }
    }
}

fn ask_closing(prompter: &mut impl Prompter) -> Result<Closing> {
    loop {
        let answer = prompter.ask("Desea:\n1. Finalizar la obra\n2. Rescindir la obra\n: ")?;
        match parse_closing(&answer)? {
            Some(closing) => return Ok(closing),
            None => prompter.say("La respuesta no es válida.\nIngresar la respuesta nuevamente"),
        }
    }
}

/// Run one project from creation to a terminal stage.
/// Returns `None` when the draft could not be created.
pub fn run_workflow(store: &Store, prompter: &mut impl Prompter) -> Result<Option<ProjectId>> {
    let Some(id) = new_project(store, prompter)? else {
        return Ok(None);
    };

    start_contracting(store, prompter, id)?;
    award(store, prompter, id)?;
    start_work(store, prompter, id)?;
    update_progress(store, prompter, id)?;

    if ask_yes_no(
        prompter,
        "Desea incrementar el plazo de meses que lleva la obra en ejecución? (SI/NO): ",
    )? {
        extend_duration(store, prompter, id)?;
    }

    if ask_yes_no(prompter, "Desea incrementar la mano de obra? (SI/NO): ")? {
        add_labor(store, prompter, id)?;
    }

    match ask_closing(prompter)? {
        Closing::Complete => complete(store, prompter, id)?,
        Closing::Terminate => terminate(store, prompter, id)?,
    };

    Ok(Some(id))
}

/// Offer new projects until the operator answers NO; returns how many were created
pub fn manage(store: &Store, prompter: &mut impl Prompter) -> Result<usize> {
    let mut created = 0;
    while ask_yes_no(
        prompter,
        "\nDesea crear una nueva instancia de obra? (SI/NO): ",
    )? {
        if run_workflow(store, prompter)?.is_some() {
            created += 1;
        }
    }
    Ok(created)
}
