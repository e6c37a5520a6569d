//! Edit steps applied through a session and saved as JSON.

use std::sync::{Arc, Mutex};

use fca_cli::io::{read_context, write_context};
use fca_cli::steps::EditStep;
use fca_model::example_context;
use fca_session::{Session, SessionEvent};

fn steps(items: &[&str]) -> Vec<EditStep> {
    items.iter().map(|s| s.parse().unwrap()).collect()
}

fn run(session: &mut Session, steps: &[EditStep]) {
    for step in steps {
        match step {
            EditStep::Apply(edit) => {
                session.apply_edit(edit).unwrap();
            }
            EditStep::Undo => session.undo().unwrap(),
            EditStep::Redo => session.redo().unwrap(),
        }
    }
}

#[test]
fn edited_context_is_saved_and_reloaded() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("people.json");
    let output = dir.path().join("edited.json");
    write_context(&example_context(), &input).unwrap();

    let mut session = Session::new();
    session.subscribe("noop", |_: &SessionEvent| {});
    session
        .open_document(read_context(&input).unwrap(), &input)
        .unwrap();
    assert!(!session.is_dirty());

    run(
        &mut session,
        &steps(&[
            "add-object:child=juvenile",
            "rename-attribute:adult=grown",
            "toggle:child=female",
            "undo",
        ]),
    );
    assert!(session.is_dirty());
    assert!(session.history().can_redo());

    session.open_file(&output);
    session.persist(write_context).unwrap();
    assert!(!session.is_dirty());

    let saved = read_context(&output).unwrap();
    assert!(saved.has_attribute("grown"));
    assert!(!saved.has_attribute("adult"));
    assert!(saved.has_incidence("child", "juvenile"));
    assert!(!saved.has_incidence("child", "female"));
    assert_eq!(session.recent_files().first(), Some(input.as_path()));
}

#[test]
fn undo_then_redo_restores_the_edit() {
    let mut session = Session::with_context(example_context()).unwrap();
    let events = Arc::new(Mutex::new(0usize));
    let seen = Arc::clone(&events);
    session.subscribe("count", move |_: &SessionEvent| *seen.lock().unwrap() += 1);

    run(&mut session, &steps(&["remove-object:man", "undo", "redo"]));
    assert!(!session.context().has_object("man"));
    assert_eq!(session.history().undo_len(), 1);
    assert!(*events.lock().unwrap() > 0);
}
