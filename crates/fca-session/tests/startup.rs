//! Startup from stored options.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use fca_model::FormalContext;
use fca_session::options::{load_options_from, save_options_to};
use fca_session::{
    ContextSource, EventKind, RecentFiles, Result, Session, SessionError, SessionEvent,
    SessionOptions, StartupOrigin, WindowGeometry, start_session,
};

struct JsonSource;

impl ContextSource for JsonSource {
    fn load(&self, path: &Path) -> Result<FormalContext> {
        let text = fs::read_to_string(path).map_err(|e| SessionError::external("Read", e))?;
        let context: FormalContext =
            serde_json::from_str(&text).map_err(|e| SessionError::external("Parse", e))?;
        context.validate()?;
        Ok(context)
    }
}

fn options_with(last_opened: Option<PathBuf>) -> SessionOptions {
    SessionOptions {
        geometry: WindowGeometry {
            x: 1,
            y: 2,
            w: 900,
            h: 500,
        },
        last_opened,
        recent: RecentFiles::default(),
    }
}

#[test]
fn first_run_opens_the_example() {
    let dir = tempfile::tempdir().unwrap();
    let options = load_options_from(&dir.path().join("options.toml"));
    let startup = start_session(Session::new(), options, &JsonSource, dir.path());
    assert_eq!(startup.origin, StartupOrigin::FirstRun);
    assert!(startup.error.is_none());
    assert_eq!(startup.session.context().object_count(), 4);
    assert_eq!(startup.session.file_path(), dir.path().join("untitled.json"));
}

#[test]
fn last_opened_file_is_restored_clean() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("small.json");
    fs::write(
        &file,
        r#"{"attributes":["a","b"],"objects":[{"name":"g","intent":["a"]}]}"#,
    )
    .unwrap();
    let options_file = dir.path().join("options.toml");
    save_options_to(&options_file, &options_with(Some(file.clone()))).unwrap();

    let startup = start_session(
        Session::new(),
        load_options_from(&options_file),
        &JsonSource,
        dir.path(),
    );
    assert_eq!(startup.origin, StartupOrigin::Restored(file.clone()));
    assert_eq!(startup.geometry.w, 900);
    assert_eq!(startup.session.context().attribute_count(), 2);
    assert_eq!(startup.session.file_path(), file.as_path());
    assert!(!startup.session.is_dirty());
    assert!(startup.session.can_be_saved());
}

#[test]
fn unreadable_last_file_falls_back_to_example() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("broken.json");
    fs::write(&file, "not json").unwrap();

    let startup = start_session(
        Session::new(),
        Ok(Some(options_with(Some(file)))),
        &JsonSource,
        dir.path(),
    );
    assert_eq!(startup.origin, StartupOrigin::Example);
    assert!(matches!(startup.error, Some(SessionError::External { .. })));
    assert_eq!(startup.session.context().object_count(), 4);
    assert!(startup.session.can_be_saved());
}

#[test]
fn invalid_context_is_reported_as_external() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("dangling.json");
    fs::write(
        &file,
        r#"{"attributes":["a"],"objects":[{"name":"g","intent":["zzz"]}]}"#,
    )
    .unwrap();

    let startup = start_session(
        Session::new(),
        Ok(Some(options_with(Some(file)))),
        &JsonSource,
        dir.path(),
    );
    let Some(SessionError::External { operation, .. }) = &startup.error else {
        panic!("expected an external error, got {:?}", startup.error);
    };
    assert_eq!(operation, "Load context");
}

#[test]
fn missing_last_file_opens_example_without_error() {
    let dir = tempfile::tempdir().unwrap();
    let startup = start_session(
        Session::new(),
        Ok(Some(options_with(Some(dir.path().join("gone.json"))))),
        &JsonSource,
        dir.path(),
    );
    assert_eq!(startup.origin, StartupOrigin::Example);
    assert!(startup.error.is_none());
}

fn recording_session() -> (Session, Arc<Mutex<Vec<EventKind>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let mut session = Session::new();
    session.subscribe("log", move |event: &SessionEvent| {
        sink.lock().unwrap().push(event.kind());
    });
    (session, log)
}

#[test]
fn every_example_fallback_announces_context_changed() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{").unwrap();
    let cases = [
        Ok(None),
        Ok(Some(options_with(None))),
        Ok(Some(options_with(Some(dir.path().join("gone.json"))))),
        Ok(Some(options_with(Some(broken)))),
        Err(SessionError::options("unreadable")),
    ];
    for options in cases {
        let (session, log) = recording_session();
        let startup = start_session(session, options, &JsonSource, dir.path());
        assert!(!matches!(startup.origin, StartupOrigin::Restored(_)));
        let kinds = log.lock().unwrap().clone();
        assert_eq!(
            kinds.last(),
            Some(&EventKind::ContextChanged),
            "{:?}",
            startup.origin
        );
    }
}

#[test]
fn malformed_options_fall_back_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let options_file = dir.path().join("options.toml");
    fs::write(&options_file, "w = [").unwrap();
    let startup = start_session(
        Session::new(),
        load_options_from(&options_file),
        &JsonSource,
        dir.path(),
    );
    assert!(matches!(startup.error, Some(SessionError::Options { .. })));
    assert_eq!(startup.session.context().object_count(), 4);
}

#[test]
fn opening_files_maintains_recent_list() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");
    fs::write(&first, "{}").unwrap();

    let mut session = Session::new().with_file_path(&first);
    session.open_file(&second);
    assert_eq!(session.recent_files().paths(), [first.clone()]);
    session.open_file(&first);
    assert!(session.recent_files().is_empty());

    let stored = SessionOptions::capture(
        WindowGeometry::default(),
        session.file_path(),
        session.file_path().is_file(),
        session.recent_files(),
    );
    assert_eq!(stored.last_opened, Some(first));
}
