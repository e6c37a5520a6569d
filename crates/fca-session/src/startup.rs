//! Session bootstrap from stored options.

use std::path::{Path, PathBuf};

use fca_model::{FormalContext, example_context};
use tracing::{info, warn};

use crate::calculation::CalculationStatus;
use crate::error::{Result, SessionError};
use crate::options::{SessionOptions, WindowGeometry};
use crate::session::{Session, UNTITLED};

/// Reads contexts from disk for the session.
pub trait ContextSource {
    fn load(&self, path: &Path) -> Result<FormalContext>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupOrigin {
    /// No options were stored.
    FirstRun,
    /// The last opened file was loaded.
    Restored(PathBuf),
    /// Options existed but no file could be restored.
    Example,
}

#[derive(Debug)]
pub struct Startup {
    pub session: Session,
    pub geometry: WindowGeometry,
    pub origin: StartupOrigin,
    /// Failure that forced the example context, for the host to report.
    pub error: Option<SessionError>,
}

/// Builds the initial session.
///
/// `session` should carry the host's miner and affordances; its context is
/// replaced. `untitled_dir` is where a never-saved document lives.
pub fn start_session(
    mut session: Session,
    options: Result<Option<SessionOptions>>,
    source: &dyn ContextSource,
    untitled_dir: &Path,
) -> Startup {
    let untitled = untitled_dir.join(UNTITLED);
    let options = match options {
        Ok(Some(options)) => options,
        Ok(None) => {
            info!("first run, opening the example context");
            session = install_example(session, untitled);
            return Startup {
                session,
                geometry: WindowGeometry::default(),
                origin: StartupOrigin::FirstRun,
                error: None,
            };
        }
        Err(err) => {
            warn!(%err, "options unreadable, opening the example context");
            session = install_example(session, untitled);
            return Startup {
                session,
                geometry: WindowGeometry::default(),
                origin: StartupOrigin::Example,
                error: Some(err),
            };
        }
    };

    let mut session = session.with_recent_files(options.recent.clone());
    let geometry = options.geometry;
    let Some(path) = options.last_opened.filter(|p| p.is_file()) else {
        return Startup {
            session: install_example(session, untitled),
            geometry,
            origin: StartupOrigin::Example,
            error: None,
        };
    };

    match load(&mut session, source, &path) {
        Ok(()) => Startup {
            session,
            geometry,
            origin: StartupOrigin::Restored(path),
            error: None,
        },
        Err(err) => {
            warn!(path = %path.display(), %err, "could not restore last file");
            Startup {
                session: install_example(session, untitled),
                geometry,
                origin: StartupOrigin::Example,
                error: Some(err),
            }
        }
    }
}

fn load(session: &mut Session, source: &dyn ContextSource, path: &Path) -> Result<()> {
    session.start_calculation(CalculationStatus::LoadingFile);
    let loaded = source.load(path).map_err(|err| {
        if matches!(err, SessionError::External { .. }) {
            err
        } else {
            SessionError::external("Load context", err)
        }
    });
    session.stop_calculation(CalculationStatus::LoadingFile);
    session.open_document(loaded?, path)
}

/// Installs the example and announces it, on every path that loads no file.
fn install_example(session: Session, untitled: PathBuf) -> Session {
    let mut session = session.with_file_path(untitled);
    let installed = session
        .new_context(example_context())
        .and_then(|()| session.context_changed());
    if let Err(err) = installed {
        warn!(%err, "example context rejected");
    }
    session
}
