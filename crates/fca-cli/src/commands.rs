use std::env;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, info_span, trace, warn};

use fca_cli::io::{JsonContextSource, read_context, write_context};
use fca_cli::render::{
    association_lines, association_table, concepts_table, context_table, implication_lines,
    lattice_table, options_table,
};
use fca_cli::steps::EditStep;
use fca_model::Lattice;
use fca_session::options::{load_options, options_path, save_options};
use fca_session::{
    CalculationStatus, DerivedResult, DerivedValue, Phase, Session, SessionEvent, SessionOptions,
    StartupOrigin, WindowGeometry, start_session,
};

use crate::cli::{AssociationArgs, EditArgs};

/// An open session plus what is remembered about it on exit.
pub struct Workbench {
    pub session: Session,
    geometry: WindowGeometry,
}

impl Workbench {
    /// Opens `context` if given, otherwise restores the last session.
    pub fn open(context: Option<&Path>) -> Result<Self> {
        let mut session = Session::new();
        session.subscribe("log", |event: &SessionEvent| trace!(kind = %event.kind(), "event"));
        if let Some(path) = context {
            let loaded = read_context(path).with_context(|| format!("open {}", path.display()))?;
            session.open_document(loaded, path)?;
            return Ok(Self {
                session,
                geometry: WindowGeometry::default(),
            });
        }
        let untitled_dir = env::current_dir().context("resolve working directory")?;
        let startup = start_session(session, load_options(), &JsonContextSource, &untitled_dir);
        if let Some(err) = &startup.error {
            warn!(%err, "starting from the example context");
            if let Some(hint) = err.suggestion() {
                eprintln!("note: {hint}");
            }
        }
        match &startup.origin {
            StartupOrigin::Restored(path) => info!(path = %path.display(), "session restored"),
            StartupOrigin::FirstRun | StartupOrigin::Example => debug!("example context opened"),
        }
        Ok(Self {
            session: startup.session,
            geometry: startup.geometry,
        })
    }

    /// Stores geometry, last opened file and recent files.
    pub fn remember(&self) {
        let path = self.session.file_path();
        let options = SessionOptions::capture(
            self.geometry,
            path,
            path.is_file(),
            self.session.recent_files(),
        );
        match save_options(&options) {
            Ok(path) => debug!(path = %path.display(), "options stored"),
            Err(err) => warn!(%err, "options not stored"),
        }
    }
}

pub fn run_show(workbench: &Workbench) {
    let session = &workbench.session;
    let context = session.context();
    println!("File: {}", session.file_path().display());
    println!(
        "Objects: {}  Attributes: {}  Incidences: {}",
        context.object_count(),
        context.attribute_count(),
        context.incidence_count()
    );
    println!("{}", context_table(context));
}

pub fn run_concepts(workbench: &mut Workbench) {
    let concepts = workbench.session.concepts();
    println!("{}", concepts_table(&concepts));
    println!("{} concepts", concepts.len());
}

pub fn run_lattice(workbench: &mut Workbench) -> Result<()> {
    let lattice = lattice_in_background(&mut workbench.session)?;
    println!("{}", lattice_table(&lattice));
    println!(
        "{} concepts, {} covering pairs",
        lattice.len(),
        lattice.covers().len()
    );
    Ok(())
}

pub fn run_implications(workbench: &mut Workbench) {
    let implications = workbench.session.implications();
    if implications.is_empty() {
        println!("No implications hold beyond the trivial ones.");
    } else {
        println!("{}", implication_lines(&implications));
    }
}

pub fn run_associations(workbench: &mut Workbench, args: &AssociationArgs) -> Result<()> {
    workbench
        .session
        .set_association_thresholds(args.min_support, args.min_confidence)?;
    let rules = workbench.session.associations();
    if args.lines {
        println!("{}", association_lines(&rules));
    } else {
        println!("{}", association_table(&rules));
    }
    println!("{} rules", rules.len());
    Ok(())
}

pub fn run_edit(workbench: &mut Workbench, args: &EditArgs) -> Result<()> {
    let span = info_span!("edit", steps = args.steps.len());
    let _guard = span.enter();
    let session = &mut workbench.session;
    for step in &args.steps {
        match step {
            EditStep::Apply(edit) => {
                session
                    .apply_edit(edit)
                    .with_context(|| format!("apply '{step}'"))?;
            }
            EditStep::Undo => report_noop(session.undo(), step)?,
            EditStep::Redo => report_noop(session.redo(), step)?,
        }
        debug!(%step, undo = session.history().undo_len(), "step done");
    }
    println!("{}", context_table(session.context()));
    if let Some(output) = &args.output {
        session.open_file(output);
        session.persist(write_context)?;
        println!("Saved to {}", output.display());
    } else if session.is_dirty() {
        println!("Unsaved; pass --output to keep the result.");
    }
    Ok(())
}

pub fn run_options() -> Result<()> {
    let path = options_path().ok_or_else(|| anyhow!("no configuration directory"))?;
    println!("Options file: {}", path.display());
    match load_options()? {
        Some(options) => println!("{}", options_table(&options)),
        None => println!("No options stored yet."),
    }
    Ok(())
}

fn report_noop(result: fca_session::Result<()>, step: &EditStep) -> Result<()> {
    match result {
        Err(err) if err.is_noop() => {
            eprintln!("note: {step} skipped, {err}");
            Ok(())
        }
        other => other.with_context(|| format!("{step}")),
    }
}

/// Derives the lattice on a worker thread while the session keeps
/// publishing its status updates.
fn lattice_in_background(session: &mut Session) -> Result<Arc<Lattice>> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    let bar = spinner.clone();
    let progress = session.subscribe("progress", move |event: &SessionEvent| {
        if let SessionEvent::StatusChanged {
            status,
            phase: Phase::Start,
        } = event
        {
            bar.set_message(status.label());
        }
    });

    let link = session.worker_link();
    let input = session.calculation_input();
    let miner = session.miner();
    let worker = thread::spawn(move || {
        let _lattice = link.begin(CalculationStatus::ComputingLattice);
        let cancel = link.cancel_token();
        let concepts = {
            let _concepts = link.begin(CalculationStatus::ComputingConcepts);
            miner.concepts(&input.context)
        };
        if cancel.is_cancelled() {
            return;
        }
        link.deliver(DerivedResult {
            revision: input.revision,
            value: DerivedValue::Lattice(miner.lattice(&concepts)),
        });
    });
    while !worker.is_finished() {
        session.drain_worker_messages();
        thread::sleep(Duration::from_millis(20));
    }
    let joined = worker.join();
    session.drain_worker_messages();
    session.unsubscribe(progress);
    spinner.finish_and_clear();
    joined.map_err(|_| anyhow!("lattice worker panicked"))?;
    Ok(session.lattice())
}
