use anyhow::Result;
use colorbisect::cli::{self, Args, DialogKind};
use colorbisect::{
    config, interrupt, logger, report, Bisector, DialogSession, FeedbackDialog, Interrupted,
    Outcome, PlainDialog, Snapshot, TerminalDialog, WindowDialog,
};
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(&args) {
        Ok(Outcome::Found { .. }) => ExitCode::SUCCESS,
        Ok(Outcome::NotFound) => ExitCode::FAILURE,
        Err(e) if e.downcast_ref::<Interrupted>().is_some() => {
            eprintln!("{}", report::format_interrupted());
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<Outcome> {
    let config = config::load_config()?;
    config::validate_config(&config)?;

    if let Some(log_path) = logger::init_debug_logging(args.debug || config.logging.debug)? {
        eprintln!("Debug log: {}", log_path.display());
    }

    interrupt::install_handler()?;

    let x_offset = config::resolve_x_offset(&config, |name| env::var(name).ok());
    let mut session = DialogSession::new(x_offset);

    let snapshot = Snapshot::create(&args.file)?;
    let result = search(&snapshot, args.dialog, &mut session);

    let target = snapshot.target_path().to_path_buf();
    let restored = snapshot.restore();

    if let Ok(outcome) = &result {
        println!("{}", report::format_outcome(&target, outcome));
    }
    restored?;
    println!("{}", report::format_restored());

    result
}

fn search(snapshot: &Snapshot, kind: DialogKind, session: &mut DialogSession) -> Result<Outcome> {
    let bisector = Bisector::new(snapshot)?;

    let mut dialog: Box<dyn FeedbackDialog> = match kind {
        DialogKind::Window => Box::new(WindowDialog::new()),
        DialogKind::Terminal => Box::new(TerminalDialog::new()),
        DialogKind::Plain => Box::new(PlainDialog::stdin()),
    };

    bisector.run(dialog.as_mut(), session)
}
