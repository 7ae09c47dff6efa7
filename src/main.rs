use anyhow::Context;
use chess_predictor::cli::{self, Command, HELP};
use chess_predictor::core::{init_tracing, load_settings, save_settings};
use chess_predictor::game::ai::{Oracle, UciEngine};
use chess_predictor::AnalysisSession;
use clap::Parser;
use crossbeam_channel::{unbounded, RecvTimeoutError};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// How often the interaction loop pumps background results
const TICK: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(name = "chess-predictor", version, about = "Chess position analysis with engine suggestions")]
struct Args {
    /// Path to a UCI engine executable (overrides settings and CHESS_PREDICTOR_ENGINE)
    #[arg(long)]
    engine: Option<PathBuf>,

    /// Settings file to use instead of the one in the user config directory
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "chess_predictor=trace"
    #[arg(long)]
    log_level: Option<String>,

    /// Write the effective settings back to the settings file and continue
    #[arg(long)]
    save_settings: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref()).context("failed to initialise logging")?;

    let mut settings = load_settings(args.settings.as_deref()).apply_env();
    if let Some(engine) = args.engine {
        settings.engine_path = Some(engine);
    }
    if args.save_settings {
        let path = save_settings(&settings, args.settings.as_deref())?;
        info!("[SETTINGS] Saved to {:?}", path);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("engine-io")
        .build()
        .context("failed to start async runtime")?;

    let oracle: Option<Arc<dyn Oracle>> = match &settings.engine_path {
        Some(path) => match runtime.block_on(UciEngine::spawn(
            path,
            settings.skill_level,
            settings.engine_timeout(),
        )) {
            Ok(engine) => Some(Arc::new(engine) as Arc<dyn Oracle>),
            Err(e) => {
                warn!("[ORACLE] {}. Continuing without an engine.", e);
                None
            }
        },
        None => {
            info!("[ORACLE] No engine configured. Set --engine or CHESS_PREDICTOR_ENGINE.");
            None
        }
    };

    let mut session = AnalysisSession::new(&settings, oracle, runtime.handle().clone());

    // stdin blocks, so it gets its own thread
    let (line_tx, line_rx) = unbounded::<String>();
    thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line_tx.send(line).is_err() {
                    break;
                }
            }
        })
        .context("failed to start input thread")?;

    println!("{}", HELP);
    println!("{}", cli::render_board(&session.snapshot()));

    loop {
        match line_rx.recv_timeout(TICK) {
            Ok(line) => match Command::parse(&line) {
                Ok(command) => match cli::execute(&mut session, command) {
                    Some(text) if !text.is_empty() => println!("{}", text),
                    Some(_) => {}
                    None => break,
                },
                Err(e) => println!("{}", e),
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        for event in session.update() {
            println!("{}", cli::describe_event(&event));
            if matches!(event, chess_predictor::SessionEvent::EngineMoved { .. }) {
                println!("{}", cli::render_board(&session.snapshot()));
            }
        }
    }

    session.shutdown();
    info!("Goodbye");
    Ok(())
}
