//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire the core together the way an app shell would at startup.
//! - Print a deterministic status report of the day flow and task list.
//!
//! Usage: `dayflow_cli [DATA_DIR] [--seed]`. `--seed` replaces the task list
//! with the sample tasks before reporting.

use dayflow_core::db::open_db;
use dayflow_core::{
    confirmation_message, core_version, init_logging_from_config, CoreConfig, DayFlowMachine,
    DayFlowPersistence, SqlitePreferenceStore, TaskFilter, TaskListService, TaskStore,
};
use log::warn;
use std::error::Error;
use std::path::PathBuf;

const SEED_FLAG: &str = "--seed";
const USAGE: &str = "usage: dayflow_cli [DATA_DIR] [--seed]";

#[derive(Debug, PartialEq, Eq)]
struct CliArgs {
    data_dir: Option<PathBuf>,
    seed: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs, String> {
    let mut parsed = CliArgs {
        data_dir: None,
        seed: false,
    };
    for arg in args {
        if arg == SEED_FLAG {
            parsed.seed = true;
        } else if arg.starts_with("--") {
            return Err(format!("unknown option `{arg}`\n{USAGE}"));
        } else if parsed.data_dir.is_some() {
            return Err(format!("unexpected argument `{arg}`\n{USAGE}"));
        } else {
            parsed.data_dir = Some(PathBuf::from(arg));
        }
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(2);
        }
    };
    let seed = args.seed;
    let data_dir = match args.data_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let data_dir = if data_dir.is_absolute() {
        data_dir
    } else {
        std::env::current_dir()?.join(data_dir)
    };
    std::fs::create_dir_all(&data_dir)?;

    let config = CoreConfig::with_data_dir(&data_dir);
    if let Err(err) = init_logging_from_config(&config) {
        // Logging is diagnostics only; the report still runs without it.
        eprintln!("logging disabled: {err}");
    }

    let db_path = config.database_path();
    let prefs = SqlitePreferenceStore::new(open_db(&db_path)?);
    let machine = DayFlowMachine::start_today(DayFlowPersistence::new(prefs));

    let mut tasks = TaskListService::new(TaskStore::spawn(open_db(&db_path)?)?);
    if seed {
        if let Err(err) = tasks.replace_with_sample_tasks().await {
            warn!("event=cli_seed module=cli status=error error={err}");
            return Err(err.into());
        }
    }

    let snapshot = tasks.snapshot();
    tasks.set_filter(TaskFilter::Open);
    let open_count = tasks.visible_tasks().len();

    println!("dayflow_core version={}", core_version());
    println!("database={}", db_path.display());
    println!("phase={}", machine.current_phase().name());
    println!("first_run_today={}", machine.is_first_run_today());
    println!(
        "focus={}",
        machine
            .selected_focus()
            .map_or("", |focus| focus.as_str())
    );
    println!(
        "confirmation={}",
        confirmation_message(machine.selected_focus())
    );
    println!("tasks_total={} tasks_open={}", snapshot.len(), open_count);
    for task in tasks.focus_queue() {
        println!("  #{} {} ({})", task.id, task.title, task.category);
    }

    Ok(())
}
