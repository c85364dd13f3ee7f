use clap::{Parser, Subcommand};
use crate::config::{Config, TIMER_MINUTES_RANGE};
use crate::db::DbConnection;
use crate::error::XbitoError;
use crate::feedback::{format_clock, random_phrase, Countdown, FeedbackRecorder, TimerEvent};
use crate::filter::{parse_filter_selection, FilterSelection};
use crate::models::{Feeling, TaskKey};
use crate::service::{export_tasks, ExportFormat, SnapshotService};
use crate::session::{ActionOutcome, Session, SessionSettings};
use crate::cli::output::{format_details, format_feedback_log, format_lists, format_rows_table, get_terminal_width};
use crate::cli::error::{user_error, validate_non_empty};
use crate::utils::{format_local, parse_reference_date};
use chrono::Utc;
use std::io::{self, Write};
use std::path::PathBuf;
use anyhow::{anyhow, Context, Result};

#[derive(Parser)]
#[command(name = "xbito")]
#[command(about = "Xbitodowin - filter, browse and manage task lists from the terminal")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show task lists
    Lists {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// List tasks through a filter or a single task list
    Tasks {
        /// Named filter: today, next7, overdue, completed, all
        #[arg(long, short = 'f', conflicts_with = "list")]
        filter: Option<String>,
        /// Browse one task list by id
        #[arg(long, short = 'l')]
        list: Option<String>,
        /// Only show tasks whose title contains this text (case-insensitive)
        #[arg(long, short = 's')]
        search: Option<String>,
        /// Reference date for the date filters (YYYY-MM-DD, today, tomorrow, yesterday)
        #[arg(long)]
        date: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show the details of one task
    Show {
        list_id: String,
        task_id: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Mark a task completed
    Complete {
        list_id: String,
        task_id: String,
    },
    /// Delete a task
    Delete {
        list_id: String,
        task_id: String,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Export the filtered task list
    Export {
        /// csv, json, excel or sheet
        #[arg(long, default_value = "csv")]
        format: String,
        /// Write to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Named filter: today, next7, overdue, completed, all
        #[arg(long, short = 'f', conflicts_with = "list")]
        filter: Option<String>,
        /// Export one task list by id
        #[arg(long, short = 'l')]
        list: Option<String>,
        /// Reference date for the date filters
        #[arg(long)]
        date: Option<String>,
    },
    /// Focus countdown and session feedback
    Timer {
        #[command(subcommand)]
        subcommand: TimerCommands,
    },
}

#[derive(Subcommand)]
pub enum TimerCommands {
    /// Record a timer start
    Start {
        /// Run the countdown in the foreground
        #[arg(long)]
        run: bool,
        /// Countdown length in minutes (1-120)
        #[arg(long)]
        minutes: Option<i64>,
    },
    /// Record how the session went (happy or sad)
    Feedback {
        feeling: String,
    },
    /// Discard the current start without recording feedback
    Reset,
    /// Show recorded feedback
    Log {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

pub fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version are printed to stdout and are not errors
            e.print()?;
            if e.use_stderr() {
                std::process::exit(1);
            }
            return Ok(());
        }
    };

    let config = Config::load()?;
    handle_command(cli, &config)
}

fn handle_command(cli: Cli, config: &Config) -> Result<()> {
    match cli.command {
        Commands::Lists { json } => handle_lists(config, json),
        Commands::Tasks { filter, list, search, date, json } => {
            handle_tasks(config, filter, list, search, date, json)
        }
        Commands::Show { list_id, task_id, json } => handle_show(config, task_key(list_id, task_id), json),
        Commands::Complete { list_id, task_id } => handle_complete(config, task_key(list_id, task_id)),
        Commands::Delete { list_id, task_id, yes } => handle_delete(config, task_key(list_id, task_id), yes),
        Commands::Export { format, output, filter, list, date } => {
            handle_export(config, &format, output, filter, list, date)
        }
        Commands::Timer { subcommand } => match subcommand {
            TimerCommands::Start { run, minutes } => handle_timer_start(config, run, minutes),
            TimerCommands::Feedback { feeling } => handle_timer_feedback(config, &feeling),
            TimerCommands::Reset => handle_timer_reset(config),
            TimerCommands::Log { json } => handle_timer_log(config, json),
        },
    }
}

fn task_key(list_id: String, task_id: String) -> TaskKey {
    if let Err(e) = validate_non_empty(&list_id, "Task list ID") {
        user_error(&e);
    }
    if let Err(e) = validate_non_empty(&task_id, "Task ID") {
        user_error(&e);
    }
    TaskKey::new(list_id, task_id)
}

fn session_settings(config: &Config) -> SessionSettings {
    SessionSettings {
        timezone: config.timezone,
        completed_window: config.completed_window(),
    }
}

fn open_service(config: &Config) -> Result<SnapshotService> {
    SnapshotService::open(&config.snapshot_location)
}

/// Build a session and run a full refresh against `service`
fn refreshed_session(config: &Config, service: &mut SnapshotService, date: Option<&str>) -> Result<Session> {
    let now = Utc::now();
    let reference = match date {
        Some(expr) => parse_reference_date(expr, &config.timezone, now)?,
        None => now,
    };

    let mut session = Session::new(session_settings(config), reference);
    if !session.refresh(service, reference)? {
        return Err(XbitoError::Busy.into());
    }
    Ok(session)
}

/// Apply `--filter`/`--list`; with neither, everything is shown
fn choose_view(session: &mut Session, filter: Option<String>, list: Option<String>) -> Result<()> {
    if let Some(list_id) = list {
        if session.pool().list(&list_id).is_none() {
            return Err(anyhow!("Task list '{}' not found", list_id));
        }
        session.on_list_chosen(&list_id);
        return Ok(());
    }

    let selection = match filter {
        Some(name) => parse_filter_selection(&name).map_err(|e| anyhow!(e))?,
        None => FilterSelection::All,
    };
    if selection == FilterSelection::None {
        return Err(anyhow!("Filter 'none' needs a task list; use --list <id>"));
    }
    session.on_filter_chosen(selection);
    Ok(())
}

fn handle_lists(config: &Config, json: bool) -> Result<()> {
    let mut service = open_service(config)?;
    let session = refreshed_session(config, &mut service, None)?;

    if json {
        println!("{}", serde_json::to_string_pretty(session.lists())?);
    } else {
        print!("{}", format_lists(session.lists()));
    }
    Ok(())
}

fn handle_tasks(
    config: &Config,
    filter: Option<String>,
    list: Option<String>,
    search: Option<String>,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let mut service = open_service(config)?;
    let mut session = refreshed_session(config, &mut service, date.as_deref())?;
    choose_view(&mut session, filter, list)?;
    if let Some(text) = search {
        session.on_search_changed(&text);
    }

    let rows = session.rendered_rows();
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print!("{}", format_rows_table(&rows, get_terminal_width()));
    }
    Ok(())
}

fn handle_show(config: &Config, key: TaskKey, json: bool) -> Result<()> {
    let mut service = open_service(config)?;
    let mut session = refreshed_session(config, &mut service, None)?;
    session.on_filter_chosen(FilterSelection::All);
    session.on_selection_changed(std::slice::from_ref(&key));

    let Some(details) = session.details() else {
        return Err(XbitoError::TaskNotFound(key).into());
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&details)?);
    } else {
        print!("{}", format_details(&details));
    }
    Ok(())
}

fn handle_complete(config: &Config, key: TaskKey) -> Result<()> {
    let mut service = open_service(config)?;
    let mut session = refreshed_session(config, &mut service, None)?;

    if session.pool().get(&key).is_some_and(|t| t.is_completed()) {
        println!("Task {} is already completed.", key);
        return Ok(());
    }

    match session.mark_complete(&mut service, &key, Utc::now())? {
        ActionOutcome::Applied => {
            let title = session.pool().get(&key).map(|t| t.title.as_str()).unwrap_or_default();
            println!("Completed task {}: {}", key, title);
        }
        ActionOutcome::Cancelled | ActionOutcome::Skipped => return Err(XbitoError::Busy.into()),
    }
    Ok(())
}

/// Ask a yes/no question on stdin
fn confirm(question: &str) -> io::Result<bool> {
    print!("{} (y/n): ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}

fn handle_delete(config: &Config, key: TaskKey, yes: bool) -> Result<()> {
    let mut service = open_service(config)?;
    let mut session = refreshed_session(config, &mut service, None)?;

    let mut title = String::new();
    let mut prompt_error = None;
    let outcome = session.delete_task(&mut service, &key, |task| {
        title = task.title.clone();
        if yes {
            return true;
        }
        confirm(&format!("Delete task '{}'?", task.title)).unwrap_or_else(|e| {
            prompt_error = Some(e);
            false
        })
    })?;
    if let Some(e) = prompt_error {
        return Err(e).context("Failed to read confirmation");
    }

    match outcome {
        ActionOutcome::Applied => println!("Deleted task {}: {}", key, title),
        ActionOutcome::Cancelled => println!("Cancelled."),
        ActionOutcome::Skipped => return Err(XbitoError::Busy.into()),
    }
    Ok(())
}

fn handle_export(
    config: &Config,
    format: &str,
    output: Option<PathBuf>,
    filter: Option<String>,
    list: Option<String>,
    date: Option<String>,
) -> Result<()> {
    let Some(format) = ExportFormat::from_str(format) else {
        user_error(&format!("Unknown export format: '{}'. Valid formats: csv, json, excel, sheet.", format));
    };
    if format == ExportFormat::Excel && output.is_none() {
        user_error("Excel export writes a workbook file; pass --output <file.xlsx>.");
    }

    let mut service = open_service(config)?;
    let mut session = refreshed_session(config, &mut service, date.as_deref())?;
    choose_view(&mut session, filter, list)?;
    let tasks = session.filtered();

    match output {
        Some(path) => {
            let file = std::fs::File::create(&path)
                .with_context(|| format!("Failed to create export file: {}", path.display()))?;
            export_tasks(&tasks, format, &config.timezone, io::BufWriter::new(file))?;
            println!("Exported {} tasks to {}", tasks.len(), path.display());
        }
        None => export_tasks(&tasks, format, &config.timezone, io::stdout().lock())?,
    }
    Ok(())
}

fn handle_timer_start(config: &Config, run: bool, minutes: Option<i64>) -> Result<()> {
    let minutes = minutes.unwrap_or(config.timer_minutes);
    if !TIMER_MINUTES_RANGE.contains(&minutes) {
        user_error(&format!(
            "Invalid timer length: {} minutes. Use {}-{}.",
            minutes,
            TIMER_MINUTES_RANGE.start(),
            TIMER_MINUTES_RANGE.end()
        ));
    }

    let conn = DbConnection::connect_at(&config.data_location)
        .context("Failed to connect to database")?;
    let recorder = FeedbackRecorder::new(&conn);
    let mut countdown = Countdown::from_minutes(minutes);

    let started = recorder.start()?;
    countdown.toggle();
    println!(
        "Timer started at {} ({}).",
        format_local(started, &config.timezone),
        countdown.display()
    );
    println!("{}", random_phrase());
    if !run {
        return Ok(());
    }

    loop {
        std::thread::sleep(std::time::Duration::from_secs(1));
        match countdown.tick() {
            TimerEvent::Tick(remaining) => {
                print!("\r{} ", format_clock(remaining));
                io::stdout().flush()?;
            }
            _ => break,
        }
    }
    println!("\r{} ", countdown.display());
    println!("Time's up. Record how it went with `xbito timer feedback happy|sad`.");
    Ok(())
}

fn handle_timer_feedback(config: &Config, feeling: &str) -> Result<()> {
    let Some(feeling) = Feeling::from_str(&feeling.trim().to_lowercase()) else {
        user_error(&format!("Invalid feeling: '{}'. Use happy or sad.", feeling));
    };

    let conn = DbConnection::connect_at(&config.data_location)
        .context("Failed to connect to database")?;
    let recorder = FeedbackRecorder::new(&conn);

    match recorder.record_feedback(feeling)? {
        Some(event) => {
            let start = event
                .start
                .map(|s| format_local(s, &config.timezone))
                .unwrap_or_default();
            println!("Recorded {} feedback for the session started at {}.", feeling.as_str(), start);
        }
        None => println!("No timer start to pair feedback with. Run `xbito timer start` first."),
    }
    Ok(())
}

fn handle_timer_reset(config: &Config) -> Result<()> {
    let conn = DbConnection::connect_at(&config.data_location)
        .context("Failed to connect to database")?;
    if FeedbackRecorder::new(&conn).reset()? {
        println!("Timer reset.");
    } else {
        println!("No timer running.");
    }
    Ok(())
}

fn handle_timer_log(config: &Config, json: bool) -> Result<()> {
    let conn = DbConnection::connect_at(&config.data_location)
        .context("Failed to connect to database")?;
    let events = FeedbackRecorder::new(&conn).events()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
    } else {
        print!("{}", format_feedback_log(&events, &config.timezone));
    }
    Ok(())
}
