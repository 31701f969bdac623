//src/main.rs
mod cli;
mod menu;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use log::LevelFilter;
use std::collections::BTreeMap;
use std::io::{self, stdout, Write};
use workout_log_lib::prompt::is_affirmative;
use workout_log_lib::{
    AppService, Clock, Console, ExerciseAggregate, ExerciseSet, LogError, LogView, StdConsole,
    SystemClock, WorkoutSession,
};

/// How listings are rendered.
pub struct Output {
    pub csv: bool,
    pub header_color: Color,
}

fn main() -> Result<()> {
    let cli_args = cli::parse_args();
    init_logger(cli_args.verbose);

    if let Some(cli::Commands::GenerateCompletion { shell }) = cli_args.command {
        let mut cmd = cli::build_cli_command();
        let bin_name = cmd.get_name().to_string();
        eprintln!("Generating completion script for {shell}...");
        clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout());
        return Ok(());
    }

    // The one connection used for the whole run; released by `close` below.
    let mut service = AppService::initialize(cli_args.db.clone())
        .context("Failed to initialize application service")?;

    let header_color = workout_log_lib::parse_color(&service.config.theme.header_color)
        .map(Color::from)
        .unwrap_or(Color::Green);
    let output = Output {
        csv: cli_args.export_csv,
        header_color,
    };
    let mut console = StdConsole::new();

    let result = dispatch(cli_args.command, &mut service, &mut console, &output);

    finish(service, result)
}

/// Closes the connection whether or not the command succeeded. A command error wins over
/// a close error.
fn finish(service: AppService, result: Result<()>) -> Result<()> {
    let closed = service.close();
    result.and(closed)
}

fn dispatch(
    command: Option<cli::Commands>,
    service: &mut AppService,
    console: &mut dyn Console,
    output: &Output,
) -> Result<()> {
    match command {
        None => menu::run(service, console, output)?,
        Some(cli::Commands::Log) => run_log(service, console, &SystemClock)?,
        Some(cli::Commands::View(args)) => show_logs(service, console, output, args)?,
        Some(cli::Commands::Delete { target }) => match target {
            cli::DeleteTarget::Session { id } => delete_session(service, console, id)?,
            cli::DeleteTarget::Set { id } => delete_set(service, console, id)?,
        },
        Some(cli::Commands::Clear { yes }) => clear_logs(service, console, yes)?,
        Some(cli::Commands::DbPath) => println!("Database file is located at: {:?}", service.get_db_path()),
        Some(cli::Commands::ConfigPath) => {
            println!("Config file is located at: {:?}", service.get_config_path())
        }
        Some(cli::Commands::GenerateCompletion { .. }) => {
            unreachable!("Completion generation should have exited already")
        }
    }
    Ok(())
}

/// Sends `LEVEL: target - message` lines to stderr. `RUST_LOG` overrides `-v`.
fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let mut builder = env_logger::Builder::new();
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{}: {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .filter_level(level)
        .parse_default_env();
    let _ = builder.try_init();
}

pub fn run_log(service: &mut AppService, console: &mut dyn Console, clock: &dyn Clock) -> Result<()> {
    match service.logger(clock).log_workout(console) {
        Ok(_) => Ok(()),
        // Keep the storage error itself on top so the menu can recognise it.
        Err(LogError::Storage(e)) => Err(e.into()),
        Err(LogError::Prompt(e)) => Err(e.into()),
    }
}

pub fn show_logs(
    service: &AppService,
    console: &mut dyn Console,
    output: &Output,
    args: cli::ViewArgs,
) -> Result<()> {
    let viewer = service.viewer();
    if args.aggregate {
        match viewer.aggregated_listing()? {
            LogView::NothingFound => console.say("\nNo exercise sets found!"),
            LogView::Found(aggregates) => print_aggregates(&aggregates, output)?,
        }
        return Ok(());
    }

    match viewer.full_listing(!args.no_sessions)? {
        LogView::NothingFound => console.say("\nNo workout sessions found!"),
        LogView::Found(log) => {
            if !log.sessions.is_empty() {
                print_sessions(&log.sessions, output)?;
            }
            if log.sets.is_empty() {
                console.say("No exercise sets logged yet.");
            } else {
                print_sets(&log.sets, output)?;
            }
        }
    }
    Ok(())
}

pub fn delete_session(service: &mut AppService, console: &mut dyn Console, id: i64) -> Result<()> {
    let deleted = service.eraser().delete_session_cascade(id)?;
    if deleted.sessions == 0 {
        console.say(&format!("\nNo session with ID {id}; nothing to delete."));
    } else {
        console.say(&format!(
            "\nSession {id} and its {} exercise set(s) deleted successfully.",
            deleted.sets
        ));
    }
    Ok(())
}

pub fn delete_set(service: &mut AppService, console: &mut dyn Console, id: i64) -> Result<()> {
    let deleted = service.eraser().delete_single_set(id)?;
    if deleted.is_nothing() {
        console.say(&format!("\nNo exercise set with ID {id}; nothing to delete."));
    } else {
        console.say(&format!("\nExercise set {id} deleted successfully."));
    }
    Ok(())
}

pub fn clear_logs(service: &mut AppService, console: &mut dyn Console, confirmed: bool) -> Result<()> {
    if !confirmed && service.config.confirm_clear {
        let answer = console.ask("\nAre you sure you want to clear all logs? (y/n): ")?;
        if !is_affirmative(&answer) {
            console.say("\nOperation canceled.");
            return Ok(());
        }
    }
    let deleted = service.eraser().clear_all()?;
    console.say(&format!(
        "\nAll logs have been cleared ({} session(s), {} set(s)).",
        deleted.sessions, deleted.sets
    ));
    Ok(())
}

// ---- Table and CSV output ----

fn header(titles: &[&str], color: Color) -> Vec<Cell> {
    titles.iter().map(|t| Cell::new(t).fg(color)).collect()
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn print_sessions(sessions: &[WorkoutSession], output: &Output) -> Result<()> {
    if output.csv {
        let mut writer = csv::Writer::from_writer(io::stdout());
        writer.write_record(["Session_ID", "Date_Time", "Target_Muscle"])?;
        for session in sessions {
            writer.write_record([
                session.session_id.to_string(),
                session.timestamp.clone(),
                session.target_muscle_group.clone(),
            ])?;
        }
        writer.flush()?;
        return Ok(());
    }

    let mut table = new_table();
    table.set_header(header(
        &["Session ID", "Date & Time", "Target Muscle"],
        output.header_color,
    ));
    for session in sessions {
        table.add_row(vec![
            Cell::new(session.session_id),
            Cell::new(&session.timestamp),
            Cell::new(&session.target_muscle_group),
        ]);
    }
    println!("\nWorkout Sessions:\n{table}");
    Ok(())
}

pub fn print_sets(sets: &[ExerciseSet], output: &Output) -> Result<()> {
    if output.csv {
        let mut writer = csv::Writer::from_writer(io::stdout());
        writer.write_record(["Set_ID", "Session_ID", "Exercise", "Set", "Weight_kg", "Reps"])?;
        for set in sets {
            writer.write_record([
                set.set_id.to_string(),
                set.session_id.to_string(),
                set.exercise_name.clone(),
                set.set_number.to_string(),
                format!("{:.2}", set.weight),
                set.reps.to_string(),
            ])?;
        }
        writer.flush()?;
        return Ok(());
    }

    let mut table = new_table();
    table.set_header(header(
        &["Set ID", "Session ID", "Exercise", "Set", "Weight (kg)", "Reps"],
        output.header_color,
    ));
    for set in sets {
        table.add_row(vec![
            Cell::new(set.set_id),
            Cell::new(set.session_id),
            Cell::new(&set.exercise_name),
            Cell::new(set.set_number),
            Cell::new(format!("{:.2}", set.weight)),
            Cell::new(set.reps),
        ]);
    }
    println!("\nExercises:\n{table}");
    Ok(())
}

/// One row per position, so each exercise's set numbers, weights and reps line up.
pub fn print_aggregates(aggregates: &BTreeMap<String, ExerciseAggregate>, output: &Output) -> Result<()> {
    if output.csv {
        let mut writer = csv::Writer::from_writer(io::stdout());
        writer.write_record(["Exercise", "Set", "Weight_kg", "Reps"])?;
        for (name, aggregate) in aggregates {
            for i in 0..aggregate.len() {
                writer.write_record([
                    name.clone(),
                    aggregate.set_numbers[i].to_string(),
                    format!("{:.2}", aggregate.weights[i]),
                    aggregate.reps[i].to_string(),
                ])?;
            }
        }
        writer.flush()?;
        return Ok(());
    }

    let mut table = new_table();
    table.set_header(header(
        &["Exercise", "Set", "Weight (kg)", "Reps"],
        output.header_color,
    ));
    for (name, aggregate) in aggregates {
        for i in 0..aggregate.len() {
            table.add_row(vec![
                Cell::new(if i == 0 { name.as_str() } else { "" }),
                Cell::new(aggregate.set_numbers[i]),
                Cell::new(format!("{:.2}", aggregate.weights[i])),
                Cell::new(aggregate.reps[i]),
            ]);
        }
    }
    println!("\nExercises across all sessions:\n{table}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use workout_log_lib::Config;

    fn test_service() -> Result<AppService> {
        let conn = rusqlite::Connection::open_in_memory()?;
        workout_log_lib::db::init(&conn)?;
        Ok(AppService::with_connection(conn, Config::default()))
    }

    #[test]
    fn finish_returns_command_error_after_closing() -> Result<()> {
        let service = test_service()?;
        let err = finish(service, Err(anyhow::anyhow!("console closed"))).unwrap_err();
        assert_eq!(err.to_string(), "console closed");
        Ok(())
    }

    #[test]
    fn finish_closes_after_success() -> Result<()> {
        finish(test_service()?, Ok(()))
    }

    #[test]
    fn closed_console_in_menu_still_reaches_close() -> Result<()> {
        let mut service = test_service()?;
        let mut console = workout_log_lib::ScriptedConsole::default();
        let output = Output {
            csv: false,
            header_color: Color::Green,
        };
        let result = dispatch(None, &mut service, &mut console, &output);
        assert!(result.is_err());
        assert!(finish(service, result).is_err());
        Ok(())
    }
}
