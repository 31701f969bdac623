// src/menu.rs
use anyhow::Result;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use workout_log_lib::{AppService, Console, DbError, SystemClock};

use crate::Output;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum MenuCommand {
    LogWorkout,
    ViewLogs,
    DeleteLog,
    ClearAll,
    Exit,
}

impl MenuCommand {
    pub const fn code(self) -> &'static str {
        match self {
            MenuCommand::LogWorkout => "1",
            MenuCommand::ViewLogs => "2",
            MenuCommand::DeleteLog => "3",
            MenuCommand::ClearAll => "4",
            MenuCommand::Exit => "5",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            MenuCommand::LogWorkout => "Log New Workout",
            MenuCommand::ViewLogs => "View Workout Logs",
            MenuCommand::DeleteLog => "Delete Log",
            MenuCommand::ClearAll => "Clear All Logs",
            MenuCommand::Exit => "Exit",
        }
    }
}

impl TryFrom<&str> for MenuCommand {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let code = value.trim();
        MenuCommand::iter()
            .find(|command| command.code() == code)
            .ok_or_else(|| code.to_string())
    }
}

/// Runs the menu until the user exits or the console closes.
///
/// Storage errors are reported and the menu keeps going; anything else ends the session.
pub fn run(service: &mut AppService, console: &mut dyn Console, output: &Output) -> Result<()> {
    let clock = SystemClock;
    loop {
        console.say("\nWorkout Tracker");
        for command in MenuCommand::iter() {
            console.say(&format!("{}. {}", command.code(), command.label()));
        }

        let choice = console.ask("Enter your choice: ")?;
        let Ok(command) = MenuCommand::try_from(choice.as_str()) else {
            console.say("Invalid choice! Please enter a valid option.");
            continue;
        };

        let result = match command {
            MenuCommand::LogWorkout => crate::run_log(service, console, &clock),
            MenuCommand::ViewLogs => view(service, console, output),
            MenuCommand::DeleteLog => delete(service, console, output),
            MenuCommand::ClearAll => crate::clear_logs(service, console, false),
            MenuCommand::Exit => return Ok(()),
        };

        match result {
            Ok(()) => {}
            Err(e) if e.downcast_ref::<DbError>().is_some() => {
                console.say(&format!("Database error: {e:#}"));
            }
            Err(e) => return Err(e),
        }
    }
}

fn view(service: &AppService, console: &mut dyn Console, output: &Output) -> Result<()> {
    let aggregate = workout_log_lib::prompt::ask_yes_no(
        console,
        "Group sets by exercise across all sessions? (y/n): ",
    )?;
    crate::show_logs(
        service,
        console,
        output,
        crate::cli::ViewArgs {
            aggregate,
            no_sessions: false,
        },
    )
}

fn delete(service: &mut AppService, console: &mut dyn Console, output: &Output) -> Result<()> {
    console.say("\n1. Delete a Workout Session");
    console.say("2. Delete a Specific Exercise Set");

    match console.ask("Choose the option (1 or 2): ")?.trim() {
        "1" => {
            let Some(sessions) = service.viewer().sessions()?.found() else {
                console.say("\nNo sessions to delete!");
                return Ok(());
            };
            crate::print_sessions(&sessions, output)?;
            let Some(id) = ask_id(console, "Enter the Session ID to delete: ")? else {
                return Ok(());
            };
            crate::delete_session(service, console, id)
        }
        "2" => {
            let Some(sets) = service.viewer().sets()?.found() else {
                console.say("\nNo exercise sets to delete!");
                return Ok(());
            };
            crate::print_sets(&sets, output)?;
            let Some(id) = ask_id(console, "Enter the Set ID to delete: ")? else {
                return Ok(());
            };
            crate::delete_set(service, console, id)
        }
        _ => {
            console.say("Invalid choice.");
            Ok(())
        }
    }
}

fn ask_id(console: &mut dyn Console, prompt: &str) -> Result<Option<i64>> {
    let input = console.ask(prompt)?;
    match workout_log_lib::prompt::parse_number::<i64>("ID", &input) {
        Ok(id) => Ok(Some(id)),
        Err(e) => {
            console.say(&format!("{e}. Nothing was deleted."));
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comfy_table::Color;
    use workout_log_lib::{Config, ScriptedConsole};

    fn test_service() -> Result<AppService> {
        let conn = rusqlite::Connection::open_in_memory()?;
        workout_log_lib::db::init(&conn)?;
        Ok(AppService::with_connection(conn, Config::default()))
    }

    fn table_output() -> Output {
        Output {
            csv: false,
            header_color: Color::Green,
        }
    }

    fn seed_session(service: &AppService) -> Result<i64> {
        let id = service
            .sessions()
            .create_session("01-01-2024 | 09:30 AM", "Chest")?;
        let entry = workout_log_lib::SetEntry::new(1, 80.0, 8)?;
        service.sets().add_sets(id, "Bench Press", &[entry])?;
        Ok(id)
    }

    #[test]
    fn codes_map_to_commands() {
        assert_eq!(MenuCommand::try_from("1"), Ok(MenuCommand::LogWorkout));
        assert_eq!(MenuCommand::try_from(" 5 "), Ok(MenuCommand::Exit));
        assert!(MenuCommand::try_from("6").is_err());
        assert!(MenuCommand::try_from("").is_err());
    }

    #[test]
    fn storage_error_is_reported_and_menu_continues() -> Result<()> {
        let mut service = test_service()?;
        seed_session(&service)?;
        service.conn.execute("DROP TABLE workout_exercises", [])?;

        let mut console = ScriptedConsole::new(["2", "n", "5"]);
        run(&mut service, &mut console, &table_output())?;

        assert!(console.printed("Database error:"));
        let menu_prompts = console
            .prompts
            .iter()
            .filter(|p| p.as_str() == "Enter your choice: ")
            .count();
        assert_eq!(menu_prompts, 2);
        assert_eq!(console.remaining(), 0);
        Ok(())
    }

    #[test]
    fn closed_console_ends_the_menu_with_an_error() -> Result<()> {
        let mut service = test_service()?;
        let mut console = ScriptedConsole::default();

        let err = run(&mut service, &mut console, &table_output()).unwrap_err();
        assert!(err.downcast_ref::<DbError>().is_none());
        assert!(!console.printed("Database error:"));
        Ok(())
    }

    #[test]
    fn non_numeric_session_id_deletes_nothing() -> Result<()> {
        let mut service = test_service()?;
        let id = seed_session(&service)?;

        let mut console = ScriptedConsole::new(["1", "abc"]);
        delete(&mut service, &mut console, &table_output())?;

        assert!(console.printed("Nothing was deleted."));
        assert!(service.sessions().session_exists(id)?);
        assert_eq!(service.sessions().list_sessions()?.len(), 1);
        assert_eq!(service.sets().list_by_session()?.len(), 1);
        Ok(())
    }

    #[test]
    fn non_numeric_set_id_deletes_nothing() -> Result<()> {
        let mut service = test_service()?;
        seed_session(&service)?;

        let mut console = ScriptedConsole::new(["2", "1.5"]);
        delete(&mut service, &mut console, &table_output())?;

        assert!(console.printed("Nothing was deleted."));
        assert_eq!(service.sets().list_by_session()?.len(), 1);
        Ok(())
    }

    #[test]
    fn clear_is_cancelled_unless_confirmed() -> Result<()> {
        let mut service = test_service()?;
        assert!(service.config.confirm_clear);
        seed_session(&service)?;

        let mut console = ScriptedConsole::new(["n"]);
        crate::clear_logs(&mut service, &mut console, false)?;

        assert!(console.printed("Operation canceled."));
        assert_eq!(service.sessions().list_sessions()?.len(), 1);
        assert_eq!(service.sets().list_by_session()?.len(), 1);
        Ok(())
    }

    #[test]
    fn clear_from_menu_with_yes_removes_everything() -> Result<()> {
        let mut service = test_service()?;
        seed_session(&service)?;

        let mut console = ScriptedConsole::new(["4", "y", "5"]);
        run(&mut service, &mut console, &table_output())?;

        assert!(console.printed("All logs have been cleared (1 session(s), 1 set(s))."));
        assert!(service.sessions().list_sessions()?.is_empty());
        Ok(())
    }
}
