//src/time.rs
use crate::prompt::{Console, InputError, PromptError};
use chrono::{Local, NaiveDateTime};

/// Format accepted from the user, e.g. `01-01-2024 09:30 AM`.
pub const INPUT_FORMAT: &str = "%d-%m-%Y %I:%M %p";
/// Format stored and displayed, e.g. `01-01-2024 | 09:30 AM`.
pub const CANONICAL_FORMAT: &str = "%d-%m-%Y | %I:%M %p";

/// Source of the current local date and time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock frozen at one instant, for tests and replays.
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

pub fn format_canonical(time: &NaiveDateTime) -> String {
    time.format(CANONICAL_FORMAT).to_string()
}

/// Parses manual `DD-MM-YYYY HH:MM AM/PM` input into canonical text.
pub fn parse_manual_timestamp(input: &str) -> Result<String, InputError> {
    NaiveDateTime::parse_from_str(input.trim(), INPUT_FORMAT)
        .map(|time| format_canonical(&time))
        .map_err(|_| {
            InputError::InvalidFormat("Use DD-MM-YYYY HH:MM AM/PM.".to_string())
        })
}

/// Resolves a session timestamp from the clock or from validated console input.
pub struct TimeResolver<'a> {
    clock: &'a dyn Clock,
}

impl<'a> TimeResolver<'a> {
    pub fn new(clock: &'a dyn Clock) -> Self {
        Self { clock }
    }

    /// Keeps asking until a timestamp is obtained; only a closed console ends the loop early.
    pub fn resolve_time(&self, console: &mut dyn Console) -> Result<String, PromptError> {
        loop {
            let choice = console.ask("Do you want to set the current date and time (y/n): ")?;
            match choice.trim().to_lowercase().as_str() {
                "y" => {
                    let formatted = format_canonical(&self.clock.now());
                    console.say(&format!("Current Time: {formatted}"));
                    return Ok(formatted);
                }
                "n" => {
                    let input = console.ask("Enter the date and time (DD-MM-YYYY HH:MM AM/PM): ")?;
                    match parse_manual_timestamp(&input) {
                        Ok(formatted) => {
                            console.say(&format!("Entered Time: {formatted}"));
                            return Ok(formatted);
                        }
                        Err(e) => console.say(&e.to_string()),
                    }
                }
                _ => console.say("Please enter 'y' or 'n' only."),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn manual_input_is_canonicalised() {
        assert_eq!(
            parse_manual_timestamp("01-01-2024 09:30 AM").unwrap(),
            "01-01-2024 | 09:30 AM"
        );
        assert_eq!(
            parse_manual_timestamp("15-06-2023 07:05 pm").unwrap(),
            "15-06-2023 | 07:05 PM"
        );
    }

    #[test]
    fn malformed_input_is_rejected() {
        for bad in ["2024-01-01 9:30", "01-01-2024 13:30 PM", "31-02-2024 10:00 AM", ""] {
            assert!(
                matches!(parse_manual_timestamp(bad), Err(InputError::InvalidFormat(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn clock_time_is_formatted() {
        let time = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(18, 4, 0)
            .unwrap();
        assert_eq!(format_canonical(&time), "09-03-2024 | 06:04 PM");
    }
}
