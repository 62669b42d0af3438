use crate::engine::{Engine, EngineError, ManualClock};
use crate::model::*;

/// One line of console input.
#[derive(Debug, PartialEq)]
pub enum Command {
    Enter { vehicle: Vehicle },
    Exit { ticket: TicketId },
    Leave { plate: String },
    Free { category: VehicleCategory, floor: Option<u32> },
    Status,
    Advance { minutes: u32 },
    Help,
}

pub fn parse_command(line: &str) -> Result<Command, ConsoleError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(ConsoleError::Empty);
    };
    let args: Vec<&str> = words.collect();

    match verb.to_ascii_lowercase().as_str() {
        "enter" | "park" => {
            let [plate, category] = expect_args::<2>("enter", &args)?;
            Ok(Command::Enter {
                vehicle: Vehicle::new(plate, parse_category(category)?),
            })
        }
        "exit" => {
            let [ticket] = expect_args::<1>("exit", &args)?;
            let ticket = ticket
                .parse()
                .map_err(|_| ConsoleError::Parse(format!("not a ticket id: {ticket}")))?;
            Ok(Command::Exit { ticket })
        }
        "leave" => {
            let [plate] = expect_args::<1>("leave", &args)?;
            Ok(Command::Leave {
                plate: plate.to_string(),
            })
        }
        "free" => match args.as_slice() {
            [category] => Ok(Command::Free {
                category: parse_category(category)?,
                floor: None,
            }),
            [category, floor] => Ok(Command::Free {
                category: parse_category(category)?,
                floor: Some(
                    floor
                        .parse()
                        .map_err(|_| ConsoleError::Parse(format!("not a floor: {floor}")))?,
                ),
            }),
            _ => Err(ConsoleError::WrongArity {
                verb: "free",
                min: 1,
                max: 2,
                got: args.len(),
            }),
        },
        "status" => Ok(Command::Status),
        "advance" => {
            let [minutes] = expect_args::<1>("advance", &args)?;
            let minutes = minutes
                .parse()
                .map_err(|_| ConsoleError::Parse(format!("not a number of minutes: {minutes}")))?;
            Ok(Command::Advance { minutes })
        }
        "help" => Ok(Command::Help),
        other => Err(ConsoleError::Unsupported(other.to_string())),
    }
}

fn expect_args<'a, const N: usize>(
    verb: &'static str,
    args: &[&'a str],
) -> Result<[&'a str; N], ConsoleError> {
    <[&str; N]>::try_from(args).map_err(|_| ConsoleError::WrongArity {
        verb,
        min: N,
        max: N,
        got: args.len(),
    })
}

fn parse_category(s: &str) -> Result<VehicleCategory, ConsoleError> {
    s.parse()
        .map_err(|_| ConsoleError::Parse(format!("unknown category: {s}")))
}

pub const HELP: &str = "commands: enter <plate> <category> | exit <ticket> | leave <plate> | \
free <category> [floor] | status | advance <minutes> | help";

/// Run a command and render the one-line answer.
pub async fn execute(
    engine: &Engine,
    clock: Option<&ManualClock>,
    cmd: Command,
) -> Result<String, ConsoleError> {
    match cmd {
        Command::Enter { vehicle } => {
            let ticket = engine.enter(vehicle).await?;
            Ok(format!("ticket {} at {}", ticket.id, ticket.location))
        }
        Command::Exit { ticket } => {
            let receipt = engine.exit(ticket).await?;
            Ok(render_receipt(&receipt))
        }
        Command::Leave { plate } => {
            let receipt = engine.exit_by_plate(&plate).await?;
            Ok(render_receipt(&receipt))
        }
        Command::Free { category, floor: None } => {
            Ok(format!("{} free {category}", engine.free_count(category).await))
        }
        Command::Free { category, floor: Some(floor) } => {
            let n = engine.free_count_on_floor(floor, category).await?;
            Ok(format!("{n} free {category} on floor {floor}"))
        }
        Command::Status => {
            let snapshot = engine.snapshot().await;
            serde_json::to_string(&snapshot).map_err(|e| ConsoleError::Parse(e.to_string()))
        }
        Command::Advance { minutes } => {
            let clock = clock.ok_or(ConsoleError::ClockNotManual)?;
            clock.advance(Ms::from(minutes) * 60_000);
            Ok(format!("clock advanced {minutes} min"))
        }
        Command::Help => Ok(HELP.to_string()),
    }
}

fn render_receipt(receipt: &Receipt) -> String {
    format!(
        "{} left {} after {} min, fee {}",
        receipt.ticket.vehicle.plate,
        receipt.ticket.location,
        receipt.stay.duration_ms() / 60_000,
        receipt.fee
    )
}

// ── Errors ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ConsoleError {
    Empty,
    Parse(String),
    Unsupported(String),
    WrongArity {
        verb: &'static str,
        min: usize,
        max: usize,
        got: usize,
    },
    ClockNotManual,
    Engine(EngineError),
}

impl From<EngineError> for ConsoleError {
    fn from(e: EngineError) -> Self {
        ConsoleError::Engine(e)
    }
}

impl std::fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsoleError::Empty => write!(f, "empty command"),
            ConsoleError::Parse(s) => write!(f, "parse error: {s}"),
            ConsoleError::Unsupported(s) => write!(f, "unsupported: {s}"),
            ConsoleError::WrongArity { verb, min, max, got } if min == max => {
                write!(f, "{verb}: expected {min} arguments, got {got}")
            }
            ConsoleError::WrongArity { verb, min, max, got } => {
                write!(f, "{verb}: expected {min} or {max} arguments, got {got}")
            }
            ConsoleError::ClockNotManual => {
                write!(f, "clock is not manual (set PARKLOT_MANUAL_CLOCK=1)")
            }
            ConsoleError::Engine(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ConsoleError {}
