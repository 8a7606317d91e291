//! Balloon Math entry point
//!
//! The browser build starts from `platform::web`. Natively this runs a
//! line-oriented front-end that prints a JSON snapshot after every command.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::io::{self, BufRead, Write};
    use std::time::{SystemTime, UNIX_EPOCH};

    use balloon_math::consts::SIM_DT;
    use balloon_math::sim::{FactorSlot, Intent, Operand};
    use balloon_math::{App, Operation, Settings};

    const HELP: &str = "\
commands:
  open <addition|subtraction|multiplication>   back
  add [first|second] [x y]     minus     pop <id>     =     pick <n>
  digit <d>     factor <first|second> <d>
  drag <group> <x> <y>     move <x> <y>     release <x> <y> <in|out>
  drop <group> <x> <y> <in|out>
  wait <ms>     reset     show     help     quit";

    /// One line of input
    #[derive(Debug, PartialEq)]
    pub enum Command {
        Open(Operation),
        Back,
        Intent(Intent),
        Wait(u32),
        Show,
        Help,
        Quit,
    }

    fn num<T: std::str::FromStr>(arg: Option<&str>, what: &str) -> Result<T, String> {
        let arg = arg.ok_or_else(|| format!("missing {what}"))?;
        arg.parse().map_err(|_| format!("bad {what}: {arg}"))
    }

    fn zone(arg: Option<&str>) -> Result<bool, String> {
        match arg {
            Some("in") => Ok(true),
            Some("out") => Ok(false),
            other => Err(format!("expected in|out, got {other:?}")),
        }
    }

    pub fn parse_command(line: &str) -> Result<Command, String> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(Command::Show);
        };

        let intent = match head {
            "open" => {
                let name = words.next().unwrap_or_default();
                let op = Operation::from_str(name).ok_or_else(|| format!("unknown operation: {name}"))?;
                return Ok(Command::Open(op));
            }
            "back" => return Ok(Command::Back),
            "wait" => return Ok(Command::Wait(num(words.next(), "milliseconds")?)),
            "show" => return Ok(Command::Show),
            "help" | "?" => return Ok(Command::Help),
            "quit" | "exit" => return Ok(Command::Quit),
            "add" => {
                let mut rest: Vec<&str> = words.collect();
                let operand = match rest.first().copied() {
                    Some("second") => Operand::Second,
                    Some("first") => Operand::First,
                    _ => {
                        rest.insert(0, "first");
                        Operand::First
                    }
                };
                let x = rest.get(1).map_or(Ok(0.0), |s| num(Some(*s), "x"))?;
                let y = rest.get(2).map_or(Ok(0.0), |s| num(Some(*s), "y"))?;
                Intent::AddCounter { operand, x, y }
            }
            "minus" | "-" => Intent::BeginRemoval,
            "pop" => Intent::RemoveCounter {
                id: num(words.next(), "counter id")?,
            },
            "=" | "confirm" => Intent::Confirm,
            "pick" => Intent::SelectAnswer {
                value: num(words.next(), "answer")?,
            },
            "digit" => Intent::EnterDigit {
                digit: num(words.next(), "digit")?,
            },
            "factor" => {
                let slot = match words.next() {
                    Some("first") => FactorSlot::First,
                    Some("second") => FactorSlot::Second,
                    other => return Err(format!("expected first|second, got {other:?}")),
                };
                Intent::SetFactor {
                    slot,
                    digit: num(words.next(), "digit")?,
                }
            }
            "drag" => Intent::BeginDrag {
                group: num(words.next(), "group id")?,
                x: num(words.next(), "x")?,
                y: num(words.next(), "y")?,
            },
            "move" => Intent::DragTo {
                x: num(words.next(), "x")?,
                y: num(words.next(), "y")?,
            },
            "release" => Intent::EndDrag {
                x: num(words.next(), "x")?,
                y: num(words.next(), "y")?,
                in_zone: zone(words.next())?,
            },
            "drop" => Intent::DropGroup {
                group: num(words.next(), "group id")?,
                x: num(words.next(), "x")?,
                y: num(words.next(), "y")?,
                in_zone: zone(words.next())?,
            },
            "reset" | "new" => Intent::Reset,
            other => return Err(format!("unknown command: {other}")),
        };
        Ok(Command::Intent(intent))
    }

    fn load_settings() -> Settings {
        match std::env::args().nth(1) {
            Some(path) => match std::fs::read_to_string(&path) {
                Ok(json) => {
                    log::info!("Loaded settings from {}", path);
                    Settings::from_json(&json)
                }
                Err(e) => {
                    log::warn!("Could not read {}: {}", path, e);
                    Settings::load()
                }
            },
            None => Settings::load(),
        }
    }

    fn print_snapshot(app: &App, out: &mut impl Write) -> io::Result<()> {
        match serde_json::to_string_pretty(&app.snapshot()) {
            Ok(json) => writeln!(out, "{json}"),
            Err(e) => writeln!(out, "snapshot error: {e}"),
        }
    }

    pub fn run() -> io::Result<()> {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        let mut app = App::new(load_settings(), seed);
        log::info!("Balloon Math (native) starting with seed {}", seed);

        let stdout = io::stdout();
        let mut out = stdout.lock();
        writeln!(out, "{HELP}")?;

        for line in io::stdin().lock().lines() {
            let line = line?;
            match parse_command(&line) {
                Ok(Command::Quit) => break,
                Ok(Command::Help) => writeln!(out, "{HELP}")?,
                Ok(Command::Open(op)) => {
                    app.select(op);
                    writeln!(out, "== {} ==", op.title())?;
                }
                Ok(Command::Back) => app.back(),
                Ok(Command::Wait(ms)) => {
                    let steps = (ms as f32 / 1000.0 / SIM_DT).round() as u32;
                    for _ in 0..steps {
                        app.tick();
                    }
                }
                Ok(Command::Show) => {}
                Ok(Command::Intent(intent)) => {
                    if let Err(rejection) = app.dispatch(intent) {
                        writeln!(out, "ignored: {rejection}")?;
                    }
                }
                Err(e) => {
                    writeln!(out, "{e}")?;
                    continue;
                }
            }
            print_snapshot(&app, &mut out)?;
        }
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = native::run() {
        log::error!("I/O error: {}", e);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
