use std::time::Duration;

use clap::{Args, Subcommand};
use deepwork_core::{
    Config, Event, Phase, PhaseDurations, SessionState, SessionTimer, TimerDriver,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use crate::render;

#[derive(Args, Debug, Default)]
pub struct DurationArgs {
    /// Focus phase length in seconds (overrides config)
    #[arg(long)]
    focus_secs: Option<u64>,
    /// Break phase length in seconds (overrides config)
    #[arg(long)]
    break_secs: Option<u64>,
}

impl DurationArgs {
    fn resolve(&self, config: &Config) -> Result<PhaseDurations, Box<dyn std::error::Error>> {
        Ok(PhaseDurations::new(
            self.focus_secs.unwrap_or(config.timer.focus_duration_secs),
            self.break_secs.unwrap_or(config.timer.break_duration_secs),
        )?)
    }
}

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run an interactive session, reading commands from stdin
    Run {
        #[command(flatten)]
        durations: DurationArgs,
        /// Wall-clock milliseconds per countdown second (overrides config)
        #[arg(long)]
        tick_ms: Option<u64>,
        /// Print events as JSON lines instead of a status line
        #[arg(long)]
        json: bool,
    },
    /// Feed a timer N ticks without a clock and print every event as JSON
    Simulate {
        #[command(flatten)]
        durations: DurationArgs,
        /// Number of one-second ticks to apply
        #[arg(long)]
        ticks: u64,
        /// Begin in the Break phase
        #[arg(long)]
        from_break: bool,
        /// Seconds left in the starting phase
        #[arg(long)]
        remaining: Option<u64>,
    },
    /// Print the initial timer state as JSON
    Status {
        #[command(flatten)]
        durations: DurationArgs,
    },
}

enum Command {
    Start,
    Pause,
    Toggle,
    Reset,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "s" | "start" => Some(Command::Start),
        "p" | "pause" => Some(Command::Pause),
        "t" | "toggle" | "" => Some(Command::Toggle),
        "r" | "reset" => Some(Command::Reset),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

pub fn run(action: TimerAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Run {
            durations,
            tick_ms,
            json,
        } => {
            let durations = durations.resolve(config)?;
            let tick_period = match tick_ms {
                Some(0) => return Err("--tick-ms must be non-zero".into()),
                Some(ms) => Duration::from_millis(ms),
                None => config.tick_period()?,
            };
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(interactive(durations, tick_period, json, config))
        }
        TimerAction::Simulate {
            durations,
            ticks,
            from_break,
            remaining,
        } => simulate(durations.resolve(config)?, ticks, from_break, remaining),
        TimerAction::Status { durations } => {
            let timer = SessionTimer::new(durations.resolve(config)?);
            let event = Event::StateSnapshot(timer.snapshot());
            println!("{}", serde_json::to_string_pretty(&event)?);
            Ok(())
        }
    }
}

fn simulate(
    durations: PhaseDurations,
    ticks: u64,
    from_break: bool,
    remaining: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mode = if from_break { Phase::Break } else { Phase::Focus };
    let mut timer = SessionTimer::with_state(
        durations,
        SessionState {
            mode,
            remaining_secs: remaining.unwrap_or_else(|| durations.of(mode)),
            running: false,
            completed_focus_sessions: 0,
        },
    );
    timer.subscribe(|event| match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::warn!(error = %e, "failed to encode event"),
    });

    for _ in 0..ticks {
        // Phase boundaries halt the timer; simulate keeps going.
        timer.start();
        timer.tick();
    }

    println!(
        "{}",
        serde_json::to_string(&Event::StateSnapshot(timer.snapshot()))?
    );
    Ok(())
}

async fn interactive(
    durations: PhaseDurations,
    tick_period: Duration,
    json: bool,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut driver = TimerDriver::new(durations, tick_period);
    let mut state_rx = driver.watch();
    let mut events = driver.events();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let show = |driver: &TimerDriver| -> Result<(), Box<dyn std::error::Error>> {
        if json {
            let snapshot = Event::StateSnapshot(driver.snapshot());
            println!("{}", serde_json::to_string(&snapshot)?);
        } else {
            println!("{}", render::status_line(&driver.snapshot(), &config.display));
        }
        Ok(())
    };

    if !json {
        println!("{}", render::HELP);
    }
    show(&driver)?;
    state_rx.borrow_and_update();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Some(Command::Start) => { driver.start()?; }
                    Some(Command::Pause) => { driver.pause(); }
                    Some(Command::Toggle) => { driver.toggle()?; }
                    Some(Command::Reset) => { driver.reset(); }
                    Some(Command::Quit) => break,
                    None => eprintln!("unknown command: {}\n{}", line.trim(), render::HELP),
                }
            }
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                state_rx.borrow_and_update();
                if !json {
                    show(&driver)?;
                }
            }
            event = events.recv() => match event {
                Ok(Event::PhaseChanged { from, to, .. }) if !json => {
                    println!("{}", render::phase_banner(from, to));
                }
                Ok(event) if json => println!("{}", serde_json::to_string(&event)?),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event stream lagged");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    driver.shutdown();
    if json {
        show(&driver)?;
    }
    Ok(())
}
