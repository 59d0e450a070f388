use annoyer_core::{format_duration, Annoyer, AlarmSound, Event, Outcome, SilentSound};
use chrono::Utc;
use std::io::BufRead;
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use super::open_store;
use crate::bell::TerminalBell;

/// Threshold change per `+` / `-`.
const THRESHOLD_STEP: f64 = 0.05;

/// One line typed by the user.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Input {
    Press(Outcome),
    ThresholdUp,
    ThresholdDown,
    Status,
    ToggleGraph,
    Restart,
    Help,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let input = match line {
        "+" => Input::ThresholdUp,
        "-" => Input::ThresholdDown,
        "s" | "status" => Input::Status,
        "t" | "graph" => Input::ToggleGraph,
        "x" | "restart" => Input::Restart,
        "h" | "?" | "help" => Input::Help,
        "q" | "quit" | "exit" => Input::Quit,
        other => Input::Press(other.parse().ok()?),
    };
    Some(input)
}

const HELP: &str = "\
  r / y / g   check in (red: got distracted, yellow: so-so, green: on task)
  + / -       raise / lower the alarm threshold
  s           show status
  t           toggle the history graph setting
  x           restart the period without recording it
  q           quit";

fn status_line<S: AlarmSound>(annoyer: &Annoyer<S>) -> String {
    format!(
        "[{:?}] P(distraction | t={}) = {:.4}, threshold {:.2}%, alarm in {}, period {}",
        annoyer.current_state(),
        format_duration(annoyer.elapsed_seconds()),
        annoyer.current_probability(),
        annoyer.settings().alarm_threshold * 100.0,
        format_duration(annoyer.remaining_seconds()),
        format_duration(annoyer.settings().base_period_sec),
    )
}

fn report(event: &Event) {
    match serde_json::to_string(event) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::warn!(error = %e, "cannot serialize event"),
    }
}

/// Drive the alarm from stdin until `q` or end of input.
pub fn run(file: Option<&Path>, tick_ms: u64) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(file)?;
    let mut annoyer = Annoyer::new(store, TerminalBell::default(), Utc::now());
    let tick = Duration::from_millis(tick_ms.max(1));

    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    println!("{HELP}");
    println!("{}", status_line(&annoyer));

    loop {
        let input = match rx.recv_timeout(tick) {
            Ok(line) => parse_input(&line),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Input::Quit),
        };

        if let Some(input) = input {
            if !matches!(input, Input::ThresholdUp | Input::ThresholdDown) {
                // A run of +/- is one adjustment; write it once it ends.
                if let Err(e) = annoyer.flush() {
                    eprintln!("error: {e}");
                }
            }
            match input {
                Input::Quit => break,
                Input::Help => println!("{HELP}"),
                Input::Status => println!("{}", status_line(&annoyer)),
                Input::Press(outcome) => match annoyer.acknowledge(outcome, Utc::now()) {
                    Ok(event) => report(&event),
                    Err(e) => eprintln!("error: {e}"),
                },
                Input::ThresholdUp | Input::ThresholdDown => {
                    let step = if input == Input::ThresholdUp {
                        THRESHOLD_STEP
                    } else {
                        -THRESHOLD_STEP
                    };
                    let target = annoyer.settings().alarm_threshold + step;
                    match annoyer.set_threshold(target, true) {
                        Ok(events) => events.iter().for_each(report),
                        Err(e) => eprintln!("error: {e}"),
                    }
                    println!("{}", status_line(&annoyer));
                }
                Input::ToggleGraph => match annoyer.toggle_graph() {
                    Ok(show) => println!("show_graph = {show}"),
                    Err(e) => eprintln!("error: {e}"),
                },
                Input::Restart => report(&annoyer.restart_period(Utc::now())),
            }
        }

        for event in annoyer.tick(Utc::now()) {
            report(&event);
        }
    }

    annoyer.flush()?;
    Ok(())
}

/// Print the snapshot of a period starting now.
pub fn status(file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(file)?;
    let annoyer = Annoyer::new(store, SilentSound, Utc::now());
    println!("{}", serde_json::to_string_pretty(&annoyer.snapshot())?);
    Ok(())
}
