//! Terminal diary host.
//!
//! # Responsibility
//! - Stand in for the GUI shell: render a month grid, route picks and
//!   navigation to the core, and print status messages.
//! - Stop before presenting an editor when the store cannot be opened.
//! - Keep accepting commands while a month change's highlight listing is
//!   still queued on the store worker.

use chrono::Local;
use diary_core::dates::today_in;
use diary_core::{
    init_from_config, CalendarAction, DateKey, DiaryApp, DiaryConfig, EditorError, MonthGrid,
    Pending, StoreWorker,
};
use log::warn;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

const HELP: &str = "\
commands:
  show              month grid and editor text
  pick YYYY-MM-DD   select a date (navigates to its month when needed)
  next | prev       change month
  write TEXT        replace the editor text (\\n for line breaks)
  append TEXT       add a line to the editor text
  tab               insert two spaces at the cursor
  save              save the text (blank text deletes the entry)
  cells             UTC/+9h dates of every rendered cell
  clear             clear status messages
  quit";

type App<'w> = DiaryApp<&'w StoreWorker, MonthGrid<Local>>;

/// Highlight listing issued for the grid on screen, not yet applied.
type InFlight = Option<Pending<Vec<DateKey>>>;

fn main() -> ExitCode {
    let config = DiaryConfig::default();
    if let Err(err) = init_from_config(&config) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let worker = match StoreWorker::open(&config.db_path) {
        Ok(worker) => worker,
        Err(err) => {
            eprintln!(
                "error: cannot open diary database `{}`: {err}",
                config.db_path.display()
            );
            return ExitCode::FAILURE;
        }
    };

    let today = today_in(&Local);
    let mut app: App<'_> = DiaryApp::new(&worker, MonthGrid::showing(today));
    app.start();
    println!("diary {} ({})", diary_core::core_version(), config.db_path.display());
    print_view(&app);

    match run(&mut app) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(app: &mut App<'_>) -> io::Result<()> {
    let stdin = io::stdin();
    let mut seen_messages = app.messages().messages().len();
    let mut in_flight: InFlight = None;
    prompt()?;
    for line in stdin.lock().lines() {
        let line = line?;
        poll_refresh(app, &mut in_flight);
        let mut redraw_when_listed = false;
        let (command, rest) = line
            .trim()
            .split_once(' ')
            .map_or((line.trim(), ""), |(command, rest)| (command, rest.trim()));

        match command {
            "" => {}
            "help" => println!("{HELP}"),
            "show" => print_view(app),
            "pick" => {
                settle_refresh(app, &mut in_flight);
                pick(app, rest);
            }
            "next" | "prev" => {
                let grid = app.calendar_mut().widget_mut();
                let event = if command == "next" {
                    grid.next_month()
                } else {
                    grid.previous_month()
                };
                if app.calendar().handle_event(event) == Some(CalendarAction::RefreshHighlights) {
                    begin_refresh(app, &mut in_flight);
                    redraw_when_listed = true;
                }
            }
            "write" => app.editor_mut().set_text(rest.replace("\\n", "\n")),
            "append" => {
                let mut text = app.editor().text().to_string();
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(&rest.replace("\\n", "\n"));
                app.editor_mut().set_text(text);
            }
            "tab" => app.editor_mut().insert_tab(),
            "save" => {
                settle_refresh(app, &mut in_flight);
                match app.save() {
                    Ok(_) | Err(EditorError::Repo(_)) => print_grid(app),
                    Err(EditorError::NoBoundDate) => println!("pick a date first"),
                }
            }
            "cells" => {
                for cell in app.calendar().cell_diagnostics() {
                    println!(
                        "{:>2} {:>15} utc={} +9h={}",
                        cell.index, cell.timestamp_ms, cell.dates.utc, cell.dates.alternate
                    );
                }
            }
            "clear" => {
                app.messages_mut().clear();
                seen_messages = 0;
            }
            "quit" | "exit" => break,
            other => println!("unknown command `{other}`; try `help`"),
        }

        if poll_refresh(app, &mut in_flight) && redraw_when_listed {
            print_grid(app);
        } else if redraw_when_listed {
            println!("highlights loading; `show` redraws the grid");
        }

        let messages = app.messages().messages();
        for message in messages.iter().skip(seen_messages) {
            println!("> {message}");
        }
        seen_messages = messages.len();
        prompt()?;
    }
    Ok(())
}

/// Clears the marks and queues the key listing for the grid on screen.
fn begin_refresh(app: &mut App<'_>, in_flight: &mut InFlight) {
    app.calendar_mut().clear_marks();
    *in_flight = Some(app.repo().submit_list_dates());
}

/// Applies the queued listing once it completed. Returns whether it did.
fn poll_refresh(app: &mut App<'_>, in_flight: &mut InFlight) -> bool {
    let Some(listed) = in_flight.as_mut().and_then(Pending::try_take) else {
        return false;
    };
    *in_flight = None;
    app.finish_highlight_refresh(listed);
    true
}

/// Blocks on the queued listing so a newer synchronous refresh lands last.
fn settle_refresh(app: &mut App<'_>, in_flight: &mut InFlight) {
    if let Some(pending) = in_flight.take() {
        app.finish_highlight_refresh(pending.wait());
    }
}

fn pick(app: &mut App<'_>, raw: &str) {
    let date: DateKey = match raw.parse() {
        Ok(date) => date,
        Err(err) => {
            println!("{err}");
            return;
        }
    };

    if app.calendar().widget().click(date).is_none() {
        *app.calendar_mut().widget_mut() = MonthGrid::showing(date);
        app.refresh_highlights();
    }
    match app.calendar().widget().click(date) {
        Some(event) => app.handle_calendar_event(event),
        None => warn!("event=pick module=cli status=skip reason=date_not_rendered"),
    }
    print_view(app);
}

fn print_view(app: &App<'_>) {
    print_grid(app);
    match app.editor().bound_date() {
        Some(date) => println!("--- {date} ---"),
        None => println!("--- (no date) ---"),
    }
    println!("{}", app.editor().text());
}

fn print_grid(app: &App<'_>) {
    let grid = app.calendar().widget();
    print!("{}", grid.render());
    println!("{} day(s) marked", app.calendar().marked_cells().len());
}

fn prompt() -> io::Result<()> {
    print!("diary> ");
    io::stdout().flush()
}
