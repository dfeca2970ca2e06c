//! Application context wiring editor, calendar and status log to a store.
//!
//! # Responsibility
//! - Own every piece of UI-facing state for one process run.
//! - Route calendar events and save requests to the right component.
//! - Report each store outcome to the message log.
//!
//! # Invariants
//! - Highlights are recomputed from the store after every successful save.
//! - A failed store call leaves editor and calendar state unchanged and
//!   appends exactly one failure message.

pub mod calendar;
pub mod editor;
pub mod messages;
pub mod month_grid;

use crate::dates::today_in;
use crate::model::entry::{trim_body, DateKey};
use crate::repo::entry_repo::{EntryRepository, RepoResult};
use calendar::{CalendarAction, CalendarEvent, CalendarView, CalendarWidget};
use chrono::{Local, TimeZone};
use editor::{EditorError, EntryEditor, SaveOutcome};
use log::{error, info};
use messages::MessageLog;

/// Single owner of store handle and UI state.
pub struct DiaryApp<R, W, Tz: TimeZone = Local> {
    repo: R,
    calendar: CalendarView<W, Tz>,
    editor: EntryEditor,
    messages: MessageLog,
}

impl<R: EntryRepository, W: CalendarWidget> DiaryApp<R, W, Local> {
    pub fn new(repo: R, widget: W) -> Self {
        Self::with_time_zone(repo, widget, Local)
    }
}

impl<R: EntryRepository, W: CalendarWidget, Tz: TimeZone> DiaryApp<R, W, Tz> {
    /// Builds the context; the editor starts on today in `tz`, unbound.
    pub fn with_time_zone(repo: R, widget: W, tz: Tz) -> Self {
        let editor = EntryEditor::new(today_in(&tz));
        Self {
            repo,
            calendar: CalendarView::with_time_zone(widget, tz),
            editor,
            messages: MessageLog::new(),
        }
    }

    /// Loads the selected date's entry and draws the initial highlights.
    pub fn start(&mut self) {
        let today = self.editor.selected_date();
        self.select_date(today);
        self.refresh_highlights();
    }

    /// Reacts to one widget event.
    pub fn handle_calendar_event(&mut self, event: CalendarEvent) {
        match self.calendar.handle_event(event) {
            Some(CalendarAction::LoadEntry(date)) => {
                self.select_date(date);
            }
            Some(CalendarAction::RefreshHighlights) => self.refresh_highlights(),
            None => {}
        }
    }

    /// Loads `date` into the editor. Returns whether the load succeeded.
    pub fn select_date(&mut self, date: DateKey) -> bool {
        match self.editor.select(&self.repo, date) {
            Ok(()) => {
                info!("event=entry_load module=app status=ok date={date}");
                true
            }
            Err(err) => {
                error!("event=entry_load module=app status=error date={date} error={err}");
                self.messages.append(messages::ENTRY_LOAD_FAILED);
                false
            }
        }
    }

    /// Persists the editor text for the bound date.
    ///
    /// Store failures are reported to the message log and returned.
    ///
    /// # Errors
    /// - `EditorError::NoBoundDate` when nothing was ever loaded; nothing is
    ///   logged to the message area in that case.
    /// - `EditorError::Repo` when the store rejected the write.
    pub fn save(&mut self) -> Result<SaveOutcome, EditorError> {
        let deleting = trim_body(self.editor.text()).is_empty();
        match self.editor.save(&self.repo) {
            Ok(outcome) => {
                info!(
                    "event=entry_save module=app status=ok outcome={outcome:?} date={}",
                    self.editor.selected_date()
                );
                self.messages.append(match outcome {
                    SaveOutcome::Saved => messages::ENTRY_SAVED,
                    SaveOutcome::Deleted => messages::ENTRY_DELETED,
                });
                self.refresh_highlights();
                Ok(outcome)
            }
            Err(EditorError::NoBoundDate) => {
                error!("event=entry_save module=app status=error error_code=no_bound_date");
                Err(EditorError::NoBoundDate)
            }
            Err(err) => {
                error!("event=entry_save module=app status=error error={err}");
                self.messages.append(if deleting {
                    messages::ENTRY_DELETE_FAILED
                } else {
                    messages::ENTRY_SAVE_FAILED
                });
                Err(err)
            }
        }
    }

    /// Re-marks calendar cells from the store, reporting failures.
    pub fn refresh_highlights(&mut self) {
        if self.calendar.refresh_highlights(&self.repo).is_err() {
            self.messages.append(messages::HIGHLIGHTS_FAILED);
        }
    }

    /// Completes a highlight refresh whose key listing was issued without
    /// blocking. Callers clear the marks when they issue the listing.
    ///
    /// Returns whether the listing succeeded.
    pub fn finish_highlight_refresh(&mut self, listed: RepoResult<Vec<DateKey>>) -> bool {
        match listed {
            Ok(dates) => {
                self.calendar.mark_dates(&dates);
                true
            }
            Err(err) => {
                error!("event=highlight_refresh module=app status=error error={err}");
                self.calendar.clear_marks();
                self.messages.append(messages::HIGHLIGHTS_FAILED);
                false
            }
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn calendar(&self) -> &CalendarView<W, Tz> {
        &self.calendar
    }

    pub fn calendar_mut(&mut self) -> &mut CalendarView<W, Tz> {
        &mut self.calendar
    }

    pub fn editor(&self) -> &EntryEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut EntryEditor {
        &mut self.editor
    }

    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    pub fn messages_mut(&mut self) -> &mut MessageLog {
        &mut self.messages
    }
}
