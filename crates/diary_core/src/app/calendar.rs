//! Calendar view adapter.
//!
//! # Responsibility
//! - Translate widget events into editor/highlight actions.
//! - Keep the widget's "has entry" markers in sync with the store.
//!
//! # Invariants
//! - `refresh_highlights` always clears before marking, so repeated calls
//!   without a store mutation produce the same marked set.
//! - Every rendered cell whose timestamp matches a stored date is marked,
//!   including duplicates across month boundaries.
//! - A failed key listing leaves the widget cleared rather than rolled back.

use crate::dates::{
    date_key_to_cell_timestamp_in, to_date_key_in, to_dual_zone_strings, DualZoneDates,
};
use crate::model::entry::DateKey;
use crate::repo::entry_repo::{EntryRepository, RepoResult};
use chrono::{Local, TimeZone};
use log::{debug, error, warn};
use std::collections::HashSet;

/// Black-box calendar widget seam.
///
/// Cells are addressed by render index; each carries the epoch-millis
/// timestamp of the local midnight it represents.
pub trait CalendarWidget {
    /// Number of day cells currently rendered.
    fn cell_count(&self) -> usize;
    /// Raw per-cell timestamp. May be non-finite for malformed cells.
    fn cell_timestamp(&self, index: usize) -> f64;
    /// Whether the cell currently shows the "has entry" marker.
    fn has_entry(&self, index: usize) -> bool;
    /// Sets or removes the "has entry" marker.
    fn set_has_entry(&mut self, index: usize, marked: bool);
}

/// Events a calendar widget emits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalendarEvent {
    /// The user picked a day; carries the widget's timestamp for that day.
    DateSelected { timestamp_ms: f64 },
    /// The user navigated to another month.
    MonthChanged,
}

/// Follow-up work requested by a calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarAction {
    LoadEntry(DateKey),
    RefreshHighlights,
}

/// Debug projection of one rendered cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellDiagnostic {
    pub index: usize,
    pub timestamp_ms: f64,
    pub dates: DualZoneDates,
}

/// Adapter wrapping a calendar widget.
pub struct CalendarView<W, Tz: TimeZone = Local> {
    widget: W,
    tz: Tz,
}

impl<W: CalendarWidget> CalendarView<W, Local> {
    pub fn new(widget: W) -> Self {
        Self::with_time_zone(widget, Local)
    }
}

impl<W: CalendarWidget, Tz: TimeZone> CalendarView<W, Tz> {
    pub fn with_time_zone(widget: W, tz: Tz) -> Self {
        Self { widget, tz }
    }

    pub fn time_zone(&self) -> &Tz {
        &self.tz
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    /// Maps one widget event to the action it requests.
    ///
    /// Returns `None` for selections carrying an unusable timestamp.
    pub fn handle_event(&self, event: CalendarEvent) -> Option<CalendarAction> {
        match event {
            CalendarEvent::DateSelected { timestamp_ms } => {
                match to_date_key_in(timestamp_ms, &self.tz) {
                    Ok(key) => Some(CalendarAction::LoadEntry(key)),
                    Err(err) => {
                        warn!("event=date_selected module=calendar status=skip error={err}");
                        None
                    }
                }
            }
            CalendarEvent::MonthChanged => Some(CalendarAction::RefreshHighlights),
        }
    }

    /// Re-marks every rendered cell that has a stored entry.
    ///
    /// Returns how many cells were marked.
    pub fn refresh_highlights<R: EntryRepository>(&mut self, repo: &R) -> RepoResult<usize> {
        self.clear_marks();
        match repo.list_dates() {
            Ok(dates) => Ok(self.mark_dates(&dates)),
            Err(err) => {
                error!("event=highlight_refresh module=calendar status=error error={err}");
                Err(err)
            }
        }
    }

    /// Marks exactly the rendered cells whose day is in `dates`.
    ///
    /// Completes a refresh whose key listing ran elsewhere, e.g. through a
    /// `StoreWorker` request. Returns how many cells were marked.
    pub fn mark_dates(&mut self, dates: &[DateKey]) -> usize {
        self.clear_marks();
        let wanted: HashSet<i64> = dates
            .iter()
            .map(|&key| date_key_to_cell_timestamp_in(key, &self.tz))
            .collect();

        let mut marked = 0;
        for index in 0..self.widget.cell_count() {
            let Some(stamp) = whole_millis(self.widget.cell_timestamp(index)) else {
                continue;
            };
            if wanted.contains(&stamp) {
                self.widget.set_has_entry(index, true);
                marked += 1;
            }
        }

        debug!(
            "event=highlight_refresh module=calendar status=ok dates={} marked={}",
            wanted.len(),
            marked
        );
        marked
    }

    /// Removes every "has entry" marker without touching the store.
    pub fn clear_marks(&mut self) {
        for index in 0..self.widget.cell_count() {
            self.widget.set_has_entry(index, false);
        }
    }

    /// Render indices of currently marked cells, ascending.
    pub fn marked_cells(&self) -> Vec<usize> {
        (0..self.widget.cell_count())
            .filter(|&index| self.widget.has_entry(index))
            .collect()
    }

    /// Per-cell timestamp and UTC/alternate-zone dates, skipping malformed cells.
    pub fn cell_diagnostics(&self) -> Vec<CellDiagnostic> {
        let mut cells = Vec::new();
        for index in 0..self.widget.cell_count() {
            let timestamp_ms = self.widget.cell_timestamp(index);
            if !timestamp_ms.is_finite() {
                error!("event=cell_diagnostics module=calendar status=skip index={index} reason=invalid_timestamp");
                continue;
            }
            cells.push(CellDiagnostic {
                index,
                timestamp_ms,
                dates: to_dual_zone_strings(timestamp_ms),
            });
        }
        cells
    }
}

fn whole_millis(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}
