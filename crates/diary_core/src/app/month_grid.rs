//! Headless month grid widget.
//!
//! A 6x7 Sunday-first grid that also renders the trailing days of the
//! previous month and the leading days of the next one. Terminal hosts and
//! tests drive it in place of a GUI date picker.

use crate::app::calendar::{CalendarEvent, CalendarWidget};
use crate::dates::date_to_cell_timestamp_in;
use crate::model::entry::DateKey;
use chrono::{Datelike, Days, Local, Months, NaiveDate, TimeZone};

const GRID_CELLS: u64 = 42;
const WEEKDAY_HEADER: &str = "Su  Mo  Tu  We  Th  Fr  Sa";

/// One rendered day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    pub date: NaiveDate,
    /// Epoch millis of local midnight.
    pub timestamp_ms: i64,
    /// `false` for days borrowed from adjacent months.
    pub in_month: bool,
    pub has_entry: bool,
}

pub struct MonthGrid<Tz: TimeZone = Local> {
    tz: Tz,
    month_start: NaiveDate,
    cells: Vec<GridCell>,
}

impl MonthGrid<Local> {
    /// Grid for the month containing `date` in the local zone.
    pub fn showing(date: DateKey) -> Self {
        Self::showing_in(date, Local)
    }
}

impl<Tz: TimeZone> MonthGrid<Tz> {
    /// Grid for the month containing `date`, rendered in `tz`.
    pub fn showing_in(date: DateKey, tz: Tz) -> Self {
        let month_start = date.date().with_day(1).unwrap_or(date.date());
        let mut grid = Self {
            tz,
            month_start,
            cells: Vec::new(),
        };
        grid.render_cells();
        grid
    }

    pub fn year(&self) -> i32 {
        self.month_start.year()
    }

    pub fn month(&self) -> u32 {
        self.month_start.month()
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Moves to the next month; returns the event a picker would emit.
    pub fn next_month(&mut self) -> CalendarEvent {
        if let Some(next) = self.month_start.checked_add_months(Months::new(1)) {
            self.month_start = next;
            self.render_cells();
        }
        CalendarEvent::MonthChanged
    }

    /// Moves to the previous month; returns the event a picker would emit.
    pub fn previous_month(&mut self) -> CalendarEvent {
        if let Some(previous) = self.month_start.checked_sub_months(Months::new(1)) {
            self.month_start = previous;
            self.render_cells();
        }
        CalendarEvent::MonthChanged
    }

    /// Clicks the first rendered cell for `date`.
    ///
    /// Returns `None` when the date is not on screen.
    pub fn click(&self, date: DateKey) -> Option<CalendarEvent> {
        self.cells
            .iter()
            .find(|cell| cell.date == date.date())
            .map(|cell| CalendarEvent::DateSelected {
                timestamp_ms: cell.timestamp_ms as f64,
            })
    }

    /// Plain-text rendering; marked days carry a `*`, unmarked days borrowed
    /// from adjacent months a `.`.
    pub fn render(&self) -> String {
        let mut out = format!("{:^26}\n", self.month_start.format("%B %Y").to_string());
        out.push_str(WEEKDAY_HEADER);
        for (index, cell) in self.cells.iter().enumerate() {
            out.push(if index % 7 == 0 { '\n' } else { ' ' });
            let day = cell.date.day();
            let mark = match (cell.has_entry, cell.in_month) {
                (true, _) => '*',
                (false, true) => ' ',
                (false, false) => '.',
            };
            out.push_str(&format!("{day:>2}{mark}"));
        }
        out.push('\n');
        out
    }

    fn render_cells(&mut self) {
        let lead = u64::from(self.month_start.weekday().num_days_from_sunday());
        let Some(first_cell) = self.month_start.checked_sub_days(Days::new(lead)) else {
            self.cells.clear();
            return;
        };

        self.cells = (0..GRID_CELLS)
            .filter_map(|offset| first_cell.checked_add_days(Days::new(offset)))
            .map(|date| GridCell {
                date,
                timestamp_ms: date_to_cell_timestamp_in(date, &self.tz),
                in_month: date.month() == self.month_start.month(),
                has_entry: false,
            })
            .collect();
    }
}

impl<Tz: TimeZone> CalendarWidget for MonthGrid<Tz> {
    fn cell_count(&self) -> usize {
        self.cells.len()
    }

    fn cell_timestamp(&self, index: usize) -> f64 {
        self.cells
            .get(index)
            .map_or(f64::NAN, |cell| cell.timestamp_ms as f64)
    }

    fn has_entry(&self, index: usize) -> bool {
        self.cells.get(index).is_some_and(|cell| cell.has_entry)
    }

    fn set_has_entry(&mut self, index: usize, marked: bool) {
        if let Some(cell) = self.cells.get_mut(index) {
            cell.has_entry = marked;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MonthGrid;
    use crate::app::calendar::{CalendarEvent, CalendarWidget};
    use crate::model::entry::DateKey;
    use chrono::Utc;

    fn key(value: &str) -> DateKey {
        value.parse().expect("valid date key")
    }

    #[test]
    fn grid_starts_on_sunday_and_borrows_adjacent_days() {
        // March 2024 starts on a Friday.
        let grid = MonthGrid::showing_in(key("2024-03-15"), Utc);
        assert_eq!(grid.cell_count(), 42);
        assert_eq!(grid.cells()[0].date.to_string(), "2024-02-25");
        assert!(!grid.cells()[0].in_month);
        assert_eq!(grid.cells()[5].date.to_string(), "2024-03-01");
        assert!(grid.cells()[5].in_month);
        assert_eq!(grid.cells()[41].date.to_string(), "2024-04-06");
    }

    #[test]
    fn navigation_wraps_years_and_emits_month_changed() {
        let mut grid = MonthGrid::showing_in(key("2024-01-10"), Utc);
        assert_eq!(grid.previous_month(), CalendarEvent::MonthChanged);
        assert_eq!((grid.year(), grid.month()), (2023, 12));
        grid.next_month();
        grid.next_month();
        assert_eq!((grid.year(), grid.month()), (2024, 2));
    }

    #[test]
    fn click_emits_cell_midnight_timestamp() {
        let grid = MonthGrid::showing_in(key("2024-03-01"), Utc);
        assert_eq!(
            grid.click(key("2024-03-01")),
            Some(CalendarEvent::DateSelected {
                timestamp_ms: 1_709_251_200_000.0
            })
        );
        assert_eq!(grid.click(key("2024-06-01")), None);
    }

    #[test]
    fn render_marks_days_with_entries() {
        let mut grid = MonthGrid::showing_in(key("2024-03-01"), Utc);
        grid.set_has_entry(5, true);
        let text = grid.render();
        assert!(text.contains("March 2024"));
        assert!(text.contains(" 1*"));
    }
}
