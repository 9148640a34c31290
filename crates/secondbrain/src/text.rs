//! Plain-text month view for the terminal.

use crate::calendar::{CalendarEvent, Cell, EventKind, MonthRef};

const CELL_WIDTH: usize = 5;

/// Render a 7-column month grid followed by the events of each day.
///
/// `*` marks today, `+` marks days with events.
pub fn render_month(month: MonthRef, cells: &[Cell]) -> String {
    let width = CELL_WIDTH * 7;
    let header: String = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"]
        .iter()
        .map(|d| format!("{d:>4} "))
        .collect();

    let mut lines = vec![
        format!("{:^width$}", month.label()),
        header.trim_end().to_string(),
    ];

    for week in cells.chunks(7) {
        let line: String = week.iter().map(format_cell).collect();
        lines.push(line.trim_end().to_string());
    }

    let busy: Vec<_> = cells
        .iter()
        .filter_map(Cell::as_day)
        .filter(|d| !d.events.is_empty())
        .collect();

    if !busy.is_empty() {
        lines.push(String::new());
    }
    for day in busy {
        lines.push(day.date.clone());
        lines.extend(day.events.iter().map(agenda_line));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn agenda_line(event: &CalendarEvent) -> String {
    match (event.kind, event.duration_minutes) {
        (EventKind::Session, Some(minutes)) => {
            format!("  [session] {} ({} mins)", event.title, minutes)
        }
        (EventKind::Session, None) => format!("  [session] {}", event.title),
        (EventKind::Task, _) => format!("  [task]    {}", event.title),
    }
}

fn format_cell(cell: &Cell) -> String {
    match cell {
        Cell::Blank { .. } => " ".repeat(CELL_WIDTH),
        Cell::Day(day) => {
            let marker = if day.is_today {
                '*'
            } else if !day.events.is_empty() {
                '+'
            } else {
                ' '
            };
            format!("{:>4}{}", day.day, marker)
        }
    }
}
