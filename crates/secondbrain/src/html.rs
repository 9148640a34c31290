use anyhow::{Context, Result};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::fs;
use std::path::Path;

use secondbrain_client::{Note, Resource, Stats};

use crate::board::Column;
use crate::calendar::{Cell, DayCell, EventKind, MonthRef, WEEKDAY_LABELS};

/// Write a standalone schedule page to `path`.
pub fn generate_schedule_html(month: MonthRef, cells: &[Cell], path: &Path) -> Result<()> {
    let html = render_schedule(month, cells);
    fs::write(path, html.into_string())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Navigation targets shown in the header.
const NAV: [(&str, &str); 5] = [
    ("/", "Dashboard"),
    ("/tasks", "Tasks"),
    ("/notes", "Notes"),
    ("/resources", "Resources"),
    ("/schedule", "Schedule"),
];

fn layout(title: &str, active: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " · Second Brain" }
                style { (PreEscaped(CSS)) }
            }
            body {
                nav.topnav {
                    span.brand { "Second Brain" }
                    @for (href, label) in NAV {
                        a.active[href == active] href=(href) { (label) }
                    }
                }
                div.container {
                    h1 { (title) }
                    (content)
                }
            }
        }
    }
}

pub fn render_dashboard(stats: &Stats) -> Markup {
    let cards = [
        ("Pending Tasks", stats.pending_tasks.to_string()),
        ("Notes Created", stats.notes_created.to_string()),
        ("Study Hours", stats.study_hours.to_string()),
        ("Focus Score", stats.focus_score.clone()),
    ];

    layout(
        "Dashboard",
        "/",
        html! {
            div.stats-grid {
                @for (label, value) in &cards {
                    div.stat-card {
                        div.stat-value { (value) }
                        div.stat-label { (label) }
                    }
                }
            }
        },
    )
}

pub fn render_schedule(month: MonthRef, cells: &[Cell]) -> Markup {
    let prev = month.prev();
    let next = month.next();

    layout(
        "Schedule",
        "/schedule",
        html! {
            div.month-header {
                a.month-nav href=(schedule_href(prev)) { "‹ " (prev.label()) }
                h2 #month-label { (month.label()) }
                a.month-nav href=(schedule_href(next)) { (next.label()) " ›" }
            }
            div.calendar {
                @for label in WEEKDAY_LABELS {
                    div.weekday { (label) }
                }
                @for cell in cells {
                    @match cell {
                        Cell::Blank { .. } => {
                            div.cell.blank data-key=(cell.key()) {}
                        }
                        Cell::Day(day) => {
                            (render_day(day))
                        }
                    }
                }
            }
        },
    )
}

fn schedule_href(month: MonthRef) -> String {
    format!("/schedule?year={}&month={}", month.year(), month.month1())
}

fn render_day(day: &DayCell) -> Markup {
    html! {
        div.cell.day.today[day.is_today] data-key={"day-" (day.day)} data-date=(day.date) {
            div.day-number { (day.day) }
            @for event in &day.events {
                @let class = match event.kind {
                    EventKind::Task => "event task",
                    EventKind::Session => "event session",
                };
                div class=(class) data-key=(event.key()) {
                    (event.title)
                    @if let Some(minutes) = event.duration_minutes {
                        span.duration { (minutes) " mins" }
                    }
                }
            }
        }
    }
}

pub fn render_board(columns: &[Column<'_>]) -> Markup {
    layout(
        "Tasks",
        "/tasks",
        html! {
            div.board {
                @for column in columns {
                    div.column {
                        div.column-header {
                            (column.status.as_str())
                            span.count { (column.tasks.len()) }
                        }
                        @if column.tasks.is_empty() {
                            div.empty-state { "Nothing here." }
                        }
                        @for task in &column.tasks {
                            div.task-card data-id=(task.id) {
                                div.task-title { (task.title) }
                                @if let Some(description) = &task.description {
                                    div.task-description { (description) }
                                }
                                div.task-meta {
                                    span class={"priority " (task.priority.as_str().to_lowercase())} {
                                        (task.priority.as_str())
                                    }
                                    span.due { (task.due_date.as_deref().unwrap_or("No Date")) }
                                    @for tag in task.tag_list() {
                                        span.tag { (tag) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn render_notes(notes: &[Note]) -> Markup {
    layout(
        "Notes",
        "/notes",
        html! {
            @if notes.is_empty() {
                div.empty-state { p { "No notes yet." } }
            }
            div.card-list {
                @for note in notes {
                    div.note-card data-id=(note.id) {
                        div.note-title { (note.title) }
                        @if let Some(content) = &note.content {
                            div.note-content { (content) }
                        }
                        div.task-meta {
                            @for tag in note.tag_list() {
                                span.tag { (tag) }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn render_resources(resources: &[Resource]) -> Markup {
    layout(
        "Resources",
        "/resources",
        html! {
            @if resources.is_empty() {
                div.empty-state { p { "No resources saved." } }
            }
            div.card-list {
                @for resource in resources {
                    div.resource-card data-id=(resource.id) {
                        div.note-title {
                            @if let Some(url) = &resource.url {
                                a href=(url) target="_blank" rel="noopener" { (resource.title) }
                            } @else {
                                (resource.title)
                            }
                            @if let Some(kind) = &resource.resource_type {
                                span.tag { (kind) }
                            }
                        }
                        div.task-meta {
                            @for tag in resource.tag_list() {
                                span.tag { (tag) }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn render_error(message: &str) -> Markup {
    layout(
        "Something went wrong",
        "",
        html! {
            div.error-box { (message) }
        },
    )
}

const CSS: &str = r#"
* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Inter', sans-serif;
    background: #0f172a;
    color: #e2e8f0;
    min-height: 100vh;
    line-height: 1.4;
}

a {
    color: inherit;
}

.topnav {
    display: flex;
    gap: 20px;
    align-items: center;
    padding: 16px 24px;
    border-bottom: 1px solid rgba(255,255,255,0.08);
}

.topnav .brand {
    font-weight: 800;
    margin-right: 20px;
}

.topnav a {
    color: #94a3b8;
    text-decoration: none;
    font-weight: 600;
}

.topnav a.active {
    color: #818cf8;
}

.container {
    max-width: 1100px;
    margin: 0 auto;
    padding: 32px 24px 60px;
}

h1 {
    font-size: 2em;
    font-weight: 800;
    margin-bottom: 24px;
}

.stats-grid {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
    gap: 24px;
}

.stat-card, .column, .note-card, .resource-card {
    background: rgba(255,255,255,0.04);
    border: 1px solid rgba(255,255,255,0.08);
    border-radius: 12px;
    padding: 20px;
}

.stat-value {
    font-size: 2.2em;
    font-weight: 700;
}

.stat-label {
    color: #94a3b8;
    text-transform: uppercase;
    font-size: 0.8em;
    letter-spacing: 0.08em;
}

.month-header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    margin-bottom: 16px;
}

.month-nav {
    text-decoration: none;
    color: #94a3b8;
}

.calendar {
    display: grid;
    grid-template-columns: repeat(7, 1fr);
    gap: 6px;
}

.weekday {
    text-align: center;
    color: #64748b;
    font-size: 0.8em;
    font-weight: 700;
    text-transform: uppercase;
}

.cell {
    min-height: 110px;
    border-radius: 10px;
    padding: 8px;
}

.cell.day {
    background: rgba(255,255,255,0.03);
    border: 1px solid rgba(255,255,255,0.06);
}

.cell.today {
    border-color: #818cf8;
    box-shadow: 0 0 0 1px #818cf8;
}

.day-number {
    font-weight: 700;
    color: #94a3b8;
    margin-bottom: 6px;
}

.event {
    font-size: 0.8em;
    padding: 4px 8px;
    border-radius: 6px;
    margin-bottom: 4px;
    overflow: hidden;
    text-overflow: ellipsis;
    white-space: nowrap;
}

.event.task {
    background: rgba(99,102,241,0.2);
    color: #c7d2fe;
}

.event.session {
    background: rgba(16,185,129,0.2);
    color: #a7f3d0;
}

.duration {
    display: block;
    font-size: 0.85em;
    opacity: 0.7;
}

.board {
    display: grid;
    grid-template-columns: repeat(3, 1fr);
    gap: 20px;
}

.column-header {
    font-weight: 700;
    display: flex;
    justify-content: space-between;
    margin-bottom: 16px;
}

.task-card {
    background: rgba(15,23,42,0.8);
    border: 1px solid rgba(255,255,255,0.08);
    border-radius: 10px;
    padding: 14px;
    margin-bottom: 12px;
}

.task-title, .note-title {
    font-weight: 700;
    margin-bottom: 6px;
}

.task-description, .note-content {
    color: #94a3b8;
    font-size: 0.9em;
    white-space: pre-wrap;
}

.task-meta {
    display: flex;
    flex-wrap: wrap;
    gap: 8px;
    margin-top: 10px;
    font-size: 0.75em;
}

.priority, .tag {
    padding: 2px 8px;
    border-radius: 6px;
    background: rgba(255,255,255,0.06);
}

.priority.high {
    color: #fb923c;
}

.priority.medium {
    color: #60a5fa;
}

.priority.low {
    color: #94a3b8;
}

.card-list {
    display: grid;
    grid-template-columns: repeat(auto-fill, minmax(280px, 1fr));
    gap: 20px;
}

.empty-state {
    padding: 40px 20px;
    text-align: center;
    color: #64748b;
}

.error-box {
    padding: 20px;
    border-radius: 10px;
    border: 1px solid #f87171;
    color: #fecaca;
}

@media (max-width: 768px) {
    .board {
        grid-template-columns: 1fr;
    }

    .cell {
        min-height: 70px;
    }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::group_by_status;
    use crate::calendar::{generate_grid, CalendarEvent};
    use chrono::NaiveDate;
    use secondbrain_client::{Priority, Task, TaskStatus};

    fn december_cells(events: &[CalendarEvent]) -> Vec<Cell> {
        let today = NaiveDate::from_ymd_opt(2025, 12, 2).unwrap();
        generate_grid(MonthRef::new(2025, 11), events, today)
    }

    #[test]
    fn test_render_schedule_has_month_and_nav() {
        let html = render_schedule(MonthRef::new(2025, 11), &december_cells(&[])).into_string();

        assert!(html.contains("December 2025"));
        assert!(html.contains("/schedule?year=2025&amp;month=11"));
        assert!(html.contains("/schedule?year=2026&amp;month=1"));
        assert_eq!(html.matches("class=\"cell blank\"").count(), 1);
        assert!(html.contains("data-key=\"day-31\""));
        assert!(!html.contains("data-key=\"day-32\""));
    }

    #[test]
    fn test_render_schedule_marks_today_and_events() {
        let events = vec![CalendarEvent {
            id: 4,
            title: "Calculus <review>".to_string(),
            kind: EventKind::Session,
            date: "2025-12-02".to_string(),
            duration_minutes: Some(60),
        }];
        let html = render_schedule(MonthRef::new(2025, 11), &december_cells(&events)).into_string();

        assert!(html.contains("cell day today"));
        assert!(html.contains("data-key=\"session-4\""));
        assert!(html.contains("Calculus &lt;review&gt;"));
        assert!(html.contains("60 mins"));
    }

    #[test]
    fn test_render_board_columns() {
        let tasks = vec![Task {
            id: 1,
            title: "Write summary".to_string(),
            description: None,
            due_date: None,
            is_completed: false,
            priority: Priority::High,
            status: TaskStatus::InProgress,
            tags: Some("exam, history".to_string()),
            project_id: None,
        }];
        let html = render_board(&group_by_status(&tasks)).into_string();

        assert!(html.contains("In Progress"));
        assert!(html.contains("Write summary"));
        assert!(html.contains("priority high"));
        assert!(html.contains("No Date"));
        assert!(html.contains(">history<"));
        assert_eq!(html.matches("Nothing here.").count(), 2);
    }

    #[test]
    fn test_render_dashboard() {
        let stats = Stats {
            pending_tasks: 3,
            notes_created: 12,
            study_hours: 7.5,
            focus_score: "85%".to_string(),
        };
        let html = render_dashboard(&stats).into_string();

        assert!(html.contains("Pending Tasks"));
        assert!(html.contains("7.5"));
        assert!(html.contains("85%"));
    }

    #[test]
    fn test_render_empty_notes_and_resources() {
        assert!(render_notes(&[]).into_string().contains("No notes yet."));
        assert!(render_resources(&[])
            .into_string()
            .contains("No resources saved."));
    }

    #[test]
    fn test_generate_schedule_html_writes_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("schedule.html");

        generate_schedule_html(MonthRef::new(2025, 11), &december_cells(&[]), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<!DOCTYPE html>"));
    }
}
