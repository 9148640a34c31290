use secondbrain_client::{ApiClient, ApiError, StudySession, Task};
use tracing::debug;

use crate::calendar::{CalendarEvent, EventKind};

/// Turn tasks (by due date) and study sessions (by date) into calendar
/// events. Items without a date are skipped.
pub fn collect_events(tasks: &[Task], sessions: &[StudySession]) -> Vec<CalendarEvent> {
    let task_events = tasks.iter().filter_map(|task| {
        task.due_date.as_ref().map(|date| CalendarEvent {
            id: task.id,
            title: task.title.clone(),
            kind: EventKind::Task,
            date: date.clone(),
            duration_minutes: None,
        })
    });

    let session_events = sessions.iter().filter_map(|session| {
        session.date.as_ref().map(|date| CalendarEvent {
            id: session.id,
            title: session.subject.clone(),
            kind: EventKind::Session,
            date: date.clone(),
            duration_minutes: Some(session.duration_minutes),
        })
    });

    task_events.chain(session_events).collect()
}

/// Fetch tasks and study sessions together and project them onto dates.
pub async fn fetch_events(client: &ApiClient) -> Result<Vec<CalendarEvent>, ApiError> {
    let (tasks, sessions) =
        tokio::try_join!(client.list_tasks(), client.list_study_sessions())?;

    let events = collect_events(&tasks, &sessions);
    debug!(
        tasks = tasks.len(),
        sessions = sessions.len(),
        events = events.len(),
        "Loaded schedule"
    );
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secondbrain_client::{Priority, TaskStatus};

    fn make_task(id: i64, title: &str, due_date: Option<&str>) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: None,
            due_date: due_date.map(str::to_string),
            is_completed: false,
            priority: Priority::Medium,
            status: TaskStatus::Todo,
            tags: None,
            project_id: None,
        }
    }

    fn make_session(id: i64, subject: &str, date: Option<&str>) -> StudySession {
        StudySession {
            id,
            subject: subject.to_string(),
            duration_minutes: 45,
            date: date.map(str::to_string),
        }
    }

    #[test]
    fn test_collect_events_skips_undated() {
        let tasks = vec![
            make_task(1, "Essay", Some("2025-12-15")),
            make_task(2, "Someday", None),
        ];
        let sessions = vec![
            make_session(1, "Physics", Some("2025-12-15")),
            make_session(2, "Chemistry", None),
        ];

        let events = collect_events(&tasks, &sessions);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_collect_events_maps_fields() {
        let tasks = vec![make_task(1, "Essay", Some("2025-12-15"))];
        let sessions = vec![make_session(8, "Physics", Some("2025-12-16"))];

        let events = collect_events(&tasks, &sessions);

        assert_eq!(events[0].kind, EventKind::Task);
        assert_eq!(events[0].title, "Essay");
        assert_eq!(events[0].duration_minutes, None);

        assert_eq!(events[1].kind, EventKind::Session);
        assert_eq!(events[1].title, "Physics");
        assert_eq!(events[1].date, "2025-12-16");
        assert_eq!(events[1].duration_minutes, Some(45));
        assert_eq!(events[1].key(), "session-8");
    }

    #[test]
    fn test_collect_events_tasks_first() {
        let tasks = vec![make_task(5, "Essay", Some("2025-12-15"))];
        let sessions = vec![make_session(5, "Physics", Some("2025-12-15"))];

        let kinds: Vec<EventKind> = collect_events(&tasks, &sessions)
            .iter()
            .map(|e| e.kind)
            .collect();
        assert_eq!(kinds, vec![EventKind::Task, EventKind::Session]);
    }
}
