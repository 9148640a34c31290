//! CRUD subcommands for the CLI.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Subcommand;
use tracing::info;

use secondbrain_client::{
    ApiClient, NewNote, NewResource, NewStudySession, NewTask, Note, Priority, Resource,
    StudySession, Task, TaskStatus,
};

use crate::board;

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Empty strings clear an optional field.
fn non_empty(value: String) -> Option<String> {
    let value = value.trim().to_string();
    (!value.is_empty()).then_some(value)
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// List tasks grouped by status
    List {
        /// Only show one column (todo, in-progress, done)
        #[arg(long)]
        status: Option<TaskStatus>,
    },

    /// Create a task
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
        #[arg(long, default_value = "Medium")]
        priority: Priority,
        #[arg(long, default_value = "Todo")]
        status: TaskStatus,
        /// Comma separated tags
        #[arg(long)]
        tags: Option<String>,
    },

    /// Change fields of a task (an empty value clears the field)
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Due date (YYYY-MM-DD, or "" to clear)
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        tags: Option<String>,
    },

    /// Mark a task as done
    Done { id: i64 },

    /// Delete a task
    Rm { id: i64 },
}

pub async fn run_tasks(client: &ApiClient, command: TaskCommand) -> Result<()> {
    match command {
        TaskCommand::List { status } => {
            let tasks = client.list_tasks().await.context("Failed to fetch tasks")?;
            for column in board::group_by_status(&tasks) {
                if status.as_ref().is_some_and(|s| *s != column.status) {
                    continue;
                }
                println!("{} ({})", column.status, column.tasks.len());
                for task in column.tasks {
                    println!("  {}", task_line(task));
                }
            }
        }
        TaskCommand::Add {
            title,
            description,
            due,
            priority,
            status,
            tags,
        } => {
            let body = NewTask {
                description,
                due_date: due.map(format_date),
                is_completed: status == TaskStatus::Done,
                priority,
                status,
                tags,
                ..NewTask::new(title)
            };
            let task = client.create_task(&body).await.context("Failed to create task")?;
            info!(id = task.id, "Task created");
            println!("{}", task_line(&task));
        }
        TaskCommand::Update {
            id,
            title,
            description,
            due,
            priority,
            status,
            tags,
        } => {
            let mut body = find_task(client, id).await?.to_new();
            if let Some(title) = title {
                body.title = title;
            }
            if let Some(description) = description {
                body.description = non_empty(description);
            }
            if let Some(due) = due {
                body.due_date = match non_empty(due) {
                    Some(d) => Some(format_date(
                        d.parse::<NaiveDate>()
                            .with_context(|| format!("Invalid due date `{d}`"))?,
                    )),
                    None => None,
                };
            }
            if let Some(priority) = priority {
                body.priority = priority;
            }
            if let Some(status) = status {
                body.is_completed = status == TaskStatus::Done;
                body.status = status;
            }
            if let Some(tags) = tags {
                body.tags = non_empty(tags);
            }
            let task = client
                .update_task(id, &body)
                .await
                .context("Failed to update task")?;
            println!("{}", task_line(&task));
        }
        TaskCommand::Done { id } => {
            let mut body = find_task(client, id).await?.to_new();
            body.status = TaskStatus::Done;
            body.is_completed = true;
            let task = client
                .update_task(id, &body)
                .await
                .context("Failed to update task")?;
            println!("{}", task_line(&task));
        }
        TaskCommand::Rm { id } => {
            client.delete_task(id).await.context("Failed to delete task")?;
            info!(id = id, "Task deleted");
        }
    }
    Ok(())
}

async fn find_task(client: &ApiClient, id: i64) -> Result<Task> {
    client
        .list_tasks()
        .await
        .context("Failed to fetch tasks")?
        .into_iter()
        .find(|t| t.id == id)
        .with_context(|| format!("No task with id {id}"))
}

fn task_line(task: &Task) -> String {
    let mut line = format!("#{:<4} [{}] {}", task.id, task.priority, task.title);
    if let Some(due) = &task.due_date {
        line.push_str(&format!("  (due {due})"));
    }
    let tags = task.tag_list();
    if !tags.is_empty() {
        line.push_str(&format!("  #{}", tags.join(" #")));
    }
    line
}

#[derive(Subcommand, Debug)]
pub enum NoteCommand {
    /// List notes
    List,

    /// Create a note
    Add {
        title: String,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        tags: Option<String>,
    },

    /// Change a note (an empty value clears the field)
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        tags: Option<String>,
    },

    /// Delete a note
    Rm { id: i64 },
}

pub async fn run_notes(client: &ApiClient, command: NoteCommand) -> Result<()> {
    match command {
        NoteCommand::List => {
            let notes = client.list_notes().await.context("Failed to fetch notes")?;
            if notes.is_empty() {
                println!("No notes yet.");
            }
            for note in &notes {
                println!("{}", note_line(note));
            }
        }
        NoteCommand::Add {
            title,
            content,
            tags,
        } => {
            let body = NewNote {
                title,
                content,
                tags,
                ..Default::default()
            };
            let note = client.create_note(&body).await.context("Failed to create note")?;
            info!(id = note.id, "Note created");
            println!("{}", note_line(&note));
        }
        NoteCommand::Update {
            id,
            title,
            content,
            tags,
        } => {
            let note = client
                .list_notes()
                .await
                .context("Failed to fetch notes")?
                .into_iter()
                .find(|n| n.id == id)
                .with_context(|| format!("No note with id {id}"))?;
            let mut body = note.to_new();
            if let Some(title) = title {
                body.title = title;
            }
            if let Some(content) = content {
                body.content = non_empty(content);
            }
            if let Some(tags) = tags {
                body.tags = non_empty(tags);
            }
            let note = client
                .update_note(id, &body)
                .await
                .context("Failed to update note")?;
            println!("{}", note_line(&note));
        }
        NoteCommand::Rm { id } => {
            client.delete_note(id).await.context("Failed to delete note")?;
            info!(id = id, "Note deleted");
        }
    }
    Ok(())
}

fn note_line(note: &Note) -> String {
    let mut line = format!("#{:<4} {}", note.id, note.title);
    if let Some(content) = &note.content {
        let first = content.lines().next().unwrap_or_default();
        if !first.is_empty() {
            line.push_str(&format!(" - {first}"));
        }
    }
    line
}

#[derive(Subcommand, Debug)]
pub enum ResourceCommand {
    /// List saved resources
    List,

    /// Save a resource
    Add {
        title: String,
        #[arg(long)]
        url: Option<String>,
        /// Kind of resource (link, pdf, video, ...)
        #[arg(long = "type", default_value = "link")]
        kind: String,
        #[arg(long)]
        tags: Option<String>,
    },

    /// Delete a resource
    Rm { id: i64 },
}

pub async fn run_resources(client: &ApiClient, command: ResourceCommand) -> Result<()> {
    match command {
        ResourceCommand::List => {
            let resources = client
                .list_resources()
                .await
                .context("Failed to fetch resources")?;
            if resources.is_empty() {
                println!("No resources saved.");
            }
            for resource in &resources {
                println!("{}", resource_line(resource));
            }
        }
        ResourceCommand::Add {
            title,
            url,
            kind,
            tags,
        } => {
            let body = NewResource {
                title,
                url,
                resource_type: non_empty(kind),
                tags,
            };
            let resource = client
                .create_resource(&body)
                .await
                .context("Failed to create resource")?;
            info!(id = resource.id, "Resource created");
            println!("{}", resource_line(&resource));
        }
        ResourceCommand::Rm { id } => {
            client
                .delete_resource(id)
                .await
                .context("Failed to delete resource")?;
            info!(id = id, "Resource deleted");
        }
    }
    Ok(())
}

fn resource_line(resource: &Resource) -> String {
    format!(
        "#{:<4} [{}] {} {}",
        resource.id,
        resource.resource_type.as_deref().unwrap_or("-"),
        resource.title,
        resource.url.as_deref().unwrap_or_default()
    )
    .trim_end()
    .to_string()
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// List study sessions
    List,

    /// Schedule a study session
    Add {
        subject: String,
        /// Length in minutes
        #[arg(long, default_value = "60")]
        minutes: i32,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Change a study session
    Update {
        id: i64,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        minutes: Option<i32>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Delete a study session
    Rm { id: i64 },
}

pub async fn run_sessions(
    client: &ApiClient,
    command: SessionCommand,
    today: NaiveDate,
) -> Result<()> {
    match command {
        SessionCommand::List => {
            let sessions = client
                .list_study_sessions()
                .await
                .context("Failed to fetch study sessions")?;
            for session in &sessions {
                println!("{}", session_line(session));
            }
            let minutes: i64 = sessions.iter().map(|s| i64::from(s.duration_minutes)).sum();
            println!("Total: {:.1} hours", minutes as f64 / 60.0);
        }
        SessionCommand::Add {
            subject,
            minutes,
            date,
        } => {
            let body = NewStudySession {
                subject,
                duration_minutes: minutes,
                date: Some(format_date(date.unwrap_or(today))),
            };
            let session = client
                .create_study_session(&body)
                .await
                .context("Failed to create study session")?;
            info!(id = session.id, "Study session created");
            println!("{}", session_line(&session));
        }
        SessionCommand::Update {
            id,
            subject,
            minutes,
            date,
        } => {
            let session = client
                .list_study_sessions()
                .await
                .context("Failed to fetch study sessions")?
                .into_iter()
                .find(|s| s.id == id)
                .with_context(|| format!("No study session with id {id}"))?;
            let mut body = session.to_new();
            if let Some(subject) = subject {
                body.subject = subject;
            }
            if let Some(minutes) = minutes {
                body.duration_minutes = minutes;
            }
            if let Some(date) = date {
                body.date = Some(format_date(date));
            }
            let session = client
                .update_study_session(id, &body)
                .await
                .context("Failed to update study session")?;
            println!("{}", session_line(&session));
        }
        SessionCommand::Rm { id } => {
            client
                .delete_study_session(id)
                .await
                .context("Failed to delete study session")?;
            info!(id = id, "Study session deleted");
        }
    }
    Ok(())
}

fn session_line(session: &StudySession) -> String {
    format!(
        "#{:<4} {} {} ({} mins)",
        session.id,
        session.date.as_deref().unwrap_or("----------"),
        session.subject,
        session.duration_minutes
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("  ".to_string()), None);
        assert_eq!(non_empty(" rust ".to_string()), Some("rust".to_string()));
    }

    #[test]
    fn test_task_line() {
        let task = Task {
            id: 3,
            title: "Essay".to_string(),
            description: None,
            due_date: Some("2025-12-15".to_string()),
            is_completed: false,
            priority: Priority::High,
            status: TaskStatus::Todo,
            tags: Some("school, writing".to_string()),
            project_id: None,
        };
        assert_eq!(
            task_line(&task),
            "#3    [High] Essay  (due 2025-12-15)  #school #writing"
        );
    }

    #[test]
    fn test_resource_line_without_url() {
        let resource = Resource {
            id: 2,
            title: "Lecture notes".to_string(),
            url: None,
            resource_type: Some("pdf".to_string()),
            tags: None,
        };
        assert_eq!(resource_line(&resource), "#2    [pdf] Lecture notes");
    }

    #[test]
    fn test_session_line() {
        let session = StudySession {
            id: 1,
            subject: "Physics".to_string(),
            duration_minutes: 90,
            date: Some("2025-12-02".to_string()),
        };
        assert_eq!(session_line(&session), "#1    2025-12-02 Physics (90 mins)");
    }

    #[tokio::test]
    async fn test_done_marks_task_completed() {
        use serde_json::json;
        use wiremock::matchers::{body_partial_json, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tasks/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 5, "title": "Essay", "status": "In Progress", "priority": "High"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/tasks/5"))
            .and(body_partial_json(json!({
                "title": "Essay",
                "status": "Done",
                "is_completed": true,
                "priority": "High"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 5, "title": "Essay", "status": "Done", "priority": "High", "is_completed": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&secondbrain_client::ApiConfig::new(server.uri()))
            .unwrap()
            .with_token("t");
        run_tasks(&client, TaskCommand::Done { id: 5 }).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_missing_task_fails() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tasks/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = ApiClient::new(&secondbrain_client::ApiConfig::new(server.uri()))
            .unwrap()
            .with_token("t");
        let err = run_tasks(&client, TaskCommand::Done { id: 42 })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No task with id 42"));
    }
}
