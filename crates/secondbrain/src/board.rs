use secondbrain_client::{Task, TaskStatus};

/// One column of the task board.
#[derive(Debug)]
pub struct Column<'a> {
    pub status: TaskStatus,
    pub tasks: Vec<&'a Task>,
}

/// Group tasks into Todo / In Progress / Done columns, keeping fetch order
/// inside each column. Every column is present even when empty; tasks
/// with any other status are left off the board.
pub fn group_by_status(tasks: &[Task]) -> Vec<Column<'_>> {
    TaskStatus::ALL
        .into_iter()
        .map(|status| {
            let tasks = tasks.iter().filter(|t| t.status == status).collect();
            Column { status, tasks }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secondbrain_client::Priority;

    fn make_task(id: i64, status: TaskStatus) -> Task {
        Task {
            id,
            title: format!("task {id}"),
            description: None,
            due_date: None,
            is_completed: matches!(status, TaskStatus::Done),
            priority: Priority::Medium,
            status,
            tags: None,
            project_id: None,
        }
    }

    #[test]
    fn test_group_by_status_column_order() {
        let columns = group_by_status(&[]);
        let statuses: Vec<TaskStatus> = columns.iter().map(|c| c.status.clone()).collect();
        assert_eq!(
            statuses,
            vec![TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done]
        );
        assert!(columns.iter().all(|c| c.tasks.is_empty()));
    }

    #[test]
    fn test_group_by_status_keeps_order() {
        let tasks = vec![
            make_task(1, TaskStatus::Done),
            make_task(2, TaskStatus::Todo),
            make_task(3, TaskStatus::InProgress),
            make_task(4, TaskStatus::Todo),
        ];
        let columns = group_by_status(&tasks);

        let ids = |i: usize| columns[i].tasks.iter().map(|t| t.id).collect::<Vec<_>>();
        assert_eq!(ids(0), vec![2, 4]);
        assert_eq!(ids(1), vec![3]);
        assert_eq!(ids(2), vec![1]);
    }

    #[test]
    fn test_group_by_status_drops_unknown_status() {
        let tasks = vec![
            make_task(1, TaskStatus::Other("Blocked".to_string())),
            make_task(2, TaskStatus::Todo),
        ];
        let columns = group_by_status(&tasks);

        assert_eq!(columns.len(), 3);
        let shown: usize = columns.iter().map(|c| c.tasks.len()).sum();
        assert_eq!(shown, 1);
        assert_eq!(columns[0].tasks[0].id, 2);
    }
}
