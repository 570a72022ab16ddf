//! Test utilities and mock data for taskdeck

use crate::database::TaskStore;
use crate::models::{CreateTaskRequest, Task};
use crate::repository::TaskRepository;
use chrono::{Duration, Utc};
use uuid::Uuid;

/// Create an empty in-memory store with the schema applied
///
/// # Panics
///
/// Panics if the in-memory database cannot be created; test-only code.
pub async fn create_test_store() -> TaskStore {
    TaskStore::in_memory()
        .await
        .expect("in-memory store should always open")
}

/// Seed a store with a representative mix of tasks for `owner`
///
/// Creates the `Work` and `Personal` categories plus five tasks covering
/// the interesting due-date cases: due today, due tomorrow, overdue,
/// completed-with-past-due-date, and no due date.
///
/// # Panics
///
/// Panics on any store failure; test-only code.
pub async fn seed_mock_data(store: &TaskStore, owner: Uuid) -> Vec<Task> {
    let today = Utc::now().date_naive();
    let work = store
        .find_or_create_category(owner, "Work")
        .await
        .expect("create Work category");
    let personal = store
        .find_or_create_category(owner, "Personal")
        .await
        .expect("create Personal category");

    let requests = vec![
        CreateTaskRequest {
            title: "Prepare standup notes".to_string(),
            description: Some("Three bullet points max".to_string()),
            due_date: Some(today),
            category_id: Some(work.id),
            ..CreateTaskRequest::default()
        },
        CreateTaskRequest {
            title: "Review pull request".to_string(),
            due_date: Some(today + Duration::days(1)),
            category_id: Some(work.id),
            ..CreateTaskRequest::default()
        },
        CreateTaskRequest {
            title: "Renew passport".to_string(),
            due_date: Some(today - Duration::days(7)),
            category_id: Some(personal.id),
            ..CreateTaskRequest::default()
        },
        CreateTaskRequest {
            title: "File expense report".to_string(),
            completed: Some(true),
            due_date: Some(today - Duration::days(3)),
            category_id: Some(work.id),
            ..CreateTaskRequest::default()
        },
        CreateTaskRequest {
            title: "Read that book".to_string(),
            ..CreateTaskRequest::default()
        },
    ];

    let mut tasks = Vec::new();
    for request in requests {
        tasks.push(
            store
                .create_task(owner, request)
                .await
                .expect("seed task"),
        );
    }
    tasks
}
