use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::cell::RefCell;

use crate::api::{ApiClient, Transport};
use crate::config::{ClientConfig, DataSourceKind};
use crate::model::{ListParams, Priority, Task, TaskCreate, TaskUpdate};

pub const NOT_FOUND: &str = "Todo not found";

/// Fetches and mutates tasks independently of how they are stored.
#[async_trait(?Send)]
pub trait DataSource {
    async fn list(&self) -> Result<Vec<Task>, String>;
    async fn create(&self, todo: TaskCreate) -> Result<Task, String>;
    async fn update(&self, id: &str, update: TaskUpdate) -> Result<Task, String>;
    async fn toggle(&self, id: &str) -> Result<Task, String>;
    async fn delete(&self, id: &str) -> Result<(), String>;
}

/// Session-local fixture, seeded with sample tasks by default.
#[derive(Debug, Default)]
pub struct InMemorySource {
    tasks: RefCell<Vec<Task>>,
}

impl InMemorySource {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks: RefCell::new(tasks),
        }
    }

    pub fn with_samples() -> Self {
        Self::new(sample_tasks())
    }

    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.borrow().clone()
    }

    fn with_task<R>(&self, id: &str, f: impl FnOnce(&mut Task) -> R) -> Result<R, String> {
        let mut tasks = self.tasks.borrow_mut();
        tasks
            .iter_mut()
            .find(|t| t.id == id)
            .map(f)
            .ok_or_else(|| NOT_FOUND.to_string())
    }
}

#[async_trait(?Send)]
impl DataSource for InMemorySource {
    async fn list(&self) -> Result<Vec<Task>, String> {
        Ok(self.snapshot())
    }

    async fn create(&self, todo: TaskCreate) -> Result<Task, String> {
        let mut task = Task::new(todo.title);
        task.description = todo.description;
        task.priority = todo.priority.unwrap_or_default();
        task.due_date = todo.due_date;
        task.category = todo.category;
        task.tags = todo.tags;

        self.tasks.borrow_mut().insert(0, task.clone());
        Ok(task)
    }

    async fn update(&self, id: &str, update: TaskUpdate) -> Result<Task, String> {
        self.with_task(id, |task| {
            task.apply(&update, Utc::now());
            task.clone()
        })
    }

    async fn toggle(&self, id: &str) -> Result<Task, String> {
        self.with_task(id, |task| {
            task.toggle_at(Utc::now());
            task.clone()
        })
    }

    async fn delete(&self, id: &str) -> Result<(), String> {
        let mut tasks = self.tasks.borrow_mut();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(NOT_FOUND.to_string());
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl<T: Transport> DataSource for ApiClient<T> {
    async fn list(&self) -> Result<Vec<Task>, String> {
        self.list_todos(&ListParams::default())
            .await
            .into_result()
            .map(|list| list.todos)
    }

    async fn create(&self, todo: TaskCreate) -> Result<Task, String> {
        self.create_todo(&todo).await.into_result().map(|p| p.todo)
    }

    async fn update(&self, id: &str, update: TaskUpdate) -> Result<Task, String> {
        self.update_todo(id, &update)
            .await
            .into_result()
            .map(|p| p.todo)
    }

    async fn toggle(&self, id: &str) -> Result<Task, String> {
        self.toggle_todo(id).await.into_result().map(|p| p.todo)
    }

    async fn delete(&self, id: &str) -> Result<(), String> {
        self.delete_todo(id).await.into_unit()
    }
}

/// The data source picked by [`ClientConfig::data_source`].
pub enum Backend<T> {
    Memory(InMemorySource),
    Http(ApiClient<T>),
}

impl<T: Transport> Backend<T> {
    pub fn from_config(config: &ClientConfig, transport: T) -> Self {
        match config.data_source {
            DataSourceKind::Memory => Backend::Memory(InMemorySource::with_samples()),
            DataSourceKind::Http => Backend::Http(ApiClient::new(config.api_base_url.clone(), transport)),
        }
    }

    pub fn kind(&self) -> DataSourceKind {
        match self {
            Backend::Memory(_) => DataSourceKind::Memory,
            Backend::Http(_) => DataSourceKind::Http,
        }
    }
}

#[async_trait(?Send)]
impl<T: Transport> DataSource for Backend<T> {
    async fn list(&self) -> Result<Vec<Task>, String> {
        match self {
            Backend::Memory(source) => source.list().await,
            Backend::Http(source) => source.list().await,
        }
    }

    async fn create(&self, todo: TaskCreate) -> Result<Task, String> {
        match self {
            Backend::Memory(source) => source.create(todo).await,
            Backend::Http(source) => source.create(todo).await,
        }
    }

    async fn update(&self, id: &str, update: TaskUpdate) -> Result<Task, String> {
        match self {
            Backend::Memory(source) => source.update(id, update).await,
            Backend::Http(source) => source.update(id, update).await,
        }
    }

    async fn toggle(&self, id: &str) -> Result<Task, String> {
        match self {
            Backend::Memory(source) => source.toggle(id).await,
            Backend::Http(source) => source.toggle(id).await,
        }
    }

    async fn delete(&self, id: &str) -> Result<(), String> {
        match self {
            Backend::Memory(source) => source.delete(id).await,
            Backend::Http(source) => source.delete(id).await,
        }
    }
}

fn at(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, 0)
        .single()
        .unwrap_or_default()
}

pub fn sample_tasks() -> Vec<Task> {
    vec![
        Task {
            id: "1".to_string(),
            title: "Learn Next.js".to_string(),
            description: Some("Complete the official Next.js tutorial".to_string()),
            completed: false,
            priority: Priority::High,
            due_date: Some("2023-12-31".to_string()),
            category: Some("work".to_string()),
            tags: Some(vec!["important".to_string()]),
            created_at: at(2023, 12, 1, 10, 0),
            updated_at: at(2023, 12, 1, 10, 0),
        },
        Task {
            id: "2".to_string(),
            title: "Build Todo App".to_string(),
            description: Some("Create a full-stack todo application".to_string()),
            completed: true,
            priority: Priority::Medium,
            due_date: Some("2023-12-15".to_string()),
            category: Some("personal".to_string()),
            tags: Some(vec!["project".to_string()]),
            created_at: at(2023, 12, 1, 9, 0),
            updated_at: at(2023, 12, 2, 15, 30),
        },
    ]
}
