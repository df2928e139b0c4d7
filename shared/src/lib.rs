//! Data model, API client and task-list state shared by the task board UI.

pub mod api;
pub mod config;
pub mod envelope;
pub mod model;
pub mod source;
pub mod store;

pub use api::{ApiClient, ClientError, HttpRequest, HttpResponse, Method, Transport};
pub use config::{ClientConfig, ConfigError, DataSourceKind};
pub use envelope::ApiResponse;
pub use model::{
    AuthResponse, Category, CategoryCreate, Credentials, ListParams, Pagination, Priority,
    Registration, Task, TaskCreate, TaskUpdate, User,
};
pub use source::{Backend, DataSource, InMemorySource};
pub use store::{priority_color, Confirmation, TaskStore};
