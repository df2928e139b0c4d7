use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}

/// A single todo item as the backend and the UI see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(title: String) -> Self {
        Self::new_at(title, Utc::now())
    }

    /// Builds a locally created task with a fresh id, stamped at `now`.
    pub fn new_at(title: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description: None,
            completed: false,
            priority: Priority::default(),
            due_date: None,
            category: None,
            tags: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes `updated_at`, never letting it fall behind `created_at`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    pub fn toggle_at(&mut self, now: DateTime<Utc>) {
        self.completed = !self.completed;
        self.touch(now);
    }

    /// Applies the fields present in `update`, leaving the rest untouched.
    pub fn apply(&mut self, update: &TaskUpdate, now: DateTime<Utc>) {
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(description) = &update.description {
            self.description = Some(description.clone());
        }
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(due_date) = &update.due_date {
            self.due_date = Some(due_date.clone());
        }
        if let Some(category) = &update.category {
            self.category = Some(category.clone());
        }
        if let Some(tags) = &update.tags {
            self.tags = Some(tags.clone());
        }
        self.touch(now);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskCreate {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl From<&Task> for TaskCreate {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            priority: Some(task.priority),
            due_date: task.due_date.clone(),
            category: task.category.clone(),
            tags: task.tags.clone(),
        }
    }
}

/// Partial update; absent fields are left out of the request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub count: i64,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoList {
    #[serde(default)]
    pub todos: Vec<Task>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoPayload {
    pub todo: Task,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryList {
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPayload {
    pub category: Category,
}

/// Filter, sort and paging options for listing todos. Values are passed
/// through to the backend untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListParams {
    pub fn to_query(&self) -> String {
        let page = self.page.map(|p| p.to_string());
        let limit = self.limit.map(|l| l.to_string());
        let pairs = [
            ("status", self.status.as_deref()),
            ("priority", self.priority.as_deref()),
            ("category", self.category.as_deref()),
            ("search", self.search.as_deref()),
            ("sort", self.sort.as_deref()),
            ("order", self.order.as_deref()),
            ("page", page.as_deref()),
            ("limit", limit.as_deref()),
        ];

        pairs
            .iter()
            .filter_map(|(key, value)| {
                value.map(|v| format!("{}={}", key, urlencoding::encode(v)))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Accepts RFC 3339 as well as the zone-less ISO form some backends emit,
/// which is read as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Ok(ts.with_timezone(&Utc)),
        Err(_) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|n| n.and_utc()),
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_priority_round_trips_through_strings() {
        for priority in [Priority::Low, Priority::Medium, Priority::High, Priority::Urgent] {
            assert_eq!(priority.to_string().parse::<Priority>(), Ok(priority));
        }
        assert!("critical".parse::<Priority>().is_err());
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_task_deserializes_backend_shape() {
        let json = r#"{
            "id": "7f1c",
            "title": "Learn Next.js",
            "completed": false,
            "priority": "high",
            "due_date": "2023-12-31",
            "tags": ["important"],
            "owner_id": "ignored",
            "created_at": "2023-12-01T10:00:00",
            "updated_at": "2023-12-01T10:00:00.123456"
        }"#;

        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.description, None);
        assert_eq!(task.tags, Some(vec!["important".to_string()]));
        assert_eq!(task.created_at, Utc.with_ymd_and_hms(2023, 12, 1, 10, 0, 0).unwrap());
        assert!(task.updated_at > task.created_at);
    }

    #[test]
    fn test_parse_timestamp_accepts_offsets() {
        let ts = parse_timestamp("2023-12-02T15:30:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2023, 12, 2, 13, 30, 0).unwrap());
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_new_task_defaults() {
        let now = Utc::now();
        let task = Task::new_at("X".to_string(), now);
        assert!(!task.id.is_empty());
        assert!(!task.completed);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_touch_never_precedes_creation() {
        let now = Utc::now();
        let mut task = Task::new_at("X".to_string(), now);
        task.touch(now - Duration::hours(1));
        assert_eq!(task.updated_at, task.created_at);
    }

    #[test]
    fn test_apply_partial_update() {
        let now = Utc::now();
        let mut task = Task::new_at("Old".to_string(), now);
        let update = TaskUpdate {
            title: Some("New".to_string()),
            priority: Some(Priority::Urgent),
            ..Default::default()
        };
        task.apply(&update, now + Duration::seconds(5));

        assert_eq!(task.title, "New");
        assert_eq!(task.priority, Priority::Urgent);
        assert!(!task.completed);
        assert_eq!(task.updated_at, now + Duration::seconds(5));
    }

    #[test]
    fn test_update_body_omits_absent_fields() {
        let update = TaskUpdate {
            completed: Some(true),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"completed":true}"#);
    }

    #[test]
    fn test_list_params_query() {
        assert_eq!(ListParams::default().to_query(), "");

        let params = ListParams {
            status: Some("active".to_string()),
            search: Some("buy milk".to_string()),
            page: Some(2),
            limit: Some(10),
            ..Default::default()
        };
        assert_eq!(params.to_query(), "status=active&search=buy%20milk&page=2&limit=10");
    }
}
