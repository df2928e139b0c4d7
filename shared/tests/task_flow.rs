use async_trait::async_trait;
use futures::executor::block_on;
use std::cell::RefCell;
use taskboard_shared::source::sample_tasks;
use taskboard_shared::{
    ApiClient, Backend, ClientConfig, ClientError, Confirmation, DataSource, DataSourceKind,
    HttpRequest, HttpResponse, InMemorySource, Method, Task, TaskCreate, TaskStore, Transport,
};

/// Answers every request with the same canned response.
struct CannedTransport {
    status: u16,
    body: String,
    sent: RefCell<Vec<HttpRequest>>,
}

impl CannedTransport {
    fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            sent: RefCell::new(Vec::new()),
        }
    }
}

#[async_trait(?Send)]
impl Transport for CannedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        self.sent.borrow_mut().push(request);
        Ok(HttpResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

struct Unreachable;

#[async_trait(?Send)]
impl Transport for Unreachable {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, ClientError> {
        Err(ClientError::Transport("Failed to fetch".to_string()))
    }
}

fn load(store: &mut TaskStore, source: &impl DataSource) {
    store.begin_load();
    let result = block_on(source.list());
    store.finish_load(result);
}

#[test]
fn toggle_keeps_order() {
    let mut store = TaskStore::new();
    load(&mut store, &InMemorySource::with_samples());

    let a = store.tasks()[0].id.clone();
    assert!(!store.tasks()[0].completed);
    assert!(store.tasks()[1].completed);

    store.toggle(&a);

    let state: Vec<(&str, bool)> = store
        .tasks()
        .iter()
        .map(|t| (t.id.as_str(), t.completed))
        .collect();
    assert_eq!(state, [("1", true), ("2", true)]);
}

#[test]
fn add_then_delete_restores_list() {
    let mut store = TaskStore::new();
    load(&mut store, &InMemorySource::with_samples());
    let before = store.tasks().to_vec();

    store.set_input("Buy milk".to_string());
    let added = store.add().unwrap();
    assert_eq!(store.tasks().len(), before.len() + 1);

    assert!(store.delete(&added.id));
    assert_eq!(store.tasks(), before.as_slice());
}

#[test]
fn http_load_populates_store() {
    let body = r#"{
        "success": true,
        "data": {
            "todos": [
                {"id": "a1", "title": "Write report", "completed": false, "priority": "urgent",
                 "tags": [], "created_at": "2024-01-05T08:00:00", "updated_at": "2024-01-05T08:00:00"}
            ],
            "pagination": {"page": 1, "limit": 10, "total": 1, "pages": 1}
        }
    }"#;
    let api = ApiClient::new("http://localhost:8000/api", CannedTransport::new(200, body));

    let mut store = TaskStore::new();
    load(&mut store, &api);

    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.tasks()[0].title, "Write report");
    let sent = api.transport().sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, Method::Get);
    assert_eq!(sent[0].url, "http://localhost:8000/api/todos?");
}

#[test]
fn failed_http_load_leaves_usable_empty_list() {
    let api = ApiClient::new("http://localhost:8000/api", Unreachable);
    let mut store = TaskStore::new();
    load(&mut store, &api);

    assert!(!store.is_loading());
    assert!(store.tasks().is_empty());

    store.set_input("Offline task".to_string());
    assert!(store.add().is_some());
    assert_eq!(store.tasks().len(), 1);
}

#[test]
fn server_error_surfaces_as_data_source_error() {
    let api = ApiClient::new(
        "http://localhost:8000/api",
        CannedTransport::new(404, r#"{"detail": "Todo not found"}"#),
    );
    assert_eq!(block_on(api.toggle("nope")), Err("Todo not found".to_string()));
}

#[test]
fn backend_follows_config() {
    let memory = Backend::from_config(&ClientConfig::default(), Unreachable);
    assert_eq!(memory.kind(), DataSourceKind::Memory);
    assert_eq!(block_on(memory.list()).unwrap(), sample_tasks());

    let config = ClientConfig {
        data_source: DataSourceKind::Http,
        ..ClientConfig::default()
    };
    let http = Backend::from_config(&config, Unreachable);
    assert_eq!(http.kind(), DataSourceKind::Http);
    assert_eq!(block_on(http.list()), Err("Failed to fetch".to_string()));
}

/// Adds a task locally and creates it in the source, without confirming yet.
fn add_and_create(store: &mut TaskStore, source: &InMemorySource, title: &str) -> (Task, Task) {
    store.set_input(title.to_string());
    let local = store.add().unwrap();
    let created = block_on(source.create(TaskCreate::from(&local))).unwrap();
    (local, created)
}

fn assert_unique_ids(store: &TaskStore) {
    let mut ids: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
    let total = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), total, "duplicate ids in {:?}", store.tasks());
}

#[test]
fn load_after_confirmed_create_keeps_one_copy() {
    let source = InMemorySource::with_samples();
    let mut store = TaskStore::new();
    load(&mut store, &source);

    let (local, created) = add_and_create(&mut store, &source, "Buy milk");
    assert_eq!(store.confirm_created(&local.id, created.clone()), Confirmation::Confirmed);
    load(&mut store, &source);

    assert_unique_ids(&store);
    assert_eq!(store.tasks().len(), 3);
    assert!(store.find(&local.id).is_none());
    assert_eq!(store.tasks()[0].id, created.id);
}

#[test]
fn create_fetched_by_concurrent_load_is_not_duplicated() {
    let source = InMemorySource::with_samples();
    let mut store = TaskStore::new();

    store.begin_load();
    let (local, created) = add_and_create(&mut store, &source, "Buy milk");
    store.finish_load(block_on(source.list()));
    store.confirm_created(&local.id, created.clone());

    assert_unique_ids(&store);
    let ids: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, [created.id.as_str(), "1", "2"]);
}

#[test]
fn toggle_echo_after_confirm_applies() {
    let source = InMemorySource::with_samples();
    let mut store = TaskStore::new();
    load(&mut store, &source);

    let (local, created) = add_and_create(&mut store, &source, "Buy milk");
    store.confirm_created(&local.id, created.clone());

    assert!(store.toggle(&created.id));
    assert!(!store.is_unconfirmed(&created.id));
    let echo = block_on(source.toggle(&created.id)).unwrap();
    store.apply_remote(echo);

    assert!(store.find(&created.id).unwrap().completed);
    assert!(source.snapshot().iter().any(|t| t.id == created.id && t.completed));
}

#[test]
fn toggle_before_confirm_reaches_backend() {
    let source = InMemorySource::with_samples();
    let mut store = TaskStore::new();
    load(&mut store, &source);

    let (local, created) = add_and_create(&mut store, &source, "Buy milk");
    assert!(store.toggle(&local.id));
    assert!(store.is_unconfirmed(&local.id));

    let update = match store.confirm_created(&local.id, created.clone()) {
        Confirmation::Diverged(update) => update,
        other => panic!("expected pending update, got {:?}", other),
    };
    assert_eq!(update.completed, Some(true));
    assert!(store.find(&created.id).unwrap().completed);

    let echo = block_on(source.update(&created.id, update)).unwrap();
    store.apply_remote(echo);

    assert!(store.find(&created.id).unwrap().completed);
    assert!(source.snapshot().iter().any(|t| t.id == created.id && t.completed));
}

#[test]
fn delete_before_confirm_removes_backend_copy() {
    let source = InMemorySource::with_samples();
    let mut store = TaskStore::new();
    load(&mut store, &source);
    let before = store.tasks().to_vec();

    let (local, created) = add_and_create(&mut store, &source, "Buy milk");
    assert!(store.delete(&local.id));
    assert_eq!(store.confirm_created(&local.id, created.clone()), Confirmation::Missing);
    block_on(source.delete(&created.id)).unwrap();

    assert_eq!(store.tasks(), before.as_slice());
    assert_eq!(source.snapshot(), before);
}

#[test]
fn rejected_toggle_is_reverted() {
    let api = ApiClient::new(
        "http://localhost:8000/api",
        CannedTransport::new(404, r#"{"detail": "Todo not found"}"#),
    );
    let mut store = TaskStore::new();
    load(&mut store, &InMemorySource::with_samples());

    store.toggle("1");
    let stamp = store.find("1").unwrap().updated_at;
    assert!(block_on(api.toggle("1")).is_err());
    assert!(store.revert_toggle("1", stamp));

    assert!(!store.find("1").unwrap().completed);
}
