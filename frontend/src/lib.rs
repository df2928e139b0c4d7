use sauron::{
    html::{attributes::*, *},
    prelude::*,
};
use chrono::{DateTime, Utc};
use shared::{
    priority_color, Backend, ClientConfig, Confirmation, DataSource, Task, TaskCreate, TaskStore,
};
use std::rc::Rc;
use web_sys::console;

mod fetch;

use fetch::FetchTransport;

#[derive(Debug, Clone)]
pub enum Msg {
    LoadTasks,
    TasksLoaded(Result<Vec<Task>, String>),
    SetInput(String),
    InputKeyDown(String),
    AddTask,
    TaskCreated { local_id: String, task: Task },
    ToggleTask(String),
    DeleteTask(String),
    TaskSynced(Task),
    ToggleFailed {
        task_id: String,
        stamp: DateTime<Utc>,
        error: String,
    },
    TaskRemoved(String),
    SyncFailed(String),
}

pub struct Model {
    store: TaskStore,
    backend: Rc<Backend<FetchTransport>>,
}

impl Model {
    pub fn new(config: &ClientConfig) -> Self {
        console::log_1(
            &format!(
                "[DEBUG] data source: {}, api: {}",
                config.data_source, config.api_base_url
            )
            .into(),
        );
        Self {
            store: TaskStore::new(),
            backend: Rc::new(Backend::from_config(config, FetchTransport)),
        }
    }
}

fn delete_remote(backend: Rc<Backend<FetchTransport>>, task_id: String) -> Cmd<Msg> {
    Cmd::new(async move {
        match backend.delete(&task_id).await {
            Ok(()) => Msg::TaskRemoved(task_id),
            Err(e) => Msg::SyncFailed(e),
        }
    })
}

impl Application for Model {
    type MSG = Msg;

    fn init(&mut self) -> Cmd<Msg> {
        Cmd::new(async { Msg::LoadTasks })
    }

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::LoadTasks => {
                self.store.begin_load();
                let backend = Rc::clone(&self.backend);
                Cmd::new(async move { Msg::TasksLoaded(backend.list().await) })
            }
            Msg::TasksLoaded(result) => {
                if let Err(e) = &result {
                    console::error_1(&format!("Error fetching todos: {}", e).into());
                }
                self.store.finish_load(result);
                console::log_1(&format!("[DEBUG] {} tasks in list", self.store.tasks().len()).into());
                Cmd::none()
            }
            Msg::SetInput(input) => {
                self.store.set_input(input);
                Cmd::none()
            }
            Msg::InputKeyDown(key) => {
                if key == "Enter" {
                    self.update(Msg::AddTask)
                } else {
                    Cmd::none()
                }
            }
            Msg::AddTask => match self.store.add() {
                Some(task) => {
                    let backend = Rc::clone(&self.backend);
                    Cmd::new(async move {
                        match backend.create(TaskCreate::from(&task)).await {
                            Ok(created) => Msg::TaskCreated {
                                local_id: task.id,
                                task: created,
                            },
                            Err(e) => Msg::SyncFailed(e),
                        }
                    })
                }
                None => Cmd::none(),
            },
            Msg::TaskCreated { local_id, task } => {
                let remote_id = task.id.clone();
                match self.store.confirm_created(&local_id, task) {
                    Confirmation::Confirmed => Cmd::none(),
                    // Deleted locally before the backend answered.
                    Confirmation::Missing => delete_remote(Rc::clone(&self.backend), remote_id),
                    Confirmation::Diverged(update) => {
                        let backend = Rc::clone(&self.backend);
                        Cmd::new(async move {
                            match backend.update(&remote_id, update).await {
                                Ok(task) => Msg::TaskSynced(task),
                                Err(e) => Msg::SyncFailed(e),
                            }
                        })
                    }
                }
            }
            Msg::ToggleTask(task_id) => {
                if !self.store.toggle(&task_id) {
                    return Cmd::none();
                }
                // Carried over when the pending create is confirmed.
                if self.store.is_unconfirmed(&task_id) {
                    return Cmd::none();
                }
                let Some(stamp) = self.store.find(&task_id).map(|t| t.updated_at) else {
                    return Cmd::none();
                };
                let backend = Rc::clone(&self.backend);
                Cmd::new(async move {
                    match backend.toggle(&task_id).await {
                        Ok(task) => Msg::TaskSynced(task),
                        Err(error) => Msg::ToggleFailed {
                            task_id,
                            stamp,
                            error,
                        },
                    }
                })
            }
            Msg::DeleteTask(task_id) => {
                let unconfirmed = self.store.is_unconfirmed(&task_id);
                if self.store.delete(&task_id) && !unconfirmed {
                    delete_remote(Rc::clone(&self.backend), task_id)
                } else {
                    Cmd::none()
                }
            }
            Msg::ToggleFailed {
                task_id,
                stamp,
                error,
            } => {
                console::log_1(
                    &format!("[DEBUG] Toggle sync failed: {}, reverting optimistic update", error).into(),
                );
                if !self.store.revert_toggle(&task_id, stamp) {
                    console::log_1(&format!("[DEBUG] Task {} changed since, not reverted", task_id).into());
                }
                Cmd::none()
            }
            Msg::TaskSynced(task) => {
                if !self.store.apply_remote(task) {
                    console::log_1(&"[DEBUG] Kept newer local copy".into());
                }
                Cmd::none()
            }
            Msg::TaskRemoved(task_id) => {
                console::log_1(&format!("[DEBUG] Task {} deleted", task_id).into());
                Cmd::none()
            }
            Msg::SyncFailed(error) => {
                console::error_1(&format!("Error: {}", error).into());
                Cmd::none()
            }
        }
    }

    fn view(&self) -> Node<Msg> {
        div(
            [class("min-h-screen bg-ctp-base text-ctp-text p-4 md:p-8")],
            [div(
                [class("max-w-4xl mx-auto")],
                [
                    self.view_header(),
                    self.view_create_form(),
                    self.view_task_list(),
                    footer(
                        [class("mt-12 text-center text-ctp-subtext0 text-sm")],
                        [p([], [text("Todo Application")])],
                    ),
                ],
            )],
        )
    }
}

impl Model {
    fn view_header(&self) -> Node<Msg> {
        header([class("mb-12 text-center")], [
            h1([class("text-4xl font-bold text-ctp-text mb-2")], [text("Todo Application")]),
            p([class("text-ctp-subtext1")], [text("Manage your tasks efficiently")]),
        ])
    }

    fn view_create_form(&self) -> Node<Msg> {
        div([class("bg-ctp-surface0 rounded-xl shadow-md p-6 mb-8")], [
            div([class("flex gap-3")], [
                input([
                    r#type("text"),
                    placeholder("What needs to be done?"),
                    value(self.store.input().to_string()),
                    on_input(|event| Msg::SetInput(event.value())),
                    on_keydown(|event| Msg::InputKeyDown(event.key())),
                    class("flex-1 px-4 py-3 bg-ctp-surface1 border border-ctp-surface2 rounded-lg text-ctp-text placeholder-ctp-subtext0 focus:outline-none focus:ring-2 focus:ring-ctp-blue"),
                ], []),
                button([
                    on_click(|_| Msg::AddTask),
                    class("bg-ctp-blue hover:bg-ctp-sapphire text-ctp-base font-medium px-6 py-3 rounded-lg transition-colors duration-200"),
                ], [text("+ Add")]),
            ]),
        ])
    }

    fn view_task_list(&self) -> Node<Msg> {
        div([class("bg-ctp-surface0 rounded-xl shadow-md overflow-hidden")], [
            div([class("flex items-center justify-between border-b border-ctp-surface1 p-4 bg-ctp-mantle")], [
                h2([class("text-xl font-semibold text-ctp-text")], [text("Your Tasks")]),
                span([class("text-sm text-ctp-subtext0")], [text(&format!(
                    "{} active, {} completed",
                    self.store.pending_count(),
                    self.store.completed_count()
                ))]),
            ]),
            if self.store.is_loading() {
                div([class("p-8 text-center")], [p([], [text("Loading todos...")])])
            } else if self.store.tasks().is_empty() {
                div([class("p-8 text-center")], [
                    p([class("text-ctp-subtext0")], [text("No tasks yet. Add your first task!")]),
                ])
            } else {
                ul(
                    [class("divide-y divide-ctp-surface1")],
                    self.store.tasks().iter().map(|task| self.view_task(task)).collect::<Vec<_>>(),
                )
            },
        ])
    }

    fn view_task(&self, task: &Task) -> Node<Msg> {
        li([key(task.id.clone()), class("p-4 hover:bg-ctp-surface1 transition duration-150")], [
            div([class("flex items-center justify-between")], [
                div([class("flex items-center gap-4")], [
                    button([
                        on_click({
                            let task_id = task.id.clone();
                            move |_| Msg::ToggleTask(task_id.clone())
                        }),
                        class(&format!(
                            "w-6 h-6 rounded-full border-2 flex items-center justify-center {}",
                            if task.completed {
                                "bg-ctp-green border-ctp-green text-ctp-base"
                            } else {
                                "border-ctp-surface2 hover:border-ctp-green"
                            }
                        )),
                    ], [
                        if task.completed {
                            span([class("text-sm font-bold")], [text("✓")])
                        } else {
                            span([], [])
                        }
                    ]),
                    div([], [
                        h3([class(&format!(
                            "font-medium {}",
                            if task.completed {
                                "line-through text-ctp-overlay1"
                            } else {
                                "text-ctp-text"
                            }
                        ))], [text(&task.title)]),
                        match &task.description {
                            Some(description) => p([class("text-sm text-ctp-subtext1 mt-1")], [text(description)]),
                            None => span([], []),
                        },
                        self.view_badges(task),
                    ]),
                ]),
                div([class("flex gap-2")], [
                    // Editing is not supported yet.
                    button([
                        class("p-2 text-ctp-overlay0 rounded-full cursor-not-allowed"),
                        disabled(true),
                    ], [text("✏️")]),
                    button([
                        on_click({
                            let task_id = task.id.clone();
                            move |_| Msg::DeleteTask(task_id.clone())
                        }),
                        class("p-2 text-ctp-overlay0 hover:text-ctp-red hover:bg-ctp-red/10 rounded-full"),
                    ], [text("🗑️")]),
                ]),
            ]),
            match &task.due_date {
                Some(due) => div([class("mt-2 text-sm text-ctp-subtext0")], [text(&format!("Due: {}", due))]),
                None => span([], []),
            },
        ])
    }

    fn view_badges(&self, task: &Task) -> Node<Msg> {
        let mut badges = vec![span(
            [class(&format!(
                "text-xs px-2 py-1 rounded-full bg-ctp-surface1 {}",
                priority_color(task.priority.as_str())
            ))],
            [text(task.priority.as_str())],
        )];

        if let Some(category) = &task.category {
            badges.push(span(
                [class("text-xs px-2 py-1 rounded-full bg-ctp-mauve/20 text-ctp-mauve")],
                [text(category)],
            ));
        }

        if let Some(tags) = &task.tags {
            badges.extend(tags.iter().map(|tag| {
                span(
                    [class("text-xs px-2 py-1 rounded-full bg-ctp-blue/20 text-ctp-blue")],
                    [text(tag)],
                )
            }));
        }

        div([class("flex gap-3 mt-2")], badges)
    }
}

#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    let config = ClientConfig::from_build_env().unwrap_or_else(|e| {
        console::error_1(&format!("Invalid configuration, using defaults: {}", e).into());
        ClientConfig::default()
    });
    Program::mount_to_body(Model::new(&config));
}
