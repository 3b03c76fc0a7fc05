// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side sync engine.
//!
//! Drives each operation through `Idle -> InFlight -> Committed | Failed`
//! and only touches the cache with records the server has confirmed.

use crate::client::api::{ApiClient, ClientError};
use crate::client::cache::TodoCache;
use crate::client::flash::Flash;
use crate::client::image::PendingImage;
use crate::models::todo::non_empty;
use crate::models::{CreateTodoRequest, Credentials, TodoPatch, TodoResponse, UpdateTodoRequest};

pub const REGISTERED: &str = "Registration successful! Please login.";
pub const CREATE_PRECONDITION: &str = "Title and login required";

const FETCH_FAILED: &str = "Failed to fetch todos";
const CREATE_FAILED: &str = "Failed to add todo";
const UPDATE_FAILED: &str = "Failed to update todo";
const DELETE_FAILED: &str = "Failed to delete todo";
const LOGIN_FAILED: &str = "Login failed";
const REGISTER_FAILED: &str = "Registration failed";

/// Lifecycle of one client operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OpState {
    #[default]
    Idle,
    InFlight,
    Committed,
    Failed(String),
}

impl OpState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, OpState::InFlight)
    }
}

/// Holds an operation at `InFlight` and puts it back to `Idle` on drop,
/// so a cancelled request never leaves the operation stuck busy.
struct InFlight<'a>(&'a mut OpState);

impl<'a> InFlight<'a> {
    fn begin(state: &'a mut OpState) -> Self {
        *state = OpState::InFlight;
        Self(state)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = OpState::Idle;
    }
}

/// The logged-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub user_id: u64,
}

/// Presentation state that is not part of any record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    pub image_preview: Option<String>,
    pub show_image_preview: bool,
    /// Login form shown when true, registration form otherwise.
    pub is_login: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            image_preview: None,
            show_image_preview: false,
            is_login: true,
        }
    }
}

impl UiState {
    pub fn toggle_auth_mode(&mut self) {
        self.is_login = !self.is_login;
    }

    pub fn set_auth_mode(&mut self, is_login: bool) {
        self.is_login = is_login;
    }

    pub fn clear_image_preview(&mut self) {
        self.image_preview = None;
        self.show_image_preview = false;
    }
}

/// Draft of the next todo to create.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoForm {
    pub title: String,
    pub description: String,
    pub image: Option<PendingImage>,
}

/// Client cache plus the operations that keep it in step with the server.
pub struct SyncEngine {
    api: ApiClient,
    session: Option<Session>,
    cache: TodoCache,
    form: TodoForm,
    ui: UiState,
    error: Flash,
    message: Flash,
    loading: bool,
    auth_state: OpState,
    create_state: OpState,
    update_state: OpState,
    delete_state: OpState,
}

impl SyncEngine {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            session: None,
            cache: TodoCache::new(),
            form: TodoForm::default(),
            ui: UiState::default(),
            error: Flash::new(),
            message: Flash::new(),
            loading: false,
            auth_state: OpState::Idle,
            create_state: OpState::Idle,
            update_state: OpState::Idle,
            delete_state: OpState::Idle,
        }
    }

    // ─── Accessors ───────────────────────────────────────────

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn cache(&self) -> &TodoCache {
        &self.cache
    }

    pub fn todos(&self) -> &[TodoResponse] {
        self.cache.todos()
    }

    pub fn form(&self) -> &TodoForm {
        &self.form
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut UiState {
        &mut self.ui
    }

    pub fn error(&self) -> Option<String> {
        self.error.get()
    }

    pub fn message(&self) -> Option<String> {
        self.message.get()
    }

    pub fn clear_error(&mut self) {
        self.error.clear();
    }

    pub fn clear_message(&mut self) {
        self.message.clear();
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn auth_state(&self) -> &OpState {
        &self.auth_state
    }

    pub fn create_state(&self) -> &OpState {
        &self.create_state
    }

    pub fn update_state(&self) -> &OpState {
        &self.update_state
    }

    pub fn delete_state(&self) -> &OpState {
        &self.delete_state
    }

    /// Whether the current user may edit `todo`. Advisory only; the
    /// server decides.
    pub fn can_modify(&self, todo: &TodoResponse) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.username == todo.author)
    }

    /// Own and total counts for the "N yours, M total" summary.
    pub fn counts(&self) -> (usize, usize) {
        let own = self
            .session
            .as_ref()
            .map(|s| self.cache.own_count(&s.username))
            .unwrap_or(0);
        (own, self.cache.total_count())
    }

    fn fail(&mut self, err: &ClientError, fallback: &str) -> String {
        let text = err.user_message(fallback);
        tracing::debug!(error = %err, "Client operation failed");
        self.error.set(text.clone());
        text
    }

    // ─── Auth ────────────────────────────────────────────────

    pub async fn register(&mut self, username: &str, password: &str) -> Result<(), ClientError> {
        let result = {
            let _op = InFlight::begin(&mut self.auth_state);
            self.api.register(&Credentials::new(username, password)).await
        };
        match result {
            Ok(_) => {
                self.auth_state = OpState::Committed;
                self.message.set(REGISTERED);
                self.ui.set_auth_mode(true);
                Ok(())
            }
            Err(err) => {
                let text = self.fail(&err, REGISTER_FAILED);
                self.auth_state = OpState::Failed(text);
                Err(err)
            }
        }
    }

    /// Log in, then load the todo list.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ClientError> {
        let result = {
            let _op = InFlight::begin(&mut self.auth_state);
            self.api.login(&Credentials::new(username, password)).await
        };
        match result {
            Ok(response) => {
                self.auth_state = OpState::Committed;
                self.session = Some(Session {
                    username: response.username,
                    user_id: response.user_id,
                });
                self.fetch_todos().await
            }
            Err(err) => {
                let text = self.fail(&err, LOGIN_FAILED);
                self.auth_state = OpState::Failed(text);
                Err(err)
            }
        }
    }

    /// Forget the user and everything cached for them.
    pub fn logout(&mut self) {
        self.session = None;
        self.cache.clear();
        self.form = TodoForm::default();
        self.ui.clear_image_preview();
        self.error.clear();
        self.message.clear();
        self.auth_state = OpState::Idle;
    }

    // ─── Todos ───────────────────────────────────────────────

    /// Replace the cache with the server's list.
    pub async fn fetch_todos(&mut self) -> Result<(), ClientError> {
        self.loading = true;
        let result = self.api.list_todos().await;
        self.loading = false;

        match result {
            Ok(todos) => {
                self.cache.replace_all(todos);
                Ok(())
            }
            Err(err) => {
                self.fail(&err, FETCH_FAILED);
                Err(err)
            }
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.form.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.form.description = description.into();
    }

    /// Gate and stage an image for the next create.
    ///
    /// A rejected file leaves the current selection untouched.
    pub fn select_image(
        &mut self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ClientError> {
        match PendingImage::new(file_name, content_type, bytes) {
            Ok(image) => {
                self.ui.image_preview = Some(image.preview_data_uri());
                self.ui.show_image_preview = true;
                self.form.image = Some(image);
                Ok(())
            }
            Err(err) => {
                self.fail(&err, "");
                Err(err)
            }
        }
    }

    pub fn remove_image(&mut self) {
        self.form.image = None;
        self.ui.clear_image_preview();
    }

    /// Create a todo from the form: upload the image first if one is
    /// staged, then create with the returned locator.
    ///
    /// The form is cleared only once the server has confirmed the create.
    pub async fn submit_create(&mut self) -> Result<TodoResponse, ClientError> {
        if self.create_state.is_in_flight() {
            return Err(ClientError::Busy);
        }

        let author = self
            .session
            .as_ref()
            .filter(|_| !self.form.title.trim().is_empty())
            .map(|s| s.username.clone());
        let Some(author) = author else {
            let err = ClientError::Rejected(CREATE_PRECONDITION.to_string());
            self.fail(&err, CREATE_PRECONDITION);
            return Err(err);
        };

        let result = {
            let _op = InFlight::begin(&mut self.create_state);
            create_from_form(&self.api, &self.form, author).await
        };
        match result {
            Ok(todo) => {
                self.cache.prepend(todo.clone());
                self.form = TodoForm::default();
                self.ui.clear_image_preview();
                self.create_state = OpState::Committed;
                Ok(todo)
            }
            Err(err) => {
                let text = self.fail(&err, CREATE_FAILED);
                self.create_state = OpState::Failed(text);
                Err(err)
            }
        }
    }

    /// Send a partial update and swap in the server's copy.
    pub async fn update(&mut self, id: u64, patch: TodoPatch) -> Result<TodoResponse, ClientError> {
        let request = UpdateTodoRequest {
            title: patch.title,
            description: patch.description,
            completed: patch.completed,
            author: self.author(),
        };

        let result = {
            let _op = InFlight::begin(&mut self.update_state);
            self.api.update_todo(id, &request).await
        };
        match result {
            Ok(todo) => {
                self.cache.replace(todo.clone());
                self.update_state = OpState::Committed;
                Ok(todo)
            }
            Err(err) => {
                let text = self.fail(&err, UPDATE_FAILED);
                self.update_state = OpState::Failed(text);
                Err(err)
            }
        }
    }

    /// Flip `completed`, resending the cached title and description.
    pub async fn toggle_complete(&mut self, id: u64) -> Result<TodoResponse, ClientError> {
        let Some(todo) = self.cache.get(id) else {
            let err = ClientError::Rejected("Todo not found".to_string());
            self.fail(&err, UPDATE_FAILED);
            return Err(err);
        };

        let patch = TodoPatch {
            title: Some(todo.title.clone()),
            description: Some(todo.description.clone()),
            completed: Some(!todo.completed),
        };
        self.update(id, patch).await
    }

    pub async fn delete(&mut self, id: u64) -> Result<(), ClientError> {
        let author = self.author();

        let result = {
            let _op = InFlight::begin(&mut self.delete_state);
            self.api.delete_todo(id, &author).await
        };
        match result {
            Ok(_) => {
                self.cache.remove(id);
                self.delete_state = OpState::Committed;
                Ok(())
            }
            Err(err) => {
                let text = self.fail(&err, DELETE_FAILED);
                self.delete_state = OpState::Failed(text);
                Err(err)
            }
        }
    }

    /// Authorization key sent with mutations; empty when logged out.
    fn author(&self) -> String {
        self.session
            .as_ref()
            .map(|s| s.username.clone())
            .unwrap_or_default()
    }
}

async fn create_from_form(
    api: &ApiClient,
    form: &TodoForm,
    author: String,
) -> Result<TodoResponse, ClientError> {
    let image_url = match &form.image {
        Some(image) => Some(api.upload_image(image).await?.image_url),
        None => None,
    };

    let request = CreateTodoRequest {
        title: form.title.clone(),
        description: non_empty(Some(form.description.clone())),
        author,
        image_url,
    };
    api.create_todo(&request).await
}
