//! List-screen state shared by every entity page.
//!
//! # Design
//! `CrudPage` is a plain state machine with no I/O: the host calls a
//! `begin_*` method, performs the request, then feeds the `Result` into the
//! matching `finish_*` method, which patches the list and returns the
//! [`Notice`] to show. The list is only touched on success, so a failed
//! request leaves the screen exactly as it was.
//!
//! One shared [`Drawer`] value means the view, create and edit drawers are
//! mutually exclusive by construction.

use std::fmt;

use crate::error::ApiError;
use crate::resource::Resource;
use crate::types::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient toast message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NoticeLevel::Success => write!(f, "✓ {}", self.message),
            NoticeLevel::Error => write!(f, "✗ {}", self.message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Drawer {
    #[default]
    Closed,
    Viewing(i64),
    Creating,
    Editing(i64),
}

/// What an in-flight submit will do once it resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTarget {
    Create,
    Update(i64),
}

#[derive(Debug, Clone)]
pub struct CrudPage<R> {
    items: Vec<R>,
    count: u64,
    page: u32,
    is_loading: bool,
    drawer: Drawer,
    submitting: Option<SubmitTarget>,
    pending_delete: Option<i64>,
    is_deleting: bool,
}

impl<R: Resource> Default for CrudPage<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> CrudPage<R> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            count: 0,
            page: 1,
            is_loading: false,
            drawer: Drawer::Closed,
            submitting: None,
            pending_delete: None,
            is_deleting: false,
        }
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn drawer(&self) -> Drawer {
        self.drawer
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.is_some()
    }

    pub fn pending_delete(&self) -> Option<i64> {
        self.pending_delete
    }

    pub fn is_delete_dialog_open(&self) -> bool {
        self.pending_delete.is_some()
    }

    pub fn find(&self, id: i64) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Merge a record fetched on its own (detail route) into the list, so
    /// the drawers and the delete dialog can target it.
    pub fn track(&mut self, record: R) {
        match self.items.iter_mut().find(|item| item.id() == record.id()) {
            Some(slot) => *slot = record,
            None => {
                self.items.insert(0, record);
                self.count += 1;
            }
        }
    }

    // -- loading -----------------------------------------------------------

    /// Start loading `page`; returns the page number to request.
    pub fn begin_load(&mut self, page: u32) -> u32 {
        self.page = page.max(1);
        self.is_loading = true;
        self.page
    }

    pub fn finish_load(&mut self, result: Result<Page<R>, ApiError>) -> Option<Notice> {
        self.is_loading = false;
        match result {
            Ok(page) => {
                tracing::debug!(resource = R::COLLECTION, rows = page.results.len(), "list loaded");
                self.items = page.results;
                self.count = page.count;
                None
            }
            Err(err) => {
                tracing::warn!(resource = R::COLLECTION, error = %err, "list load failed");
                Some(Notice::error(format!(
                    "Erro ao carregar {}: {}",
                    R::COLLECTION,
                    err.user_message()
                )))
            }
        }
    }

    // -- drawer ------------------------------------------------------------

    pub fn open_create(&mut self) -> bool {
        if self.is_submitting() {
            return false;
        }
        self.drawer = Drawer::Creating;
        true
    }

    /// Open the edit drawer and hand back the record to seed the form with.
    pub fn open_edit(&mut self, id: i64) -> Option<&R> {
        if self.is_submitting() {
            return None;
        }
        let index = self.items.iter().position(|item| item.id() == id)?;
        self.drawer = Drawer::Editing(id);
        self.items.get(index)
    }

    pub fn open_view(&mut self, id: i64) -> Option<&R> {
        if self.is_submitting() {
            return None;
        }
        let index = self.items.iter().position(|item| item.id() == id)?;
        self.drawer = Drawer::Viewing(id);
        self.items.get(index)
    }

    pub fn close_drawer(&mut self) {
        if !self.is_submitting() {
            self.drawer = Drawer::Closed;
        }
    }

    // -- submit ------------------------------------------------------------

    /// Mark a submit in flight. `None` when no form drawer is open or a
    /// submit is already running.
    pub fn begin_submit(&mut self) -> Option<SubmitTarget> {
        if self.submitting.is_some() {
            return None;
        }
        let target = match self.drawer {
            Drawer::Creating => SubmitTarget::Create,
            Drawer::Editing(id) => SubmitTarget::Update(id),
            Drawer::Closed | Drawer::Viewing(_) => return None,
        };
        self.submitting = Some(target);
        Some(target)
    }

    pub fn finish_submit(&mut self, result: Result<R, ApiError>) -> Notice {
        let Some(target) = self.submitting.take() else {
            return Notice::error("Nenhum envio em andamento.");
        };
        match result {
            Ok(record) => {
                let message = match target {
                    SubmitTarget::Create => {
                        self.items.insert(0, record);
                        self.count += 1;
                        format!("{}: cadastro realizado com sucesso.", R::LABEL)
                    }
                    SubmitTarget::Update(_) => {
                        self.track(record);
                        format!("{}: alterações salvas.", R::LABEL)
                    }
                };
                self.drawer = Drawer::Closed;
                Notice::success(message)
            }
            Err(err) => {
                tracing::warn!(resource = R::COLLECTION, error = %err, "submit failed");
                Notice::error(format!("Erro ao salvar: {}", err.user_message()))
            }
        }
    }

    // -- delete ------------------------------------------------------------

    /// Open the confirmation dialog for `id`.
    pub fn request_delete(&mut self, id: i64) -> bool {
        if self.is_deleting || self.find(id).is_none() {
            return false;
        }
        self.pending_delete = Some(id);
        true
    }

    pub fn cancel_delete(&mut self) {
        if !self.is_deleting {
            self.pending_delete = None;
        }
    }

    /// Confirm the dialog; returns the id to delete.
    pub fn begin_delete(&mut self) -> Option<i64> {
        if self.is_deleting {
            return None;
        }
        let id = self.pending_delete?;
        self.is_deleting = true;
        Some(id)
    }

    /// On failure the dialog stays open so the user can retry or cancel.
    pub fn finish_delete(&mut self, result: Result<(), ApiError>) -> Notice {
        self.is_deleting = false;
        let Some(id) = self.pending_delete else {
            return Notice::error("Nenhuma exclusão pendente.");
        };
        match result {
            Ok(()) => {
                let before = self.items.len();
                self.items.retain(|item| item.id() != id);
                if self.items.len() < before {
                    self.count = self.count.saturating_sub(1);
                }
                self.pending_delete = None;
                if matches!(self.drawer, Drawer::Viewing(open) | Drawer::Editing(open) if open == id) {
                    self.drawer = Drawer::Closed;
                }
                Notice::success(format!("{}: registro excluído.", R::LABEL))
            }
            Err(err) => {
                tracing::warn!(resource = R::COLLECTION, id, error = %err, "delete failed");
                Notice::error(format!("Erro ao excluir: {}", err.user_message()))
            }
        }
    }
}
