use crate::api::Project;
use crate::console::ConsoleState;

/// View-only state: which row is selected and whether keys go to the draft field.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub backend_url: String,
    pub selected: usize,
    pub editing: bool,
}

impl ViewState {
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            selected: 0,
            editing: false,
        }
    }

    /// Keep the selection inside a list that may have shrunk after a refresh.
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    pub fn select_next(&mut self, len: usize) {
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_project<'a>(&self, state: &'a ConsoleState) -> Option<&'a Project> {
        state.projects.get(self.selected)
    }
}
