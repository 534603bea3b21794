//! Suggestion dropdown with keyboard selection

use crate::providers::Suggestion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    Enter,
    Escape,
}

/// What a key press asks the caller to do
#[derive(Debug, Clone, PartialEq)]
pub enum NavOutcome {
    /// Selection moved or nothing happened
    Moved(Option<usize>),
    /// Enter on a highlighted suggestion
    Picked(Suggestion),
    /// Escape closed the list
    Closed,
}

#[derive(Debug, Clone, Default)]
pub struct SuggestionList {
    items: Vec<Suggestion>,
    selected: Option<usize>,
    visible: bool,
}

impl SuggestionList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the items; selection starts over
    pub fn show(&mut self, items: Vec<Suggestion>) {
        self.visible = !items.is_empty();
        self.items = items;
        self.selected = None;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.selected = None;
    }

    #[must_use]
    pub fn items(&self) -> &[Suggestion] {
        &self.items
    }

    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn handle_key(&mut self, key: NavKey) -> NavOutcome {
        if !self.visible {
            return NavOutcome::Moved(self.selected);
        }

        match key {
            NavKey::Down => {
                let last = self.items.len().saturating_sub(1);
                self.selected = Some(self.selected.map_or(0, |i| (i + 1).min(last)));
                NavOutcome::Moved(self.selected)
            }
            NavKey::Up => {
                self.selected = self.selected.and_then(|i| i.checked_sub(1));
                NavOutcome::Moved(self.selected)
            }
            NavKey::Enter => match self.selected.and_then(|i| self.items.get(i)).cloned() {
                Some(suggestion) => {
                    self.hide();
                    NavOutcome::Picked(suggestion)
                }
                None => NavOutcome::Moved(None),
            },
            NavKey::Escape => {
                self.hide();
                NavOutcome::Closed
            }
        }
    }
}
