use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Card,
    Table,
}

impl ViewMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "card" | "cards" => Some(Self::Card),
            "table" => Some(Self::Table),
            _ => None,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Self::Card => Self::Table,
            Self::Table => Self::Card,
        }
    }
}

/// Card/table switch with a page size per mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModeToggle {
    mode: ViewMode,
    card_page_size: u64,
    table_page_size: u64,
}

impl ViewModeToggle {
    pub fn new(card_page_size: u64, table_page_size: u64) -> Self {
        Self {
            mode: ViewMode::Card,
            card_page_size: card_page_size.max(1),
            table_page_size: table_page_size.max(1),
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn page_size(&self) -> u64 {
        self.page_size_for(self.mode)
    }

    pub fn page_size_for(&self, mode: ViewMode) -> u64 {
        match mode {
            ViewMode::Card => self.card_page_size,
            ViewMode::Table => self.table_page_size,
        }
    }

    /// Switching needs something on screen to switch views on.
    pub fn is_enabled(&self, has_results: bool) -> bool {
        has_results
    }

    /// Flip the mode. Returns the new mode, or `None` while disabled.
    pub fn toggle(&mut self, has_results: bool) -> Option<ViewMode> {
        if !self.is_enabled(has_results) {
            return None;
        }
        self.mode = self.mode.other();
        Some(self.mode)
    }

    /// Select a mode directly, e.g. from a command-line flag.
    pub fn set(&mut self, mode: ViewMode) {
        self.mode = mode;
    }
}
