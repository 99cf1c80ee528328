//! Catalog browsing: paging, card/table view and the search view-model.

pub mod pagination;
pub mod view_mode;
pub mod view_model;

pub use pagination::{PageDirection, Pagination};
pub use view_mode::{ViewMode, ViewModeToggle};
pub use view_model::{CatalogSource, CatalogViewModel, QueryOutcome, QueryTicket};
