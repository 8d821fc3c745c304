//! UI components for POI Map.
//!
//! The sidebar (search, category filter, locate button, place list), the
//! marker popup and the blocking notice dialog.

pub mod notice;
pub mod popup;
pub mod sidebar;

pub use notice::Notice;
pub use popup::{PopupAction, PopupView};
pub use sidebar::{search_id, Sidebar, SidebarAction};
