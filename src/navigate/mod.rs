//! Navigation client
//!
//! The in-memory state machine behind the browsing UI: current path and
//! view, a bounded back-navigation history, the admin flag, and the edit
//! draft. Rendering is not handled here; callers fetch listings and file
//! content from the directory service and feed state transitions in.

pub mod history;
pub mod session;

pub use history::{EntryKind, HistoryStack, NavigationEntry};
pub use session::{NavigationSession, View, breadcrumb_segments};
