mod list_view;
mod status_bar;

pub use list_view::{footer_text, header_text, ListViewWidget};
pub use status_bar::StatusBarWidget;
