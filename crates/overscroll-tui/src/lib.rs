pub mod app;
pub mod event;
pub mod input;
pub mod list;
pub mod theme;
pub mod views;
pub mod widgets;

pub use app::App;
pub use theme::Theme;
