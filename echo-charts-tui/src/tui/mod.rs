pub mod app;
pub mod events;
pub mod session;
pub mod theme;
pub mod ui;
