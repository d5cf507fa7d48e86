pub mod app;
pub mod presenter;
