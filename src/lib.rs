pub mod app;
pub mod block_actions;
pub mod config;
pub mod document;
pub mod editor_host;
pub mod error;
pub mod export;
pub mod hover;
pub mod notify;
pub mod shell;
pub mod slash;
pub mod slash_menu;
pub mod toolbar;
