// Library surface shared by both binaries and the integration tests.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod highscore;
pub mod input;
pub mod protocol;
pub mod runtime;
pub mod scheduler;
pub mod server;
pub mod session;
pub mod spawner;
pub mod ui;
