pub mod assets;
pub mod cli;
pub mod config;
pub mod iface;
pub mod ui;
