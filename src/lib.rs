pub mod app;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod form;
pub mod model;
pub mod remote;
pub mod store;
pub mod toast;
pub mod ui;
