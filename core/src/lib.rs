//! shopfix core library
//!
//! Database command executor, service layer and filesystem helpers used to
//! provision and restore shop test environments.

pub mod adapter;
pub mod command;
pub mod config;
pub mod database;
pub mod domain;
pub mod error;
pub mod files;
pub mod runner;
pub mod services;

pub use config::ConnectionParams;
pub use database::DatabaseHandler;
pub use error::{CoreError, Result};
