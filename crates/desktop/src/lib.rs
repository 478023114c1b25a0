//! `stockscan-desktop`
//!
//! **Responsibility:** the client shell around the inventory domain.
//!
//! This crate provides:
//! - The application composition point ([`InventoryApp`])
//! - Local persistence (SQLite snapshot + preferences)
//! - Scanner debounce and rendering ports
//! - Configuration from the environment
//!
//! Domain rules live in `stockscan-inventory`; this crate only performs IO.

pub mod app;
pub mod config;
pub mod gateway;
pub mod preferences;
pub mod render;
pub mod scanner;
pub mod sqlite;

pub use app::{Committed, InventoryApp, SubmitMode, SubmitOutcome};
pub use config::{AppConfig, ConfigError};
pub use gateway::{InMemoryGateway, PersistenceError, PersistenceGateway};
pub use preferences::Theme;
pub use render::{BarcodeRenderer, ChartRenderer, NullChart, TextChart, TextLabelRenderer};
pub use scanner::{KeyboardWedge, ScanDecision, ScanGate, ScanSession, Scanner, ScannerError};
pub use sqlite::SqliteGateway;
