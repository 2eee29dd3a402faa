//! feedgrid: a GTK4 client for a remote image-aggregator service.
//!
//! The interesting part is the windowed rendering and navigation core under
//! [`grid`] and [`ui::navigator`]: an unbounded, filterable image collection
//! rendered through a bounded widget window, with a full-screen viewer that
//! keeps a stable logical index while the collection mutates underneath it.

pub mod app;
pub mod config;
pub mod grid;
pub mod models;
pub mod service;
pub mod ui;
