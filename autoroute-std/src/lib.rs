//! # autoroute-std
//!
//! Discovery, dispatch generation and registration for the autoroute
//! framework.
//!
//! This crate provides:
//! - **Registry**: [`Registry`], the declarations collected from the attribute macros
//! - **Scanning**: [`Scanner`], producing an immutable [`RouteTable`] for one namespace
//! - **Dispatch generation**: [`DispatchGenerator`], [`RouteAdapter`], [`ExceptionAdapter`]
//! - **Registration**: [`Autorouter`] binding a table into a [`RoutingEngine`]
//! - **Route overview**: [`RouteOverview`]
//! - **Configuration and logging** (`config` feature): [`config`], [`logging`]
//!
//! # Pipeline
//!
//! ```text
//! Registry --Scanner::search--> RouteTable --Autorouter::bind_all--> RoutingEngine
//!                                              |
//!                                     DispatchGenerator
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core
pub use autoroute_core;

// Modules
#[cfg(feature = "config")]
pub mod config;
pub mod driver;
pub mod engine;
pub mod generator;
#[cfg(feature = "config")]
pub mod logging;
pub mod overview;
pub mod registry;
pub mod scanner;
pub mod table;
pub mod testing;

pub use driver::{Autorouter, BindReport, SkipReason, Skipped};
pub use engine::RoutingEngine;
pub use generator::{DispatchGenerator, ExceptionAdapter, RouteAdapter};
pub use overview::RouteOverview;
pub use registry::{Registry, RegistryBuilder};
pub use scanner::Scanner;
pub use table::{
    AfterAfterInfo, Entry, ExceptionBinding, FilterInfo, RejectReason, Rejection, RouteInfo,
    RouteTable,
};
