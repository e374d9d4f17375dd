//! # petrocost runner (S: Service)
//!
//! Orchestrates the other layers for one run:
//!
//! 1. load [`AppConfig`] (TOML, `PETROCOST_*` overrides)
//! 2. load the weekly price sheet and quote crude ([`adapter_feeds`])
//! 3. derive costs, estimate sensitivities, project the current snapshot and
//!    the scenario ladder ([`petro_models`], [`petro_risk`])
//! 4. write the SVG dashboard and the result CSV ([`report`])
//!
//! The `petrocost` binary is a thin wrapper over [`pipeline::execute`].

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;

pub use config::{AppConfig, ConfigError};
pub use error::{CliError, Result};
pub use pipeline::RunOutput;
