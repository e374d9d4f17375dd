//! Scenario ladder and execution.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               Scenario Runner                │
//! ├──────────────────────────────────────────────┤
//! │  ScenarioPreset  - Canonical stress levels   │
//! │  ScenarioSpec    - Label, crude, premium     │
//! │  ScenarioLadder  - Ordered, validated specs  │
//! │  ScenarioRunner  - Projector per ladder rung │
//! └──────────────────────────────────────────────┘
//! ```

mod ladder;
mod presets;
mod runner;

pub use ladder::{ScenarioLadder, ScenarioSpec};
pub use presets::ScenarioPreset;
pub use runner::{ScenarioOutcome, ScenarioRunner};
