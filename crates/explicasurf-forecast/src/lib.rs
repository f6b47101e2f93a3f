//! Surf forecast engine for ExplicaSurf
//!
//! Turns the backend's loosely shaped forecast JSON into canonical records,
//! derives display values from them and shapes chart-ready series. Fetching
//! goes through a per-session cache and a generation-guarded session.

pub mod adapters;
pub mod cache;
pub mod client;
pub mod derive;
pub mod error;
pub mod reconcile;
pub mod retry;
pub mod segment;
pub mod session;
pub mod types;

pub use adapters::{build_charts, conditions_card, ChartOptions, ChartSet, ConditionsCard};
pub use cache::{CachePolicy, ForecastCache};
pub use client::ForecastClient;
pub use error::ForecastError;
pub use reconcile::{reconcile, reconcile_series, reconcile_tide};
pub use retry::RetryPolicy;
pub use segment::{segment_by_day, SegmentedSeries};
pub use session::{ForecastSession, LoadOutcome, Ticket};
pub use types::*;
