//! # Mortgage Rate Poller
//!
//! Samples published mortgage rates and stores every observation as a point in InfluxDB.
//!
//! ## Architecture
//!
//! - **`extract`**: turns a fetched page or API response into an optional rate
//! - **`source`**: fetches one configured source and runs its extractor
//! - **`provision`**: makes sure the target bucket exists before anything is written
//! - **`writer`**: writes one `mortgage_rate` point per sample
//! - **`poller`**: provisions once, then polls every source each cycle until cancelled
//!
//! The store session is owned by the [`Poller`] and released when it stops.

#[macro_use]
extern crate tracing;

mod app;
pub mod clock;
pub mod extract;
mod logging;
pub mod poller;
pub mod provision;
pub mod sample;
pub mod source;
pub mod writer;

#[cfg(test)]
mod test_support;

pub use app::App;
pub use clock::{
    Clock,
    SystemClock,
};
pub use logging::{
    init_errors,
    init_logging,
};
pub use poller::{
    Poller,
    RunSummary,
};
pub use rate_poller_config::Args;
pub use sample::RateSample;
