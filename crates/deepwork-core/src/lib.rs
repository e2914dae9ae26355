//! # Deep Work Core Library
//!
//! This library provides the core logic behind the Deep Work focus timer:
//! a Focus/Break countdown that halts at every phase boundary and counts the
//! Focus phases that ran to completion.
//!
//! ## Architecture
//!
//! - **Session Timer**: A clock-free state machine that requires the caller
//!   to invoke `tick()` once per elapsed second
//! - **Ticker**: A repeating tokio task with a cancellation handle
//! - **Driver**: Connects one timer to one ticker and publishes state changes
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`SessionTimer`]: Core timer state machine
//! - [`TimerDriver`]: Real-time wiring with observable state
//! - [`Config`]: Application configuration management

pub mod driver;
pub mod error;
pub mod events;
pub mod storage;
pub mod ticker;
pub mod timer;

pub use driver::{TimerDriver, DEFAULT_TICK_PERIOD};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::{Event, SubscriptionId, Subscribers};
pub use storage::Config;
pub use ticker::{Ticker, TickerHandle};
pub use timer::{Phase, PhaseBoundary, PhaseDurations, SessionState, SessionTimer, Snapshot};
