//! # PUSHIN' Core Library
//!
//! Core logic for PUSHIN': distracting apps stay blocked until the user
//! completes a short workout, which earns a window of screen time.
//!
//! ## Architecture
//!
//! - **Access Controller**: a state machine (locked, earning, unlocked,
//!   expired) driven by an injected clock. The caller supplies `now` to every
//!   operation and calls `tick()` periodically; the core never reads a clock.
//! - **Collaborators**: workout tracking, unlock-session bookkeeping and block
//!   enforcement sit behind traits so UI and platform layers plug in their own.
//! - **Storage**: TOML configuration and a SQLite store used by front ends that
//!   do not keep a long-lived process.
//!
//! ## Key Components
//!
//! - [`AccessController`]: core state machine
//! - [`WorkoutTracker`]: reports whether the active workout is done
//! - [`UnlockSessionStore`]: records the active unlock session
//! - [`BlockEnforcer`]: applies blocked/accessible lists on the host
//! - [`Config`]: application configuration

pub mod access;
pub mod enforcement;
pub mod error;
pub mod events;
pub mod storage;
pub mod workout;

pub use access::{
    AccessController, AccessState, BlockTarget, IgnoreReason, MemorySessionStore,
    SavedController, TargetCategory, Transition, UnlockSession, UnlockSessionStore,
};
pub use enforcement::{BlockEnforcer, LogEnforcer};
pub use error::{ConfigError, CoreError, EnforcementError, StoreError, ValidationError};
pub use events::Event;
pub use storage::{Config, Database, SqliteSessionStore};
pub use workout::{RepCounter, TargetUnit, Workout, WorkoutKind, WorkoutTracker};
