mod controller;
mod session;
mod target;

pub use controller::{AccessController, AccessState, IgnoreReason, SavedController, Transition};
pub use session::{MemorySessionStore, UnlockSession, UnlockSessionStore};
pub use target::{BlockTarget, TargetCategory};
