//! Courier - copy-on-demand message event envelopes
//!
//! The in-process envelope a pub/sub delivery layer hands to subscriber
//! callbacks: one canonical, never-mutated message shared by every consumer,
//! with a private memoized copy materialized only for consumers that
//! declared mutable access and only on first use.
//!
//! Read-only consumers pay nothing; the first mutating consumer pays exactly
//! one copy; type-erased delivery paths always alias until bridged back to a
//! concrete message type.

mod any_event;
mod error;
mod event;
mod factory;
mod header;
mod time;
mod view;

pub use any_event::AnyMessageEvent;
pub use error::Error;
pub use event::MessageEvent;
pub use factory::MessageFactory;
pub use header::{CALLER_ID_KEY, ConnectionHeader, UNKNOWN_PUBLISHER};
pub use time::Time;
pub use view::{MessageRef, MessageRefMut, MessageView, Qualifier};

pub type Result<T = ()> = std::result::Result<T, Error>;
