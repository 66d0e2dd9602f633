//! The component event bus described in the design notes: a tagged-variant,
//! destination-addressed request/reply/publish primitive, generalizing the
//! class-based event dispatch of the system this was distilled from.
//!
//! Two pieces:
//! - [`mailbox`] / [`Mailbox`] / [`Inbox`]: a named, bounded channel per
//!   component. A component owns one [`Inbox`] and processes one message to
//!   completion before pulling the next, which is how the "single-threaded
//!   per destination component" guarantee is implemented without locks on
//!   component-local state.
//! - [`Signal`]: the synchronous observer-list primitive DBs use to fan out
//!   mutation events to subscribers in subscription order.

mod mailbox;
mod signal;

pub use mailbox::{mailbox, Inbox, Mailbox, SendError};
pub use signal::Signal;
