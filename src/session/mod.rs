//! Room session state machine.
//!
//! [`Session::apply`] folds collaborator events into the local view of a
//! room; [`Session::submit_move`] and [`Session::replay`] produce the
//! outbound events. Neither touches a transport, so the whole lifecycle is
//! testable without one.

mod error;
mod state;

pub use error::{MoveRejected, SessionError};
pub use state::{Phase, Session, Status, Transition};
