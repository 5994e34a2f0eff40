//! # lendcurve Traits
//!
//! Seams between the lendcurve engine and the collaborators it does not own.
//!
//! ## Module Structure
//!
//! - [`custody`]: Token custody (`Fund`) that holds pool balances and moves tokens
//! - [`registry`]: Instrument activation, administrative roles, and the
//!   issuer-to-token strategy
//! - [`clock`]: Time source; every time-dependent quantity is computed from it
//! - [`events`]: Events the engine emits and the publisher interface
//!
//! ## Dependency Injection
//!
//! The engine receives implementations of these traits at construction:
//!
//! ```ignore
//! LendingEngineBuilder::new()
//!     .with_fund(impl Fund)
//!     .with_instruments(impl InstrumentRegistry)
//!     .with_roles(impl RoleRegistry)
//!     .with_clock(impl Clock)
//!     .with_events(impl EventPublisher)
//!     .build()
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod custody;
pub mod error;
pub mod events;
pub mod registry;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use custody::Fund;
pub use error::{TraitError, TraitResult};
pub use events::{EventPublisher, EventReceiver, LendingEvent, WithdrawalOutcome};
pub use registry::{InstrumentRegistry, IssuerStrategy, Role, RoleRegistry};
