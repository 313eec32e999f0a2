//! Order actions
//!
//! The engine core: placing an order (reserve + create + payment request),
//! cancelling it (guarded transition + restock), and reconciling the
//! gateway's asynchronous verification callback. Each action is a small
//! module; all of them go through the repository layer's atomic primitives.

pub mod cancel;
pub mod place;
pub mod reconcile;

pub use cancel::cancel_order;
pub use place::{PlacedOrder, place_order};
pub use reconcile::{ReconcileOutcome, handle_callback};
