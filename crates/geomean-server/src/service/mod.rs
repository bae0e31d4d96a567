//! Application state shared by all handlers.

mod service_state;

pub use service_state::ServiceState;
