//! Mail delivery collaborators
//!
//! Outbound email is provided by an external service; this module carries
//! the development implementation that only records deliveries in the log.

mod logging;

pub use logging::LoggingMailService;
