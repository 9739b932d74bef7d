//! Domain model: the submission entity, its value objects, and the ports
//! the application layer depends on.

pub mod ports;
pub mod submission;
