//! Exam seating and invigilation planning.
//!
//! Candidates are expanded from subject roll-number ranges, seated room by
//! room so that neighbours on a bench never share a subject, and staff are
//! rotated through the rooms hour by hour.

pub mod allocator;
pub mod config;
pub mod data;
pub mod error;
pub mod invigilation;
pub mod pool;
pub mod roster;
pub mod server;
pub mod solver;
