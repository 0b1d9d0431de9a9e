use itertools::Itertools;
use thiserror::Error;

use crate::data::{CandidateId, RoomNumber};

/// A problem with the request, detected before any seat is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("room count must be a positive integer, got {0}")]
    InvalidRoomCount(String),

    #[error("subject '{code}' has an invalid range: {reason}")]
    InvalidSubjectRange { code: String, reason: String },

    #[error("at least one staff name is required")]
    EmptyStaffList,

    #[error("roll number {id} is produced more than once")]
    DuplicateCandidate { id: CandidateId },

    #[error("hours must be at least 1")]
    InvalidHours,

    #[error("room capacity must be at least 1")]
    InvalidCapacity,

    #[error("seats per bench must be at least 1")]
    InvalidSeatsPerBench,

    #[error("{rooms} rooms requested, at most {max} allowed")]
    TooManyRooms { rooms: i64, max: u32 },

    #[error("room capacity {capacity} exceeds the limit of {max}")]
    CapacityTooLarge { capacity: u32, max: u32 },

    #[error("{seats} seats in total exceeds the limit of {max}")]
    TooManySeats { seats: u64, max: u64 },

    #[error("{count} candidates exceeds the limit of {max}")]
    TooManyCandidates { count: u64, max: u64 },

    #[error("{count} subject rows exceeds the limit of {max}")]
    TooManySubjects { count: usize, max: usize },

    #[error("{hours} hours exceeds the limit of {max}")]
    TooManyHours { hours: u32, max: u32 },
}

#[derive(Debug, Error)]
pub enum GenerateError {
    /// Every validation problem found in the request.
    #[error("invalid input: {}", .0.iter().join("; "))]
    Invalid(Vec<ValidationError>),

    #[error(
        "seat {seat} in room {room} cannot be filled: all {rejected} available candidates share a subject with a neighbour"
    )]
    UnsatisfiableSeating {
        room: RoomNumber,
        /// 1-based seat position within the room.
        seat: u32,
        rejected: usize,
    },
}

impl GenerateError {
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            GenerateError::Invalid(errors) => errors,
            GenerateError::UnsatisfiableSeating { .. } => &[],
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
}
