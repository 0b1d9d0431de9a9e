use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// Type aliases for clarity
pub type RoomNumber = u32;
pub type Hour = u32;
pub type CandidateId = String;
pub type SubjectCode = String;

pub const DEFAULT_HOURS: u32 = 3;
pub const DEFAULT_CAPACITY: u32 = 60;
pub const DEFAULT_SEATS_PER_BENCH: u32 = 3;

// Upper bounds on a single request
pub const MAX_ROOMS: u32 = 500;
pub const MAX_CAPACITY: u32 = 1_000;
pub const MAX_TOTAL_SEATS: u64 = 50_000;
pub const MAX_CANDIDATES: u64 = 50_000;
pub const MAX_SUBJECTS: usize = 1_000;
pub const MAX_HOURS: u32 = 24;

/// A numeric field that may arrive as a JSON number or as text typed into a form.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum NumberField {
    Int(i64),
    Text(String),
}

impl NumberField {
    pub fn parse(&self) -> Option<i64> {
        match self {
            NumberField::Int(n) => Some(*n),
            NumberField::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for NumberField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberField::Int(n) => write!(f, "{n}"),
            NumberField::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<i64> for NumberField {
    fn from(n: i64) -> Self {
        NumberField::Int(n)
    }
}

impl From<i32> for NumberField {
    fn from(n: i32) -> Self {
        NumberField::Int(n.into())
    }
}

impl From<&str> for NumberField {
    fn from(s: &str) -> Self {
        NumberField::Text(s.to_string())
    }
}

/// One subject row: a code and the inclusive range of roll numbers sitting it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubjectRange {
    pub code: String,
    pub start: NumberField,
    pub end: NumberField,
}

impl SubjectRange {
    pub fn new(code: &str, start: impl Into<NumberField>, end: impl Into<NumberField>) -> Self {
        Self {
            code: code.to_string(),
            start: start.into(),
            end: end.into(),
        }
    }
}

/// What to do with a seat for which every available candidate breaks the adjacency rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FallbackPolicy {
    /// Leave the seat empty and carry on with the next one.
    #[default]
    LeaveEmpty,
    /// Abort the whole run with an unsatisfiable-seating error.
    Fail,
}

fn default_hours() -> u32 {
    DEFAULT_HOURS
}

fn default_capacity() -> u32 {
    DEFAULT_CAPACITY
}

fn default_seats_per_bench() -> u32 {
    DEFAULT_SEATS_PER_BENCH
}

/// The complete input for one seating run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub rooms: NumberField,
    pub subjects: Vec<SubjectRange>,
    pub staff: Vec<String>,
    #[serde(default = "default_hours")]
    pub hours: u32,
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    #[serde(default = "default_seats_per_bench")]
    pub seats_per_bench: u32,
    #[serde(default)]
    pub fallback: FallbackPolicy,
    /// Seed for the invigilation shuffle; entropy is used when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl GenerateRequest {
    /// A request with the default layout, hours and fallback policy.
    pub fn new(rooms: impl Into<NumberField>, subjects: Vec<SubjectRange>, staff: &[&str]) -> Self {
        Self {
            rooms: rooms.into(),
            subjects,
            staff: staff.iter().map(|s| s.to_string()).collect(),
            hours: DEFAULT_HOURS,
            capacity: DEFAULT_CAPACITY,
            seats_per_bench: DEFAULT_SEATS_PER_BENCH,
            fallback: FallbackPolicy::default(),
            seed: None,
        }
    }
}

/// An exam-taker: a generated roll number tagged with its subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub subject: SubjectCode,
}

/// Per-room, per-hour staff assignment.
pub type InvigilationSchedule = BTreeMap<RoomNumber, BTreeMap<Hour, String>>;

/// A limitation of the produced plan that the caller should see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeKind {
    StaffShortage,
    DuplicateStaff,
    UnseatedCandidates,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)
    }
}

/// The final output of a seating run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub seating: BTreeMap<RoomNumber, Vec<Option<CandidateId>>>,
    pub schedule: InvigilationSchedule,
    pub unseated: Vec<CandidateId>,
    pub notices: Vec<Notice>,
}
