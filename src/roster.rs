use crate::data::{Candidate, SubjectRange};
use crate::error::ValidationError;
use itertools::Itertools;

/// A subject row whose range has been checked and parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectSpec {
    pub code: String,
    pub start: u32,
    pub end: u32,
}

/// Checks one subject row: non-empty code, integer bounds, `0 <= start <= end`.
pub fn parse_subject(range: &SubjectRange) -> Result<SubjectSpec, ValidationError> {
    let code = range.code.trim();
    let invalid = |reason: String| ValidationError::InvalidSubjectRange {
        code: code.to_string(),
        reason,
    };

    if code.is_empty() {
        return Err(invalid("subject code is empty".to_string()));
    }
    let start = range
        .start
        .parse()
        .ok_or_else(|| invalid(format!("start {} is not an integer", range.start)))?;
    let end = range
        .end
        .parse()
        .ok_or_else(|| invalid(format!("end {} is not an integer", range.end)))?;
    if start < 0 {
        return Err(invalid(format!("start {start} is negative")));
    }
    if start > end {
        return Err(invalid(format!("start {start} is greater than end {end}")));
    }
    let start = u32::try_from(start).map_err(|_| invalid(format!("start {start} is too large")))?;
    let end = u32::try_from(end).map_err(|_| invalid(format!("end {end} is too large")))?;

    Ok(SubjectSpec {
        code: code.to_string(),
        start,
        end,
    })
}

/// Roll number for the `n`th candidate of a subject, e.g. `CS007`.
pub fn roll_number(code: &str, n: u32) -> String {
    format!("{code}{n:03}")
}

/// Number of candidates the ranges expand to, without expanding them.
pub fn roster_size(subjects: &[SubjectSpec]) -> u64 {
    subjects
        .iter()
        .map(|s| u64::from(s.end - s.start) + 1)
        .sum()
}

/// Expands every subject range into candidates, sorted by roll number.
pub fn build_roster(subjects: &[SubjectSpec]) -> Vec<Candidate> {
    subjects
        .iter()
        .flat_map(|s| {
            (s.start..=s.end).map(move |n| Candidate {
                id: roll_number(&s.code, n),
                subject: s.code.clone(),
            })
        })
        .sorted_by(|a, b| a.id.cmp(&b.id))
        .collect()
}

/// Reports each roll number that occurs more than once in a sorted roster.
pub fn find_duplicates(roster: &[Candidate]) -> Vec<ValidationError> {
    roster
        .iter()
        .tuple_windows()
        .filter(|(a, b)| a.id == b.id)
        .map(|(a, _)| a.id.clone())
        .dedup()
        .map(|id| ValidationError::DuplicateCandidate { id })
        .collect()
}
