use crate::data::{Candidate, CandidateId, SubjectCode};
use std::collections::{BTreeMap, VecDeque};

/// Candidates not yet seated, queued per subject in roll-number order.
///
/// Subjects are kept in ascending code order, which for a sorted roster is
/// also the order in which they first appear. A candidate leaves the pool
/// only by being seated.
#[derive(Debug, Clone, Default)]
pub struct SubjectPool {
    subjects: Vec<(SubjectCode, VecDeque<Candidate>)>,
}

/// A room-local view of the pool: the subjects still on offer, in order.
///
/// Entries of one subject sit together in the pool order and the adjacency
/// rule only looks at subjects, so a rejection always drops the rest of that
/// subject's run. Tracking subjects instead of candidates keeps the view in
/// step with the pool without copying it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    live: VecDeque<usize>,
}

impl Snapshot {
    pub fn front(&self) -> Option<usize> {
        self.live.front().copied()
    }

    pub fn drop_front(&mut self) {
        self.live.pop_front();
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

impl SubjectPool {
    pub fn from_roster(roster: &[Candidate]) -> Self {
        let mut queues: BTreeMap<SubjectCode, VecDeque<Candidate>> = BTreeMap::new();
        for candidate in roster {
            queues
                .entry(candidate.subject.clone())
                .or_default()
                .push_back(candidate.clone());
        }
        Self {
            subjects: queues.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.subjects.iter().map(|(_, queue)| queue.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.iter().all(|(_, queue)| queue.is_empty())
    }

    /// Everything still available, subject by subject.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            live: self
                .subjects
                .iter()
                .enumerate()
                .filter(|(_, (_, queue))| !queue.is_empty())
                .map(|(index, _)| index)
                .collect(),
        }
    }

    /// Next candidate of a subject, without removing it.
    pub fn peek(&self, subject: usize) -> Option<&Candidate> {
        self.subjects.get(subject).and_then(|(_, queue)| queue.front())
    }

    /// How many candidates of a subject are still waiting.
    pub fn waiting(&self, subject: usize) -> usize {
        self.subjects.get(subject).map_or(0, |(_, queue)| queue.len())
    }

    /// Removes and returns the next candidate of a subject.
    pub fn take_front(&mut self, subject: usize) -> Option<Candidate> {
        self.subjects
            .get_mut(subject)
            .and_then(|(_, queue)| queue.pop_front())
    }

    pub fn into_remaining(self) -> Vec<CandidateId> {
        self.subjects
            .into_iter()
            .flat_map(|(_, queue)| queue)
            .map(|c| c.id)
            .collect()
    }
}
