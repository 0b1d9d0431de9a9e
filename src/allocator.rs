use crate::data::{
    Candidate, CandidateId, DEFAULT_CAPACITY, DEFAULT_SEATS_PER_BENCH, FallbackPolicy,
    MAX_CAPACITY, RoomNumber,
};
use crate::error::{GenerateError, ValidationError};
use crate::pool::{Snapshot, SubjectPool};
use itertools::Itertools;
use log::{debug, trace, warn};
use std::fmt;

/// Physical shape of every room.
///
/// Both dimensions are at least 1 and the capacity is at most
/// [`MAX_CAPACITY`]; [`SeatingLayout::new`] is the only way to build one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatingLayout {
    capacity: u32,
    seats_per_bench: u32,
}

impl SeatingLayout {
    pub fn new(capacity: u32, seats_per_bench: u32) -> Result<Self, Vec<ValidationError>> {
        let mut errors = Vec::new();
        if capacity == 0 {
            errors.push(ValidationError::InvalidCapacity);
        }
        if capacity > MAX_CAPACITY {
            errors.push(ValidationError::CapacityTooLarge {
                capacity,
                max: MAX_CAPACITY,
            });
        }
        if seats_per_bench == 0 {
            errors.push(ValidationError::InvalidSeatsPerBench);
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self {
            capacity,
            seats_per_bench,
        })
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn seats_per_bench(&self) -> u32 {
        self.seats_per_bench
    }

    pub fn benches(&self) -> u32 {
        self.capacity.div_ceil(self.seats_per_bench)
    }

    /// Whether `position` is the last seat of a bench wide enough to have a
    /// separate first seat to compare against.
    fn closes_bench(&self, position: usize) -> bool {
        let width = self.seats_per_bench as usize;
        width >= 3 && position % width == width - 1
    }
}

impl Default for SeatingLayout {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            seats_per_bench: DEFAULT_SEATS_PER_BENCH,
        }
    }
}

/// The seats of one room in order; `None` marks an empty seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSeating {
    pub room: RoomNumber,
    pub seats: Vec<Option<Candidate>>,
    seats_per_bench: usize,
}

impl RoomSeating {
    pub fn seated(&self) -> usize {
        self.seats.iter().flatten().count()
    }

    pub fn empty(&self) -> usize {
        self.seats.len() - self.seated()
    }

    pub fn benches(&self) -> impl Iterator<Item = &[Option<Candidate>]> {
        self.seats.chunks(self.seats_per_bench)
    }

    pub fn into_ids(self) -> Vec<Option<CandidateId>> {
        self.seats
            .into_iter()
            .map(|seat| seat.map(|c| c.id))
            .collect()
    }
}

impl fmt::Display for RoomSeating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Room {}", self.room)?;
        for (index, bench) in self.benches().enumerate() {
            let seats = bench
                .iter()
                .map(|seat| seat.as_ref().map_or("-", |c| c.id.as_str()))
                .join(" | ");
            writeln!(f, "  Bench {:>2}: {}", index + 1, seats)?;
        }
        Ok(())
    }
}

/// Result of seating every room.
#[derive(Debug, Clone)]
pub struct Allocation {
    pub rooms: Vec<RoomSeating>,
    /// Candidates still waiting after the last room was filled.
    pub unseated: Vec<CandidateId>,
}

enum SeatOutcome {
    Placed,
    Exhausted { rejected: usize },
}

/// Seats a sorted roster room by room.
///
/// Each room starts from a snapshot of the pool and fills its seats front to
/// back. A candidate that would sit next to someone of the same subject is
/// skipped for the rest of the snapshot but stays in the pool, so it can be
/// seated after the snapshot is refreshed or in a later room. A seated
/// candidate leaves the pool at once and is never offered again.
///
/// Work grows with `room_count` times the layout capacity; callers taking
/// these from a request bound them first.
pub fn allocate(
    roster: &[Candidate],
    room_count: u32,
    layout: SeatingLayout,
    policy: FallbackPolicy,
) -> Result<Allocation, GenerateError> {
    let mut pool = SubjectPool::from_roster(roster);
    let mut rooms = Vec::new();

    for room in 1..=room_count {
        let (seating, rest) = seat_room(room, pool, layout, policy)?;
        pool = rest;
        debug!(
            "Room {}: {} seated, {} empty, {} still waiting.",
            room,
            seating.seated(),
            seating.empty(),
            pool.len()
        );
        trace!("{seating}");
        rooms.push(seating);
    }

    let unseated = pool.into_remaining();
    if !unseated.is_empty() {
        warn!(
            "{} candidates could not be seated in {} rooms.",
            unseated.len(),
            room_count
        );
    }
    Ok(Allocation { rooms, unseated })
}

/// Fills one room, taking the pool and handing back what is left of it.
fn seat_room(
    room: RoomNumber,
    mut pool: SubjectPool,
    layout: SeatingLayout,
    policy: FallbackPolicy,
) -> Result<(RoomSeating, SubjectPool), GenerateError> {
    let capacity = layout.capacity as usize;
    let mut seats: Vec<Option<Candidate>> = Vec::new();
    let mut available = pool.snapshot();

    while seats.len() < capacity {
        let outcome = match fill_seat(&mut seats, &mut available, &mut pool, layout) {
            SeatOutcome::Exhausted { rejected } if rejected > 0 && policy == FallbackPolicy::Fail => {
                available = pool.snapshot();
                fill_seat(&mut seats, &mut available, &mut pool, layout)
            }
            outcome => outcome,
        };

        if let SeatOutcome::Exhausted { rejected } = outcome {
            if rejected > 0 && policy == FallbackPolicy::Fail {
                return Err(GenerateError::UnsatisfiableSeating {
                    room,
                    seat: seats.len() as u32 + 1,
                    rejected,
                });
            }
            seats.push(None);
            available = pool.snapshot();
        }
    }

    let seating = RoomSeating {
        room,
        seats,
        seats_per_bench: layout.seats_per_bench as usize,
    };
    Ok((seating, pool))
}

/// Offers snapshot entries for the next seat until one fits.
///
/// Each pass either seats a candidate or drops one subject from the
/// snapshot, so a seat costs at most one attempt per subject.
fn fill_seat(
    seats: &mut Vec<Option<Candidate>>,
    available: &mut Snapshot,
    pool: &mut SubjectPool,
    layout: SeatingLayout,
) -> SeatOutcome {
    let mut rejected = 0;
    while let Some(subject) = available.front() {
        let Some(chosen) = pool.peek(subject) else {
            available.drop_front();
            continue;
        };
        if breaks_adjacency(seats, chosen, layout) {
            // the rest of this subject's run fails the same check
            rejected += pool.waiting(subject);
            available.drop_front();
            continue;
        }
        // removal and append happen together or not at all
        if let Some(chosen) = pool.take_front(subject) {
            seats.push(Some(chosen));
            return SeatOutcome::Placed;
        }
    }
    SeatOutcome::Exhausted { rejected }
}

/// Whether `chosen` would share a subject with the previous seat, or with the
/// first seat of the bench it would close.
fn breaks_adjacency(seats: &[Option<Candidate>], chosen: &Candidate, layout: SeatingLayout) -> bool {
    let position = seats.len();
    let same_subject = |index: usize| {
        matches!(seats.get(index), Some(Some(c)) if c.subject == chosen.subject)
    };

    if position > 0 && same_subject(position - 1) {
        return true;
    }
    layout.closes_bench(position) && same_subject(position + 1 - layout.seats_per_bench as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{SubjectSpec, build_roster};
    use std::collections::HashSet;

    fn roster(subjects: &[(&str, u32, u32)]) -> Vec<Candidate> {
        let specs: Vec<SubjectSpec> = subjects
            .iter()
            .map(|(code, start, end)| SubjectSpec {
                code: code.to_string(),
                start: *start,
                end: *end,
            })
            .collect();
        build_roster(&specs)
    }

    fn layout(capacity: u32) -> SeatingLayout {
        SeatingLayout::new(capacity, 3).unwrap()
    }

    fn assert_adjacency(allocation: &Allocation, layout: SeatingLayout) {
        let width = layout.seats_per_bench as usize;
        for room in &allocation.rooms {
            for pair in room.seats.windows(2) {
                if let [Some(a), Some(b)] = pair {
                    assert_ne!(a.subject, b.subject, "neighbours {} and {} in room {}", a.id, b.id, room.room);
                }
            }
            for bench in room.seats.chunks(width).filter(|b| b.len() == width && width >= 3) {
                if let (Some(first), Some(last)) = (&bench[0], &bench[width - 1]) {
                    assert_ne!(first.subject, last.subject, "bench ends {} and {}", first.id, last.id);
                }
            }
        }
    }

    fn assert_no_duplicates(allocation: &Allocation) {
        let mut seen = HashSet::new();
        for candidate in allocation.rooms.iter().flat_map(|r| r.seats.iter().flatten()) {
            assert!(seen.insert(candidate.id.clone()), "{} seated twice", candidate.id);
        }
        for id in &allocation.unseated {
            assert!(!seen.contains(id), "{id} is both seated and unseated");
        }
    }

    fn seated_ids(room: &RoomSeating) -> Vec<&str> {
        room.seats.iter().flatten().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn every_room_has_exactly_capacity_seats() {
        let candidates = roster(&[("CS", 1, 50), ("MA", 1, 40), ("PH", 1, 10)]);
        let allocation = allocate(&candidates, 3, layout(60), FallbackPolicy::LeaveEmpty).unwrap();
        assert_eq!(allocation.rooms.len(), 3);
        assert!(allocation.rooms.iter().all(|r| r.seats.len() == 60));
        assert_eq!(
            allocation.rooms.iter().map(|r| r.room).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn mixed_subjects_keep_invariants() {
        let candidates = roster(&[("CS", 1, 70), ("EE", 1, 45), ("MA", 1, 33), ("PH", 5, 29)]);
        let allocation = allocate(&candidates, 4, layout(60), FallbackPolicy::LeaveEmpty).unwrap();
        assert_adjacency(&allocation, layout(60));
        assert_no_duplicates(&allocation);
        let seated: usize = allocation.rooms.iter().map(RoomSeating::seated).sum();
        assert_eq!(seated + allocation.unseated.len(), candidates.len());
    }

    #[test]
    fn distinct_subjects_fill_completely() {
        let candidates = roster(&[
            ("A", 1, 1),
            ("B", 1, 1),
            ("C", 1, 1),
            ("D", 1, 1),
            ("E", 1, 1),
            ("F", 1, 1),
            ("G", 1, 1),
        ]);
        let allocation = allocate(&candidates, 2, layout(3), FallbackPolicy::LeaveEmpty).unwrap();
        assert_eq!(seated_ids(&allocation.rooms[0]), vec!["A001", "B001", "C001"]);
        assert_eq!(seated_ids(&allocation.rooms[1]), vec!["D001", "E001", "F001"]);
        assert_eq!(allocation.unseated, vec!["G001".to_string()]);
    }

    #[test]
    fn spare_capacity_is_empty_markers() {
        let candidates = roster(&[("A", 1, 1), ("B", 1, 1)]);
        let allocation = allocate(&candidates, 2, layout(6), FallbackPolicy::LeaveEmpty).unwrap();
        assert_eq!(allocation.rooms[0].seated(), 2);
        assert_eq!(allocation.rooms[0].empty(), 4);
        assert_eq!(allocation.rooms[1].empty(), 6);
        assert!(allocation.unseated.is_empty());
    }

    #[test]
    fn empty_roster_gives_empty_rooms() {
        let allocation = allocate(&[], 2, layout(60), FallbackPolicy::Fail).unwrap();
        assert!(allocation.rooms.iter().all(|r| r.empty() == 60));
    }

    #[test]
    fn rejected_candidate_moves_to_later_room() {
        let candidates = roster(&[("A", 1, 2), ("B", 1, 1)]);
        let allocation = allocate(&candidates, 2, layout(2), FallbackPolicy::LeaveEmpty).unwrap();
        assert_eq!(seated_ids(&allocation.rooms[0]), vec!["A001", "B001"]);
        assert_eq!(seated_ids(&allocation.rooms[1]), vec!["A002"]);
        assert_eq!(allocation.rooms[1].seats[1], None);
    }

    #[test]
    fn two_subjects_leave_bench_ends_empty() {
        let candidates = roster(&[("A", 1, 30), ("B", 1, 30)]);
        let allocation = allocate(&candidates, 1, layout(60), FallbackPolicy::LeaveEmpty).unwrap();
        let room = &allocation.rooms[0];
        for bench in room.benches() {
            assert_eq!(bench[0].as_ref().map(|c| c.subject.as_str()), Some("A"));
            assert_eq!(bench[1].as_ref().map(|c| c.subject.as_str()), Some("B"));
            assert_eq!(bench[2], None);
        }
        assert_eq!(room.seated(), 40);
        assert_eq!(allocation.unseated.len(), 20);
        assert_adjacency(&allocation, layout(60));
    }

    #[test]
    fn single_subject_leave_empty_seats_one_per_bench() {
        let candidates = roster(&[("CS", 1, 61)]);
        let allocation = allocate(&candidates, 1, layout(60), FallbackPolicy::LeaveEmpty).unwrap();
        let room = &allocation.rooms[0];
        assert_eq!(room.seats.len(), 60);
        assert_eq!(room.seated(), 20);
        for (index, bench) in room.benches().enumerate() {
            let expected = format!("CS{:03}", index + 1);
            assert_eq!(bench[0].as_ref().map(|c| c.id.as_str()), Some(expected.as_str()));
            assert_eq!(bench[1], None);
            assert_eq!(bench[2], None);
        }
        assert_eq!(allocation.unseated.len(), 41);
        assert_eq!(allocation.unseated[0], "CS021");
    }

    #[test]
    fn single_subject_fail_policy_raises() {
        let candidates = roster(&[("CS", 1, 61)]);
        let err = allocate(&candidates, 1, layout(60), FallbackPolicy::Fail).unwrap_err();
        match err {
            GenerateError::UnsatisfiableSeating { room, seat, rejected } => {
                assert_eq!(room, 1);
                assert_eq!(seat, 2);
                assert_eq!(rejected, 60);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fail_policy_retries_with_live_pool() {
        let candidates = roster(&[("A", 1, 20), ("B", 1, 20), ("C", 1, 20)]);
        let allocation = allocate(&candidates, 1, layout(60), FallbackPolicy::Fail).unwrap();
        let room = &allocation.rooms[0];
        assert_eq!(room.seated(), 60);
        for bench in room.benches() {
            let subjects: Vec<_> = bench.iter().flatten().map(|c| c.subject.as_str()).collect();
            assert_eq!(subjects, vec!["A", "B", "C"]);
        }
        assert!(allocation.unseated.is_empty());
    }

    #[test]
    fn two_seat_benches_only_check_neighbours() {
        let wide = SeatingLayout::new(4, 2).unwrap();
        let candidates = roster(&[("A", 1, 2), ("B", 1, 2)]);
        let allocation = allocate(&candidates, 1, wide, FallbackPolicy::LeaveEmpty).unwrap();
        let room = &allocation.rooms[0];
        assert_eq!(seated_ids(room), vec!["A001", "B001", "A002"]);
        assert_eq!(room.seats[2], None);
        assert_eq!(allocation.unseated, vec!["B002".to_string()]);
        assert_adjacency(&allocation, wide);
    }

    #[test]
    fn display_groups_seats_by_bench() {
        let candidates = roster(&[("A", 1, 1), ("B", 1, 1)]);
        let allocation = allocate(&candidates, 1, layout(6), FallbackPolicy::LeaveEmpty).unwrap();
        let rendered = allocation.rooms[0].to_string();
        assert_eq!(
            rendered,
            "Room 1\n  Bench  1: A001 | B001 | -\n  Bench  2: - | - | -\n"
        );
    }

    #[test]
    fn layout_counts_partial_benches() {
        let layout = SeatingLayout::new(10, 3).unwrap();
        assert_eq!(layout.benches(), 4);
        assert_eq!(SeatingLayout::default().benches(), 20);
    }

    #[test]
    fn layout_rejects_degenerate_shapes() {
        assert_eq!(
            SeatingLayout::new(0, 0).unwrap_err(),
            vec![
                ValidationError::InvalidCapacity,
                ValidationError::InvalidSeatsPerBench
            ]
        );
        assert_eq!(
            SeatingLayout::new(u32::MAX, 3).unwrap_err(),
            vec![ValidationError::CapacityTooLarge {
                capacity: u32::MAX,
                max: MAX_CAPACITY
            }]
        );
        assert!(SeatingLayout::new(MAX_CAPACITY, 1).is_ok());
    }

    #[test]
    fn many_full_rooms_of_one_subject() {
        let candidates = roster(&[("CS", 1, 50_000)]);
        let allocation = allocate(&candidates, 50, layout(MAX_CAPACITY), FallbackPolicy::LeaveEmpty).unwrap();
        // one candidate per bench, including the single-seat bench at the end
        assert!(allocation.rooms.iter().all(|r| r.seated() == 334));
        assert_eq!(allocation.unseated.len(), 50_000 - 50 * 334);
    }
}
