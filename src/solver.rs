use crate::allocator::{SeatingLayout, allocate};
use crate::data::{
    GenerateRequest, GenerateResponse, MAX_CANDIDATES, MAX_HOURS, MAX_ROOMS, MAX_SUBJECTS,
    MAX_TOTAL_SEATS, Notice, NoticeKind, RoomNumber,
};
use crate::error::{GenerateError, ValidationError};
use crate::invigilation::{build_schedule, staffing_notices};
use crate::roster::{build_roster, find_duplicates, parse_subject, roster_size};
use log::{info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

/// Request after validation: every parameter explicit and in range.
#[derive(Debug, Clone)]
struct Plan {
    room_count: RoomNumber,
    layout: SeatingLayout,
    staff: Vec<String>,
}

/// Seats candidates and builds the invigilation rota for one request.
///
/// The shuffle is seeded from `input.seed` when present, otherwise from
/// system entropy.
pub fn solve(input: &GenerateRequest) -> Result<GenerateResponse, GenerateError> {
    let mut rng = match input.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    solve_with_rng(input, &mut rng)
}

/// Same as [`solve`] but draws the staff shuffle from `rng`.
pub fn solve_with_rng<R: Rng + ?Sized>(
    input: &GenerateRequest,
    rng: &mut R,
) -> Result<GenerateResponse, GenerateError> {
    let start_time = Instant::now();

    // everything is checked up front; nothing is seated if any check fails
    let mut errors = Vec::new();
    let room_count = match input.rooms.parse() {
        Some(n) if n > i64::from(MAX_ROOMS) => {
            errors.push(ValidationError::TooManyRooms {
                rooms: n,
                max: MAX_ROOMS,
            });
            None
        }
        Some(n) if n >= 1 => u32::try_from(n).ok(),
        _ => {
            errors.push(ValidationError::InvalidRoomCount(input.rooms.to_string()));
            None
        }
    };

    let staff: Vec<String> = input
        .staff
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if staff.is_empty() {
        errors.push(ValidationError::EmptyStaffList);
    }
    if input.hours == 0 {
        errors.push(ValidationError::InvalidHours);
    }
    if input.hours > MAX_HOURS {
        errors.push(ValidationError::TooManyHours {
            hours: input.hours,
            max: MAX_HOURS,
        });
    }

    let layout = SeatingLayout::new(input.capacity, input.seats_per_bench)
        .map_err(|e| errors.extend(e))
        .ok();
    if let (Some(rooms), Some(layout)) = (room_count, layout) {
        let seats = u64::from(rooms) * u64::from(layout.capacity());
        if seats > MAX_TOTAL_SEATS {
            errors.push(ValidationError::TooManySeats {
                seats,
                max: MAX_TOTAL_SEATS,
            });
        }
    }

    if input.subjects.len() > MAX_SUBJECTS {
        errors.push(ValidationError::TooManySubjects {
            count: input.subjects.len(),
            max: MAX_SUBJECTS,
        });
    }
    let mut subjects = Vec::new();
    for range in input.subjects.iter().take(MAX_SUBJECTS) {
        match parse_subject(range) {
            Ok(spec) => subjects.push(spec),
            Err(e) => errors.push(e),
        }
    }
    let candidate_count = roster_size(&subjects);
    let roster = if candidate_count > MAX_CANDIDATES {
        errors.push(ValidationError::TooManyCandidates {
            count: candidate_count,
            max: MAX_CANDIDATES,
        });
        Vec::new()
    } else {
        build_roster(&subjects)
    };
    errors.extend(find_duplicates(&roster));

    let plan = match (room_count, layout) {
        (Some(room_count), Some(layout)) if errors.is_empty() => Plan {
            room_count,
            layout,
            staff,
        },
        _ => return Err(GenerateError::Invalid(errors)),
    };

    info!(
        "Seating {} candidates from {} subjects in {} rooms of {} seats ({} benches)...",
        roster.len(),
        subjects.len(),
        plan.room_count,
        plan.layout.capacity(),
        plan.layout.benches()
    );
    let allocation = allocate(&roster, plan.room_count, plan.layout, input.fallback)?;

    info!(
        "Assigning {} staff to {} rooms over {} hours...",
        plan.staff.len(),
        plan.room_count,
        input.hours
    );
    let schedule = build_schedule(&plan.staff, plan.room_count, input.hours, rng);

    let mut notices = staffing_notices(&plan.staff, plan.room_count);
    if !allocation.unseated.is_empty() {
        notices.push(Notice {
            kind: NoticeKind::UnseatedCandidates,
            message: format!(
                "{} candidates did not fit in {} rooms",
                allocation.unseated.len(),
                plan.room_count
            ),
        });
    }
    for notice in &notices {
        trace!("{notice}");
    }

    let seating = allocation
        .rooms
        .into_iter()
        .map(|room| (room.room, room.into_ids()))
        .collect();

    info!("Seating generated in {:.2?}", start_time.elapsed());
    Ok(GenerateResponse {
        seating,
        schedule,
        unseated: allocation.unseated,
        notices,
    })
}
