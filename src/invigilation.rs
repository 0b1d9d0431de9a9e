use crate::data::{Hour, InvigilationSchedule, Notice, NoticeKind, RoomNumber};
use itertools::Itertools;
use log::{debug, warn};
use rand::Rng;
use rand::seq::SliceRandom;

/// Draws a fresh shuffle of `staff` for every hour and hands rooms out in
/// shuffled order, wrapping round when there are more rooms than people.
///
/// Hours are independent: nothing keeps a room with the same invigilator from
/// one hour to the next.
pub fn build_schedule<R: Rng + ?Sized>(
    staff: &[String],
    room_count: RoomNumber,
    hours: Hour,
    rng: &mut R,
) -> InvigilationSchedule {
    let mut schedule = InvigilationSchedule::new();
    if staff.is_empty() {
        return schedule;
    }

    for hour in 1..=hours {
        let mut order = staff.to_vec();
        order.shuffle(rng);
        debug!("Hour {}: rotation {}", hour, order.iter().join(", "));
        for room in 1..=room_count {
            let name = &order[(room as usize - 1) % order.len()];
            schedule.entry(room).or_default().insert(hour, name.clone());
        }
    }
    schedule
}

/// Limitations of a staff list for the given number of rooms.
pub fn staffing_notices(staff: &[String], room_count: RoomNumber) -> Vec<Notice> {
    let mut notices = Vec::new();

    if (room_count as usize) > staff.len() {
        warn!(
            "Only {} staff for {} rooms; some staff cover several rooms each hour.",
            staff.len(),
            room_count
        );
        notices.push(Notice {
            kind: NoticeKind::StaffShortage,
            message: format!(
                "{} staff for {} rooms: some staff are assigned to more than one room in the same hour",
                staff.len(),
                room_count
            ),
        });
    }

    let repeated: Vec<&String> = staff.iter().duplicates().collect();
    if !repeated.is_empty() {
        notices.push(Notice {
            kind: NoticeKind::DuplicateStaff,
            message: format!(
                "staff listed more than once may be given two rooms in the same hour: {}",
                repeated.iter().join(", ")
            ),
        });
    }
    notices
}
