use super::common::*;
use chrono::Duration;

use crate::portal::domain::{ApplicationStatus, InterviewRound};
use crate::portal::scheduler::ScheduleError;

#[test]
fn rejects_days_adjacent_to_the_calendar() {
    let (state, _) = build_state();
    submitted_application(&state, "u-1", "treasurer");

    for date in [group_date() - Duration::days(1), group_date() + Duration::days(2)] {
        let request = schedule_request("u-1", "treasurer", InterviewRound::Group, date, "11:05 AM");
        match state.scheduler.schedule(request) {
            Err(ScheduleError::InvalidDate { .. }) => {}
            other => panic!("expected invalid date, got {other:?}"),
        }
    }
}

#[test]
fn rejects_slots_missing_from_the_table() {
    let (state, _) = build_state();
    submitted_application(&state, "u-1", "treasurer");

    let request = schedule_request(
        "u-1",
        "treasurer",
        InterviewRound::Group,
        group_date(),
        "9:00 AM",
    );
    match state.scheduler.schedule(request) {
        Err(ScheduleError::UnknownSlot { .. }) => {}
        other => panic!("expected unknown slot, got {other:?}"),
    }
}

#[test]
fn rejects_blank_room_and_short_panel() {
    let (state, _) = build_state();
    submitted_application(&state, "u-1", "treasurer");

    let mut request = schedule_request(
        "u-1",
        "treasurer",
        InterviewRound::Group,
        group_date(),
        "11:05 AM",
    );
    request.room = "   ".to_string();
    match state.scheduler.schedule(request) {
        Err(ScheduleError::EmptyRoom) => {}
        other => panic!("expected empty room, got {other:?}"),
    }

    let mut request = schedule_request(
        "u-1",
        "treasurer",
        InterviewRound::Group,
        group_date(),
        "11:05 AM",
    );
    request.panel = vec!["exec-ana".to_string()];
    match state.scheduler.schedule(request) {
        Err(ScheduleError::PanelTooSmall { found: 1, required: 2 }) => {}
        other => panic!("expected panel too small, got {other:?}"),
    }
}

#[test]
fn group_slot_seats_five_and_turns_away_the_sixth() {
    let (state, _) = build_state();
    for index in 0..6 {
        submitted_application(&state, &format!("u-{index}"), "treasurer");
    }

    for index in 0..5 {
        state
            .scheduler
            .schedule(schedule_request(
                &format!("u-{index}"),
                "treasurer",
                InterviewRound::Group,
                group_date(),
                "11:05 AM",
            ))
            .expect("seat available");
    }

    let overflow = schedule_request(
        "u-5",
        "treasurer",
        InterviewRound::Group,
        group_date(),
        "11:05 AM",
    );
    match state.scheduler.schedule(overflow) {
        Err(ScheduleError::SlotFull { .. }) => {}
        other => panic!("expected slot full, got {other:?}"),
    }

    // The turned-away candidate fits in the next slot on the same day.
    state
        .scheduler
        .schedule(schedule_request(
            "u-5",
            "treasurer",
            InterviewRound::Group,
            group_date(),
            "11:17 AM",
        ))
        .expect("next slot open");
}

#[test]
fn individual_slot_is_single_seat() {
    let (state, _) = build_state();
    submitted_application(&state, "u-1", "treasurer");
    submitted_application(&state, "u-2", "treasurer");

    state
        .scheduler
        .schedule(schedule_request(
            "u-1",
            "treasurer",
            InterviewRound::Individual,
            individual_date(),
            "3:30 PM",
        ))
        .expect("first candidate takes the seat");

    let taken = schedule_request(
        "u-2",
        "treasurer",
        InterviewRound::Individual,
        individual_date(),
        "3:30 PM",
    );
    match state.scheduler.schedule(taken) {
        Err(ScheduleError::SlotFull { .. }) => {}
        other => panic!("expected slot full, got {other:?}"),
    }
}

#[test]
fn rescheduling_does_not_count_your_own_seat() {
    let (state, _) = build_state();
    submitted_application(&state, "u-1", "treasurer");

    let first = schedule_request(
        "u-1",
        "treasurer",
        InterviewRound::Individual,
        individual_date(),
        "3:30 PM",
    );
    state.scheduler.schedule(first).expect("initial placement");

    // Same candidate, same single-seat slot, new room: allowed because the
    // occupancy scan excludes the candidate being rescheduled.
    let mut again = schedule_request(
        "u-1",
        "treasurer",
        InterviewRound::Individual,
        individual_date(),
        "3:30 PM",
    );
    again.room = "Room 310".to_string();
    let record = state.scheduler.schedule(again).expect("reschedule succeeds");
    assert_eq!(
        record.individual.expect("round present").room,
        "Room 310"
    );
}

#[test]
fn completing_both_rounds_flags_the_application() {
    let (state, _) = build_state();
    let key = submitted_application(&state, "u-1", "treasurer");

    state
        .scheduler
        .schedule(schedule_request(
            "u-1",
            "treasurer",
            InterviewRound::Group,
            group_date(),
            "11:05 AM",
        ))
        .expect("group scheduled");

    let mid = state
        .applications
        .get(&key)
        .expect("fetch")
        .expect("present");
    assert!(!mid.interview_scheduled, "one round is not enough");

    state
        .scheduler
        .schedule(schedule_request(
            "u-1",
            "treasurer",
            InterviewRound::Individual,
            individual_date(),
            "3:42 PM",
        ))
        .expect("individual scheduled");

    let done = state
        .applications
        .get(&key)
        .expect("fetch")
        .expect("present");
    assert!(done.interview_scheduled);
    assert_eq!(done.status, ApplicationStatus::InterviewScheduled);
}

#[test]
fn clearing_one_round_leaves_the_other_untouched() {
    let (state, _) = build_state();
    let key = submitted_application(&state, "u-1", "treasurer");

    state
        .scheduler
        .schedule(schedule_request(
            "u-1",
            "treasurer",
            InterviewRound::Group,
            group_date(),
            "11:05 AM",
        ))
        .expect("group scheduled");
    state
        .scheduler
        .schedule(schedule_request(
            "u-1",
            "treasurer",
            InterviewRound::Individual,
            individual_date(),
            "3:30 PM",
        ))
        .expect("individual scheduled");

    let record = state
        .scheduler
        .clear_round(&key, InterviewRound::Group)
        .expect("clear group");
    assert!(record.group.is_none());
    let individual = record.individual.expect("individual survives the clear");
    assert_eq!(individual.slot, "3:30 PM");

    // One round still stands, so the flag stays up.
    let application = state
        .applications
        .get(&key)
        .expect("fetch")
        .expect("present");
    assert!(application.interview_scheduled);

    let record = state
        .scheduler
        .clear_round(&key, InterviewRound::Individual)
        .expect("clear individual");
    assert!(record.unscheduled());

    let application = state
        .applications
        .get(&key)
        .expect("fetch")
        .expect("present");
    assert!(!application.interview_scheduled);
    assert_eq!(application.status, ApplicationStatus::UnderReview);
}

#[test]
fn clearing_an_unscheduled_round_fails() {
    let (state, _) = build_state();
    let key = submitted_application(&state, "u-1", "treasurer");

    match state.scheduler.clear_round(&key, InterviewRound::Group) {
        Err(ScheduleError::NotScheduled { .. }) => {}
        other => panic!("expected not scheduled, got {other:?}"),
    }
}

#[test]
fn availability_counts_taken_seats_per_slot() {
    let (state, _) = build_state();
    submitted_application(&state, "u-1", "treasurer");
    submitted_application(&state, "u-2", "treasurer");

    for candidate in ["u-1", "u-2"] {
        state
            .scheduler
            .schedule(schedule_request(
                candidate,
                "treasurer",
                InterviewRound::Group,
                group_date(),
                "11:05 AM",
            ))
            .expect("seat available");
    }

    let slots = state
        .scheduler
        .availability(InterviewRound::Group, group_date())
        .expect("availability");
    let first = slots.iter().find(|entry| entry.slot == "11:05 AM").expect("listed");
    assert_eq!(first.taken, 2);
    assert_eq!(first.capacity, 5);
    assert!(first.open());

    let second = slots.iter().find(|entry| entry.slot == "11:17 AM").expect("listed");
    assert_eq!(second.taken, 0);
}
