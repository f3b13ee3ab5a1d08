use chrono::{Datelike, NaiveDate};

use super::domain::InterviewRound;

/// Interview calendar for the fall election cycle. Every round runs inside
/// one literal month; days outside the tables below are never schedulable.
const INTERVIEW_YEAR: i32 = 2026;
const INTERVIEW_MONTH: u32 = 9;

const GROUP_DAYS: [u32; 2] = [21, 22];
const INDIVIDUAL_DAYS: [u32; 6] = [23, 24, 25, 28, 29, 30];

/// Ordered slot labels per round. One canonical table per round is
/// authoritative for both the scheduler and the calendar editor.
const GROUP_SLOTS: &[&str] = &["11:05 AM", "11:17 AM", "11:29 AM", "11:41 AM", "11:53 AM"];
const INDIVIDUAL_SLOTS: &[&str] = &[
    "3:30 PM", "3:42 PM", "3:54 PM", "4:06 PM", "4:18 PM", "4:30 PM", "4:42 PM", "4:54 PM",
];

const GROUP_SEATS: usize = 5;
const INDIVIDUAL_SEATS: usize = 1;

/// True only for a date that is literally in the round's table.
pub fn is_valid_date(date: NaiveDate, round: InterviewRound) -> bool {
    date.year() == INTERVIEW_YEAR
        && date.month() == INTERVIEW_MONTH
        && days_for(round).contains(&date.day())
}

/// The round's schedulable dates, in calendar order.
pub fn interview_dates(round: InterviewRound) -> Vec<NaiveDate> {
    days_for(round)
        .iter()
        .filter_map(|day| NaiveDate::from_ymd_opt(INTERVIEW_YEAR, INTERVIEW_MONTH, *day))
        .collect()
}

/// The round's ordered slot labels.
pub fn time_slots(round: InterviewRound) -> &'static [&'static str] {
    match round {
        InterviewRound::Group => GROUP_SLOTS,
        InterviewRound::Individual => INDIVIDUAL_SLOTS,
    }
}

/// True when the label appears in the round's slot table.
pub fn is_listed_slot(slot: &str, round: InterviewRound) -> bool {
    time_slots(round).contains(&slot)
}

/// Seats available in one (date, slot) cell of the round.
pub const fn seat_capacity(round: InterviewRound) -> usize {
    match round {
        InterviewRound::Group => GROUP_SEATS,
        InterviewRound::Individual => INDIVIDUAL_SEATS,
    }
}

fn days_for(round: InterviewRound) -> &'static [u32] {
    match round {
        InterviewRound::Group => &GROUP_DAYS,
        InterviewRound::Individual => &INDIVIDUAL_DAYS,
    }
}
