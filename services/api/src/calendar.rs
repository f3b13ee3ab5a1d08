use council_portal::portal::calendar::{interview_dates, seat_capacity, time_slots};
use council_portal::portal::domain::InterviewRound;

/// Console rendering of the fixed interview calendar, for admins setting up
/// the cycle without the web UI.
pub(crate) fn print_calendar() {
    println!("Interview calendar");

    for round in [InterviewRound::Group, InterviewRound::Individual] {
        println!(
            "\n{} round ({} seat(s) per slot)",
            round.label(),
            seat_capacity(round)
        );

        let dates = interview_dates(round);
        let days: Vec<String> = dates.iter().map(|date| date.to_string()).collect();
        println!("  dates: {}", days.join(", "));
        println!("  slots: {}", time_slots(round).join(", "));
    }
}
