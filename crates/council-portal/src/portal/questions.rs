use rand::seq::SliceRandom;
use rand::Rng;

use super::domain::MasterQuestion;

/// Question pools for the individual round. One question is drawn from each
/// pool per candidate; the draw is frozen on first persistence so every
/// panelist works from the same sheet.
const POOLS: &[(&str, &[&str])] = &[
    (
        "leadership",
        &[
            "Tell us about a time you led a group through a disagreement.",
            "What does leading by example look like in a student council?",
            "Describe a decision you made that was unpopular but necessary.",
        ],
    ),
    (
        "teamwork",
        &[
            "Describe a project where you had to rely on someone else's work.",
            "How do you bring a quiet teammate into a discussion?",
            "Tell us about a time a team you were on missed its goal.",
        ],
    ),
    (
        "commitment",
        &[
            "How will you balance council duties with your coursework?",
            "What would you do if a council event conflicted with a personal commitment?",
            "Which council responsibility do you expect to be hardest to keep up?",
        ],
    ),
    (
        "situational",
        &[
            "An event you planned is failing an hour before doors open. What do you do?",
            "A classmate accuses the council of favoritism. How do you respond?",
            "You disagree with a teacher advisor's veto. Walk us through your next step.",
        ],
    ),
];

/// Draws one question per pool, in pool order.
pub fn draw_master_questions<R: Rng>(rng: &mut R) -> Vec<MasterQuestion> {
    POOLS
        .iter()
        .map(|(pool, prompts)| MasterQuestion {
            pool: (*pool).to_string(),
            prompt: (*prompts.choose(rng).unwrap_or(&prompts[0])).to_string(),
        })
        .collect()
}

/// Number of pools, and therefore of questions on every frozen sheet.
pub const fn pool_count() -> usize {
    POOLS.len()
}
