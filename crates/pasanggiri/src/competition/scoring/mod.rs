mod aggregate;
mod ranking;
mod standings;
mod trim;

pub(crate) use trim::sum_values;

pub use aggregate::{
    calculate_final_score, criterion_middle_sum, middle_juries_for_criterion, scoring_details,
    JudgeValue, ScoringDetails,
};
pub use ranking::{apply_tie_breaker, sort_with_tie_breaker, RankingEngine};
pub use standings::{overall_standings, MedalTally, OverallStandings, StandingEntry};
pub use trim::TrimRule;
