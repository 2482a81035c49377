use super::super::domain::{CompetitionResult, RankedResult};
use super::super::rulebook::Rulebook;
use super::aggregate::criterion_middle_sum;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::warn;

/// Orders `a` before `b` when it has the higher final score, falling back to the
/// trimmed criterion sums in `priorities` order. `Equal` means a true tie.
pub fn apply_tie_breaker(
    a: &CompetitionResult,
    b: &CompetitionResult,
    priorities: &[String],
) -> Ordering {
    if a.final_score != b.final_score {
        return b.final_score.total_cmp(&a.final_score);
    }

    for criterion in priorities {
        let a_sum = criterion_middle_sum(&a.scores, criterion);
        let b_sum = criterion_middle_sum(&b.scores, criterion);
        if a_sum != b_sum {
            return b_sum.total_cmp(&a_sum);
        }
    }

    Ordering::Equal
}

/// Sort descending with tie-breaks and assign standard competition ranks.
///
/// Entries the comparator cannot separate share a rank, and the next entry takes
/// its 1-based position, so a tie for first yields 1, 1, 3.
pub fn sort_with_tie_breaker(
    mut results: Vec<CompetitionResult>,
    priorities: &[String],
) -> Vec<RankedResult> {
    results.sort_by(|a, b| apply_tie_breaker(a, b, priorities));

    let mut ranked: Vec<RankedResult> = Vec::with_capacity(results.len());
    for (index, result) in results.into_iter().enumerate() {
        let rank = match ranked.last() {
            Some(previous)
                if apply_tie_breaker(&previous.result, &result, priorities)
                    == Ordering::Equal =>
            {
                previous.rank
            }
            _ => index + 1,
        };
        ranked.push(RankedResult { result, rank });
    }
    ranked
}

/// Ranks results using the tie-break order configured for their category.
#[derive(Debug, Clone)]
pub struct RankingEngine {
    rulebook: Arc<Rulebook>,
}

impl RankingEngine {
    pub fn new(rulebook: Arc<Rulebook>) -> Self {
        Self { rulebook }
    }

    pub fn rulebook(&self) -> &Rulebook {
        &self.rulebook
    }

    pub fn rank(&self, results: Vec<CompetitionResult>, category: &str) -> Vec<RankedResult> {
        let priorities = self.rulebook.tie_break_priority(category);
        let ranked = sort_with_tie_breaker(results, priorities);

        if !self.rulebook.knows(category) {
            let unresolved = ranked
                .windows(2)
                .filter(|pair| pair[0].rank == pair[1].rank)
                .count();
            if unresolved > 0 {
                warn!(
                    category,
                    unresolved, "ties left unresolved: category has no tie-break priority"
                );
            }
        }

        ranked
    }
}
