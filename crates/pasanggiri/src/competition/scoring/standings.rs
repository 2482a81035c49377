use super::super::domain::{Grouping, RankedResult};
use serde::Serialize;
use std::collections::BTreeMap;

/// Medal count for one entity across every grouping.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MedalTally {
    pub entity_name: String,
    pub gold: usize,
    pub silver: usize,
    pub bronze: usize,
    pub groupings_entered: usize,
    pub accumulated_score: f64,
}

impl MedalTally {
    fn medals(&self) -> (usize, usize, usize) {
        (self.gold, self.silver, self.bronze)
    }

    fn award(&mut self, rank: usize) {
        match rank {
            1 => self.gold += 1,
            2 => self.silver += 1,
            3 => self.bronze += 1,
            _ => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingEntry {
    #[serde(flatten)]
    pub tally: MedalTally,
    pub rank: usize,
}

/// Overall standings across every grouping of a tournament.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverallStandings {
    pub groupings: usize,
    pub entries: Vec<StandingEntry>,
}

impl OverallStandings {
    pub fn champion(&self) -> Option<&StandingEntry> {
        self.entries
            .first()
            .filter(|entry| entry.rank == 1 && entry.tally.gold > 0)
    }
}

/// Tally medals from every ranked grouping into overall standings.
///
/// Entries without any judge's score are not ranked and earn nothing.
/// Shared ranks share medals. Entities are ordered by gold, silver, then bronze;
/// accumulated score only orders entities with identical medal counts, which
/// still share a rank.
pub fn overall_standings(groupings: &[(Grouping, Vec<RankedResult>)]) -> OverallStandings {
    let mut tallies: BTreeMap<&str, MedalTally> = BTreeMap::new();

    for (_, ranked) in groupings {
        for entry in ranked.iter().filter(|entry| !entry.result.scores.is_empty()) {
            let name = entry.result.entity_name.as_str();
            let tally = tallies.entry(name).or_insert_with(|| MedalTally {
                entity_name: name.to_string(),
                ..MedalTally::default()
            });
            tally.award(entry.rank);
            tally.groupings_entered += 1;
            tally.accumulated_score += entry.result.final_score;
        }
    }

    let mut tallies: Vec<MedalTally> = tallies.into_values().collect();
    tallies.sort_by(|a, b| {
        b.medals()
            .cmp(&a.medals())
            .then_with(|| b.accumulated_score.total_cmp(&a.accumulated_score))
    });

    let mut entries: Vec<StandingEntry> = Vec::with_capacity(tallies.len());
    for (index, tally) in tallies.into_iter().enumerate() {
        let rank = match entries.last() {
            Some(previous) if previous.tally.medals() == tally.medals() => previous.rank,
            _ => index + 1,
        };
        entries.push(StandingEntry { tally, rank });
    }

    OverallStandings {
        groupings: groupings.len(),
        entries,
    }
}
