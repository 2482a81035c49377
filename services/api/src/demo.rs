use crate::infra::{load_rulebook, parse_date, InMemoryCompetitionRepository};
use chrono::{Local, NaiveDate};
use clap::Args;
use pasanggiri::competition::{
    overall_standings, CompetitionId, CompetitionRegistration, Grouping, GroupingResults,
    OverallStandings, PasanggiriService, RankingEngine, Rulebook, ScoreSheetImporter,
    ScoreSubmission, ServiceError,
};
use pasanggiri::error::AppError;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

const DEMO_ENTITIES: [&str; 5] = ["Cibiru", "Cileunyi", "Gedebage", "Panyileukan", "Ujungberung"];

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// CSV score sheet, one row per judge per session
    #[arg(long)]
    pub(crate) scores: PathBuf,
    /// JSON rulebook replacing the standard criteria and tie-break order
    #[arg(long)]
    pub(crate) rulebook: Option<PathBuf>,
    /// Only print groupings of this category
    #[arg(long)]
    pub(crate) category: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Number of judges scoring every session
    #[arg(long, default_value_t = 5)]
    pub(crate) judges: usize,
    /// Tournament date shown in the header (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) held_on: Option<NaiveDate>,
    /// JSON rulebook replacing the standard criteria and tie-break order
    #[arg(long)]
    pub(crate) rulebook: Option<PathBuf>,
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let RankArgs {
        scores,
        rulebook,
        category,
    } = args;

    let engine = RankingEngine::new(Arc::new(load_rulebook(rulebook.as_deref())?));
    let sheet = ScoreSheetImporter::from_path(&scores)?;

    let ranked: Vec<GroupingResults> = sheet
        .results_by_grouping()
        .into_iter()
        .filter(|(grouping, _)| {
            category
                .as_deref()
                .map_or(true, |wanted| grouping.category.eq_ignore_ascii_case(wanted))
        })
        .map(|(grouping, results)| GroupingResults::rank(grouping, results, &engine))
        .collect();

    println!(
        "Score sheet {} ({} sessions, {} judge sheets)",
        scores.display(),
        sheet.competitions.len(),
        sheet.scores.len()
    );
    for grouping in &ranked {
        render_grouping(grouping, engine.rulebook());
    }

    let standings = overall_standings(
        &ranked
            .into_iter()
            .map(|grouping| (grouping.grouping, grouping.results))
            .collect::<Vec<_>>(),
    );
    render_standings(&standings);

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        judges,
        held_on,
        rulebook,
    } = args;

    let held_on = held_on.unwrap_or_else(|| Local::now().date_naive());
    let rulebook = Arc::new(load_rulebook(rulebook.as_deref())?);
    let service = PasanggiriService::new(
        Arc::new(InMemoryCompetitionRepository::default()),
        rulebook.clone(),
    );

    println!("Pasanggiri demo tournament, {held_on}");
    println!("- {} entities | {} judges per session", DEMO_ENTITIES.len(), judges);

    if let Err(err) = judge_demo_tournament(&service, &demo_groupings(), judges) {
        println!("  Demo judging stopped: {err}");
        return Ok(());
    }

    let groupings = match service.groupings() {
        Ok(groupings) => groupings,
        Err(err) => {
            println!("  Repository unavailable: {err}");
            return Ok(());
        }
    };
    for grouping in groupings {
        match service.results(&grouping) {
            Ok(results) => render_grouping(&results, &rulebook),
            Err(err) => println!("  Results unavailable for {}: {err}", grouping.label()),
        }
    }

    match service.competition_details(&CompetitionId("demo-1-1".to_string())) {
        Ok(details) => {
            println!(
                "\nSession {} ({}): {}",
                details.competition.id, details.competition.entity_name, details.scoring.method
            );
            println!(
                "  Used {:?} | discarded {:?} | final {:.2}",
                details.scoring.used_scores,
                details.scoring.discarded_scores,
                details.scoring.final_score
            );
            for criterion in &details.criteria {
                let judges: Vec<&str> = criterion
                    .counted
                    .iter()
                    .map(|entry| entry.judge.as_str())
                    .collect();
                println!(
                    "  - {}: {:.2} from {}",
                    criterion.criterion,
                    criterion.middle_sum,
                    judges.join(", ")
                );
            }
        }
        Err(err) => println!("  Session breakdown unavailable: {err}"),
    }

    match service.standings() {
        Ok(standings) => render_standings(&standings),
        Err(err) => println!("  Standings unavailable: {err}"),
    }

    Ok(())
}

fn demo_groupings() -> Vec<Grouping> {
    vec![
        Grouping::new("PERORANGAN", "REMAJA", "PUTRA"),
        Grouping::new("BERPASANGAN", "DEWASA", "PUTRI"),
        Grouping::new("MASAL", "DEWASA", "CAMPURAN"),
    ]
}

/// Register every entity in every grouping and submit deterministic judge sheets.
fn judge_demo_tournament(
    service: &PasanggiriService<InMemoryCompetitionRepository>,
    groupings: &[Grouping],
    judges: usize,
) -> Result<(), ServiceError> {
    for (grouping_index, grouping) in groupings.iter().enumerate() {
        for (entity_index, entity) in DEMO_ENTITIES.iter().enumerate() {
            let competition = service.register_competition(CompetitionRegistration {
                id: Some(CompetitionId(format!(
                    "demo-{}-{}",
                    grouping_index + 1,
                    entity_index + 1
                ))),
                entity_name: entity.to_string(),
                grouping: grouping.clone(),
            })?;

            for judge in 0..judges {
                let criteria_scores: BTreeMap<String, f64> = service
                    .rulebook()
                    .criteria_for(&grouping.category)
                    .iter()
                    .enumerate()
                    .map(|(criterion_index, criterion)| {
                        let span = (criterion.max - criterion.min).clamp(0.0, 4.0) as usize;
                        let seed = entity_index * 3 + judge * 2 + criterion_index + grouping_index;
                        let offset = seed % (span + 1);
                        (criterion.name.clone(), criterion.max - offset as f64)
                    })
                    .collect();

                service.submit_score(ScoreSubmission {
                    competition_id: competition.id.clone(),
                    judge_name: format!("Juri {}", judge + 1),
                    criteria_scores,
                })?;
            }
        }
    }
    Ok(())
}

fn render_grouping(grouping: &GroupingResults, rulebook: &Rulebook) {
    let tie_break = rulebook.tie_break_priority(&grouping.grouping.category);
    println!("\n{}", grouping.grouping.label());
    if tie_break.is_empty() {
        println!("  Tie-break: none configured");
    } else {
        println!("  Tie-break: {}", tie_break.join(" > "));
    }
    for entry in &grouping.results {
        println!(
            "  {:>2}. {:<14} {:>7.2} ({} judges)",
            entry.rank,
            entry.result.entity_name,
            entry.result.final_score,
            entry.result.scores.len()
        );
    }
    if !grouping.awaiting_scores.is_empty() {
        println!("  Awaiting scores: {}", grouping.awaiting_scores.join(", "));
    }
}

fn render_standings(standings: &OverallStandings) {
    println!("\nOverall standings across {} groupings", standings.groupings);
    for entry in &standings.entries {
        println!(
            "  {:>2}. {:<14} gold {} | silver {} | bronze {} | {} groupings | {:.2} points",
            entry.rank,
            entry.tally.entity_name,
            entry.tally.gold,
            entry.tally.silver,
            entry.tally.bronze,
            entry.tally.groupings_entered,
            entry.tally.accumulated_score
        );
    }
    match standings.champion() {
        Some(champion) => println!("Champion: {}", champion.tally.entity_name),
        None => println!("Champion: not yet decided"),
    }
}
