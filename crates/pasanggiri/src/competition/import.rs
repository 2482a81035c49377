use super::domain::{parse_cell, Competition, CompetitionId, CompetitionResult, Grouping, Score};
use super::scoring::sum_values;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;
use std::path::Path;
use tracing::warn;

const COMPETITION_ID: &str = "competition_id";
const ENTITY_NAME: &str = "entity_name";
const CATEGORY: &str = "category";
const DIVISION: &str = "division";
const CLASS: &str = "class";
const JUDGE_NAME: &str = "judge_name";
const CREATED_AT: &str = "created_at";

const REQUIRED_COLUMNS: [&str; 6] = [
    COMPETITION_ID,
    ENTITY_NAME,
    CATEGORY,
    DIVISION,
    CLASS,
    JUDGE_NAME,
];

#[derive(Debug)]
pub enum ScoreSheetImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingColumn(&'static str),
}

impl std::fmt::Display for ScoreSheetImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreSheetImportError::Io(err) => write!(f, "failed to read score sheet: {}", err),
            ScoreSheetImportError::Csv(err) => write!(f, "invalid score sheet CSV data: {}", err),
            ScoreSheetImportError::MissingColumn(column) => {
                write!(f, "score sheet is missing the '{}' column", column)
            }
        }
    }
}

impl std::error::Error for ScoreSheetImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScoreSheetImportError::Io(err) => Some(err),
            ScoreSheetImportError::Csv(err) => Some(err),
            ScoreSheetImportError::MissingColumn(_) => None,
        }
    }
}

impl From<std::io::Error> for ScoreSheetImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ScoreSheetImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Sessions and judges' scores read from a tabulation sheet.
#[derive(Debug, Clone, Default)]
pub struct ScoreSheet {
    pub competitions: Vec<Competition>,
    pub scores: Vec<Score>,
}

impl ScoreSheet {
    /// Pool every entity's scores per grouping, ready for ranking.
    pub fn results_by_grouping(&self) -> Vec<(Grouping, Vec<CompetitionResult>)> {
        let mut scores_by_competition: BTreeMap<&CompetitionId, Vec<Score>> = BTreeMap::new();
        for score in &self.scores {
            scores_by_competition
                .entry(&score.competition_id)
                .or_default()
                .push(score.clone());
        }

        let mut grouped: BTreeMap<&Grouping, BTreeMap<&str, Vec<Score>>> = BTreeMap::new();
        for competition in &self.competitions {
            let scores = scores_by_competition
                .remove(&competition.id)
                .unwrap_or_default();
            grouped
                .entry(&competition.grouping)
                .or_default()
                .entry(competition.entity_name.as_str())
                .or_default()
                .extend(scores);
        }

        grouped
            .into_iter()
            .map(|(grouping, entities)| {
                let results = entities
                    .into_iter()
                    .map(|(entity, scores)| CompetitionResult::from_scores(entity, scores))
                    .collect();
                (grouping.clone(), results)
            })
            .collect()
    }
}

pub struct ScoreSheetImporter;

impl ScoreSheetImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<ScoreSheet, ScoreSheetImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Read one row per judge per session; every non-metadata column is a criterion.
    pub fn from_reader<R: Read>(reader: R) -> Result<ScoreSheet, ScoreSheetImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|header| header.trim_start_matches('\u{feff}').to_string())
            .collect();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|header| header.eq_ignore_ascii_case(name))
                .ok_or(ScoreSheetImportError::MissingColumn(name))
        };

        let competition_col = column(COMPETITION_ID)?;
        let entity_col = column(ENTITY_NAME)?;
        let category_col = column(CATEGORY)?;
        let division_col = column(DIVISION)?;
        let class_col = column(CLASS)?;
        let judge_col = column(JUDGE_NAME)?;
        let created_col = column(CREATED_AT).ok();

        let criteria: Vec<(usize, &str)> = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| {
                !REQUIRED_COLUMNS
                    .iter()
                    .chain(std::iter::once(&CREATED_AT))
                    .any(|reserved| header.eq_ignore_ascii_case(reserved))
            })
            .map(|(index, header)| (index, header.as_str()))
            .collect();

        let mut sheet = ScoreSheet::default();
        let mut known: HashMap<CompetitionId, usize> = HashMap::new();
        let mut judged: HashSet<(CompetitionId, String)> = HashSet::new();

        for (line, record) in csv_reader.records().enumerate() {
            let record = record?;
            let cell = |index: usize| record.get(index).unwrap_or_default().to_string();

            let competition_id = CompetitionId(cell(competition_col));
            let judge_name = cell(judge_col);

            if competition_id.0.is_empty() || judge_name.is_empty() {
                warn!(
                    row = line + 2,
                    competition = %competition_id,
                    judge = %judge_name,
                    "row without competition id or judge skipped"
                );
                continue;
            }

            let entity_name = cell(entity_col);
            let grouping = Grouping::new(cell(category_col), cell(division_col), cell(class_col));
            match known.get(&competition_id) {
                Some(&index) => {
                    // The first row for a session defines it.
                    let first = &sheet.competitions[index];
                    if first.entity_name != entity_name || first.grouping != grouping {
                        warn!(
                            row = line + 2,
                            competition = %competition_id,
                            entity = %entity_name,
                            grouping = %grouping.label(),
                            kept_entity = %first.entity_name,
                            kept_grouping = %first.grouping.label(),
                            "conflicting session metadata ignored"
                        );
                    }
                }
                None => {
                    known.insert(competition_id.clone(), sheet.competitions.len());
                    sheet.competitions.push(Competition {
                        id: competition_id.clone(),
                        entity_name,
                        grouping,
                    });
                }
            }

            if !judged.insert((competition_id.clone(), judge_name.clone())) {
                warn!(
                    row = line + 2,
                    competition = %competition_id,
                    judge = %judge_name,
                    "duplicate judge row skipped"
                );
                continue;
            }

            let mut criteria_scores = BTreeMap::new();
            for (index, name) in &criteria {
                let raw = record.get(*index).unwrap_or_default();
                if raw.is_empty() {
                    continue;
                }
                let value = parse_cell(raw).filter(|value| value.is_finite());
                if value.is_none() {
                    warn!(
                        row = line + 2,
                        criterion = *name,
                        raw,
                        "unreadable criterion value counted as 0"
                    );
                }
                criteria_scores.insert(name.to_string(), value.unwrap_or(0.0));
            }

            let created_at = created_col
                .and_then(|index| record.get(index))
                .and_then(parse_timestamp)
                .unwrap_or_else(Utc::now);

            sheet.scores.push(Score {
                competition_id,
                judge_name,
                total_score: sum_values(criteria_scores.values()),
                criteria_scores,
                created_at,
            });
        }

        Ok(sheet)
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
