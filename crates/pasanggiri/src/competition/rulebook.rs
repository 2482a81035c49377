use super::domain::ScoringCriterion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Categories contested at a Pasanggiri tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Perorangan,
    Att,
    Berkelompok,
    Masal,
    Berpasangan,
}

impl Category {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Perorangan,
            Self::Att,
            Self::Berkelompok,
            Self::Masal,
            Self::Berpasangan,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Perorangan => "PERORANGAN",
            Self::Att => "ATT",
            Self::Berkelompok => "BERKELOMPOK",
            Self::Masal => "MASAL",
            Self::Berpasangan => "BERPASANGAN",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = normalize_category(name);
        Self::ordered()
            .into_iter()
            .find(|category| category.label() == normalized)
    }
}

/// Scoring sheet and tie-break order for one category.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryRules {
    pub criteria: Vec<ScoringCriterion>,
    #[serde(default)]
    pub tie_break: Vec<String>,
}

impl CategoryRules {
    pub fn criterion(&self, name: &str) -> Option<&ScoringCriterion> {
        self.criteria.iter().find(|criterion| criterion.name == name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RulebookError {
    #[error("failed to read rulebook: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid rulebook json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("criterion {criterion} in {category} has min {min} above max {max}")]
    InvalidRange {
        category: String,
        criterion: String,
        min: f64,
        max: f64,
    },
    #[error("tie-break criterion {criterion} in {category} is not a scored criterion")]
    UndeclaredTieBreak { category: String, criterion: String },
}

/// Category keyed configuration read by the submission guard and the ranking engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Rulebook {
    categories: BTreeMap<String, CategoryRules>,
}

impl Rulebook {
    pub fn standard() -> Self {
        let categories = Category::ordered()
            .into_iter()
            .map(|category| (category.label().to_string(), standard_rules(category)))
            .collect();
        Self { categories }
    }

    pub fn empty() -> Self {
        Self {
            categories: BTreeMap::new(),
        }
    }

    /// Load a tournament specific rulebook, replacing the standard one.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RulebookError> {
        let parsed: BTreeMap<String, CategoryRules> = serde_json::from_reader(reader)?;
        let mut rulebook = Self::empty();
        for (category, rules) in parsed {
            rulebook.insert(&category, rules)?;
        }
        Ok(rulebook)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RulebookError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn insert(&mut self, category: &str, rules: CategoryRules) -> Result<(), RulebookError> {
        if let Some(criterion) = rules.criteria.iter().find(|c| c.min > c.max) {
            return Err(RulebookError::InvalidRange {
                category: category.to_string(),
                criterion: criterion.name.clone(),
                min: criterion.min,
                max: criterion.max,
            });
        }
        if let Some(name) = rules
            .tie_break
            .iter()
            .find(|name| rules.criterion(name).is_none())
        {
            return Err(RulebookError::UndeclaredTieBreak {
                category: category.to_string(),
                criterion: name.clone(),
            });
        }
        self.categories.insert(normalize_category(category), rules);
        Ok(())
    }

    pub fn rules_for(&self, category: &str) -> Option<&CategoryRules> {
        self.categories.get(&normalize_category(category))
    }

    pub fn knows(&self, category: &str) -> bool {
        self.rules_for(category).is_some()
    }

    /// Ordered tie-break criteria; empty for a category the rulebook does not know.
    pub fn tie_break_priority(&self, category: &str) -> &[String] {
        self.rules_for(category)
            .map(|rules| rules.tie_break.as_slice())
            .unwrap_or(&[])
    }

    pub fn criteria_for(&self, category: &str) -> &[ScoringCriterion] {
        self.rules_for(category)
            .map(|rules| rules.criteria.as_slice())
            .unwrap_or(&[])
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }
}

impl Default for Rulebook {
    fn default() -> Self {
        Self::standard()
    }
}

pub(crate) fn normalize_category(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

fn standard_rules(category: Category) -> CategoryRules {
    let tie_break: &[&str] = match category {
        Category::Perorangan => &["ORISINALITAS", "KEMANTAPAN", "STAMINA"],
        Category::Att => &["ORISINALITAS", "KEMANTAPAN", "KEKAYAAAN TEKNIK"],
        Category::Berkelompok => &["ORISINALITAS", "KEMANTAPAN", "KEKOMPAKAN"],
        Category::Masal => &["ORISINALITAS", "KEMANTAPAN", "KEKOMPAKAN", "KREATIFITAS"],
        Category::Berpasangan => &["TEKNIK SERANG BELA", "KEMANTAPAN", "PENGHAYATAN"],
    };

    let mut criteria = vec![correctness_criterion(category)];
    criteria.extend(
        tie_break
            .iter()
            .map(|name| ScoringCriterion::new(name, 1.0, 10.0, criterion_description(name))),
    );

    CategoryRules {
        criteria,
        tie_break: tie_break.iter().map(|name| name.to_string()).collect(),
    }
}

fn correctness_criterion(category: Category) -> ScoringCriterion {
    match category {
        Category::Att => ScoringCriterion::new(
            "KEBENARAN JURUS",
            1.0,
            30.0,
            "Urutan dan bentuk jurus sesuai aliran yang dibawakan",
        ),
        Category::Berpasangan => ScoringCriterion::new(
            "KEBENARAN TEKNIK",
            1.0,
            30.0,
            "Ketepatan teknik serang dan bela antar pasangan",
        ),
        _ => ScoringCriterion::new(
            "KEBENARAN GERAK",
            1.0,
            30.0,
            "Kebenaran urutan gerak, sikap, dan langkah",
        ),
    }
}

fn criterion_description(name: &str) -> &'static str {
    match name {
        "ORISINALITAS" => "Keaslian gerak dan ciri khas aliran",
        "KEMANTAPAN" => "Kemantapan, kekuatan, dan ketegasan gerak",
        "STAMINA" => "Daya tahan dari awal hingga akhir penampilan",
        "KEKAYAAAN TEKNIK" => "Keragaman teknik yang ditampilkan",
        "KEKOMPAKAN" => "Keserempakan gerak seluruh anggota",
        "KREATIFITAS" => "Kreativitas formasi dan rangkaian gerak",
        "TEKNIK SERANG BELA" => "Ketepatan dan kelogisan serangan serta pembelaan",
        "PENGHAYATAN" => "Penjiwaan dan ekspresi selama penampilan",
        _ => "",
    }
}
