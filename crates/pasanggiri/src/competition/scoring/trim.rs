use serde::Serialize;

/// Number of judged values that count towards an aggregate once trimming applies.
pub(crate) const COUNTED_VALUES: usize = 3;

/// Which branch of the judge-count rule produced an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimRule {
    NoScores,
    AllCounted,
    HighestDiscarded,
    ExtremesDiscarded,
    CenteredWindow,
}

impl TrimRule {
    pub fn for_count(count: usize) -> Self {
        match count {
            0 => Self::NoScores,
            1..=3 => Self::AllCounted,
            4 => Self::HighestDiscarded,
            5 => Self::ExtremesDiscarded,
            _ => Self::CenteredWindow,
        }
    }

    pub fn describe(self, count: usize) -> String {
        match self {
            Self::NoScores => "No scores submitted".to_string(),
            Self::AllCounted if count < COUNTED_VALUES => {
                format!("Fewer than 3 judges, all {count} scores used")
            }
            Self::AllCounted => "All 3 scores used".to_string(),
            Self::HighestDiscarded => "Highest score discarded, lowest 3 used".to_string(),
            Self::ExtremesDiscarded => {
                "Highest and lowest scores discarded, middle 3 used".to_string()
            }
            Self::CenteredWindow => format!(
                "Highest and lowest scores discarded, centered 3 of the remaining {} used",
                count.saturating_sub(2)
            ),
        }
    }
}

/// Items split by the judge-count rule, each side ascending by value.
#[derive(Debug, Clone)]
pub(crate) struct Trimmed<T> {
    pub kept: Vec<T>,
    pub discarded: Vec<T>,
    pub rule: TrimRule,
}

/// Sort `items` ascending by `value_of` and keep the values the judge-count rule counts.
///
/// With N items: up to 3 are all kept, 4 drops the highest, 5 or more drops the
/// lowest and the highest and keeps the centered window of 3 from what remains.
pub(crate) fn trim_by<T, F>(mut items: Vec<T>, value_of: F) -> Trimmed<T>
where
    F: Fn(&T) -> f64,
{
    let count = items.len();
    let rule = TrimRule::for_count(count);
    items.sort_by(|a, b| value_of(a).total_cmp(&value_of(b)));

    let (start, end) = match rule {
        TrimRule::NoScores | TrimRule::AllCounted => (0, count),
        TrimRule::HighestDiscarded => (0, COUNTED_VALUES),
        TrimRule::ExtremesDiscarded | TrimRule::CenteredWindow => {
            let middle = count - 2;
            let offset = (middle - COUNTED_VALUES) / 2;
            (1 + offset, 1 + offset + COUNTED_VALUES)
        }
    };

    let mut discarded = items;
    let tail = discarded.split_off(end);
    let kept = discarded.split_off(start);
    discarded.extend(tail);

    Trimmed {
        kept,
        discarded,
        rule,
    }
}

pub(crate) fn trimmed_sum(values: Vec<f64>) -> f64 {
    sum_values(&trim_by(values, |value| *value).kept)
}

/// Sum starting from positive zero, so no values add up to `0.0` rather than `-0.0`.
pub(crate) fn sum_values<'a, I>(values: I) -> f64
where
    I: IntoIterator<Item = &'a f64>,
{
    values.into_iter().fold(0.0, |acc, value| acc + value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kept(values: &[f64]) -> Vec<f64> {
        trim_by(values.to_vec(), |value| *value).kept
    }

    #[test]
    fn keeps_everything_up_to_three_values() {
        assert!(kept(&[]).is_empty());
        assert_eq!(kept(&[7.0]), vec![7.0]);
        assert_eq!(kept(&[9.0, 4.0]), vec![4.0, 9.0]);
        assert_eq!(kept(&[9.0, 4.0, 6.0]), vec![4.0, 6.0, 9.0]);
    }

    #[test]
    fn four_values_drop_only_the_highest() {
        let trimmed = trim_by(vec![90.0, 10.0, 30.0, 20.0], |value| *value);
        assert_eq!(trimmed.kept, vec![10.0, 20.0, 30.0]);
        assert_eq!(trimmed.discarded, vec![90.0]);
        assert_eq!(trimmed.rule, TrimRule::HighestDiscarded);
    }

    #[test]
    fn five_values_drop_both_extremes() {
        let trimmed = trim_by(vec![40.0, 90.0, 10.0, 30.0, 20.0], |value| *value);
        assert_eq!(trimmed.kept, vec![20.0, 30.0, 40.0]);
        assert_eq!(trimmed.discarded, vec![10.0, 90.0]);
    }

    #[test]
    fn six_values_take_window_starting_at_first_middle_value() {
        let trimmed = trim_by(vec![50.0, 10.0, 90.0, 20.0, 40.0, 30.0], |value| *value);
        assert_eq!(trimmed.kept, vec![20.0, 30.0, 40.0]);
        assert_eq!(trimmed.discarded, vec![10.0, 50.0, 90.0]);
        assert_eq!(trimmed.rule, TrimRule::CenteredWindow);
    }

    #[test]
    fn seven_values_take_the_centered_window() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        assert_eq!(kept(&values), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn eight_and_nine_values_still_count_three() {
        let eight = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        assert_eq!(kept(&eight), vec![3.0, 4.0, 5.0]);
        let nine = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        assert_eq!(kept(&nine), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn ties_at_the_boundary_do_not_change_the_sum() {
        assert_eq!(trimmed_sum(vec![5.0, 5.0, 5.0, 5.0, 5.0]), 15.0);
        assert_eq!(trimmed_sum(vec![8.0, 6.0, 8.0, 6.0]), 20.0);
    }

    #[test]
    fn no_values_sum_to_positive_zero() {
        let sum = trimmed_sum(Vec::new());
        assert_eq!(sum, 0.0);
        assert!(sum.is_sign_positive());
        assert!(sum_values(&[]).is_sign_positive());
    }

    #[test]
    fn describes_each_rule() {
        assert_eq!(TrimRule::for_count(0).describe(0), "No scores submitted");
        assert!(TrimRule::for_count(2).describe(2).contains("all 2"));
        assert_eq!(
            TrimRule::for_count(5).describe(5),
            "Highest and lowest scores discarded, middle 3 used"
        );
        assert!(TrimRule::for_count(7).describe(7).contains("remaining 5"));
    }
}
