//! Metrics Aggregator Module
//! Per-state means, successive deltas, national literacy and issue lookup.

use crate::data::{Dataset, EducationRecord, Metric};
use rayon::prelude::*;
use statrs::statistics::{Data, Median, Statistics};
use std::collections::HashMap;

/// Means of the five percentage columns for one state.
///
/// A state with no records (or only empty cells) has `NaN` means.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSummary {
    pub state: String,
    pub mean_literacy: f64,
    pub mean_primary: f64,
    pub mean_secondary: f64,
    pub mean_higher_secondary: f64,
    pub mean_graduation: f64,
}

impl StateSummary {
    fn empty(state: &str) -> Self {
        Self {
            state: state.to_string(),
            mean_literacy: f64::NAN,
            mean_primary: f64::NAN,
            mean_secondary: f64::NAN,
            mean_higher_secondary: f64::NAN,
            mean_graduation: f64::NAN,
        }
    }

    pub fn mean(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Literacy => self.mean_literacy,
            Metric::Primary => self.mean_primary,
            Metric::Secondary => self.mean_secondary,
            Metric::HigherSecondary => self.mean_higher_secondary,
            Metric::Graduation => self.mean_graduation,
        }
    }

    pub fn primary_delta(&self) -> f64 {
        self.mean_primary - self.mean_literacy
    }

    pub fn secondary_delta(&self) -> f64 {
        self.mean_secondary - self.mean_primary
    }

    pub fn higher_sec_delta(&self) -> f64 {
        self.mean_higher_secondary - self.mean_secondary
    }

    pub fn graduation_delta(&self) -> f64 {
        self.mean_graduation - self.mean_higher_secondary
    }

    /// Change from the previous metric card; literacy has none.
    pub fn delta(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Literacy => None,
            Metric::Primary => Some(self.primary_delta()),
            Metric::Secondary => Some(self.secondary_delta()),
            Metric::HigherSecondary => Some(self.higher_sec_delta()),
            Metric::Graduation => Some(self.graduation_delta()),
        }
    }

    /// True when every mean is absent.
    pub fn is_empty(&self) -> bool {
        Metric::ALL.iter().all(|m| self.mean(*m).is_nan())
    }
}

/// Spread of state-level mean literacy across the country.
#[derive(Debug, Clone, PartialEq)]
pub struct NationalOverview {
    pub states: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

/// Everything the dashboard shows for one selected state.
#[derive(Debug, Clone)]
pub struct StateReport {
    pub summary: StateSummary,
    /// Records of the state in dataset order (trends chart rows).
    pub records: Vec<EducationRecord>,
    pub issues: Vec<(String, String)>,
    pub national: HashMap<String, f64>,
}

/// Stateless aggregation over a loaded dataset.
pub struct MetricsAggregator;

impl MetricsAggregator {
    /// Arithmetic mean skipping NaN; NaN when nothing is left.
    pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
        let (sum, count) = values
            .into_iter()
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        if count == 0 {
            return f64::NAN;
        }
        sum / count as f64
    }

    pub fn summarize(dataset: &Dataset, state: &str) -> StateSummary {
        let rows: Vec<&EducationRecord> = dataset.records_for(state).collect();
        if rows.is_empty() {
            return StateSummary::empty(state);
        }

        let mean_of = |metric: Metric| Self::mean(rows.iter().map(|r| metric.value(r)));

        StateSummary {
            state: state.to_string(),
            mean_literacy: mean_of(Metric::Literacy),
            mean_primary: mean_of(Metric::Primary),
            mean_secondary: mean_of(Metric::Secondary),
            mean_higher_secondary: mean_of(Metric::HigherSecondary),
            mean_graduation: mean_of(Metric::Graduation),
        }
    }

    /// Mean literacy per distinct state, keyed by the dataset's spelling.
    pub fn national_literacy_by_state(dataset: &Dataset) -> HashMap<String, f64> {
        let mut groups: HashMap<&str, (f64, usize)> = HashMap::new();
        for record in dataset.records() {
            let entry = groups.entry(record.state.as_str()).or_insert((0.0, 0));
            if !record.literacy_rate.is_nan() {
                entry.0 += record.literacy_rate;
                entry.1 += 1;
            }
        }

        groups
            .into_iter()
            .map(|(state, (sum, count))| {
                let mean = if count == 0 {
                    f64::NAN
                } else {
                    sum / count as f64
                };
                (state.to_string(), mean)
            })
            .collect()
    }

    /// Issue text per income class of `state`, first occurrence wins.
    pub fn issues_by_income_class(dataset: &Dataset, state: &str) -> Vec<(String, String)> {
        let mut issues: Vec<(String, String)> = Vec::new();
        for record in dataset.records_for(state) {
            if !issues.iter().any(|(class, _)| class == &record.income_class) {
                issues.push((record.income_class.clone(), record.issues_faced.clone()));
            }
        }
        issues
    }

    /// Summaries for every state in parallel, in dataset state order.
    pub fn summarize_all(dataset: &Dataset) -> Vec<StateSummary> {
        dataset
            .states()
            .par_iter()
            .map(|state| Self::summarize(dataset, state))
            .collect()
    }

    /// Recompute everything for a new selection.
    pub fn state_report(dataset: &Dataset, state: &str) -> StateReport {
        StateReport {
            summary: Self::summarize(dataset, state),
            records: dataset.records_for(state).cloned().collect(),
            issues: Self::issues_by_income_class(dataset, state),
            national: Self::national_literacy_by_state(dataset),
        }
    }

    /// Min and max of the defined values, `None` if there are none.
    pub fn literacy_range(national: &HashMap<String, f64>) -> Option<(f64, f64)> {
        let values: Vec<f64> = national.values().copied().filter(|v| !v.is_nan()).collect();
        if values.is_empty() {
            return None;
        }
        Some((Statistics::min(&values), Statistics::max(&values)))
    }

    /// Descriptive statistics of the national literacy mapping.
    pub fn national_overview(national: &HashMap<String, f64>) -> Option<NationalOverview> {
        let values: Vec<f64> = national.values().copied().filter(|v| !v.is_nan()).collect();
        if values.is_empty() {
            return None;
        }

        let std_dev = if values.len() > 1 {
            Statistics::std_dev(&values)
        } else {
            0.0
        };

        Some(NationalOverview {
            states: values.len(),
            mean: Self::mean(values.iter().copied()),
            median: Data::new(values.clone()).median(),
            std_dev,
            min: Statistics::min(&values),
            max: Statistics::max(&values),
        })
    }
}

/// One-decimal percentage for display; absent values read "n/a".
pub fn format_percent(value: f64) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.1}%", value)
    }
}

/// Signed one-decimal change between stages, e.g. "+5.0%" or "-7.5%".
pub fn format_delta(value: f64) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:+.1}%", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record;

    fn kerala() -> Dataset {
        Dataset::from_records(vec![
            record("Kerala", "Low", [80.0, 70.0, 60.0, 50.0, 40.0], "Fees"),
            record("Bihar", "Low", [50.0, 60.0, 40.0, 30.0, 10.0], "Child labour"),
            record("Kerala", "High", [95.0, 90.0, 85.0, 80.0, 75.0], "Competition"),
            record("Bihar", "Middle", [70.0, 75.0, 55.0, 45.0, 25.0], "Distance"),
            record("Bihar", "Low", [52.0, 61.0, 41.0, 31.0, 11.0], "Duplicate row"),
        ])
    }

    #[test]
    fn kerala_example() {
        let s = MetricsAggregator::summarize(&kerala(), "Kerala");
        assert_eq!(s.mean_literacy, 87.5);
        assert_eq!(s.mean_primary, 80.0);
        assert_eq!(s.primary_delta(), -7.5);
        assert_eq!(s.mean_secondary, 72.5);
        assert_eq!(s.mean_higher_secondary, 65.0);
        assert_eq!(s.mean_graduation, 57.5);
    }

    #[test]
    fn deltas_are_exact_differences() {
        let s = MetricsAggregator::summarize(&kerala(), "Bihar");
        assert_eq!(s.primary_delta(), s.mean_primary - s.mean_literacy);
        assert_eq!(s.secondary_delta(), s.mean_secondary - s.mean_primary);
        assert_eq!(s.higher_sec_delta(), s.mean_higher_secondary - s.mean_secondary);
        assert_eq!(s.graduation_delta(), s.mean_graduation - s.mean_higher_secondary);
        assert_eq!(s.delta(Metric::Literacy), None);
        assert_eq!(s.delta(Metric::Secondary), Some(s.secondary_delta()));
    }

    #[test]
    fn mean_matches_filtered_rows() {
        let ds = kerala();
        let s = MetricsAggregator::summarize(&ds, "Bihar");
        let rows: Vec<f64> = ds.records_for("Bihar").map(|r| r.literacy_rate).collect();
        let expected = rows.iter().sum::<f64>() / rows.len() as f64;
        assert_eq!(s.mean_literacy, expected);
    }

    #[test]
    fn unknown_state_is_all_nan() {
        let s = MetricsAggregator::summarize(&kerala(), "NoSuchState");
        assert!(s.is_empty());
        assert!(s.mean_literacy.is_nan());
        assert!(s.mean_graduation.is_nan());
        assert!(s.primary_delta().is_nan());
        assert_eq!(s.state, "NoSuchState");
    }

    #[test]
    fn summarize_is_idempotent() {
        let ds = kerala();
        assert_eq!(
            MetricsAggregator::summarize(&ds, "Kerala"),
            MetricsAggregator::summarize(&ds, "Kerala")
        );
    }

    #[test]
    fn nan_cells_are_skipped() {
        let ds = Dataset::from_records(vec![
            record("Goa", "Low", [f64::NAN, 70.0, 60.0, 50.0, 40.0], ""),
            record("Goa", "High", [90.0, 80.0, 60.0, 50.0, f64::NAN], ""),
            record("Assam", "Low", [f64::NAN, 1.0, 1.0, 1.0, 1.0], ""),
        ]);
        let s = MetricsAggregator::summarize(&ds, "Goa");
        assert_eq!(s.mean_literacy, 90.0);
        assert_eq!(s.mean_primary, 75.0);
        assert_eq!(s.mean_graduation, 40.0);

        let national = MetricsAggregator::national_literacy_by_state(&ds);
        assert_eq!(national.len(), 2);
        assert!(national["Assam"].is_nan());
    }

    #[test]
    fn national_literacy_has_one_entry_per_state() {
        let national = MetricsAggregator::national_literacy_by_state(&kerala());
        assert_eq!(national.len(), 2);
        assert_eq!(national["Kerala"], 87.5);
        assert_eq!(national["Bihar"], (50.0 + 70.0 + 52.0) / 3.0);
    }

    #[test]
    fn issues_follow_first_occurrence() {
        let issues = MetricsAggregator::issues_by_income_class(&kerala(), "Bihar");
        assert_eq!(
            issues,
            vec![
                ("Low".to_string(), "Child labour".to_string()),
                ("Middle".to_string(), "Distance".to_string()),
            ]
        );
        assert!(MetricsAggregator::issues_by_income_class(&kerala(), "Goa").is_empty());
    }

    #[test]
    fn summarize_all_keeps_state_order() {
        let all = MetricsAggregator::summarize_all(&kerala());
        let states: Vec<&str> = all.iter().map(|s| s.state.as_str()).collect();
        assert_eq!(states, vec!["Kerala", "Bihar"]);
        assert_eq!(all[0], MetricsAggregator::summarize(&kerala(), "Kerala"));
    }

    #[test]
    fn state_report_bundles_selection() {
        let report = MetricsAggregator::state_report(&kerala(), "Kerala");
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[1].income_class, "High");
        assert_eq!(report.issues.len(), 2);
        assert_eq!(report.national.len(), 2);
        assert_eq!(report.summary.mean_literacy, 87.5);
    }

    #[test]
    fn range_and_overview_ignore_nan() {
        let mut national = HashMap::new();
        assert_eq!(MetricsAggregator::literacy_range(&national), None);
        assert!(MetricsAggregator::national_overview(&national).is_none());

        national.insert("A".to_string(), 60.0);
        national.insert("B".to_string(), 80.0);
        national.insert("C".to_string(), 70.0);
        national.insert("D".to_string(), f64::NAN);

        assert_eq!(MetricsAggregator::literacy_range(&national), Some((60.0, 80.0)));
        let overview = MetricsAggregator::national_overview(&national).unwrap();
        assert_eq!(overview.states, 3);
        assert_eq!(overview.mean, 70.0);
        assert_eq!(overview.median, 70.0);
        assert!((overview.std_dev - 10.0).abs() < 1e-9);
    }

    #[test]
    fn percent_formatting() {
        assert_eq!(format_percent(87.5), "87.5%");
        assert_eq!(format_percent(-7.5), "-7.5%");
        assert_eq!(format_percent(80.0), "80.0%");
        assert_eq!(format_percent(f64::NAN), "n/a");

        assert_eq!(format_delta(5.0), "+5.0%");
        assert_eq!(format_delta(-7.5), "-7.5%");
        assert_eq!(format_delta(f64::NAN), "n/a");
    }
}
