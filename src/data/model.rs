//! Education Data Model
//! Typed rows of the statewise education table.

/// CSV column holding the state name.
pub const STATE_COL: &str = "State";
/// CSV column holding the income class label.
pub const INCOME_CLASS_COL: &str = "Income Class";
/// CSV column holding the free-text issue description.
pub const ISSUES_COL: &str = "Issues Faced";

/// One of the five percentage columns of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Literacy,
    Primary,
    Secondary,
    HigherSecondary,
    Graduation,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Literacy,
        Metric::Primary,
        Metric::Secondary,
        Metric::HigherSecondary,
        Metric::Graduation,
    ];

    /// Metrics plotted on the trends chart, in progression order.
    pub const PROGRESSION: [Metric; 4] = [
        Metric::Primary,
        Metric::Secondary,
        Metric::HigherSecondary,
        Metric::Graduation,
    ];

    /// Column name in the source CSV.
    pub fn column(self) -> &'static str {
        match self {
            Metric::Literacy => "Literacy Rate (%)",
            Metric::Primary => "Primary (%)",
            Metric::Secondary => "Secondary (%)",
            Metric::HigherSecondary => "Higher Secondary (%)",
            Metric::Graduation => "Graduation (%)",
        }
    }

    /// Short label used on metric cards.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Literacy => "Avg Literacy",
            Metric::Primary => "Primary",
            Metric::Secondary => "Secondary",
            Metric::HigherSecondary => "Higher Sec",
            Metric::Graduation => "Graduation",
        }
    }

    pub fn value(self, record: &EducationRecord) -> f64 {
        match self {
            Metric::Literacy => record.literacy_rate,
            Metric::Primary => record.primary,
            Metric::Secondary => record.secondary,
            Metric::HigherSecondary => record.higher_secondary,
            Metric::Graduation => record.graduation,
        }
    }
}

/// One row per (state, income class) pair.
///
/// Percentages are stored as read; an empty cell is `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct EducationRecord {
    pub state: String,
    pub income_class: String,
    pub literacy_rate: f64,
    pub primary: f64,
    pub secondary: f64,
    pub higher_secondary: f64,
    pub graduation: f64,
    pub issues_faced: String,
}

/// Immutable, ordered collection of records.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<EducationRecord>,
}

impl Dataset {
    pub fn from_records(records: Vec<EducationRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[EducationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct states in first-occurrence order, spelled as in the source.
    pub fn states(&self) -> Vec<String> {
        let mut states: Vec<String> = Vec::new();
        for record in &self.records {
            if !states.iter().any(|s| s == &record.state) {
                states.push(record.state.clone());
            }
        }
        states
    }

    /// Records of one state, in dataset order.
    pub fn records_for<'a>(&'a self, state: &'a str) -> impl Iterator<Item = &'a EducationRecord> {
        self.records.iter().filter(move |r| r.state == state)
    }
}

#[cfg(test)]
pub(crate) fn record(
    state: &str,
    income_class: &str,
    rates: [f64; 5],
    issues: &str,
) -> EducationRecord {
    EducationRecord {
        state: state.to_string(),
        income_class: income_class.to_string(),
        literacy_rate: rates[0],
        primary: rates[1],
        secondary: rates[2],
        higher_secondary: rates[3],
        graduation: rates[4],
        issues_faced: issues.to_string(),
    }
}
