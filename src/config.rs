//! Command line configuration.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "edu_dashboard", about = "India Education Dashboard", version)]
pub struct DashboardArgs {
    /// Statewise education CSV
    #[arg(long, default_value = "education_state_income_detailed.csv")]
    pub data: PathBuf,

    /// GeoJSON FeatureCollection with state boundaries
    #[arg(long, default_value = "india.json")]
    pub geojson: PathBuf,

    /// Feature property holding the state name
    #[arg(long, default_value = "st_nm")]
    pub feature_key: String,

    /// State selected at start-up (defaults to the first state in the data)
    #[arg(long)]
    pub state: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_bundled_files() {
        let args = DashboardArgs::parse_from(["edu_dashboard"]);
        assert_eq!(args.data, PathBuf::from("education_state_income_detailed.csv"));
        assert_eq!(args.geojson, PathBuf::from("india.json"));
        assert_eq!(args.feature_key, "st_nm");
        assert_eq!(args.state, None);
    }

    #[test]
    fn overrides() {
        let args = DashboardArgs::parse_from([
            "edu_dashboard",
            "--data",
            "data/edu.csv",
            "--feature-key",
            "NAME_1",
            "--state",
            "Kerala",
        ]);
        assert_eq!(args.data, PathBuf::from("data/edu.csv"));
        assert_eq!(args.feature_key, "NAME_1");
        assert_eq!(args.state.as_deref(), Some("Kerala"));
    }
}
