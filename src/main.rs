#![cfg(not(tarpaulin_include))]

use survey_dashboard::{DashboardConfig, app, load_survey, strip_sensitive_columns};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DashboardConfig::default();
    log::info!("Loading survey from {}", config.data_path.display());

    let raw = load_survey(&config.data_path)?.into_table();
    let survey = strip_sensitive_columns(&raw);
    log::info!(
        "Survey ready: {} respondents, columns {:?}",
        survey.row_count(),
        survey.columns()
    );

    app::run(&config, survey).await
}
