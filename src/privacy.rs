use crate::survey::SurveyTable;

/// Columns that identify a respondent and are never shown on the dashboard
pub const SENSITIVE_COLUMNS: [&str; 4] = ["Timestamp", "Nome completo", "Telefone", "E-mail"];

/// Drops the identifying columns from the raw survey.
///
/// Runs once at start-up; the returned table is the only one the web layer sees.
/// Sensitive names that are not present in `raw` are ignored.
pub fn strip_sensitive_columns(raw: &SurveyTable) -> SurveyTable {
    let removed: Vec<&str> = SENSITIVE_COLUMNS
        .iter()
        .copied()
        .filter(|name| raw.contains_column(name))
        .collect();
    log::debug!("Removing sensitive columns: {:?}", removed);

    raw.without_columns(&SENSITIVE_COLUMNS)
}
