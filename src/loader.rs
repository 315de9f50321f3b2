use crate::survey::{Answer, SurveyTable};
use calamine::{Data, ExcelDateTime, Range, Reader, open_workbook_auto_from_rs};
use chrono::NaiveTime;
use std::collections::HashMap;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort loading the survey spreadsheet.
///
/// A missing file is not an error: it is reported as [`LoadOutcome::NotFound`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not parse workbook {}: {source}", .path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("workbook {} has no worksheets", .0.display())]
    NoWorksheet(PathBuf),
}

/// Result of looking for the survey spreadsheet
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(SurveyTable),
    NotFound { path: PathBuf },
}

impl LoadOutcome {
    /// The loaded table, or an empty one when the file was not found.
    pub fn into_table(self) -> SurveyTable {
        match self {
            LoadOutcome::Loaded(table) => table,
            LoadOutcome::NotFound { path } => {
                log::warn!("Arquivo Excel não encontrado. ({})", path.display());
                SurveyTable::empty()
            }
        }
    }
}

/// Load the survey from the first worksheet of a spreadsheet file
///
/// The first row of the sheet holds the column names and every following row is
/// one respondent. XLSX, XLS, XLSB and ODS are detected from the file contents.
///
/// # Arguments
/// * `filepath` - Path to the spreadsheet
///
/// # Returns
/// * `Ok(LoadOutcome::Loaded)` with the parsed table
/// * `Ok(LoadOutcome::NotFound)` when no file exists at `filepath`
/// * `Err(LoadError)` for any other I/O or parse failure
///
/// # Examples
/// ```no_run
/// use survey_dashboard::loader::load_survey;
///
/// let survey = load_survey("Question_Socio.xlsx").unwrap().into_table();
/// println!("{} respondents", survey.row_count());
/// ```
pub fn load_survey(filepath: impl AsRef<Path>) -> Result<LoadOutcome, LoadError> {
    let path = filepath.as_ref();

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(LoadOutcome::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|source| LoadError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::NoWorksheet(path.to_path_buf()))?
        .map_err(|source| LoadError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;

    let table = table_from_range(&range);
    log::info!(
        "Loaded {} rows x {} columns from {}",
        table.row_count(),
        table.columns().len(),
        path.display()
    );

    Ok(LoadOutcome::Loaded(table))
}

fn table_from_range(range: &Range<Data>) -> SurveyTable {
    let mut rows = range.rows();

    let header = match rows.next() {
        Some(header) => header,
        None => return SurveyTable::empty(),
    };

    let columns = column_names(header);
    let body = rows
        .map(|row| row.iter().map(cell_text).collect::<Vec<Answer>>())
        .collect();

    SurveyTable::new(columns, body)
}

// Blank headers become "Unnamed: <i>" and repeats get ".1", ".2", ... suffixes
fn column_names(header: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();

    header
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let base = cell_text(cell).unwrap_or_else(|| format!("Unnamed: {}", i));
            let repeats = seen.entry(base.clone()).or_insert(0);
            let name = if *repeats == 0 {
                base
            } else {
                format!("{}.{}", base, repeats)
            };
            *repeats += 1;
            name
        })
        .collect()
}

fn cell_text(cell: &Data) -> Answer {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        Data::DateTime(dt) => Some(datetime_text(dt)),
        // f64's Display already prints 3.0 as "3"
        other => Some(other.to_string()),
    }
}

/// Calendar form of an Excel date cell: `YYYY-MM-DD`, with the time appended
/// when it is not midnight. Time-only cells give `HH:MM:SS`.
fn datetime_text(dt: &ExcelDateTime) -> String {
    if dt.is_duration() {
        return dt
            .as_duration()
            .map(|d| {
                let secs = d.num_seconds();
                format!("{:02}:{:02}:{:02}", secs / 3600, secs % 3600 / 60, secs % 60)
            })
            .unwrap_or_else(|| dt.to_string());
    }

    match dt.as_datetime() {
        Some(value) if dt.as_f64() < 1.0 => value.format("%H:%M:%S").to_string(),
        Some(value) if value.time() == NaiveTime::MIN => value.format("%Y-%m-%d").to_string(),
        Some(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => dt.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_repeated_headers_are_renamed() {
        let header = vec![
            Data::String("Curso".into()),
            Data::Empty,
            Data::String("Curso".into()),
            Data::String("Curso".into()),
        ];
        assert_eq!(
            column_names(&header),
            vec!["Curso", "Unnamed: 1", "Curso.1", "Curso.2"]
        );
    }

    #[test]
    fn numbers_use_their_shortest_form() {
        assert_eq!(cell_text(&Data::Float(3.0)), Some("3".to_string()));
        assert_eq!(cell_text(&Data::Float(2.5)), Some("2.5".to_string()));
        assert_eq!(cell_text(&Data::Int(42)), Some("42".to_string()));
        assert_eq!(cell_text(&Data::Bool(true)), Some("true".to_string()));
    }

    fn write_dates(path: &Path) {
        use rust_xlsxwriter::{ExcelDateTime as XlsxDateTime, Format, Workbook, Worksheet};

        let date_format = Format::new().set_num_format("dd/mm/yyyy");
        let stamp_format = Format::new().set_num_format("dd/mm/yyyy hh:mm:ss");
        let birth = XlsxDateTime::from_ymd(2001, 5, 17).unwrap();
        let answered = XlsxDateTime::from_ymd(2024, 3, 1)
            .unwrap()
            .and_hms(10, 30, 0)
            .unwrap();

        let mut workbook = Workbook::new();
        let mut worksheet = Worksheet::new();
        worksheet.write_string(0, 0, "Data de nascimento").unwrap();
        worksheet.write_string(0, 1, "Respondido em").unwrap();
        worksheet
            .write_datetime_with_format(1, 0, &birth, &date_format)
            .unwrap();
        worksheet
            .write_datetime_with_format(1, 1, &answered, &stamp_format)
            .unwrap();
        workbook.push_worksheet(worksheet);
        workbook.save(path).unwrap();
    }

    #[test]
    fn date_cells_load_as_calendar_dates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datas.xlsx");
        write_dates(&path);

        let table = load_survey(&path).unwrap().into_table();
        assert_eq!(
            table.non_missing("Data de nascimento"),
            Some(vec!["2001-05-17"])
        );
        assert_eq!(
            table.non_missing("Respondido em"),
            Some(vec!["2024-03-01 10:30:00"])
        );
    }

    #[test]
    fn empty_cells_are_missing() {
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::String(String::new())), None);
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nao_existe.xlsx");

        let outcome = load_survey(&path).unwrap();
        assert!(matches!(outcome, LoadOutcome::NotFound { .. }));
        assert!(outcome.into_table().is_empty());
    }

    #[test]
    fn garbage_file_is_a_workbook_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quebrado.xlsx");
        std::fs::write(&path, b"definitely not a spreadsheet").unwrap();

        let err = load_survey(&path).unwrap_err();
        assert!(matches!(err, LoadError::Workbook { .. }));
    }
}
