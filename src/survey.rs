use serde::Serialize;
use std::collections::HashMap;

/// A single survey answer. `None` marks a missing cell.
pub type Answer = Option<String>;

/// In-memory survey table: one row per respondent, one column per survey field.
///
/// The table is built once at start-up and never mutated afterwards, so it can be
/// shared across request handlers without synchronisation.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SurveyTable {
    columns: Vec<String>,
    rows: Vec<Vec<Answer>>,
}

/// Frequency of one distinct value in a column
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

impl SurveyTable {
    /// Creates a table from column names and rows.
    ///
    /// Every row is normalised to the column count: short rows are padded with
    /// missing answers and extra cells are dropped.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Answer>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();

        SurveyTable { columns, rows }
    }

    /// Table with zero rows and zero columns
    pub fn empty() -> Self {
        SurveyTable::default()
    }

    /// True when the table has no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Answer>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Non-missing values of a column in row order, or `None` if the column does not exist.
    pub fn non_missing(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.column_index(name)?;

        Some(
            self.rows
                .iter()
                .filter_map(|row| row[index].as_deref())
                .collect(),
        )
    }

    /// Projection without the given columns.
    ///
    /// Names that are not in the table are ignored. The remaining columns keep
    /// their relative order and every row stays aligned with its respondent.
    pub fn without_columns(&self, excluded: &[&str]) -> SurveyTable {
        let kept: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, name)| !excluded.contains(&name.as_str()))
            .map(|(index, _)| index)
            .collect();

        let columns = kept.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| kept.iter().map(|&i| row[i].clone()).collect())
            .collect();

        SurveyTable { columns, rows }
    }

    /// Counts the distinct non-missing values of a column.
    ///
    /// Sorted by count (highest first); values with the same count keep the
    /// order in which they first appear.
    pub fn value_counts(&self, name: &str) -> Option<Vec<ValueCount>> {
        let values = self.non_missing(name)?;

        let mut counts: Vec<ValueCount> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for value in values {
            match positions.get(value) {
                Some(&pos) => counts[pos].count += 1,
                None => {
                    positions.insert(value, counts.len());
                    counts.push(ValueCount {
                        value: value.to_string(),
                        count: 1,
                    });
                }
            }
        }

        // Stable sort keeps first-appearance order for ties
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        Some(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(s: &str) -> Answer {
        Some(s.to_string())
    }

    fn sample() -> SurveyTable {
        SurveyTable::new(
            vec!["Curso".into(), "Idade".into(), "Cidade".into()],
            vec![
                vec![answer("ADS"), answer("20"), answer("Franca")],
                vec![answer("GE"), None, answer("Franca")],
                vec![answer("ADS"), answer("22")],
            ],
        )
    }

    #[test]
    fn rows_are_padded_to_column_count() {
        let table = sample();
        assert_eq!(table.rows()[2].len(), 3);
        assert_eq!(table.rows()[2][2], None);
    }

    #[test]
    fn empty_table_has_no_rows_and_no_columns() {
        let table = SurveyTable::empty();
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);
        assert!(table.columns().is_empty());
    }

    #[test]
    fn table_with_header_only_counts_as_empty() {
        let table = SurveyTable::new(vec!["Curso".into()], Vec::new());
        assert!(table.is_empty());
        assert!(table.contains_column("Curso"));
    }

    #[test]
    fn non_missing_skips_missing_answers() {
        let table = sample();
        assert_eq!(table.non_missing("Idade"), Some(vec!["20", "22"]));
        assert_eq!(table.non_missing("Cidade"), Some(vec!["Franca", "Franca"]));
        assert_eq!(table.non_missing("Renda"), None);
    }

    #[test]
    fn without_columns_keeps_order_and_alignment() {
        let table = sample().without_columns(&["Idade", "Inexistente"]);
        assert_eq!(table.columns(), &["Curso".to_string(), "Cidade".to_string()]);
        assert_eq!(table.rows()[1], vec![answer("GE"), answer("Franca")]);
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn value_counts_sorted_by_frequency_then_first_seen() {
        let table = SurveyTable::new(
            vec!["Q".into()],
            vec![
                vec![answer("B")],
                vec![answer("A")],
                vec![answer("A")],
                vec![None],
                vec![answer("C")],
            ],
        );

        let counts = table.value_counts("Q").unwrap();
        let pairs: Vec<(&str, usize)> = counts
            .iter()
            .map(|c| (c.value.as_str(), c.count))
            .collect();
        assert_eq!(pairs, vec![("A", 2), ("B", 1), ("C", 1)]);
    }
}
