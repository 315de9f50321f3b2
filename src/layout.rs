//! Page structure: title, description, column selector and the two output regions.

use crate::survey::SurveyTable;
use serde::Serialize;

pub const PAGE_TITLE: &str = "Dashboard Socioeconômico - FATEC Franca";
pub const PAGE_DESCRIPTION: &str = "Escolha uma das opções abaixo.";

/// Element ids the page script addresses
pub const DROPDOWN_ID: &str = "dropdown-column";
pub const GRAPH_ID: &str = "graph";
pub const WORDCLOUD_ID: &str = "wordcloud-container";

#[cfg(feature = "web")]
const PAGE_TEMPLATE: &str = include_str!("./static/dashboard.html");

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}

/// Column selector; one option per remaining survey column
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Dropdown {
    pub id: String,
    pub options: Vec<DropdownOption>,
    /// Preselected value, the first column
    pub value: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardLayout {
    pub title: String,
    pub description: String,
    pub dropdown: Dropdown,
    pub graph_id: String,
    pub wordcloud_id: String,
}

impl DashboardLayout {
    /// Builds the page structure for a filtered survey
    ///
    /// An empty survey gives a dropdown without options and nothing selected.
    ///
    /// # Examples
    /// ```
    /// use survey_dashboard::layout::DashboardLayout;
    /// use survey_dashboard::survey::SurveyTable;
    ///
    /// let layout = DashboardLayout::from_table(&SurveyTable::empty());
    /// assert!(layout.dropdown.options.is_empty());
    /// assert_eq!(layout.dropdown.value, None);
    /// ```
    pub fn from_table(table: &SurveyTable) -> Self {
        let options: Vec<DropdownOption> = if table.is_empty() {
            Vec::new()
        } else {
            table
                .columns()
                .iter()
                .map(|column| DropdownOption {
                    label: column.clone(),
                    value: column.clone(),
                })
                .collect()
        };
        let value = options.first().map(|option| option.value.clone());

        DashboardLayout {
            title: PAGE_TITLE.to_string(),
            description: PAGE_DESCRIPTION.to_string(),
            dropdown: Dropdown {
                id: DROPDOWN_ID.to_string(),
                options,
                value,
            },
            graph_id: GRAPH_ID.to_string(),
            wordcloud_id: WORDCLOUD_ID.to_string(),
        }
    }

    /// Renders the page as HTML.
    ///
    /// # Returns
    /// * A Result containing the full document or the template error
    #[cfg(feature = "web")]
    pub fn render_html(&self) -> Result<String, handlebars::RenderError> {
        let mut registry = handlebars::Handlebars::new();
        registry.register_template_string("dashboard", PAGE_TEMPLATE)?;
        registry.render("dashboard", self)
    }
}
