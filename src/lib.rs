/*!
# Survey Dashboard

A browser-based dashboard for the FATEC Franca socioeconomic survey, built in Rust.

## Overview

The dashboard reads the survey export (an Excel workbook) once at start-up,
removes the columns that identify respondents, and serves a single page where
the user picks a question and sees how its answers are distributed. For the
open question about life stories and dreams, a word cloud of the answers is
shown as well.

## Architecture

### Data Layer
- **loader**: Reads the first worksheet of the workbook into a [`SurveyTable`](survey::SurveyTable).
  A missing file degrades to an empty table so the page still starts.
- **privacy**: Drops `Timestamp`, `Nome completo`, `Telefone` and `E-mail`.
  Only the filtered table is ever handed to the web layer.

### Rendering Layer
- **graph**: Pie chart of the answers to one question, dark theme, PNG.
- **wordcloud**: Tokenizes the open answers, removes Portuguese stopwords,
  lays out the words on an 800×400 canvas and encodes the image as base64.

### Interaction Layer
- **layout**: Title, description, column dropdown and the two output regions.
- **callbacks**: A selection event published to one handler per region.
  Handlers are pure functions of the event and the immutable survey.
- **app**: axum routes, static assets and graceful shutdown.

## Modules

- **survey**: In-memory survey table and value counts
- **loader**: Excel reading with calamine
- **privacy**: Sensitive column removal
- **stopwords**: Portuguese stopword set plus survey-specific words
- **wordcloud**: Word frequencies, layout and rasterisation
- **graph**: Pie chart construction and rendering
- **layout**: Page structure and HTML template
- **callbacks**: Selection events and region handlers
- **config**: Dashboard configuration
- **app**: Routing and server (feature `web`)

## Example

```
use survey_dashboard::{DashboardLayout, SurveyTable, strip_sensitive_columns};

let raw = SurveyTable::new(
    vec!["Nome completo".to_string(), "Curso".to_string()],
    vec![vec![Some("Ana".to_string()), Some("ADS".to_string())]],
);
let layout = DashboardLayout::from_table(&strip_sensitive_columns(&raw));
assert_eq!(layout.dropdown.options.len(), 1);
assert_eq!(layout.dropdown.value.as_deref(), Some("Curso"));
```

## REST API Endpoints

- `/` - The dashboard page
- `/api/layout` - Page structure as JSON
- `/api/update?column={column}` - Recomputes every region for a selection
- `/api/update/{region}?column={column}` - Recomputes `chart` or `wordcloud` only
- `/assets/{file}` - Stylesheet and other static files
*/

// Re-export all modules so they appear in the documentation
#[cfg(feature = "web")]
pub mod app;
pub mod callbacks;
pub mod config;
pub mod graph;
pub mod layout;
pub mod loader;
pub mod privacy;
pub mod stopwords;
pub mod survey;
pub mod wordcloud;

/// Re-export the main entry points to make them easier to use
pub use callbacks::{Region, RegionHandler, RegionUpdate, SelectionBus, SelectionChanged};
pub use config::DashboardConfig;
pub use layout::DashboardLayout;
pub use loader::{LoadError, LoadOutcome, load_survey};
pub use privacy::strip_sensitive_columns;
pub use survey::SurveyTable;
