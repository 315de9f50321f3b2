use crate::graph::{GraphOptions, PieChart, pie_chart, png_data_url, render_pie_chart};
use crate::survey::SurveyTable;
use crate::wordcloud::{TARGET_QUESTION, generate_wordcloud};
use serde::{Deserialize, Serialize};
use std::error::Error;

/// Heading shown above the word cloud image
pub const WORDCLOUD_HEADING: &str = "Nuvem de Palavras - Sonhos e Histórias";

/// Message shown when the target question has no usable answers
pub const WORDCLOUD_NO_DATA: &str = "Nenhum dado disponível para gerar a nuvem de palavras.";

/// The user picked a column in the dropdown
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct SelectionChanged {
    pub column: Option<String>,
}

impl SelectionChanged {
    pub fn new(column: impl Into<String>) -> Self {
        SelectionChanged {
            column: Some(column.into()),
        }
    }
}

/// Output regions of the page that react to a selection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum Region {
    #[serde(rename = "chart")]
    Chart,
    #[serde(rename = "wordcloud")]
    WordCloud,
}

/// Chart region content
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartFigure {
    #[serde(flatten)]
    pub chart: PieChart,
    /// Rendered chart as a `data:image/png;base64,...` URL
    pub image: String,
}

/// Word-cloud region content
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WordCloudPanel {
    /// Nothing is shown; the selection is not the target question
    Empty,
    NoData { message: String },
    Image { heading: String, src: String },
}

/// New content for one region
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "region", content = "content")]
pub enum RegionUpdate {
    #[serde(rename = "chart")]
    Chart(ChartFigure),
    #[serde(rename = "wordcloud")]
    WordCloud(WordCloudPanel),
}

impl RegionUpdate {
    pub fn region(&self) -> Region {
        match self {
            RegionUpdate::Chart(_) => Region::Chart,
            RegionUpdate::WordCloud(_) => Region::WordCloud,
        }
    }
}

/// Recomputes one region from a selection.
///
/// Handlers only read the survey and the event, so they can run in any order
/// or on their own.
pub trait RegionHandler: Send + Sync {
    fn region(&self) -> Region;

    fn handle(
        &self,
        survey: &SurveyTable,
        event: &SelectionChanged,
    ) -> Result<RegionUpdate, Box<dyn Error>>;
}

/// Pie chart of the selected column
#[derive(Default)]
pub struct ChartHandler {
    pub options: GraphOptions,
}

impl RegionHandler for ChartHandler {
    fn region(&self) -> Region {
        Region::Chart
    }

    fn handle(
        &self,
        survey: &SurveyTable,
        event: &SelectionChanged,
    ) -> Result<RegionUpdate, Box<dyn Error>> {
        let chart = pie_chart(survey, event.column.as_deref());
        let png = render_pie_chart(&chart, &self.options)?;

        Ok(RegionUpdate::Chart(ChartFigure {
            chart,
            image: png_data_url(&png),
        }))
    }
}

/// Word cloud, only for the target question
#[derive(Default)]
pub struct WordCloudHandler;

impl RegionHandler for WordCloudHandler {
    fn region(&self) -> Region {
        Region::WordCloud
    }

    fn handle(
        &self,
        survey: &SurveyTable,
        event: &SelectionChanged,
    ) -> Result<RegionUpdate, Box<dyn Error>> {
        if event.column.as_deref() != Some(TARGET_QUESTION) {
            return Ok(RegionUpdate::WordCloud(WordCloudPanel::Empty));
        }

        let panel = match generate_wordcloud(survey)? {
            Some(image) => WordCloudPanel::Image {
                heading: WORDCLOUD_HEADING.to_string(),
                src: format!("data:image/png;base64,{}", image),
            },
            None => WordCloudPanel::NoData {
                message: WORDCLOUD_NO_DATA.to_string(),
            },
        };

        Ok(RegionUpdate::WordCloud(panel))
    }
}

/// Delivers selection events to the region handlers
pub struct SelectionBus {
    handlers: Vec<Box<dyn RegionHandler>>,
}

impl SelectionBus {
    /// Bus without handlers
    pub fn new() -> Self {
        SelectionBus {
            handlers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, handler: Box<dyn RegionHandler>) {
        self.handlers.push(handler);
    }

    pub fn regions(&self) -> Vec<Region> {
        self.handlers.iter().map(|h| h.region()).collect()
    }

    /// Runs every handler for the event and collects their updates.
    pub fn publish(
        &self,
        survey: &SurveyTable,
        event: &SelectionChanged,
    ) -> Result<Vec<RegionUpdate>, Box<dyn Error>> {
        self.handlers
            .iter()
            .map(|handler| handler.handle(survey, event))
            .collect()
    }

    /// Runs only the handler of `region`; `None` if no handler serves it.
    pub fn publish_to(
        &self,
        region: Region,
        survey: &SurveyTable,
        event: &SelectionChanged,
    ) -> Option<Result<RegionUpdate, Box<dyn Error>>> {
        self.handlers
            .iter()
            .find(|handler| handler.region() == region)
            .map(|handler| handler.handle(survey, event))
    }
}

impl Default for SelectionBus {
    /// Bus with the chart and word-cloud handlers
    fn default() -> Self {
        let mut bus = SelectionBus::new();
        bus.subscribe(Box::new(ChartHandler::default()));
        bus.subscribe(Box::new(WordCloudHandler));
        bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn survey() -> SurveyTable {
        SurveyTable::new(
            vec!["Curso".into(), TARGET_QUESTION.into()],
            vec![
                vec![Some("A".into()), Some("Eu quero viajar pelo mundo".into())],
                vec![Some("A".into()), Some("Meu sonho é estudar".into())],
                vec![Some("B".into()), None],
            ],
        )
    }

    // Stand-in handler that records nothing and never renders
    struct Fixed(Region);

    impl RegionHandler for Fixed {
        fn region(&self) -> Region {
            self.0
        }

        fn handle(
            &self,
            _survey: &SurveyTable,
            _event: &SelectionChanged,
        ) -> Result<RegionUpdate, Box<dyn Error>> {
            Ok(RegionUpdate::WordCloud(WordCloudPanel::Empty))
        }
    }

    #[test]
    fn other_columns_leave_the_wordcloud_empty() {
        let handler = WordCloudHandler;
        for column in [Some("Curso"), Some("Inexistente"), None] {
            let event = SelectionChanged {
                column: column.map(str::to_string),
            };
            let update = handler.handle(&survey(), &event).unwrap();
            assert_eq!(update, RegionUpdate::WordCloud(WordCloudPanel::Empty));
        }
    }

    #[test]
    fn target_question_without_data_reports_no_data() {
        let update = WordCloudHandler
            .handle(&SurveyTable::empty(), &SelectionChanged::new(TARGET_QUESTION))
            .unwrap();
        assert_eq!(
            update,
            RegionUpdate::WordCloud(WordCloudPanel::NoData {
                message: WORDCLOUD_NO_DATA.to_string()
            })
        );
    }

    #[test]
    fn target_question_renders_image() {
        let update = WordCloudHandler
            .handle(&survey(), &SelectionChanged::new(TARGET_QUESTION))
            .unwrap();
        match update {
            RegionUpdate::WordCloud(WordCloudPanel::Image { heading, src }) => {
                assert_eq!(heading, WORDCLOUD_HEADING);
                assert!(src.starts_with("data:image/png;base64,"));
                assert!(src.len() > "data:image/png;base64,".len());
            }
            other => panic!("unexpected update {:?}", other),
        }
    }

    #[test]
    fn chart_handler_counts_answers() {
        let update = ChartHandler::default()
            .handle(&survey(), &SelectionChanged::new("Curso"))
            .unwrap();
        match update {
            RegionUpdate::Chart(figure) => {
                assert_eq!(figure.chart.title, "Distribuição de Curso");
                assert_eq!(figure.chart.slices.len(), 2);
                assert!(figure.image.starts_with("data:image/png;base64,"));
            }
            other => panic!("unexpected update {:?}", other),
        }
    }

    #[test]
    fn bus_publishes_to_every_region() {
        let bus = SelectionBus::default();
        assert_eq!(bus.regions(), vec![Region::Chart, Region::WordCloud]);

        let updates = bus
            .publish(&SurveyTable::empty(), &SelectionChanged::new("Curso"))
            .unwrap();
        let regions: Vec<Region> = updates.iter().map(RegionUpdate::region).collect();
        assert_eq!(regions, vec![Region::Chart, Region::WordCloud]);
    }

    #[test]
    fn publish_to_runs_a_single_region() {
        let mut bus = SelectionBus::new();
        bus.subscribe(Box::new(Fixed(Region::WordCloud)));

        let event = SelectionChanged::default();
        assert!(bus.publish_to(Region::Chart, &survey(), &event).is_none());
        let update = bus
            .publish_to(Region::WordCloud, &survey(), &event)
            .unwrap()
            .unwrap();
        assert_eq!(update.region(), Region::WordCloud);
    }

    #[test]
    fn updates_serialize_with_region_tags() {
        let json = serde_json::to_value(RegionUpdate::WordCloud(WordCloudPanel::Empty)).unwrap();
        assert_eq!(json["region"], "wordcloud");
        assert_eq!(json["content"]["kind"], "empty");
    }
}
