use crate::survey::SurveyTable;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::Serialize;
use std::error::Error;

/// Title of the chart shown when there is nothing to plot
pub const NO_DATA_TITLE: &str = "Sem dados disponíveis";

/// Background of the dark theme (plotly_dark paper colour)
pub const DARK_BACKGROUND: RGBColor = RGBColor(17, 17, 17);

/// Foreground text colour of the dark theme
pub const DARK_FOREGROUND: RGBColor = RGBColor(242, 245, 250);

/// Slice colours, in the order plotly assigns them
const PALETTE: [RGBColor; 10] = [
    RGBColor(99, 110, 250),
    RGBColor(239, 85, 59),
    RGBColor(0, 204, 150),
    RGBColor(171, 99, 250),
    RGBColor(255, 161, 90),
    RGBColor(25, 211, 243),
    RGBColor(255, 102, 146),
    RGBColor(182, 232, 128),
    RGBColor(255, 151, 255),
    RGBColor(254, 203, 82),
];

// Legend entries longer than this are cut with an ellipsis
const LEGEND_LABEL_CHARS: usize = 38;

/// Configuration options for chart rendering
///
/// This structure contains the customizable properties of the rendered
/// pie chart image.
#[derive(Clone, Debug)]
pub struct GraphOptions {
    /// Width of the graph in pixels
    pub width: u32,

    /// Height of the graph in pixels
    pub height: u32,

    /// Font size of the title
    pub title_size: u32,

    /// Font size of legend entries
    pub legend_size: u32,
}

impl Default for GraphOptions {
    /// Creates a default configuration for chart rendering
    ///
    /// # Returns
    /// * `GraphOptions` - 900x500 pixels, 22px title, 14px legend
    fn default() -> Self {
        Self {
            width: 900,
            height: 500,
            title_size: 22,
            legend_size: 14,
        }
    }
}

/// One wedge of the pie: a distinct answer and how often it was given
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub count: usize,
    /// Share of all non-missing answers, between 0 and 1
    pub fraction: f64,
}

/// Distribution of the answers to one column
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<PieSlice>,
}

impl PieChart {
    /// Chart shown when the table is empty or the column does not exist
    pub fn placeholder() -> Self {
        PieChart {
            title: NO_DATA_TITLE.to_string(),
            slices: Vec::new(),
        }
    }

    /// True only for the "no data" chart, not for a real column without answers
    pub fn is_placeholder(&self) -> bool {
        self.title == NO_DATA_TITLE
    }
}

/// Builds the pie chart for a selected column
///
/// The chart has one slice per distinct non-missing answer, largest first.
/// When the table is empty, no column is selected or the column does not
/// exist, the placeholder chart is returned instead.
///
/// # Arguments
/// * `table` - The filtered survey
/// * `column` - The selected column, if any
///
/// # Examples
/// ```
/// use survey_dashboard::graph::{pie_chart, NO_DATA_TITLE};
/// use survey_dashboard::survey::SurveyTable;
///
/// let chart = pie_chart(&SurveyTable::empty(), Some("Curso"));
/// assert_eq!(chart.title, NO_DATA_TITLE);
/// ```
pub fn pie_chart(table: &SurveyTable, column: Option<&str>) -> PieChart {
    let column = match column {
        Some(column) if !table.is_empty() => column,
        _ => return PieChart::placeholder(),
    };

    let counts = match table.value_counts(column) {
        Some(counts) => counts,
        None => return PieChart::placeholder(),
    };

    let total: usize = counts.iter().map(|c| c.count).sum();
    let slices = counts
        .into_iter()
        .map(|c| PieSlice {
            fraction: c.count as f64 / total as f64,
            label: c.value,
            count: c.count,
        })
        .collect();

    PieChart {
        title: format!("Distribuição de {}", column),
        slices,
    }
}

/// Renders a pie chart with the dark theme
///
/// Slices run clockwise from twelve o'clock with their percentage printed
/// inside, and a legend on the right lists every answer with its count.
/// A chart without slices renders only its title.
///
/// # Returns
/// * A Result containing the PNG image data as bytes or an error
pub fn render_pie_chart(
    chart: &PieChart,
    options: &GraphOptions,
) -> Result<Vec<u8>, Box<dyn Error>> {
    let (width, height) = (options.width, options.height);
    let mut pixels = vec![0u8; (width * height * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        root.fill(&DARK_BACKGROUND)?;

        let title_style = ("sans-serif", options.title_size)
            .into_font()
            .color(&DARK_FOREGROUND);
        let body = root.titled(&chart.title, title_style)?;

        if !chart.slices.is_empty() {
            draw_pie(&body, chart, options)?;
        }

        root.present()?;
    }

    encode_png(&pixels, width, height)
}

fn draw_pie(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    chart: &PieChart,
    options: &GraphOptions,
) -> Result<(), Box<dyn Error>> {
    let (area_width, area_height) = area.dim_in_pixel();
    let (pie_area, legend_area) = area.split_horizontally(area_width * 3 / 5);

    // Pie takes backend coordinates, so the centre includes the area's offset
    let (base_x, base_y) = pie_area.get_base_pixel();
    let center = (
        base_x + (area_width * 3 / 10) as i32,
        base_y + (area_height / 2) as i32,
    );
    let radius = (area_width * 3 / 5).min(area_height) as f64 * 0.4;

    let sizes: Vec<f64> = chart.slices.iter().map(|s| s.count as f64).collect();
    let colors: Vec<RGBColor> = (0..chart.slices.len()).map(slice_color).collect();
    // Labels live in the legend; the wedges carry percentages only
    let labels: Vec<&str> = chart.slices.iter().map(|_| "").collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(-90.0);
    pie.label_style(("sans-serif", options.legend_size).into_font().color(&DARK_FOREGROUND));
    pie.percentages(("sans-serif", options.legend_size).into_font().color(&WHITE));
    pie_area.draw(&pie)?;

    let line_height = (options.legend_size * 2) as i32;
    let entry_style = ("sans-serif", options.legend_size)
        .into_font()
        .color(&DARK_FOREGROUND);
    let top = (area_height as i32 - line_height * chart.slices.len() as i32).max(0) / 2;

    for (i, slice) in chart.slices.iter().enumerate() {
        let y = top + i as i32 * line_height;
        if y + line_height > area_height as i32 {
            break;
        }
        let swatch = options.legend_size as i32;
        legend_area
            .draw(&Rectangle::new(
                [(0, y), (swatch, y + swatch)],
                slice_color(i).filled(),
            ))?;
        legend_area
            .draw_text(
                &format!("{} ({})", shorten(&slice.label), slice.count),
                &entry_style,
                (swatch + 8, y),
            )?;
    }

    Ok(())
}

fn slice_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

fn shorten(label: &str) -> String {
    if label.chars().count() <= LEGEND_LABEL_CHARS {
        return label.to_string();
    }
    let cut: String = label.chars().take(LEGEND_LABEL_CHARS - 1).collect();
    format!("{}…", cut)
}

/// Encodes an RGB pixel buffer as PNG
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(pixels, width, height, ColorType::Rgb8)?;
    Ok(png)
}

/// Inline `data:` URL for PNG bytes, usable as an `<img>` source
pub fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}
