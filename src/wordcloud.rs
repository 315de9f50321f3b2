use crate::graph::encode_png;
use crate::stopwords::is_stopword;
use crate::survey::SurveyTable;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use lazy_static::lazy_static;
use plotters::prelude::*;
use regex::Regex;
use std::collections::HashMap;
use std::error::Error;

/// The open question whose answers feed the word cloud
pub const TARGET_QUESTION: &str = "Escreva algumas linhas sobre sua história e seus sonhos de vida";

// Side of one occupancy cell in pixels
const CELL: u32 = 4;

lazy_static! {
    static ref WORD_REGEX: Regex = Regex::new(r"\w[\w']+").unwrap();
}

/// Anchor colours of matplotlib's `plasma` colour map
const PLASMA: [RGBColor; 9] = [
    RGBColor(13, 8, 135),
    RGBColor(75, 3, 161),
    RGBColor(125, 3, 168),
    RGBColor(168, 34, 150),
    RGBColor(203, 70, 121),
    RGBColor(229, 107, 93),
    RGBColor(248, 148, 65),
    RGBColor(253, 195, 40),
    RGBColor(240, 249, 33),
];

/// Rasterisation settings for the word cloud
#[derive(Clone, Debug)]
pub struct WordCloudOptions {
    /// Canvas width in pixels
    pub width: u32,

    /// Canvas height in pixels
    pub height: u32,

    /// Fill colour behind the words
    pub background: RGBColor,

    /// Most frequent words kept; the rest are dropped
    pub max_words: usize,

    /// Layout stops once a word would need a smaller font than this
    pub min_font_size: u32,

    /// Font size of the most frequent word; defaults to the canvas height
    pub max_font_size: Option<u32>,

    /// How strongly font size follows word frequency (0 = rank only, 1 = proportional)
    pub relative_scaling: f64,

    /// Free pixels kept around every word
    pub margin: u32,
}

impl Default for WordCloudOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            background: BLACK,
            max_words: 200,
            min_font_size: 4,
            max_font_size: None,
            relative_scaling: 0.5,
            margin: 2,
        }
    }
}

/// A word with its final position on the canvas
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    pub font_size: u32,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub color: RGBColor,
}

/// Text that feeds the rasteriser, or `None` when there is nothing to read.
///
/// Joins every non-missing answer to [`TARGET_QUESTION`] with single spaces,
/// splits on whitespace and drops tokens whose lowercase form is a stopword.
pub fn wordcloud_text(table: &SurveyTable) -> Option<String> {
    if table.is_empty() {
        return None;
    }
    let answers = table.non_missing(TARGET_QUESTION)?;
    let text = answers.join(" ");

    let kept: Vec<&str> = text
        .split_whitespace()
        .filter(|word| !is_stopword(word))
        .collect();

    Some(kept.join(" "))
}

/// Generates the word cloud for the target question
///
/// # Returns
/// * `Ok(Some(base64))` - PNG image encoded as standard base64
/// * `Ok(None)` - the table is empty, lacks the target column, or has no usable words
/// * `Err` - drawing or encoding failed
///
/// # Examples
/// ```no_run
/// use survey_dashboard::survey::SurveyTable;
/// use survey_dashboard::wordcloud::generate_wordcloud;
///
/// let table = SurveyTable::empty();
/// assert!(generate_wordcloud(&table).unwrap().is_none());
/// ```
pub fn generate_wordcloud(table: &SurveyTable) -> Result<Option<String>, Box<dyn Error>> {
    let text = match wordcloud_text(table) {
        Some(text) => text,
        None => return Ok(None),
    };

    let png = render_wordcloud(&text, &WordCloudOptions::default())?;
    Ok(png.map(|bytes| STANDARD.encode(bytes)))
}

/// Normalised word frequencies, most frequent first.
///
/// Words are matched case-insensitively and shown with their most common
/// spelling. Single characters, numbers and trailing `'s` are dropped, like the
/// word-cloud tokenizer does. The top word has frequency 1.0.
pub fn word_frequencies(text: &str, max_words: usize) -> Vec<(String, f64)> {
    // lowercase form -> (spelling -> count)
    let mut spellings: HashMap<String, HashMap<String, usize>> = HashMap::new();

    for m in WORD_REGEX.find_iter(text) {
        let mut word = m.as_str();
        if word.to_lowercase().ends_with("'s") {
            word = &word[..word.len() - 2];
        }
        if word.chars().count() < 2 || word.chars().all(|c| c.is_numeric()) {
            continue;
        }
        *spellings
            .entry(word.to_lowercase())
            .or_default()
            .entry(word.to_string())
            .or_insert(0) += 1;
    }

    let mut counts: Vec<(String, usize)> = spellings
        .into_values()
        .map(|forms| {
            let total = forms.values().sum();
            let shown = forms
                .into_iter()
                .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
                .map(|(form, _)| form)
                .unwrap_or_default();
            (shown, total)
        })
        .collect();

    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts.truncate(max_words);

    let max = match counts.first() {
        Some((_, count)) => *count as f64,
        None => return Vec::new(),
    };

    counts
        .into_iter()
        .map(|(word, count)| (word, count as f64 / max))
        .collect()
}

/// Renders the word cloud for `text` into PNG bytes.
///
/// Returns `Ok(None)` when no word survives tokenisation or none fits on the canvas.
pub fn render_wordcloud(
    text: &str,
    options: &WordCloudOptions,
) -> Result<Option<Vec<u8>>, Box<dyn Error>> {
    let frequencies = word_frequencies(text, options.max_words);
    if frequencies.is_empty() {
        return Ok(None);
    }

    let (width, height) = (options.width, options.height);
    let mut pixels = vec![0u8; (width * height * 3) as usize];

    let placed = {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        root.fill(&options.background)?;

        let placed = layout_words(
            &frequencies,
            options,
            |word: &str, size: u32| -> Result<(u32, u32), Box<dyn Error>> {
                Ok(root.estimate_text_size(word, &word_font(size))?)
            },
        )?;

        for word in &placed {
            let style = ("sans-serif", word.font_size).into_font().color(&word.color);
            root.draw_text(&word.text, &style, (word.x, word.y))?;
        }

        root.present()?;
        placed
    };

    if placed.is_empty() {
        return Ok(None);
    }
    log::debug!("Word cloud placed {} of {} words", placed.len(), frequencies.len());

    Ok(Some(encode_png(&pixels, width, height)?))
}

fn word_font(size: u32) -> TextStyle<'static> {
    ("sans-serif", size).into_font().into()
}

/// Places words greedily from the most frequent one.
///
/// Each word takes the free slot closest to the canvas centre. The font size
/// follows the frequency ratio to the previous word (weighted by
/// `relative_scaling`) and shrinks until the word fits; layout ends when a word
/// would need a font below `min_font_size`. `measure` returns the pixel size of
/// a word at a given font size.
pub fn layout_words<F>(
    frequencies: &[(String, f64)],
    options: &WordCloudOptions,
    mut measure: F,
) -> Result<Vec<PlacedWord>, Box<dyn Error>>
where
    F: FnMut(&str, u32) -> Result<(u32, u32), Box<dyn Error>>,
{
    let colormap = DerivedColorMap::new(&PLASMA);
    let mut grid = Occupancy::new(options.width, options.height);
    let mut placed = Vec::new();

    let rs = options.relative_scaling;
    let mut font_size = options.max_font_size.unwrap_or(options.height) as f64;
    let mut last_freq = 1.0;

    for (word, freq) in frequencies {
        if *freq <= 0.0 {
            continue;
        }
        if rs != 0.0 {
            font_size = ((rs * (freq / last_freq) + (1.0 - rs)) * font_size).round();
        }

        let mut size = font_size as u32;
        let slot = loop {
            if size == 0 || size < options.min_font_size {
                break None;
            }
            let (w, h) = measure(word, size)?;
            let cols = (w + 2 * options.margin).div_ceil(CELL) as usize;
            let rows = (h + 2 * options.margin).div_ceil(CELL) as usize;
            if let Some((gx, gy)) = grid.find_slot(cols, rows) {
                break Some((gx, gy, cols, rows, w, h));
            }
            size -= (size / 10).max(1);
        };

        let (gx, gy, cols, rows, w, h) = match slot {
            Some(slot) => slot,
            None => break,
        };
        grid.mark(gx, gy, cols, rows);

        // Golden-ratio steps spread neighbouring words across the colour map
        let shade = (placed.len() as f32 * 0.618_034).fract();
        placed.push(PlacedWord {
            text: word.clone(),
            font_size: size,
            x: (gx as u32 * CELL + options.margin) as i32,
            y: (gy as u32 * CELL + options.margin) as i32,
            width: w,
            height: h,
            color: colormap.get_color(shade),
        });

        font_size = size as f64;
        last_freq = *freq;
    }

    Ok(placed)
}

/// Coarse occupancy map of the canvas with a summed-area table for O(1) rectangle queries
struct Occupancy {
    cols: usize,
    rows: usize,
    cells: Vec<bool>,
    sums: Vec<u32>,
}

impl Occupancy {
    fn new(width: u32, height: u32) -> Self {
        let cols = (width / CELL) as usize;
        let rows = (height / CELL) as usize;
        Self {
            cols,
            rows,
            cells: vec![false; cols * rows],
            sums: vec![0; (cols + 1) * (rows + 1)],
        }
    }

    fn occupied(&self, gx: usize, gy: usize, w: usize, h: usize) -> u32 {
        let stride = self.cols + 1;
        let (x0, y0, x1, y1) = (gx, gy, gx + w, gy + h);
        self.sums[y1 * stride + x1] + self.sums[y0 * stride + x0]
            - self.sums[y0 * stride + x1]
            - self.sums[y1 * stride + x0]
    }

    /// Free top-left cell for a `w`×`h` block closest to the centre
    fn find_slot(&self, w: usize, h: usize) -> Option<(usize, usize)> {
        if w == 0 || h == 0 || w > self.cols || h > self.rows {
            return None;
        }

        let (cx, cy) = (self.cols as f64 / 2.0, self.rows as f64 / 2.0);
        let mut best: Option<(f64, usize, usize)> = None;

        for gy in 0..=self.rows - h {
            for gx in 0..=self.cols - w {
                if self.occupied(gx, gy, w, h) != 0 {
                    continue;
                }
                let dx = (gx as f64 + w as f64 / 2.0 - cx) / self.cols as f64;
                let dy = (gy as f64 + h as f64 / 2.0 - cy) / self.rows as f64;
                let distance = dx * dx + dy * dy;
                if best.is_none_or(|(d, _, _)| distance < d) {
                    best = Some((distance, gx, gy));
                }
            }
        }

        best.map(|(_, gx, gy)| (gx, gy))
    }

    fn mark(&mut self, gx: usize, gy: usize, w: usize, h: usize) {
        for y in gy..gy + h {
            for x in gx..gx + w {
                self.cells[y * self.cols + x] = true;
            }
        }

        let stride = self.cols + 1;
        for y in 0..self.rows {
            for x in 0..self.cols {
                self.sums[(y + 1) * stride + x + 1] = self.cells[y * self.cols + x] as u32
                    + self.sums[y * stride + x + 1]
                    + self.sums[(y + 1) * stride + x]
                    - self.sums[y * stride + x];
            }
        }
    }
}
