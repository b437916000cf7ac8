//! Plotly figure JSON to a plottable chart model.
//!
//! The model is front-end agnostic: axes are plain `f64`, categorical axes are
//! mapped to positions `0, 1, 2, ...` in order of first appearance and carry
//! their labels alongside.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Map, Value};
use shared::protocol::PlotlyFigure;

pub const DEFAULT_HISTOGRAM_BINS: usize = 10;
/// Upper bound on histogram bins whatever `nbinsx` asks for.
pub const MAX_HISTOGRAM_BINS: usize = 1000;
const BAR_GROUP_WIDTH: f64 = 0.8;

/// Plotly's default colorway.
pub const PALETTE: [[u8; 3]; 10] = [
    [0x63, 0x6e, 0xfa],
    [0xef, 0x55, 0x3b],
    [0x00, 0xcc, 0x96],
    [0xab, 0x63, 0xfa],
    [0xff, 0xa1, 0x5a],
    [0x19, 0xd3, 0xf3],
    [0xff, 0x66, 0x92],
    [0xb6, 0xe8, 0x80],
    [0xff, 0x97, 0xff],
    [0xfe, 0xcb, 0x52],
];

pub fn palette_color(index: usize) -> [u8; 3] {
    PALETTE[index % PALETTE.len()]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub l: f64,
    pub r: f64,
    pub t: f64,
    pub b: f64,
}

pub const DEFAULT_MARGIN: Margin = Margin {
    l: 60.0,
    r: 30.0,
    t: 60.0,
    b: 60.0,
};

impl Margin {
    fn to_json(self) -> Value {
        json!({"l": self.l, "r": self.r, "t": self.t, "b": self.b})
    }

    fn from_json(value: &Value) -> Self {
        let side = |key: &str, fallback: f64| {
            value.get(key).and_then(Value::as_f64).unwrap_or(fallback)
        };
        Self {
            l: side("l", DEFAULT_MARGIN.l),
            r: side("r", DEFAULT_MARGIN.r),
            t: side("t", DEFAULT_MARGIN.t),
            b: side("b", DEFAULT_MARGIN.b),
        }
    }
}

/// The server layout with `autosize` forced on and the default margin filled
/// in only when the server did not provide one.
pub fn merged_layout(figure: &PlotlyFigure) -> Map<String, Value> {
    let mut layout = figure.layout_object().cloned().unwrap_or_default();
    layout.insert("autosize".to_string(), Value::Bool(true));
    let has_margin = layout.get("margin").is_some_and(|margin| !margin.is_null());
    if !has_margin {
        layout.insert("margin".to_string(), DEFAULT_MARGIN.to_json());
    }
    layout
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XyStyle {
    Lines,
    Markers,
    LinesAndMarkers,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiveNumber {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl FiveNumber {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);
        Some(Self {
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    let rank = q * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub position: f64,
    pub value: f64,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeriesData {
    Xy {
        style: XyStyle,
        points: Vec<[f64; 2]>,
    },
    Bars {
        horizontal: bool,
        bars: Vec<Bar>,
    },
    Box {
        position: f64,
        summary: FiveNumber,
    },
    Pie {
        slices: Vec<PieSlice>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub color: [u8; 3],
    pub data: SeriesData,
}

/// Labels of a categorical axis, indexed by plot position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryAxis {
    labels: Vec<String>,
}

impl CategoryAxis {
    pub fn position(&mut self, label: &str) -> f64 {
        let index = match self.labels.iter().position(|known| known == label) {
            Some(index) => index,
            None => {
                self.labels.push(label.to_string());
                self.labels.len() - 1
            }
        };
        index as f64
    }

    /// Label for a plot coordinate, when it lands on a category.
    pub fn label_at(&self, value: f64) -> Option<&str> {
        if (value - value.round()).abs() > 1e-6 || value < 0.0 {
            return None;
        }
        self.labels.get(value.round() as usize).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartModel {
    pub title: Option<String>,
    pub x_title: Option<String>,
    pub y_title: Option<String>,
    pub margin: Margin,
    pub x_categories: CategoryAxis,
    pub y_categories: CategoryAxis,
    pub series: Vec<ChartSeries>,
    /// Trace types present in the figure that cannot be drawn.
    pub unsupported: Vec<String>,
}

impl ChartModel {
    pub fn from_figure(figure: &PlotlyFigure) -> Self {
        let layout = merged_layout(figure);
        let mut model = Self {
            title: layout.get("title").and_then(title_text),
            x_title: axis_title(&layout, "xaxis"),
            y_title: axis_title(&layout, "yaxis"),
            margin: layout
                .get("margin")
                .map(Margin::from_json)
                .unwrap_or(DEFAULT_MARGIN),
            x_categories: CategoryAxis::default(),
            y_categories: CategoryAxis::default(),
            series: Vec::new(),
            unsupported: Vec::new(),
        };

        let traces = figure.traces();
        let bar_traces = traces
            .iter()
            .filter(|trace| trace_type(trace) == "bar")
            .count();
        let mut bar_slot = 0;
        let mut box_slot = 0;

        for (index, trace) in traces.iter().enumerate() {
            let kind = trace_type(trace);
            let name = trace
                .get("name")
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("trace {index}"));
            let color = palette_color(index);

            let data = match kind.as_str() {
                "scatter" | "scattergl" => model.scatter(trace),
                "bar" => {
                    let data = model.bars(trace, bar_slot, bar_traces);
                    bar_slot += 1;
                    data
                }
                "histogram" => model.histogram(trace),
                "box" => {
                    let data = model.box_summary(trace, box_slot);
                    box_slot += 1;
                    data
                }
                "pie" => pie(trace),
                _ => {
                    if !model.unsupported.contains(&kind) {
                        model.unsupported.push(kind.clone());
                    }
                    None
                }
            };

            if let Some(data) = data {
                model.series.push(ChartSeries { name, color, data });
            }
        }

        // A pie has no cartesian axes, so it cannot share a plot with other traces.
        let pies = model
            .series
            .iter()
            .filter(|series| matches!(series.data, SeriesData::Pie { .. }))
            .count();
        if pies > 0 && pies < model.series.len() {
            model
                .series
                .retain(|series| !matches!(series.data, SeriesData::Pie { .. }));
            if !model.unsupported.iter().any(|kind| kind == "pie") {
                model.unsupported.push("pie".to_string());
            }
        }

        model
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn is_pie(&self) -> bool {
        !self.series.is_empty()
            && self
                .series
                .iter()
                .all(|series| matches!(series.data, SeriesData::Pie { .. }))
    }

    fn scatter(&mut self, trace: &Value) -> Option<SeriesData> {
        let y = axis_values(trace.get("y")?)?;
        let x = trace.get("x").and_then(axis_values);
        let points: Vec<[f64; 2]> = y
            .iter()
            .enumerate()
            .filter_map(|(i, y)| {
                let x = match &x {
                    Some(xs) => self.x_position(xs.get(i)?)?,
                    None => i as f64,
                };
                Some([x, self.y_position(y)?])
            })
            .collect();

        let style = match trace.get("mode").and_then(Value::as_str) {
            Some(mode) if mode.contains("lines") && mode.contains("markers") => {
                XyStyle::LinesAndMarkers
            }
            Some(mode) if mode.contains("lines") => XyStyle::Lines,
            Some(mode) if mode.contains("markers") => XyStyle::Markers,
            _ if points.len() < 20 => XyStyle::LinesAndMarkers,
            _ => XyStyle::Lines,
        };
        Some(SeriesData::Xy { style, points })
    }

    fn bars(&mut self, trace: &Value, slot: usize, slots: usize) -> Option<SeriesData> {
        let horizontal = trace.get("orientation").and_then(Value::as_str) == Some("h");
        let (category_key, value_key) = if horizontal { ("y", "x") } else { ("x", "y") };
        let values = axis_values(trace.get(value_key)?)?;
        let categories = trace.get(category_key).and_then(axis_values);

        let width = BAR_GROUP_WIDTH / slots.max(1) as f64;
        let offset = -BAR_GROUP_WIDTH / 2.0 + width * (slot as f64 + 0.5);

        let mut bars = Vec::with_capacity(values.len());
        for (i, value) in values.iter().enumerate() {
            let Some(value) = value.as_number() else {
                continue;
            };
            let position = match categories.as_ref().and_then(|c| c.get(i)) {
                Some(category) if horizontal => self.y_position(category),
                Some(category) => self.x_position(category),
                None => Some(i as f64),
            };
            if let Some(position) = position {
                bars.push(Bar {
                    position: position + offset,
                    value,
                    width,
                });
            }
        }
        Some(SeriesData::Bars { horizontal, bars })
    }

    fn histogram(&mut self, trace: &Value) -> Option<SeriesData> {
        let samples = trace
            .get("x")
            .and_then(axis_values)
            .or_else(|| trace.get("y").and_then(axis_values))?;

        if samples.iter().all(|v| v.as_number().is_none()) {
            let mut counts: Vec<(f64, f64)> = Vec::new();
            for sample in &samples {
                let AxisValue::Label(label) = sample else {
                    continue;
                };
                let position = self.x_categories.position(label);
                match counts.iter_mut().find(|(p, _)| *p == position) {
                    Some((_, count)) => *count += 1.0,
                    None => counts.push((position, 1.0)),
                }
            }
            let bars = counts
                .into_iter()
                .map(|(position, value)| Bar {
                    position,
                    value,
                    width: BAR_GROUP_WIDTH,
                })
                .collect();
            return Some(SeriesData::Bars {
                horizontal: false,
                bars,
            });
        }

        let numbers: Vec<f64> = samples.iter().filter_map(AxisValue::as_number).collect();
        let requested = trace
            .get("nbinsx")
            .and_then(requested_bins)
            .unwrap_or(DEFAULT_HISTOGRAM_BINS);
        Some(SeriesData::Bars {
            horizontal: false,
            bars: histogram_bins(&numbers, requested),
        })
    }

    fn box_summary(&mut self, trace: &Value, slot: usize) -> Option<SeriesData> {
        let values = trace
            .get("y")
            .and_then(axis_values)
            .or_else(|| trace.get("x").and_then(axis_values))?;
        let numbers: Vec<f64> = values.iter().filter_map(AxisValue::as_number).collect();
        let summary = FiveNumber::from_values(&numbers)?;
        let position = match trace.get("name").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => self.x_categories.position(name),
            _ => slot as f64,
        };
        Some(SeriesData::Box { position, summary })
    }

    fn x_position(&mut self, value: &AxisValue) -> Option<f64> {
        match value {
            AxisValue::Number(n) => Some(*n),
            AxisValue::Label(label) => Some(self.x_categories.position(label)),
            AxisValue::Missing => None,
        }
    }

    fn y_position(&mut self, value: &AxisValue) -> Option<f64> {
        match value {
            AxisValue::Number(n) => Some(*n),
            AxisValue::Label(label) => Some(self.y_categories.position(label)),
            AxisValue::Missing => None,
        }
    }
}

fn pie(trace: &Value) -> Option<SeriesData> {
    let labels = trace.get("labels").and_then(axis_values)?;
    let values = trace.get("values").and_then(axis_values);

    let mut slices: Vec<PieSlice> = Vec::new();
    for (i, label) in labels.iter().enumerate() {
        let label = match label {
            AxisValue::Label(text) => text.clone(),
            AxisValue::Number(n) => format_number(*n),
            AxisValue::Missing => continue,
        };
        let value = match &values {
            Some(values) => match values.get(i).and_then(AxisValue::as_number) {
                Some(value) => value,
                None => continue,
            },
            None => 1.0,
        };
        match slices.iter_mut().find(|slice| slice.label == label) {
            Some(slice) => slice.value += value,
            None => slices.push(PieSlice { label, value }),
        }
    }
    slices.retain(|slice| slice.value > 0.0);
    Some(SeriesData::Pie { slices })
}

/// Positive bin count from `nbinsx`, capped at [`MAX_HISTOGRAM_BINS`].
fn requested_bins(value: &Value) -> Option<usize> {
    let bins = value.as_f64().filter(|bins| bins.is_finite() && *bins >= 1.0)?;
    Some(bins.min(MAX_HISTOGRAM_BINS as f64) as usize)
}

/// Equal-width bins over `[min, max]`; the last bin is closed on the right.
pub fn histogram_bins(values: &[f64], bins: usize) -> Vec<Bar> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let Some(min) = finite.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let max = finite.iter().copied().fold(min, f64::max);

    if max == min {
        return vec![Bar {
            position: min,
            value: finite.len() as f64,
            width: 1.0,
        }];
    }

    let bins = bins.clamp(1, MAX_HISTOGRAM_BINS);
    let width = (max - min) / bins as f64;
    let mut counts = vec![0.0; bins];
    for value in finite {
        let index = (((value - min) / width) as usize).min(bins - 1);
        counts[index] += 1.0;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bar {
            position: min + width * (i as f64 + 0.5),
            value: count,
            width,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum AxisValue {
    Number(f64),
    Label(String),
    Missing,
}

impl AxisValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Reads a Plotly data array: a plain JSON array or a typed array
/// `{"dtype": "f8", "bdata": "<base64>"}`.
pub fn axis_values(value: &Value) -> Option<Vec<AxisValue>> {
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::Number(n) => n.as_f64().map_or(AxisValue::Missing, AxisValue::Number),
                    Value::String(text) => AxisValue::Label(text.clone()),
                    Value::Bool(flag) => AxisValue::Label(flag.to_string()),
                    _ => AxisValue::Missing,
                })
                .collect(),
        ),
        Value::Object(object) => decode_typed_array(object)
            .map(|numbers| numbers.into_iter().map(AxisValue::Number).collect()),
        _ => None,
    }
}

pub fn decode_typed_array(object: &Map<String, Value>) -> Option<Vec<f64>> {
    let dtype = object.get("dtype")?.as_str()?;
    let bytes = STANDARD.decode(object.get("bdata")?.as_str()?).ok()?;

    macro_rules! decode {
        ($ty:ty) => {{
            const WIDTH: usize = std::mem::size_of::<$ty>();
            bytes
                .chunks_exact(WIDTH)
                .map(|chunk| {
                    let mut raw = [0u8; WIDTH];
                    raw.copy_from_slice(chunk);
                    <$ty>::from_le_bytes(raw) as f64
                })
                .collect()
        }};
    }

    let numbers: Vec<f64> = match dtype {
        "f8" => decode!(f64),
        "f4" => decode!(f32),
        "i1" => decode!(i8),
        "u1" | "u1c" => decode!(u8),
        "i2" => decode!(i16),
        "u2" => decode!(u16),
        "i4" => decode!(i32),
        "u4" => decode!(u32),
        _ => return None,
    };
    Some(numbers)
}

fn trace_type(trace: &Value) -> String {
    trace
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("scatter")
        .to_ascii_lowercase()
}

/// Plotly titles are either a string or `{"text": ...}`.
fn title_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.as_str(),
        Value::Object(object) => object.get("text")?.as_str()?,
        _ => return None,
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn axis_title(layout: &Map<String, Value>, axis: &str) -> Option<String> {
    layout.get(axis)?.get("title").and_then(title_text)
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value:.3}")
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

#[cfg(test)]
#[path = "tests/chart_tests.rs"]
mod tests;
