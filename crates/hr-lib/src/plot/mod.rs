use crate::signal::{Events, Recording};
use serde::{Deserialize, Serialize};

pub const ECG_COLOR: Color = Color(0x1F77B4);
pub const PEAK_COLOR: Color = Color(0xFF0000);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Axis {
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    pub width: f32,
    pub color: Color,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub fn rgb(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub style: Style,
}

/// Unconnected markers, e.g. detected R-peaks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub radius: f32,
    pub color: Color,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Series {
    Line(LineSeries),
    Points(PointSeries),
}

impl Series {
    pub fn points(&self) -> &[[f64; 2]] {
        match self {
            Series::Line(line) => &line.points,
            Series::Points(points) => &points.points,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Figure {
    pub title: Option<String>,
    pub x: Axis,
    pub y: Axis,
    pub series: Vec<Series>,
}

impl Figure {
    pub fn new(title: impl Into<Option<String>>) -> Self {
        Self {
            title: title.into(),
            x: Axis { label: None },
            y: Axis { label: None },
            series: Vec::new(),
        }
    }

    pub fn add_series(&mut self, series: Series) {
        self.series.push(series);
    }

    /// `(x_min, x_max, y_min, y_max)` over every series, or `None` for an empty figure.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut points = self.series.iter().flat_map(|s| s.points().iter());
        let first = points.next()?;
        let init = (first[0], first[0], first[1], first[1]);
        Some(points.fold(init, |(x0, x1, y0, y1), p| {
            (x0.min(p[0]), x1.max(p[0]), y0.min(p[1]), y1.max(p[1]))
        }))
    }
}

pub trait PlotBackend {
    fn draw(&mut self, fig: &Figure) -> anyhow::Result<()>;
}

pub fn decimate_points(points: &[[f64; 2]], max_points: usize) -> Vec<[f64; 2]> {
    if points.len() <= max_points {
        return points.to_vec();
    }
    let bucket_size = points.len() as f64 / max_points as f64;
    let mut result = Vec::with_capacity(max_points);
    for i in 0..max_points {
        let start = (i as f64 * bucket_size).floor() as usize;
        if start >= points.len() {
            break;
        }
        result.push(points[start]);
    }
    result
}

/// Waveform against its timebase with a marker at every detected R-peak.
///
/// The waveform line is decimated to `max_points`; peak markers are never dropped.
pub fn figure_from_analysis(recording: &Recording, events: &Events, max_points: usize) -> Figure {
    let points: Vec<[f64; 2]> = recording
        .time
        .iter()
        .zip(&recording.ecg)
        .map(|(&t, &v)| [t, v])
        .collect();
    let peaks: Vec<[f64; 2]> = events
        .indices
        .iter()
        .filter_map(|&i| Some([*recording.time.get(i)?, *recording.ecg.get(i)?]))
        .collect();

    let mut fig = Figure::new(Some("ECG Signal".into()));
    fig.x.label = Some("Time (s)".into());
    fig.y.label = Some("Amplitude".into());
    fig.add_series(Series::Line(LineSeries {
        name: "ECG".into(),
        points: decimate_points(&points, max_points),
        style: Style {
            width: 1.4,
            color: ECG_COLOR,
        },
    }));
    if !peaks.is_empty() {
        fig.add_series(Series::Points(PointSeries {
            name: "R-peaks".into(),
            points: peaks,
            radius: 4.0,
            color: PEAK_COLOR,
        }));
    }
    fig
}
