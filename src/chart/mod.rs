// src/chart/mod.rs
//! Chart-ready projection of a spectrum frame.
//!
//! [`transform`] is pure: identical spectrum and settings always produce an
//! identical [`ChartSeries`]. Renderers read everything they need from the
//! series, including axis bounds and bar shape.

pub mod gradient;

use std::time::Duration;

use crate::audio::analysis::MagnitudeSpectrum;
use crate::config::{ColorStop, Rgb, Settings};

pub use gradient::color_at;

/// Bar animation length handed to renderers.
pub const ANIMATION: Duration = Duration::from_millis(100);

/// Value axis for one-sided bars.
pub const ONE_SIDED_AXIS: AxisBounds = AxisBounds { min: 0.0, max: 300.0 };

/// Value axis for floating bars, centered on zero.
pub const FLOATING_AXIS: AxisBounds = AxisBounds { min: -150.0, max: 150.0 };

/// Scale applied to each half of a floating bar.
const FLOATING_SCALE: f32 = 0.5;

/// Extent of one bar along the value axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BarValue {
    /// Rises from zero to the value.
    Column(f32),
    /// Spans `low..=high` around the center axis.
    Range { low: f32, high: f32 },
}

impl BarValue {
    pub fn low(&self) -> f32 {
        match *self {
            BarValue::Column(_) => 0.0,
            BarValue::Range { low, .. } => low,
        }
    }

    pub fn high(&self) -> f32 {
        match *self {
            BarValue::Column(v) => v,
            BarValue::Range { high, .. } => high,
        }
    }

    /// Full length of the bar.
    pub fn extent(&self) -> f32 {
        self.high() - self.low()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub min: f32,
    pub max: f32,
}

impl AxisBounds {
    pub fn span(&self) -> f32 {
        self.max - self.min
    }
}

/// Bar outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarShape {
    Square,
    /// Maximal corner radius.
    Pill,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// Frequency band, low first.
    pub band: usize,
    pub label: String,
    pub value: BarValue,
    pub color: Rgb,
}

/// One repaint's worth of chart data plus its configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub bars: Vec<Bar>,
    pub axis: AxisBounds,
    pub shape: BarShape,
    pub animation: Duration,
    /// Stops for renderers that paint a gradient along the value axis.
    pub gradient: Vec<ColorStop>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.bars.iter().map(|b| b.label.as_str())
    }
}

/// Project `spectrum` into bars under the display mode in `settings`.
pub fn transform(spectrum: &MagnitudeSpectrum, settings: &Settings) -> ChartSeries {
    let stops = &settings.color_stops;
    let bars = spectrum
        .bins()
        .iter()
        .enumerate()
        .map(|(band, &magnitude)| {
            let v = magnitude as f32;
            let value = if settings.floating {
                BarValue::Range {
                    low: -v * FLOATING_SCALE,
                    high: v * FLOATING_SCALE,
                }
            } else {
                BarValue::Column(v)
            };
            Bar {
                band,
                label: band.to_string(),
                value,
                color: color_at(stops, v),
            }
        })
        .collect();

    let (axis, shape) = if settings.floating {
        (FLOATING_AXIS, BarShape::Pill)
    } else {
        (ONE_SIDED_AXIS, BarShape::Square)
    };

    ChartSeries {
        bars,
        axis,
        shape,
        animation: ANIMATION,
        gradient: stops.clone(),
    }
}
