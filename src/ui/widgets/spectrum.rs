// src/ui/widgets/spectrum.rs
//! Spectrum bar chart: paints a [`ChartSeries`] into terminal cells.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Block, Borders},
    Frame,
};

use super::settings_panel::to_color;
use crate::chart::{AxisBounds, Bar, BarShape, BarValue, ChartSeries};

/// Renderer for spectrum bars.
pub struct SpectrumRenderer {
    /// Bar width in characters
    bar_width: u16,
    /// Gap between bars
    bar_gap: u16,
    /// Block characters for the partial top cell, one to eight eighths
    chars: [char; 8],
}

impl SpectrumRenderer {
    pub fn new() -> Self {
        Self {
            bar_width: 1,
            bar_gap: 1,
            chars: ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'],
        }
    }

    /// Render the series inside a titled border.
    pub fn render(&self, f: &mut Frame<'_>, area: Rect, series: &ChartSeries) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("4: Spectrum ({} bands)", series.len()));
        let inner = block.inner(area);
        f.render_widget(block, area);
        self.draw(f.buffer_mut(), inner, series);
    }

    /// Paint bars into `area`. When there are more bands than slots, each slot
    /// shows the tallest band of its bucket.
    pub fn draw(&self, buf: &mut Buffer, area: Rect, series: &ChartSeries) {
        if area.width == 0 || area.height == 0 || series.is_empty() {
            return;
        }
        let pitch = self.bar_width + self.bar_gap;
        let slots = ((area.width + self.bar_gap) / pitch).max(1) as usize;
        let shown = slots.min(series.len());

        for slot in 0..shown {
            let Some(bar) = bucket_peak(&series.bars, slot, shown) else {
                continue;
            };
            let color = to_color(bar.color);
            let x0 = area.x + slot as u16 * pitch;
            for row in 0..area.height {
                let Some(glyph) = self.glyph(bar.value, series.axis, series.shape, row, area.height)
                else {
                    continue;
                };
                for dx in 0..self.bar_width {
                    let x = x0 + dx;
                    if x >= area.right() {
                        break;
                    }
                    if let Some(cell) = buf.cell_mut((x, area.y + row)) {
                        cell.set_char(glyph).set_fg(color);
                    }
                }
            }
        }
    }

    /// Character for `row` (0 = top) of a bar, or `None` for an empty cell.
    fn glyph(
        &self,
        value: BarValue,
        axis: AxisBounds,
        shape: BarShape,
        row: u16,
        height: u16,
    ) -> Option<char> {
        let step = axis.span() / height as f32;
        let top = axis.max - row as f32 * step;
        let bottom = top - step;
        let (low, high) = (value.low().max(axis.min), value.high().min(axis.max));

        // Baseline for silent one-sided bars
        if matches!(value, BarValue::Column(v) if v <= 0.0) && row + 1 == height {
            return Some(self.chars[0]);
        }

        let covered = (high.min(top) - low.max(bottom)) / step;
        if covered <= 0.0 {
            return None;
        }
        if covered >= 1.0 - f32::EPSILON {
            return Some('█');
        }

        let top_open = high < top;
        let bottom_open = low > bottom;
        match (top_open, bottom_open, shape) {
            (true, true, _) => Some('━'),
            (true, false, BarShape::Square) => {
                let eighths = (covered * 8.0).round() as usize;
                eighths.checked_sub(1).map(|i| self.chars[i.min(7)])
            }
            (true, false, BarShape::Pill) => (covered >= 0.5).then_some('▄'),
            (false, true, _) => (covered >= 0.5).then_some('▀'),
            (false, false, _) => Some('█'),
        }
    }
}

impl Default for SpectrumRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Tallest bar among those mapped to `slot`.
fn bucket_peak(bars: &[Bar], slot: usize, slots: usize) -> Option<&Bar> {
    let start = slot * bars.len() / slots;
    let end = ((slot + 1) * bars.len() / slots).max(start + 1);
    bars.get(start..end.min(bars.len()))?
        .iter()
        .max_by(|a, b| a.value.extent().total_cmp(&b.value.extent()))
}

/// Render the spectrum panel.
pub fn render_spectrum(f: &mut Frame<'_>, area: Rect, series: &ChartSeries) {
    SpectrumRenderer::new().render(f, area, series);
}
