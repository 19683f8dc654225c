// src/chart/gradient.rs
//! Bar color lookup along the value axis.

use crate::config::{ColorStop, Rgb};

/// Used only when no stops are configured.
const FALLBACK: Rgb = Rgb::new(0xff, 0xff, 0xff);

/// Color of a bar whose magnitude is `value`.
///
/// Values between two stops blend linearly. Values below the first stop take
/// the first color and values at or past the last threshold take the last.
/// `stops` must be ordered by threshold.
pub fn color_at(stops: &[ColorStop], value: f32) -> Rgb {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return FALLBACK;
    };
    if value <= first.threshold as f32 {
        return first.color;
    }
    if value >= last.threshold as f32 {
        return last.color;
    }

    stops
        .windows(2)
        .find(|pair| value < pair[1].threshold as f32)
        .map(|pair| {
            let (lo, hi) = (pair[0], pair[1]);
            let span = (hi.threshold - lo.threshold) as f32;
            lo.color.lerp(hi.color, (value - lo.threshold as f32) / span)
        })
        .unwrap_or(last.color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn ramp() -> Vec<ColorStop> {
        vec![
            ColorStop::new(0, Rgb::new(0, 0, 0)),
            ColorStop::new(100, Rgb::new(200, 100, 0)),
            ColorStop::new(250, Rgb::new(200, 100, 150)),
        ]
    }

    #[test]
    fn exact_thresholds_hit_their_stop() {
        let stops = ramp();
        assert_eq!(color_at(&stops, 0.0), Rgb::new(0, 0, 0));
        assert_eq!(color_at(&stops, 100.0), Rgb::new(200, 100, 0));
        assert_eq!(color_at(&stops, 250.0), Rgb::new(200, 100, 150));
    }

    #[test]
    fn between_stops_interpolates() {
        let stops = ramp();
        assert_eq!(color_at(&stops, 50.0), Rgb::new(100, 50, 0));
        assert_eq!(color_at(&stops, 175.0), Rgb::new(200, 100, 75));
    }

    #[test]
    fn past_last_stop_uses_last_color() {
        let stops = ramp();
        assert_eq!(color_at(&stops, 255.0), Rgb::new(200, 100, 150));
        assert_eq!(color_at(&stops, -3.0), Rgb::new(0, 0, 0));
    }

    #[test]
    fn default_stops_split_at_150() {
        let stops = Settings::default().color_stops;
        assert_eq!(color_at(&stops, 30.0), Rgb::new(0x88, 0x0a, 0xfc));
        assert_eq!(color_at(&stops, 220.0), Rgb::new(0xb9, 0x75, 0xff));
    }

    #[test]
    fn no_stops_falls_back() {
        assert_eq!(color_at(&[], 10.0), FALLBACK);
    }
}
