//! Plain-text chart rendering for terminals.

use calc_core::{ChartError, ChartKind, ChartRenderer, ChartSpec};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

const BAR_WIDTH: usize = 40;

/// Draws every chart kind as horizontal bars. Pie charts show each slice's
/// share of the total; bar and line charts scale to the largest magnitude.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextChartRenderer;

impl ChartRenderer for TextChartRenderer {
    fn render(
        &self,
        spec: &ChartSpec,
    ) -> Result<String, ChartError> {
        if spec.points.is_empty() {
            return Err(ChartError::Empty(spec.title.clone()));
        }

        let label_width = spec
            .points
            .iter()
            .map(|p| p.label.chars().count())
            .max()
            .unwrap_or(0);
        let scale = match spec.kind {
            ChartKind::Pie => spec.points.iter().map(|p| p.value.abs()).sum::<Decimal>(),
            ChartKind::Bar | ChartKind::Line => spec
                .points
                .iter()
                .map(|p| p.value.abs())
                .max()
                .unwrap_or(Decimal::ZERO),
        };

        let mut out = format!("{}\n", spec.title);
        for point in &spec.points {
            let fraction = if scale.is_zero() {
                0.0
            } else {
                (point.value.abs() / scale).to_f64().unwrap_or(0.0)
            };
            let length = (fraction * BAR_WIDTH as f64).round() as usize;
            let glyph = if point.value.is_sign_negative() { '-' } else { '#' };
            let bar: String = std::iter::repeat_n(glyph, length).collect();

            let annotation = match spec.kind {
                ChartKind::Pie => format!("{:.1}%", fraction * 100.0),
                ChartKind::Bar | ChartKind::Line => point.value.round_dp(2).to_string(),
            };
            out.push_str(&format!(
                "{:<label_width$} | {:<BAR_WIDTH$} {}\n",
                point.label, bar, annotation
            ));
        }
        Ok(out)
    }
}
