//! Rendering ports: barcode labels and the category chart.

use std::sync::{Arc, Mutex};

use stockscan_core::Barcode;
use stockscan_inventory::CategoryTotals;

/// Turns a barcode value into something displayable. Stateless.
pub trait BarcodeRenderer {
    fn render(&self, barcode: &Barcode) -> String;
}

/// Draws the per-category chart, replacing any previous drawing.
pub trait ChartRenderer {
    fn render(&mut self, totals: &CategoryTotals);
}

/// Plain-text label: one bar pattern line (8 modules per byte) above the value.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLabelRenderer;

impl BarcodeRenderer for TextLabelRenderer {
    fn render(&self, barcode: &Barcode) -> String {
        let bars: String = barcode
            .as_str()
            .bytes()
            .flat_map(|byte| (0..8).rev().map(move |bit| (byte >> bit) & 1 == 1))
            .map(|dark| if dark { '█' } else { ' ' })
            .collect();
        format!("{bars}\n{barcode}")
    }
}

/// Discards every render. For headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullChart;

impl ChartRenderer for NullChart {
    fn render(&mut self, _totals: &CategoryTotals) {}
}

/// Horizontal text bar chart. The latest drawing is readable from any clone.
#[derive(Debug, Clone)]
pub struct TextChart {
    output: Arc<Mutex<String>>,
    width: usize,
}

impl TextChart {
    pub fn new(width: usize) -> Self {
        Self {
            output: Arc::default(),
            width: width.max(1),
        }
    }

    /// The most recent drawing.
    pub fn output(&self) -> String {
        self.output.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn draw(&self, totals: &CategoryTotals) -> String {
        let max = totals.values().into_iter().max().unwrap_or(0);
        let label_width = totals.labels().iter().map(|l| l.chars().count()).max().unwrap_or(0);

        let mut out = String::new();
        for (label, total) in totals.iter() {
            let bar = if max == 0 {
                0
            } else {
                (total as f64 / max as f64 * self.width as f64).round() as usize
            };
            let label = if label.is_empty() { "(none)" } else { label };
            out.push_str(&format!(
                "{label:<label_width$} | {} {total}\n",
                "#".repeat(bar),
                label_width = label_width.max(6)
            ));
        }
        out
    }
}

impl ChartRenderer for TextChart {
    fn render(&mut self, totals: &CategoryTotals) {
        let drawing = self.draw(totals);
        if let Ok(mut output) = self.output.lock() {
            *output = drawing;
        }
    }
}
