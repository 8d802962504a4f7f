//! Chart-type classification from OCR text.
//!
//! A keyword heuristic, not a model: the raw OCR text is lower-cased and
//! searched for `pie`, then `bar`; the first hit wins and anything else is
//! treated as a line chart. The priority order is part of the contract:
//! text mentioning both pie and bar is a pie chart.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of chart types the pipeline distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartType {
    #[serde(rename = "Pie Chart")]
    Pie,
    #[serde(rename = "Bar Chart")]
    Bar,
    #[serde(rename = "Line Chart")]
    Line,
}

impl ChartType {
    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::Pie => "Pie Chart",
            ChartType::Bar => "Bar Chart",
            ChartType::Line => "Line Chart",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keywords checked in priority order.
const KEYWORDS: [(&str, ChartType); 2] = [("pie", ChartType::Pie), ("bar", ChartType::Bar)];

/// Classify a chart from its raw OCR text.
pub fn classify_chart_text(ocr_text: &str) -> ChartType {
    let lower = ocr_text.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(kw, _)| lower.contains(kw))
        .map(|(_, ty)| *ty)
        .unwrap_or(ChartType::Line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pie_wins_over_bar() {
        assert_eq!(classify_chart_text("BAR of sales, PIE of share"), ChartType::Pie);
    }

    #[test]
    fn bar_case_insensitive() {
        assert_eq!(
            classify_chart_text("Bar Chart: Q1 sales 100, Q2 sales 150"),
            ChartType::Bar
        );
        assert_eq!(classify_chart_text("SIDEBAR"), ChartType::Bar);
    }

    #[test]
    fn default_is_line() {
        assert_eq!(classify_chart_text("Revenue 2019 2020 2021"), ChartType::Line);
        assert_eq!(classify_chart_text(""), ChartType::Line);
    }

    #[test]
    fn substring_match_is_literal() {
        // "Spies" contains "pie"; substring matching is intentional
        assert_eq!(classify_chart_text("Spies per region"), ChartType::Pie);
    }

    #[test]
    fn display_and_serde_agree() {
        for ty in [ChartType::Pie, ChartType::Bar, ChartType::Line] {
            let json = serde_json::to_string(&ty).unwrap();
            assert_eq!(json, format!("\"{}\"", ty));
        }
    }
}
