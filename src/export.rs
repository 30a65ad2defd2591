//! CSV, chart series, and report exports for finished analyses.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use crate::analyzer::{Analysis, AnalysisSummary, SeriesPoint};
use crate::constants::export::{CSV_HEADER, REPORT_TITLE};
use crate::data::{Category, Record};
use crate::errors::SimError;

/// Write `records` as CSV, ordered by timestamp then id. Returns the row count.
pub fn write_records_csv<W: Write>(writer: W, records: &[Record]) -> Result<usize, SimError> {
    let mut ordered: Vec<&Record> = records.iter().collect();
    ordered.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));

    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(CSV_HEADER)?;
    for record in &ordered {
        writer.write_record([
            record.id.to_string(),
            record.source.label().to_string(),
            record.region.label().to_string(),
            record.sentiment.label().to_string(),
            format!("{:.4}", record.sentiment_score),
            record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            record.text_snippet.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(ordered.len())
}

/// Write `records` as CSV to a new file at `path`.
pub fn write_records_csv_path(path: impl AsRef<Path>, records: &[Record]) -> Result<usize, SimError> {
    let file = File::create(path)?;
    write_records_csv(BufWriter::new(file), records)
}

/// Charts a finished analysis can be rendered as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Sentiment,
    Sources,
    Regions,
    Timeline,
}

impl ChartKind {
    /// Every chart, in report order.
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Sentiment,
        ChartKind::Sources,
        ChartKind::Regions,
        ChartKind::Timeline,
    ];

    /// Name used to request the chart.
    pub fn name(self) -> &'static str {
        match self {
            ChartKind::Sentiment => "sentiment",
            ChartKind::Sources => "sources",
            ChartKind::Regions => "regions",
            ChartKind::Timeline => "timeline",
        }
    }

    /// Display title.
    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Sentiment => "Sentiment Mix",
            ChartKind::Sources => "Source Breakdown",
            ChartKind::Regions => "Top Regions",
            ChartKind::Timeline => "Mentions Over Time",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChartKind {
    type Err = SimError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let wanted = name.trim().to_ascii_lowercase();
        ChartKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| SimError::UnknownChart(name.to_string()))
    }
}

/// Data behind one chart, ready for a renderer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSeries {
    pub kind: ChartKind,
    pub title: &'static str,
    pub points: Vec<SeriesPoint>,
}

/// Series for one chart of `analysis`.
pub fn chart_series(analysis: &Analysis, kind: ChartKind) -> ChartSeries {
    let points = match kind {
        ChartKind::Sentiment => analysis.sentiment.count_series(),
        ChartKind::Sources => analysis.sources.count_series(),
        ChartKind::Regions => analysis.regions.count_series(),
        ChartKind::Timeline => analysis.timeline.series(),
    };
    ChartSeries {
        kind,
        title: kind.title(),
        points,
    }
}

/// Series for the chart called `name`; fails with `UnknownChart` otherwise.
pub fn chart_by_name(analysis: &Analysis, name: &str) -> Result<ChartSeries, SimError> {
    Ok(chart_series(analysis, name.parse()?))
}

/// Composite report handed to document renderers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InsightReport {
    pub title: &'static str,
    pub phrase: String,
    pub summary: AnalysisSummary,
    pub charts: Vec<ChartSeries>,
}

impl InsightReport {
    /// Report over every chart of `analysis`.
    pub fn new(phrase: impl Into<String>, analysis: &Analysis) -> Self {
        Self {
            title: REPORT_TITLE,
            phrase: phrase.into(),
            summary: analysis.summary.clone(),
            charts: ChartKind::ALL
                .into_iter()
                .map(|kind| chart_series(analysis, kind))
                .collect(),
        }
    }

    /// Headline text lines, in display order.
    pub fn headline(&self) -> Vec<String> {
        let s = &self.summary;
        vec![
            self.title.to_string(),
            format!("Query: {}", self.phrase),
            format!("Records analyzed: {}", s.total_records),
            format!(
                "Sentiment => Positive: {}, Neutral: {}, Negative: {}",
                s.positive, s.neutral, s.negative
            ),
            format!("Average score: {:.2}", s.average_score),
        ]
    }

    /// Pretty-printed JSON document.
    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON document to a new file at `path`.
    pub fn write_json_path(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}
