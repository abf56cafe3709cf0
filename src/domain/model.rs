use crate::domain::layout::{ColumnSpec, SensorKind, SensorLayout};
use crate::utils::error::{PlotError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub const ALL: [Hand; 2] = [Hand::Left, Hand::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            Hand::Left => "Left",
            Hand::Right => "Right",
        }
    }

    /// JSON 中對應的資料列表名稱
    pub fn list_key(&self) -> &'static str {
        match self {
            Hand::Left => "leftHandDataList",
            Hand::Right => "rightHandDataList",
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hand {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Hand::Left),
            "right" | "r" => Ok(Hand::Right),
            other => Err(PlotError::ValidationError {
                message: format!("Unknown hand '{}', expected Left or Right", other),
            }),
        }
    }
}

/// Inclusive, 0-based column range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnRange {
    pub start: usize,
    pub end: usize,
}

impl ColumnRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn indices(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    pub fn check(&self, available: usize) -> Result<()> {
        if self.start > self.end || self.end >= available {
            return Err(PlotError::RangeError {
                start: self.start,
                end: self.end,
                available,
            });
        }
        Ok(())
    }
}

impl fmt::Display for ColumnRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for ColumnRange {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || PlotError::ValidationError {
            message: format!("Invalid column range '{}', expected START-END (e.g. 0-2)", s),
        };

        let (start, end) = s.trim().split_once('-').ok_or_else(invalid)?;
        let start = start.trim().parse::<usize>().map_err(|_| invalid())?;
        let end = end.trim().parse::<usize>().map_err(|_| invalid())?;
        Ok(ColumnRange::new(start, end))
    }
}

/// 單手單一錄製檔的扁平化表格；每列為一個取樣（時間序）
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    hand: Hand,
    columns: Vec<ColumnSpec>,
    rows: Vec<Vec<f64>>,
}

impl Table {
    pub fn new(hand: Hand, columns: Vec<ColumnSpec>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(PlotError::ValidationError {
                message: format!(
                    "Row {} has {} values but the table has {} columns",
                    index,
                    row.len(),
                    columns.len()
                ),
            });
        }

        Ok(Self { hand, columns, rows })
    }

    pub fn from_layout(hand: Hand, layout: &SensorLayout, rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::new(hand, layout.columns(), rows)
    }

    pub fn hand(&self) -> Hand {
        self.hand
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_values(&self, index: usize) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(move |row| row[index])
    }

    /// 選取區間內的欄位，區間超出欄數時回傳 RangeError
    pub fn select(&self, range: ColumnRange) -> Result<&[ColumnSpec]> {
        range.check(self.columns.len())?;
        Ok(&self.columns[range.start..=range.end])
    }

    pub fn same_schema(&self, other: &Table) -> bool {
        self.columns.len() == other.columns.len()
            && self
                .columns
                .iter()
                .zip(&other.columns)
                .all(|(a, b)| a.name == b.name)
    }

    pub fn kinds_in(&self, range: ColumnRange) -> Vec<SensorKind> {
        let mut kinds: Vec<SensorKind> = self.columns[range.start..=range.end]
            .iter()
            .map(|c| c.kind)
            .collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }
}

/// A table together with the identifier shown in chart captions and file names.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledTable {
    pub label: String,
    pub table: Table,
}

impl LabeledTable {
    pub fn new(label: impl Into<String>, table: Table) -> Self {
        Self {
            label: label.into(),
            table,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceNames {
    #[serde(rename = "leftHandDevice", default)]
    pub left: Option<String>,
    #[serde(rename = "rightHandDevice", default)]
    pub right: Option<String>,
}

/// 錄製檔附帶的描述資訊，欄位皆為選填
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingMetadata {
    pub session_name: Option<String>,
    pub user_name: Option<String>,
    pub custom_name: Option<String>,
    pub timestamp: Option<String>,
    pub device_name: Option<DeviceNames>,
}

/// A parsed recording. Hand lists stay as raw JSON until a table is requested,
/// so a malformed right hand never blocks plotting the left one.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    pub id: String,
    pub source: String,
    pub metadata: RecordingMetadata,
    pub left: Option<serde_json::Value>,
    pub right: Option<serde_json::Value>,
}

impl Recording {
    pub fn hand_list(&self, hand: Hand) -> Option<&serde_json::Value> {
        match hand {
            Hand::Left => self.left.as_ref(),
            Hand::Right => self.right.as_ref(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.metadata.custom_name.as_deref().unwrap_or(&self.id)
    }
}
