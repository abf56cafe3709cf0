use crate::domain::layout::{ColumnSpec, SensorKind};
use crate::domain::model::{ColumnRange, Hand};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const SINGLES_DIR: &str = "singles";
pub const COMPARISONS_DIR: &str = "comparisons";
pub const FINGERS_DIR: &str = "fingers";
pub const TABLES_DIR: &str = "tables";

fn unsafe_chars() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"[^\p{L}\p{N}_-]").expect("static pattern"))
}

/// 空白轉為底線，只保留 Unicode 字母、數字、底線與連字號
pub fn sanitize_name(name: &str) -> String {
    let underscored = name.trim().replace(' ', "_");
    let cleaned = unsafe_chars().replace_all(&underscored, "");
    if cleaned.is_empty() {
        "recording".to_string()
    } else {
        cleaned.into_owned()
    }
}

/// Identifier of a recording: its sanitized file stem.
pub fn recording_id(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    sanitize_name(&stem)
}

pub fn single_plot_path(id: &str, hand: Hand, range: ColumnRange) -> PathBuf {
    Path::new(SINGLES_DIR).join(format!("{}_{}_{}.png", id, hand, range))
}

pub fn two_way_plot_path(first: &str, second: &str, hand: Hand, range: ColumnRange) -> PathBuf {
    Path::new(COMPARISONS_DIR).join(format!("2way_{}_vs_{}_{}_{}.png", first, second, hand, range))
}

pub fn four_way_plot_path(ids: &[&str], hand: Hand, range: ColumnRange) -> PathBuf {
    Path::new(COMPARISONS_DIR).join(format!("4way_{}_{}_{}.png", ids.join("_"), hand, range))
}

pub fn finger_plot_path(id: &str, finger: &str) -> PathBuf {
    Path::new(FINGERS_DIR).join(id).join(format!("{}.png", sanitize_name(finger)))
}

pub fn table_csv_path(id: &str, hand: Hand) -> PathBuf {
    Path::new(TABLES_DIR).join(format!("{}_{}.csv", id, hand))
}

/// "Index_Middle" style summary of the fingers present in a column selection.
pub fn finger_summary(columns: &[ColumnSpec]) -> String {
    let mut fingers: Vec<&str> = Vec::new();
    for column in columns {
        let short = column.finger.strip_suffix("Finger").unwrap_or(&column.finger);
        if !fingers.contains(&short) {
            fingers.push(short);
        }
    }
    fingers.join("_")
}

/// "Acc", "Gyro" or "Acc_Gyro".
pub fn sensor_summary(kinds: &[SensorKind]) -> String {
    kinds
        .iter()
        .map(|k| k.short_name())
        .collect::<Vec<_>>()
        .join("_")
}
