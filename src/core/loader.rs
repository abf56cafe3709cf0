use crate::core::naming::recording_id;
use crate::core::transform::to_physical;
use crate::domain::layout::{ColumnSpec, Scale, SensorLayout};
use crate::domain::model::{Hand, Recording, RecordingMetadata, Table};
use crate::utils::error::{PlotError, Result};
use serde_json::{Map, Value};
use std::path::Path;

const GESTURE_RECORDING_KEY: &str = "gesture_recording";

/// 讀取 JSON 錄製檔；手部資料在取表格時才展開
pub fn load_recording(path: &Path) -> Result<Recording> {
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    tracing::debug!("Reading recording: {}", path.display());
    let content = std::fs::read_to_string(path)?;

    parse_recording(&recording_id(path), &source, &content)
}

pub fn parse_recording(id: &str, source: &str, content: &str) -> Result<Recording> {
    let document: Value = serde_json::from_str(content)
        .map_err(|e| PlotError::data_format(source, None, format!("invalid JSON: {}", e)))?;

    let Value::Object(mut root) = document else {
        return Err(PlotError::data_format(
            source,
            None,
            "top-level value must be an object",
        ));
    };

    // 擷取工具把兩手資料包在 gesture_recording 底下，也接受放在最外層
    let (left, right) = match root.remove(GESTURE_RECORDING_KEY) {
        Some(Value::Object(mut nested)) => take_hand_lists(&mut nested),
        Some(_) => {
            return Err(PlotError::data_format(
                source,
                None,
                format!("'{}' must be an object", GESTURE_RECORDING_KEY),
            ))
        }
        None => take_hand_lists(&mut root),
    };

    // 手部資料移出後，剩下的欄位才是描述資訊
    let metadata = match serde_json::from_value::<RecordingMetadata>(Value::Object(root)) {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::warn!("Ignoring unreadable metadata in {}: {}", source, e);
            RecordingMetadata::default()
        }
    };

    Ok(Recording {
        id: id.to_string(),
        source: source.to_string(),
        metadata,
        left,
        right,
    })
}

fn take_hand_lists(lists: &mut Map<String, Value>) -> (Option<Value>, Option<Value>) {
    (
        lists.remove(Hand::Left.list_key()),
        lists.remove(Hand::Right.list_key()),
    )
}

pub fn load_table(path: &Path, hand: Hand, layout: &SensorLayout) -> Result<Table> {
    let recording = load_recording(path)?;
    hand_table(&recording, hand, layout)
}

/// 將一手的資料展開為表格；任何一個取樣有缺漏即整體失敗
pub fn hand_table(recording: &Recording, hand: Hand, layout: &SensorLayout) -> Result<Table> {
    let source = recording.source.as_str();
    let list = recording.hand_list(hand).ok_or_else(|| {
        PlotError::data_format(source, None, format!("missing '{}'", hand.list_key()))
    })?;

    let mut samples = Vec::new();
    collect_samples(list, source, hand, &mut samples)?;

    let columns = layout.columns();
    let scales = column_scales(&columns, layout)?;

    let rows = samples
        .iter()
        .enumerate()
        .map(|(index, sample)| flatten_sample(sample, index, &columns, &scales, source))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        "Flattened {} {} samples from {} into {} columns",
        rows.len(),
        hand,
        source,
        columns.len()
    );

    Table::new(hand, columns, rows)
}

fn column_scales(columns: &[ColumnSpec], layout: &SensorLayout) -> Result<Vec<Scale>> {
    columns
        .iter()
        .map(|column| {
            layout
                .scale_for(column.kind)
                .map(|s| s.scale)
                .ok_or_else(|| PlotError::MissingConfigError {
                    field: format!("layout.scales.{}", column.kind.short_name()),
                })
        })
        .collect()
}

/// Unwraps list nesting around frames. A frame is either an object
/// (finger → axis → value) or a flat numeric array in layout order; any other
/// array is treated as a wrapper and walked in order.
fn collect_samples<'a>(value: &'a Value, source: &str, hand: Hand, out: &mut Vec<&'a Value>) -> Result<()> {
    let Value::Array(items) = value else {
        return Err(PlotError::data_format(
            source,
            None,
            format!("'{}' must be a list", hand.list_key()),
        ));
    };

    for item in items {
        match item {
            Value::Object(_) => out.push(item),
            Value::Array(inner) if !inner.is_empty() && inner.iter().all(Value::is_number) => {
                out.push(item)
            }
            Value::Array(inner) if inner.iter().any(Value::is_number) => {
                return Err(PlotError::data_format(
                    source,
                    Some(out.len()),
                    "frame mixes numbers with nested lists",
                ));
            }
            Value::Array(_) => collect_samples(item, source, hand, out)?,
            other => {
                return Err(PlotError::data_format(
                    source,
                    Some(out.len()),
                    format!("expected a frame object or list, found {}", json_type(other)),
                ));
            }
        }
    }

    Ok(())
}

fn flatten_sample(
    sample: &Value,
    index: usize,
    columns: &[ColumnSpec],
    scales: &[Scale],
    source: &str,
) -> Result<Vec<f64>> {
    match sample {
        Value::Object(fingers) => columns
            .iter()
            .zip(scales)
            .map(|(column, scale)| {
                let axes = fingers
                    .get(&column.finger)
                    .ok_or_else(|| {
                        PlotError::data_format(source, Some(index), format!("missing key '{}'", column.finger))
                    })?
                    .as_object()
                    .ok_or_else(|| {
                        PlotError::data_format(
                            source,
                            Some(index),
                            format!("'{}' must map axis names to values", column.finger),
                        )
                    })?;

                let raw = axes.get(&column.axis).ok_or_else(|| {
                    PlotError::data_format(
                        source,
                        Some(index),
                        format!("missing key '{}.{}'", column.finger, column.axis),
                    )
                })?;

                convert(raw, *scale, &column.name, index, source)
            })
            .collect(),
        Value::Array(values) => {
            if values.len() != columns.len() {
                return Err(PlotError::data_format(
                    source,
                    Some(index),
                    format!("frame has {} values, expected {}", values.len(), columns.len()),
                ));
            }

            values
                .iter()
                .zip(columns.iter().zip(scales))
                .map(|(raw, (column, scale))| convert(raw, *scale, &column.name, index, source))
                .collect()
        }
        other => Err(PlotError::data_format(
            source,
            Some(index),
            format!("unexpected {} sample", json_type(other)),
        )),
    }
}

fn convert(raw: &Value, scale: Scale, column: &str, index: usize, source: &str) -> Result<f64> {
    let integer = match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < 1e9).map(|f| f as i64)),
        _ => None,
    }
    .ok_or_else(|| {
        PlotError::data_format(
            source,
            Some(index),
            format!("'{}' must be an integer, found {}", column, raw),
        )
    })?;

    to_physical(integer, scale)
        .map_err(|e| PlotError::data_format(source, Some(index), format!("'{}': {}", column, e)))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object_sample(layout: &SensorLayout, raw: i64) -> Value {
        let mut fingers = Map::new();
        for finger in &layout.fingers {
            let axes: Map<String, Value> = layout
                .axes
                .iter()
                .map(|axis| (axis.name.clone(), json!(raw)))
                .collect();
            fingers.insert(finger.clone(), Value::Object(axes));
        }
        Value::Object(fingers)
    }

    #[test]
    fn test_object_samples_follow_layout_order() {
        let layout = SensorLayout::glove();
        let document = json!({
            "leftHandDataList": [object_sample(&layout, 4096), object_sample(&layout, -4096)],
            "rightHandDataList": []
        });

        let recording = parse_recording("wave", "wave.json", &document.to_string()).unwrap();
        let table = hand_table(&recording, Hand::Left, &layout).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 36);
        assert_eq!(table.columns()[0].name, "IndexFinger_AccX");
        assert_eq!(table.rows()[0][0], 1.0);
        assert_eq!(table.rows()[1][0], -1.0);
        assert_eq!(table.rows()[0][3], 4096.0 / 32.8);
    }

    #[test]
    fn test_nested_array_frames_from_capture_tool() {
        let layout = SensorLayout::glove();
        let frame: Vec<i64> = (0..36).map(|i| if i % 6 < 3 { 4096 } else { 65535 }).collect();
        let document = json!({
            "user_name": "Ana",
            "custom_name": null,
            "device_name": { "leftHandDevice": "Glove-L", "rightHandDevice": "Glove-R" },
            "gesture_recording": {
                "leftHandDataList": [[frame.clone(), frame.clone(), frame]],
                "rightHandDataList": [[]]
            }
        });

        let recording = parse_recording("fist", "fist.json", &document.to_string()).unwrap();
        assert_eq!(recording.metadata.user_name.as_deref(), Some("Ana"));
        let devices = recording.metadata.device_name.clone().unwrap();
        assert_eq!(devices.left.as_deref(), Some("Glove-L"));

        let left = hand_table(&recording, Hand::Left, &layout).unwrap();
        assert_eq!(left.row_count(), 3);
        assert_eq!(left.rows()[2][0], 1.0);
        assert_eq!(left.rows()[2][3], -1.0 / 32.8);

        let right = hand_table(&recording, Hand::Right, &layout).unwrap();
        assert_eq!(right.row_count(), 0);
        assert_eq!(right.column_count(), 36);
    }

    #[test]
    fn test_missing_axis_reports_sample_and_key() {
        let layout = SensorLayout::glove();
        let mut broken = object_sample(&layout, 0);
        broken["Thumb"].as_object_mut().unwrap().remove("GyroY");

        let document = json!({
            "leftHandDataList": [object_sample(&layout, 0), broken],
            "rightHandDataList": []
        });
        let recording = parse_recording("wave", "wave.json", &document.to_string()).unwrap();

        match hand_table(&recording, Hand::Left, &layout) {
            Err(PlotError::DataFormatError { file, sample, message }) => {
                assert_eq!(file, "wave.json");
                assert_eq!(sample, Some(1));
                assert!(message.contains("Thumb.GyroY"), "{}", message);
            }
            other => panic!("expected DataFormatError, got {:?}", other),
        }
    }

    #[test]
    fn test_short_frame_is_rejected() {
        let layout = SensorLayout::glove();
        let document = json!({ "leftHandDataList": [[1, 2, 3]] });
        let recording = parse_recording("short", "short.json", &document.to_string()).unwrap();

        let err = hand_table(&recording, Hand::Left, &layout).unwrap_err();
        assert!(err.to_string().contains("expected 36"), "{}", err);
    }

    #[test]
    fn test_missing_hand_list() {
        let layout = SensorLayout::glove();
        let recording = parse_recording("solo", "solo.json", r#"{"leftHandDataList": []}"#).unwrap();

        let err = hand_table(&recording, Hand::Right, &layout).unwrap_err();
        assert!(err.to_string().contains("rightHandDataList"));
    }

    #[test]
    fn test_top_level_lists_next_to_metadata() {
        let layout = SensorLayout::glove();
        let frame = vec![0; 36];
        let document = json!({
            "session_name": "morning",
            "custom_name": "Wave A",
            "leftHandDataList": [frame.clone()],
            "rightHandDataList": [frame.clone(), frame]
        });

        let recording = parse_recording("wave", "wave.json", &document.to_string()).unwrap();

        assert_eq!(recording.metadata.session_name.as_deref(), Some("morning"));
        assert_eq!(recording.display_name(), "Wave A");
        assert_eq!(hand_table(&recording, Hand::Left, &layout).unwrap().row_count(), 1);
        assert_eq!(hand_table(&recording, Hand::Right, &layout).unwrap().row_count(), 2);
    }

    #[test]
    fn test_out_of_range_and_non_integer_values() {
        let layout = SensorLayout::glove();

        let mut frame = vec![json!(0); 36];
        frame[7] = json!(70000);
        let document = json!({ "leftHandDataList": [frame] });
        let recording = parse_recording("big", "big.json", &document.to_string()).unwrap();
        let err = hand_table(&recording, Hand::Left, &layout).unwrap_err();
        assert!(err.to_string().contains("MiddleFinger_AccY"), "{}", err);

        let mut frame = vec![json!(0); 36];
        frame[0] = json!(1.5);
        let document = json!({ "leftHandDataList": [frame] });
        let recording = parse_recording("frac", "frac.json", &document.to_string()).unwrap();
        assert!(hand_table(&recording, Hand::Left, &layout).is_err());
    }

    #[test]
    fn test_invalid_json_is_a_data_format_error() {
        let err = parse_recording("bad", "bad.json", "{ not json").unwrap_err();
        assert!(matches!(err, PlotError::DataFormatError { sample: None, .. }));
    }

    #[test]
    fn test_loading_is_deterministic() {
        let layout = SensorLayout::glove();
        let frame: Vec<i64> = (0..36).map(|i| i * 911 - 16000).collect();
        let content = json!({ "leftHandDataList": [frame.clone(), frame] }).to_string();

        let first = hand_table(&parse_recording("a", "a.json", &content).unwrap(), Hand::Left, &layout).unwrap();
        let second = hand_table(&parse_recording("a", "a.json", &content).unwrap(), Hand::Left, &layout).unwrap();
        assert_eq!(first, second);
    }
}
