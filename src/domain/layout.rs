use crate::domain::model::ColumnRange;
use crate::utils::error::{PlotError, Result};
use crate::utils::validation::{validate_positive_float, validate_unique_names, Validate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Accelerometer,
    Gyroscope,
}

impl SensorKind {
    /// 用於檔名與標題的縮寫
    pub fn short_name(&self) -> &'static str {
        match self {
            SensorKind::Accelerometer => "Acc",
            SensorKind::Gyroscope => "Gyro",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SensorKind::Accelerometer => "Accelerometer",
            SensorKind::Gyroscope => "Gyroscope",
        }
    }

    pub fn quantity(&self) -> &'static str {
        match self {
            SensorKind::Accelerometer => "Acceleration",
            SensorKind::Gyroscope => "Angular Velocity",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Linear calibration: `physical = raw / lsb_per_unit + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub lsb_per_unit: f64,
    #[serde(default)]
    pub offset: f64,
}

impl Scale {
    pub const fn new(lsb_per_unit: f64) -> Self {
        Self {
            lsb_per_unit,
            offset: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindScale {
    pub kind: SensorKind,
    pub unit: String,
    #[serde(flatten)]
    pub scale: Scale,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub name: String,
    pub kind: SensorKind,
}

/// One flattened column, `"<Finger>_<Axis>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub finger: String,
    pub axis: String,
    pub kind: SensorKind,
}

/// 手套感測器配置：手指順序、軸順序與每種感測器的換算表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorLayout {
    pub fingers: Vec<String>,
    pub axes: Vec<AxisSpec>,
    pub scales: Vec<KindScale>,
}

pub const ACCELEROMETER_LSB_PER_G: f64 = 4096.0;
pub const GYROSCOPE_LSB_PER_DPS: f64 = 32.8;

impl SensorLayout {
    /// Six IMUs (four fingers, thumb, palm) with a 3-axis accelerometer and gyroscope each.
    pub fn glove() -> Self {
        let fingers = ["IndexFinger", "MiddleFinger", "RingFinger", "LittleFinger", "Thumb", "Palm"];
        let axes = [
            ("AccX", SensorKind::Accelerometer),
            ("AccY", SensorKind::Accelerometer),
            ("AccZ", SensorKind::Accelerometer),
            ("GyroX", SensorKind::Gyroscope),
            ("GyroY", SensorKind::Gyroscope),
            ("GyroZ", SensorKind::Gyroscope),
        ];

        Self {
            fingers: fingers.iter().map(|f| f.to_string()).collect(),
            axes: axes
                .iter()
                .map(|(name, kind)| AxisSpec {
                    name: name.to_string(),
                    kind: *kind,
                })
                .collect(),
            scales: vec![
                KindScale {
                    kind: SensorKind::Accelerometer,
                    unit: "g".to_string(),
                    scale: Scale::new(ACCELEROMETER_LSB_PER_G),
                },
                KindScale {
                    kind: SensorKind::Gyroscope,
                    unit: "deg/s".to_string(),
                    scale: Scale::new(GYROSCOPE_LSB_PER_DPS),
                },
            ],
        }
    }

    pub fn column_name(finger: &str, axis: &str) -> String {
        format!("{}_{}", finger, axis)
    }

    /// Finger-major column order shared by every table built from this layout.
    pub fn columns(&self) -> Vec<ColumnSpec> {
        self.fingers
            .iter()
            .flat_map(|finger| {
                self.axes.iter().map(move |axis| ColumnSpec {
                    name: Self::column_name(finger, &axis.name),
                    finger: finger.clone(),
                    axis: axis.name.clone(),
                    kind: axis.kind,
                })
            })
            .collect()
    }

    pub fn column_count(&self) -> usize {
        self.fingers.len() * self.axes.len()
    }

    pub fn scale_for(&self, kind: SensorKind) -> Option<&KindScale> {
        self.scales.iter().find(|s| s.kind == kind)
    }

    pub fn unit_for(&self, kind: SensorKind) -> &str {
        self.scale_for(kind).map(|s| s.unit.as_str()).unwrap_or("raw")
    }

    /// 每根手指中，同一感測器的連續軸組成一個標準區間（預設配置共 12 組）
    pub fn standard_ranges(&self) -> Vec<ColumnRange> {
        let mut ranges = Vec::new();
        let per_finger = self.axes.len();

        for finger_index in 0..self.fingers.len() {
            let base = finger_index * per_finger;
            let mut group_start = 0;
            for axis_index in 1..=per_finger {
                let group_ends = axis_index == per_finger
                    || self.axes[axis_index].kind != self.axes[group_start].kind;
                if group_ends {
                    ranges.push(ColumnRange::new(base + group_start, base + axis_index - 1));
                    group_start = axis_index;
                }
            }
        }

        ranges
    }
}

impl Default for SensorLayout {
    fn default() -> Self {
        Self::glove()
    }
}

impl Validate for SensorLayout {
    fn validate(&self) -> Result<()> {
        if self.fingers.is_empty() {
            return Err(PlotError::ConfigValidationError {
                field: "layout.fingers".to_string(),
                message: "At least one finger is required".to_string(),
            });
        }
        if self.axes.is_empty() {
            return Err(PlotError::ConfigValidationError {
                field: "layout.axes".to_string(),
                message: "At least one axis is required".to_string(),
            });
        }

        validate_unique_names("layout.fingers", self.fingers.iter().map(String::as_str))?;
        validate_unique_names("layout.axes", self.axes.iter().map(|a| a.name.as_str()))?;

        for scale in &self.scales {
            validate_positive_float(
                &format!("layout.scales.{}", scale.kind.short_name()),
                scale.scale.lsb_per_unit,
            )?;
            if !scale.scale.offset.is_finite() {
                return Err(PlotError::InvalidConfigValueError {
                    field: format!("layout.scales.{}.offset", scale.kind.short_name()),
                    value: scale.scale.offset.to_string(),
                    reason: "Offset must be finite".to_string(),
                });
            }
        }

        for axis in &self.axes {
            if self.scale_for(axis.kind).is_none() {
                return Err(PlotError::MissingConfigError {
                    field: format!("layout.scales ({} used by axis {})", axis.kind.short_name(), axis.name),
                });
            }
        }

        Ok(())
    }
}
