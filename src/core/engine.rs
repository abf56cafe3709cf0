use crate::core::loader;
use crate::core::naming::{
    finger_plot_path, four_way_plot_path, single_plot_path, table_csv_path, two_way_plot_path,
};
use crate::core::render::ChartRenderer;
use crate::core::{ConfigProvider, Storage};
use crate::domain::model::{ColumnRange, Hand, LabeledTable};
use crate::utils::error::{PlotError, Result};
use crate::utils::monitor::SystemMonitor;
use std::path::{Path, PathBuf};

/// Entry points used by the CLI and by library callers: load recordings,
/// render charts and hand the encoded files to storage.
pub struct PlotEngine<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    monitor: SystemMonitor,
}

impl<S: Storage, C: ConfigProvider> PlotEngine<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self::new_with_monitoring(storage, config, false)
    }

    pub fn new_with_monitoring(storage: S, config: C, monitor_enabled: bool) -> Self {
        Self {
            storage,
            config,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    fn renderer(&self) -> ChartRenderer<'_> {
        ChartRenderer::new(self.config.plot_style(), self.config.layout())
    }

    /// 相對路徑一律以設定的輸出根目錄解析
    fn save(&self, relative: &Path, data: &[u8]) -> Result<PathBuf> {
        self.storage
            .write_file(&self.config.output_root().join(relative), data)
    }

    pub fn load_table(&self, path: &Path, hand: Hand) -> Result<LabeledTable> {
        let recording = loader::load_recording(path)?;
        let table = loader::hand_table(&recording, hand, self.config.layout())?;

        tracing::info!(
            "📥 Loaded {} ({} hand): {} frames, {} columns",
            recording.source,
            hand,
            table.row_count(),
            table.column_count()
        );

        Ok(LabeledTable::new(recording.id, table))
    }

    /// 依表格數量決定模式：1 張為單檔圖，2 張左右並排，4 張為 2×2
    pub fn plot_tables(&self, tables: &[LabeledTable], range: ColumnRange) -> Result<PathBuf> {
        let hand = tables
            .first()
            .map(|t| t.table.hand())
            .ok_or_else(|| PlotError::ValidationError {
                message: "No tables to plot".to_string(),
            })?;

        let relative = match tables {
            [one] => single_plot_path(&one.label, hand, range),
            [first, second] => two_way_plot_path(&first.label, &second.label, hand, range),
            [_, _, _, _] => {
                let ids: Vec<&str> = tables.iter().map(|t| t.label.as_str()).collect();
                four_way_plot_path(&ids, hand, range)
            }
            _ => {
                return Err(PlotError::ValidationError {
                    message: format!("Expected 1, 2 or 4 tables to plot, got {}", tables.len()),
                })
            }
        };

        let chart = self.renderer().render_tables(tables, range)?;
        let path = self.save(&relative, &chart.png)?;
        self.monitor.log_stats("Render");

        tracing::info!("✓ Saved plot: {}", path.display());
        Ok(path)
    }

    pub fn plot_single(&self, path: &Path, range: ColumnRange, hand: Hand) -> Result<PathBuf> {
        let table = self.load_table(path, hand)?;
        self.plot_tables(std::slice::from_ref(&table), range)
    }

    pub fn plot_2way_comparison(
        &self,
        first: &Path,
        second: &Path,
        range: ColumnRange,
        hand: Hand,
    ) -> Result<PathBuf> {
        let tables = [self.load_table(first, hand)?, self.load_table(second, hand)?];
        self.plot_tables(&tables, range)
    }

    pub fn plot_4way_comparison<P: AsRef<Path>>(
        &self,
        paths: &[P],
        range: ColumnRange,
        hand: Hand,
    ) -> Result<PathBuf> {
        let tables = self.load_four(paths, hand)?;
        self.plot_tables(&tables, range)
    }

    /// 4-way comparison for every standard range of the layout. Stops at the first failure.
    pub fn batch_plot_all_ranges<P: AsRef<Path>>(&self, paths: &[P], hand: Hand) -> Result<Vec<PathBuf>> {
        let tables = self.load_four(paths, hand)?;
        let ranges = self.config.layout().standard_ranges();
        self.monitor.log_stats("Load");

        tracing::info!("Creating 4-way comparison plots for all {} ranges", ranges.len());

        let mut created = Vec::with_capacity(ranges.len());
        for (index, range) in ranges.iter().enumerate() {
            tracing::info!("[{}/{}] Processing columns {}", index + 1, ranges.len(), range);
            created.push(self.plot_tables(&tables, *range)?);
        }

        self.monitor.log_final_stats();
        tracing::info!("✅ Created {}/{} comparison plots", created.len(), ranges.len());
        Ok(created)
    }

    fn load_four<P: AsRef<Path>>(&self, paths: &[P], hand: Hand) -> Result<Vec<LabeledTable>> {
        if paths.len() != 4 {
            return Err(PlotError::ValidationError {
                message: format!("Need exactly 4 JSON files, got {}", paths.len()),
            });
        }

        paths
            .iter()
            .map(|path| self.load_table(path.as_ref(), hand))
            .collect()
    }

    /// One 2×2 chart per finger with both hands' accelerometer and gyroscope traces.
    pub fn plot_finger_overview(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let layout = self.config.layout();
        let recording = loader::load_recording(path)?;
        let left = loader::hand_table(&recording, Hand::Left, layout)?;
        let right = loader::hand_table(&recording, Hand::Right, layout)?;

        let label = match recording.metadata.user_name.as_deref() {
            Some(user) => format!("{} (User: {})", recording.display_name(), user),
            None => recording.display_name().to_string(),
        };

        tracing::info!(
            "Generating plots for {} fingers of {} ({} left / {} right frames)",
            layout.fingers.len(),
            recording.source,
            left.row_count(),
            right.row_count()
        );
        if let Some(devices) = &recording.metadata.device_name {
            tracing::debug!(
                "Devices: left={}, right={}",
                devices.left.as_deref().unwrap_or("unknown"),
                devices.right.as_deref().unwrap_or("unknown")
            );
        }

        let renderer = self.renderer();
        let mut created = Vec::with_capacity(layout.fingers.len());
        for finger in &layout.fingers {
            let chart = renderer.render_finger_overview(&label, &left, &right, finger)?;
            let saved = self.save(&finger_plot_path(&recording.id, finger), &chart.png)?;
            tracing::debug!("  ✓ Saved: {}", saved.display());
            created.push(saved);
        }

        self.monitor.log_final_stats();
        tracing::info!("✓ All finger plots saved for {}", recording.id);
        Ok(created)
    }

    /// Writes the flattened table as CSV: `FrameIndex` followed by every layout column.
    pub fn export_table_csv(&self, path: &Path, hand: Hand) -> Result<PathBuf> {
        let labeled = self.load_table(path, hand)?;
        let table = &labeled.table;

        let mut writer = csv::Writer::from_writer(Vec::new());
        let mut header = vec!["FrameIndex".to_string()];
        header.extend(table.column_names());
        writer.write_record(&header)?;

        for (frame, row) in table.rows().iter().enumerate() {
            let mut record = Vec::with_capacity(row.len() + 1);
            record.push(frame.to_string());
            record.extend(row.iter().map(|value| value.to_string()));
            writer.write_record(&record)?;
        }

        let data = writer
            .into_inner()
            .map_err(|e| PlotError::IoError(e.into_error()))?;
        let saved = self.save(&table_csv_path(&labeled.label, hand), &data)?;
        self.monitor.log_stats("Export");

        tracing::info!("✓ Exported {} rows to {}", table.row_count(), saved.display());
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlotSettings;
    use crate::domain::ports::PlotStyle;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Rc<RefCell<HashMap<PathBuf, Vec<u8>>>>,
    }

    impl MockStorage {
        fn get_file(&self, path: &Path) -> Option<Vec<u8>> {
            self.files.borrow().get(path).cloned()
        }

        fn len(&self) -> usize {
            self.files.borrow().len()
        }
    }

    impl Storage for MockStorage {
        fn write_file(&self, path: &Path, data: &[u8]) -> Result<PathBuf> {
            self.files.borrow_mut().insert(path.to_path_buf(), data.to_vec());
            Ok(path.to_path_buf())
        }
    }

    fn settings() -> PlotSettings {
        PlotSettings {
            style: PlotStyle {
                panel_width: 240,
                panel_height: 180,
                line_width: 1,
                title_font_size: 12,
            },
            ..PlotSettings::default()
        }
        .with_output_root("out")
    }

    fn write_recording(dir: &Path, name: &str, frames: usize) -> PathBuf {
        let frame: Vec<i64> = (0..36).map(|i| i * 100).collect();
        let document = json!({
            "user_name": "Ana",
            "gesture_recording": {
                "leftHandDataList": [vec![frame.clone(); frames]],
                "rightHandDataList": [vec![frame; frames]]
            }
        });
        let path = dir.join(format!("{}.json", name));
        std::fs::write(&path, document.to_string()).unwrap();
        path
    }

    #[test]
    fn test_plot_single_uses_deterministic_name() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_recording(temp_dir.path(), "wave", 12);
        let storage = MockStorage::default();
        let engine = PlotEngine::new(storage.clone(), settings());

        let saved = engine
            .plot_single(&input, ColumnRange::new(0, 3), Hand::Left)
            .unwrap();

        assert_eq!(saved, Path::new("out").join("singles").join("wave_Left_0-3.png"));
        assert!(!storage.get_file(&saved).unwrap().is_empty());
    }

    #[test]
    fn test_four_way_requires_exactly_four_files() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_recording(temp_dir.path(), "wave", 4);
        let storage = MockStorage::default();
        let engine = PlotEngine::new(storage.clone(), settings());

        let result = engine.plot_4way_comparison(&[&input, &input, &input], ColumnRange::new(0, 2), Hand::Left);
        assert!(matches!(result, Err(PlotError::ValidationError { .. })));
        assert_eq!(storage.len(), 0);
    }

    #[test]
    fn test_range_error_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_recording(temp_dir.path(), "wave", 4);
        let storage = MockStorage::default();
        let engine = PlotEngine::new(storage.clone(), settings());

        let result = engine.plot_2way_comparison(&input, &input, ColumnRange::new(34, 36), Hand::Right);
        assert!(matches!(result, Err(PlotError::RangeError { available: 36, .. })));
        assert_eq!(storage.len(), 0);
    }

    #[test]
    fn test_finger_overview_writes_one_file_per_finger() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_recording(temp_dir.path(), "fist", 6);
        let storage = MockStorage::default();
        let engine = PlotEngine::new(storage.clone(), settings());

        let created = engine.plot_finger_overview(&input).unwrap();
        assert_eq!(created.len(), 6);
        assert_eq!(created[4], Path::new("out").join("fingers").join("fist").join("Thumb.png"));
        assert_eq!(storage.len(), 6);
    }

    #[test]
    fn test_export_csv_has_header_and_rows() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_recording(temp_dir.path(), "wave", 3);
        let storage = MockStorage::default();
        let engine = PlotEngine::new(storage.clone(), settings());

        let saved = engine.export_table_csv(&input, Hand::Left).unwrap();
        let content = String::from_utf8(storage.get_file(&saved).unwrap()).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("FrameIndex,IndexFinger_AccX,IndexFinger_AccY"));
        assert!(lines[1].starts_with("0,0,"));
        assert!(lines[3].starts_with("2,0,"));
    }

    #[test]
    fn test_outputs_follow_configured_root() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_recording(temp_dir.path(), "wave", 3);
        let storage = MockStorage::default();
        let engine = PlotEngine::new(storage.clone(), settings().with_output_root("elsewhere/plots"));

        let plot = engine
            .plot_single(&input, ColumnRange::new(0, 2), Hand::Left)
            .unwrap();
        let table = engine.export_table_csv(&input, Hand::Right).unwrap();

        assert!(plot.starts_with("elsewhere/plots"));
        assert_eq!(table, Path::new("elsewhere/plots").join("tables").join("wave_Right.csv"));
        assert!(storage.get_file(&plot).is_some());
    }

    #[test]
    fn test_monitored_engine_plots_and_exports() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_recording(temp_dir.path(), "wave", 3);
        let storage = MockStorage::default();
        let engine = PlotEngine::new_with_monitoring(storage.clone(), settings(), true);

        engine
            .plot_2way_comparison(&input, &input, ColumnRange::new(0, 2), Hand::Left)
            .unwrap();
        engine.export_table_csv(&input, Hand::Left).unwrap();

        assert_eq!(storage.len(), 2);
    }
}
