use crate::core::naming::{finger_summary, sensor_summary};
use crate::domain::layout::{SensorKind, SensorLayout};
use crate::domain::model::{ColumnRange, LabeledTable, Table};
use crate::domain::ports::{PlotStyle, MAX_PANEL_SIZE};
use crate::utils::error::{PlotError, Result};
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use plotters::backend::BitMapBackend;
use plotters::chart::{ChartBuilder, SeriesLabelPosition};
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::PathElement;
use plotters::series::LineSeries;
use plotters::style::colors::{BLACK, WHITE};
use plotters::style::{Color, IntoFont, RGBColor};

/// Trace colors, cycled per column within a panel.
pub const SERIES_COLORS: [RGBColor; 6] = [
    RGBColor(214, 39, 40),
    RGBColor(44, 160, 44),
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

const FONT: &str = "sans-serif";
const LEGEND_LINE_WIDTH: u32 = 3;

/// 編碼後的 PNG 以及實際使用的 y 軸範圍
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub y_range: (f64, f64),
}

struct Panel<'a> {
    caption: String,
    table: &'a Table,
    columns: Vec<usize>,
    y_range: (f64, f64),
    y_label: String,
}

/// Min/max over the given columns of every table, padded so traces never touch the frame.
pub fn shared_y_range<'a, I>(tables: I, columns: &[usize]) -> (f64, f64)
where
    I: IntoIterator<Item = &'a Table>,
{
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for table in tables {
        for &column in columns {
            for value in table.column_values(column).filter(|v| v.is_finite()) {
                min = min.min(value);
                max = max.max(value);
            }
        }
    }

    if !min.is_finite() || !max.is_finite() {
        return (-1.0, 1.0);
    }

    let span = max - min;
    let padding = if span < 1e-9 { 0.5 } else { span * 0.1 };
    (min - padding, max + padding)
}

pub struct ChartRenderer<'a> {
    style: &'a PlotStyle,
    layout: &'a SensorLayout,
}

impl<'a> ChartRenderer<'a> {
    pub fn new(style: &'a PlotStyle, layout: &'a SensorLayout) -> Self {
        Self { style, layout }
    }

    fn y_label(&self, kinds: &[SensorKind]) -> String {
        match kinds {
            [kind] => format!("{} ({})", kind.quantity(), self.layout.unit_for(*kind)),
            _ => "Sensor Value".to_string(),
        }
    }

    /// 單檔、左右並排（2 檔）或 2×2（4 檔）折線圖，所有子圖共用 y 軸範圍
    pub fn render_tables(&self, tables: &[LabeledTable], range: ColumnRange) -> Result<RenderedChart> {
        let grid = match tables.len() {
            1 => (1, 1),
            2 => (1, 2),
            4 => (2, 2),
            other => {
                return Err(PlotError::ValidationError {
                    message: format!("Expected 1, 2 or 4 tables to plot, got {}", other),
                })
            }
        };

        let reference = &tables[0];
        let selected = reference.table.select(range)?;

        for other in &tables[1..] {
            if !reference.table.same_schema(&other.table) {
                return Err(PlotError::SchemaMismatchError {
                    label: other.label.clone(),
                    expected: reference.table.column_names(),
                    found: other.table.column_names(),
                });
            }
            if other.table.hand() != reference.table.hand() {
                return Err(PlotError::ValidationError {
                    message: format!(
                        "Cannot compare {} hand of '{}' with {} hand of '{}'",
                        reference.table.hand(),
                        reference.label,
                        other.table.hand(),
                        other.label
                    ),
                });
            }
        }

        let hand = reference.table.hand();
        let kinds = reference.table.kinds_in(range);
        let columns: Vec<usize> = range.indices().collect();
        let y_range = shared_y_range(tables.iter().map(|t| &t.table), &columns);
        let y_label = self.y_label(&kinds);

        let description = format!(
            "{} Hand - {} - {} (Columns {})",
            hand,
            finger_summary(selected),
            sensor_summary(&kinds),
            range
        );
        let title = if tables.len() == 1 {
            format!("{} - {}", reference.label, description)
        } else {
            format!("{}-Way Comparison: {}", tables.len(), description)
        };

        let panels: Vec<Panel> = tables
            .iter()
            .enumerate()
            .map(|(index, labeled)| Panel {
                caption: if tables.len() == 1 {
                    labeled.label.clone()
                } else {
                    format!("File {}: {}", index + 1, labeled.label)
                },
                table: &labeled.table,
                columns: columns.clone(),
                y_range,
                y_label: y_label.clone(),
            })
            .collect();

        self.render(&title, grid, &panels, y_range)
    }

    /// One finger of one recording: rows are hands, columns are sensor kinds.
    pub fn render_finger_overview(
        &self,
        label: &str,
        left: &Table,
        right: &Table,
        finger: &str,
    ) -> Result<RenderedChart> {
        if !left.same_schema(right) {
            return Err(PlotError::SchemaMismatchError {
                label: format!("{} ({} hand)", label, right.hand()),
                expected: left.column_names(),
                found: right.column_names(),
            });
        }

        let mut groups: Vec<(SensorKind, Vec<usize>)> = Vec::new();
        for (index, column) in left.columns().iter().enumerate() {
            if column.finger != finger {
                continue;
            }
            match groups.iter_mut().find(|(kind, _)| *kind == column.kind) {
                Some((_, indices)) => indices.push(index),
                None => groups.push((column.kind, vec![index])),
            }
        }

        if groups.is_empty() {
            return Err(PlotError::ValidationError {
                message: format!("Unknown finger '{}'", finger),
            });
        }

        let ranges: Vec<(f64, f64)> = groups
            .iter()
            .map(|(_, indices)| shared_y_range([left, right], indices))
            .collect();

        let mut panels = Vec::with_capacity(groups.len() * 2);
        for table in [left, right] {
            for ((kind, indices), y_range) in groups.iter().zip(&ranges) {
                panels.push(Panel {
                    caption: format!(
                        "{} Hand - {} ({})",
                        table.hand(),
                        kind.name(),
                        self.layout.unit_for(*kind)
                    ),
                    table,
                    columns: indices.clone(),
                    y_range: *y_range,
                    y_label: self.y_label(&[*kind]),
                });
            }
        }

        let overall = (
            ranges.iter().map(|r| r.0).fold(f64::INFINITY, f64::min),
            ranges.iter().map(|r| r.1).fold(f64::NEG_INFINITY, f64::max),
        );
        let title = format!("{} - {}", finger, label);
        self.render(&title, (2, groups.len()), &panels, overall)
    }

    /// 整張圖的像素尺寸：子圖格數乘上子圖大小，再加上標題列
    fn canvas_size(&self, grid: (usize, usize)) -> Result<(u32, u32)> {
        let within = |size: u32| (size <= MAX_PANEL_SIZE).then_some(size);
        let rows = u32::try_from(grid.0).ok();
        let cols = u32::try_from(grid.1).ok();
        let width = cols.and_then(|c| within(self.style.panel_width)?.checked_mul(c));
        let height = rows
            .and_then(|r| within(self.style.panel_height)?.checked_mul(r))
            .and_then(|h| self.style.title_font_size.checked_mul(2).and_then(|t| h.checked_add(t)));

        match (width, height) {
            (Some(width), Some(height)) => Ok((width, height)),
            _ => Err(PlotError::RenderError {
                message: format!(
                    "Canvas for a {}x{} grid of {}x{} panels is too large",
                    grid.0, grid.1, self.style.panel_width, self.style.panel_height
                ),
            }),
        }
    }

    fn render(
        &self,
        title: &str,
        grid: (usize, usize),
        panels: &[Panel],
        y_range: (f64, f64),
    ) -> Result<RenderedChart> {
        let (width, height) = self.canvas_size(grid)?;

        // 先在記憶體中畫完再編碼
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        self.draw(&mut buffer, (width, height), title, grid, panels)?;

        let mut png = Vec::new();
        PngEncoder::new(&mut png).write_image(&buffer, width, height, ColorType::Rgb8)?;

        tracing::debug!("Rendered '{}' ({}x{}, {} bytes)", title, width, height, png.len());

        Ok(RenderedChart {
            png,
            width,
            height,
            y_range,
        })
    }

    fn draw(
        &self,
        buffer: &mut [u8],
        size: (u32, u32),
        title: &str,
        grid: (usize, usize),
        panels: &[Panel],
    ) -> Result<()> {
        let root = BitMapBackend::with_buffer(buffer, size).into_drawing_area();
        root.fill(&WHITE)?;

        let body = root.titled(
            title,
            (FONT, self.style.title_font_size).into_font().color(&BLACK),
        )?;

        for (area, panel) in body.split_evenly(grid).iter().zip(panels) {
            self.draw_panel(area, panel)?;
        }

        root.present()?;
        Ok(())
    }

    fn draw_panel(&self, area: &DrawingArea<BitMapBackend, Shift>, panel: &Panel) -> Result<()> {
        let x_max = panel.table.row_count().saturating_sub(1).max(1) as f64;
        let (y_min, y_max) = panel.y_range;

        let mut chart = ChartBuilder::on(area)
            .caption(&panel.caption, (FONT, 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(0f64..x_max, y_min..y_max)?;

        chart
            .configure_mesh()
            .x_desc("Frame")
            .y_desc(panel.y_label.as_str())
            .x_labels(10)
            .y_labels(8)
            .light_line_style(&WHITE.mix(0.7))
            .label_style((FONT, 13))
            .draw()?;

        for (series_index, &column) in panel.columns.iter().enumerate() {
            let color = SERIES_COLORS[series_index % SERIES_COLORS.len()];
            let name = panel.table.columns()[column].name.clone();

            chart
                .draw_series(LineSeries::new(
                    panel
                        .table
                        .column_values(column)
                        .enumerate()
                        .map(|(frame, value)| (frame as f64, value)),
                    color.stroke_width(self.style.line_width),
                ))?
                .label(name)
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(LEGEND_LINE_WIDTH))
                });
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font((FONT, 12))
            .draw()?;

        Ok(())
    }
}
