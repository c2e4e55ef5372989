use plotters::prelude::*;
use plotters::style::colors::colormaps::ViridisRGB;
use plotters::style::FontTransform;
use std::path::{Path, PathBuf};

use super::config::LayoutConfig;
use super::constants::{HYBRID_PATTERN, PIXEL_CHIP_PATTERN};
use super::error::MosaicError;
use super::render::draw_color_bar;
use super::tree::{DirectoryNode, Field, Measurement};

const CELL_PX: u32 = 190;
const SIDE_PX: u32 = 120;
const ROW_GAP_PX: i32 = 4;

/// Column of a chip in the mosaic. The first hybrid row runs left-to-right,
/// the second right-to-left, mirroring the opposite mounting orientation of
/// adjacent hybrids.
pub fn serpentine_column(row: usize, chip: usize, n_columns: usize) -> usize {
    if row % 2 == 0 {
        chip
    } else {
        n_columns - 1 - chip
    }
}

/// Linear label index of a grid position. Follows the serpentine physical
/// path, so a fully populated 2x8 grid is numbered 0..15 continuously.
pub fn serpentine_label(row: usize, column: usize, n_columns: usize) -> usize {
    row * n_columns
        + if row % 2 == 0 {
            column
        } else {
            n_columns - 1 - column
        }
}

/// Compose all per-pixel-chip 2D noise fields of one module into a single
/// mosaic image with a shared color scale and serpentine position labels.
///
/// Missing hybrids, chips or noise fields leave their cells empty and only
/// produce warnings. Returns the written path, or None when the module had no
/// noise data at all (the composition is skipped, the run continues).
pub fn compose_module_grid(
    module: &DirectoryNode,
    out_dir: &Path,
    run_number: i32,
    layout: &LayoutConfig,
) -> Result<Option<PathBuf>, MosaicError> {
    let rows = layout.hybrids_per_module;
    let cols = layout.chips_per_hybrid;
    let cells = collect_noise_fields(module, layout);
    if cells.iter().all(|cell| cell.is_none()) {
        log::warn!("{}: no pixel noise data, skipping the mosaic", module.name);
        return Ok(None);
    }

    // Shared scale: observed global minimum up to the calibration ceiling
    let global_min = cells
        .iter()
        .flatten()
        .filter_map(|field| field.stats())
        .map(|stats| stats.min)
        .fold(f64::INFINITY, f64::min);
    let global_min = if global_min.is_finite() {
        global_min.min(layout.noise_ceiling)
    } else {
        0.0
    };
    let global_max = layout.noise_ceiling;
    let scale_span = (global_max - global_min).max(f64::EPSILON);

    let path = out_dir.join("PixelNoiseMosaic.png");
    let width = cols as u32 * CELL_PX + SIDE_PX;
    let height = rows as u32 * CELL_PX + 40;
    let root = BitMapBackend::new(&path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let (grid_area, side_area) = root.split_horizontally((cols as u32 * CELL_PX) as i32);
    let grid_area = grid_area.margin(14, 14, 14, 0);
    let areas = grid_area.split_evenly((rows, cols));

    for (row, col, field) in cells
        .iter()
        .enumerate()
        .map(|(idx, field)| (idx / cols, idx % cols, field))
    {
        // Row 0 (first hybrid) is the visually bottom row; the top row carries
        // the orientation-flipped content, so its label anchors to the top
        // edge while the bottom row anchors to the bottom edge.
        let visual_row = rows - 1 - row;
        let cell = areas[visual_row * cols + col].margin(ROW_GAP_PX, ROW_GAP_PX, 1, 1);

        if let Some(field) = field {
            draw_cell(&cell, field, global_min, scale_span)?;
        }

        let (_, cell_height) = cell.dim_in_pixel();
        let label_anchor = if visual_row == 0 {
            (6, 4)
        } else {
            (6, cell_height as i32 - 22)
        };
        let label = serpentine_label(row, col, cols);
        cell.draw(&Text::new(
            format!("{label}"),
            label_anchor,
            ("sans-serif", 18).into_font().color(&BLACK),
        ))?;
    }

    draw_color_bar(&side_area, global_min, global_max, None)?;
    let (side_width, side_height) = side_area.dim_in_pixel();
    side_area.draw(&Text::new(
        format!("Run {run_number}: {} pixel noise", module.name),
        (side_width as i32 - 16, side_height as i32 / 2 + 120),
        ("sans-serif", 20)
            .into_font()
            .transform(FontTransform::Rotate270),
    ))?;

    root.present()?;
    log::info!("Wrote noise mosaic for {}", module.name);
    Ok(Some(path.clone()))
}

/// Gather the per-chip noise fields of one module into row-major grid cells.
/// Count mismatches warn and the grid keeps whatever was found.
fn collect_noise_fields<'a>(
    module: &'a DirectoryNode,
    layout: &LayoutConfig,
) -> Vec<Option<&'a Field>> {
    let rows = layout.hybrids_per_module;
    let cols = layout.chips_per_hybrid;
    let mut cells: Vec<Option<&Field>> = vec![None; rows * cols];

    let hybrids = module.subdirectories(HYBRID_PATTERN);
    if hybrids.len() != rows {
        log::warn!(
            "{} has {} hybrids, expected {}",
            module.name,
            hybrids.len(),
            rows
        );
    }
    for (row, hybrid) in hybrids.into_iter().take(rows).enumerate() {
        let chips = hybrid.subdirectories(PIXEL_CHIP_PATTERN);
        if chips.len() != cols {
            log::warn!(
                "{} has {} pixel chips, expected {}",
                hybrid.name,
                chips.len(),
                cols
            );
        }
        for (chip_index, chip) in chips.into_iter().take(cols).enumerate() {
            let column = serpentine_column(row, chip_index, cols);
            let field = chip.measurements().find_map(|m| match m {
                Measurement::Field(f) if f.name.contains(&layout.noise_map_marker) => Some(f),
                _ => None,
            });
            if field.is_none() {
                log::warn!("{} has no {} field", chip.name, layout.noise_map_marker);
            }
            cells[row * cols + column] = field;
        }
    }
    cells
}

fn draw_cell(
    cell: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    field: &Field,
    global_min: f64,
    scale_span: f64,
) -> Result<(), MosaicError> {
    let (rows, cols) = field.shape();
    // No mesh is configured: per-cell tick labels are redundant under the
    // shared scale and position labels
    let mut chart = ChartBuilder::on(cell)
        .margin(1)
        .build_cartesian_2d(0f64..cols.max(1) as f64, 0f64..rows.max(1) as f64)
        .map_err(|e| MosaicError::DrawError(e.to_string()))?;
    for ((row, col), value) in field.values.indexed_iter() {
        if !value.is_finite() {
            continue;
        }
        let norm = ((value - global_min) / scale_span).clamp(0.0, 1.0);
        chart.draw_series(std::iter::once(Rectangle::new(
            [
                (col as f64, row as f64),
                ((col + 1) as f64, (row + 1) as f64),
            ],
            ViridisRGB.get_color(norm).filled(),
        )))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeNode;
    use ndarray::arr2;

    #[test]
    fn test_serpentine_column() {
        for i in 0..8 {
            assert_eq!(serpentine_column(0, i, 8), i);
            assert_eq!(serpentine_column(1, i, 8), 7 - i);
        }
    }

    #[test]
    fn test_serpentine_labels_follow_physical_path() {
        // Chips in discovery order per hybrid map onto a continuous 0..15
        // numbering along the serpentine path
        let mut labels = Vec::new();
        for row in 0..2 {
            for chip in 0..8 {
                let column = serpentine_column(row, chip, 8);
                labels.push(serpentine_label(row, column, 8));
            }
        }
        assert_eq!(labels, (0..16).collect::<Vec<usize>>());
    }

    fn chip_with_noise(name: &str, peak: f64) -> DirectoryNode {
        let mut chip = DirectoryNode::new(name);
        chip.children
            .push(TreeNode::Measurement(Measurement::Field(Field {
                name: String::from("2DPixelNoise_Chip"),
                values: arr2(&[[0.0, peak], [0.0, 0.0]]),
            })));
        chip
    }

    fn module_with_hybrids(chips_per_hybrid: &[usize]) -> DirectoryNode {
        let mut module = DirectoryNode::new("OpticalGroup_0");
        for (h, n_chips) in chips_per_hybrid.iter().enumerate() {
            let mut hybrid = DirectoryNode::new(format!("Hybrid_{h}"));
            for c in 0..*n_chips {
                hybrid
                    .children
                    .push(TreeNode::Directory(chip_with_noise(&format!("MPA_{c}"), 1.0)));
            }
            module.children.push(TreeNode::Directory(hybrid));
        }
        module
    }

    #[test]
    fn test_collect_places_cells_serpentine() {
        let module = module_with_hybrids(&[8, 8]);
        let layout = LayoutConfig::default();
        let cells = collect_noise_fields(&module, &layout);
        assert_eq!(cells.len(), 16);
        assert!(cells.iter().all(|cell| cell.is_some()));
    }

    #[test]
    fn test_collect_with_partial_module() {
        // One hybrid missing entirely, the other short on chips: the grid is
        // built from what was found
        let module = module_with_hybrids(&[3]);
        let layout = LayoutConfig::default();
        let cells = collect_noise_fields(&module, &layout);
        assert_eq!(cells.iter().filter(|cell| cell.is_some()).count(), 3);
        assert!(cells[0].is_some());
        assert!(cells[2].is_some());
        assert!(cells[8].is_none());
    }

    #[test]
    fn test_chip_without_marker_leaves_cell_empty() {
        let mut module = DirectoryNode::new("OpticalGroup_0");
        let mut hybrid = DirectoryNode::new("Hybrid_0");
        hybrid
            .children
            .push(TreeNode::Directory(DirectoryNode::new("MPA_0")));
        module.children.push(TreeNode::Directory(hybrid));
        let cells = collect_noise_fields(&module, &LayoutConfig::default());
        assert!(cells.iter().all(|cell| cell.is_none()));
    }

    #[test]
    fn test_no_data_skips_composition() {
        let dir = tempfile::tempdir().unwrap();
        let module = DirectoryNode::new("OpticalGroup_0");
        let written =
            compose_module_grid(&module, dir.path(), 42, &LayoutConfig::default()).unwrap();
        assert!(written.is_none());
        assert!(!dir.path().join("PixelNoiseMosaic.png").exists());
    }
}
