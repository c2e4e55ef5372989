use std::path::Path;

use super::config::{Config, PlotOptions};
use super::constants::{HYBRID_PATTERN, MODULE_PATTERN, PIXEL_CHIP_PATTERN, STRIP_CHIP_PATTERN};
use super::error::WalkError;
use super::render::Renderer;
use super::tree::{DirectoryNode, Measurement};

/// HierarchyWalker descends the fixed-depth detector tree and renders every
/// measurement it encounters.
///
/// The traversal pattern is fixed: optical groups at the root, hybrids inside
/// each group, then strip chips and pixel chips as two independent sibling
/// groups inside each hybrid. Children are visited in the store's enumeration
/// order. Output directories mirror the hierarchy.
pub struct HierarchyWalker<'a, R: Renderer> {
    config: &'a Config,
    renderer: &'a R,
    run_number: i32,
    fast: bool,
}

impl<'a, R: Renderer> HierarchyWalker<'a, R> {
    /// Create a new HierarchyWalker.
    ///
    /// With fast set, measurements without a matching style entry are
    /// silently dropped instead of rendered with defaults.
    pub fn new(config: &'a Config, renderer: &'a R, run_number: i32, fast: bool) -> Self {
        Self {
            config,
            renderer,
            run_number,
            fast,
        }
    }

    /// Walk the whole tree and render one image per measurement.
    pub fn walk(&self, root: &DirectoryNode, output_root: &Path) -> Result<(), WalkError> {
        log::info!("Making all plots...");
        let modules = root.subdirectories(MODULE_PATTERN);
        if modules.is_empty() {
            log::warn!("No optical groups found under {}", root.name);
        }
        for module in modules {
            self.walk_module(module, output_root)?;
        }
        log::info!("Done making plots.");
        Ok(())
    }

    /// Render one module subtree into output_root/<module name>/...
    pub fn walk_module(
        &self,
        module: &DirectoryNode,
        output_root: &Path,
    ) -> Result<(), WalkError> {
        let module_dir = output_root.join(&module.name);
        std::fs::create_dir_all(&module_dir)?;
        self.plot_directory(module, &module_dir)?;

        let hybrids = module.subdirectories(HYBRID_PATTERN);
        if hybrids.len() != self.config.layout.hybrids_per_module {
            log::warn!(
                "{} has {} hybrids, expected {}",
                module.name,
                hybrids.len(),
                self.config.layout.hybrids_per_module
            );
        }
        for hybrid in hybrids {
            let hybrid_dir = module_dir.join(&hybrid.name);
            std::fs::create_dir_all(&hybrid_dir)?;
            self.plot_directory(hybrid, &hybrid_dir)?;

            for chip_pattern in [STRIP_CHIP_PATTERN, PIXEL_CHIP_PATTERN] {
                for chip in hybrid.subdirectories(chip_pattern) {
                    let chip_dir = hybrid_dir.join(&chip.name);
                    std::fs::create_dir_all(&chip_dir)?;
                    self.plot_directory(chip, &chip_dir)?;
                }
            }
        }
        Ok(())
    }

    fn plot_directory(&self, node: &DirectoryNode, out_dir: &Path) -> Result<(), WalkError> {
        for measurement in node.measurements() {
            self.plot_measurement(measurement, out_dir)?;
        }
        Ok(())
    }

    fn plot_measurement(&self, measurement: &Measurement, out_dir: &Path) -> Result<(), WalkError> {
        let options = match self.config.resolve_style(measurement.name()) {
            Some(options) => options,
            // In fast mode an unmatched measurement is filtered, not failed
            None if self.fast => return Ok(()),
            None => PlotOptions::default(),
        };
        match measurement {
            Measurement::Series(series) => {
                self.renderer
                    .render_series(self.run_number, series, &options, out_dir)?
            }
            Measurement::Field(field) => {
                self.renderer
                    .render_field(self.run_number, field, &options, out_dir)?
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlotStyle;
    use crate::error::RenderError;
    use crate::tree::{Field, Series, TreeNode};
    use ndarray::{arr1, arr2};
    use std::cell::RefCell;
    use std::path::PathBuf;

    /// Records what would have been drawn instead of touching a backend
    #[derive(Default)]
    struct RecordingRenderer {
        rendered: RefCell<Vec<(String, PathBuf)>>,
    }

    impl Renderer for RecordingRenderer {
        fn render_series(
            &self,
            _run_number: i32,
            series: &Series,
            _options: &PlotOptions,
            out_dir: &Path,
        ) -> Result<(), RenderError> {
            self.rendered
                .borrow_mut()
                .push((series.name.clone(), out_dir.to_path_buf()));
            Ok(())
        }

        fn render_field(
            &self,
            _run_number: i32,
            field: &Field,
            _options: &PlotOptions,
            out_dir: &Path,
        ) -> Result<(), RenderError> {
            self.rendered
                .borrow_mut()
                .push((field.name.clone(), out_dir.to_path_buf()));
            Ok(())
        }
    }

    fn series(name: &str) -> TreeNode {
        TreeNode::Measurement(Measurement::Series(Series {
            name: String::from(name),
            values: arr1(&[1.0, 2.0]),
        }))
    }

    fn field(name: &str) -> TreeNode {
        TreeNode::Measurement(Measurement::Field(Field {
            name: String::from(name),
            values: arr2(&[[1.0, 2.0], [3.0, 4.0]]),
        }))
    }

    fn example_tree() -> DirectoryNode {
        let mut chip = DirectoryNode::new("MPA_0");
        chip.children.push(field("2DPixelNoise_Chip(0)"));
        chip.children.push(series("SCurve_Chip(0)"));

        let mut strip = DirectoryNode::new("SSA_1");
        strip.children.push(series("StripNoise_Chip(1)"));

        let mut hybrid = DirectoryNode::new("Hybrid_1");
        hybrid.children.push(series("NoiseDistribution_Hybrid(1)"));
        hybrid.children.push(TreeNode::Directory(strip));
        hybrid.children.push(TreeNode::Directory(chip));

        let mut module = DirectoryNode::new("OpticalGroup_0");
        module.children.push(series("ModuleOccupancy"));
        module.children.push(TreeNode::Directory(hybrid));

        let mut root = DirectoryNode::new("Board_0");
        root.children.push(TreeNode::Directory(module));
        root
    }

    fn config_matching_scurve_only() -> Config {
        let mut config = Config::default();
        config.plot_styles = vec![PlotStyle {
            pattern: String::from("SCurve"),
            title: None,
            x_label: Some(String::from("Channel Number")),
            y_label: Some(String::from("Threshold")),
            z_label: None,
        }];
        config
    }

    #[test]
    fn test_walk_renders_every_measurement() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_matching_scurve_only();
        let renderer = RecordingRenderer::default();
        let walker = HierarchyWalker::new(&config, &renderer, 42, false);
        walker.walk(&example_tree(), dir.path()).unwrap();

        let rendered = renderer.rendered.borrow();
        let names: Vec<&str> = rendered.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "ModuleOccupancy",
                "NoiseDistribution_Hybrid(1)",
                "StripNoise_Chip(1)",
                "2DPixelNoise_Chip(0)",
                "SCurve_Chip(0)",
            ]
        );
    }

    #[test]
    fn test_fast_mode_drops_unmatched_measurements() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_matching_scurve_only();
        let renderer = RecordingRenderer::default();
        let walker = HierarchyWalker::new(&config, &renderer, 42, true);
        walker.walk(&example_tree(), dir.path()).unwrap();

        let rendered = renderer.rendered.borrow();
        let names: Vec<&str> = rendered.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["SCurve_Chip(0)"]);
    }

    #[test]
    fn test_output_directories_mirror_hierarchy() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_matching_scurve_only();
        let renderer = RecordingRenderer::default();
        let walker = HierarchyWalker::new(&config, &renderer, 42, false);
        walker.walk(&example_tree(), dir.path()).unwrap();

        let rendered = renderer.rendered.borrow();
        let chip_target = rendered
            .iter()
            .find(|(name, _)| name == "SCurve_Chip(0)")
            .map(|(_, path)| path.clone())
            .unwrap();
        assert_eq!(
            chip_target,
            dir.path()
                .join("OpticalGroup_0")
                .join("Hybrid_1")
                .join("MPA_0")
        );
        assert!(chip_target.is_dir());
    }
}
