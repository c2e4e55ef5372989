use std::path::PathBuf;
use std::sync::mpsc::Sender;

use super::config::Config;
use super::constants::{HYBRID_PATTERN, MODULE_PATTERN};
use super::error::ProcessorError;
use super::hdf_reader::ResultsStore;
use super::mosaic::compose_module_grid;
use super::render::PngRenderer;
use super::summary::append_summary;
use super::tree::DirectoryNode;
use super::walker::HierarchyWalker;
use super::worker_status::WorkerStatus;

/// Per-invocation arguments, validated by the caller (the CLI)
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub run_number: i32,
    pub fast: bool,
    pub skip_plot_loop: bool,
    pub frequency: i32,
    pub table_path: PathBuf,
}

/// The main loop of ps_plotter.
///
/// Opens the results store of one run, walks the detector tree rendering
/// every measurement, composes one noise mosaic per module, and appends the
/// run's noise summary row. Store-open and missing-root failures abort with
/// no output; everything deeper is a warning and the run continues with
/// whatever was found.
pub fn process_run(
    config: &Config,
    args: &RunArgs,
    tx: &Sender<WorkerStatus>,
) -> Result<(), ProcessorError> {
    let input_path = config.results_file(args.run_number);
    log::info!("Opening results store {}...", input_path.display());
    let store = ResultsStore::open(&input_path)?;
    let root = store.read_tree(&config.base_directory)?;

    let output_root = config.output_directory(args.run_number);
    std::fs::create_dir_all(&output_root)?;
    tx.send(WorkerStatus::new(0.0, args.run_number))?;

    if args.skip_plot_loop {
        log::info!("Skipping the plot loop.");
    } else {
        let renderer = PngRenderer::default();
        let walker = HierarchyWalker::new(config, &renderer, args.run_number, args.fast);
        walker.walk(&root, &output_root)?;
    }
    tx.send(WorkerStatus::new(0.7, args.run_number))?;

    let modules = root.subdirectories(MODULE_PATTERN);
    let n_modules = modules.len().max(1);
    for (index, module) in modules.iter().enumerate() {
        let module_dir = output_root.join(&module.name);
        std::fs::create_dir_all(&module_dir)?;
        compose_module_grid(module, &module_dir, args.run_number, &config.layout)?;
        tx.send(WorkerStatus::new(
            0.7 + 0.2 * (index + 1) as f32 / n_modules as f32,
            args.run_number,
        ))?;
    }

    let hybrids: Vec<&DirectoryNode> = modules
        .iter()
        .flat_map(|module| module.subdirectories(HYBRID_PATTERN))
        .collect();
    append_summary(
        &hybrids,
        &config.summary.measurement,
        &args.table_path,
        args.run_number,
        args.frequency,
        &config.summary,
    )?;

    tx.send(WorkerStatus::new(1.0, args.run_number))?;
    log::info!("Finished processing run {}.", args.run_number);
    Ok(())
}

/// The function to be called by a separate thread (typically the CLI).
pub fn process(
    config: Config,
    args: RunArgs,
    tx: Sender<WorkerStatus>,
) -> Result<(), ProcessorError> {
    log::info!("Processing run {}...", args.run_number);
    process_run(&config, &args, &tx)
}
