use clap::{Arg, ArgAction, Command};
use indicatif::{MultiProgress, ProgressBar};
use indicatif_log_bridge::LogWrapper;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use libps_plotter::config::Config;
use libps_plotter::process::{process, RunArgs};
use libps_plotter::worker_status::WorkerStatus;

fn make_template_config(path: &Path) {
    let config = Config::default();
    let yaml_str = serde_yaml::to_string(&config).unwrap();
    let mut file = File::create(path).expect("Could create template config file!");
    file.write_all(yaml_str.as_bytes())
        .expect("Failed to write yaml data to file!");
}

fn main() {
    // Create a cli
    let matches = Command::new("ps_plotter_cli")
        .arg_required_else_help(true)
        .subcommand(Command::new("new").about("Make a template configuration yaml file"))
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .default_value("config.yml")
                .help("Path to the configuration file"),
        )
        .arg(
            Arg::new("run")
                .short('r')
                .long("run")
                .value_parser(clap::value_parser!(i32))
                .help("Run number"),
        )
        .arg(
            Arg::new("fast")
                .short('f')
                .long("fast")
                .action(ArgAction::SetTrue)
                .help("Make only configured plots"),
        )
        .arg(
            Arg::new("skip")
                .short('s')
                .long("skip")
                .action(ArgAction::SetTrue)
                .help("Skip the plot loop, run only the mosaic and summary"),
        )
        .arg(
            Arg::new("table")
                .short('t')
                .long("table")
                .default_value("noise_summary.csv")
                .help("Path of the noise summary table"),
        )
        .arg(
            Arg::new("frequency")
                .short('q')
                .long("frequency")
                .value_parser(clap::value_parser!(i32))
                .default_value("0")
                .help("Noise frequency recorded in the summary row"),
        )
        .get_matches();

    // Initialize feedback
    let logger = simplelog::TermLogger::new(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );

    let pb_manager = MultiProgress::new();

    LogWrapper::new(pb_manager.clone(), logger)
        .try_init()
        .expect("Could not create logging/progress!");

    // Parse the cli
    let config_path = PathBuf::from(matches.get_one::<String>("config").expect("We have a default"));

    if let Some(("new", _)) = matches.subcommand() {
        log::info!(
            "Making a template config at {}...",
            config_path.to_string_lossy()
        );

        make_template_config(&config_path);
        log::info!("Done.");
        return;
    }

    let Some(run_number) = matches.get_one::<i32>("run").copied() else {
        log::error!("A run number is required (-r/--run)");
        return;
    };

    // Load our config, falling back to the built-in defaults
    let config = if config_path.exists() {
        log::info!("Loading config from {}...", config_path.to_string_lossy());
        match Config::read_config_file(&config_path) {
            Ok(c) => c,
            Err(e) => {
                log::error!("{e}");
                return;
            }
        }
    } else {
        log::info!(
            "No config at {}, using the built-in defaults.",
            config_path.to_string_lossy()
        );
        Config::default()
    };
    log::info!("Results Path: {}", config.results_path.to_string_lossy());
    log::info!("Plots Path: {}", config.plots_path.to_string_lossy());
    log::info!("Base Directory: {}", config.base_directory);
    log::info!("Run Number: {run_number}");

    let args = RunArgs {
        run_number,
        fast: matches.get_flag("fast"),
        skip_plot_loop: matches.get_flag("skip"),
        frequency: matches
            .get_one::<i32>("frequency")
            .copied()
            .expect("We have a default"),
        table_path: PathBuf::from(matches.get_one::<String>("table").expect("We have a default")),
    };

    // Setup the progress bar
    let pb = pb_manager.add(ProgressBar::new(100));
    let (tx, rx) = mpsc::channel::<WorkerStatus>();
    // Spawn the task!
    let handle = std::thread::spawn(move || process(config, args, tx));

    loop {
        match rx.recv_timeout(Duration::from_millis(200)) {
            Ok(status) => pb.set_position((status.progress * 100.0) as u64),
            Err(mpsc::RecvTimeoutError::Timeout) => (),
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    match handle.join() {
        Ok(Ok(_)) => log::info!("Successfully processed the run!"),
        Ok(Err(e)) => log::error!("Processing failed with error: {e}"),
        Err(_) => log::error!("Failed to join the processing task!"),
    }

    pb.finish();

    log::info!("Done.");
}
