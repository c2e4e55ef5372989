//! # ps_plotter
//!
//! ps_plotter is the plotting and summary tool for PS-module readout runs.
//! It opens the hierarchical results store produced by the DAQ for one run,
//! renders every recorded measurement as a PNG, composes the per-chip pixel
//! noise fields of each module into a single shared-scale mosaic, and appends
//! per-hybrid noise figures to a growing summary table.
//!
//! ## Input
//!
//! One HDF5 results store per run at `Results/Run_<n>/Results.h5`, laid out
//! along the detector hierarchy:
//!
//! ```text
//! Results.h5
//! |---- Detector
//! |    |---- Board_0
//! |    |    |---- OpticalGroup_#            (module)
//! |    |    |    |---- <module dsets>
//! |    |    |    |---- Hybrid_#             (front-end hybrid)
//! |    |    |    |    |---- <hybrid dsets>
//! |    |    |    |    |---- SSA_#           (strip chip)
//! |    |    |    |    |---- MPA_#           (pixel chip)
//! |    |    |    |    |    |---- <chip dsets, 1D or 2D>
//! ```
//!
//! 1D datasets are rendered as line plots, 2D datasets as heat maps. The
//! store is decoded once into a closed tree of directories and measurements;
//! a store that cannot be opened, or a missing `Detector/Board_0`, aborts the
//! run with no output. Anything missing deeper in the tree is a warning and
//! processing continues with whatever was found.
//!
//! ## Output
//!
//! - `Plots/Run_<n>/<module>/<hybrid>/<chip>/<measurement>.png`, one image
//!   per measurement, directories mirroring the hierarchy, parentheses
//!   stripped from filenames.
//! - `Plots/Run_<n>/<module>/PixelNoiseMosaic.png`, all pixel noise maps of
//!   one module on a shared color scale with serpentine position labels.
//! - A summary table (CSV) with the header
//!   `RunNumber,Date,Temperature,Noise Form,Frequency,Amplitude,LV Power`
//!   followed by one `Hybrid <n>` column per discovered hybrid, re-sorted
//!   ascending by hybrid id on every append.
//!
//! ## Configuration
//!
//! Settings are read from a YAML file (see [`config::Config`]); a template
//! can be generated with the CLI's `new` subcommand. The plot-style table is
//! an ordered list of substring patterns resolved first-match-wins; detector
//! layout constants (hybrids per module, chips per hybrid, the noise color
//! ceiling) and the fixed summary-row test conditions live in the same file.
pub mod config;
pub mod constants;
pub mod error;
pub mod hdf_reader;
pub mod mosaic;
pub mod process;
pub mod render;
pub mod summary;
pub mod tree;
pub mod walker;
pub mod worker_status;
