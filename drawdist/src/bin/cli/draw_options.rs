use structopt::StructOpt;
use std::path::PathBuf;

#[derive(Clone, StructOpt)]
#[structopt(
name = "drawdist",
about = "Draws integral distinguishers of QARMA-v2 found by a CP solver as TikZ diagrams."
)]
pub enum DrawOptions {
    #[structopt(name = "draw")]
    Draw {
        #[structopt(short = "i", long = "input")]
        /// JSON solution written by the CP solver.
        input: PathBuf,

        #[structopt(flatten)]
        rounds: RoundOptions,

        #[structopt(short = "o", long = "out", default_value = "output.tex")]
        /// Output file for the TikZ code. The attack summary is written next to it.
        out_file: PathBuf,

        #[structopt(long = "id", default_value = "1")]
        /// Id of the distinguisher, used in its name.
        id: usize,

        #[structopt(short = "s")]
        /// Will hide the attack summary if set. The progress spinner still shows.
        silent_mode: bool,

        #[structopt(long = "log-level")]
        /// Log filter, e.g. "debug" or "trail=trace". Overrides RUST_LOG.
        log_level: Option<String>,
    },

    #[structopt(name = "batch")]
    Batch {
        #[structopt(short = "f", long = "folder")]
        /// Folder holding the JSON solutions. Every *.json file in it is drawn.
        in_folder: PathBuf,

        #[structopt(flatten)]
        rounds: RoundOptions,

        #[structopt(short = "o", long = "out")]
        /// Folder to write the TikZ files and summaries to.
        /// File names are taken from the solution files.
        out_folder: PathBuf,

        #[structopt(long = "log-level")]
        /// Log filter, e.g. "debug" or "trail=trace". Overrides RUST_LOG.
        log_level: Option<String>,
    },
}

#[derive(Clone, StructOpt)]
pub struct RoundOptions {
    #[structopt(short = "v", long = "variant", default_value = "qarma64")]
    /// Cipher variant: qarma64 or qarma128.
    pub variant: String,

    #[structopt(long = "ru")]
    /// Number of rounds for EU, at least 2.
    pub ru: usize,

    #[structopt(long = "rl")]
    /// Number of rounds for EL, at least 2.
    pub rl: usize,

    #[structopt(long = "kr", default_value = "14")]
    /// Number of rounds for key recovery.
    pub kr: usize,

    #[structopt(long = "npt", default_value = "1")]
    /// Upper bound on how often a lazy tweak cell may be active.
    pub npt: usize,

    #[structopt(long = "legend")]
    /// Draw the colour legend below the trail.
    pub legend: bool,
}
