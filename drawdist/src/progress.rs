//! ProgressBar and other functionality to report the progress of the program

use std::io::Result as IoResult;
use std::sync::Arc;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// The subset of `indicatif::ProgressBar` the drawing runs use.
pub trait StyledProgressBar {
    fn inc(&self, delta: u64);
    fn set_message(&self, msg: &str);
    fn finish_with_message(&self, msg: &str);
    fn finish_and_clear(&self);
    fn println(&self, msg: &str);
}

#[derive(Debug, Clone)]
pub struct Progress {
    mp: Arc<MultiProgress>,
}

#[derive(Debug, Clone)]
pub struct MyStyledSpinner {
    spinner: ProgressBar,
}

#[derive(Debug, Clone)]
pub struct MyStyledProgressBar {
    pb: ProgressBar,
}

// ===============================================================================================

impl Progress {
    /// Bars are drawn to stderr, so they never mix with a summary printed to stdout.
    pub fn new() -> Self {
        Self {
            mp: Arc::new(MultiProgress::with_draw_target(ProgressDrawTarget::stderr())),
        }
    }

    pub fn new_main_spinner(&self) -> MyStyledSpinner {
        let spinner = self.mp.add(ProgressBar::new_spinner());
        spinner.set_style(Styles::MainSpinner.style());

        MyStyledSpinner::new(spinner)
    }

    pub fn new_progress_bar(&self, len: u64) -> MyStyledProgressBar {
        let pb = self.mp.add(ProgressBar::new(len));
        pb.set_style(Styles::Pb.style());

        MyStyledProgressBar::new(pb)
    }

    /// Blocks until every bar is finished. Must run on its own thread while bars are in use,
    /// otherwise nothing is drawn.
    pub fn join(&self) -> IoResult<()> {
        self.mp.join()
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

// ===============================================================================================

impl MyStyledSpinner {
    fn new(spinner: ProgressBar) -> MyStyledSpinner {
        Self {
            spinner,
        }
    }

    pub fn enable_steady_tick(&self, ms: u64) {
        self.spinner.enable_steady_tick(ms);
    }
}

impl StyledProgressBar for MyStyledSpinner {
    fn inc(&self, delta: u64) {self.spinner.inc(delta);}

    fn set_message(&self, msg: &str) {
        self.spinner.set_message(msg);
    }

    fn finish_with_message(&self, msg: &str) {
        self.spinner.finish_with_message(msg);
    }

    fn finish_and_clear(&self) {
        self.spinner.finish_and_clear();
    }

    fn println(&self, msg: &str) {
        self.spinner.println(msg);
    }
}

// ===============================================================================================

impl MyStyledProgressBar {
    fn new(pb: ProgressBar) -> MyStyledProgressBar {
        Self {
            pb,
        }
    }
}

impl StyledProgressBar for MyStyledProgressBar {
    /// Advances the position of a progress bar by delta.
    fn inc(&self, delta: u64) {self.pb.inc(delta);}

    /// Sets the current message of the progress bar.
    fn set_message(&self, msg: &str) {
        self.pb.set_message(msg);
    }

    /// Finishes the progress bar and sets a message.
    fn finish_with_message(&self, msg: &str) {
        self.pb.finish_with_message(msg);
    }

    /// Finishes the progress bar and completely clears it.
    fn finish_and_clear(&self) {
        self.pb.finish_and_clear();
    }

    /// Will print a log line above all progress bars. Does nothing while the bars are hidden.
    fn println(&self, msg: &str) {
        self.pb.println(msg);
    }
}

// ===============================================================================================

enum Styles {
    Pb,
    MainSpinner,
}

impl Styles {
    fn style(&self) -> ProgressStyle {
        use Styles::{Pb, MainSpinner};

        match self {
            Pb => {
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:60.cyan/yellow} {pos:>4}/{len:4} {msg}")
                    .progress_chars("#>-")
            },
            MainSpinner => {
                ProgressStyle::default_spinner()
                    .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
                    .template("[{elapsed_precise}] {msg} {spinner.green}")
            }
        }
    }
}
