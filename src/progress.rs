use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress reporting for the iterative kernel loops.  Disabled instances
/// cost nothing, so callers thread a single `indicator` flag through.
pub struct KernelProgress {
    pb: Option<ProgressBar>,
}

impl KernelProgress {
    pub fn new(work: u64, enabled: bool) -> Self {
        let pb = if enabled {
            let pb = ProgressBar::new(work);
            let style = ProgressStyle::default_bar()
                .template("[{msg}] {wide_bar} {pos:>5}/{len:5} - Elapsed: {elapsed_precise}")
                .expect("Shouldn't fail!");

            pb.set_style(style);

            // Update in separate thread
            pb.enable_steady_tick(Duration::from_millis(200));
            Some(pb)
        } else {
            None
        };

        KernelProgress { pb }
    }

    pub fn status(&self, message: String) {
        if let Some(pb) = &self.pb {
            pb.set_message(message);
        }
    }

    pub fn inc(&self) {
        if let Some(pb) = &self.pb {
            pb.inc(1);
        }
    }

    pub fn finish(&self) {
        if let Some(pb) = &self.pb {
            pb.finish_and_clear();
        }
    }
}
