use crate::utils::ProgressStyleTemplate;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

pub trait MultiProgressNew {
    fn add_with_style(&self, pb: ProgressBar, style: ProgressStyle) -> ProgressBar;

    /// Single line for run stage messages.
    fn status_line(&self) -> ProgressBar {
        self.add_with_style(ProgressBar::new_spinner(), ProgressStyleTemplate::only_message())
    }

    /// One tick per collected member.
    fn members_bar(&self, members: usize) -> ProgressBar {
        self.add_with_style(ProgressBar::new(members as u64), ProgressStyleTemplate::members_bar())
    }
}

impl MultiProgressNew for MultiProgress {
    fn add_with_style(&self, pb: ProgressBar, style: ProgressStyle) -> ProgressBar {
        let pb = self.add(pb);
        pb.set_style(style);
        pb.enable_steady_tick(TICK);
        pb
    }
}
