use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

pub struct ProgressWindow {
    total_pb: ProgressBar,
    level_pb: ProgressBar,

    total_len: usize,
    level_len: usize,
    level: Option<usize>,
}

impl ProgressWindow {
    pub fn new() -> Self {
        let multi_pb = MultiProgress::new();
        let sty = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {percent}%")
            .progress_chars("##-");

        let total_pb = multi_pb.add(ProgressBar::new(100));
        total_pb.set_style(sty);

        let sty = ProgressStyle::default_bar()
            .template(" level {msg:>3} {bar:40.cyan/blue} {pos}/{len} passes")
            .progress_chars("##-");
        let level_pb = multi_pb.add(ProgressBar::new(100));
        level_pb.set_style(sty);

        std::thread::spawn(move || {
            let _ = multi_pb.join();
        });

        Self {
            total_pb,
            level_pb,
            total_len: 100,
            level_len: 100,
            level: None,
        }
    }
}

impl Drop for ProgressWindow {
    fn drop(&mut self) {
        self.total_pb.finish();
        self.level_pb.finish();
    }
}

impl patch_inpaint::InpaintProgress for ProgressWindow {
    fn update(&mut self, update: patch_inpaint::ProgressUpdate<'_>) {
        if update.total.total != self.total_len {
            self.total_len = update.total.total;
            self.total_pb.set_length(self.total_len as u64);
        }

        if update.stage.total != self.level_len {
            self.level_len = update.stage.total;
            self.level_pb.set_length(self.level_len as u64);
        }

        if self.level != Some(update.level) {
            self.level = Some(update.level);
            self.level_pb.set_message(&update.level.to_string());
        }

        self.total_pb.set_position(update.total.current as u64);
        self.level_pb.set_position(update.stage.current as u64);
    }
}
