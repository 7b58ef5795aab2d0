use super::{Interaction, ProgressHandle};
use camino::{Utf8Path, Utf8PathBuf};

/// Production interaction layer backed by native `rfd` dialogs.
#[derive(Debug, Default)]
pub struct NativeInteraction;

impl NativeInteraction {
    pub fn new() -> Self {
        Self
    }
}

impl Interaction for NativeInteraction {
    fn pick_input_file(&self, start_dir: Option<&Utf8Path>) -> Option<Utf8PathBuf> {
        let mut dialog = rfd::FileDialog::new()
            .set_title("Choose a model file to slice")
            .add_filter("Model files", &["stl", "obj", "amf"]);
        if let Some(dir) = start_dir {
            dialog = dialog.set_directory(dir.as_std_path());
        }
        let picked = dialog.pick_file()?;
        match Utf8PathBuf::try_from(picked) {
            Ok(path) => Some(path),
            Err(error) => {
                tracing::warn!("Ignoring non-UTF-8 input path: {}", error);
                None
            }
        }
    }

    fn pick_output_file(&self, suggested: &Utf8Path, extension: &str) -> Option<Utf8PathBuf> {
        let mut dialog = rfd::FileDialog::new()
            .set_title("Save output as")
            .add_filter(extension.to_uppercase(), &[extension]);
        if let Some(dir) = suggested.parent() {
            dialog = dialog.set_directory(dir.as_std_path());
        }
        if let Some(name) = suggested.file_name() {
            dialog = dialog.set_file_name(name);
        }
        let picked = dialog.save_file()?;
        match Utf8PathBuf::try_from(picked) {
            Ok(path) => Some(path),
            Err(error) => {
                tracing::warn!("Ignoring non-UTF-8 output path: {}", error);
                None
            }
        }
    }

    fn notify(&self, message: &str) {
        rfd::MessageDialog::new()
            .set_title(crate::APP_NAME)
            .set_description(message)
            .set_level(rfd::MessageLevel::Info)
            .show();
    }

    fn begin_progress(&self, title: &str) -> Box<dyn ProgressHandle> {
        tracing::info!("{}", title);
        Box::new(LogProgress {
            title: title.to_string(),
        })
    }
}

/// Progress handle that reports through the tracing pipeline.
///
/// A windowed frontend substitutes its own modal indicator; the drop-based
/// dismissal contract is the same either way.
struct LogProgress {
    title: String,
}

impl ProgressHandle for LogProgress {
    fn update(&mut self, percent: u8, message: &str) {
        tracing::info!("{}: {}% {}", self.title, percent, message);
    }
}

impl Drop for LogProgress {
    fn drop(&mut self) {
        tracing::debug!("Progress indicator dismissed: {}", self.title);
    }
}
