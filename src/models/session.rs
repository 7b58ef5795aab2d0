use camino::Utf8PathBuf;

/// Paths remembered across operations within one application run.
///
/// There is no teardown or persistence; the state resets on process restart.
/// Only the quick-slice orchestrator and the single-config load/export
/// operations write to it, always at the end of a successful operation, so a
/// cancelled or failed run leaves the previous values intact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Last standalone config file loaded or exported.
    pub last_config_path: Option<Utf8PathBuf>,

    /// Last quick-slice input model, reused by reslice.
    pub last_input_path: Option<Utf8PathBuf>,

    /// Last quick-slice output file, reused by reslice.
    pub last_output_path: Option<Utf8PathBuf>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed slice job.
    ///
    /// `input` is `None` for SVG exports, which stay out of the reslice chain:
    /// a later plain reslice repeats the last G-code job, not the SVG one.
    pub fn record_job(&mut self, input: Option<Utf8PathBuf>, output: Utf8PathBuf) {
        if let Some(input) = input {
            self.last_input_path = Some(input);
        }
        self.last_output_path = Some(output);
    }

    /// Record a standalone config file load or export.
    pub fn record_config(&mut self, path: Utf8PathBuf) {
        self.last_config_path = Some(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_job_updates_both_paths() {
        let mut session = SessionState::new();
        session.record_job(
            Some(Utf8PathBuf::from("/models/cube.stl")),
            Utf8PathBuf::from("/out/cube.gcode"),
        );

        assert_eq!(
            session.last_input_path.as_deref().map(|p| p.as_str()),
            Some("/models/cube.stl")
        );
        assert_eq!(
            session.last_output_path.as_deref().map(|p| p.as_str()),
            Some("/out/cube.gcode")
        );
    }

    #[test]
    fn test_record_svg_job_keeps_previous_input() {
        let mut session = SessionState::new();
        session.record_job(
            Some(Utf8PathBuf::from("/models/cube.stl")),
            Utf8PathBuf::from("/out/cube.gcode"),
        );
        session.record_job(None, Utf8PathBuf::from("/out/cube.svg"));

        assert_eq!(
            session.last_input_path.as_deref().map(|p| p.as_str()),
            Some("/models/cube.stl")
        );
        assert_eq!(
            session.last_output_path.as_deref().map(|p| p.as_str()),
            Some("/out/cube.svg")
        );
    }
}
