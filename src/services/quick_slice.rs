use crate::models::{Category, Config, SessionState};
use crate::services::engine::{EngineError, SliceJob, SlicingEngine, ValidationError};
use crate::store::PresetStore;
use crate::ui::Interaction;
use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Mode flags for one quick-slice invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuickSliceOptions {
    /// Repeat the last job's input and output paths, no dialogs.
    pub reslice: bool,

    /// Prompt for the output destination instead of using the default.
    pub save_as: bool,

    /// Produce vector output instead of machine code.
    pub export_svg: bool,
}

/// Terminal result of a quick-slice run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed {
        output_path: Utf8PathBuf,
        /// Engine warnings, batched and already reported to the user.
        warnings: Vec<String>,
    },
    /// The user backed out of a dialog. Not an error: nothing was mutated.
    Cancelled,
}

/// Failures of the quick-slice workflow.
#[derive(Error, Debug)]
pub enum QuickSliceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no file sliced yet; slice a model before reslicing")]
    NoPriorInput,

    #[error("previous input file no longer exists: {0}")]
    InputMissing(Utf8PathBuf),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Workflow stages, in execution order. Terminal cancellation and failure
/// are reachable from every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Validating,
    SelectingInput,
    ResolvingOutput,
    Slicing,
    Done,
}

impl Stage {
    fn name(&self) -> &'static str {
        match self {
            Stage::Validating => "validating",
            Stage::SelectingInput => "selecting_input",
            Stage::ResolvingOutput => "resolving_output",
            Stage::Slicing => "slicing",
            Stage::Done => "done",
        }
    }
}

/// Combined view of the selected presets across the three categories, later
/// categories overriding earlier ones on key collisions.
pub fn active_config(store: &dyn PresetStore) -> Config {
    let mut config = Config::new();
    for category in Category::ALL {
        if let Some(name) = store.selected(category) {
            match store.get(category, name) {
                Some(preset) => config.merge(&preset.config),
                None => tracing::warn!(
                    "Selected {} preset \"{}\" is not registered",
                    category,
                    name
                ),
            }
        }
    }
    config
}

/// One-shot slice workflow: validate the active config, resolve an input
/// model and output path, run the engine, remember the paths for reslice.
///
/// Validation runs before anything else so an invalid config never opens a
/// dialog or touches a file. The workflow never writes to the session or the
/// preset store on cancellation or failure; paths are recorded only after
/// the engine finishes.
pub struct QuickSlice<'a> {
    engine: &'a dyn SlicingEngine,
    interaction: &'a dyn Interaction,
}

impl<'a> QuickSlice<'a> {
    pub fn new(engine: &'a dyn SlicingEngine, interaction: &'a dyn Interaction) -> Self {
        Self {
            engine,
            interaction,
        }
    }

    pub fn run(
        &self,
        config: &Config,
        options: QuickSliceOptions,
        session: &mut SessionState,
    ) -> Result<JobOutcome, QuickSliceError> {
        self.enter(Stage::Validating, options);
        self.engine.validate(config)?;

        self.enter(Stage::SelectingInput, options);
        let input_path = match self.select_input(options, session)? {
            Some(path) => path,
            None => return Ok(self.cancelled(Stage::SelectingInput)),
        };

        self.enter(Stage::ResolvingOutput, options);
        let output_path = match self.resolve_output(&input_path, config, options, session) {
            Some(path) => path,
            None => return Ok(self.cancelled(Stage::ResolvingOutput)),
        };

        self.enter(Stage::Slicing, options);
        let job = SliceJob {
            input_path: input_path.clone(),
            config: config.clone(),
            output_path: output_path.clone(),
        };
        let mut warnings: Vec<String> = Vec::new();
        {
            // The indicator handle is scoped to the engine call; dropping it
            // dismisses the indicator on the error path as well.
            let mut progress = self.interaction.begin_progress("Slicing…");
            let mut on_progress = |percent: u8, message: &str| progress.update(percent, message);
            let mut on_warning = |message: &str| {
                tracing::warn!("Engine warning: {}", message);
                warnings.push(message.to_string());
            };
            self.engine.slice(&job, &mut on_progress, &mut on_warning)?;
        }

        self.enter(Stage::Done, options);
        // SVG exports stay out of the reslice chain: the remembered input is
        // only updated for machine-code jobs.
        let remembered_input = (!options.export_svg).then(|| input_path.clone());
        session.record_job(remembered_input, output_path.clone());

        self.interaction.notify(&success_message(&output_path, options, &warnings));
        Ok(JobOutcome::Completed {
            output_path,
            warnings,
        })
    }

    /// Input path for this run, or `None` on user cancellation.
    fn select_input(
        &self,
        options: QuickSliceOptions,
        session: &SessionState,
    ) -> Result<Option<Utf8PathBuf>, QuickSliceError> {
        if options.reslice {
            // Checked before touching the filesystem.
            let last = session
                .last_input_path
                .clone()
                .ok_or(QuickSliceError::NoPriorInput)?;
            if !last.exists() {
                return Err(QuickSliceError::InputMissing(last));
            }
            return Ok(Some(last));
        }

        let start_dir = session
            .last_input_path
            .as_deref()
            .and_then(Utf8Path::parent);
        Ok(self.interaction.pick_input_file(start_dir))
    }

    /// Output path for this run, or `None` on user cancellation.
    fn resolve_output(
        &self,
        input_path: &Utf8Path,
        config: &Config,
        options: QuickSliceOptions,
        session: &SessionState,
    ) -> Option<Utf8PathBuf> {
        let default_output =
            self.engine
                .default_output_path(input_path, config, options.export_svg);

        if options.save_as {
            let extension = if options.export_svg { "svg" } else { "gcode" };
            let mut suggested = default_output;
            suggested.set_extension(extension);
            return self.interaction.pick_output_file(&suggested, extension);
        }

        if options.reslice {
            return Some(session.last_output_path.clone().unwrap_or(default_output));
        }

        Some(default_output)
    }

    fn cancelled(&self, stage: Stage) -> JobOutcome {
        tracing::info!("Quick slice cancelled at {}", stage.name());
        JobOutcome::Cancelled
    }

    fn enter(&self, stage: Stage, options: QuickSliceOptions) {
        tracing::debug!(
            stage = stage.name(),
            reslice = options.reslice,
            save_as = options.save_as,
            export_svg = options.export_svg,
            "quick slice"
        );
    }
}

fn success_message(
    output_path: &Utf8Path,
    options: QuickSliceOptions,
    warnings: &[String],
) -> String {
    let kind = if options.export_svg { "SVG" } else { "G-code" };
    let mut message = format!("{kind} file exported to {output_path}");
    if !warnings.is_empty() {
        message.push_str("\n\nWarnings:\n");
        message.push_str(&warnings.join("\n"));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Preset;
    use crate::store::MemoryPresetStore;

    #[test]
    fn test_active_config_merge_order() {
        let mut store = MemoryPresetStore::new();

        let mut print = Config::new();
        print.set("layer_height", "0.2");
        print.set("notes", "from print");
        store.put(Preset::new("Fast", Category::Print, print));
        store.set_selected(Category::Print, "Fast");

        let mut printer = Config::new();
        printer.set("notes", "from printer");
        store.put(Preset::new("MK3", Category::Printer, printer));
        store.set_selected(Category::Printer, "MK3");

        let config = active_config(&store);
        assert_eq!(config.get("layer_height"), Some("0.2"));
        assert_eq!(config.get("notes"), Some("from printer"));
    }

    #[test]
    fn test_active_config_skips_dangling_selection() {
        let mut store = MemoryPresetStore::new();
        store.set_selected(Category::Filament, "Gone");

        let config = active_config(&store);
        assert!(config.is_empty());
    }

    #[test]
    fn test_success_message_batches_warnings() {
        let message = success_message(
            Utf8Path::new("/out/part.gcode"),
            QuickSliceOptions::default(),
            &["thin walls detected".to_string(), "slow bridging".to_string()],
        );
        assert!(message.starts_with("G-code file exported to /out/part.gcode"));
        assert!(message.contains("thin walls detected"));
        assert!(message.contains("slow bridging"));
    }
}
