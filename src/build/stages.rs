//! Stage execution.
//!
//! Every stage follows the same shape: select sources with the configured
//! globs, run them through zero or more transforms, and write the results
//! below the stage's output directory.

use crate::build::discovery::{discover_sources, SourceFile};
use crate::build::{
    BuildContext, NullObserver, Stage, StageError, StageEvent, StageObserver, StageResult,
};
use crate::config::{AssetClass, OutputStyle};
use crate::transform::{inline_source_map, Transforms};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Warning attached to a stage whose globs matched nothing.
pub const NO_SOURCES: &str = "no sources matched";

/// Files written and warnings raised by one stage body.
#[derive(Debug, Default)]
struct StageOutput {
    outputs: Vec<PathBuf>,
    warnings: Vec<String>,
}

impl StageOutput {
    fn missing(what: String) -> Self {
        Self { outputs: vec![], warnings: vec![what] }
    }
}

/// Runs individual stages against a [`BuildContext`].
///
/// Each call emits `Started` followed by `Completed` or `Failed` to the
/// runner's observer.
#[derive(Clone)]
pub struct StageRunner {
    context: BuildContext,
    transforms: Transforms,
    observer: Arc<dyn StageObserver>,
}

impl StageRunner {
    /// Create a runner with the bundled transforms and no observer.
    pub fn new(context: BuildContext) -> Self {
        let transforms = Transforms::new(&context.config().images);
        Self { context, transforms, observer: Arc::new(NullObserver) }
    }

    /// Replace the transforms.
    pub fn with_transforms(mut self, transforms: Transforms) -> Self {
        self.transforms = transforms;
        self
    }

    /// Set the observer receiving stage events.
    pub fn with_observer(mut self, observer: Arc<dyn StageObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The build context.
    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    /// Run one stage to completion.
    pub fn run(&self, stage: Stage) -> Result<StageResult, StageError> {
        self.observer.on_event(&StageEvent::Started { stage });
        let start = Instant::now();

        let body = match stage {
            Stage::Style => self.style(),
            Stage::Css => self.css(),
            Stage::Js => self.js(),
            Stage::Html => self.copy(AssetClass::Html),
            Stage::Fonts => self.copy(AssetClass::Fonts),
            Stage::Img => self.img(),
            Stage::CleanBuild => self.clean_build(),
        };
        let duration = start.elapsed();

        match body {
            Ok(output) => {
                for warning in &output.warnings {
                    tracing::warn!(stage = %stage, "{}", warning);
                }
                let result = StageResult::success(stage, output.outputs, duration)
                    .with_warnings(output.warnings);
                self.observer.on_event(&StageEvent::from_result(&result));
                Ok(result)
            }
            Err(e) => {
                self.observer.on_event(&StageEvent::Failed { stage, message: e.to_string() });
                Err(e)
            }
        }
    }

    fn sources(&self, class: AssetClass) -> Result<Vec<SourceFile>, StageError> {
        discover_sources(&self.context.src_dir(), &self.context.paths(class).src)
    }

    fn style(&self) -> Result<StageOutput, StageError> {
        let entry = self.context.style_entry();
        if !entry.is_file() {
            return Ok(StageOutput::missing(format!("style entry {} not found", entry.display())));
        }

        let style = &self.context.config().style;
        let mut css =
            self.transforms.style.compile(&entry, style.output_style).map_err(|e| StageError::transform(&entry, e))?;

        if style.source_map {
            let name = entry.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            let minify = style.output_style == OutputStyle::Compressed;
            css = inline_source_map(&css, &name, minify).map_err(|e| StageError::transform(&entry, e))?;
        }

        let stem = entry.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        let out = self.context.class_out_dir(AssetClass::StylesSass).join(format!("{}.css", stem));
        write_output(&out, css.as_bytes())?;

        Ok(StageOutput { outputs: vec![out], warnings: vec![] })
    }

    fn css(&self) -> Result<StageOutput, StageError> {
        let minifier = &self.transforms.css;
        self.concat(AssetClass::StylesCss, "main.css", |source, text| {
            let name = source.path.to_string_lossy();
            minifier.minify(text, &name)
        })
    }

    fn js(&self) -> Result<StageOutput, StageError> {
        let minifier = &self.transforms.js;
        self.concat(AssetClass::Js, "main.js", |_, text| minifier.minify(text))
    }

    /// Minify every source of `class` and join the results into `file_name`.
    fn concat<F>(&self, class: AssetClass, file_name: &str, minify: F) -> Result<StageOutput, StageError>
    where
        F: Fn(&SourceFile, &str) -> Result<String, String>,
    {
        let sources = self.sources(class)?;
        if sources.is_empty() {
            return Ok(StageOutput::missing(NO_SOURCES.to_string()));
        }

        let mut parts = Vec::with_capacity(sources.len());
        for source in &sources {
            let text = fs::read_to_string(&source.path).map_err(|e| StageError::read(&source.path, e))?;
            parts.push(minify(source, &text).map_err(|e| StageError::transform(&source.path, e))?);
        }

        let out = self.context.class_out_dir(class).join(file_name);
        write_output(&out, parts.join("\n").as_bytes())?;
        tracing::debug!("{}: {} file(s) -> {}", class, sources.len(), out.display());

        Ok(StageOutput { outputs: vec![out], warnings: vec![] })
    }

    fn copy(&self, class: AssetClass) -> Result<StageOutput, StageError> {
        let sources = self.sources(class)?;
        if sources.is_empty() {
            return Ok(StageOutput::missing(NO_SOURCES.to_string()));
        }

        let out_dir = self.context.class_out_dir(class);
        let mut outputs = Vec::with_capacity(sources.len());
        for source in &sources {
            let dest = out_dir.join(&source.relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(|e| StageError::write(parent, e))?;
            }
            fs::copy(&source.path, &dest).map_err(|e| StageError::write(&dest, e))?;
            outputs.push(dest);
        }

        Ok(StageOutput { outputs, warnings: vec![] })
    }

    fn img(&self) -> Result<StageOutput, StageError> {
        let sources = self.sources(AssetClass::Images)?;
        if sources.is_empty() {
            return Ok(StageOutput::missing(NO_SOURCES.to_string()));
        }

        let verbose = self.context.config().images.verbose || self.context.is_verbose();
        let out_dir = self.context.class_out_dir(AssetClass::Images);
        let mut outputs = Vec::with_capacity(sources.len());
        let mut total_saved = 0usize;

        for source in &sources {
            let original = fs::read(&source.path).map_err(|e| StageError::read(&source.path, e))?;
            let optimized = self
                .transforms
                .images
                .optimize(&source.path, &original)
                .map_err(|e| StageError::transform(&source.path, e))?;

            let bytes = match optimized {
                Some(ref smaller) if smaller.len() < original.len() => smaller.as_slice(),
                _ => original.as_slice(),
            };
            let saved = original.len() - bytes.len();
            total_saved += saved;

            if verbose {
                if saved > 0 {
                    tracing::info!(
                        "✔ {} (saved {} B - {:.1}%)",
                        source.relative.display(),
                        saved,
                        saved as f64 * 100.0 / original.len() as f64
                    );
                } else {
                    tracing::info!("- {} (already optimized)", source.relative.display());
                }
            }

            let dest = out_dir.join(&source.relative);
            write_output(&dest, bytes)?;
            outputs.push(dest);
        }

        tracing::info!("Minified {} image(s), saved {} B", outputs.len(), total_saved);
        Ok(StageOutput { outputs, warnings: vec![] })
    }

    fn clean_build(&self) -> Result<StageOutput, StageError> {
        let out_dir = self.context.out_dir();
        let out = normalize(&out_dir);

        if normalize(&self.context.src_dir()).starts_with(&out)
            || normalize(self.context.project_root()).starts_with(&out)
        {
            return Err(StageError::write(
                &out_dir,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "refusing to delete a directory containing the source root",
                ),
            ));
        }

        if !out_dir.exists() {
            tracing::debug!("{} does not exist, nothing to clean", out_dir.display());
            return Ok(StageOutput::default());
        }

        fs::remove_dir_all(&out_dir).map_err(|e| StageError::write(&out_dir, e))?;
        Ok(StageOutput { outputs: vec![out_dir], warnings: vec![] })
    }
}

impl std::fmt::Debug for StageRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageRunner")
            .field("context", &self.context)
            .field("transforms", &self.transforms)
            .finish_non_exhaustive()
    }
}

/// `path` with `.` and `..` resolved; symlinks too when it exists.
fn normalize(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), StageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StageError::write(parent, e))?;
    }
    fs::write(path, bytes).map_err(|e| StageError::write(path, e))
}
