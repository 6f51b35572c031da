//! BindingBuilder for generation runs and build.rs scripts
//!
//! Drives extract → store → synthesize → emit and writes the schema store and
//! the generated source.

use crate::codegen::{Emitter, QuickJsEmitter, Synthesizer};
use crate::config::WeldConfig;
use crate::error::{WeldError, WeldResult};
use crate::extract::{DirectorySource, SchemaExtractor};
use crate::ir::SchemaStore;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default file name of the schema store
pub const SCHEMA_FILE: &str = "builtin_schema.json";

/// Default file name of the generated source
pub const OUTPUT_FILE: &str = "quickjs_builtin_binder.gen.cpp";

/// Builder for a binding generation run
///
/// # Example
/// ```ignore
/// use variant_weld::build::BindingBuilder;
///
/// fn main() {
///     BindingBuilder::new()
///         .docs("doc/classes")
///         .build()
///         .expect("Failed to generate bindings");
/// }
/// ```
pub struct BindingBuilder {
    config_path: Option<PathBuf>,
    docs_dir: Option<PathBuf>,
    schema_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    additional_watch: Vec<PathBuf>,
    emitter: Box<dyn Emitter>,
}

impl Default for BindingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingBuilder {
    pub fn new() -> Self {
        Self {
            config_path: None,
            docs_dir: None,
            schema_path: None,
            output_path: None,
            additional_watch: Vec::new(),
            emitter: Box::new(QuickJsEmitter::new()),
        }
    }

    /// Override configuration; the built-in document is used when unset
    pub fn config(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Directory holding one `<Class>.json` record per class
    pub fn docs(mut self, dir: impl AsRef<Path>) -> Self {
        self.docs_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Where the schema store is written or read
    pub fn schema(mut self, path: impl AsRef<Path>) -> Self {
        self.schema_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Where the generated source is written
    pub fn output(mut self, path: impl AsRef<Path>) -> Self {
        self.output_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Add additional files to watch for rebuilds
    pub fn watch(mut self, path: impl AsRef<Path>) -> Self {
        self.additional_watch.push(path.as_ref().to_path_buf());
        self
    }

    /// Replace the emitter
    pub fn emitter(mut self, emitter: impl Emitter + 'static) -> Self {
        self.emitter = Box::new(emitter);
        self
    }

    pub fn load_config(&self) -> WeldResult<WeldConfig> {
        match &self.config_path {
            Some(path) => WeldConfig::load(path),
            None => WeldConfig::builtin(),
        }
    }

    fn docs_dir(&self) -> WeldResult<&Path> {
        self.docs_dir
            .as_deref()
            .ok_or_else(|| WeldError::config("no documentation directory configured"))
    }

    fn schema_path(&self) -> WeldResult<&Path> {
        self.schema_path
            .as_deref()
            .ok_or_else(|| WeldError::config("no schema path configured"))
    }

    fn output_path(&self) -> WeldResult<&Path> {
        self.output_path
            .as_deref()
            .ok_or_else(|| WeldError::config("no output path configured"))
    }

    /// Extract the schema store in memory
    pub fn extract(&self, config: &WeldConfig) -> WeldResult<SchemaStore> {
        let source = DirectorySource::new(self.docs_dir()?);
        SchemaExtractor::new(config).extract(&source)
    }

    /// Synthesize and emit source text for a store
    pub fn render(&self, config: &WeldConfig, store: &SchemaStore) -> WeldResult<String> {
        let unit = Synthesizer::new(config).synthesize(store)?;
        Ok(self.emitter.emit(&unit))
    }

    /// Extract and write the schema store
    pub fn write_schema(&self) -> WeldResult<PathBuf> {
        let path = self.schema_path()?;
        let result = (|| -> WeldResult<usize> {
            let config = self.load_config()?;
            let store = self.extract(&config)?;
            write_atomic(path, &store.to_json()?)?;
            Ok(store.len())
        })();
        let classes = finish(&[path], result)?;
        info!(path = %path.display(), classes, "build.schema");
        Ok(path.to_path_buf())
    }

    /// Generate source from a previously written schema store
    pub fn generate(&self) -> WeldResult<PathBuf> {
        let output = self.output_path()?;
        let result = (|| -> WeldResult<()> {
            let config = self.load_config()?;
            let store = SchemaStore::from_json(&fs::read_to_string(self.schema_path()?)?)?;
            write_atomic(output, &self.render(&config, &store)?)
        })();
        finish(&[output], result)?;
        info!(path = %output.display(), "build.generate");
        Ok(output.to_path_buf())
    }

    /// Run the whole pipeline and write both artifacts
    ///
    /// The schema store is only written when a schema path is configured.
    pub fn run(&self) -> WeldResult<BuildOutput> {
        let output = self.output_path()?;
        let result = (|| -> WeldResult<usize> {
            let config = self.load_config()?;
            let store = self.extract(&config)?;
            if let Some(path) = &self.schema_path {
                write_atomic(path, &store.to_json()?)?;
            }
            write_atomic(output, &self.render(&config, &store)?)?;
            Ok(store.len())
        })();
        let mut artifacts = vec![output];
        artifacts.extend(self.schema_path.as_deref());
        let classes = finish(&artifacts, result)?;

        info!(output = %output.display(), classes, "build.done");
        Ok(BuildOutput {
            schema: self.schema_path.clone(),
            output: output.to_path_buf(),
            classes,
        })
    }

    /// Regenerate in memory and compare with the artifacts on disk
    pub fn check(&self) -> WeldResult<CheckReport> {
        let config = self.load_config()?;
        let store = self.extract(&config)?;
        let rendered = self.render(&config, &store)?;

        let schema_matches = match &self.schema_path {
            Some(path) => same_contents(path, &store.to_json()?)?,
            None => true,
        };
        let output_matches = same_contents(self.output_path()?, &rendered)?;

        debug!(schema_matches, output_matches, "build.check");
        Ok(CheckReport {
            schema_matches,
            output_matches,
        })
    }

    /// Run from a build script
    ///
    /// Artifacts default to `OUT_DIR`; the configuration, the documentation
    /// directory and watched paths are registered with cargo.
    pub fn build(mut self) -> WeldResult<BuildOutput> {
        let out_dir = env::var("OUT_DIR").map_err(|_| WeldError::EnvVarMissing("OUT_DIR".to_string()))?;
        let out_path = Path::new(&out_dir);

        let manifest_dir = env::var("CARGO_MANIFEST_DIR")
            .map_err(|_| WeldError::EnvVarMissing("CARGO_MANIFEST_DIR".to_string()))?;
        let manifest_path = Path::new(&manifest_dir);

        if self.schema_path.is_none() {
            self.schema_path = Some(out_path.join(SCHEMA_FILE));
        }
        if self.output_path.is_none() {
            self.output_path = Some(out_path.join(OUTPUT_FILE));
        }
        self.config_path = self.config_path.take().map(|p| manifest_path.join(p));
        self.docs_dir = self.docs_dir.take().map(|p| manifest_path.join(p));

        if let Some(path) = &self.config_path {
            println!("cargo:rerun-if-changed={}", path.display());
        }
        if let Some(path) = &self.docs_dir {
            println!("cargo:rerun-if-changed={}", path.display());
        }
        for watch_path in &self.additional_watch {
            println!("cargo:rerun-if-changed={}", watch_path.display());
        }

        self.run()
    }
}

/// Paths written by a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    pub schema: Option<PathBuf>,
    pub output: PathBuf,
    pub classes: usize,
}

/// Result of [`BindingBuilder::check`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckReport {
    pub schema_matches: bool,
    pub output_matches: bool,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.schema_matches && self.output_matches
    }
}

/// On failure, remove every artifact the step owns instead of leaving it stale
fn finish<T>(artifacts: &[&Path], result: WeldResult<T>) -> WeldResult<T> {
    if result.is_err() {
        for path in artifacts.iter().filter(|p| p.exists()) {
            match fs::remove_file(path) {
                Ok(()) => warn!(path = %path.display(), "build.removed_stale_output"),
                Err(err) => warn!(path = %path.display(), error = %err, "build.remove_failed"),
            }
        }
    }
    result
}

/// Write through a sibling temporary file and rename over the target
pub fn write_atomic(path: &Path, contents: &str) -> WeldResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    fs::write(&tmp, contents)?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }
    debug!(path = %path.display(), bytes = contents.len(), "build.write");
    Ok(())
}

fn same_contents(path: &Path, expected: &str) -> WeldResult<bool> {
    match fs::read_to_string(path) {
        Ok(actual) => Ok(actual == expected),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err.into()),
    }
}
