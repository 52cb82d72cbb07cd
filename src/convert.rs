use crate::config::ConvertConfig;
use crate::error::PrepError;
use crate::mapping::PromptMapping;
use crate::matching::{PromptMatcher, Resolution};
use anyhow::Result;
use indicatif::ProgressBar;
use serde::Serialize;
use std::fmt;
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Converted,
    Skipped,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct SampleRecord {
    pub sample: String,
    pub outcome: Outcome,
    pub stem: Option<String>,
    pub detail: String,
    pub prompt_preview: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConversionSummary {
    pub converted: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl ConversionSummary {
    pub fn total(&self) -> usize {
        self.converted + self.skipped + self.errors
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Converted => self.converted += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Error => self.errors += 1,
        }
    }
}

impl fmt::Display for ConversionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f, "{}", rule)?;
        writeln!(f, "Conversion Summary:")?;
        writeln!(f, "  Converted: {}", self.converted)?;
        writeln!(f, "  Skipped: {}", self.skipped)?;
        writeln!(f, "  Errors: {}", self.errors)?;
        writeln!(f, "  Total processed: {}", self.total())?;
        write!(f, "{}", rule)
    }
}

/// Immediate subdirectories of `input_dir` whose names start with `prefix`, sorted by name.
pub fn discover_samples(input_dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let mut samples = Vec::new();
    for entry in WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            // Dangling links are not sample directories.
            Err(err) if err.depth() > 0 => {
                log::warn!("ignoring unreadable entry: {}", err);
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        if entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(prefix))
        {
            samples.push(entry.into_path());
        }
    }
    Ok(samples)
}

/// Copies `src` to `dst` keeping permissions and access/modification times.
///
/// Bytes land in a temporary file next to `dst` that is renamed into place only once
/// fully written, so a failed copy leaves no `dst` behind. Never replaces an existing `dst`.
pub fn copy_preserving(src: &Path, dst: &Path) -> io::Result<u64> {
    let mut reader = File::open(src)?;
    let meta = reader.metadata()?;
    let dir = dst
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)?;
    let bytes = io::copy(&mut reader, tmp.as_file_mut())?;
    tmp.as_file().set_permissions(meta.permissions())?;

    let mut times = FileTimes::new().set_modified(meta.modified()?);
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    tmp.as_file().set_times(times)?;

    tmp.persist_noclobber(dst).map_err(|e| e.error)?;
    Ok(bytes)
}

fn preview(prompt: &str) -> String {
    prompt.chars().take(PREVIEW_CHARS).collect()
}

/// Copies each sample's image to `<output_dir>/<stem>.png`, where the stem is the
/// mapping value the matcher resolves for the sample prompt.
///
/// Unreadable prompts, unmatched prompts and failed copies are counted as errors and
/// the run continues. An existing destination is never overwritten. A prompt that
/// matches more than one key aborts the run with [`PrepError::AmbiguousMatch`].
///
/// `on_record` sees every sample as it is classified, including those processed
/// before an abort.
pub fn convert_images<F>(
    config: &ConvertConfig,
    matcher: &dyn PromptMatcher,
    progress: &ProgressBar,
    mut on_record: F,
) -> Result<ConversionSummary>
where
    F: FnMut(&SampleRecord) -> Result<()>,
{
    if !config.input_dir.exists() {
        return Err(PrepError::not_found("Input directory", &config.input_dir).into());
    }
    let mapping = PromptMapping::load(&config.mapping_path)?;
    if mapping.is_empty() {
        log::warn!("{} has no entries", config.mapping_path.display());
    }

    fs::create_dir_all(&config.output_dir)?;
    let samples = discover_samples(&config.input_dir, &config.sample_prefix)?;
    log::info!(
        "{} samples in {}, {} mappings, matching by {}",
        samples.len(),
        config.input_dir.display(),
        mapping.len(),
        matcher.name()
    );
    progress.set_length(samples.len() as u64);

    let mut summary = ConversionSummary::default();

    for sample_dir in &samples {
        let name = sample_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let record = convert_sample(config, &mapping, matcher, sample_dir, &name, progress)?;
        summary.record(record.outcome);
        on_record(&record)?;
        progress.inc(1);
    }

    Ok(summary)
}

fn convert_sample(
    config: &ConvertConfig,
    mapping: &PromptMapping,
    matcher: &dyn PromptMatcher,
    sample_dir: &Path,
    name: &str,
    progress: &ProgressBar,
) -> Result<SampleRecord> {
    let mut record = SampleRecord {
        sample: name.to_string(),
        outcome: Outcome::Error,
        stem: None,
        detail: String::new(),
        prompt_preview: String::new(),
    };

    let prompt_path = sample_dir.join(&config.prompt_file);
    let prompt = match fs::read_to_string(&prompt_path) {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            progress.suspend(|| {
                println!("Error reading {} from {}: {}", config.prompt_file, name, e)
            });
            record.detail = format!("reading {}: {}", config.prompt_file, e);
            return Ok(record);
        }
    };
    record.prompt_preview = preview(&prompt);

    let stem = match matcher.resolve(mapping, &prompt) {
        Resolution::Matched(stem) => stem,
        Resolution::Unmatched => {
            progress.suspend(|| {
                println!("Warning: No mapping found for prompt in {}", name);
                println!("  Prompt preview: {}...", record.prompt_preview);
            });
            record.detail = "no mapping found".to_string();
            return Ok(record);
        }
        Resolution::Ambiguous(keys) => {
            return Err(PrepError::AmbiguousMatch {
                sample: name.to_string(),
                keys: keys.into_iter().map(str::to_string).collect(),
            }
            .into());
        }
    };
    record.stem = Some(stem.to_string());

    let dst = config.destination_for(stem);
    if dst.exists() {
        log::debug!("{}: {} already exists", name, dst.display());
        record.outcome = Outcome::Skipped;
        record.detail = format!("{} already exists", dst.display());
        return Ok(record);
    }

    let src = sample_dir.join(&config.image_file);
    match copy_preserving(&src, &dst) {
        Ok(bytes) => {
            log::debug!("{}: copied {} bytes to {}", name, bytes, dst.display());
            record.outcome = Outcome::Converted;
        }
        Err(e) => {
            progress.suspend(|| println!("Error copying image from {}: {}", name, e));
            record.detail = format!("copying {}: {}", config.image_file, e);
        }
    }
    Ok(record)
}
