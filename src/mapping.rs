use crate::error::PrepError;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Prompt text -> canonical filename stem, in the order the prompt files were read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptMapping {
    entries: IndexMap<String, String>,
}

impl PromptMapping {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, prompt: &str) -> Option<&str> {
        self.entries.get(prompt).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PrepError::not_found("Filename from prompt file", path).into());
        }
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let mapping: PromptMapping = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing {}", path.display()))?;
        log::debug!("loaded {} mappings from {}", mapping.len(), path.display());
        Ok(mapping)
    }

    /// Writes the mapping as 2-space indented JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

impl FromIterator<(String, String)> for PromptMapping {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn is_txt(path: Option<&Path>) -> bool {
    path.and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        == Some("txt")
}

/// Reads every `*.txt` directly under `prompts_dir` (sorted by name) into a mapping
/// from trimmed content to file stem. Identical prompt text in two files is fatal;
/// files that are empty after trimming are left out.
pub fn build_from_dir(prompts_dir: &Path) -> Result<PromptMapping> {
    if !prompts_dir.exists() {
        return Err(PrepError::not_found("Prompts directory", prompts_dir).into());
    }

    let mut entries: IndexMap<String, String> = IndexMap::new();
    let mut sources: IndexMap<String, PathBuf> = IndexMap::new();

    for entry in WalkDir::new(prompts_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() > 0 && !is_txt(err.path()) => {
                log::warn!("ignoring unreadable entry: {}", err);
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        let path = entry.path();

        if !path.is_file() || !is_txt(Some(path)) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            log::warn!("skipping non UTF-8 file name {}", path.display());
            continue;
        };

        let content = fs::read_to_string(path)
            .with_context(|| format!("reading prompt file {}", path.display()))?;
        let prompt = content.trim().to_string();
        if prompt.is_empty() {
            log::warn!("skipping empty prompt file {}", path.display());
            continue;
        }

        if let Some(first) = sources.get(&prompt) {
            return Err(PrepError::DuplicatePrompt {
                prompt,
                first: first.clone(),
                second: path.to_path_buf(),
            }
            .into());
        }

        sources.insert(prompt.clone(), path.to_path_buf());
        entries.insert(prompt, stem.to_string());
    }

    Ok(PromptMapping { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_prompts(dir: &Path, files: &[(&str, &str)]) {
        for (name, content) in files {
            fs::write(dir.join(name), content).unwrap();
        }
    }

    #[test]
    fn builds_trimmed_content_to_stem_pairs() {
        let tmp = TempDir::new().unwrap();
        write_prompts(
            tmp.path(),
            &[
                ("0002.txt", "  a blue dog \n"),
                ("0001.txt", "a red cat\n"),
                ("notes.md", "ignored"),
            ],
        );

        let mapping = build_from_dir(tmp.path()).unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get("a red cat"), Some("0001"));
        assert_eq!(mapping.get("a blue dog"), Some("0002"));

        let order: Vec<&str> = mapping.iter().map(|(_, v)| v).collect();
        assert_eq!(order, vec!["0001", "0002"]);
    }

    #[test]
    fn duplicate_trimmed_content_is_fatal() {
        let tmp = TempDir::new().unwrap();
        write_prompts(
            tmp.path(),
            &[("alpha.txt", "a red cat"), ("zeta.txt", "\ta red cat  \n")],
        );

        let err = build_from_dir(tmp.path()).unwrap_err();
        match err.downcast_ref::<PrepError>() {
            Some(PrepError::DuplicatePrompt { prompt, .. }) => assert_eq!(prompt, "a red cat"),
            other => panic!("expected duplicate error, got {:?}", other),
        }
    }

    #[test]
    fn missing_prompts_dir_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = build_from_dir(&tmp.path().join("prompts")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PrepError>(),
            Some(PrepError::NotFound { .. })
        ));
    }

    #[test]
    fn does_not_descend_into_subdirectories() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("nested")).unwrap();
        write_prompts(tmp.path(), &[("0001.txt", "a red cat"), ("nested/0002.txt", "a red cat")]);

        let mapping = build_from_dir(tmp.path()).unwrap();
        assert_eq!(mapping.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_non_prompt_link_is_ignored() {
        let tmp = TempDir::new().unwrap();
        write_prompts(tmp.path(), &[("0001.txt", "a red cat")]);
        std::os::unix::fs::symlink(tmp.path().join("gone"), tmp.path().join("README")).unwrap();

        let mapping = build_from_dir(tmp.path()).unwrap();
        assert_eq!(mapping.get("a red cat"), Some("0001"));
    }

    #[cfg(unix)]
    #[test]
    fn dangling_prompt_link_is_fatal() {
        let tmp = TempDir::new().unwrap();
        write_prompts(tmp.path(), &[("0001.txt", "a red cat")]);
        std::os::unix::fs::symlink(tmp.path().join("gone"), tmp.path().join("0002.txt")).unwrap();

        assert!(build_from_dir(tmp.path()).is_err());
    }

    #[test]
    fn empty_prompt_files_are_left_out() {
        let tmp = TempDir::new().unwrap();
        write_prompts(tmp.path(), &[("0001.txt", "a red cat"), ("0002.txt", "  \n")]);

        let mapping = build_from_dir(tmp.path()).unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.get(""), None);
    }

    #[test]
    fn save_writes_indented_json_and_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("dpg_bench").join("filename_from_prompt.json");
        let mapping: PromptMapping = vec![
            ("a red cat".to_string(), "0001".to_string()),
            ("a blue dog".to_string(), "0002".to_string()),
        ]
        .into_iter()
        .collect();

        mapping.save(&out).unwrap();

        let text = fs::read_to_string(&out).unwrap();
        assert_eq!(
            text,
            "{\n  \"a red cat\": \"0001\",\n  \"a blue dog\": \"0002\"\n}"
        );
        assert_eq!(PromptMapping::load(&out).unwrap(), mapping);
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = PromptMapping::load(&tmp.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
