use std::path::PathBuf;

pub const DEFAULT_PROMPTS_DIR: &str = "dpg_bench/prompts";
pub const DEFAULT_MAPPING_PATH: &str = "dpg_bench/filename_from_prompt.json";
pub const SAMPLE_PREFIX: &str = "sample_";
pub const PROMPT_FILE: &str = "prompt.txt";
pub const IMAGE_FILE: &str = "image.png";
pub const OUTPUT_EXTENSION: &str = "png";

/// Inputs for building the prompt mapping.
#[derive(Debug, Clone)]
pub struct MappingConfig {
    pub prompts_dir: PathBuf,
    pub output_path: PathBuf,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            prompts_dir: PathBuf::from(DEFAULT_PROMPTS_DIR),
            output_path: PathBuf::from(DEFAULT_MAPPING_PATH),
        }
    }
}

/// Inputs for one conversion run. `input_dir` holds the `sample_*` directories.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub mapping_path: PathBuf,
    pub sample_prefix: String,
    pub prompt_file: String,
    pub image_file: String,
}

impl ConvertConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            mapping_path: PathBuf::from(DEFAULT_MAPPING_PATH),
            sample_prefix: SAMPLE_PREFIX.to_string(),
            prompt_file: PROMPT_FILE.to_string(),
            image_file: IMAGE_FILE.to_string(),
        }
    }

    pub fn with_mapping(mut self, mapping_path: impl Into<PathBuf>) -> Self {
        self.mapping_path = mapping_path.into();
        self
    }

    pub fn destination_for(&self, stem: &str) -> PathBuf {
        self.output_dir.join(format!("{}.{}", stem, OUTPUT_EXTENSION))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_dpg_bench_layout() {
        let cfg = MappingConfig::default();
        assert_eq!(cfg.prompts_dir, PathBuf::from("dpg_bench/prompts"));
        assert_eq!(
            cfg.output_path,
            PathBuf::from("dpg_bench/filename_from_prompt.json")
        );
    }

    #[test]
    fn destination_keeps_dots_in_stem() {
        let cfg = ConvertConfig::new("in", "out");
        assert_eq!(cfg.destination_for("0001"), PathBuf::from("out/0001.png"));
        assert_eq!(
            cfg.destination_for("coco.v2"),
            PathBuf::from("out/coco.v2.png")
        );
    }
}
