use std::fs;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use trail::{RoundConfig, Variant};

use crate::error::DrawError;

/// Everything one drawing run needs to know, apart from the solution itself.
#[derive(Debug, Clone)]
pub struct Setup {
    config: RoundConfig,
    out_files: OutFiles,
    silent_mode: bool,
}

impl Setup {
    /// `ru` and `rl` are the distinguisher round counts as given by the user. The drawn round
    /// counts are one less, so both must be at least 2.
    pub fn new(variant: Variant,
               ru: usize,
               rl: usize,
               kr: usize,
               npt: usize,
               out_files: OutFiles,
               silent_mode: bool)
               -> Result<Self, DrawError>
    {
        if ru < 2 || rl < 2 {
            return Err(DrawError::Setup(format!(
                "RU and RL must both be at least 2, got RU = {}, RL = {}", ru, rl)));
        }
        if kr < 2 {
            return Err(DrawError::Setup(format!("KR must be at least 2, got {}", kr)));
        }

        Ok(Self {
            config: RoundConfig::new(variant, ru - 1, rl - 1, kr).with_npt(npt),
            out_files,
            silent_mode,
        })
    }

    /// The drawn round layout handed to the core.
    #[inline]
    pub fn config(&self) -> RoundConfig {
        self.config
    }

    #[inline]
    pub fn variant(&self) -> Variant {
        self.config.variant
    }

    #[inline]
    pub fn out_files(&self) -> &OutFiles {
        &self.out_files
    }

    #[inline]
    pub fn silent_mode(&self) -> bool {
        self.silent_mode
    }

    /// Same settings, other output files. Used to fan one setup out over a batch.
    pub fn with_out_files(&self, out_files: OutFiles) -> Self {
        Self {
            out_files,
            ..self.clone()
        }
    }
}

/// Target files of one drawing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutFiles {
    out_parent_folder: PathBuf,
    /// The standalone TikZ document.
    tex_file: PathBuf,
    /// The attack summary as plain text.
    summary_file: PathBuf,
}

impl OutFiles {
    pub fn new<P: AsRef<Path>>(tex_file: P) -> Self {
        let mut tex_file = tex_file.as_ref().to_path_buf();
        if tex_file.extension().is_none() {
            tex_file.set_extension("tex");
        }
        let out_parent_folder = tex_file.parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let stem = tex_file.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let mut summary_file = out_parent_folder.clone();
        summary_file.push(format!("{}_{}", stem, "summary"));
        summary_file.set_extension("txt");

        Self {
            out_parent_folder,
            tex_file,
            summary_file,
        }
    }

    /// Output files inside `folder`, named after the solution file they are drawn from.
    pub fn in_folder<P: AsRef<Path>>(folder: P, name: &str) -> Self {
        let mut tex_file = folder.as_ref().to_path_buf();
        tex_file.push(name);
        tex_file.set_extension("tex");
        Self::new(tex_file)
    }

    #[inline]
    pub fn out_parent_folder(&self) -> &Path {
        &self.out_parent_folder
    }

    #[inline]
    pub fn tex_file(&self) -> &Path {
        &self.tex_file
    }

    #[inline]
    pub fn summary_file(&self) -> &Path {
        &self.summary_file
    }

    /// Creates the parent folder if it does not exist.
    pub fn create_parent_folder(&self) -> Result<(), DrawError> {
        if self.out_parent_folder.as_os_str().is_empty() {
            return Ok(());
        }
        fs::DirBuilder::new()
            .recursive(true)
            .create(&self.out_parent_folder)
            .map_err(|e| DrawError::write(&self.out_parent_folder, e))
    }

    pub fn write_tex(&self, content: &str) -> Result<(), DrawError> {
        Self::write_file(&self.tex_file, content)
    }

    pub fn write_summary(&self, content: &str) -> Result<(), DrawError> {
        Self::write_file(&self.summary_file, content)
    }

    fn write_file(path: &Path, content: &str) -> Result<(), DrawError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| DrawError::write(path, e))?;
        let mut writer = BufWriter::new(&file);
        writer.write_all(content.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| DrawError::write(path, e))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_file_sits_next_to_the_tex_file() {
        let out = OutFiles::new("figures/qarma64_r8.tex");
        assert_eq!(out.tex_file(), Path::new("figures/qarma64_r8.tex"));
        assert_eq!(out.summary_file(), Path::new("figures/qarma64_r8_summary.txt"));
        assert_eq!(out.out_parent_folder(), Path::new("figures"));
    }

    #[test]
    fn missing_extension_defaults_to_tex() {
        let out = OutFiles::new("output");
        assert_eq!(out.tex_file(), Path::new("output.tex"));
        assert_eq!(out.summary_file(), Path::new("output_summary.txt"));
    }

    #[test]
    fn user_round_counts_are_one_more_than_drawn() {
        let setup = Setup::new(Variant::Qarma64, 5, 4, 14, 1, OutFiles::new("o.tex"), true).unwrap();
        assert_eq!(setup.config().ru, 4);
        assert_eq!(setup.config().rl, 3);
        assert_eq!(setup.config().total_rounds(), 9);
    }

    #[test]
    fn too_few_rounds_is_a_setup_error() {
        let out = OutFiles::new("o.tex");
        assert!(matches!(Setup::new(Variant::Qarma64, 1, 4, 14, 1, out.clone(), true),
                         Err(DrawError::Setup(_))));
        assert!(matches!(Setup::new(Variant::Qarma128, 3, 3, 1, 1, out, true),
                         Err(DrawError::Setup(_))));
    }
}
