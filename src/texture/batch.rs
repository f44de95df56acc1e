//! Batch conversion of a directory of BLP files to PNG.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::common::error::{BlpError, BlpResult};
use crate::texture::blp_to_png;

/// Progress is reported after every this many successful conversions.
pub const PROGRESS_INTERVAL: usize = 50;

/// Outcome of a directory conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub converted: usize,
    pub errors: usize,
    pub total: usize,
}

fn io_error(path: &Path, source: std::io::Error) -> BlpError {
    BlpError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn is_blp(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("blp"))
}

/// List the `.blp` files directly inside `dir`, sorted by path.
pub fn find_blp_files(dir: &Path) -> BlpResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for dir_entry in fs::read_dir(dir).map_err(|e| io_error(dir, e))? {
        let path = dir_entry.map_err(|e| io_error(dir, e))?.path();
        if is_blp(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn convert_file(src: &Path, dest: &Path) -> BlpResult<()> {
    let data = fs::read(src).map_err(|e| io_error(src, e))?;
    let png = blp_to_png(&data)?;
    fs::write(dest, png).map_err(|e| io_error(dest, e))
}

/// Convert every `.blp` file in `src_dir` into `<stem>.png` in `dest_dir`.
///
/// A missing source directory fails the whole call; a file that does not
/// convert is counted in `errors` and the batch carries on.
pub fn convert_directory(
    src_dir: &Path,
    dest_dir: &Path,
    mut progress: impl FnMut(&ConversionSummary),
) -> BlpResult<ConversionSummary> {
    if !src_dir.is_dir() {
        return Err(io_error(
            src_dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "source directory not found"),
        ));
    }
    fs::create_dir_all(dest_dir).map_err(|e| io_error(dest_dir, e))?;

    let files = find_blp_files(src_dir)?;
    let mut summary = ConversionSummary {
        total: files.len(),
        ..Default::default()
    };
    info!("Converting {} BLP files from {}", summary.total, src_dir.display());

    for file in &files {
        let Some(stem) = file.file_stem() else {
            continue;
        };
        let mut name = stem.to_os_string();
        name.push(".png");
        let dest = dest_dir.join(name);

        match convert_file(file, &dest) {
            Ok(()) => {
                summary.converted += 1;
                debug!("Converted {} -> {}", file.display(), dest.display());
                if summary.converted % PROGRESS_INTERVAL == 0 {
                    progress(&summary);
                }
            }
            Err(e) => {
                summary.errors += 1;
                warn!("Failed to convert {}: {}", file.display(), e);
            }
        }
    }

    info!(
        "Converted {}/{} textures ({} errors)",
        summary.converted, summary.total, summary.errors
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::tests::palette_blp;

    #[test]
    fn test_convert_directory_counts() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let out = dest.path().join("png");

        fs::write(src.path().join("Icon_A.blp"), palette_blp(2, 2, [1, 2, 3, 4])).unwrap();
        fs::write(src.path().join("icon_b.BLP"), palette_blp(1, 1, [5, 6, 7, 8])).unwrap();
        fs::write(src.path().join("broken.blp"), b"BLP1garbage").unwrap();
        fs::write(src.path().join("readme.txt"), b"not a texture").unwrap();

        let summary = convert_directory(src.path(), &out, |_| {}).unwrap();
        assert_eq!(
            summary,
            ConversionSummary {
                converted: 2,
                errors: 1,
                total: 3
            }
        );
        assert!(out.join("Icon_A.png").is_file());
        assert!(out.join("icon_b.png").is_file());
        assert!(!out.join("broken.png").exists());
        assert!(!out.join("readme.png").exists());
    }

    #[test]
    fn test_progress_every_interval() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let blp = palette_blp(1, 1, [0, 0, 0, 0]);
        for i in 0..(PROGRESS_INTERVAL * 2 + 3) {
            fs::write(src.path().join(format!("tex{:03}.blp", i)), &blp).unwrap();
        }

        let mut calls = Vec::new();
        let summary = convert_directory(src.path(), dest.path(), |s| calls.push(s.converted)).unwrap();
        assert_eq!(summary.converted, PROGRESS_INTERVAL * 2 + 3);
        assert_eq!(calls, vec![PROGRESS_INTERVAL, PROGRESS_INTERVAL * 2]);
    }

    #[test]
    fn test_missing_source_directory() {
        let dest = tempfile::tempdir().unwrap();
        let err = convert_directory(Path::new("/nonexistent/textures"), dest.path(), |_| {}).unwrap_err();
        assert!(matches!(err, BlpError::Io { .. }));
    }
}
