//! Removal of files picked from a scan result
//!
//! The scanner only reads metadata. Deleting is a separate, explicit step
//! driven by the CLI: the user picks ranks from the printed table and
//! confirms before anything is unlinked.

use crate::error::{ConfigError, Result, TopnError};
use crate::scanner::FileEntry;
use console::{style, Term};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};

/// Outcome of a removal pass
#[derive(Debug, Default)]
pub struct RemoveReport {
    /// Files deleted
    pub removed: Vec<PathBuf>,

    /// Sum of the sizes of deleted files
    pub freed_bytes: u64,

    /// Files that could not be deleted, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

/// Most paths listed in the confirmation prompt
const MAX_LISTED: usize = 10;

/// Parse a rank selection like `1,3,5-7` or `all` against `count` results.
///
/// Ranks are 1-based. Returns sorted, de-duplicated 0-based indices. An empty
/// input selects nothing.
pub fn parse_selection(input: &str, count: usize) -> std::result::Result<Vec<usize>, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidSelection {
        input: input.to_string(),
        reason,
    };

    let input_trimmed = input.trim();
    if input_trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if input_trimmed.eq_ignore_ascii_case("all") {
        return Ok((0..count).collect());
    }

    let parse_rank = |s: &str| -> std::result::Result<usize, ConfigError> {
        let rank: usize = s
            .trim()
            .parse()
            .map_err(|_| invalid(format!("'{}' is not a rank", s.trim())))?;
        if rank == 0 || rank > count {
            return Err(invalid(format!("rank {} is outside 1-{}", rank, count)));
        }
        Ok(rank - 1)
    };

    let mut picked = Vec::new();
    for part in input_trimmed.split(|c: char| c == ',' || c.is_whitespace()) {
        if part.is_empty() {
            continue;
        }

        match part.split_once('-') {
            Some((lo, hi)) => {
                let (lo, hi) = (parse_rank(lo)?, parse_rank(hi)?);
                if lo > hi {
                    return Err(invalid(format!("range '{}' is reversed", part)));
                }
                picked.extend(lo..=hi);
            }
            None => picked.push(parse_rank(part)?),
        }
    }

    picked.sort_unstable();
    picked.dedup();
    Ok(picked)
}

/// Delete the given files, continuing past failures
pub fn remove_files(files: &[FileEntry]) -> RemoveReport {
    let mut report = RemoveReport::default();

    for file in files {
        match fs::remove_file(&file.path) {
            Ok(()) => {
                info!(path = %file.path.display(), size = file.size, "Removed file");
                report.freed_bytes += file.size;
                report.removed.push(file.path.clone());
            }
            Err(e) => {
                warn!(path = %file.path.display(), error = %e, "Failed to remove file");
                report.failed.push((file.path.clone(), e.to_string()));
            }
        }
    }

    report
}

/// Ask on `term` which ranked files to delete, confirm, then delete them.
///
/// An invalid selection is reported and asked again. Returns `None` when
/// nothing was selected or the user declined, and `TopnError::Interrupted`
/// if a read is cut short by a signal.
pub fn prompt_and_remove(term: &Term, files: &[FileEntry]) -> Result<Option<RemoveReport>> {
    run_prompt(
        files,
        |prompt| {
            term.write_str(prompt)?;
            term.read_line()
        },
        |line| term.write_line(line),
    )
}

fn read_answer<A>(ask: &mut A, prompt: &str) -> Result<String>
where
    A: FnMut(&str) -> io::Result<String>,
{
    ask(prompt).map_err(|e| match e.kind() {
        io::ErrorKind::Interrupted => TopnError::Interrupted,
        _ => TopnError::Io(e),
    })
}

/// Prompt loop behind [`prompt_and_remove`], with the terminal abstracted as
/// an `ask` (write prompt, read line) and a `say` (write line) closure.
fn run_prompt<A, S>(files: &[FileEntry], mut ask: A, mut say: S) -> Result<Option<RemoveReport>>
where
    A: FnMut(&str) -> io::Result<String>,
    S: FnMut(&str) -> io::Result<()>,
{
    say("")?;
    let prompt = format!(
        "{} ",
        style("Ranks to remove (e.g. 1,3,5-7, 'all', empty to skip):").bold()
    );

    let picked = loop {
        let input = read_answer(&mut ask, &prompt)?;
        match parse_selection(&input, files.len()) {
            Ok(picked) => break picked,
            Err(e) => say(&format!("{}", style(e).yellow()))?,
        }
    };

    if picked.is_empty() {
        say("Nothing selected.")?;
        return Ok(None);
    }

    let selected: Vec<FileEntry> = picked.iter().map(|&i| files[i].clone()).collect();

    say(&format!(
        "{}",
        style(format!("Delete {} files?", selected.len())).red().bold()
    ))?;
    for file in selected.iter().take(MAX_LISTED) {
        say(&format!("  {}", file.path.display()))?;
    }
    if selected.len() > MAX_LISTED {
        say(&format!("  ... and {} more", selected.len() - MAX_LISTED))?;
    }

    let answer = read_answer(&mut ask, "Confirm [y/N]: ")?;
    if !matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
        say("Cancelled.")?;
        return Ok(None);
    }

    Ok(Some(remove_files(&selected)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("1,3", 5).unwrap(), vec![0, 2]);
        assert_eq!(parse_selection("2-4", 5).unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_selection("5, 1 2-3,2", 5).unwrap(), vec![0, 1, 2, 4]);
        assert_eq!(parse_selection("ALL", 3).unwrap(), vec![0, 1, 2]);
        assert!(parse_selection("  ", 3).unwrap().is_empty());
    }

    #[test]
    fn test_parse_selection_invalid() {
        assert!(parse_selection("0", 3).is_err());
        assert!(parse_selection("4", 3).is_err());
        assert!(parse_selection("3-1", 3).is_err());
        assert!(parse_selection("x", 3).is_err());
        assert!(matches!(
            parse_selection("1-", 3),
            Err(ConfigError::InvalidSelection { .. })
        ));
    }

    #[test]
    fn test_remove_files() {
        let dir = tempdir().unwrap();
        let present = dir.path().join("present");
        fs::write(&present, vec![0u8; 100]).unwrap();
        let missing = dir.path().join("missing");

        let report = remove_files(&[
            FileEntry::new(100, present.clone()),
            FileEntry::new(50, missing.clone()),
        ]);

        assert_eq!(report.removed, vec![present.clone()]);
        assert_eq!(report.freed_bytes, 100);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, missing);
        assert!(!present.exists());
    }

    /// Feeds scripted answers to `run_prompt` and records its output
    fn scripted(
        files: &[FileEntry],
        answers: &[&str],
    ) -> (Result<Option<RemoveReport>>, Vec<String>) {
        let mut answers = answers.iter().map(|a| a.to_string());
        let mut output = Vec::new();
        let result = run_prompt(
            files,
            |_prompt| {
                answers
                    .next()
                    .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more input"))
            },
            |line| {
                output.push(line.to_string());
                Ok(())
            },
        );
        (result, output)
    }

    fn sample_files(dir: &std::path::Path, count: usize) -> Vec<FileEntry> {
        (0..count)
            .map(|i| {
                let path = dir.join(format!("f{}", i));
                fs::write(&path, vec![0u8; 10]).unwrap();
                FileEntry::new(10, path)
            })
            .collect()
    }

    #[test]
    fn test_prompt_reasks_after_invalid_rank() {
        let dir = tempdir().unwrap();
        let files = sample_files(dir.path(), 5);

        let (result, output) = scripted(&files, &["7", "2", "y"]);

        let report = result.unwrap().unwrap();
        assert_eq!(report.removed, vec![files[1].path.clone()]);
        assert!(output.iter().any(|l| l.contains("outside 1-5")));
        assert!(files[0].path.exists());
        assert!(!files[1].path.exists());
    }

    #[test]
    fn test_prompt_declined_or_empty() {
        let dir = tempdir().unwrap();
        let files = sample_files(dir.path(), 3);

        let (result, _) = scripted(&files, &["all", "n"]);
        assert!(result.unwrap().is_none());

        let (result, output) = scripted(&files, &[""]);
        assert!(result.unwrap().is_none());
        assert!(output.iter().any(|l| l == "Nothing selected."));

        assert!(files.iter().all(|f| f.path.exists()));
    }

    #[test]
    fn test_prompt_interrupted_read() {
        let dir = tempdir().unwrap();
        let files = sample_files(dir.path(), 2);

        let result = run_prompt(
            &files,
            |_prompt| Err(io::Error::from(io::ErrorKind::Interrupted)),
            |_line| Ok(()),
        );
        assert!(matches!(result, Err(TopnError::Interrupted)));

        let (result, _) = scripted(&files, &["1"]);
        assert!(matches!(result, Err(TopnError::Io(_))));
        assert!(files.iter().all(|f| f.path.exists()));
    }
}
