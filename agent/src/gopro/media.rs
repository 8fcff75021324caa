//! Media index wire formats
//!
//! Firmware revisions disagree on field names: the listing root is `media`
//! or `results.media`, a directory is `directory` or `d` and carries
//! either a single `filename` or a file list under `files`/`fs`, where
//! each entry names itself `filename` or `n`. Both shapes are folded into
//! one record type right here; nothing past this module sees the wire
//! format.

use serde::Deserialize;

use crate::errors::CamError;

/// On-the-wire media listing.
#[derive(Debug, Deserialize)]
pub struct MediaList {
    #[serde(default)]
    media: Option<Vec<RawDirectory>>,
    #[serde(default)]
    results: Option<ResultsEnvelope>,
}

#[derive(Debug, Deserialize)]
struct ResultsEnvelope {
    #[serde(default)]
    media: Vec<RawDirectory>,
}

#[derive(Debug, Deserialize)]
struct RawDirectory {
    #[serde(alias = "d")]
    directory: String,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default, alias = "fs")]
    files: Option<Vec<RawFile>>,
}

#[derive(Debug, Deserialize)]
struct RawFile {
    #[serde(alias = "n")]
    filename: String,
}

/// One storage directory after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDirectory {
    pub name: String,
    pub files: Vec<String>,
}

impl MediaList {
    pub fn normalize(self) -> Vec<MediaDirectory> {
        let raw = match self.media {
            Some(media) if !media.is_empty() => media,
            _ => self.results.map(|results| results.media).unwrap_or_default(),
        };

        raw.into_iter()
            .map(|directory| {
                let files = match (directory.filename, directory.files) {
                    // A bare `filename` wins over a nested list.
                    (Some(single), _) => vec![single],
                    (None, Some(files)) => files.into_iter().map(|f| f.filename).collect(),
                    (None, None) => Vec::new(),
                };
                MediaDirectory {
                    name: directory.directory,
                    files,
                }
            })
            .collect()
    }
}

/// Pick the newest capture: positionally last directory, last file within
/// it. The camera is trusted to list entries in chronological order; the
/// timestamp fields it also reports are not consulted.
pub fn latest(directories: &[MediaDirectory]) -> Result<(&str, &str), CamError> {
    let directory = directories.last().ok_or(CamError::NoMediaFound)?;
    let filename = directory
        .files
        .last()
        .ok_or_else(|| CamError::NoFilesFound {
            directory: directory.name.clone(),
        })?;
    Ok((&directory.name, filename))
}
