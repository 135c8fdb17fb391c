//! JSON-backed content library.

use crate::model::content::{DailyExercise, SectionExercises, SectionOverview, SectionSummary};
use log::{error, info};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const SECTION_OVERVIEWS_FILE: &str = "section-overviews.json";
pub const DAILY_EXERCISES_FILE: &str = "daily-exercises.json";
pub const SECTION_SUMMARIES_FILE: &str = "section-summaries.json";

pub type ContentResult<T> = Result<T, ContentError>;

/// Content loading error.
#[derive(Debug)]
pub enum ContentError {
    /// Document file could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Document is not valid JSON of the expected shape.
    Parse {
        document: &'static str,
        source: serde_json::Error,
    },
}

impl Display for ContentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read content `{}`: {source}", path.display())
            }
            Self::Parse { document, source } => {
                write!(f, "invalid content document `{document}`: {source}")
            }
        }
    }
}

impl Error for ContentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

#[derive(Deserialize)]
struct SectionsDocument<T> {
    sections: BTreeMap<String, T>,
}

/// All section documents, keyed by section key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentLibrary {
    overviews: BTreeMap<String, SectionOverview>,
    exercises: BTreeMap<String, SectionExercises>,
    summaries: BTreeMap<String, SectionSummary>,
}

impl ContentLibrary {
    /// Parses the three documents from JSON text.
    pub fn from_json(overviews: &str, exercises: &str, summaries: &str) -> ContentResult<Self> {
        Ok(Self {
            overviews: parse_document(SECTION_OVERVIEWS_FILE, overviews)?,
            exercises: parse_document(DAILY_EXERCISES_FILE, exercises)?,
            summaries: parse_document(SECTION_SUMMARIES_FILE, summaries)?,
        })
    }

    /// Loads the three documents from one directory.
    ///
    /// # Side effects
    /// - Emits a `content_load` event with per-document section counts.
    pub fn load_dir(dir: impl AsRef<Path>) -> ContentResult<Self> {
        let dir = dir.as_ref();
        let library = Self::from_json(
            &read_document(dir, SECTION_OVERVIEWS_FILE)?,
            &read_document(dir, DAILY_EXERCISES_FILE)?,
            &read_document(dir, SECTION_SUMMARIES_FILE)?,
        )
        .inspect_err(|err| {
            error!("event=content_load module=content status=error error={err}");
        })?;

        info!(
            "event=content_load module=content status=ok overviews={} exercises={} summaries={}",
            library.overviews.len(),
            library.exercises.len(),
            library.summaries.len()
        );
        Ok(library)
    }

    pub fn overview(&self, section_key: &str) -> Option<&SectionOverview> {
        self.overviews.get(section_key.trim())
    }

    pub fn exercises(&self, section_key: &str) -> Option<&SectionExercises> {
        self.exercises.get(section_key.trim())
    }

    pub fn summary(&self, section_key: &str) -> Option<&SectionSummary> {
        self.summaries.get(section_key.trim())
    }

    pub fn exercise(&self, section_key: &str, day: u32) -> Option<&DailyExercise> {
        self.exercises(section_key)?.exercise(day)
    }

    /// Section display title, preferring the exercises document.
    pub fn section_title(&self, section_key: &str) -> Option<&str> {
        self.exercises(section_key)
            .map(|section| section.title.as_str())
            .or_else(|| self.overview(section_key).map(|section| section.title.as_str()))
    }

    /// Keys present in any document, sorted.
    pub fn section_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .overviews
            .keys()
            .chain(self.exercises.keys())
            .chain(self.summaries.keys())
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }
}

fn parse_document<T: DeserializeOwned>(
    document: &'static str,
    json: &str,
) -> ContentResult<BTreeMap<String, T>> {
    serde_json::from_str::<SectionsDocument<T>>(json)
        .map(|parsed| parsed.sections)
        .map_err(|source| ContentError::Parse { document, source })
}

fn read_document(dir: &Path, file_name: &str) -> ContentResult<String> {
    let path = dir.join(file_name);
    std::fs::read_to_string(&path).map_err(|source| ContentError::Io { path, source })
}
