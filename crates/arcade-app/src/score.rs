//! Score reporting for finished games.

use std::{
    fs::{File, OpenOptions},
    io::{self, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::owner::SessionOwner;

/// The games offered by the hub.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    /// The memory-match card game.
    #[display("Memory Match")]
    Memory,
    /// The sliding tile puzzle.
    #[display("Sliding Puzzle")]
    Puzzle,
}

impl GameKind {
    /// Every game, in hub order.
    pub const ALL: [Self; 2] = [Self::Memory, Self::Puzzle];

    /// Returns the stable key used in score reports and on the command line.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Puzzle => "puzzle",
        }
    }

    /// Returns a one-line description for the hub listing.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Memory => "Find every pair of matching symbols.",
            Self::Puzzle => "Slide the tiles back into order.",
        }
    }
}

/// A finished game's result, as submitted to the score service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    /// Id of the session owner.
    pub user_id: u64,
    /// The game that was finished.
    pub game: GameKind,
    /// Final move count.
    pub score: u32,
}

impl ScoreReport {
    /// Creates a report for `owner`.
    #[must_use]
    pub fn new(owner: &SessionOwner, game: GameKind, score: u32) -> Self {
        Self {
            user_id: owner.id,
            game,
            score,
        }
    }
}

/// Errors returned by a [`ScoreReporter`].
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ScoreReportError {
    /// The report could not be written.
    #[display("failed to write score report: {_0}")]
    Io(#[from] io::Error),
    /// The report could not be encoded.
    #[display("failed to encode score report: {_0}")]
    Json(#[from] serde_json::Error),
}

/// A sink for finished-game results.
pub trait ScoreReporter {
    /// Submits one report.
    ///
    /// # Errors
    ///
    /// Returns an error if the report could not be delivered.
    fn report(&mut self, report: &ScoreReport) -> Result<(), ScoreReportError>;
}

/// A reporter that only writes reports to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogScoreReporter;

impl ScoreReporter for LogScoreReporter {
    fn report(&mut self, report: &ScoreReport) -> Result<(), ScoreReportError> {
        log::info!(
            "score: user {} finished {} with {}",
            report.user_id,
            report.game.key(),
            report.score
        );
        Ok(())
    }
}

/// A reporter that appends each report as one JSON line to a file.
#[derive(Debug, Clone)]
pub struct JsonLinesScoreReporter {
    path: PathBuf,
}

impl JsonLinesScoreReporter {
    /// Creates a reporter appending to `path`. The file is created on first use.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> io::Result<File> {
        OpenOptions::new().create(true).append(true).open(&self.path)
    }
}

impl ScoreReporter for JsonLinesScoreReporter {
    fn report(&mut self, report: &ScoreReport) -> Result<(), ScoreReportError> {
        let mut writer = BufWriter::new(self.open()?);
        serde_json::to_writer(&mut writer, report)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Reports a finished game on behalf of `owner`.
///
/// Nothing is reported without an owner. Delivery failures are logged and
/// otherwise ignored, so reporting never affects the game.
pub fn submit_score<R>(
    reporter: &mut R,
    owner: Option<&SessionOwner>,
    game: GameKind,
    score: u32,
) -> Option<ScoreReport>
where
    R: ScoreReporter + ?Sized,
{
    let Some(owner) = owner else {
        log::debug!("{} finished without a session owner, score not reported", game.key());
        return None;
    };
    let report = ScoreReport::new(owner, game, score);
    if let Err(err) = reporter.report(&report) {
        log::warn!("score report for user {} was not delivered: {err}", owner.id);
    }
    Some(report)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[derive(Default)]
    struct Recording(Vec<ScoreReport>);

    impl ScoreReporter for Recording {
        fn report(&mut self, report: &ScoreReport) -> Result<(), ScoreReportError> {
            self.0.push(report.clone());
            Ok(())
        }
    }

    struct Failing;

    impl ScoreReporter for Failing {
        fn report(&mut self, _report: &ScoreReport) -> Result<(), ScoreReportError> {
            Err(io::Error::other("service unavailable").into())
        }
    }

    #[test]
    fn test_report_wire_format() {
        let report = ScoreReport::new(&SessionOwner::new(9, "ana"), GameKind::Puzzle, 31);
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"userId":9,"game":"puzzle","score":31}"#
        );
    }

    #[test]
    fn test_game_kind_names() {
        assert_eq!(GameKind::ALL.map(GameKind::key), ["memory", "puzzle"]);
        assert_eq!(GameKind::Puzzle.to_string(), "Sliding Puzzle");
    }

    #[test]
    fn test_submit_requires_owner() {
        let mut reporter = Recording::default();
        assert_eq!(submit_score(&mut reporter, None, GameKind::Puzzle, 10), None);
        assert!(reporter.0.is_empty());

        let owner = SessionOwner::new(1, "leo");
        let report = submit_score(&mut reporter, Some(&owner), GameKind::Puzzle, 10);
        assert_eq!(reporter.0, [report.unwrap()]);
    }

    #[test]
    fn test_submit_ignores_delivery_failure() {
        let owner = SessionOwner::new(1, "leo");
        let report = submit_score(&mut Failing, Some(&owner), GameKind::Puzzle, 5);
        assert_eq!(report.map(|r| r.score), Some(5));
    }

    #[test]
    fn test_json_lines_reporter_appends() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("scores.jsonl");
        let mut reporter = JsonLinesScoreReporter::new(&path);
        let owner = SessionOwner::new(2, "mia");

        reporter
            .report(&ScoreReport::new(&owner, GameKind::Puzzle, 40))
            .unwrap();
        reporter
            .report(&ScoreReport::new(&owner, GameKind::Puzzle, 28))
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let reports: Vec<ScoreReport> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(reports.iter().map(|r| r.score).collect::<Vec<_>>(), [40, 28]);
        assert!(reports.iter().all(|r| r.user_id == 2));
    }

    #[test]
    fn test_json_lines_reporter_reports_unwritable_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut reporter = JsonLinesScoreReporter::new(dir.path());
        let report = ScoreReport::new(&SessionOwner::new(2, "mia"), GameKind::Puzzle, 1);
        assert!(matches!(
            reporter.report(&report),
            Err(ScoreReportError::Io(_))
        ));
    }
}
