use super::error::EngineError;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum UnitOutcome {
    Completed { artifacts: Vec<PathBuf> },
    Skipped { reason: String },
    Failed { error: EngineError },
}

impl UnitOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            UnitOutcome::Completed { .. } => "completed",
            UnitOutcome::Skipped { .. } => "skipped",
            UnitOutcome::Failed { .. } => "failed",
        }
    }
}

/// One (protein, algorithm, k) unit of work.
#[derive(Debug)]
pub struct UnitReport {
    pub protein: String,
    pub algorithm: String,
    /// The k handed to the algorithm, if any.
    pub requested_k: Option<usize>,
    /// The realized cluster count, `max(label) + 1`.
    pub k: Option<usize>,
    pub outcome: UnitOutcome,
}

/// Everything a run did, returned to and owned by the caller.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub units: Vec<UnitReport>,
}

impl BatchResult {
    pub fn push(&mut self, unit: UnitReport) {
        self.units.push(unit);
    }

    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, UnitOutcome::Completed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, UnitOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, UnitOutcome::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&UnitOutcome) -> bool) -> usize {
        self.units.iter().filter(|u| predicate(&u.outcome)).count()
    }

    pub fn units_for<'a>(&'a self, protein: &'a str) -> impl Iterator<Item = &'a UnitReport> {
        self.units.iter().filter(move |u| u.protein == protein)
    }

    /// Writes one CSV row per unit.
    pub fn write_report<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for unit in &self.units {
            let detail = match &unit.outcome {
                UnitOutcome::Completed { artifacts } => format!("{} artifacts", artifacts.len()),
                UnitOutcome::Skipped { reason } => reason.clone(),
                UnitOutcome::Failed { error } => error.to_string(),
            };
            writer.serialize(ReportRow {
                protein: &unit.protein,
                algorithm: &unit.algorithm,
                requested_k: unit.requested_k,
                k: unit.k,
                status: unit.outcome.status(),
                detail,
            })?;
        }
        writer.flush()
    }
}

#[derive(Serialize)]
struct ReportRow<'a> {
    protein: &'a str,
    algorithm: &'a str,
    requested_k: Option<usize>,
    k: Option<usize>,
    status: &'static str,
    detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn unit(protein: &str, outcome: UnitOutcome) -> UnitReport {
        UnitReport {
            protein: protein.into(),
            algorithm: "louvain".into(),
            requested_k: None,
            k: Some(2),
            outcome,
        }
    }

    #[test]
    fn counts_distinguish_outcomes() {
        let mut batch = BatchResult::default();
        batch.push(unit("1abc", UnitOutcome::Completed { artifacts: vec![] }));
        batch.push(unit("1abc", UnitOutcome::Skipped { reason: "unsupported".into() }));
        batch.push(unit(
            "2xyz",
            UnitOutcome::Failed {
                error: EngineError::structure("2xyz", "boom"),
            },
        ));
        assert_eq!((batch.completed(), batch.skipped(), batch.failed()), (1, 1, 1));
        assert_eq!(batch.units_for("1abc").count(), 2);
    }

    #[test]
    fn report_has_header_and_one_row_per_unit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run_report.csv");
        let mut batch = BatchResult::default();
        batch.push(unit("1abc", UnitOutcome::Completed { artifacts: vec![PathBuf::from("a")] }));
        batch.push(unit("1abc", UnitOutcome::Skipped { reason: "unsupported".into() }));
        batch.write_report(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "protein,algorithm,requested_k,k,status,detail");
        assert_eq!(lines[1], "1abc,louvain,,2,completed,1 artifacts");
        assert_eq!(lines[2], "1abc,louvain,,2,skipped,unsupported");
    }
}
