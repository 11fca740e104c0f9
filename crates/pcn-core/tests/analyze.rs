use pcnminer::algorithms::registry::{AlgorithmRegistry, Family, Platform};
use pcnminer::engine::config::{AnalysisRequestBuilder, KGrid, NetworkSource, ProteinSelection};
use pcnminer::engine::error::EngineError;
use pcnminer::engine::progress::{Progress, ProgressReporter};
use pcnminer::engine::report::{BatchResult, UnitOutcome, UnitReport};
use pcnminer::workflows::analyze::{run, run_with_registry};
use std::f64::consts::TAU;
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};

/// A pentagon of alpha carbons whose sides and diagonals all fall inside 4-8 Å.
fn pentagon(center: f64) -> Vec<(f64, f64, f64)> {
    (0..5)
        .map(|i| {
            let angle = TAU * i as f64 / 5.0;
            (center + 4.0 * angle.cos(), 4.0 * angle.sin(), 0.0)
        })
        .collect()
}

fn pdb(positions: &[(f64, f64, f64)], chain: char) -> String {
    positions
        .iter()
        .enumerate()
        .map(|(i, (x, y, z))| {
            format!(
                "ATOM  {:>5} {:<4} {:>3} {}{:>4}    {:>8.3}{:>8.3}{:>8.3}  1.00  0.00           C\n",
                i + 1,
                " CA",
                "ALA",
                chain,
                i + 1,
                x,
                y,
                z
            )
        })
        .collect()
}

fn workspace(proteins: &[(&str, String)]) -> TempDir {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input");
    fs::create_dir_all(&input).unwrap();
    for (name, text) in proteins {
        fs::write(input.join(format!("{}.pdb", name)), text).unwrap();
    }
    dir
}

fn two_blocks() -> String {
    let mut positions = pentagon(0.0);
    positions.extend(pentagon(100.0));
    pdb(&positions, 'A')
}

fn builder(dir: &Path, family: Family, algorithms: &str) -> AnalysisRequestBuilder {
    AnalysisRequestBuilder::new()
        .working_dir(dir)
        .proteins(ProteinSelection::All)
        .family(family)
        .algorithms(algorithms)
}

fn unit<'a>(batch: &'a BatchResult, algorithm: &str) -> &'a UnitReport {
    batch
        .units
        .iter()
        .find(|u| u.algorithm == algorithm)
        .unwrap()
}

#[test]
fn two_components_give_two_communities_with_zero_participation() {
    let dir = workspace(&[("toy", two_blocks())]);
    let request = builder(dir.path(), Family::Community, "all")
        .participation(true)
        .build()
        .unwrap();
    let batch = run(&request, &ProgressReporter::new()).unwrap();

    let louvain = unit(&batch, "louvain");
    assert!(matches!(louvain.outcome, UnitOutcome::Completed { .. }));
    assert_eq!(louvain.k, Some(2));

    let part = dir
        .path()
        .join("output/Communities/louvain/Part_coefs_Sessions/toy_part_coefs_louvain_k2_CA.txt");
    let text = fs::read_to_string(part).unwrap();
    assert_eq!(text.matches(": 0.0").count(), 10, "{}", text);

    // Fluid communities and spin glass need a connected network.
    assert!(matches!(unit(&batch, "spinglass").outcome, UnitOutcome::Failed { .. }));
    assert!(dir.path().join("output/run_report.csv").is_file());
    assert!(dir.path().join("outputAdj/toy_adj_CA_4.0_8.0.txt").is_file());
    assert!(dir.path().join("outputAdj/adj_matrix_dict.json").is_file());
}

#[test]
fn excluded_algorithms_are_reported_as_skipped() {
    let dir = workspace(&[("toy", two_blocks())]);
    let request = builder(dir.path(), Family::Community, "louvain,infomap")
        .build()
        .unwrap();
    let registry = AlgorithmRegistry::for_platform(Platform::Windows);
    let batch = run_with_registry(&request, &registry, &ProgressReporter::new()).unwrap();
    assert!(matches!(unit(&batch, "infomap").outcome, UnitOutcome::Skipped { .. }));
    assert!(matches!(unit(&batch, "louvain").outcome, UnitOutcome::Completed { .. }));
    assert!(!dir.path().join("output/Communities/infomap").exists());
}

#[test]
fn repeated_runs_produce_identical_artifacts() {
    let dir = workspace(&[("toy", two_blocks())]);
    let request = builder(dir.path(), Family::Centrality, "all").build().unwrap();
    let path = dir
        .path()
        .join("output/Centralities/betweenness/Txt/toy_betweenness_CA.txt");

    run(&request, &ProgressReporter::new()).unwrap();
    let first = fs::read_to_string(&path).unwrap();
    let batch = run(&request, &ProgressReporter::new()).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), first);
    assert_eq!(batch.completed(), 4);
}

#[test]
fn best_k_finds_three_blocks() {
    let mut positions = pentagon(0.0);
    positions.extend(pentagon(100.0));
    positions.extend(pentagon(200.0));
    let dir = workspace(&[("toy", pdb(&positions, 'A'))]);
    let request = builder(dir.path(), Family::Spectral, "unnorm_hsc")
        .k_grid(KGrid::BestK { candidates: 1 })
        .build()
        .unwrap();
    let batch = run(&request, &ProgressReporter::new()).unwrap();
    let hsc = unit(&batch, "unnorm_hsc");
    assert_eq!(hsc.requested_k, Some(3));
    assert!(matches!(hsc.outcome, UnitOutcome::Completed { .. }));
}

#[test]
fn explicit_k_grid_runs_once_per_k() {
    let dir = workspace(&[("toy", two_blocks())]);
    let request = builder(dir.path(), Family::Spectral, "norm_hsc")
        .k_grid(KGrid::Explicit(vec![2, 3]))
        .build()
        .unwrap();
    let batch = run(&request, &ProgressReporter::new()).unwrap();
    let ks: Vec<_> = batch.units.iter().map(|u| u.requested_k).collect();
    assert_eq!(ks, vec![Some(2), Some(3)]);
}

#[test]
fn chain_less_protein_stops_but_batch_continues() {
    let mut blank = two_blocks();
    blank = blank
        .lines()
        .map(|line| format!("{} {}\n", &line[..21], &line[22..]))
        .collect();
    let dir = workspace(&[("bare", blank), ("good", two_blocks())]);
    let request = builder(dir.path(), Family::Centrality, "closeness,betweenness")
        .build()
        .unwrap();
    let batch = run(&request, &ProgressReporter::new()).unwrap();

    let bare: Vec<_> = batch.units_for("bare").collect();
    assert_eq!(bare.len(), 1);
    assert!(matches!(
        &bare[0].outcome,
        UnitOutcome::Failed { error: EngineError::ChainAnnotation { .. } }
    ));
    assert_eq!(batch.units_for("good").count(), 2);
    assert!(
        batch
            .units_for("good")
            .all(|u| matches!(u.outcome, UnitOutcome::Completed { .. }))
    );
}

#[test]
fn default_chain_fills_missing_annotations() {
    let blank: String = two_blocks()
        .lines()
        .map(|line| format!("{} {}\n", &line[..21], &line[22..]))
        .collect();
    let dir = workspace(&[("bare", blank)]);
    let request = builder(dir.path(), Family::Centrality, "degree_c")
        .default_chain(Some('A'))
        .build()
        .unwrap();
    let batch = run(&request, &ProgressReporter::new()).unwrap();
    assert_eq!(batch.completed(), 1);
}

#[test]
fn precomputed_matrix_is_read_and_validated() {
    let dir = workspace(&[("toy", two_blocks())]);
    let built = builder(dir.path(), Family::Centrality, "degree_c").build().unwrap();
    run(&built, &ProgressReporter::new()).unwrap();

    let adj = dir.path().join("adj");
    fs::create_dir_all(&adj).unwrap();
    let matrix = "toy_adj_CA_4.0_8.0.txt";
    fs::copy(dir.path().join("outputAdj").join(matrix), adj.join(matrix)).unwrap();
    let read = builder(dir.path(), Family::Centrality, "degree_c")
        .source(NetworkSource::Adj)
        .build()
        .unwrap();
    assert_eq!(run(&read, &ProgressReporter::new()).unwrap().completed(), 1);

    fs::write(adj.join(matrix), "0 1\n1 0\n").unwrap();
    let err = run(&read, &ProgressReporter::new()).unwrap_err();
    assert!(matches!(err, EngineError::Structure { .. }));
}

#[test]
fn discovered_structures_keep_their_file_case() {
    let dir = workspace(&[("1ABC", two_blocks())]);
    fs::write(dir.path().join("input/2xyz.PDB"), two_blocks()).unwrap();
    let request = builder(dir.path(), Family::Centrality, "degree_c").build().unwrap();

    let batch = run(&request, &ProgressReporter::new()).unwrap();
    assert_eq!(batch.completed(), 2);
    let proteins: Vec<&str> = batch.units.iter().map(|u| u.protein.as_str()).collect();
    assert_eq!(proteins, vec!["1ABC", "2xyz"]);
    assert!(
        dir.path()
            .join("output/Centralities/degree_c/Txt/1ABC_degree_c_CA.txt")
            .is_file()
    );
}

#[test]
fn missing_structure_aborts_the_batch() {
    let dir = workspace(&[]);
    let request = builder(dir.path(), Family::Centrality, "all")
        .proteins(ProteinSelection::List(vec!["absent".into()]))
        .build()
        .unwrap();
    let err = run(&request, &ProgressReporter::new()).unwrap_err();
    assert!(err.is_batch_fatal());
}

#[test]
fn progress_events_bracket_each_protein() {
    use std::sync::Mutex;
    let dir = workspace(&[("toy", two_blocks())]);
    let request = builder(dir.path(), Family::Centrality, "closeness").build().unwrap();
    let events = Mutex::new(Vec::new());
    let reporter = ProgressReporter::with_callback(Box::new(|event| {
        events.lock().unwrap().push(event);
    }));
    run(&request, &reporter).unwrap();
    drop(reporter);
    let events = events.into_inner().unwrap();
    assert!(matches!(events.first(), Some(Progress::PhaseStart { .. })));
    assert!(matches!(events.last(), Some(Progress::PhaseFinish)));
    assert!(events.iter().any(|e| matches!(e, Progress::TaskIncrement)));
}
