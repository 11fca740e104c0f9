use crate::algorithms::best_k;
use crate::algorithms::labels;
use crate::algorithms::laplacian::LaplacianKind;
use crate::algorithms::participation;
use crate::algorithms::registry::{Algorithm, AlgorithmOutput, AlgorithmRegistry, Family};
use crate::core::contacts::builder;
use crate::core::io::adjacency;
use crate::core::io::mapping::{self, SessionDescriptor, SessionEntry};
use crate::core::io::pdb::PdbFile;
use crate::core::io::traits::StructureFile;
use crate::core::models::network::{ContactNetwork, NetworkKey};
use crate::core::models::structure::Structure;
use crate::engine::cache::NetworkCache;
use crate::engine::config::{AnalysisRequest, ConfigError, KGrid, NetworkSource, ProteinSelection};
use crate::engine::error::EngineError;
use crate::engine::layout::{ArtifactName, OutputLayout};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::report::{BatchResult, UnitOutcome, UnitReport};
use itertools::Itertools;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Runs a whole batch: every selected protein against every selected algorithm and
/// k value of the request's family.
///
/// Configuration and structure problems abort the batch. Failures of a single unit of
/// work are recorded in the returned [`BatchResult`] and the sweep goes on; a missing
/// chain annotation ends the work for that protein only.
pub fn run(request: &AnalysisRequest, reporter: &ProgressReporter) -> Result<BatchResult, EngineError> {
    run_with_registry(request, &AlgorithmRegistry::current(), reporter)
}

#[instrument(skip_all, name = "analysis_workflow", fields(family = %request.family))]
pub fn run_with_registry(
    request: &AnalysisRequest,
    registry: &AlgorithmRegistry,
    reporter: &ProgressReporter,
) -> Result<BatchResult, EngineError> {
    // === ResolveConfig ===
    let layout = OutputLayout::new(&request.working_dir);
    if !layout.root().is_dir() {
        return Err(ConfigError::WorkingDirectory {
            path: request.working_dir.clone(),
            reason: "not an existing directory".into(),
        }
        .into());
    }
    let selection = registry.select(request.family, &request.algorithms);
    let proteins = resolve_proteins(request, &layout)?;
    info!(
        proteins = proteins.len(),
        algorithms = %selection.algorithms.iter().map(|a| a.name()).join(", "),
        "Batch resolved."
    );
    for algorithm in &selection.algorithms {
        layout
            .ensure_algorithm_dirs(*algorithm)
            .map_err(|e| EngineError::io(layout.algorithm_dir(*algorithm), e))?;
    }

    let mut cache = NetworkCache::new();
    let mut batch = BatchResult::default();

    for protein in &proteins {
        reporter.phase(format!("Analyzing {}", protein));

        for (entry, reason) in &selection.unsupported {
            let error = EngineError::UnsupportedAlgorithm {
                entry: entry.clone(),
                source: reason.clone(),
            };
            warn!(protein = %protein, "{}", error);
            batch.push(UnitReport {
                protein: protein.clone(),
                algorithm: entry.clone(),
                requested_k: None,
                k: None,
                outcome: UnitOutcome::Skipped {
                    reason: error.to_string(),
                },
            });
        }

        // === BuildOrReadNetwork ===
        let structure_path = layout.structure_path(protein);
        let structure = PdbFile::read_from_path(&structure_path)
            .map_err(|e| EngineError::structure(protein, format!("{}: {}", structure_path.display(), e)))?;
        if structure.is_empty() {
            return Err(EngineError::structure(
                protein,
                format!("{}: no residues", structure_path.display()),
            ));
        }
        let key = NetworkKey::new(protein, request.contacts.representative, request.contacts.band);
        let network = cache.get_or_try_insert_with(&key, || {
            load_network(request, &layout, &key, &structure)
        })?;

        let context = ProteinRun {
            request,
            layout: &layout,
            protein,
            structure_path,
            network,
            ids: network.residue_ids(),
            has_chains: structure.has_chain_annotations(),
        };
        if !context.has_chains {
            warn!(protein = %protein, "Structure has residues without a chain identifier.");
        }

        reporter.report(Progress::TaskStart {
            total_steps: selection.algorithms.len() as u64,
        });
        let stop = context.sweep(&selection.algorithms, &mut batch, reporter)?;
        reporter.report(Progress::TaskFinish);
        if let Some(reason) = stop {
            reporter.message(format!("{}: remaining work skipped ({})", protein, reason));
        }
        reporter.report(Progress::PhaseFinish);
    }

    // === PersistAndReport ===
    let report_path = layout.run_report_path();
    fs::create_dir_all(layout.output_dir()).map_err(|e| EngineError::io(layout.output_dir(), e))?;
    batch
        .write_report(&report_path)
        .map_err(|e| EngineError::io(&report_path, e))?;
    info!(
        completed = batch.completed(),
        skipped = batch.skipped(),
        failed = batch.failed(),
        "Batch finished."
    );
    Ok(batch)
}

fn resolve_proteins(
    request: &AnalysisRequest,
    layout: &OutputLayout,
) -> Result<Vec<String>, EngineError> {
    match &request.proteins {
        ProteinSelection::List(proteins) => Ok(proteins.clone()),
        ProteinSelection::All => layout.discover_proteins().map_err(|e| {
            ConfigError::WorkingDirectory {
                path: layout.input_dir(),
                reason: e.to_string(),
            }
            .into()
        }),
    }
}

/// Builds the network from the structure (and persists it), or reads the precomputed
/// matrix and checks it against the structure's residues.
fn load_network(
    request: &AnalysisRequest,
    layout: &OutputLayout,
    key: &NetworkKey,
    structure: &Structure,
) -> Result<ContactNetwork, EngineError> {
    let protein = key.protein.as_str();
    match request.source {
        NetworkSource::Pdb => {
            let network = builder::build_network(structure, &request.contacts)
                .map_err(|e| EngineError::structure(protein, e))?;
            let dir = layout.built_matrix_dir();
            fs::create_dir_all(&dir).map_err(|e| EngineError::io(&dir, e))?;
            let path = layout.built_matrix_path(key);
            adjacency::write_adjacency_path(network.adjacency(), &path)
                .map_err(|e| EngineError::io(&path, e))?;
            let index = layout.network_index_path();
            mapping::update_network_index(&index, &key.file_name(), &network.residue_ids())
                .map_err(|e| EngineError::io(&index, e))?;
            info!(protein, residues = network.len(), contacts = network.contact_count(), "Contact network built.");
            Ok(network)
        }
        NetworkSource::Adj => {
            let path = layout.precomputed_matrix_path(key);
            let matrix = adjacency::read_adjacency_path(&path)
                .map_err(|e| EngineError::structure(protein, format!("{}: {}", path.display(), e)))?;
            let (residues, _) = builder::resolve_residues(structure, request.contacts.representative);
            let network = ContactNetwork::new(residues, matrix)
                .map_err(|e| EngineError::structure(protein, format!("{}: {}", path.display(), e)))?;
            info!(protein, residues = network.len(), "Contact network read.");
            Ok(network)
        }
    }
}

/// The number of clusters a label vector actually realizes.
fn reconcile(requested: Option<usize>, labels: &[usize]) -> usize {
    let realized = labels::cluster_count(labels);
    if let Some(k) = requested.filter(|&k| k != realized) {
        info!(requested = k, realized, "Realized cluster count differs from the requested k.");
    }
    realized
}

struct ProteinRun<'a> {
    request: &'a AnalysisRequest,
    layout: &'a OutputLayout,
    protein: &'a str,
    structure_path: PathBuf,
    network: &'a ContactNetwork,
    ids: Vec<String>,
    has_chains: bool,
}

impl ProteinRun<'_> {
    /// Sweeps all algorithms; returns why this protein ended early, if it did.
    fn sweep(
        &self,
        algorithms: &[Algorithm],
        batch: &mut BatchResult,
        reporter: &ProgressReporter,
    ) -> Result<Option<String>, EngineError> {
        for &algorithm in algorithms {
            reporter.report(Progress::TaskIncrement);
            let ks = match self.k_values(algorithm) {
                Ok(ks) => ks,
                Err(error) => {
                    warn!(protein = self.protein, algorithm = algorithm.name(), "{}", error);
                    batch.push(self.report(algorithm, None, None, UnitOutcome::Failed { error }));
                    continue;
                }
            };
            if ks.iter().any(Option::is_some) {
                debug!(algorithm = algorithm.name(), ks = %ks.iter().flatten().join(", "), "k grid resolved.");
            }

            for requested_k in ks {
                match self.run_unit(algorithm, requested_k) {
                    Ok((k, artifacts)) => {
                        batch.push(self.report(
                            algorithm,
                            requested_k,
                            k,
                            UnitOutcome::Completed { artifacts },
                        ));
                    }
                    Err(error) if error.is_batch_fatal() => return Err(error),
                    Err(error) => {
                        warn!(protein = self.protein, algorithm = algorithm.name(), "{}", error);
                        let stop = error.is_protein_fatal().then(|| error.to_string());
                        batch.push(self.report(
                            algorithm,
                            requested_k,
                            None,
                            UnitOutcome::Failed { error },
                        ));
                        if stop.is_some() {
                            return Ok(stop);
                        }
                    }
                }
            }
        }
        Ok(None)
    }

    fn report(
        &self,
        algorithm: Algorithm,
        requested_k: Option<usize>,
        k: Option<usize>,
        outcome: UnitOutcome,
    ) -> UnitReport {
        UnitReport {
            protein: self.protein.to_string(),
            algorithm: algorithm.name().to_string(),
            requested_k,
            k,
            outcome,
        }
    }

    /// The k values an algorithm is invoked with; `[None]` when it takes no k.
    fn k_values(&self, algorithm: Algorithm) -> Result<Vec<Option<usize>>, EngineError> {
        if !algorithm.requires_k() {
            return Ok(vec![None]);
        }
        match &self.request.k_grid {
            KGrid::Explicit(ks) => Ok(ks.iter().copied().map(Some).collect()),
            KGrid::BestK { candidates } => {
                let kind = algorithm.laplacian().unwrap_or(LaplacianKind::Unnormalized);
                best_k::best_ks(self.network, kind, *candidates)
                    .map(|ks| ks.into_iter().map(Some).collect())
                    .map_err(|e| EngineError::algorithm(algorithm.name(), e))
            }
        }
    }

    fn artifact_name(&self, algorithm: Algorithm, k: Option<usize>) -> ArtifactName<'_> {
        ArtifactName {
            protein: self.protein,
            algorithm,
            representative: self.request.contacts.representative,
            k,
            embedding: (algorithm.family() == Family::Embedding).then_some(self.request.embedding),
        }
    }

    fn run_unit(
        &self,
        algorithm: Algorithm,
        requested_k: Option<usize>,
    ) -> Result<(Option<usize>, Vec<PathBuf>), EngineError> {
        let mut params = self.request.algorithm_params();
        params.k = requested_k;
        let output = algorithm
            .run(self.network, &params)
            .map_err(|e| EngineError::algorithm(algorithm.name(), e))?;
        match output {
            AlgorithmOutput::Scores(scores) => {
                let artifacts = self.persist_scores(algorithm, &scores)?;
                Ok((None, artifacts))
            }
            AlgorithmOutput::Labels(labels) => {
                let (k, artifacts) = self.persist_labels(algorithm, requested_k, &labels)?;
                Ok((Some(k), artifacts))
            }
        }
    }

    fn persist_scores(&self, algorithm: Algorithm, scores: &[f64]) -> Result<Vec<PathBuf>, EngineError> {
        let name = self.artifact_name(algorithm, None);
        let path = self.layout.values_path(&name);
        mapping::write_mapping_path(&path, &self.ids, scores).map_err(|e| EngineError::io(&path, e))?;
        let mut artifacts = vec![path];
        artifacts.push(self.write_session(&name, scores)?);
        Ok(artifacts)
    }

    /// Persists a label assignment under its realized cluster count.
    fn persist_labels(
        &self,
        algorithm: Algorithm,
        requested_k: Option<usize>,
        labels: &[usize],
    ) -> Result<(usize, Vec<PathBuf>), EngineError> {
        let k = reconcile(requested_k, labels);
        let name = self.artifact_name(algorithm, Some(k));
        let mut artifacts = Vec::new();

        let path = self.layout.values_path(&name);
        mapping::write_mapping_path(&path, &self.ids, labels).map_err(|e| EngineError::io(&path, e))?;
        artifacts.push(path);

        let path = self.layout.cluster_dump_path(&name);
        mapping::write_cluster_dump_path(&path, &self.ids, labels)
            .map_err(|e| EngineError::io(&path, e))?;
        artifacts.push(path);

        let path = self.layout.summary_path(&name);
        let summary = mapping::summarize_clusters(self.network, labels);
        mapping::write_cluster_summary_path(&path, &summary).map_err(|e| EngineError::io(&path, e))?;
        artifacts.push(path);

        artifacts.push(self.write_session(&name, labels)?);

        if self.request.participation {
            let profile = participation::score(self.network, labels);
            let (p_path, z_path) = self.layout.participation_paths(&name, k);
            mapping::write_mapping_path(&p_path, &self.ids, &profile.participation)
                .map_err(|e| EngineError::io(&p_path, e))?;
            mapping::write_mapping_path(&z_path, &self.ids, &profile.z_intraconnectivity)
                .map_err(|e| EngineError::io(&z_path, e))?;
            artifacts.push(p_path);
            artifacts.push(z_path);
        }
        Ok((k, artifacts))
    }

    /// The visualization hand-off. Every residue needs a chain-qualified selection, so a
    /// chain-less structure without a default chain fails here.
    fn write_session<V: Serialize + Clone>(
        &self,
        name: &ArtifactName,
        values: &[V],
    ) -> Result<PathBuf, EngineError> {
        let chain_error = || EngineError::ChainAnnotation {
            protein: self.protein.to_string(),
            path: self.structure_path.clone(),
        };
        let entries = self
            .network
            .residues()
            .iter()
            .zip(values)
            .map(|(residue, value)| {
                let selection = residue
                    .selection(self.request.default_chain)
                    .ok_or_else(chain_error)?;
                Ok(SessionEntry {
                    residue: residue.identifier(),
                    selection,
                    value: value.clone(),
                })
            })
            .collect::<Result<Vec<_>, EngineError>>()?;

        let session = SessionDescriptor {
            structure: display_path(&self.structure_path),
            protein: self.protein.to_string(),
            algorithm: name.algorithm.name().to_string(),
            k: name.k,
            representative: name.representative.tag().to_string(),
            entries,
        };
        let path = self.layout.session_path(name);
        mapping::write_session_path(&path, &session).map_err(|e| EngineError::io(&path, e))?;
        Ok(path)
    }
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::community::fixtures::two_cliques;
    use crate::engine::config::AnalysisRequestBuilder;
    use tempfile::tempdir;

    fn request(dir: &Path, family: Family) -> AnalysisRequest {
        AnalysisRequestBuilder::new()
            .working_dir(dir)
            .proteins(ProteinSelection::List(vec!["toy".into()]))
            .family(family)
            .participation(true)
            .build()
            .unwrap()
    }

    fn protein_run<'a>(
        request: &'a AnalysisRequest,
        layout: &'a OutputLayout,
        network: &'a ContactNetwork,
    ) -> ProteinRun<'a> {
        ProteinRun {
            request,
            layout,
            protein: "toy",
            structure_path: layout.structure_path("toy"),
            network,
            ids: network.residue_ids(),
            has_chains: true,
        }
    }

    #[test]
    fn reconcile_uses_the_realized_count() {
        assert_eq!(reconcile(Some(4), &[0, 1, 1, 0]), 2);
        assert_eq!(reconcile(None, &[0, 1, 2]), 3);
    }

    #[test]
    fn artifacts_are_named_after_the_realized_k() {
        let dir = tempdir().unwrap();
        let request = request(dir.path(), Family::Spectral);
        let layout = OutputLayout::new(dir.path());
        layout.ensure_algorithm_dirs(Algorithm::NormSoftSpectral).unwrap();
        let network = two_cliques(3);
        let run = protein_run(&request, &layout, &network);

        let labels = vec![0, 0, 0, 1, 1, 1];
        let (k, artifacts) = run
            .persist_labels(Algorithm::NormSoftSpectral, Some(3), &labels)
            .unwrap();
        assert_eq!(k, 2);
        assert_eq!(artifacts.len(), 6);
        for path in &artifacts {
            let file = path.file_name().unwrap().to_string_lossy().into_owned();
            assert!(file.contains("_k2_"), "{}", file);
            assert!(!file.contains("k3"), "{}", file);
            assert!(path.is_file());
        }
    }

    #[test]
    fn chain_less_residues_fail_the_session() {
        let dir = tempdir().unwrap();
        let request = request(dir.path(), Family::Community);
        let layout = OutputLayout::new(dir.path());
        layout.ensure_algorithm_dirs(Algorithm::Louvain).unwrap();
        let residues = vec![
            crate::core::models::residue::Residue::new(1, None, "ALA", None),
            crate::core::models::residue::Residue::new(2, None, "GLY", None),
        ];
        let network =
            ContactNetwork::new(residues, nalgebra::DMatrix::from_element(2, 2, 1.0)).unwrap();
        let run = protein_run(&request, &layout, &network);
        let err = run
            .persist_labels(Algorithm::Louvain, None, &[0, 0])
            .unwrap_err();
        assert!(matches!(err, EngineError::ChainAnnotation { .. }));
        assert!(err.is_protein_fatal());
    }

    #[test]
    fn missing_working_directory_is_a_config_error() {
        let dir = tempdir().unwrap();
        let request = request(&dir.path().join("absent"), Family::Community);
        let err = run(&request, &ProgressReporter::new()).unwrap_err();
        assert!(matches!(err, EngineError::Config(ConfigError::WorkingDirectory { .. })));
        assert!(err.is_batch_fatal());
    }
}
