use super::config::EmbeddingParams;
use crate::algorithms::registry::Algorithm;
use crate::core::models::network::{NetworkKey, Representative};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const INPUT_DIR: &str = "input";
pub const PRECOMPUTED_DIR: &str = "adj";
pub const BUILT_DIR: &str = "outputAdj";
pub const OUTPUT_DIR: &str = "output";
pub const NETWORK_INDEX_FILE: &str = "adj_matrix_dict.json";
pub const RUN_REPORT_FILE: &str = "run_report.csv";

/// Fixed children of every algorithm directory.
pub const SESSIONS_DIR: &str = "Sessions";
pub const TXT_DIR: &str = "Txt";
pub const CLUSTERS_DIR: &str = "Clusters";
pub const SUMMARY_DIR: &str = "Summary";
pub const PARTICIPATION_DIR: &str = "Part_coefs_Sessions";

pub const ALGORITHM_SUBDIRS: [&str; 5] = [
    SESSIONS_DIR,
    TXT_DIR,
    CLUSTERS_DIR,
    SUMMARY_DIR,
    PARTICIPATION_DIR,
];

/// Identifies the artifacts of one unit of work.
#[derive(Debug, Clone)]
pub struct ArtifactName<'a> {
    pub protein: &'a str,
    pub algorithm: Algorithm,
    pub representative: Representative,
    /// Reconciled cluster count; `None` for centrality units.
    pub k: Option<usize>,
    /// Embedding hyperparameters, for embedding units only.
    pub embedding: Option<EmbeddingParams>,
}

impl ArtifactName<'_> {
    /// `k<k>`, prefixed by `d<d>_` and `beta<β>_` or `wl<len>_nw<walks>_` for embeddings.
    pub fn tag(&self) -> Option<String> {
        let k = self.k?;
        let mut tag = String::new();
        if let Some(params) = self.embedding {
            tag.push_str(&format!("d{}_", params.dimension));
            if self.algorithm.is_hope() {
                tag.push_str(&format!("beta{}_", params.beta));
            } else if self.algorithm.is_node2vec() {
                tag.push_str(&format!("wl{}_nw{}_", params.walk_length, params.num_walks));
            }
        }
        tag.push_str(&format!("k{}", k));
        Some(tag)
    }

    /// `<protein>_<algorithm>[_<tag>]_<type>`
    pub fn stem(&self) -> String {
        match self.tag() {
            Some(tag) => format!(
                "{}_{}_{}_{}",
                self.protein,
                self.algorithm.name(),
                tag,
                self.representative.tag()
            ),
            None => format!(
                "{}_{}_{}",
                self.protein,
                self.algorithm.name(),
                self.representative.tag()
            ),
        }
    }
}

/// Every path of a run, relative to the working directory.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: working_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn input_dir(&self) -> PathBuf {
        self.root.join(INPUT_DIR)
    }

    /// `input/<protein>.pdb`, or the input file with that stem and an upper-case
    /// extension when only that one exists.
    pub fn structure_path(&self, protein: &str) -> PathBuf {
        let path = self.input_dir().join(format!("{}.pdb", protein));
        if path.is_file() {
            return path;
        }
        fs::read_dir(self.input_dir())
            .ok()
            .and_then(|entries| {
                entries
                    .filter_map(Result::ok)
                    .map(|entry| entry.path())
                    .find(|candidate| {
                        is_structure_file(candidate)
                            && candidate.file_stem().and_then(|s| s.to_str()) == Some(protein)
                    })
            })
            .unwrap_or(path)
    }

    pub fn precomputed_matrix_path(&self, key: &NetworkKey) -> PathBuf {
        self.root.join(PRECOMPUTED_DIR).join(key.file_name())
    }

    pub fn built_matrix_dir(&self) -> PathBuf {
        self.root.join(BUILT_DIR)
    }

    pub fn built_matrix_path(&self, key: &NetworkKey) -> PathBuf {
        self.built_matrix_dir().join(key.file_name())
    }

    pub fn network_index_path(&self) -> PathBuf {
        self.built_matrix_dir().join(NETWORK_INDEX_FILE)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(OUTPUT_DIR)
    }

    pub fn run_report_path(&self) -> PathBuf {
        self.output_dir().join(RUN_REPORT_FILE)
    }

    pub fn algorithm_dir(&self, algorithm: Algorithm) -> PathBuf {
        self.output_dir()
            .join(algorithm.family().output_dir())
            .join(algorithm.name())
    }

    /// Creates the algorithm directory with all of its fixed children.
    pub fn ensure_algorithm_dirs(&self, algorithm: Algorithm) -> io::Result<()> {
        let base = self.algorithm_dir(algorithm);
        for child in ALGORITHM_SUBDIRS {
            fs::create_dir_all(base.join(child))?;
        }
        Ok(())
    }

    pub fn values_path(&self, name: &ArtifactName) -> PathBuf {
        self.algorithm_dir(name.algorithm)
            .join(TXT_DIR)
            .join(format!("{}.txt", name.stem()))
    }

    pub fn cluster_dump_path(&self, name: &ArtifactName) -> PathBuf {
        self.algorithm_dir(name.algorithm)
            .join(CLUSTERS_DIR)
            .join(format!("{}.txt", name.stem()))
    }

    pub fn summary_path(&self, name: &ArtifactName) -> PathBuf {
        self.algorithm_dir(name.algorithm)
            .join(SUMMARY_DIR)
            .join(format!("{}.csv", name.stem()))
    }

    pub fn session_path(&self, name: &ArtifactName) -> PathBuf {
        self.algorithm_dir(name.algorithm)
            .join(SESSIONS_DIR)
            .join(format!("{}_session.json", name.stem()))
    }

    /// Participation coefficient and z-intraconnectivity files of a labelled unit.
    pub fn participation_paths(&self, name: &ArtifactName, k: usize) -> (PathBuf, PathBuf) {
        let dir = self.algorithm_dir(name.algorithm).join(PARTICIPATION_DIR);
        let file = |kind: &str| {
            dir.join(format!(
                "{}_{}_{}_k{}_{}.txt",
                name.protein,
                kind,
                name.algorithm.name(),
                k,
                name.representative.tag()
            ))
        };
        (file("part_coefs"), file("z_intraconn"))
    }

    /// File stems of every `*.pdb` file in the input directory, as found on disk, sorted.
    pub fn discover_proteins(&self) -> io::Result<Vec<String>> {
        let mut proteins: Vec<String> = fs::read_dir(self.input_dir())?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| is_structure_file(path))
            .filter_map(|path| path.file_stem().and_then(|stem| stem.to_str()).map(str::to_owned))
            .collect();
        proteins.sort();
        proteins.dedup();
        Ok(proteins)
    }
}

fn is_structure_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdb"))
}
