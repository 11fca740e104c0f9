/// Built-in values for everything the config file and the command line leave unset.
pub struct DefaultsConfig {
    pub proteins: String,
    pub algorithms: String,
    pub representative: String,
    pub min_distance: f64,
    pub max_distance: f64,
    pub weighting: String,
    pub source: String,
    pub k: String,
    pub n_best_ks: usize,
    pub dimension: usize,
    pub beta: f64,
    pub walk_length: usize,
    pub num_walks: usize,
    pub participation: bool,
    pub seed: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            proteins: "all".to_string(),
            algorithms: "all".to_string(),
            representative: "CA".to_string(),
            min_distance: 4.0,
            max_distance: 8.0,
            weighting: "binary".to_string(),
            source: "pdb".to_string(),
            k: "best_k".to_string(),
            n_best_ks: 1,
            dimension: 2,
            beta: 0.01,
            walk_length: 100,
            num_walks: 100,
            participation: false,
            seed: pcnminer::engine::config::DEFAULT_SEED,
        }
    }
}
