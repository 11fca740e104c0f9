use crate::cli::AlgorithmsArgs;
use crate::error::{CliError, Result};
use itertools::Itertools;
use pcnminer::algorithms::registry::{AlgorithmRegistry, Family};

pub fn run(args: AlgorithmsArgs) -> Result<()> {
    let families = match &args.family {
        Some(name) => vec![
            name.parse::<Family>()
                .map_err(|e| CliError::Argument(e.to_string()))?,
        ],
        None => Family::ALL.to_vec(),
    };
    print!("{}", render(&AlgorithmRegistry::current(), &families));
    Ok(())
}

/// One block per family; the numbers are the indices accepted by `--algorithms`.
fn render(registry: &AlgorithmRegistry, families: &[Family]) -> String {
    families
        .iter()
        .map(|&family| {
            let entries = registry
                .algorithms(family)
                .iter()
                .enumerate()
                .map(|(i, algorithm)| format!("  {:>2}. {}", i + 1, algorithm))
                .join("\n");
            format!("{} (0 or 'all' selects every entry):\n{}\n", family, entries)
        })
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcnminer::algorithms::registry::Platform;

    #[test]
    fn listing_numbers_entries_from_one() {
        let registry = AlgorithmRegistry::for_platform(Platform::Unix);
        let text = render(&registry, &[Family::Centrality]);
        assert_eq!(
            text,
            "centrality (0 or 'all' selects every entry):\n   1. closeness\n   2. eigenvector_c\n   3. betweenness\n   4. degree_c\n"
        );
    }

    #[test]
    fn windows_listing_omits_infomap() {
        let windows = render(&AlgorithmRegistry::for_platform(Platform::Windows), &[Family::Community]);
        let unix = render(&AlgorithmRegistry::for_platform(Platform::Unix), &[Family::Community]);
        assert!(!windows.contains("infomap"));
        assert!(unix.contains("infomap"));
    }
}
