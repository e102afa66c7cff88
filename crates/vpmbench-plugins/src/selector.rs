//! Plugin Selector: predicate filtering over discovered plugins.

use std::sync::Arc;

use crate::plugin::Plugin;

/// Boolean function over a plugin's public attributes. `true` means run it.
pub type PluginPredicate = Arc<dyn Fn(&Plugin) -> bool + Send + Sync>;

/// Keep the plugins `predicate` accepts, preserving order. An empty result is valid.
pub fn select(plugins: &[Plugin], predicate: &dyn Fn(&Plugin) -> bool) -> Vec<Plugin> {
    plugins.iter().filter(|p| predicate(p)).cloned().collect()
}

/// Ready-made predicates.
pub mod predicates {
    use std::sync::Arc;

    use vpmbench_common::EvaluationData;

    use super::PluginPredicate;

    pub fn all_plugins() -> PluginPredicate {
        Arc::new(|_| true)
    }

    pub fn by_name<I, S>(names: I) -> PluginPredicate
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        Arc::new(move |p| names.iter().any(|n| n == &p.name))
    }

    pub fn is_multiclass_plugin() -> PluginPredicate {
        Arc::new(|p| p.is_multiclass())
    }

    /// Plugins whose declared training databases include `database` (case-insensitive).
    pub fn was_trained_with(database: impl Into<String>) -> PluginPredicate {
        let database = database.into();
        Arc::new(move |p| p.databases.keys().any(|d| d.eq_ignore_ascii_case(&database)))
    }

    /// Plugins that claim every row's reference genome, variation type and chromosome.
    pub fn supports_dataset(data: &EvaluationData) -> PluginPredicate {
        let rows = data.rows().to_vec();
        Arc::new(move |p| {
            rows.iter().all(|row| {
                p.reference_genomes.contains(&row.reference_genome)
                    && p.supported_variations.contains(&row.variation_type)
                    && p.supported_chromosomes.contains(&row.chrom)
            })
        })
    }

    /// Both predicates accept.
    pub fn and(a: PluginPredicate, b: PluginPredicate) -> PluginPredicate {
        Arc::new(move |p| a(p) && b(p))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};
    use std::path::PathBuf;

    use vpmbench_common::{EvaluationData, EvaluationDataEntry, ReferenceGenome, VariationType};

    use super::predicates::*;
    use super::*;
    use crate::cutoff::{Boundary, Cutoff};
    use crate::plugin::{EntryPoint, NativeEntryPoint};

    fn plugin(name: &str, cutoff: Cutoff, databases: &[&str]) -> Plugin {
        Plugin {
            name: name.to_string(),
            version: None,
            supported_variations: BTreeSet::from([VariationType::Snp]),
            reference_genomes: BTreeSet::from([ReferenceGenome::Hg19]),
            supported_chromosomes: ["1", "2", "X"].iter().map(|c| c.to_string()).collect(),
            cutoff,
            databases: databases.iter().map(|d| (d.to_string(), String::new())).collect::<BTreeMap<_, _>>(),
            entry_point: EntryPoint::Native(NativeEntryPoint {
                declared: "s".to_string(),
                file: PathBuf::from("s"),
            }),
            manifest_root: PathBuf::new(),
            manifest_path: PathBuf::new(),
        }
    }

    fn plugins() -> Vec<Plugin> {
        let bands = Cutoff::bands(vec![Boundary::below(0.3), Boundary::below(0.6), Boundary::below(1.0)]).unwrap();
        vec![
            plugin("a", Cutoff::default(), &["ClinVar"]),
            plugin("b", bands, &[]),
            plugin("c", Cutoff::default(), &["gnomAD"]),
        ]
    }

    fn names(selected: &[Plugin]) -> Vec<&str> {
        selected.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_select_preserves_order() {
        assert_eq!(names(&select(&plugins(), &*all_plugins())), vec!["a", "b", "c"]);
        assert_eq!(names(&select(&plugins(), &*by_name(["c", "a"]))), vec!["a", "c"]);
        assert!(select(&plugins(), &|_| false).is_empty());
    }

    #[test]
    fn test_attribute_predicates() {
        assert_eq!(names(&select(&plugins(), &*is_multiclass_plugin())), vec!["b"]);
        assert_eq!(names(&select(&plugins(), &*was_trained_with("clinvar"))), vec!["a"]);
        let combined = and(all_plugins(), was_trained_with("gnomad"));
        assert_eq!(names(&select(&plugins(), &*combined)), vec!["c"]);
    }

    #[test]
    fn test_supports_dataset() {
        let entry = |chrom: &str, vt| {
            EvaluationDataEntry::new(chrom, 10, "A", "G", ReferenceGenome::Hg19, vt, "benign")
        };
        let covered = EvaluationData::from_records(vec![entry("1", VariationType::Snp), entry("X", VariationType::Snp)]).unwrap();
        assert_eq!(select(&plugins(), &*supports_dataset(&covered)).len(), 3);

        let uncovered = EvaluationData::from_records(vec![entry("1", VariationType::Snp), entry("5", VariationType::Snp)]).unwrap();
        assert!(select(&plugins(), &*supports_dataset(&uncovered)).is_empty());
    }
}
