use pretty_assertions::assert_eq;
use vpmbench_common::BenchError;
use vpmbench_plugins::{predicates, select, Cutoff, EntryPoint, PluginRegistry};
use vpmbench_test_utils::{sample_dataset, PluginTree};

#[test]
fn discovery_skips_only_the_broken_manifest() {
    let tree = PluginTree::new();
    tree.native("Alpha", "");
    tree.native("Beta", "cutoff: [0.3, 0.6, 1.0]\n");
    tree.container("Gamma", "example/gamma:1", "");
    tree.manifest("broken-missing-name", "supported-variations: [SNP]\nreference-genomes: [hg19]\n");
    tree.manifest("broken-mode", "name: Delta\nsupported-variations: [SNP]\nreference-genomes: [hg19]\nentry-point: {mode: Java}\n");

    let discovery = PluginRegistry::new(tree.path()).scan().unwrap();
    let names: Vec<&str> = discovery.plugins.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Beta", "Gamma"]);
    assert_eq!(discovery.rejected.len(), 2);

    let beta = &discovery.plugins[1];
    assert!(matches!(beta.cutoff, Cutoff::Bands(ref b) if b.len() == 3));
    assert!(matches!(discovery.plugins[2].entry_point, EntryPoint::Container(_)));
}

#[test]
fn duplicate_plugin_names_are_a_registry_conflict() {
    let tree = PluginTree::new();
    tree.native("Alpha", "");
    tree.manifest(
        "copy",
        "name: Alpha\nsupported-variations: [SNP]\nreference-genomes: [hg19]\n\
         entry-point: {mode: Docker, image: x, run: x, input: {file-path: /i, format: CSV}, output: {file-path: /o, format: CSV}}\n",
    );
    let err = PluginRegistry::discover_at(tree.path()).unwrap_err();
    assert!(matches!(err, BenchError::RegistryConflict { ref name, .. } if name == "Alpha"));
    assert!(err.is_fatal());
}

#[test]
fn predicates_filter_discovered_plugins() {
    let tree = PluginTree::new();
    tree.native("Alpha", "databases: {ClinVar: '2020'}\n");
    tree.native("Beta", "cutoff: [0.3, 0.6, 1.0]\n");
    tree.native("Hg38Only", "");
    tree.manifest(
        "Hg38Only",
        "name: Hg38Only\nsupported-variations: [SNP]\nreference-genomes: [hg38]\n\
         entry-point: {mode: Python, file: Hg38Only.py}\n",
    );
    let plugins = PluginRegistry::discover_at(tree.path()).unwrap();

    let multiclass = select(&plugins, &*predicates::is_multiclass_plugin());
    assert_eq!(multiclass.len(), 1);
    assert_eq!(multiclass[0].name, "Beta");

    let clinvar = select(&plugins, &*predicates::was_trained_with("ClinVar"));
    assert_eq!(clinvar[0].name, "Alpha");

    let data = sample_dataset();
    let applicable: Vec<String> = select(&plugins, &*predicates::supports_dataset(&data))
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(applicable, vec!["Alpha".to_string(), "Beta".to_string()]);

    assert!(select(&plugins, &|_| false).is_empty());
}
