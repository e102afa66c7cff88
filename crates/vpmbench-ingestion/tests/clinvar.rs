use std::io::Write;

use pretty_assertions::assert_eq;
use vpmbench_common::{BenchError, ReferenceGenome, VariationType};
use vpmbench_ingestion::{extract_evaluation_data, ClinVarVcfExtractor, Extractor};

const GRCH37_VCF: &str = "\
##fileformat=VCFv4.1
##fileDate=2020-06-01
##reference=GRCh37
##INFO=<ID=CLNSIG,Number=.,Type=String,Description=\"Clinical significance\">
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO
1\t865694\t1\tC\tT\t.\t.\tAF_ESP=0.0001;CLNSIG=Pathogenic
2\t47630108\t2\tG\tA,C\t.\t.\tCLNSIG=Likely_benign;RS=3
7\t117199644\t3\tATCT\tA\t.\t.\tCLNSIG=Pathogenic/Likely_pathogenic
";

fn vcf(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".vcf").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn clinvar_vcf_is_extracted_with_dense_uids() {
    let file = vcf(GRCH37_VCF);
    let data = ClinVarVcfExtractor.extract(file.path()).unwrap();

    let uids: Vec<usize> = data.uids().collect();
    assert_eq!(uids, vec![0, 1, 2]);
    assert_eq!(data.expected_classes(), &["pathogenic", "benign", "pathogenic"]);
    assert!(data.rows().iter().all(|r| r.reference_genome == ReferenceGenome::Hg19));
    assert_eq!(data.rows()[1].alt_allele, "A");
    assert_eq!(data.rows()[2].variation_type, VariationType::Indel);
}

#[test]
fn default_extractor_reads_vcf() {
    let file = vcf(GRCH37_VCF);
    let data = extract_evaluation_data(file.path(), None).unwrap();
    assert_eq!(data.len(), 3);
}

#[test]
fn unresolvable_records_fail_the_whole_file() {
    let file = vcf(&GRCH37_VCF.replace("CLNSIG=Likely_benign", "CLNSIG=Uncertain_significance"));
    assert!(matches!(ClinVarVcfExtractor.extract(file.path()), Err(BenchError::Extraction(_))));

    let no_reference = vcf(&GRCH37_VCF.replace("##reference=GRCh37\n", ""));
    let err = ClinVarVcfExtractor.extract(no_reference.path()).unwrap_err();
    assert!(err.to_string().contains("##reference"));
}
