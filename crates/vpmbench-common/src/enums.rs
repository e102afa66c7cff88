//! Variation types and reference genomes shared by datasets and plugin manifests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of variation a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariationType {
    Snp,
    Indel,
    Coding,
    NonCoding,
}

impl VariationType {
    pub const ALL: [VariationType; 4] = [
        VariationType::Snp,
        VariationType::Indel,
        VariationType::Coding,
        VariationType::NonCoding,
    ];

    /// Resolve a manifest or dataset token, ignoring case, surrounding whitespace and the
    /// usual spelling variants.
    pub fn resolve(name: &str) -> Option<Self> {
        let token = name.trim().to_ascii_lowercase().replace('_', "-");
        match token.as_str() {
            "snp" | "snv" => Some(VariationType::Snp),
            "indel" => Some(VariationType::Indel),
            // "conding" is how older manifests spell it
            "coding" | "conding" => Some(VariationType::Coding),
            "non-coding" | "noncoding" => Some(VariationType::NonCoding),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VariationType::Snp => "snp",
            VariationType::Indel => "indel",
            VariationType::Coding => "coding",
            VariationType::NonCoding => "non-coding",
        }
    }
}

impl fmt::Display for VariationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s).ok_or_else(|| format!("unknown variation type '{s}'"))
    }
}

/// Reference genome assemblies a dataset or plugin can be tied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceGenome {
    Hg38,
    Hg19,
    Hg18,
    Hg17,
    Hg16,
}

impl ReferenceGenome {
    /// Resolve an assembly name. GRCh38/GRCh37 names (including patch suffixes such as
    /// `GRCh37.p13`) map to their UCSC equivalents.
    pub fn resolve(name: &str) -> Option<Self> {
        let token = name.trim().to_ascii_lowercase();
        if token.contains("grch38") {
            return Some(ReferenceGenome::Hg38);
        }
        if token.contains("grch37") {
            return Some(ReferenceGenome::Hg19);
        }
        match token.as_str() {
            "hg38" => Some(ReferenceGenome::Hg38),
            "hg19" => Some(ReferenceGenome::Hg19),
            "hg18" => Some(ReferenceGenome::Hg18),
            "hg17" => Some(ReferenceGenome::Hg17),
            "hg16" => Some(ReferenceGenome::Hg16),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceGenome::Hg38 => "hg38",
            ReferenceGenome::Hg19 => "hg19",
            ReferenceGenome::Hg18 => "hg18",
            ReferenceGenome::Hg17 => "hg17",
            ReferenceGenome::Hg16 => "hg16",
        }
    }
}

impl fmt::Display for ReferenceGenome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferenceGenome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s).ok_or_else(|| format!("unknown reference genome '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variation_type_aliases() {
        assert_eq!(VariationType::resolve("SNP"), Some(VariationType::Snp));
        assert_eq!(VariationType::resolve(" snv "), Some(VariationType::Snp));
        assert_eq!(VariationType::resolve("Non_Coding"), Some(VariationType::NonCoding));
        assert_eq!(VariationType::resolve("conding"), Some(VariationType::Coding));
        assert_eq!(VariationType::resolve("mnp"), None);
    }

    #[test]
    fn test_reference_genome_grch_names() {
        assert_eq!(ReferenceGenome::resolve("GRCh38"), Some(ReferenceGenome::Hg38));
        assert_eq!(ReferenceGenome::resolve("GRCh37.p13"), Some(ReferenceGenome::Hg19));
        assert_eq!(ReferenceGenome::resolve("HG18"), Some(ReferenceGenome::Hg18));
        assert!("hg99".parse::<ReferenceGenome>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_resolve() {
        for vt in VariationType::ALL {
            assert_eq!(VariationType::resolve(&vt.to_string()), Some(vt));
        }
    }
}
