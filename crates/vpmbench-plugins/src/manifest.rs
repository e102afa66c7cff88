//! Manifest parsing and validation.
//!
//! A manifest is deserialised into loosely-typed raw structs first, then validated field
//! by field into a [`Plugin`]. Every problem is a [`ManifestError`] local to that one
//! manifest.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use vpmbench_common::{ReferenceGenome, VariationType, VALID_CHROMOSOMES};

use crate::cutoff::{Boundary, Cutoff};
use crate::error::ManifestError;
use crate::formats::{InputFormat, OutputFormat};
use crate::plugin::{ContainerEntryPoint, ContainerFile, EntryPoint, NativeEntryPoint, Plugin};

/// File names recognised as plugin manifests.
pub const MANIFEST_FILE_NAMES: [&str; 2] = ["manifest.yaml", "manifest.yml"];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawManifest {
    name: Option<Value>,
    version: Option<Value>,
    supported_variations: Option<Value>,
    #[serde(alias = "reference-genome")]
    reference_genomes: Option<Value>,
    supported_chromosomes: Option<Value>,
    unsupported_chromosomes: Option<Value>,
    cutoff: Option<Value>,
    databases: Option<Value>,
    entry_point: Option<RawEntryPoint>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawEntryPoint {
    mode: Option<String>,
    file: Option<String>,
    image: Option<String>,
    input: Option<RawContainerFile>,
    output: Option<RawContainerFile>,
    bindings: Option<Mapping>,
    run: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawContainerFile {
    file_path: Option<String>,
    format: Option<String>,
    args: Option<Mapping>,
}

/// Read and validate the manifest at `path`.
pub fn load_plugin(path: &Path) -> Result<Plugin, ManifestError> {
    let content = std::fs::read_to_string(path)?;
    parse_plugin(&content, path)
}

/// Validate manifest `content` as if it had been read from `path`.
pub fn parse_plugin(content: &str, path: &Path) -> Result<Plugin, ManifestError> {
    let raw: RawManifest = serde_yaml::from_str(content)?;
    let manifest_root = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let name = raw
        .name
        .as_ref()
        .and_then(scalar_string)
        .filter(|n| !n.trim().is_empty())
        .ok_or(ManifestError::MissingField("name"))?;

    let supported_variations = raw
        .supported_variations
        .as_ref()
        .map(|v| string_list(v, "supported-variations"))
        .transpose()?
        .ok_or(ManifestError::MissingField("supported-variations"))?
        .iter()
        .map(|t| VariationType::resolve(t).ok_or_else(|| ManifestError::UnknownVariationType(t.clone())))
        .collect::<Result<BTreeSet<_>, _>>()?;
    if supported_variations.is_empty() {
        return Err(ManifestError::EmptySet("supported-variations"));
    }

    let reference_genomes = raw
        .reference_genomes
        .as_ref()
        .map(|v| string_list(v, "reference-genomes"))
        .transpose()?
        .ok_or(ManifestError::MissingField("reference-genomes"))?
        .iter()
        .map(|g| ReferenceGenome::resolve(g).ok_or_else(|| ManifestError::UnknownReferenceGenome(g.clone())))
        .collect::<Result<BTreeSet<_>, _>>()?;
    if reference_genomes.is_empty() {
        return Err(ManifestError::EmptySet("reference-genomes"));
    }

    let supported_chromosomes = chromosomes(
        raw.supported_chromosomes.as_ref(),
        raw.unsupported_chromosomes.as_ref(),
    )?;

    let cutoff = match raw.cutoff.as_ref() {
        None | Some(Value::Null) => Cutoff::default(),
        Some(value) => parse_cutoff(value)?,
    };

    let databases = raw.databases.as_ref().map(parse_databases).transpose()?.unwrap_or_default();

    let entry_point = parse_entry_point(
        raw.entry_point.ok_or(ManifestError::MissingField("entry-point"))?,
        &manifest_root,
    )?;

    Ok(Plugin {
        name: name.trim().to_string(),
        version: raw.version.as_ref().and_then(scalar_string),
        supported_variations,
        reference_genomes,
        supported_chromosomes,
        cutoff,
        databases,
        entry_point,
        manifest_root,
        manifest_path: path.to_path_buf(),
    })
}

fn parse_entry_point(raw: RawEntryPoint, root: &Path) -> Result<EntryPoint, ManifestError> {
    let mode = raw.mode.ok_or(ManifestError::MissingField("entry-point.mode"))?;
    match mode.trim().to_ascii_lowercase().as_str() {
        "python" => {
            let declared = raw.file.ok_or(ManifestError::MissingField("entry-point.file"))?;
            let file = root.join(&declared);
            if !file.is_file() {
                return Err(ManifestError::MissingFile(file));
            }
            Ok(EntryPoint::Native(NativeEntryPoint { declared, file }))
        }
        "docker" => {
            let image = raw.image.ok_or(ManifestError::MissingField("entry-point.image"))?;
            let run = raw.run.ok_or(ManifestError::MissingField("entry-point.run"))?;

            let input = raw.input.ok_or(ManifestError::MissingField("entry-point.input"))?;
            let input = ContainerFile {
                file_path: input.file_path.ok_or(ManifestError::MissingField("entry-point.input.file-path"))?,
                format: InputFormat::parse(
                    input.format.as_deref().ok_or(ManifestError::MissingField("entry-point.input.format"))?,
                    &input.args.unwrap_or_default(),
                )?,
            };

            let output = raw.output.ok_or(ManifestError::MissingField("entry-point.output"))?;
            let output = ContainerFile {
                file_path: output.file_path.ok_or(ManifestError::MissingField("entry-point.output.file-path"))?,
                format: OutputFormat::parse(
                    output.format.as_deref().ok_or(ManifestError::MissingField("entry-point.output.format"))?,
                    &output.args.unwrap_or_default(),
                )?,
            };

            let mut bindings = Vec::new();
            for (host, target) in raw.bindings.unwrap_or_default() {
                let (Some(host), Some(target)) = (host.as_str(), target.as_str()) else {
                    return Err(ManifestError::Invalid {
                        field: "entry-point.bindings",
                        message: "bindings map host paths to container paths".to_string(),
                    });
                };
                let host = root.join(host);
                if !host.exists() {
                    return Err(ManifestError::MissingFile(host));
                }
                bindings.push((host, target.to_string()));
            }

            Ok(EntryPoint::Container(ContainerEntryPoint {
                image,
                input,
                output,
                bindings,
                run,
            }))
        }
        _ => Err(ManifestError::UnknownMode(mode)),
    }
}

fn parse_cutoff(value: &Value) -> Result<Cutoff, ManifestError> {
    match value {
        Value::Number(n) => Ok(Cutoff::threshold(number(n))?),
        Value::Sequence(items) => {
            let boundaries = items.iter().map(parse_boundary).collect::<Result<Vec<_>, _>>()?;
            Ok(Cutoff::bands(boundaries)?)
        }
        other => Err(ManifestError::Invalid {
            field: "cutoff",
            message: format!("expected a number or a list of boundaries, found {other:?}"),
        }),
    }
}

fn parse_boundary(item: &Value) -> Result<Boundary, ManifestError> {
    let invalid = |message: String| ManifestError::Invalid { field: "cutoff", message };
    match item {
        Value::Number(n) => Ok(Boundary::below(number(n))),
        Value::Mapping(map) => {
            let value = map
                .get("value")
                .and_then(Value::as_f64)
                .ok_or_else(|| invalid("boundary mapping needs a numeric 'value'".to_string()))?;
            let inclusive = match map.get("inclusive") {
                None => false,
                Some(Value::Bool(b)) => *b,
                Some(other) => return Err(invalid(format!("'inclusive' must be a boolean, found {other:?}"))),
            };
            Ok(Boundary { value, inclusive })
        }
        other => Err(invalid(format!("unsupported boundary {other:?}"))),
    }
}

fn parse_databases(value: &Value) -> Result<BTreeMap<String, String>, ManifestError> {
    match value {
        Value::Null => Ok(BTreeMap::new()),
        Value::Mapping(map) => Ok(map
            .iter()
            .filter_map(|(k, v)| Some((scalar_string(k)?, scalar_string(v).unwrap_or_default())))
            .collect()),
        Value::Sequence(items) => Ok(items
            .iter()
            .filter_map(scalar_string)
            .map(|name| (name, String::new()))
            .collect()),
        other => Err(ManifestError::Invalid {
            field: "databases",
            message: format!("expected a mapping or a list, found {other:?}"),
        }),
    }
}

fn chromosomes(supported: Option<&Value>, unsupported: Option<&Value>) -> Result<BTreeSet<String>, ManifestError> {
    let normalise = |list: Vec<String>, field: &'static str| -> Result<BTreeSet<String>, ManifestError> {
        list.into_iter()
            .map(|c| {
                let c = c.trim();
                let c = c.strip_prefix("chr").unwrap_or(c).to_ascii_uppercase();
                if VALID_CHROMOSOMES.contains(&c.as_str()) {
                    Ok(c)
                } else {
                    Err(ManifestError::Invalid {
                        field,
                        message: format!("'{c}' is not a chromosome"),
                    })
                }
            })
            .collect()
    };

    let mut set = match supported {
        Some(v) => normalise(string_list(v, "supported-chromosomes")?, "supported-chromosomes")?,
        None => VALID_CHROMOSOMES.iter().map(|c| c.to_string()).collect(),
    };
    if let Some(v) = unsupported {
        for c in normalise(string_list(v, "unsupported-chromosomes")?, "unsupported-chromosomes")? {
            set.remove(&c);
        }
    }
    if set.is_empty() {
        return Err(ManifestError::EmptySet("supported-chromosomes"));
    }
    Ok(set)
}

/// A list of scalar strings; a single string may also be comma separated.
fn string_list(value: &Value, field: &'static str) -> Result<Vec<String>, ManifestError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => Ok(s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()),
        Value::Sequence(items) => items
            .iter()
            .map(|item| {
                scalar_string(item).ok_or_else(|| ManifestError::Invalid {
                    field,
                    message: format!("unsupported list element {item:?}"),
                })
            })
            .collect(),
        Value::Number(_) => Ok(scalar_string(value).into_iter().collect()),
        other => Err(ManifestError::Invalid {
            field,
            message: format!("expected a list, found {other:?}"),
        }),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn number(n: &serde_yaml::Number) -> f64 {
    n.as_f64().unwrap_or(f64::NAN)
}

/// True when `path` has a manifest file name.
pub fn is_manifest(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| MANIFEST_FILE_NAMES.contains(&n))
}
