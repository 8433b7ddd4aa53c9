use std::{fs, path::PathBuf};

use anyhow::{Context, anyhow};
use clap::{Parser, ValueHint};
use docfill_core::config::DEFAULT_FRAGMENT;
use docfill_core::{EmptyValuePolicy, FillOptions, Lookup, ScanScope, SeamSpaces};
use serde_json::Value;

#[derive(Debug, Clone, Parser)]
pub struct FillOpts {
    /// Whether an empty value replaces its placeholder (`leave-token` | `substitute`)
    #[arg(long, default_value = "leave-token", env = "DOCFILL_EMPTY_VALUES")]
    pub empty_values: EmptyValuePolicy,

    /// Spaces next to a substitution (`non-breaking` | `keep`)
    #[arg(long, default_value = "non-breaking", env = "DOCFILL_SEAM_SPACES")]
    pub seam_spaces: SeamSpaces,

    /// Text a placeholder may span (`paragraph` | `document`)
    #[arg(long, default_value = "paragraph", env = "DOCFILL_SCOPE")]
    pub scope: ScanScope,

    /// Also fill headers, footers, footnotes and endnotes of .docx files
    #[arg(long, env = "DOCFILL_HEADERS_FOOTERS")]
    pub headers_footers: bool,

    /// XML fragment holding the content of .ydoc files
    #[arg(long, default_value = DEFAULT_FRAGMENT, env = "DOCFILL_FRAGMENT")]
    pub fragment: String,
}

impl FillOpts {
    pub fn to_options(&self) -> FillOptions {
        FillOptions {
            empty_values: self.empty_values,
            seam_spaces: self.seam_spaces,
            scope: self.scope,
            include_headers_footers: self.headers_footers,
            fragment: self.fragment.clone(),
        }
    }
}

#[derive(Debug, Clone, Parser)]
pub struct ValueOpts {
    /// JSON object of placeholder values; later files win
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub values: Vec<PathBuf>,

    /// A single NAME=VALUE pair, applied after every --values file
    #[arg(long)]
    pub set: Vec<String>,
}

impl ValueOpts {
    pub fn load_lookup(&self) -> anyhow::Result<Lookup> {
        let mut lookup = Lookup::new();
        for path in &self.values {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading values from {}", path.display()))?;
            let json: Value = serde_json::from_str(&raw)
                .with_context(|| format!("parsing values from {}", path.display()))?;
            merge_json(&mut lookup, json)
                .with_context(|| format!("loading values from {}", path.display()))?;
        }
        for pair in &self.set {
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("--set expects NAME=VALUE, got `{pair}`"))?;
            lookup.insert(name.to_owned(), value.to_owned());
        }
        Ok(lookup)
    }
}

/// Strings are taken as is, numbers and booleans by their JSON text; `null` means no value.
fn merge_json(lookup: &mut Lookup, json: Value) -> anyhow::Result<()> {
    let Value::Object(map) = json else {
        return Err(anyhow!("expected a JSON object of name/value pairs"));
    };
    for (name, value) in map {
        let value = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => continue,
            Value::Array(_) | Value::Object(_) => {
                tracing::warn!(variable = %name, "skipping non-scalar value");
                continue;
            }
        };
        lookup.insert(name, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_json_scalars() {
        let mut lookup = Lookup::new();
        merge_json(
            &mut lookup,
            json!({"name": "Ada", "age": 36, "vip": true, "gone": null, "tags": ["a"]}),
        )
        .unwrap();
        assert_eq!(lookup.len(), 3);
        assert_eq!(lookup["name"], "Ada");
        assert_eq!(lookup["age"], "36");
        assert_eq!(lookup["vip"], "true");
        assert!(!lookup.contains_key("gone"));
    }

    #[test]
    fn test_merge_json_rejects_non_objects() {
        assert!(merge_json(&mut Lookup::new(), json!(["name"])).is_err());
    }

    #[test]
    fn test_set_wins_over_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");
        fs::write(&first, r#"{"name": "Ada", "city": "London"}"#).unwrap();
        fs::write(&second, r#"{"city": "Paris"}"#).unwrap();

        let opts = ValueOpts {
            values: vec![first, second],
            set: vec!["name=Grace".into(), "eq=a=b".into()],
        };
        let lookup = opts.load_lookup().unwrap();
        assert_eq!(lookup["name"], "Grace");
        assert_eq!(lookup["city"], "Paris");
        assert_eq!(lookup["eq"], "a=b");
    }

    #[test]
    fn test_malformed_set_pair() {
        let opts = ValueOpts {
            values: vec![],
            set: vec!["novalue".into()],
        };
        assert!(opts.load_lookup().is_err());
    }

    #[test]
    fn test_fill_opts_defaults() {
        let opts = FillOpts::try_parse_from(["fill"]).unwrap();
        assert_eq!(opts.to_options(), FillOptions::default());

        let opts = FillOpts::try_parse_from([
            "fill",
            "--empty-values",
            "substitute",
            "--scope",
            "document",
            "--headers-footers",
        ])
        .unwrap()
        .to_options();
        assert_eq!(opts.empty_values, EmptyValuePolicy::Substitute);
        assert_eq!(opts.scope, ScanScope::Document);
        assert!(opts.include_headers_footers);
    }
}
