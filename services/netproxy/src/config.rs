//! Proxy rule configuration.
//!
//! Rules come from one of four places, first hit wins:
//! 1. CLI arguments as alternating `<listen> <destination>` pairs
//! 2. A JSON rule mapping as the sole CLI argument
//! 3. A `.netproxyrc` file found by walking up from the working directory
//! 4. A `.netproxyrc` file in the home directory
//!
//! The JSON form is a flat object mapping listen specifiers to destination
//! specifiers. A destination value may be a comma-separated list, which is
//! raced per connection; a listen key made of comma-separated port numbers
//! expands to one listener per port, all sharing the destination set.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use netproxy_addr::Endpoint;

/// Rule file name searched for on disk.
pub const RC_FILE_NAME: &str = ".netproxyrc";

/// One proxy rule: a set of listeners sharing a destination set.
#[derive(Debug, Clone)]
pub struct ProxyRule {
    /// Endpoints to listen on.
    pub listens: Vec<Endpoint>,

    /// Destinations raced for every accepted connection, in specifier
    /// order. Never empty.
    pub destinations: Vec<Endpoint>,
}

/// Immutable process settings, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// All configured rules.
    pub rules: Vec<ProxyRule>,
}

impl Settings {
    /// Loads settings from the process arguments, working directory, and
    /// home directory with the standard precedence.
    pub fn load() -> Result<Self> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let cwd = std::env::current_dir().context("cannot determine working directory")?;
        let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        Self::load_from(&args, &cwd, home.as_deref())
    }

    /// Precedence-aware load with explicit inputs, split out from `load`
    /// so tests can drive it without touching process globals.
    pub fn load_from(args: &[String], cwd: &Path, home: Option<&Path>) -> Result<Self> {
        let mapping = if !args.is_empty() {
            mapping_from_args(args)?
        } else if let Some(path) = find_rc_file(cwd, home) {
            mapping_from_file(&path)?
        } else {
            bail!(
                "no proxy rules: pass <listen> <destination> pairs, a JSON mapping, \
                 or create a {RC_FILE_NAME} file"
            );
        };
        Self::from_mapping(mapping)
    }

    fn from_mapping(mapping: Vec<(String, String)>) -> Result<Self> {
        if mapping.is_empty() {
            bail!("rule mapping is empty");
        }

        let mut rules = Vec::with_capacity(mapping.len());
        for (listen_spec, dest_spec) in mapping {
            let listens = split_listens(&listen_spec)
                .into_iter()
                .map(Endpoint::parse)
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("invalid listen specifier '{listen_spec}'"))?;

            let destinations = dest_spec
                .split(',')
                .map(|part| Endpoint::parse(part.trim()))
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("invalid destination specifier '{dest_spec}'"))?;

            rules.push(ProxyRule {
                listens,
                destinations,
            });
        }

        Ok(Settings { rules })
    }
}

fn mapping_from_args(args: &[String]) -> Result<Vec<(String, String)>> {
    if args.len() == 1 {
        return mapping_from_json(&args[0]).context("sole argument is not a JSON rule mapping");
    }
    if args.len() % 2 != 0 {
        bail!(
            "expected <listen> <destination> pairs or a single JSON mapping, got {} arguments",
            args.len()
        );
    }
    Ok(args
        .chunks(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect())
}

fn mapping_from_json(text: &str) -> Result<Vec<(String, String)>> {
    let value: serde_json::Value = serde_json::from_str(text).context("invalid JSON")?;
    let object = value
        .as_object()
        .ok_or_else(|| anyhow!("rule mapping must be a JSON object"))?;

    object
        .iter()
        .map(|(listen, dest)| {
            let dest = dest
                .as_str()
                .ok_or_else(|| anyhow!("destination for '{listen}' must be a string"))?;
            Ok((listen.clone(), dest.to_string()))
        })
        .collect()
}

fn mapping_from_file(path: &Path) -> Result<Vec<(String, String)>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read rule file {}", path.display()))?;
    mapping_from_json(&text).with_context(|| format!("invalid rule file {}", path.display()))
}

/// Finds the nearest `.netproxyrc`, walking from `cwd` up to the root and
/// then falling back to the home directory.
fn find_rc_file(cwd: &Path, home: Option<&Path>) -> Option<PathBuf> {
    for dir in cwd.ancestors() {
        let candidate = dir.join(RC_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    let candidate = home?.join(RC_FILE_NAME);
    candidate.is_file().then_some(candidate)
}

/// Splits a listen key. Only all-numeric lists expand to multiple
/// listeners; anything else is a single specifier.
fn split_listens(spec: &str) -> Vec<&str> {
    let numeric_list = !spec.is_empty()
        && spec
            .bytes()
            .all(|b| b.is_ascii_digit() || b == b',' || b.is_ascii_whitespace());
    if numeric_list {
        spec.split(',').map(str::trim).collect()
    } else {
        vec![spec.trim()]
    }
}
