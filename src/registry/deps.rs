//! Dependency string parsing
//!
//! The feed encodes dependencies as a pipe-delimited list of colon-delimited
//! triples `name:versionExpr:rest`. The version expression is either a plain
//! version or a bracketed range such as `[1.5, 2.0)` or `[2.0, )`; only the
//! lower bound matters here, so the first comma-separated token is taken and
//! stripped down to its numeric/dot characters.
//!
//! Malformed entries (no colon, empty name) are tolerated: the feed contains
//! occasional irregular rows and a hard error would stall every consumer of
//! the affected package. Each skip is reported as a warning.

use crate::ui;
use crate::version::ModuleVersion;

/// A single parsed dependency requirement.
#[derive(Debug, Clone)]
pub struct DependencySpec {
    pub name: String,

    /// Minimum acceptable version. `None` when the entry carried no usable
    /// lower bound; such dependencies are imported only when absent.
    pub min_version: Option<ModuleVersion>,
}

/// Parse a raw dependency field into specs, in declaration order.
pub fn parse_dependencies(raw: &str) -> Vec<DependencySpec> {
    let mut specs = Vec::new();

    for entry in raw.split('|') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let mut parts = entry.splitn(3, ':');
        let name = parts.next().unwrap_or("").trim();
        let Some(version_expr) = parts.next() else {
            ui::warn(&format!(
                "Skipping malformed dependency entry '{}' (missing ':')",
                entry
            ));
            continue;
        };

        if name.is_empty() {
            ui::warn(&format!("Skipping dependency entry '{}' with empty name", entry));
            continue;
        }

        specs.push(DependencySpec {
            name: name.to_string(),
            min_version: parse_minimum_version(name, version_expr),
        });
    }

    specs
}

/// Extract the lower bound from a version expression, logging anything that
/// does not reduce to a plain version.
fn parse_minimum_version(name: &str, expr: &str) -> Option<ModuleVersion> {
    let lower_bound = expr.split(',').next().unwrap_or("");
    let cleaned: String = lower_bound
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if cleaned.is_empty() {
        if !expr.trim().is_empty() {
            ui::warn(&format!(
                "Dependency '{}' has no usable minimum version in '{}'",
                name, expr
            ));
        }
        return None;
    }

    match ModuleVersion::parse(&cleaned) {
        Ok(version) => Some(version),
        Err(_) => {
            ui::warn(&format!(
                "Dependency '{}' has malformed version expression '{}'",
                name, expr
            ));
            None
        }
    }
}
