//! Export a variable list into the process environment.
//!
//! Variables already set (non-empty) in the process win over the file.

use tracing::{debug, trace};

use crate::core::document::{Document, Variable};
use crate::core::store::Store;
use crate::error::Result;

/// What an export did, by variable name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Exported {
    /// Names set from the file
    pub set: Vec<String>,
    /// Names left alone because the process already had a value
    pub kept: Vec<String>,
}

/// Load the file and export `environment` (`production` or `developer`).
///
/// An unknown environment name exports nothing.
///
/// # Errors
///
/// Any error from [`Store::read`].
pub fn export_variables(store: &Store, environment: &str) -> Result<Exported> {
    let document = store.read()?;
    Ok(export(&document, environment))
}

/// Export the named list of an already loaded document.
pub fn export(document: &Document, environment: &str) -> Exported {
    let variables = document.env.by_name(environment);
    debug!(environment, count = variables.len(), "exporting");
    apply(variables)
}

fn apply(variables: &[Variable]) -> Exported {
    let mut exported = Exported::default();

    for variable in variables {
        if !is_settable(&variable.name) {
            trace!(name = %variable.name, "skipping unsettable name");
            continue;
        }
        if variable.value.contains('\0') {
            trace!(name = %variable.name, "skipping value with NUL byte");
            continue;
        }
        if is_present(&variable.name) {
            trace!(name = %variable.name, "already set, keeping process value");
            exported.kept.push(variable.name.clone());
            continue;
        }
        std::env::set_var(&variable.name, &variable.value);
        exported.set.push(variable.name.clone());
    }

    debug!(set = exported.set.len(), kept = exported.kept.len(), "export done");
    exported
}

/// Names the OS can store; the empty placeholder entry is not one.
fn is_settable(name: &str) -> bool {
    !name.is_empty() && !name.contains('=') && !name.contains('\0')
}

fn is_present(name: &str) -> bool {
    std::env::var_os(name).map_or(false, |v| !v.is_empty())
}
