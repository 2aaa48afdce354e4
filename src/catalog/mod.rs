//! Component catalog.
//!
//! The catalog is the only place that knows what a component kind is: which
//! pins it has, which parameters it takes and in which ranges, and how the
//! solver should treat it at DC. Everything else asks the catalog.
//!
//! The built-in table is created once per process ([`Catalog::builtin`]) and
//! never mutated afterwards. Custom tables can be assembled with
//! [`Catalog::with_specs`].

mod builtin;
mod spec;

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

pub use spec::{
    Bound, Classification, ComponentSpec, CurrentConvention, DcModel, ParamSpec, TerminalSpec,
    Terminals,
};

use crate::error::{CircuitError, Result};

/// Immutable lookup table of component kinds.
#[derive(Debug, PartialEq)]
pub struct Catalog {
    specs: Vec<Arc<ComponentSpec>>,
    /// Lower-cased names and aliases to index in `specs`
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from explicit specs.
    ///
    /// Fails when a spec's classification contradicts its DC model. Later
    /// specs do not override earlier ones: the first kind to claim a name or
    /// alias keeps it.
    pub fn with_specs(specs: Vec<ComponentSpec>) -> Result<Self> {
        for spec in &specs {
            spec.check_classification()?;
        }
        Ok(Self::indexed(specs))
    }

    fn indexed(specs: Vec<ComponentSpec>) -> Self {
        let mut index = HashMap::new();
        for (i, spec) in specs.iter().enumerate() {
            for name in std::iter::once(&spec.name).chain(spec.aliases.iter()) {
                index.entry(name.to_ascii_lowercase()).or_insert(i);
            }
        }
        Self {
            specs: specs.into_iter().map(Arc::new).collect(),
            index,
        }
    }

    /// The process-wide built-in catalog.
    pub fn builtin() -> Arc<Catalog> {
        static BUILTIN: OnceLock<Arc<Catalog>> = OnceLock::new();
        BUILTIN
            .get_or_init(|| Arc::new(Catalog::indexed(builtin::builtin_specs())))
            .clone()
    }

    /// Look up a kind by name or alias (case-insensitive).
    pub fn lookup(&self, name: &str) -> Result<&Arc<ComponentSpec>> {
        self.get(name).ok_or_else(|| CircuitError::UnknownKind {
            kind: name.to_string(),
        })
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ComponentSpec>> {
        let key = name.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        self.index.get(&key).map(|&i| &self.specs[i])
    }

    /// All kinds, in declaration order.
    pub fn kinds(&self) -> impl Iterator<Item = &ComponentSpec> {
        self.specs.iter().map(|spec| spec.as_ref())
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
