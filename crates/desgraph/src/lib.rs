//! desgraph - hierarchical netlist elaboration.
//!
//! A [`Design`] collects modules parsed from netlist sources, elaborates the
//! instantiation hierarchy into one flat connectivity [`graph::Graph`] per
//! module, and checks and dumps those graphs.
//!
//! # Example
//!
//! ```
//! use desgraph::{Design, DesError};
//!
//! fn main() -> Result<(), DesError> {
//!     let mut design = Design::default();
//!     design.parse_source(
//!         "inv.des",
//!         "module M(a, b); input a; output b; wire w dependency;
//!          INV i1(.i(a), .o(w)); INV i2(.i(w), .o(b)); endmodule",
//!     )?;
//!
//!     design.build_all()?;
//!     design.check("M")?;
//!
//!     let graph = design.graph("M")?;
//!     assert_eq!(graph.vertices().len(), 2);
//!     assert!(design.dump("M")?.starts_with("digraph"));
//!     Ok(())
//! }
//! ```

pub mod check;
pub mod config;
pub mod dump;

mod elaborate;
mod error;

pub use desgraph_core::{graph, identifier, module};
pub use desgraph_parser::error::Diagnostic;

pub use error::DesError;

use std::{
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use indexmap::{IndexMap, IndexSet};
use log::{debug, info, trace};

use desgraph_parser::error::DiagnosticCollector;

use config::AppConfig;
use elaborate::Hierarchy;
use graph::Graph;
use identifier::Id;
use module::Module;

/// Source text a module was parsed from, with the warnings it produced.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    text: String,
    warnings: Vec<Diagnostic>,
}

impl SourceFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parse warnings; their spans index into [`Self::text`].
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }
}

/// A set of modules and their elaborated graphs.
///
/// Modules are kept in the order they were added. Elaborated graphs are
/// memoized and shared between parents through [`Rc`]; adding a module whose
/// name was previously treated as a leaf cell discards every cached graph.
#[derive(Debug, Default)]
pub struct Design {
    config: AppConfig,
    modules: IndexMap<Id, Module>,
    sources: IndexMap<Id, SourceFile>,
    hierarchy: Hierarchy,
    elaboration_warnings: Vec<Diagnostic>,
}

impl Design {
    /// Create an empty design.
    ///
    /// # Arguments
    ///
    /// * `config` - Check and dump settings
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse the netlist file at `path` and add its module.
    ///
    /// # Errors
    ///
    /// Returns [`DesError::SourceUnavailable`] if the file cannot be read,
    /// [`DesError::Parse`] for syntax or semantic errors, and
    /// [`DesError::DuplicateModule`] if a module of the same name exists.
    pub fn parse_module(&mut self, path: impl AsRef<Path>) -> Result<Id, DesError> {
        let path = path.as_ref();
        info!(path:? = path; "Reading netlist source");

        let text = fs::read_to_string(path).map_err(|source| DesError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        self.insert(path.to_path_buf(), text)
    }

    /// Parse `source` and add its module.
    ///
    /// `name` stands in for the file path in diagnostics.
    ///
    /// # Errors
    ///
    /// Same as [`Self::parse_module`], minus the I/O failure.
    pub fn parse_source(
        &mut self,
        name: impl Into<PathBuf>,
        source: impl Into<String>,
    ) -> Result<Id, DesError> {
        self.insert(name.into(), source.into())
    }

    fn insert(&mut self, path: PathBuf, text: String) -> Result<Id, DesError> {
        let mut collector = DiagnosticCollector::new();
        let module = match desgraph_parser::parse(&text, &mut collector) {
            Ok(module) => module,
            Err(err) => return Err(DesError::new_parse_error(err, path, text)),
        };
        let warnings = collector
            .finish()
            .map_err(|err| DesError::new_parse_error(err, path.clone(), text.clone()))?;

        let name = module.name();
        if self.modules.contains_key(&name) {
            return Err(DesError::DuplicateModule { name, path });
        }

        if self.hierarchy.is_leaf_cell(name) {
            debug!(module:% = name; "Module replaces a leaf cell");
            self.hierarchy.invalidate();
            self.elaboration_warnings.clear();
        }

        for warning in &warnings {
            debug!(path:? = path; "{warning}");
        }
        info!(
            module:% = name,
            instances = module.instances().len(),
            warnings = warnings.len();
            "Module added"
        );
        trace!(module:?; "Parsed module");

        self.modules.insert(name, module);
        self.sources.insert(
            name,
            SourceFile {
                path,
                text,
                warnings,
            },
        );
        Ok(name)
    }

    /// Every module, in the order added.
    pub fn modules(&self) -> &IndexMap<Id, Module> {
        &self.modules
    }

    pub fn module(&self, name: impl Into<Id>) -> Option<&Module> {
        self.modules.get(&name.into())
    }

    pub fn sources(&self) -> &IndexMap<Id, SourceFile> {
        &self.sources
    }

    /// The source a module was parsed from.
    pub fn source(&self, name: impl Into<Id>) -> Option<&SourceFile> {
        self.sources.get(&name.into())
    }

    /// Regenerate the declarative source of a module.
    ///
    /// The text parses back to an equal module.
    pub fn render(&self, name: impl Into<Id>) -> Result<String, DesError> {
        let name = name.into();
        self.modules
            .get(&name)
            .map(Module::to_string)
            .ok_or(DesError::ModuleNotFound(name))
    }

    /// Elaborate every module not built yet.
    ///
    /// # Errors
    ///
    /// Returns [`DesError::HierarchyCycle`] if modules instantiate each
    /// other, and [`DesError::UnknownPin`] if an instance connects a pin its
    /// module does not declare. Graphs built before the failure stay cached.
    pub fn build_all(&mut self) -> Result<(), DesError> {
        info!(modules = self.modules.len(); "Elaborating design");
        self.hierarchy
            .build_all(&self.modules, &mut self.elaboration_warnings)
    }

    /// The elaborated graph of `name`.
    pub fn graph(&self, name: impl Into<Id>) -> Result<Rc<Graph>, DesError> {
        let name = name.into();
        if !self.modules.contains_key(&name) {
            return Err(DesError::ModuleNotFound(name));
        }
        self.hierarchy
            .graph(name)
            .cloned()
            .ok_or(DesError::NotElaborated(name))
    }

    /// Verify the internal consistency of an elaborated graph.
    pub fn check(&self, name: impl Into<Id>) -> Result<(), DesError> {
        let name = name.into();
        let graph = self.graph(name)?;

        let violations = check::check(&graph);
        if violations.is_empty() {
            debug!(module:% = name; "Graph is consistent");
            Ok(())
        } else {
            Err(DesError::GraphInconsistency {
                module: name,
                violations,
            })
        }
    }

    /// Render the elaborated graph of `name` as Graphviz DOT.
    pub fn dump(&self, name: impl Into<Id>) -> Result<String, DesError> {
        let graph = self.graph(name)?;
        Ok(dump::dump(&graph, self.config.dump()))
    }

    /// Every warning so far: parse warnings by source, then elaboration
    /// warnings.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.sources
            .values()
            .flat_map(|source| source.warnings.iter())
            .chain(self.elaboration_warnings.iter())
    }

    /// Warnings from the current elaboration; they carry no source spans.
    pub fn elaboration_warnings(&self) -> &[Diagnostic] {
        &self.elaboration_warnings
    }

    /// How many times `name` has been elaborated, across invalidations.
    pub fn elaboration_count(&self, name: impl Into<Id>) -> usize {
        self.hierarchy.elaboration_count(name.into())
    }

    /// Instantiated types with no module definition.
    pub fn leaf_cells(&self) -> &IndexSet<Id> {
        self.hierarchy.leaf_cells()
    }
}
