//! RON form definition loader

use crate::error::{Error, Result};
use crate::schema::{FieldDef, FormFile};
use formstate_core::{FieldConfigs, FieldName, Record, StateContainerBuilder};
use indexmap::IndexMap;
use std::fs;
use std::path::Path;

/// Loaded field definitions, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormDef {
    pub fields: IndexMap<FieldName, FieldDef>,
}

impl FormDef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field definition
    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Initial values of every field
    pub fn record(&self) -> Record {
        self.fields
            .values()
            .map(|def| (def.name.0.clone(), def.initial.clone()))
            .collect()
    }

    /// Configuration of every field
    pub fn configs(&self) -> FieldConfigs {
        self.fields
            .values()
            .map(|def| (def.name.clone(), def.config.clone()))
            .collect()
    }

    /// A container builder with this form's fields and initial record
    ///
    /// Validator, logger and channel are left for the caller.
    pub fn builder(&self) -> StateContainerBuilder {
        StateContainerBuilder::new()
            .record(self.record())
            .fields(self.configs())
    }

    fn insert(&mut self, def: FieldDef) -> Result<()> {
        if self.fields.contains_key(&def.name) {
            return Err(Error::DuplicateField(def.name.to_string()));
        }
        if let Some(rules) = &def.config.validation_rules {
            if !rules.kind.accepts(&def.initial) {
                return Err(Error::InvalidValue {
                    field: def.name.to_string(),
                    expected: rules.kind.to_string(),
                    got: def.initial.type_name().to_string(),
                });
            }
        }
        self.fields.insert(def.name.clone(), def);
        Ok(())
    }
}

/// Loader for RON form definitions
///
/// Several sources may be loaded into one form; field names must stay unique
/// across all of them.
#[derive(Debug, Default)]
pub struct Loader {
    form: FormDef,
}

impl Loader {
    /// Create a new loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Load fields from a RON string
    pub fn load_str(&mut self, content: &str) -> Result<()> {
        let file: FormFile = ron::from_str(content)?;
        let count = file.fields.len();
        for def in file.fields {
            self.form.insert(def)?;
        }
        tracing::debug!(fields = count, "loaded form definition");
        Ok(())
    }

    /// Load a single RON file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "reading form definition");
        self.load_str(&content)
    }

    /// Load every `.ron` file of a directory, in file name order
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if !path.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {:?}", path),
            )));
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(path)? {
            let file_path = entry?.path();
            if file_path.extension().is_some_and(|e| e == "ron") {
                files.push(file_path);
            }
        }
        files.sort();

        for file in files {
            self.load_file(&file)?;
        }
        Ok(())
    }

    /// Finish loading and return the form definition
    pub fn finish(self) -> FormDef {
        self.form
    }

    /// Get the current definition (for inspection during loading)
    pub fn form(&self) -> &FormDef {
        &self.form
    }
}
