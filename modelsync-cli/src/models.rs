//! Loading model definitions from TOML files.
//!
//! Each `*.toml` file in the models directory declares one model:
//!
//! ```toml
//! name = "Post"
//!
//! [[fields]]
//! name = "title"
//! type = "string"
//! options = { null = false, limit = 120 }
//!
//! [[belongs_to]]
//! name = "author"
//!
//! [[has_many]]
//! name = "comments"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use modelsync_migrate::{FieldOptions, ModelRegistry, StoreFamily};

use crate::error::{CliError, CliResult};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModelFile {
    name: String,
    table: Option<String>,
    #[serde(default)]
    fields: Vec<FieldDef>,
    #[serde(default)]
    belongs_to: Vec<AssociationDef>,
    #[serde(default)]
    has_one: Vec<AssociationDef>,
    #[serde(default)]
    has_many: Vec<AssociationDef>,
    #[serde(default)]
    has_and_belongs_to_many: Vec<AssociationDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldDef {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    options: FieldOptions,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AssociationDef {
    name: String,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    options: FieldOptions,
}

/// Load every model definition under `dir` into a registry for `family`.
///
/// A missing directory yields an empty registry.
pub fn load_models(dir: &Path, family: StoreFamily) -> CliResult<ModelRegistry> {
    let mut registry = ModelRegistry::new(family);

    for path in model_files(dir)? {
        let model_error = |message: String| CliError::Model {
            path: path.display().to_string(),
            message,
        };

        let content = std::fs::read_to_string(&path)?;
        let file: ModelFile = toml::from_str(&content).map_err(|e| model_error(e.to_string()))?;

        let mut model = registry.model(&file.name);
        if let Some(table) = file.table {
            model = model.with_table_name(table);
        }

        for field in file.fields {
            model
                .field(field.name, &field.ty, field.options)
                .map_err(|e| model_error(e.to_string()))?;
        }
        for assoc in file.belongs_to {
            model
                .belongs_to(assoc.name, assoc.optional, assoc.options)
                .map_err(|e| model_error(e.to_string()))?;
        }
        for assoc in file.has_one {
            model.has_one(assoc.name, assoc.options);
        }
        for assoc in file.has_many {
            model.has_many(assoc.name, assoc.options);
        }
        for assoc in file.has_and_belongs_to_many {
            model.has_and_belongs_to_many(assoc.name, assoc.options);
        }

        debug!(path = %path.display(), model = %file.name, "Loaded model");
        registry
            .register(model)
            .map_err(|e| model_error(e.to_string()))?;
    }

    Ok(registry)
}

/// Model definition files under `dir`, sorted by path.
fn model_files(dir: &Path) -> CliResult<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
