use std::fs;

use anyhow::{anyhow, Context};
use async_graphql::dynamic::Schema;
use people_config::{Config, DatasetConfig};
use people_engine::{
    graphql::{build_schema, SchemaOptions},
    Dataset,
};

/// Loads the dataset and derives the GraphQL schema the server will expose.
pub(crate) fn schema(config: &Config) -> anyhow::Result<Schema> {
    let dataset = dataset(&config.dataset)?;
    let engine = people_engine::build_engine(dataset)?;

    let options = SchemaOptions {
        introspection: config.graph.introspection,
    };

    build_schema(engine, options).map_err(|err| anyhow!("building the GraphQL schema: {}", err.0))
}

fn dataset(config: &DatasetConfig) -> anyhow::Result<Dataset> {
    let Some(path) = &config.path else {
        tracing::debug!("no dataset configured, serving the built-in records");
        return Ok(Dataset::builtin());
    };

    let json = fs::read_to_string(path).with_context(|| format!("reading dataset {}", path.display()))?;
    let dataset = Dataset::from_json(&json).with_context(|| format!("parsing dataset {}", path.display()))?;

    tracing::info!(
        people = dataset.people.len(),
        hobbies = dataset.hobbies.len(),
        "loaded dataset from {}",
        path.display()
    );

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    #[test]
    fn builtin_dataset_by_default() {
        let dataset = dataset(&DatasetConfig::default()).unwrap();
        assert_eq!(Dataset::builtin(), dataset);
    }

    #[test]
    fn dataset_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "hobbies": [{{ "id": 7, "name": "go" }}] }}"#).unwrap();

        let config = DatasetConfig {
            path: Some(file.path().to_path_buf()),
        };

        let dataset = dataset(&config).unwrap();
        assert!(dataset.people.is_empty());
        assert_eq!(7, dataset.hobbies[0].id);
    }

    #[test]
    fn duplicate_ids_fail_startup() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "hobbies": [{{ "id": 1, "name": "go" }}, {{ "id": 1, "name": "chess" }}] }}"#
        )
        .unwrap();

        let mut config = Config::default();
        config.dataset.path = Some(file.path().to_path_buf());

        let err = schema(&config).unwrap_err();
        assert!(err.to_string().contains("already exists"), "{err}");
    }

    #[test]
    fn missing_dataset_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatasetConfig {
            path: Some(dir.path().join("seed.json")),
        };

        let err = dataset(&config).unwrap_err();
        assert!(err.to_string().starts_with("reading dataset"), "{err}");
    }

    #[test]
    fn schema_builds_without_introspection() {
        let mut config = Config::default();
        config.graph.introspection = false;

        let sdl = schema(&config).unwrap().sdl();
        assert!(sdl.contains("addPerson"));
    }
}
