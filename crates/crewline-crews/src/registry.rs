//! Named crews loaded from a directory of YAML files
use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::definition::{CrewDefError, CrewFile};

#[derive(Debug, Clone, Default)]
pub struct CrewRegistry {
    crews: BTreeMap<String, CrewFile>,
}

impl CrewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `*.yaml` / `*.yml` file in `dir`, in file name order.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, CrewDefError> {
        let dir = dir.as_ref();
        let read_err = |e: std::io::Error| CrewDefError::Read {
            path: dir.display().to_string(),
            reason: e.to_string(),
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();
            let is_yaml = matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yaml") | Some("yml")
            );
            if is_yaml && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut registry = Self::new();
        for path in paths {
            let crew = CrewFile::load(&path)?;
            debug!(crew = %crew.name, path = %path.display(), "crew loaded");
            registry.insert(crew)?;
        }
        Ok(registry)
    }

    pub fn insert(&mut self, crew: CrewFile) -> Result<(), CrewDefError> {
        if self.crews.contains_key(&crew.name) {
            return Err(CrewDefError::DuplicateCrew(crew.name));
        }
        self.crews.insert(crew.name.clone(), crew);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&CrewFile, CrewDefError> {
        self.crews
            .get(name)
            .ok_or_else(|| CrewDefError::UnknownCrew(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.crews.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CrewFile> {
        self.crews.values()
    }

    pub fn len(&self) -> usize {
        self.crews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crews.is_empty()
    }
}
