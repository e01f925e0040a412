use crate::artifact::ModelArtifact;
use crate::csv_table::{CsvOptions, CsvTable};
use skillmatch_core::{EmployeeTable, Result, SemanticMatcher, TrainingConfig, VocabularyIndex};
use skillmatch_matching::{MatchConfig, MatchEngine};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where the engine's inputs live on disk.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub vocabulary: PathBuf,
    pub employees: PathBuf,
    pub model: PathBuf,
}

/// Builds a ready [`MatchEngine`] at startup. Any failure aborts the load.
#[derive(Debug, Clone)]
pub struct Loader {
    paths: DataPaths,
    vocabulary_options: CsvOptions,
    roster_options: CsvOptions,
    config: MatchConfig,
}

impl Loader {
    pub fn new(paths: DataPaths) -> Self {
        Self {
            paths,
            vocabulary_options: CsvOptions::default(),
            roster_options: CsvOptions::default(),
            config: MatchConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_vocabulary_options(mut self, options: CsvOptions) -> Self {
        self.vocabulary_options = options;
        self
    }

    pub fn with_roster_options(mut self, options: CsvOptions) -> Self {
        self.roster_options = options;
        self
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    pub fn load_vocabulary(&self) -> Result<VocabularyIndex> {
        let source = CsvTable::new(&self.paths.vocabulary).with_options(self.vocabulary_options.clone());
        VocabularyIndex::load(&source)
    }

    pub fn load_employees(&self) -> Result<EmployeeTable> {
        let source = CsvTable::new(&self.paths.employees).with_options(self.roster_options.clone());
        EmployeeTable::load(&source, &self.config.columns)
    }

    pub fn load(&self) -> Result<MatchEngine> {
        self.config.validate()?;

        let vocabulary = self.load_vocabulary()?;
        let model = ModelArtifact::load(&self.paths.model)?;
        let employees = self.load_employees()?;

        MatchEngine::new(
            Arc::new(vocabulary),
            Arc::new(model.matcher),
            Arc::new(employees),
            self.config.clone(),
        )
    }
}

/// Fit a matcher on a vocabulary file and write the artifact.
pub fn train_from_csv<P: AsRef<Path>, Q: AsRef<Path>>(
    vocabulary: P,
    options: &CsvOptions,
    config: &TrainingConfig,
    output: Q,
) -> Result<(SemanticMatcher, crate::ArtifactMetadata)> {
    let source = CsvTable::new(vocabulary).with_options(options.clone());
    let index = VocabularyIndex::load(&source)?;
    let matcher = SemanticMatcher::train(&index, config)?;
    let metadata = ModelArtifact::save(&matcher, output)?;
    Ok((matcher, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillmatch_core::{Error, MatchColumn};
    use skillmatch_matching::Threshold;
    use std::fs;

    fn fixture(dir: &Path) -> DataPaths {
        let vocabulary = dir.join("skills.csv");
        let employees = dir.join("roster.csv");
        let model = dir.join("skill_classifier.skm");
        fs::write(&vocabulary, "Skill\nPython Programming\nWelding\nProject Management\n").unwrap();
        fs::write(
            &employees,
            "Quarterly roster\n\nEmployee ID,Name,Skills,Certification\n\
             1,Ada,Advanced Python Programming skills,AWS\n\
             2,Grace,Welding,\n",
        )
        .unwrap();
        DataPaths { vocabulary, employees, model }
    }

    #[test]
    fn test_train_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let paths = fixture(dir.path());
        let training = TrainingConfig::default();
        let (_, metadata) =
            train_from_csv(&paths.vocabulary, &CsvOptions::default(), &training, &paths.model).unwrap();
        assert_eq!(metadata.vocabulary_rows, 3);

        let engine = Loader::new(paths)
            .with_roster_options(CsvOptions { skip_rows: 1, ..CsvOptions::default() })
            .with_config(MatchConfig { neighbors: Some(1), ..MatchConfig::default() })
            .load()
            .unwrap();
        let result = engine
            .match_field("Python Programming", MatchColumn::Skill, Threshold::new(80).unwrap())
            .unwrap();
        assert_eq!(result.ids(), vec!["1"]);
    }

    #[test]
    fn test_trained_neighbor_count_is_default_k() {
        let dir = tempfile::tempdir().unwrap();
        let paths = fixture(dir.path());
        let training = TrainingConfig {
            neighbors: 1,
            ..TrainingConfig::default()
        };
        train_from_csv(&paths.vocabulary, &CsvOptions::default(), &training, &paths.model).unwrap();
        let roster = CsvOptions { skip_rows: 1, ..CsvOptions::default() };

        let engine = Loader::new(paths.clone())
            .with_roster_options(roster.clone())
            .load()
            .unwrap();
        assert_eq!(engine.neighbors(), 1);
        assert_eq!(engine.candidates("welding").unwrap().len(), 1);

        let engine = Loader::new(paths)
            .with_roster_options(roster)
            .with_config(MatchConfig { neighbors: Some(2), ..MatchConfig::default() })
            .load()
            .unwrap();
        assert_eq!(engine.neighbors(), 2);
        assert_eq!(engine.candidates("welding").unwrap().len(), 2);
    }

    #[test]
    fn test_missing_model_is_model_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let paths = fixture(dir.path());
        let result = Loader::new(paths).load();
        assert!(matches!(result, Err(Error::ModelLoad(_))));
    }

    #[test]
    fn test_missing_vocabulary_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = fixture(dir.path());
        paths.vocabulary = dir.path().join("absent.csv");
        assert!(matches!(Loader::new(paths).load(), Err(Error::Load(_))));
    }

    #[test]
    fn test_model_from_other_vocabulary_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let paths = fixture(dir.path());
        let other = dir.path().join("other.csv");
        fs::write(&other, "Skill\nRust\nGo\n").unwrap();
        train_from_csv(&other, &CsvOptions::default(), &TrainingConfig::default(), &paths.model).unwrap();

        let result = Loader::new(paths)
            .with_roster_options(CsvOptions { skip_rows: 1, ..CsvOptions::default() })
            .load();
        assert!(matches!(result, Err(Error::ModelLoad(_))));
    }
}
