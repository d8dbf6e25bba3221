//! Word selection schema (limits and keyword tables) and the compiled rule set.
//!
//! The schema is YAML, shaped like `schema/shiritori.yaml`. A copy of that
//! file is embedded in the library and used when no `--schema` is given.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::eligibility::EligibilityRules;
use crate::error::{Error, Result};
use crate::filter::SemanticFilter;

const BUILTIN_SCHEMA: &str = include_str!("../schema/shiritori.yaml");

/// Length bounds, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Limits {
    pub min_expression_chars: usize,
    pub max_expression_chars: usize,
    pub max_reading_chars: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PosSchema {
    pub required_keyword: String,
    #[serde(default)]
    pub disallowed_keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MiscSchema {
    #[serde(default)]
    pub disallowed_keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrioritySchema {
    pub common_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub limits: Limits,
    pub pos: PosSchema,
    pub misc: MiscSchema,
    pub priority: PrioritySchema,
}

/// Immutable rules built once per run and shared by reference.
#[derive(Debug)]
pub struct Rules {
    pub eligibility: EligibilityRules,
    pub filter: SemanticFilter,
}

impl Config {
    /// The schema shipped with the crate.
    pub fn builtin() -> Result<Self> {
        debug!("using built-in schema");
        Self::from_yaml(BUILTIN_SCHEMA)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| Error::SchemaRead {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loading schema");
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let limits = &self.limits;
        if limits.min_expression_chars == 0 {
            return Err(Error::InvalidSchema(
                "limits.min_expression_chars must be at least 1".to_string(),
            ));
        }
        if limits.min_expression_chars > limits.max_expression_chars {
            return Err(Error::InvalidSchema(format!(
                "limits.min_expression_chars ({}) exceeds limits.max_expression_chars ({})",
                limits.min_expression_chars, limits.max_expression_chars
            )));
        }
        if limits.max_reading_chars == 0 {
            return Err(Error::InvalidSchema(
                "limits.max_reading_chars must be at least 1".to_string(),
            ));
        }
        if self.pos.required_keyword.trim().is_empty() {
            return Err(Error::InvalidSchema(
                "pos.required_keyword must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn compile(&self) -> Result<Rules> {
        let rules = Rules {
            eligibility: EligibilityRules::new(self.limits)?,
            filter: SemanticFilter::new(
                &self.pos.required_keyword,
                &self.pos.disallowed_keywords,
                &self.misc.disallowed_keywords,
                &self.priority.common_prefixes,
            ),
        };
        debug!(
            disallowed_pos = self.pos.disallowed_keywords.len(),
            disallowed_misc = self.misc.disallowed_keywords.len(),
            common_prefixes = self.priority.common_prefixes.len(),
            "compiled word rules"
        );
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_schema_matches_game_defaults() {
        let config = Config::builtin().unwrap();
        assert_eq!(
            config.limits,
            Limits {
                min_expression_chars: 2,
                max_expression_chars: 6,
                max_reading_chars: 8,
            }
        );
        assert_eq!(config.pos.required_keyword, "noun");
        assert_eq!(config.pos.disallowed_keywords.len(), 7);
        assert!(config.misc.disallowed_keywords.contains(&"family or surname".to_string()));
        assert_eq!(
            config.priority.common_prefixes,
            vec!["news", "ichi", "spec", "gai", "nf"]
        );
        assert!(config.compile().is_ok());
    }

    #[test]
    fn load_reads_schema_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "limits:\n  min_expression_chars: 3\n  max_expression_chars: 4\n  max_reading_chars: 5\n\
             pos:\n  required_keyword: Noun\n\
             misc: {{}}\n\
             priority:\n  common_prefixes: [ICHI]\n"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.limits.max_expression_chars, 4);
        assert!(config.pos.disallowed_keywords.is_empty());
        assert!(config.misc.disallowed_keywords.is_empty());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Config::load(Path::new("/nonexistent/shiritori.yaml")).unwrap_err();
        assert!(matches!(err, Error::SchemaRead { .. }));
    }

    #[test]
    fn inverted_limits_are_rejected() {
        let yaml = "limits:\n  min_expression_chars: 5\n  max_expression_chars: 2\n  max_reading_chars: 8\n\
                    pos:\n  required_keyword: noun\n\
                    misc: {}\n\
                    priority:\n  common_prefixes: []\n";
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, Error::InvalidSchema(_)));
    }

    #[test]
    fn blank_required_keyword_is_rejected() {
        let yaml = "limits:\n  min_expression_chars: 2\n  max_expression_chars: 6\n  max_reading_chars: 8\n\
                    pos:\n  required_keyword: \"  \"\n\
                    misc: {}\n\
                    priority:\n  common_prefixes: []\n";
        assert!(matches!(
            Config::from_yaml(yaml),
            Err(Error::InvalidSchema(_))
        ));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        assert!(matches!(
            Config::from_yaml("limits: [1, 2"),
            Err(Error::SchemaParse(_))
        ));
    }
}
