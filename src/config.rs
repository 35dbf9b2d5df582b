use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::provider::{Credential, CredentialSet};
use crate::error::AppResult;

/// Ancestor directories of the workspace searched for `.env` files, in
/// addition to the workspace itself.
const MAX_ANCESTOR_DEPTH: usize = 3;
const ENV_FILE_NAME: &str = ".env";

const GEMINI_KEY: &str = "GEMINI_API_KEY";
const OPENAI_KEY: &str = "OPENAI_API_KEY";
const GEMINI_MODEL_KEY: &str = "GEMINI_MODEL";
const OPENAI_MODEL_KEY: &str = "OPENAI_MODEL";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f64 = 0.3;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credentials: CredentialSet,
    pub gemini_model: String,
    pub openai_model: String,
    pub temperature: f64,
    pub workspace_root: PathBuf,
}

impl AppConfig {
    /// Resolve configuration for one invocation by scanning `.env` files from
    /// the workspace outward. Directories are visited closest-first, each
    /// contributes at most one file, keys seen in closer files are never
    /// overwritten by farther ones, and the walk stops as soon as the
    /// preferred provider's key is known.
    pub fn load(workspace_hint: &Path) -> AppResult<Self> {
        let mut credentials = CredentialSet::default();
        let mut gemini_model: Option<String> = None;
        let mut openai_model: Option<String> = None;

        for dir in candidate_directories(workspace_hint) {
            let path = dir.join(ENV_FILE_NAME);
            let contents = match fs::read_to_string(&path) {
                Ok(contents) => contents,
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) => {
                    warn!("skipping unreadable {}: {err}", path.display());
                    continue;
                }
            };

            debug!("scanning {}", path.display());
            for (key, value) in parse_env_entries(&contents) {
                match key {
                    GEMINI_KEY if credentials.gemini.is_none() => {
                        credentials.gemini = Some(Credential {
                            key: value,
                            source: path.clone(),
                        });
                    }
                    OPENAI_KEY if credentials.openai.is_none() => {
                        credentials.openai = Some(Credential {
                            key: value,
                            source: path.clone(),
                        });
                    }
                    GEMINI_MODEL_KEY if gemini_model.is_none() => gemini_model = Some(value),
                    OPENAI_MODEL_KEY if openai_model.is_none() => openai_model = Some(value),
                    _ => {}
                }
            }

            // The preferred provider is resolved; farther files cannot change
            // the outcome.
            if credentials.gemini.is_some() {
                break;
            }
        }

        Ok(Self {
            credentials,
            gemini_model: gemini_model.unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            openai_model: openai_model.unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            temperature: DEFAULT_TEMPERATURE,
            workspace_root: workspace_hint.to_path_buf(),
        })
    }
}

fn candidate_directories(start: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::with_capacity(MAX_ANCESTOR_DEPTH + 1);
    dirs.push(start.to_path_buf());

    let mut current = start.to_path_buf();
    for _ in 0..MAX_ANCESTOR_DEPTH {
        let Some(parent) = current.parent().map(Path::to_path_buf) else {
            break;
        };
        dirs.push(parent.clone());
        current = parent;
    }

    dirs
}

/// `KEY=VALUE` lines; blank lines and `#` comments are skipped, a leading
/// `export ` is stripped, and surrounding quotes are removed from values.
/// Within one file the first occurrence of a key wins.
fn parse_env_entries(contents: &str) -> Vec<(&str, String)> {
    let mut entries: Vec<(&str, String)> = Vec::new();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = unquote(value.trim());
        if key.is_empty() || value.is_empty() {
            continue;
        }
        if entries.iter().any(|(seen, _)| *seen == key) {
            continue;
        }
        entries.push((key, value.to_string()));
    }

    entries
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::ProviderKind;
    use tempfile::TempDir;

    /// Nest deep enough that every directory the walk can visit stays inside
    /// the fixture.
    fn fixture() -> (TempDir, PathBuf) {
        let root = TempDir::new().unwrap();
        let leaf = root.path().join("a/b/c/d");
        fs::create_dir_all(&leaf).unwrap();
        (root, leaf)
    }

    fn write_env(dir: &Path, contents: &str) {
        fs::write(dir.join(ENV_FILE_NAME), contents).unwrap();
    }

    #[test]
    fn resolves_openai_when_it_is_the_only_key() {
        let (_root, leaf) = fixture();
        write_env(&leaf, "OPENAI_API_KEY=sk-local\n");

        let config = AppConfig::load(&leaf).unwrap();
        let selection = config.credentials.select(None).unwrap();

        assert_eq!(selection.preferred, ProviderKind::OpenAi);
        assert_eq!(selection.fallback, None);
    }

    #[test]
    fn gemini_in_a_farther_file_beats_openai_in_a_closer_one() {
        let (_root, leaf) = fixture();
        write_env(&leaf, "OPENAI_API_KEY=sk-near\n");
        write_env(leaf.parent().unwrap(), "GEMINI_API_KEY=AI-far\n");

        let config = AppConfig::load(&leaf).unwrap();
        let selection = config.credentials.select(None).unwrap();

        assert_eq!(selection.preferred, ProviderKind::Gemini);
        assert_eq!(selection.fallback, Some(ProviderKind::OpenAi));
        assert_eq!(config.credentials.gemini.unwrap().key, "AI-far");
    }

    #[test]
    fn closer_gemini_key_shadows_a_farther_one() {
        let (_root, leaf) = fixture();
        write_env(&leaf, "GEMINI_API_KEY=AI-near\n");
        write_env(leaf.parent().unwrap(), "GEMINI_API_KEY=AI-far\n");

        let config = AppConfig::load(&leaf).unwrap();
        assert_eq!(config.credentials.gemini.unwrap().key, "AI-near");
    }

    #[test]
    fn scan_stops_once_the_gemini_key_is_found() {
        let (_root, leaf) = fixture();
        write_env(&leaf, "GEMINI_API_KEY=AI-near\n");
        write_env(leaf.parent().unwrap(), "OPENAI_API_KEY=sk-unreached\n");

        let config = AppConfig::load(&leaf).unwrap();
        assert!(config.credentials.openai.is_none());
        assert_eq!(config.credentials.select(None).unwrap().fallback, None);
    }

    #[test]
    fn no_credentials_fails_selection() {
        let (_root, leaf) = fixture();

        let config = AppConfig::load(&leaf).unwrap();
        assert!(config.credentials.select(None).is_err());
    }

    #[test]
    fn model_overrides_and_defaults() {
        let (_root, leaf) = fixture();
        write_env(&leaf, "GEMINI_API_KEY=AI-x\nGEMINI_MODEL=gemini-2.5-pro\n");

        let config = AppConfig::load(&leaf).unwrap();
        assert_eq!(config.gemini_model, "gemini-2.5-pro");
        assert_eq!(config.openai_model, DEFAULT_OPENAI_MODEL);
    }

    #[test]
    fn records_the_source_file_of_each_credential() {
        let (_root, leaf) = fixture();
        write_env(&leaf, "OPENAI_API_KEY=sk-local\n");

        let config = AppConfig::load(&leaf).unwrap();
        let credential = config.credentials.openai.unwrap();
        assert_eq!(credential.source, leaf.join(ENV_FILE_NAME));
    }

    #[test]
    fn parses_comments_exports_and_quotes() {
        let entries = parse_env_entries(
            "# providers\nexport GEMINI_API_KEY=\"AI-quoted\"\n\nOPENAI_API_KEY='sk-single'\nBROKEN LINE\n",
        );
        assert_eq!(
            entries,
            vec![
                ("GEMINI_API_KEY", "AI-quoted".to_string()),
                ("OPENAI_API_KEY", "sk-single".to_string()),
            ]
        );
    }

    #[test]
    fn first_occurrence_wins_within_a_file() {
        let entries = parse_env_entries("GEMINI_API_KEY=first\nGEMINI_API_KEY=second\n");
        assert_eq!(entries, vec![("GEMINI_API_KEY", "first".to_string())]);
    }

    #[test]
    fn empty_values_are_ignored() {
        let entries = parse_env_entries("GEMINI_API_KEY=\nOPENAI_API_KEY=sk-x\n");
        assert_eq!(entries, vec![("OPENAI_API_KEY", "sk-x".to_string())]);
    }
}
