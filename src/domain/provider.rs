use std::fmt;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "Gemini",
            ProviderKind::OpenAi => "OpenAI",
        }
    }

    pub fn other(&self) -> ProviderKind {
        match self {
            ProviderKind::Gemini => ProviderKind::OpenAi,
            ProviderKind::OpenAi => ProviderKind::Gemini,
        }
    }

    pub fn parse(value: &str) -> Option<ProviderKind> {
        match value.trim().to_lowercase().as_str() {
            "gemini" => Some(ProviderKind::Gemini),
            "openai" => Some(ProviderKind::OpenAi),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An API key together with the `.env` file that supplied it.
#[derive(Debug, Clone)]
pub struct Credential {
    pub key: String,
    pub source: PathBuf,
}

/// The provider credentials discovered for one invocation. Resolved once,
/// never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct CredentialSet {
    pub gemini: Option<Credential>,
    pub openai: Option<Credential>,
}

impl CredentialSet {
    pub fn get(&self, kind: ProviderKind) -> Option<&Credential> {
        match kind {
            ProviderKind::Gemini => self.gemini.as_ref(),
            ProviderKind::OpenAi => self.openai.as_ref(),
        }
    }

    /// Pick the provider order for this invocation. Gemini wins whenever its
    /// key exists, regardless of which file the scan found first; the other
    /// provider becomes the fallback only when its key was also discovered.
    pub fn select(&self, forced: Option<ProviderKind>) -> AppResult<ProviderSelection> {
        let preferred = match forced {
            Some(kind) => {
                if self.get(kind).is_none() {
                    return Err(AppError::Configuration(format!(
                        "no {kind} API key found in any .env file"
                    )));
                }
                kind
            }
            None if self.gemini.is_some() => ProviderKind::Gemini,
            None if self.openai.is_some() => ProviderKind::OpenAi,
            None => {
                return Err(AppError::Configuration(
                    "no provider credentials found; set GEMINI_API_KEY or OPENAI_API_KEY \
                     in a .env file"
                        .to_string(),
                ));
            }
        };

        let fallback = Some(preferred.other()).filter(|kind| self.get(*kind).is_some());

        Ok(ProviderSelection {
            preferred,
            fallback,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderSelection {
    pub preferred: ProviderKind,
    pub fallback: Option<ProviderKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(key: &str) -> Credential {
        Credential {
            key: key.to_string(),
            source: PathBuf::from("/tmp/.env"),
        }
    }

    #[test]
    fn parses_provider_names_case_insensitively() {
        assert_eq!(ProviderKind::parse("GEMINI"), Some(ProviderKind::Gemini));
        assert_eq!(ProviderKind::parse(" openai "), Some(ProviderKind::OpenAi));
        assert_eq!(ProviderKind::parse("claude"), None);
    }

    #[test]
    fn prefers_gemini_when_both_keys_exist() {
        let set = CredentialSet {
            gemini: Some(credential("g-key")),
            openai: Some(credential("o-key")),
        };
        let selection = set.select(None).unwrap();
        assert_eq!(selection.preferred, ProviderKind::Gemini);
        assert_eq!(selection.fallback, Some(ProviderKind::OpenAi));
    }

    #[test]
    fn selects_openai_when_it_is_the_only_key() {
        let set = CredentialSet {
            gemini: None,
            openai: Some(credential("o-key")),
        };
        let selection = set.select(None).unwrap();
        assert_eq!(selection.preferred, ProviderKind::OpenAi);
        assert_eq!(selection.fallback, None);
    }

    #[test]
    fn forced_provider_inverts_the_default_order() {
        let set = CredentialSet {
            gemini: Some(credential("g-key")),
            openai: Some(credential("o-key")),
        };
        let selection = set.select(Some(ProviderKind::OpenAi)).unwrap();
        assert_eq!(selection.preferred, ProviderKind::OpenAi);
        assert_eq!(selection.fallback, Some(ProviderKind::Gemini));
    }

    #[test]
    fn forcing_a_provider_without_a_key_fails() {
        let set = CredentialSet {
            gemini: Some(credential("g-key")),
            openai: None,
        };
        assert!(set.select(Some(ProviderKind::OpenAi)).is_err());
    }

    #[test]
    fn empty_set_fails_selection() {
        assert!(CredentialSet::default().select(None).is_err());
    }
}
