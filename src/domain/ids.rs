//! Identifiers for link lists and locales.

use std::fmt;
use std::str::FromStr;

use super::error::DomainError;

const MAX_ID_LEN: usize = 128;
const MAX_LOCALE_LEN: usize = 16;

/// Stable machine name of a link list aggregate (`[a-z0-9_-]+`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkListId(String);

impl LinkListId {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.is_empty() || value.len() > MAX_ID_LEN {
            return Err(DomainError::validation(format!(
                "link list id must be 1-{MAX_ID_LEN} characters"
            )));
        }
        if !value
            .bytes()
            .all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'_' || byte == b'-')
        {
            return Err(DomainError::validation(format!(
                "link list id `{value}` may only contain a-z, 0-9, `_` and `-`"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LinkListId {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

/// Language code such as `en`, `fr` or `pt-br`. Stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale(String);

impl Locale {
    pub fn new(value: impl AsRef<str>) -> Result<Self, DomainError> {
        let normalized = value.as_ref().trim().to_ascii_lowercase();
        let valid_shape = !normalized.is_empty()
            && normalized.len() <= MAX_LOCALE_LEN
            && normalized
                .split(['-', '_'])
                .all(|part| !part.is_empty() && part.bytes().all(|byte| byte.is_ascii_alphanumeric()));
        if !valid_shape {
            return Err(DomainError::validation(format!(
                "`{}` is not a valid locale code",
                value.as_ref()
            )));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locale {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_list_ids_are_machine_names() {
        assert!(LinkListId::new("homepage_news-2").is_ok());
        assert!(LinkListId::new("").is_err());
        assert!(LinkListId::new("Home").is_err());
        assert!(LinkListId::new("../etc").is_err());
    }

    #[test]
    fn locales_normalize_case() {
        let locale: Locale = "PT-BR".parse().expect("valid locale");
        assert_eq!(locale.as_str(), "pt-br");
        assert!(Locale::new("fr").is_ok());
        assert!(Locale::new("fr/..").is_err());
        assert!(Locale::new("-fr").is_err());
        assert!(Locale::new("").is_err());
    }
}
