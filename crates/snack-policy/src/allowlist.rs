//! Domain allow-list
//!
//! Implements host matching on a dot boundary: `a.expo.dev` matches
//! `expo.dev`, `notexpo.dev` does not.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use url::Url;

/// Hosting platform the shell is built around
pub const DEFAULT_PROVIDER: &str = "expo.dev";

/// Third-party domains the sign-in and asset flows bounce through
const THIRD_PARTY_DOMAINS: &[&str] = &["accounts.google.com", "githubusercontent.com"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowList {
    domains: BTreeSet<String>,
}

impl AllowList {
    /// Allow-list for a hosting provider: the provider itself, its `snack.`
    /// and `auth.` hosts, plus the third-party sign-in/asset domains.
    pub fn for_provider(provider: &str) -> Self {
        let provider = normalize(provider);
        let mut domains = vec![
            format!("snack.{provider}"),
            provider.clone(),
            format!("auth.{provider}"),
        ];
        domains.extend(THIRD_PARTY_DOMAINS.iter().map(|d| d.to_string()));

        Self::from_domains(domains)
    }

    pub fn from_domains<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            domains: domains
                .into_iter()
                .map(|d| normalize(d.as_ref()))
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Decide whether `candidate_url` may load. Fails closed: a url that does
    /// not parse, or has no host, is refused.
    pub fn is_allowed(&self, candidate_url: &str) -> bool {
        let Ok(parsed) = Url::parse(candidate_url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };

        let host = normalize(host);
        self.domains.iter().any(|domain| host_matches(&host, domain))
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::for_provider(DEFAULT_PROVIDER)
    }
}

fn host_matches(host: &str, domain: &str) -> bool {
    if host == domain {
        return true;
    }

    host.len() > domain.len()
        && host.ends_with(domain)
        && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
}

fn normalize(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_ascii_lowercase()
}
