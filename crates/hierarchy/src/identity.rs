//! Identity Resolution
//!
//! Canonicalizes leader ids and display names using the alias mapping table,
//! the contact directory, and names joined onto hierarchy edges. Free-text
//! roster names are bridged to ids here as well.

use std::collections::HashMap;

use campaign_core::{AliasMapping, Contact};

/// A name that can be matched back to an id.
#[derive(Debug, Clone)]
struct NameCandidate {
    id: String,
    full: String,
    last: String,
}

impl NameCandidate {
    fn new(id: &str, name: &str) -> Option<Self> {
        let full = normalize(name);
        let last = last_token(&full)?;
        Some(Self {
            id: id.to_string(),
            full,
            last,
        })
    }
}

/// Lowercased, whitespace-collapsed form used for comparisons.
fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn last_token(normalized: &str) -> Option<String> {
    normalized.split(' ').last().filter(|t| !t.is_empty()).map(str::to_string)
}

/// Pure lookup over borrowed alias and contact tables.
#[derive(Debug)]
pub struct IdentityResolver<'a> {
    alias_by_id: HashMap<&'a str, &'a AliasMapping>,
    contacts: HashMap<&'a str, &'a Contact>,
    /// Match candidates in priority order: aliases, contacts, joined names
    candidates: Vec<NameCandidate>,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(aliases: &'a [AliasMapping], contacts: &'a [Contact]) -> Self {
        let mut alias_by_id = HashMap::new();
        for alias in aliases {
            alias_by_id.insert(alias.primary_vanid.as_str(), alias);
            for alternate in &alias.alternate_vanids {
                alias_by_id.entry(alternate.as_str()).or_insert(alias);
            }
        }

        let contacts: HashMap<&str, &Contact> =
            contacts.iter().map(|c| (c.vanid.as_str(), c)).collect();

        let mut candidates = Vec::new();
        for alias in aliases {
            let names = alias
                .preferred_name
                .iter()
                .chain(alias.name_variations.iter());
            for name in names {
                candidates.extend(NameCandidate::new(&alias.primary_vanid, name));
            }
        }

        let mut resolver = Self {
            alias_by_id,
            contacts: HashMap::new(),
            candidates,
        };

        let mut contact_ids: Vec<&str> = contacts.keys().copied().collect();
        contact_ids.sort_unstable();
        for id in contact_ids {
            if let Some(name) = contacts[id].display_name() {
                let canonical = resolver.canonical_id(id);
                resolver
                    .candidates
                    .extend(NameCandidate::new(&canonical, &name));
            }
        }
        resolver.contacts = contacts;
        resolver
    }

    /// Register `(id, name)` pairs seen elsewhere, such as names joined onto
    /// hierarchy edges. They rank below aliases and contacts.
    pub fn with_known_names<'n>(mut self, pairs: impl IntoIterator<Item = (&'n str, &'n str)>) -> Self {
        for (id, name) in pairs {
            let canonical = self.canonical_id(id);
            self.candidates.extend(NameCandidate::new(&canonical, name));
        }
        self
    }

    /// Primary id for an alternate, otherwise the id itself.
    pub fn canonical_id(&self, id: &str) -> String {
        self.alias_by_id
            .get(id)
            .map(|a| a.primary_vanid.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Every alternate id mapped to its primary, as an owned table that can
    /// outlive the borrowed alias list.
    pub fn alternate_map(&self) -> HashMap<String, String> {
        self.alias_by_id
            .iter()
            .filter(|(id, alias)| **id != alias.primary_vanid)
            .map(|(id, alias)| (id.to_string(), alias.primary_vanid.clone()))
            .collect()
    }

    /// The primary id followed by every alternate.
    pub fn equivalent_ids(&self, id: &str) -> Vec<String> {
        match self.alias_by_id.get(id) {
            Some(alias) => std::iter::once(alias.primary_vanid.clone())
                .chain(alias.alternate_vanids.iter().cloned())
                .collect(),
            None => vec![id.to_string()],
        }
    }

    fn contact_for(&self, id: &str) -> Option<&'a Contact> {
        if let Some(contact) = self.contacts.get(id) {
            return Some(*contact);
        }
        self.equivalent_ids(id)
            .iter()
            .find_map(|eq| self.contacts.get(eq.as_str()).copied())
    }

    /// Best display name: alias preferred name or first variation, then the
    /// supplied name, then the contact directory, then `"Contact <id>"`.
    pub fn display_name(&self, id: &str, supplied: Option<&str>) -> String {
        if let Some(alias) = self.alias_by_id.get(id) {
            let aliased = alias
                .preferred_name
                .as_deref()
                .or_else(|| alias.name_variations.first().map(String::as_str))
                .map(str::trim)
                .filter(|n| !n.is_empty());
            if let Some(name) = aliased {
                return name.to_string();
            }
        }

        if let Some(name) = supplied.map(str::trim).filter(|n| !n.is_empty()) {
            return name.to_string();
        }

        if let Some(name) = self.contact_for(id).and_then(Contact::display_name) {
            return name;
        }

        format!("Contact {}", id)
    }

    /// Membership status from the contact directory
    pub fn member_status(&self, id: &str) -> Option<String> {
        self.contact_for(id).and_then(|c| c.member_status.clone())
    }

    /// Whether free text names this person: full-name match against any known
    /// spelling, else last-name token equality. Case-insensitive.
    pub fn matches_name(&self, id: &str, text: &str) -> bool {
        let canonical = self.canonical_id(id);
        let wanted = normalize(text);
        let Some(wanted_last) = last_token(&wanted) else {
            return false;
        };

        let mut spellings: Vec<String> = self
            .candidates
            .iter()
            .filter(|c| c.id == canonical)
            .map(|c| c.full.clone())
            .collect();
        spellings.push(normalize(&self.display_name(&canonical, None)));

        spellings.iter().any(|s| *s == wanted)
            || spellings
                .iter()
                .filter_map(|s| last_token(s))
                .any(|last| last == wanted_last)
    }

    /// Resolve free text (a roster name, or an id) to a canonical id.
    ///
    /// Exact full-name matches take the first candidate in priority order.
    /// The last-name fallback only resolves when exactly one person matches.
    pub fn resolve_name(&self, text: &str) -> Option<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        if self.alias_by_id.contains_key(trimmed) || self.contacts.contains_key(trimmed) {
            return Some(self.canonical_id(trimmed));
        }

        let wanted = normalize(trimmed);
        if let Some(hit) = self.candidates.iter().find(|c| c.full == wanted) {
            return Some(hit.id.clone());
        }

        let wanted_last = last_token(&wanted)?;
        let mut ids: Vec<&str> = self
            .candidates
            .iter()
            .filter(|c| c.last == wanted_last)
            .map(|c| c.id.as_str())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        match ids.as_slice() {
            [only] => Some(only.to_string()),
            _ => None,
        }
    }
}
