//! # Resource Identifiers
//!
//! Contact points and mute timings are identified by `org:name`, e.g.
//! `1:ops`. Identifiers without an org prefix are accepted for backward
//! compatibility; for contact points such an identifier may also be the
//! deprecated `uid1;uid2;uid3` form.

use crate::constants::{LEGACY_UID_SEPARATOR, ORG_RESOURCE_ID_SEPARATOR};
use crate::error::ProvisionError;
use std::fmt;

/// `(organization, name)` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrgResourceId {
    pub org_id: i64,
    pub name: String,
}

impl OrgResourceId {
    #[must_use]
    pub fn new(org_id: i64, name: impl Into<String>) -> Self {
        Self {
            org_id,
            name: name.into(),
        }
    }
}

impl fmt::Display for OrgResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.org_id, ORG_RESOURCE_ID_SEPARATOR, self.name)
    }
}

/// A parsed identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceId {
    /// `org:name`
    Org(OrgResourceId),
    /// No org prefix: either a bare name or a `;`-joined UID list
    Legacy { org_id: i64, raw: String },
}

impl ResourceId {
    /// Parse an identifier, using `default_org` when none is embedded
    ///
    /// # Errors
    /// Returns an error for an empty identifier or an empty name part
    pub fn parse(raw: &str, default_org: i64) -> Result<Self, ProvisionError> {
        if raw.trim().is_empty() {
            return Err(ProvisionError::InvalidId(raw.to_string()));
        }

        if let Some((org, name)) = raw.split_once(ORG_RESOURCE_ID_SEPARATOR) {
            if let Ok(org_id) = org.parse::<i64>() {
                if name.is_empty() {
                    return Err(ProvisionError::InvalidId(raw.to_string()));
                }
                return Ok(ResourceId::Org(OrgResourceId::new(org_id, name)));
            }
        }

        Ok(ResourceId::Legacy {
            org_id: default_org,
            raw: raw.to_string(),
        })
    }

    #[must_use]
    pub fn org_id(&self) -> i64 {
        match self {
            ResourceId::Org(id) => id.org_id,
            ResourceId::Legacy { org_id, .. } => *org_id,
        }
    }

    /// The name to look the resource up by
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            ResourceId::Org(id) => &id.name,
            ResourceId::Legacy { raw, .. } => raw,
        }
    }

    /// UIDs of the deprecated `uid1;uid2` form, `None` for org-scoped identifiers
    #[must_use]
    pub fn legacy_uids(&self) -> Option<Vec<&str>> {
        match self {
            ResourceId::Org(_) => None,
            ResourceId::Legacy { raw, .. } => Some(
                raw.split(LEGACY_UID_SEPARATOR)
                    .map(str::trim)
                    .filter(|uid| !uid.is_empty())
                    .collect(),
            ),
        }
    }
}
