//! W3C envelope value types shared by credentials and presentations.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;
use vcsign_core::{Document, DocumentMap};

use crate::error::ConstructionError;

/// Base context of the VC Data Model 2.0.
pub const VC_CONTEXT_V2: &str = "https://www.w3.org/ns/credentials/v2";
/// Base credential type.
pub const VERIFIABLE_CREDENTIAL_TYPE: &str = "VerifiableCredential";
/// Base presentation type.
pub const VERIFIABLE_PRESENTATION_TYPE: &str = "VerifiablePresentation";
/// `credentialSchema.type` for JSON-Schema validated credentials.
pub const JSON_SCHEMA_TYPE: &str = "JsonSchema";

/// A JSON value that may be a single item or a list of items.
///
/// The shape read from a document is the shape written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(item) => std::slice::from_ref(item),
            OneOrMany::Many(items) => items,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn first(&self) -> Option<&T> {
        self.as_slice().first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }

    /// Append an item, widening `One` to `Many`.
    pub fn push(&mut self, item: T) {
        match self {
            OneOrMany::Many(items) => items.push(item),
            OneOrMany::One(_) => {
                let prev = std::mem::replace(self, OneOrMany::Many(Vec::with_capacity(2)));
                let mut items = prev.into_vec();
                items.push(item);
                *self = OneOrMany::Many(items);
            }
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> OneOrMany<U> {
        match self {
            OneOrMany::One(item) => OneOrMany::One(f(item)),
            OneOrMany::Many(items) => OneOrMany::Many(items.into_iter().map(f).collect()),
        }
    }
}

impl<T: PartialEq> OneOrMany<T> {
    pub fn contains(&self, item: &T) -> bool {
        self.as_slice().contains(item)
    }
}

impl<'a, T> IntoIterator for &'a OneOrMany<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An entry of `credentialSchema`: where the governing schema lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialSchema {
    pub id: Url,
    #[serde(rename = "type")]
    pub schema_type: String,
}

impl CredentialSchema {
    /// A `JsonSchema` entry pointing at `id`.
    pub fn json_schema(id: Url) -> Self {
        Self {
            id,
            schema_type: JSON_SCHEMA_TYPE.to_string(),
        }
    }
}

/// An entry of `credentialStatus`.
///
/// Carried and signed but never evaluated; status-list specific members
/// are kept verbatim in `properties`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Url>,
    #[serde(rename = "type")]
    pub status_type: String,
    #[serde(flatten)]
    pub properties: DocumentMap,
}

/// Parse a mapping document into `T`, naming the first absent required
/// field before serde gets a chance to.
pub(crate) fn parse_envelope<T: DeserializeOwned>(
    document: Document,
    required: &[&str],
) -> Result<T, ConstructionError> {
    let map = document.as_object().ok_or(ConstructionError::NotAMapping)?;
    if let Some(missing) = required.iter().find(|f| !map.contains_key(**f)) {
        return Err(ConstructionError::MissingField((*missing).to_string()));
    }
    serde_json::from_value(document).map_err(|e| ConstructionError::InvalidField(e.to_string()))
}
