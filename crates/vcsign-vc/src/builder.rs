//! Fluent construction of unsigned credentials.

use chrono::{DateTime, Utc};
use url::Url;
use uuid::Uuid;
use vcsign_core::Document;

use crate::credential::{CredentialBody, VerifiableCredential};
use crate::envelope::{
    CredentialSchema, CredentialStatus, OneOrMany, VC_CONTEXT_V2, VERIFIABLE_CREDENTIAL_TYPE,
};
use crate::error::ConstructionError;

/// Builder for a [`VerifiableCredential`].
///
/// Starts from the v2 context, the `VerifiableCredential` type, and fresh
/// `urn:uuid:` values for `id` and `issuer`.
#[derive(Debug, Clone)]
pub struct VerifiableCredentialBuilder {
    context: Vec<Url>,
    id: Option<Url>,
    types: Vec<String>,
    name: Option<String>,
    description: Option<String>,
    issuer: Url,
    valid_from: Option<DateTime<Utc>>,
    valid_until: Option<DateTime<Utc>>,
    credential_status: Vec<CredentialStatus>,
    credential_schema: Option<CredentialSchema>,
    credential_subject: Document,
}

impl VerifiableCredentialBuilder {
    /// Start a credential whose subject is governed by the schema at
    /// `schema_id`.
    pub fn new(credential_subject: Document, schema_id: &str) -> Result<Self, ConstructionError> {
        let schema_id = Url::parse(schema_id).map_err(|e| {
            ConstructionError::InvalidField(format!("credentialSchema.id '{schema_id}': {e}"))
        })?;
        let mut builder = Self::without_schema(credential_subject)?;
        builder.credential_schema = Some(CredentialSchema::json_schema(schema_id));
        Ok(builder)
    }

    /// Start a credential with no `credentialSchema` entry.
    pub fn without_schema(credential_subject: Document) -> Result<Self, ConstructionError> {
        let context = Url::parse(VC_CONTEXT_V2)
            .map_err(|e| ConstructionError::InvalidField(format!("@context: {e}")))?;
        Ok(Self {
            context: vec![context],
            id: Some(random_urn()?),
            types: vec![VERIFIABLE_CREDENTIAL_TYPE.to_string()],
            name: None,
            description: None,
            issuer: random_urn()?,
            valid_from: None,
            valid_until: None,
            credential_status: Vec::new(),
            credential_schema: None,
            credential_subject,
        })
    }

    pub fn id(mut self, id: Option<Url>) -> Self {
        self.id = id;
        self
    }

    pub fn issuer(mut self, issuer: Url) -> Self {
        self.issuer = issuer;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn valid_from(mut self, valid_from: DateTime<Utc>) -> Self {
        self.valid_from = Some(valid_from);
        self
    }

    pub fn valid_until(mut self, valid_until: DateTime<Utc>) -> Self {
        self.valid_until = Some(valid_until);
        self
    }

    pub fn add_context(mut self, url: Url) -> Self {
        self.context.push(url);
        self
    }

    /// Add a credential type after `VerifiableCredential`. Duplicates are
    /// ignored.
    pub fn add_type(mut self, credential_type: impl Into<String>) -> Self {
        let credential_type = credential_type.into();
        if !self.types.contains(&credential_type) {
            self.types.push(credential_type);
        }
        self
    }

    pub fn credential_status(mut self, status: CredentialStatus) -> Self {
        self.credential_status.push(status);
        self
    }

    /// Assemble the credential.
    ///
    /// # Errors
    ///
    /// [`ConstructionError::InvalidField`] if `validUntil` precedes
    /// `validFrom`.
    pub fn build(self) -> Result<VerifiableCredential, ConstructionError> {
        if let (Some(from), Some(until)) = (self.valid_from, self.valid_until) {
            if until < from {
                return Err(ConstructionError::InvalidField(format!(
                    "validUntil {until} precedes validFrom {from}"
                )));
            }
        }

        let credential_type = if self.types.len() == 1 {
            OneOrMany::One(self.types.into_iter().next().unwrap_or_default())
        } else {
            OneOrMany::Many(self.types)
        };

        let credential_status = match self.credential_status.len() {
            0 => None,
            1 => self.credential_status.into_iter().next().map(OneOrMany::One),
            _ => Some(OneOrMany::Many(self.credential_status)),
        };

        let body = CredentialBody {
            context: Some(OneOrMany::Many(self.context)),
            id: self.id,
            credential_type: Some(credential_type),
            name: self.name,
            description: self.description,
            issuer: self.issuer,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            credential_status,
            credential_schema: self.credential_schema.map(OneOrMany::One),
            credential_subject: self.credential_subject,
            proof: None,
        };
        let document = serde_json::to_value(&body)
            .map_err(|e| ConstructionError::InvalidField(e.to_string()))?;
        VerifiableCredential::from_document(document)
    }
}

fn random_urn() -> Result<Url, ConstructionError> {
    Url::parse(&format!("urn:uuid:{}", Uuid::new_v4()))
        .map_err(|e| ConstructionError::InvalidField(format!("urn:uuid: {e}")))
}
