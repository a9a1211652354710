//! # Schema Evaluator
//!
//! The [`SchemaEvaluator`] trait is the seam between schema binding and
//! whatever JSON-Schema engine performs the structural check. It has two
//! questions to answer:
//!
//! - does `instance` satisfy `schema`? ([`SchemaEvaluator::validate`])
//! - is `candidate` itself a well-formed schema?
//!   ([`SchemaEvaluator::check_schema`]), used for self-describing
//!   schema credentials.
//!
//! ## Reference Resolution
//!
//! [`JsonSchemaEvaluator`] installs a local retriever. A `$ref` is resolved
//! only against schemas registered by `$id`; anything else fails the build
//! instead of triggering a network request.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use jsonschema::{Draft, Retrieve, Uri, ValidationOptions, Validator};
use thiserror::Error;
use vcsign_core::Document;

/// `$id` of the JSON-Schema Draft 2020-12 meta-schema.
///
/// A credential whose `credentialSchema` id is this URL carries a schema as
/// its own subject.
pub const META_SCHEMA_ID: &str = "https://json-schema.org/draft/2020-12/schema";

/// Error returned by a [`SchemaEvaluator`].
#[derive(Error, Debug)]
pub enum EvaluationError {
    /// The schema document could not be compiled.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// The instance does not conform to the schema.
    #[error("instance does not conform to schema:\n{0}")]
    ValidationFailed(SchemaViolations),
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Non-empty collection of violations from one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolations {
    violations: Vec<Violation>,
}

impl SchemaViolations {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for SchemaViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Structural JSON-Schema evaluation capability.
///
/// Implementations must be pure: the same `(schema, instance)` pair always
/// yields the same answer, and no state is shared between calls.
pub trait SchemaEvaluator: Send + Sync + fmt::Debug {
    /// Check `instance` against `schema`.
    fn validate(&self, schema: &Document, instance: &Document) -> Result<(), EvaluationError>;

    /// Check that `candidate` is itself a valid schema document.
    fn check_schema(&self, candidate: &Document) -> Result<(), EvaluationError>;

    /// Boolean form of [`validate`](Self::validate).
    fn is_valid(&self, schema: &Document, instance: &Document) -> bool {
        self.validate(schema, instance).is_ok()
    }
}

/// Retriever that serves registered schemas and refuses everything else.
struct LocalSchemaRetriever {
    schemas_by_uri: Arc<HashMap<String, Document>>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Document, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        self.schemas_by_uri
            .get(uri_str)
            .or_else(|| self.schemas_by_uri.get(uri_str.trim_end_matches('#')))
            .cloned()
            .ok_or_else(|| format!("schema '{uri_str}' is not registered").into())
    }
}

/// Default evaluator backed by the `jsonschema` crate (Draft 2020-12).
///
/// Cheap to clone; registered schemas are shared behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct JsonSchemaEvaluator {
    schemas_by_uri: Arc<HashMap<String, Document>>,
}

impl JsonSchemaEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema for `$ref` resolution under its `$id`.
    ///
    /// Fails with [`EvaluationError::InvalidSchema`] if the schema has no
    /// string `$id`.
    pub fn with_schema(mut self, schema: Document) -> Result<Self, EvaluationError> {
        let id = schema
            .get("$id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                EvaluationError::InvalidSchema("registered schema must carry a string $id".into())
            })?
            .to_string();
        Arc::make_mut(&mut self.schemas_by_uri).insert(id, schema);
        Ok(self)
    }

    /// Number of schemas registered for reference resolution.
    pub fn schema_count(&self) -> usize {
        self.schemas_by_uri.len()
    }

    fn build_options(&self) -> ValidationOptions {
        let mut opts = jsonschema::options();
        opts.with_draft(Draft::Draft202012);
        opts.with_retriever(LocalSchemaRetriever {
            schemas_by_uri: Arc::clone(&self.schemas_by_uri),
        });
        opts
    }

    /// Compile `schema` into a validator.
    pub fn build_validator(&self, schema: &Document) -> Result<Validator, EvaluationError> {
        if !(schema.is_object() || schema.is_boolean()) {
            return Err(EvaluationError::InvalidSchema(
                "schema must be an object or a boolean".into(),
            ));
        }
        self.build_options()
            .build(schema)
            .map_err(|e| EvaluationError::InvalidSchema(e.to_string()))
    }
}

impl SchemaEvaluator for JsonSchemaEvaluator {
    fn validate(&self, schema: &Document, instance: &Document) -> Result<(), EvaluationError> {
        let validator = self.build_validator(schema)?;

        let violations: Vec<Violation> = validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(EvaluationError::ValidationFailed(SchemaViolations { violations }))
        }
    }

    fn check_schema(&self, candidate: &Document) -> Result<(), EvaluationError> {
        // Compiling validates the candidate against its meta-schema.
        self.build_validator(candidate).map(|_| ())
    }
}
