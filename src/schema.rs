//! Record schemas: the ordered, resolved field list of a record type.

use crate::descriptor::{resolve, TypeDescriptor};
use crate::error::Result;
use crate::types::DeclaredType;
use indexmap::IndexMap;
use std::sync::OnceLock;
use tracing::debug;

/// One field as declared on the record type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    /// Field name, also its JSON key.
    pub name: &'static str,
    /// Declared type.
    pub declared: DeclaredType,
    /// Whether the constructor fills the field in when it is missing.
    pub has_default: bool,
}

impl FieldDecl {
    /// Field that must be supplied.
    pub fn required(name: &'static str, declared: DeclaredType) -> Self {
        Self {
            name,
            declared,
            has_default: false,
        }
    }

    /// Field with a constructor default.
    pub fn defaulted(name: &'static str, declared: DeclaredType) -> Self {
        Self {
            name,
            declared,
            has_default: true,
        }
    }
}

/// A field with its type resolved.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    decl: FieldDecl,
    descriptor: TypeDescriptor,
}

impl FieldSpec {
    /// Field name.
    pub fn name(&self) -> &'static str {
        self.decl.name
    }

    /// Declared type, as written.
    pub fn declared(&self) -> &DeclaredType {
        &self.decl.declared
    }

    /// Resolved descriptor the decoder uses.
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// `true` if decoding must find this field in the input.
    pub fn is_required(&self) -> bool {
        !self.decl.has_default
    }
}

/// Ordered field specs of one record type. Built once, never changed.
#[derive(Debug, Clone)]
pub struct Schema {
    type_name: &'static str,
    fields: IndexMap<&'static str, FieldSpec>,
}

impl Schema {
    /// Resolve every declared field.
    pub fn derive(type_name: &'static str, decls: Vec<FieldDecl>) -> Result<Self> {
        let mut fields = IndexMap::with_capacity(decls.len());
        for decl in decls {
            let descriptor =
                resolve(&decl.declared).map_err(|e| e.at_field(decl.name, type_name))?;
            fields.insert(decl.name, FieldSpec { decl, descriptor });
        }
        debug!(record = type_name, fields = fields.len(), "derived record schema");
        Ok(Self { type_name, fields })
    }

    /// Derive into `cell` on first call and hand out the cached result after.
    pub fn cached(
        cell: &'static OnceLock<Result<Schema>>,
        type_name: &'static str,
        decls: fn() -> Vec<FieldDecl>,
    ) -> Result<&'static Schema> {
        cell.get_or_init(|| Schema::derive(type_name, decls()))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Fully qualified record type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> + '_ {
        self.fields.values()
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// `true` for a record with no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
