use crate::{
    Schema,
    definition::FieldOptions,
    schema::FieldIndex,
    types::Primitive,
};
use std::sync::Arc;

///
/// SchemaType
///
/// The compiled form of one flattened dotted path.
///

#[derive(Clone, Debug)]
pub struct SchemaType {
    pub path: String,
    pub kind: PathKind,
    pub options: FieldOptions,
}

impl SchemaType {
    #[must_use]
    pub fn new(path: impl Into<String>, kind: PathKind, options: FieldOptions) -> Self {
        Self {
            path: path.into(),
            kind,
            options,
        }
    }

    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.options.required.is_some()
    }

    #[must_use]
    pub const fn index(&self) -> Option<&FieldIndex> {
        self.options.index.as_ref()
    }

    /// The nested compiler owned by embedded and document-array paths.
    #[must_use]
    pub const fn schema(&self) -> Option<&Arc<Schema>> {
        match &self.kind {
            PathKind::Embedded(schema) | PathKind::DocumentArray(schema) => Some(schema),
            _ => None,
        }
    }

    /// Element type of a primitive array.
    #[must_use]
    pub fn caster(&self) -> Option<&Self> {
        match &self.kind {
            PathKind::PrimitiveArray(caster) => Some(caster.as_ref()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_mixed(&self) -> bool {
        matches!(self.kind, PathKind::Mixed)
    }

    /// Name of the field-type implementation this path is bound to.
    #[must_use]
    pub const fn instance(&self) -> &'static str {
        match &self.kind {
            PathKind::Primitive(primitive) => primitive_name(*primitive),
            PathKind::Mixed => "Mixed",
            PathKind::Embedded(_) => "Embedded",
            PathKind::DocumentArray(_) => "DocumentArray",
            PathKind::PrimitiveArray(_) => "Array",
        }
    }
}

///
/// PathKind
///

#[derive(Clone, Debug)]
pub enum PathKind {
    Primitive(Primitive),
    Mixed,
    Embedded(Arc<Schema>),
    DocumentArray(Arc<Schema>),
    PrimitiveArray(Box<SchemaType>),
}

impl PathKind {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Primitive(_) => "primitive",
            Self::Mixed => "mixed",
            Self::Embedded(_) => "embedded-document",
            Self::DocumentArray(_) => "document-array",
            Self::PrimitiveArray(_) => "primitive-array",
        }
    }
}

const fn primitive_name(primitive: Primitive) -> &'static str {
    match primitive {
        Primitive::Boolean => "Boolean",
        Primitive::Buffer => "Buffer",
        Primitive::Date => "Date",
        Primitive::Decimal128 => "Decimal128",
        Primitive::Number => "Number",
        Primitive::ObjectId => "ObjectId",
        Primitive::String => "String",
    }
}
