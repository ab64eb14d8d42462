use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// Primitive
///
/// Concrete scalar field types. Their caster and validator bodies live in
/// the document runtime; the compiler only selects one per path.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum Primitive {
    Boolean,
    Buffer,
    Date,
    Decimal128,
    Number,
    ObjectId,
    String,
}

impl Primitive {
    #[must_use]
    pub const fn is_date(self) -> bool {
        matches!(self, Self::Date)
    }
}

///
/// TypeMarker
///
/// What a field definition says its type is, before it is compiled into a
/// `PathKind`. Sub-schemas are carried separately by `Definition::Schema`.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum TypeMarker {
    #[display("{_0}")]
    Primitive(Primitive),
    Mixed,
    Array,
}

impl TypeMarker {
    /// Resolve a type name against the closed type table.
    ///
    /// The first letter is matched case-insensitively, so `"string"` and
    /// `"String"` are equivalent. Aliases: `Bool`, `Oid`, `Object`, `Decimal`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let marker = match capitalize(name).as_str() {
            "Array" => Self::Array,
            "Boolean" | "Bool" => Self::Primitive(Primitive::Boolean),
            "Buffer" => Self::Primitive(Primitive::Buffer),
            "Date" => Self::Primitive(Primitive::Date),
            "Decimal128" | "Decimal" => Self::Primitive(Primitive::Decimal128),
            "Mixed" | "Object" => Self::Mixed,
            "Number" => Self::Primitive(Primitive::Number),
            "ObjectId" | "Oid" => Self::Primitive(Primitive::ObjectId),
            "String" => Self::Primitive(Primitive::String),
            _ => return None,
        };

        Some(marker)
    }
}

impl From<Primitive> for TypeMarker {
    fn from(primitive: Primitive) -> Self {
        Self::Primitive(primitive)
    }
}

// capitalize
pub(crate) fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

///
/// TESTS
///
