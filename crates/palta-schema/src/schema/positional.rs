use crate::{POSITIONAL_WILDCARD, Schema, schema::PathClass, schema_type::SchemaType};

///
/// Resolved
/// Outcome of resolving a positional path, cached per full path.
///

#[derive(Clone, Debug)]
pub enum Resolved {
    Real(SchemaType),
    Nested,
    Undefined,
}

impl Resolved {
    #[must_use]
    pub const fn class(&self) -> PathClass {
        match self {
            Self::Real(_) => PathClass::Real,
            Self::Nested => PathClass::Nested,
            Self::Undefined => PathClass::AdhocOrUndefined,
        }
    }
}

// Segment
// runs of ordinary segments stay joined, since sub-schemas key their
// paths by full dotted name
#[derive(Debug, Eq, PartialEq)]
enum Segment {
    Field(String),
    Position,
}

fn is_position(segment: &str) -> bool {
    segment == POSITIONAL_WILDCARD
        || (!segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()))
}

/// Whether `path` addresses array elements (`a.0.b`, `a.$.b`).
#[must_use]
pub fn is_positional(path: &str) -> bool {
    path.split('.').skip(1).any(is_position)
}

fn split(path: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut run: Vec<&str> = Vec::new();

    for (i, segment) in path.split('.').enumerate() {
        if i > 0 && is_position(segment) {
            if !run.is_empty() {
                segments.push(Segment::Field(run.join(".")));
                run.clear();
            }
            segments.push(Segment::Position);
        } else {
            run.push(segment);
        }
    }
    if !run.is_empty() {
        segments.push(Segment::Field(run.join(".")));
    }

    segments
}

///
/// resolve
///
/// Walk a positional path against compiled paths. Positions in the middle
/// are skipped; a final position yields the element type of a primitive
/// array and nothing otherwise. Field runs descend into the sub-schema of
/// the current document-array or embedded path.
///

pub(crate) fn resolve(schema: &Schema, path: &str) -> Resolved {
    let segments = split(path);
    let Some(Segment::Field(head)) = segments.first() else {
        return Resolved::Undefined;
    };

    let mut current = schema.direct(head).cloned();
    let mut nested = false;
    let last = segments.len() - 1;

    for (i, segment) in segments.iter().enumerate().skip(1) {
        nested = false;

        match segment {
            Segment::Position if i == last => {
                current = current.as_ref().and_then(SchemaType::caster).cloned();
                break;
            }
            Segment::Position => {}
            Segment::Field(name) => {
                let Some(child) = current.as_ref().and_then(SchemaType::schema) else {
                    current = None;
                    break;
                };
                nested = child.nested.contains(name);
                current = child.direct(name).cloned();
            }
        }
    }

    match current {
        Some(schema_type) => Resolved::Real(schema_type),
        None if nested => Resolved::Nested,
        None => Resolved::Undefined,
    }
}

///
/// TESTS
///
