use crate::{
    Schema, SchemaError,
    definition::{Definition, FieldOptions, is_nested_group, type_entry},
    options::SchemaOptions,
    schema_type::{PathKind, SchemaType},
    types::{Primitive, TypeMarker, capitalize},
};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

///
/// Effective
/// The type a field definition resolves to, before options are attached.
///

enum Effective<'a> {
    Mixed,
    Array(Option<&'a Definition>),
    Schema(&'a Arc<Schema>),
    Primitive(Primitive),
}

///
/// interpret_as_type
///
/// Decide which field type `def` stands for and build its compiled form.
/// Sub-schemas declared inline as array elements are compiled eagerly.
///

pub fn interpret_as_type(
    path: &str,
    def: &Definition,
    options: &SchemaOptions,
) -> Result<SchemaType, SchemaError> {
    let type_key = options.type_key.as_str();

    // a bare marker is shorthand for `{ type: marker }`
    let wrapped;
    let mut record = match def {
        Definition::Object(record) => record,
        other => {
            wrapped = IndexMap::from([(type_key.to_string(), other.clone())]);
            &wrapped
        }
    };

    // { type: { type: String, default: x } }
    if let Some(Definition::Object(inner)) = type_entry(record, type_key)
        && type_entry(inner, type_key).is_some()
    {
        record = inner;
    }

    let schema_type = match effective(path, type_entry(record, type_key), record)? {
        Effective::Mixed => SchemaType::new(
            path,
            PathKind::Mixed,
            FieldOptions::from_record(record, type_key, None),
        ),
        Effective::Array(cast) => array_type(path, cast, record, options)?,
        Effective::Schema(schema) => SchemaType::new(
            path,
            PathKind::Embedded(Arc::clone(schema)),
            FieldOptions::from_record(record, type_key, None),
        ),
        Effective::Primitive(primitive) => SchemaType::new(
            path,
            PathKind::Primitive(primitive),
            FieldOptions::from_record(record, type_key, Some(primitive)),
        ),
    };

    Ok(schema_type)
}

// effective
fn effective<'a>(
    path: &str,
    marker: Option<&'a Definition>,
    record: &'a IndexMap<String, Definition>,
) -> Result<Effective<'a>, SchemaError> {
    let from_marker = |marker: TypeMarker| match marker {
        TypeMarker::Primitive(primitive) => Effective::Primitive(primitive),
        TypeMarker::Mixed => Effective::Mixed,
        TypeMarker::Array => Effective::Array(record.get("cast")),
    };

    let effective = match marker {
        None | Some(Definition::Object(_)) => Effective::Mixed,
        Some(Definition::Array(items)) => Effective::Array(items.first()),
        Some(Definition::Schema(schema)) => Effective::Schema(schema),
        Some(Definition::Type(marker)) => from_marker(*marker),
        Some(Definition::Value(Value::String(name))) if name == "mixed" => Effective::Mixed,
        Some(Definition::Value(Value::String(name))) => {
            from_marker(TypeMarker::from_name(name).ok_or_else(|| unknown_type(name, path))?)
        }
        Some(Definition::Value(other)) => return Err(unknown_type(&other.to_string(), path)),
    };

    Ok(effective)
}

// array_type
fn array_type(
    path: &str,
    cast: Option<&Definition>,
    record: &IndexMap<String, Definition>,
    options: &SchemaOptions,
) -> Result<SchemaType, SchemaError> {
    let type_key = options.type_key.as_str();

    let kind = match cast.filter(|cast| !cast.is_falsy()) {
        Some(Definition::Schema(schema)) => PathKind::DocumentArray(Arc::clone(schema)),

        // [{ title: String }] declares an inline sub-schema
        Some(Definition::Object(fields)) if !fields.is_empty() && is_nested_group(fields, type_key) => {
            let child = Schema::new(Definition::Object(fields.clone()), options.for_child())?;
            PathKind::DocumentArray(Arc::new(child))
        }

        Some(cast) => PathKind::PrimitiveArray(Box::new(interpret_as_type(path, cast, options)?)),

        None => PathKind::PrimitiveArray(Box::new(SchemaType::new(
            path,
            PathKind::Mixed,
            FieldOptions::default(),
        ))),
    };

    Ok(SchemaType::new(
        path,
        kind,
        FieldOptions::from_record(record, type_key, None),
    ))
}

fn unknown_type(name: &str, path: &str) -> SchemaError {
    SchemaError::UnknownType {
        name: capitalize(name),
        path: path.to_string(),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn interpret(def: Value) -> Result<SchemaType, SchemaError> {
        interpret_as_type("field", &Definition::from(def), &SchemaOptions::default())
    }

    #[test]
    fn bare_names_and_records_resolve_to_primitives() {
        let bare = interpret(json!("String")).expect("bare marker");
        assert!(matches!(bare.kind, PathKind::Primitive(Primitive::String)));

        let record = interpret(json!({ "type": "number", "required": true })).expect("record");
        assert!(matches!(record.kind, PathKind::Primitive(Primitive::Number)));
        assert!(record.is_required());
    }

    #[test]
    fn untyped_objects_and_mixed_token_are_mixed() {
        assert!(interpret(json!({})).expect("empty").is_mixed());
        assert!(interpret(json!("mixed")).expect("token").is_mixed());
        assert!(interpret(json!({ "type": { "any": 1 } })).expect("object type").is_mixed());
        assert!(interpret(json!({ "default": 3 })).expect("no type").is_mixed());
    }

    #[test]
    fn nested_type_record_is_unwrapped_once() {
        let ty = interpret(json!({ "type": { "type": "String", "default": "freshcut" } }))
            .expect("unwrapped");

        assert!(matches!(ty.kind, PathKind::Primitive(Primitive::String)));
        assert_eq!(ty.options.default, Some(json!("freshcut")));
    }

    #[test]
    fn arrays_of_primitives_carry_their_caster() {
        let ty = interpret(json!(["String"])).expect("array");
        let caster = ty.caster().expect("caster");
        assert!(matches!(caster.kind, PathKind::Primitive(Primitive::String)));

        let ty = interpret(json!({ "type": "array", "cast": "Number" })).expect("array token");
        assert!(matches!(
            ty.caster().map(|c| &c.kind),
            Some(PathKind::Primitive(Primitive::Number))
        ));

        let ty = interpret(json!([])).expect("empty array");
        assert!(ty.caster().is_some_and(SchemaType::is_mixed));
    }

    #[test]
    fn inline_array_elements_become_document_arrays() {
        let ty = interpret(json!([{ "title": "String" }])).expect("document array");
        let child = ty.schema().expect("sub-schema");

        assert!(matches!(ty.kind, PathKind::DocumentArray(_)));
        assert!(child.paths.contains_key("title"));
        assert!(child.paths.contains_key("_id"));
    }

    #[test]
    fn typed_array_elements_stay_primitive() {
        let ty = interpret(json!([{ "type": "Date", "required": true }])).expect("typed element");
        let caster = ty.caster().expect("caster");

        assert!(matches!(caster.kind, PathKind::Primitive(Primitive::Date)));
        assert!(caster.is_required());
    }

    #[test]
    fn inline_sub_schemas_inherit_the_type_key() {
        let options = SchemaOptions {
            type_key: "$type".to_string(),
            minimize: false,
            ..SchemaOptions::default()
        };
        let def = Definition::from(json!({ "$type": [{ "type": { "$type": "String" } }] }));
        let ty = interpret_as_type("field", &def, &options).expect("document array");
        let child = ty.schema().expect("sub-schema");

        assert_eq!(child.options().type_key, "$type");
        assert!(!child.options().minimize);
        assert!(child.paths.contains_key("type"));
    }

    #[test]
    fn embedded_schemas_are_shared() {
        let child = Arc::new(
            Schema::new(json!({ "street": "String" }), SchemaOptions::default()).expect("child"),
        );
        let def = Definition::object([("type", Definition::Schema(Arc::clone(&child)))]);
        let ty = interpret_as_type("address", &def, &SchemaOptions::default()).expect("embedded");

        assert!(matches!(ty.kind, PathKind::Embedded(ref s) if Arc::ptr_eq(s, &child)));
    }

    #[test]
    fn unknown_names_report_path_and_hint() {
        let err = interpret(json!({ "type": "Geometry" })).unwrap_err();

        assert_eq!(
            err,
            SchemaError::UnknownType {
                name: "Geometry".to_string(),
                path: "field".to_string()
            }
        );
        let message = err.to_string();
        assert!(message.contains("`field`"));
        assert!(message.contains("sub-schema arrays or embedded sub-schemas"));
    }
}
