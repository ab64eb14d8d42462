use crate::SchemaError;

/// Names taken by document-runtime built-ins; no field path may equal one.
pub const RESERVED: [&str; 20] = [
    "_posts",
    "_pres",
    "collection",
    "db",
    "emit",
    "errors",
    "get",
    "init",
    "isModified",
    "isNew",
    "listeners",
    "modelName",
    "on",
    "once",
    "removeListener",
    "save",
    "schema",
    "set",
    "toObject",
    "validate",
];

#[must_use]
pub fn is_reserved(path: &str) -> bool {
    RESERVED.contains(&path)
}

/// Ensure a full dotted path does not collide with a reserved name.
pub(crate) fn validate_path_name(path: &str) -> Result<(), SchemaError> {
    if is_reserved(path) {
        return Err(SchemaError::ReservedName(path.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_reserved_words() {
        assert!(validate_path_name("save").is_err());
        assert!(validate_path_name("_pres").is_err());
    }

    #[test]
    fn only_whole_paths_are_compared() {
        assert!(validate_path_name("settings.save").is_ok());
        assert!(validate_path_name("saved").is_ok());
    }
}
