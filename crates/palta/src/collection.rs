use regex::Regex;
use std::sync::LazyLock;

/// Words that keep their form in the plural.
pub const UNCOUNTABLES: [&str; 27] = [
    "advice",
    "cooperation",
    "deer",
    "digestion",
    "energy",
    "equipment",
    "excretion",
    "expertise",
    "fish",
    "health",
    "information",
    "justice",
    "labour",
    "machinery",
    "media",
    "money",
    "moose",
    "news",
    "paper",
    "pollution",
    "rain",
    "rice",
    "series",
    "sewage",
    "sheep",
    "species",
    "status",
];

// first matching rule wins
const RULES: [(&str, &str); 22] = [
    (r"(?i)(m)an$", "${1}en"),
    (r"(?i)(pe)rson$", "${1}ople"),
    (r"(?i)(child)$", "${1}ren"),
    (r"(?i)^(ox)$", "${1}en"),
    (r"(?i)(ax|test)is$", "${1}es"),
    (r"(?i)(octop|vir)us$", "${1}i"),
    (r"(?i)(alias|status)$", "${1}es"),
    (r"(?i)(bu)s$", "${1}ses"),
    (r"(?i)(buffal|tomat|potat)o$", "${1}oes"),
    (r"(?i)([ti])um$", "${1}a"),
    (r"(?i)sis$", "ses"),
    (r"(?i)(?:([^f])fe|([lr])f)$", "${1}${2}ves"),
    (r"(?i)(hive)$", "${1}s"),
    (r"(?i)([^aeiouy]|qu)y$", "${1}ies"),
    (r"(?i)(x|ch|ss|sh)$", "${1}es"),
    (r"(?i)(matr|vert|ind)ix|ex$", "${1}ices"),
    (r"(?i)([ml])ouse$", "${1}ice"),
    (r"(?i)(kn|w|l)ife$", "${1}ives"),
    (r"(?i)(quiz)$", "${1}zes"),
    (r"(?i)s$", "s"),
    (r"([^a-z])$", "${1}"),
    (r"$", "s"),
];

static PLURAL_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    RULES
        .iter()
        .filter_map(|(pattern, replacement)| {
            Regex::new(pattern).ok().map(|regex| (regex, *replacement))
        })
        .collect()
});

/// English plural of `word`, by the first matching rule.
#[must_use]
pub fn pluralize(word: &str) -> String {
    if UNCOUNTABLES.contains(&word.to_lowercase().as_str()) {
        return word.to_string();
    }

    PLURAL_RULES
        .iter()
        .find(|(regex, _)| regex.is_match(word))
        .map_or_else(
            || word.to_string(),
            |(regex, replacement)| regex.replace(word, *replacement).into_owned(),
        )
}

/// Collection name derived from a model name: lower-cased, then pluralized
/// unless `pluralization` is off. System collections are left untouched.
#[must_use]
pub fn to_collection_name(name: &str, pluralization: bool) -> String {
    if name.starts_with("system.") {
        return name.to_string();
    }

    let lower = name.to_lowercase();
    if pluralization { pluralize(&lower) } else { lower }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_rule_compiles() {
        assert_eq!(PLURAL_RULES.len(), RULES.len());
    }

    #[test]
    fn irregular_and_regular_plurals() {
        let cases = [
            ("user", "users"),
            ("person", "people"),
            ("woman", "women"),
            ("child", "children"),
            ("ox", "oxen"),
            ("axis", "axes"),
            ("virus", "viri"),
            ("bus", "buses"),
            ("tomato", "tomatoes"),
            ("medium", "media"),
            ("analysis", "analyses"),
            ("wolf", "wolves"),
            ("category", "categories"),
            ("box", "boxes"),
            ("mouse", "mice"),
            ("quiz", "quizzes"),
            ("alias", "aliases"),
            ("boss", "bosses"),
            ("posts", "posts"),
        ];

        for (singular, plural) in cases {
            assert_eq!(pluralize(singular), plural, "plural of {singular}");
        }
    }

    #[test]
    fn uncountables_are_unchanged() {
        assert_eq!(pluralize("sheep"), "sheep");
        assert_eq!(pluralize("Information"), "Information");
    }

    #[test]
    fn collection_names_are_lowercased() {
        assert_eq!(to_collection_name("BlogPost", true), "blogposts");
        assert_eq!(to_collection_name("Person", true), "people");
        assert_eq!(to_collection_name("Person", false), "person");
        assert_eq!(to_collection_name("system.profile", true), "system.profile");
    }
}
