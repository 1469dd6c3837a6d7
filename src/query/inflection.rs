//! Singularization for join alias naming.
//!
//! Uses the `inflector` crate with additional handling for irregular plurals
//! that show up as table names.

use inflector::Inflector;

/// Irregular plurals that inflector doesn't handle well for table names.
static IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("analysis", "analyses"),
    ("criterion", "criteria"),
    ("datum", "data"),
    ("medium", "media"),
    ("index", "indices"),
    ("matrix", "matrices"),
];

/// Singularize a word, handling irregulars first then falling back to inflector.
pub fn singularize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let lower = word.to_lowercase();

    for (singular, plural) in IRREGULAR_PLURALS {
        if lower == *plural || lower == *singular {
            return singular.to_string();
        }
    }

    lower.to_singular()
}

/// Whether a foreign key's stem names the table it points to.
///
/// `Product` names `Products`; `User` does not name `People`.
pub fn names_table(stem: &str, table: &str) -> bool {
    let stem = stem.trim().to_lowercase();
    if stem.is_empty() {
        return false;
    }
    let table = table.trim().to_lowercase();
    stem == table || singularize(&stem) == singularize(&table)
}
