//! Speaker and affiliation extraction from a speaker-introduction marker.
//!
//! Each field is looked up with an ordered list of strategies: the
//! conventional `redner/name/...` path first, then a search of the whole
//! marker subtree. The first non-blank value wins; nothing found yields an
//! empty string.

use roxmltree::Node;

use crate::markup::{child, child_path, descendant, is_named, non_empty_text};

/// Who is speaking, as declared by the introduction marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Speaker {
    /// Given and family name joined by a space.
    pub name: String,
    /// Party, else short role, else long role, else empty.
    pub affiliation: String,
}

impl Speaker {
    pub fn from_marker(marker: Node<'_, '_>) -> Self {
        let given = lookup(marker, &["vorname"]);
        let family = lookup(marker, &["nachname"]);
        let name = [given, family]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");

        let affiliation = lookup(marker, &["fraktion"])
            .or_else(|| lookup(marker, &["rolle", "rolle_kurz"]))
            .or_else(|| lookup(marker, &["rolle", "rolle_lang"]))
            .unwrap_or_default();

        Self { name, affiliation }
    }
}

/// The `name` element of the marker at its conventional position.
fn conventional_name<'a, 'input>(marker: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    if is_named(marker, "redner") {
        child(marker, "name")
    } else {
        child_path(marker, &["redner", "name"])
    }
}

fn lookup<'a, 'input>(marker: Node<'a, 'input>, path: &[&str]) -> Option<String> {
    let leaf = path.last()?;

    let strategies: [&dyn Fn() -> Option<Node<'a, 'input>>; 3] = [
        &|| conventional_name(marker).and_then(|n| child_path(n, path)),
        &|| descendant(marker, "name").and_then(|n| child_path(n, path)),
        &|| descendant(marker, leaf),
    ];

    strategies
        .iter()
        .filter_map(|strategy| strategy())
        .find_map(non_empty_text)
}
