//! Namespace-agnostic element helpers.
//!
//! Every tag comparison in this crate goes through [`local_name`]; qualified
//! names are never compared directly.

use roxmltree::Node;

/// Tag name without any namespace decoration.
pub fn local_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

pub fn is_named(node: Node<'_, '_>, name: &str) -> bool {
    node.is_element() && local_name(node) == name
}

/// First direct child element with the given local name.
pub fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| is_named(*c, name))
}

/// Follow a path of direct child elements.
pub fn child_path<'a, 'input>(
    node: Node<'a, 'input>,
    path: &[&str],
) -> Option<Node<'a, 'input>> {
    path.iter().try_fold(node, |current, name| child(current, name))
}

/// First element below `node` (in document order) with the given local name.
pub fn descendant<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants().skip(1).find(|d| is_named(*d, name))
}

/// Text of the node and all its descendants, tails included, in document order.
pub fn full_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|d| d.is_text())
        .filter_map(|d| d.text())
        .collect()
}

/// Trimmed full text, or `None` if it is blank.
pub fn non_empty_text(node: Node<'_, '_>) -> Option<String> {
    let text = full_text(node);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    #[test]
    fn local_name_ignores_namespace() {
        let xml = r#"<bt:rede xmlns:bt="urn:bt"><bt:p>x</bt:p></bt:rede>"#;
        let doc = Document::parse(xml).unwrap();
        let root = doc.root_element();
        assert_eq!(local_name(root), "rede");
        assert!(child(root, "p").is_some());
    }

    #[test]
    fn full_text_includes_children_and_tails() {
        let xml = "<p>Das ist <b>sehr</b> wichtig<i>, <u>wirklich</u></i>.</p>";
        let doc = Document::parse(xml).unwrap();
        assert_eq!(full_text(doc.root_element()), "Das ist sehr wichtig, wirklich.");
    }

    #[test]
    fn child_path_and_descendant() {
        let xml = "<p><redner><name><vorname>Anna</vorname></name></redner></p>";
        let doc = Document::parse(xml).unwrap();
        let root = doc.root_element();
        let name = child_path(root, &["redner", "name"]).unwrap();
        assert_eq!(local_name(name), "name");
        assert!(child_path(root, &["name"]).is_none());
        assert!(descendant(root, "vorname").is_some());
        assert!(descendant(root, "p").is_none(), "descendant excludes the node itself");
    }

    #[test]
    fn blank_text_is_none() {
        let doc = Document::parse("<p>  <b> </b> </p>").unwrap();
        assert_eq!(non_empty_text(doc.root_element()), None);
    }
}
