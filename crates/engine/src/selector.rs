//! Best-effort CSS selector generation for persisting hidden elements.
//!
//! An element with an id is addressed as `#id`. Anything else gets a child
//! combinator path anchored at the content root (`body > ...`), one
//! `tag.class:nth-of-type(k)` segment per ancestor below it. The result is
//! only used to find the element again on a later page load, so imprecision
//! is tolerated: a segment whose class list cannot be read degrades to its tag.

use crate::dom::PageDom;
use crate::error::SelectorError;

const CHILD_COMBINATOR: &str = " > ";

/// Builds the selector for `element`
pub fn generate_selector<D: PageDom>(dom: &D, element: &D::Handle) -> Result<String, SelectorError> {
    if !dom.is_live(element) {
        return Err(SelectorError::Detached);
    }

    if let Some(id) = dom.element_id(element).filter(|id| !id.is_empty()) {
        return Ok(format!("#{}", escape_ident(&id)));
    }

    let mut segments = Vec::new();
    let mut root = None;
    let mut current = Some(element.clone());
    while let Some(node) = current {
        if dom.is_content_root(&node) {
            root = Some(node);
            break;
        }
        segments.push(path_segment(dom, &node)?);
        current = dom.parent(&node);
    }

    // The content root itself has no path below it.
    if segments.is_empty() {
        return dom.tag_name(element).ok_or(SelectorError::MissingTag);
    }

    // Anchored: `body > div`, never a bare `div`.
    if let Some(root) = root {
        segments.push(dom.tag_name(&root).ok_or(SelectorError::MissingTag)?);
    }

    segments.reverse();
    Ok(segments.join(CHILD_COMBINATOR))
}

fn path_segment<D: PageDom>(dom: &D, node: &D::Handle) -> Result<String, SelectorError> {
    let tag = dom.tag_name(node).ok_or(SelectorError::MissingTag)?;
    let mut segment = tag.clone();

    match dom.class_names(node) {
        Ok(classes) => {
            for class in classes.iter().filter(|c| !c.is_empty()) {
                segment.push('.');
                segment.push_str(&escape_ident(class));
            }
        }
        Err(err) => log::debug!("class list unavailable on <{}>, using tag only: {}", tag, err),
    }

    if let Some(parent) = dom.parent(node) {
        let same_tag: Vec<D::Handle> = dom
            .children(&parent)
            .into_iter()
            .filter(|sibling| dom.tag_name(sibling).as_deref() == Some(tag.as_str()))
            .collect();
        if same_tag.len() > 1 {
            if let Some(position) = same_tag.iter().position(|sibling| sibling == node) {
                segment.push_str(&format!(":nth-of-type({})", position + 1));
            }
        }
    }

    Ok(segment)
}

/// Escapes a string for use as a CSS identifier, following `CSS.escape`
pub fn escape_ident(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len());

    if chars.len() == 1 && chars[0] == '-' {
        return "\\-".to_string();
    }

    for (index, &ch) in chars.iter().enumerate() {
        let code = ch as u32;
        let leading_digit = ch.is_ascii_digit() && (index == 0 || (index == 1 && chars[0] == '-'));

        if ch == '\0' {
            out.push('\u{FFFD}');
        } else if (1..=0x1f).contains(&code) || code == 0x7f || leading_digit {
            out.push_str(&format!("\\{:x} ", code));
        } else if code >= 0x80 || ch == '-' || ch == '_' || ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else {
            out.push('\\');
            out.push(ch);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDom;

    #[test]
    fn test_escape_ident() {
        assert_eq!(escape_ident("banner"), "banner");
        assert_eq!(escape_ident("1st"), "\\31 st");
        assert_eq!(escape_ident("-2x"), "-\\32 x");
        assert_eq!(escape_ident("-"), "\\-");
        assert_eq!(escape_ident("a:b.c"), "a\\:b\\.c");
        assert_eq!(escape_ident("ünï"), "ünï");
    }

    #[test]
    fn test_id_short_circuits_path() {
        let dom = FakeDom::new();
        let wrapper = dom.append(dom.body(), "div");
        let ad = dom.append(wrapper, "aside");
        dom.set_id(ad, "sidebar-ad");
        dom.set_classes(ad, &["promo"]);

        assert_eq!(generate_selector(&dom, &ad).unwrap(), "#sidebar-ad");
    }

    #[test]
    fn test_path_with_classes_and_nth_of_type() {
        let dom = FakeDom::new();
        let main = dom.append(dom.body(), "main");
        dom.set_classes(main, &["content", "wide"]);
        dom.append(main, "p");
        let second = dom.append(main, "p");
        dom.append(main, "span");

        assert_eq!(
            generate_selector(&dom, &second).unwrap(),
            "body > main.content.wide > p:nth-of-type(2)"
        );
    }

    #[test]
    fn test_single_same_tag_sibling_has_no_discriminator() {
        let dom = FakeDom::new();
        let section = dom.append(dom.body(), "section");
        dom.append(section, "h2");
        let list = dom.append(section, "ul");

        assert_eq!(generate_selector(&dom, &list).unwrap(), "body > section > ul");
    }

    #[test]
    fn test_unreadable_class_list_degrades_to_tag() {
        let dom = FakeDom::new();
        let svg = dom.append(dom.body(), "svg");
        dom.break_class_list(svg);
        let path = dom.append(svg, "path");

        assert_eq!(generate_selector(&dom, &path).unwrap(), "body > svg > path");
    }

    #[test]
    fn test_generated_selector_resolves_back() {
        let dom = FakeDom::new();
        let nav = dom.append(dom.body(), "nav");
        dom.set_classes(nav, &["top"]);
        dom.append(nav, "a");
        let link = dom.append(nav, "a");

        let selector = generate_selector(&dom, &link).unwrap();
        assert_eq!(dom.query_all(&selector).unwrap(), vec![link]);
    }

    #[test]
    fn test_top_level_element_is_anchored_at_body() {
        let dom = FakeDom::new();
        let banner = dom.append(dom.body(), "div");
        let section = dom.append(dom.body(), "section");
        let nested = dom.append(section, "div");

        let selector = generate_selector(&dom, &banner).unwrap();
        assert_eq!(selector, "body > div");
        assert_eq!(dom.query_all(&selector).unwrap(), vec![banner]);
        assert!(!dom.query_all(&selector).unwrap().contains(&nested));
    }

    #[test]
    fn test_body_itself_yields_its_tag() {
        let dom = FakeDom::new();
        assert_eq!(generate_selector(&dom, &dom.body()).unwrap(), "body");
    }

    #[test]
    fn test_detached_element_fails() {
        let dom = FakeDom::new();
        let div = dom.append(dom.body(), "div");
        dom.detach(div);

        assert_eq!(generate_selector(&dom, &div), Err(SelectorError::Detached));
    }
}
