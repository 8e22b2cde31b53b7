//! Depth-first traversal with an explicit stack.
//!
//! Both walkers visit nodes in pre-order (parent before children, siblings
//! left to right). The root element itself is not yielded: it has no parent
//! slot and can never be replaced.

use super::{Children, Element, Node};

/// A node reached by [`Walk`], with the parent it hangs from.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub node: &'a Node,
    pub parent: &'a Element,
    /// Position among the parent's children.
    pub index: usize,
    /// 1 for children of the root.
    pub depth: usize,
}

/// Read-only pre-order iterator over the descendants of an element.
pub struct Walk<'a> {
    stack: Vec<Visit<'a>>,
}

impl<'a> Walk<'a> {
    pub fn new(root: &'a Element) -> Self {
        let mut walk = Self { stack: Vec::new() };
        walk.push_children(root, 1);
        walk
    }

    fn push_children(&mut self, parent: &'a Element, depth: usize) {
        for (index, node) in parent.children.iter().enumerate().rev() {
            self.stack.push(Visit {
                node,
                parent,
                index,
                depth,
            });
        }
    }

    /// Only yield element nodes.
    pub fn elements(self) -> impl Iterator<Item = (&'a Element, Visit<'a>)> {
        self.filter_map(|visit| visit.node.as_element().map(|elem| (elem, visit)))
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let visit = self.stack.pop()?;
        if let Node::Element(elem) = visit.node {
            self.push_children(elem, visit.depth + 1);
        }
        Some(visit)
    }
}

/// Whether a mutable walk descends into the slot it just visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Do not visit the slot's children. Used after replacing a node.
    Skip,
}

/// Where a slot sits in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub index: usize,
    pub depth: usize,
}

/// Visit every child slot below `root` in pre-order.
///
/// The callback may overwrite the slot; sibling positions never shift, so
/// replacement is position-preserving. Children are read after the callback
/// returns, which means a replaced node's new children are walked unless the
/// callback returns [`Flow::Skip`].
pub fn visit_slots_mut<F>(root: &mut Element, mut f: F)
where
    F: FnMut(&mut Node, Position) -> Flow,
{
    let mut stack: Vec<(&mut Node, Position)> = Vec::new();
    push_slots(&mut stack, &mut root.children, 1);

    while let Some((slot, pos)) = stack.pop() {
        if f(slot, pos) == Flow::Skip {
            continue;
        }
        if let Node::Element(elem) = slot {
            push_slots(&mut stack, &mut elem.children, pos.depth + 1);
        }
    }
}

fn push_slots<'a>(
    stack: &mut Vec<(&'a mut Node, Position)>,
    children: &'a mut Children,
    depth: usize,
) {
    for (index, slot) in children.iter_mut().enumerate().rev() {
        stack.push((slot, Position { index, depth }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vdom::Text;

    fn sample() -> Element {
        // <root><a><b/>t</a><c/></root>
        Element::bare("root")
            .with_child(
                Element::bare("a")
                    .with_child(Element::bare("b"))
                    .with_child(Text::new("t")),
            )
            .with_child(Element::bare("c"))
    }

    #[test]
    fn test_walk_pre_order() {
        let root = sample();
        let order: Vec<_> = Walk::new(&root)
            .map(|v| match v.node {
                Node::Element(e) => e.tag.clone(),
                Node::Text(t) => format!("#{}", t.content),
            })
            .collect();
        assert_eq!(order, vec!["a", "b", "#t", "c"]);
    }

    #[test]
    fn test_walk_reports_parent_and_index() {
        let root = sample();
        let visits: Vec<_> = Walk::new(&root)
            .elements()
            .map(|(e, v)| (e.tag.as_str(), v.parent.tag.as_str(), v.index, v.depth))
            .collect();
        assert_eq!(
            visits,
            vec![("a", "root", 0, 1), ("b", "a", 0, 2), ("c", "root", 1, 1)]
        );
    }

    #[test]
    fn test_visit_slots_mut_order_matches_walk() {
        let mut root = sample();
        let mut seen = Vec::new();
        visit_slots_mut(&mut root, |slot, pos| {
            seen.push((slot.text_content(), pos.index, pos.depth));
            Flow::Continue
        });
        assert_eq!(
            seen,
            vec![
                ("t".to_string(), 0, 1),
                (String::new(), 0, 2),
                ("t".to_string(), 1, 2),
                (String::new(), 1, 1),
            ]
        );
    }

    #[test]
    fn test_visit_slots_mut_skip_does_not_descend() {
        let mut root = sample();
        let mut tags = Vec::new();
        visit_slots_mut(&mut root, |slot, _| {
            if let Some(elem) = slot.as_element() {
                tags.push(elem.tag.clone());
                if elem.is("a") {
                    return Flow::Skip;
                }
            }
            Flow::Continue
        });
        assert_eq!(tags, vec!["a", "c"]);
    }

    #[test]
    fn test_visit_slots_mut_replacement_keeps_siblings() {
        let mut root = sample();
        visit_slots_mut(&mut root, |slot, _| {
            if slot.is_element("a") {
                *slot = Node::from(Element::bare("x"));
                return Flow::Skip;
            }
            Flow::Continue
        });
        let tags: Vec<_> = root.child_elements().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["x", "c"]);
    }
}
