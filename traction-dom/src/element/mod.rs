mod content;
mod node;

pub use content::Content;
pub use node::{Element, WeakElement};

/// Find an element by ID in the tree rooted at `root` (inclusive).
pub fn find_element(root: &Element, id: &str) -> Option<Element> {
    if root.id() == id {
        return Some(root.clone());
    }

    for child in root.children() {
        if let Some(found) = find_element(&child, id) {
            return Some(found);
        }
    }

    None
}
