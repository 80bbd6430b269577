//! Human-readable views of a live stack. Diagnostic only; nothing here is
//! load-bearing.

use crate::{ActionId, Behavior, WorldMut};

impl<W> Behavior<W>
where
    W: WorldMut + 'static,
{
    /// The current stack shape in nested/buried notation, e.g.
    /// `Patrol( Investigate )<<Guard` for an active `Patrol` whose child is
    /// `Investigate`, stacked on a suspended `Guard`.
    pub fn debug_string(&self) -> String {
        let mut out = String::new();
        if let Some(top) = self.top {
            self.decorate(top, &mut out);
        }
        out
    }

    /// Slash-delimited lineage from the root container down to `id`.
    pub fn full_name_of(&self, id: ActionId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(c) = current {
            names.push(self.name_of(c).unwrap_or("?"));
            current = self.parent_of(c);
        }
        names.reverse();
        names.join("/")
    }

    /// Lineage of the innermost active action.
    pub fn active_path(&self) -> String {
        match self.active_leaf() {
            Some(leaf) => self.full_name_of(leaf),
            None => String::new(),
        }
    }

    fn decorate(&self, id: ActionId, out: &mut String) {
        out.push_str(self.name_of(id).unwrap_or("?"));
        if let Some(child) = self.active_child_of(id) {
            out.push_str("( ");
            self.decorate(child, out);
            out.push_str(" )");
        }
        if let Some(below) = self.buried_under(id) {
            out.push_str("<<");
            self.decorate(below, out);
        }
    }
}
