#![forbid(unsafe_code)]

//! Reorderable items and collection identity.

/// An entity the coordinator can reorder.
///
/// The coordinator reads `id` and `position` and never touches the payload.
pub trait ReorderItem {
    /// Stable identifier, sent to persistence in slot order.
    fn id(&self) -> &str;

    /// Sort key for the initial order. Lower comes first.
    fn position(&self) -> i64;
}

/// Items whose position can be rewritten by a backend after a persist.
pub trait RepositionItem: ReorderItem {
    fn set_position(&mut self, position: i64);
}

/// Minimal item with a display title.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleItem {
    pub id: String,
    pub position: i64,
    pub title: String,
}

impl SimpleItem {
    #[must_use]
    pub fn new(id: impl Into<String>, position: i64, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position,
            title: title.into(),
        }
    }

    /// Items titled by their ids, positioned in sequence.
    #[must_use]
    pub fn sequence<I, S>(ids: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ids.into_iter()
            .enumerate()
            .map(|(position, id)| {
                let id = id.into();
                Self::new(id.clone(), position as i64, id)
            })
            .collect()
    }
}

impl ReorderItem for SimpleItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn position(&self) -> i64 {
        self.position
    }
}

impl RepositionItem for SimpleItem {
    fn set_position(&mut self, position: i64) {
        self.position = position;
    }
}

/// Stable sort by `position`; ties keep their incoming order.
pub fn sort_by_position<T: ReorderItem>(items: &mut [T]) {
    items.sort_by_key(|item| item.position());
}

/// Whether two position-sorted collections hold the same ids in the same
/// sequence.
#[must_use]
pub fn same_identity<A: ReorderItem, B: ReorderItem>(a: &[A], b: &[B]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.id() == y.id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_is_stable_on_ties() {
        let mut items = vec![
            SimpleItem::new("b", 1, "B"),
            SimpleItem::new("a", 0, "A"),
            SimpleItem::new("c", 1, "C"),
        ];
        sort_by_position(&mut items);
        let ids: Vec<&str> = items.iter().map(ReorderItem::id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn identity_ignores_payload() {
        let a = SimpleItem::sequence(["x", "y"]);
        let mut b = a.clone();
        b[0].title = "renamed".into();
        assert!(same_identity(&a, &b));
        b.swap(0, 1);
        assert!(!same_identity(&a, &b));
        assert!(!same_identity(&a, &a[..1]));
    }
}
