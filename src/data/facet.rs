//! Facet tree types and structures.

use crate::error::{PortalError, Result};
use indexmap::IndexMap;

/// Separator between identifiers in a facet path.
pub const PATH_SEPARATOR: char = '/';

/// A node in a category tree.
///
/// Children are owned and kept in insertion order. The parent is referenced
/// by its path only, so a facet never owns anything above it.
#[derive(Debug, Clone)]
pub struct Facet<T> {
    identifier: String,
    name: String,
    path: String,
    parent: Option<String>,
    children: IndexMap<String, Facet<T>>,
    data: Vec<T>,
}

impl<T> Facet<T> {
    /// Create a facet below `parent` (or a root when `parent` is `None`).
    pub fn make(
        parent: Option<&Facet<T>>,
        identifier: impl Into<String>,
        name: impl Into<String>,
        data: Vec<T>,
    ) -> Result<Self> {
        let identifier = identifier.into();
        let name = name.into();

        if identifier.trim().is_empty() || identifier.contains(PATH_SEPARATOR) {
            return Err(PortalError::invalid_identifier(identifier));
        }
        if name.trim().is_empty() {
            return Err(PortalError::invalid_name(identifier, name));
        }

        let (path, parent) = match parent {
            Some(p) => (
                format!("{}{}{}", p.path, PATH_SEPARATOR, identifier),
                Some(p.path.clone()),
            ),
            None => (identifier.clone(), None),
        };

        Ok(Self {
            identifier,
            name,
            path,
            parent,
            children: IndexMap::new(),
            data,
        })
    }

    /// Identifier, unique among siblings.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full path from the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path of the parent, `None` at a root.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Insert a child, replacing any child with the same identifier.
    pub fn add_child(&mut self, child: Facet<T>) {
        self.children.insert(child.identifier.clone(), child);
    }

    /// Children in insertion order.
    pub fn children(&self) -> Vec<&Facet<T>> {
        self.children.values().collect()
    }

    /// Look up a direct child.
    pub fn child(&self, identifier: &str) -> Option<&Facet<T>> {
        self.children.get(identifier)
    }

    /// Look up a direct child mutably.
    pub fn child_mut(&mut self, identifier: &str) -> Option<&mut Facet<T>> {
        self.children.get_mut(identifier)
    }

    /// Data attached directly to this facet.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Attach a data element to this facet.
    pub fn push_data(&mut self, item: T) {
        self.data.push(item);
    }

    /// Whether the facet has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of data elements in the whole subtree.
    pub fn count(&self) -> usize {
        let mut total = 0;
        let mut stack = vec![self];
        while let Some(facet) = stack.pop() {
            total += facet.data.len();
            stack.extend(facet.children.values());
        }
        total
    }

    /// Collect the data of the whole subtree in pre-order.
    pub fn flat_data(&self) -> Vec<&T> {
        let mut flat = Vec::new();
        let mut stack = vec![self];

        while let Some(facet) = stack.pop() {
            flat.extend(facet.data.iter());
            // Reverse so the first child is visited next.
            stack.extend(facet.children.values().rev());
        }

        flat
    }
}

/// A forest of facet trees, one per root category.
#[derive(Debug, Clone)]
pub struct FacetModel<T> {
    roots: IndexMap<String, Facet<T>>,
}

impl<T> FacetModel<T> {
    /// Create a model from a precomputed root mapping.
    pub fn new(roots: IndexMap<String, Facet<T>>) -> Self {
        Self { roots }
    }

    /// Look up a root.
    pub fn root(&self, identifier: &str) -> Option<&Facet<T>> {
        self.roots.get(identifier)
    }

    /// Roots in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = &Facet<T>> {
        self.roots.values()
    }

    /// Whether the model has no roots.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Concatenation of every root's flattened data.
    pub fn flat_data(&self) -> Vec<&T> {
        self.roots.values().flat_map(Facet::flat_data).collect()
    }

    /// Resolve a facet by its full path.
    pub fn find(&self, path: &str) -> Option<&Facet<T>> {
        let mut parts = path.split(PATH_SEPARATOR);
        let mut facet = self.roots.get(parts.next()?)?;
        for part in parts {
            facet = facet.child(part)?;
        }
        Some(facet)
    }

    /// Facets from the root down to `path`, inclusive.
    pub fn breadcrumb(&self, path: &str) -> Vec<&Facet<T>> {
        let mut trail = Vec::new();
        let mut current = self.find(path);
        while let Some(facet) = current {
            trail.push(facet);
            current = facet.parent().and_then(|p| self.find(p));
        }
        trail.reverse();
        trail
    }
}

impl<T> Default for FacetModel<T> {
    fn default() -> Self {
        Self::new(IndexMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn gnss_tree() -> Facet<u32> {
        let mut root = Facet::make(None, "gnss", "GNSS Data and Products", vec![]).unwrap();
        let stations =
            Facet::make(Some(&root), "stations", "Station Information", (1..=10).collect())
                .unwrap();
        let orbits = Facet::make(Some(&root), "orbits", "Orbits", vec![]).unwrap();
        root.add_child(stations);
        root.add_child(orbits);
        root
    }

    #[test]
    fn flat_data_of_two_level_tree() {
        let root = gnss_tree();
        let flat: Vec<u32> = root.flat_data().into_iter().copied().collect();

        assert_eq!(flat, (1..=10).collect::<Vec<_>>());
        assert_eq!(root.children().len(), 2);
    }

    #[test]
    fn flat_data_is_pre_order() {
        let mut root = Facet::make(None, "r", "Root", vec![0]).unwrap();
        let mut a = Facet::make(Some(&root), "a", "A", vec![1]).unwrap();
        let a1 = Facet::make(Some(&a), "a1", "A1", vec![2]).unwrap();
        let a2 = Facet::make(Some(&a), "a2", "A2", vec![3]).unwrap();
        a.add_child(a1);
        a.add_child(a2);
        let b = Facet::make(Some(&root), "b", "B", vec![4, 5]).unwrap();
        root.add_child(a);
        root.add_child(b);

        let flat: Vec<u32> = root.flat_data().into_iter().copied().collect();
        assert_eq!(flat, vec![0, 1, 2, 3, 4, 5]);
        // Restartable.
        assert_eq!(root.flat_data().len(), 6);
        assert_eq!(root.count(), 6);
    }

    #[test]
    fn add_child_overwrites_in_place() {
        let mut root = gnss_tree();
        let replacement = Facet::make(Some(&root), "stations", "Stations", vec![99]).unwrap();
        root.add_child(replacement);

        let names: Vec<&str> = root.children().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["Stations", "Orbits"]);
        assert_eq!(root.count(), 1);
    }

    #[test]
    fn make_validates_identifier_and_name() {
        assert!(matches!(
            Facet::<u32>::make(None, "", "Name", vec![]),
            Err(PortalError::InvalidIdentifier { .. })
        ));
        assert!(matches!(
            Facet::<u32>::make(None, "a/b", "Name", vec![]),
            Err(PortalError::InvalidIdentifier { .. })
        ));
        assert!(matches!(
            Facet::<u32>::make(None, "id", " ", vec![]),
            Err(PortalError::InvalidName { .. })
        ));
    }

    #[test]
    fn model_flat_data_concatenates_roots() {
        let gnss = gnss_tree();
        let seismo = Facet::make(None, "seismology", "Seismology", vec![100, 101]).unwrap();
        let expected: Vec<u32> = gnss
            .flat_data()
            .into_iter()
            .chain(seismo.flat_data())
            .copied()
            .collect();

        let mut roots = IndexMap::new();
        roots.insert("gnss".to_string(), gnss);
        roots.insert("seismology".to_string(), seismo);
        let model = FacetModel::new(roots);

        let flat: Vec<u32> = model.flat_data().into_iter().copied().collect();
        assert_eq!(flat, expected);
        assert!(model.root("volcanology").is_none());
    }

    #[test]
    fn breadcrumb_walks_up_through_parents() {
        let mut roots = IndexMap::new();
        roots.insert("gnss".to_string(), gnss_tree());
        let model = FacetModel::new(roots);

        let stations = model.find("gnss/stations").unwrap();
        assert_eq!(stations.parent(), Some("gnss"));

        let trail: Vec<&str> = model
            .breadcrumb("gnss/stations")
            .iter()
            .map(|f| f.name())
            .collect();
        assert_eq!(trail, vec!["GNSS Data and Products", "Station Information"]);
        assert!(model.breadcrumb("gnss/missing").is_empty());
    }
}
