use serde::{Deserialize, Serialize};

use super::window::{WindowId, WindowInstance};
use crate::common::collections::HashMap;

/// Every open window across all workspaces, keyed by id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowRegistry<P = serde_json::Value> {
    windows: HashMap<WindowId, WindowInstance<P>>,
}

impl<P> Default for WindowRegistry<P> {
    fn default() -> Self {
        Self {
            windows: HashMap::default(),
        }
    }
}

impl<P> WindowRegistry<P> {
    pub fn new() -> Self { Self::default() }

    pub fn get(&self, id: &WindowId) -> Option<&WindowInstance<P>> { self.windows.get(id) }

    pub fn contains(&self, id: &WindowId) -> bool { self.windows.contains_key(id) }

    pub fn len(&self) -> usize { self.windows.len() }

    pub fn is_empty(&self) -> bool { self.windows.is_empty() }

    pub fn ids(&self) -> impl Iterator<Item = &WindowId> + '_ { self.windows.keys() }

    /// An id that no window in the registry currently uses.
    pub fn fresh_id(&self) -> WindowId {
        loop {
            let id = WindowId::random();
            if !self.contains(&id) {
                return id;
            }
        }
    }

    pub fn insert(&mut self, window: WindowInstance<P>) -> Option<WindowInstance<P>> {
        self.windows.insert(window.id.clone(), window)
    }

    pub fn remove(&mut self, id: &WindowId) -> Option<WindowInstance<P>> { self.windows.remove(id) }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::WindowSpec;

    fn window(id: &str) -> WindowInstance {
        WindowInstance::from_spec(WindowId::new(id), WindowSpec::new("note", json!({})))
    }

    #[test]
    fn insert_and_remove() {
        let mut registry = WindowRegistry::new();
        assert!(registry.is_empty());

        assert!(registry.insert(window("a")).is_none());
        assert!(registry.insert(window("b")).is_none());
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&WindowId::new("a")));

        let removed = registry.remove(&WindowId::new("a")).unwrap();
        assert_eq!(removed.id, WindowId::new("a"));
        assert!(registry.remove(&WindowId::new("a")).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn fresh_id_avoids_existing_keys() {
        let mut registry = WindowRegistry::new();
        for _ in 0..32 {
            let id = registry.fresh_id();
            assert!(!registry.contains(&id));
            registry.insert(WindowInstance::from_spec(id, WindowSpec::new("note", json!(null))));
        }
        assert_eq!(registry.len(), 32);
    }

    #[test]
    fn serializes_as_plain_map() {
        let mut registry = WindowRegistry::new();
        registry.insert(window("a"));
        assert_eq!(
            serde_json::to_value(&registry).unwrap(),
            json!({ "a": { "id": "a", "appId": "note", "props": {} } })
        );
    }
}
