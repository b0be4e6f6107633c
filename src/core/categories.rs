// File: src/core/categories.rs
//
// Lightweight category collaborator: a fixed default set that can never be
// deleted, plus user-created categories persisted in their own collection.
// Consumed by Word filtering only.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::persistence::{DocumentStore, StoreError};

pub const CATEGORIES_COLLECTION: &str = "categories";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color_tag: String,
}

pub fn default_categories() -> Vec<Category> {
    let cat = |id: &str, name: &str, color: &str| Category {
        id: id.to_string(),
        name: name.to_string(),
        color_tag: color.to_string(),
    };
    vec![
        cat("general", "General", "blue"),
        cat("food", "Food", "orange"),
        cat("travel", "Travel", "green"),
        cat("family", "Family", "purple"),
        cat("work", "Work", "red"),
    ]
}

pub struct CategoryService {
    categories: Vec<Category>,
}

impl CategoryService {
    /// Defaults first, then the user's persisted categories (duplicate ids
    /// skipped). A store failure just leaves the defaults.
    pub fn load(store: Option<&DocumentStore>) -> Self {
        let mut categories = default_categories();
        if let Some(store) = store {
            if let Ok(docs) = store.get_all(CATEGORIES_COLLECTION) {
                for doc in docs {
                    if let Ok(cat) = serde_json::from_value::<Category>(doc) {
                        if !categories.iter().any(|c| c.id == cat.id) {
                            categories.push(cat);
                        }
                    }
                }
            }
        }
        Self { categories }
    }

    pub fn all(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    fn is_default(id: &str) -> bool {
        default_categories().iter().any(|c| c.id == id)
    }

    pub fn add(
        &mut self,
        store: &mut DocumentStore,
        name: &str,
        color_tag: &str,
    ) -> Result<Category, StoreError> {
        let mut category = Category {
            id: format!("user-{}", Uuid::new_v4()),
            name: name.to_string(),
            color_tag: color_tag.to_string(),
        };
        // Regenerate on an id collision so memory is only updated once the
        // store actually holds the document.
        while !store.add(CATEGORIES_COLLECTION, serde_json::to_value(&category)?)? {
            category.id = format!("user-{}", Uuid::new_v4());
        }
        self.categories.push(category.clone());
        Ok(category)
    }

    /// `Ok(false)` for default categories (never deletable) and unknown ids.
    pub fn delete(&mut self, store: &mut DocumentStore, id: &str) -> Result<bool, StoreError> {
        if Self::is_default(id) {
            return Ok(false);
        }
        let removed = store.delete(CATEGORIES_COLLECTION, id)?;
        if removed {
            self.categories.retain(|c| c.id != id);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_present_without_a_store() {
        let service = CategoryService::load(None);
        assert_eq!(service.all().len(), 5);
        assert!(service.get("general").is_some());
    }

    #[test]
    fn default_categories_cannot_be_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DocumentStore::open(dir.path()).unwrap();
        let mut service = CategoryService::load(Some(&store));
        assert!(!service.delete(&mut store, "general").unwrap());
        assert!(service.get("general").is_some());
    }

    #[test]
    fn add_commits_to_store_before_memory() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DocumentStore::open(dir.path()).unwrap();
        let mut service = CategoryService::load(Some(&store));
        let added = service.add(&mut store, "Sports", "teal").unwrap();

        // The service's view and the persisted document agree.
        let doc = store.get_by_id(CATEGORIES_COLLECTION, &added.id).unwrap();
        assert!(doc.is_some());
        assert_eq!(service.get(&added.id), Some(&added));
    }

    #[test]
    fn user_categories_persist_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DocumentStore::open(dir.path()).unwrap();
        let id = {
            let mut service = CategoryService::load(Some(&store));
            service.add(&mut store, "Sports", "teal").unwrap().id
        };

        let mut service = CategoryService::load(Some(&store));
        assert_eq!(service.get(&id).map(|c| c.name.as_str()), Some("Sports"));
        assert!(service.delete(&mut store, &id).unwrap());
        assert!(service.get(&id).is_none());
    }
}
