//! Category operations
//!
//! Names are unique within a scope (the global set or one event's set),
//! compared case-insensitively.

use super::{require_name, DataStore};
use crate::error::{Error, Result};
use crate::model::Category;
use crate::ordering;
use tracing::info;
use uuid::Uuid;

impl DataStore {
    pub fn create_category(&mut self, mut category: Category) -> Result<Category> {
        category.name = require_name(&category.name, "category")?;
        self.require_scope_event(category.event_id)?;
        if category.id.is_nil() {
            category.id = Uuid::new_v4();
        } else if self.category(category.id).is_some() {
            return Err(Error::InvalidInput(format!("category {} already exists", category.id)));
        }
        self.require_unique_category_name(&category.name, category.event_id, None)?;

        let scope = category.event_id;
        category.order = ordering::next_order(&self.categories, |c| c.event_id == scope);
        self.categories.push(category.clone());

        info!(category = %category.id, name = %category.name, global = category.is_global(), "Created category");
        self.commit();
        Ok(category)
    }

    /// Rename, recolor or move a category to another scope
    ///
    /// Tags stay attached across renames. Moving appends to the end of the
    /// destination scope.
    pub fn update_category(&mut self, category: Category) -> Result<Category> {
        let index = self.category_index(category.id)?;
        let name = require_name(&category.name, "category")?;
        self.require_scope_event(category.event_id)?;
        self.require_unique_category_name(&name, category.event_id, Some(category.id))?;

        let old_scope = self.categories[index].event_id;
        let new_scope = category.event_id;
        let moved = old_scope != new_scope;
        let order = if moved {
            ordering::next_order(&self.categories, |c| c.event_id == new_scope)
        } else {
            self.categories[index].order
        };

        let stored = &mut self.categories[index];
        stored.name = name;
        stored.color = category.color;
        stored.icon = category.icon;
        stored.event_id = new_scope;
        stored.order = order;
        let updated = stored.clone();

        if moved {
            ordering::compact(&mut self.categories, |c| c.event_id == old_scope);
        }

        self.commit();
        Ok(updated)
    }

    /// Delete a category and strip its tag from every button and from the
    /// default song template
    pub fn delete_category(&mut self, id: Uuid) -> Result<()> {
        let index = self.category_index(id)?;
        let scope = self.categories[index].event_id;

        self.categories.remove(index);
        let mut untagged = 0usize;
        for button in &mut self.buttons {
            if button.category_ids.remove(&id) {
                untagged += 1;
            }
        }
        self.defaults.category_ids.remove(&id);
        ordering::compact(&mut self.categories, |c| c.event_id == scope);

        info!(category = %id, untagged, "Deleted category");
        self.commit();
        Ok(())
    }

    fn require_unique_category_name(
        &self,
        name: &str,
        scope: Option<Uuid>,
        except: Option<Uuid>,
    ) -> Result<()> {
        let taken = self.categories.iter().any(|c| {
            c.event_id == scope && Some(c.id) != except && c.name.eq_ignore_ascii_case(name)
        });
        if taken {
            return Err(Error::DuplicateName(name.to_string()));
        }
        Ok(())
    }
}
