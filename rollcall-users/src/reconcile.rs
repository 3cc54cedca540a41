//! List surgery shared by the cache updates and the local state.
//!
//! Entries are matched by id. Order is always preserved.

use crate::{queries::get_users::GetUsersUsers, User};

pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for User {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for GetUsersUsers {
    fn key(&self) -> &str {
        &self.id
    }
}

pub trait Reconcile<T: Keyed> {
    /// Replace the entry with the same id in place, or append if there is none.
    fn upsert(&mut self, item: T);
    /// Replace the entry with the same id. Returns `false` and leaves the list alone if there
    /// is none.
    fn replace(&mut self, item: T) -> bool;
    /// Drop the entry with `id`. Returns `false` if there was none.
    fn remove_key(&mut self, id: &str) -> bool;
}

impl<T: Keyed> Reconcile<T> for Vec<T> {
    fn upsert(&mut self, item: T) {
        if let Some(existing) = self.iter_mut().find(|existing| existing.key() == item.key()) {
            *existing = item;
        } else {
            self.push(item);
        }
    }

    fn replace(&mut self, item: T) -> bool {
        match self.iter_mut().find(|existing| existing.key() == item.key()) {
            Some(existing) => {
                *existing = item;
                true
            }
            None => false
        }
    }

    fn remove_key(&mut self, id: &str) -> bool {
        let len = self.len();
        self.retain(|existing| existing.key() != id);
        self.len() != len
    }
}
