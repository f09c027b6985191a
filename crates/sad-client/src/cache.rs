//! Identity cache.
//!
//! Maps each decoded entity id to the single live object mirroring it.
//! Projects and profiles are kept in separate maps: their ids come from
//! separate namespaces on the server, and evicting one kind never touches
//! the other.
//!
//! Lock order: the session state lock may be held while an entity's record
//! lock is taken, never the other way round.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use sad_core::{EntityId, ProfilePermissions, ProjectPermissions};

use crate::entity::EntityRecord;
use crate::profile::ProfileInner;
use crate::project::ProjectInner;
use crate::session::SessionInner;

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub(crate) struct IdentityCache {
    projects: HashMap<EntityId, Arc<ProjectInner>>,
    profiles: HashMap<EntityId, Arc<ProfileInner>>,
}

impl IdentityCache {
    /// Refresh the cached project in place, or cache a new one.
    pub(crate) fn upsert_project(
        &mut self,
        session: &Weak<SessionInner>,
        record: EntityRecord<ProjectPermissions>,
    ) -> Arc<ProjectInner> {
        match self.projects.entry(record.id) {
            Entry::Occupied(entry) => {
                let inner = Arc::clone(entry.get());
                *lock(&inner.record) = record;
                inner
            }
            Entry::Vacant(entry) => Arc::clone(
                entry.insert(Arc::new(ProjectInner::new(session.clone(), record))),
            ),
        }
    }

    /// Refresh the cached profile in place, or cache a new one under `project`.
    pub(crate) fn upsert_profile(
        &mut self,
        session: &Weak<SessionInner>,
        project: &Arc<ProjectInner>,
        record: EntityRecord<ProfilePermissions>,
    ) -> Arc<ProfileInner> {
        match self.profiles.entry(record.id) {
            Entry::Occupied(entry) => {
                let inner = Arc::clone(entry.get());
                *lock(&inner.project) = Arc::downgrade(project);
                *lock(&inner.record) = record;
                inner
            }
            Entry::Vacant(entry) => Arc::clone(entry.insert(Arc::new(ProfileInner::new(
                session.clone(),
                Arc::downgrade(project),
                record,
            )))),
        }
    }

    pub(crate) fn evict_project(&mut self, id: EntityId) -> bool {
        self.projects.remove(&id).is_some()
    }

    pub(crate) fn evict_profile(&mut self, id: EntityId) -> bool {
        self.profiles.remove(&id).is_some()
    }

    /// Evict every cached profile of `project` currently named `name`.
    pub(crate) fn evict_profiles_named(&mut self, project: &Arc<ProjectInner>, name: &str) -> usize {
        let before = self.profiles.len();
        self.profiles.retain(|_, profile| {
            let same_parent = lock(&profile.project).as_ptr() == Arc::as_ptr(project);
            !(same_parent && lock(&profile.record).name == name)
        });
        before - self.profiles.len()
    }

    pub(crate) fn clear(&mut self) {
        self.projects.clear();
        self.profiles.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.projects.len() + self.profiles.len()
    }

    pub(crate) fn projects(&self) -> impl Iterator<Item = &Arc<ProjectInner>> {
        self.projects.values()
    }

    pub(crate) fn profiles(&self) -> impl Iterator<Item = &Arc<ProfileInner>> {
        self.profiles.values()
    }
}
