use std::sync::Arc;

use dashmap::DashMap;

use crate::simulation::id::serializable_type::StableTypeId;
use crate::simulation::id::Id;

#[derive(Debug)]
pub struct UntypedId {
    pub(crate) internal: u64,
    pub(crate) external: String,
}

impl UntypedId {
    pub(crate) fn new(internal: u64, external: String) -> Self {
        Self { internal, external }
    }
}

/// Cache for ids, one vec of ids and one external -> internal mapping per type. Internal ids
/// are handed out consecutively per type, starting at 0. All methods take &self, so that one store
/// can be shared by all threads of a process.
#[derive(Debug, Default)]
pub struct IdStore {
    ids: DashMap<u64, Vec<Arc<UntypedId>>>,
    mapping: DashMap<u64, DashMap<String, u64>>,
}

impl IdStore {
    pub fn new() -> Self {
        Self {
            ids: DashMap::default(),
            mapping: DashMap::default(),
        }
    }

    fn create_id_with_type_id(&self, id: &str, type_id: u64) -> Arc<UntypedId> {
        // Hold the entry of the ids first and the mapping second, so that two threads creating the
        // same external id end up with the same internal one. Lookups never hold both.
        let mut type_ids = self.ids.entry(type_id).or_default();
        let type_mapping = self.mapping.entry(type_id).or_default();

        if let Some(internal) = type_mapping.get(id) {
            return type_ids[*internal as usize].clone();
        }

        let next_internal = type_ids.len() as u64;
        let next_id = Arc::new(UntypedId::new(next_internal, String::from(id)));
        type_ids.push(next_id.clone());
        type_mapping.insert(String::from(id), next_internal);

        next_id
    }

    pub(crate) fn create_id<T: StableTypeId + 'static>(&self, id: &str) -> Id<T> {
        let type_id = T::stable_type_id();
        Id::new(self.create_id_with_type_id(id, type_id))
    }

    pub(crate) fn get<T: StableTypeId + 'static>(&self, internal: u64) -> Id<T> {
        let type_id = T::stable_type_id();
        let type_ids = self.ids.get(&type_id).unwrap_or_else(|| {
            panic!("No ids for type {type_id:?}. Use Id::create::<T>(...) to create ids")
        });

        let untyped_id = type_ids
            .get(internal as usize)
            .unwrap_or_else(|| panic!("No id found for internal {internal}"))
            .clone();
        Id::new(untyped_id)
    }

    pub(crate) fn get_from_ext<T: StableTypeId + 'static>(&self, external: &str) -> Id<T> {
        self.try_get_from_ext(external)
            .unwrap_or_else(|| panic!("Could not find id for external id: {external}"))
    }

    pub(crate) fn try_get_from_ext<T: StableTypeId + 'static>(
        &self,
        external: &str,
    ) -> Option<Id<T>> {
        let type_id = T::stable_type_id();
        // copy the index out, so that the mapping guard is released before the ids are read
        let internal = *self.mapping.get(&type_id)?.get(external)?;
        Some(self.get(internal))
    }
}
