use crate::simulation::id::id_store::IdStore;
use crate::simulation::id::id_store::UntypedId;
use crate::simulation::id::serializable_type::StableTypeId;
use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

// keep this private, as we don't want to leak how we cache ids.
mod id_store;
pub mod serializable_type;

/// This type represents a reference counted pointer to a matsim id. It can be used in hash maps/sets
/// in combination with NoHashHasher, to achieve fast look ups with no randomness involved.
///
/// As this type wraps Arc<UntypedId>, using clone produces a new Arc pointer to the actual Id and is
/// the intended way of passing around ids. Ids are Send + Sync, so that computed capacities which
/// reference them can be shared between threads.
#[derive(Debug)]
pub struct Id<T: StableTypeId> {
    _type_marker: PhantomData<fn() -> T>,
    id: Arc<UntypedId>,
}

impl<T: StableTypeId + 'static> Id<T> {
    fn new(untyped_id: Arc<UntypedId>) -> Self {
        Self {
            _type_marker: PhantomData,
            id: untyped_id,
        }
    }

    /// Creates an id which is not attached to any id storage. This method is intended for test
    /// cases. The intended way of creating ids is to use Id::create(external);
    #[cfg(test)]
    pub(crate) fn new_internal(internal: u64) -> Self {
        let untyped_id = UntypedId::new(internal, String::from(""));
        Self::new(Arc::new(untyped_id))
    }

    pub fn internal(&self) -> u64 {
        self.id.internal
    }

    pub fn external(&self) -> &str {
        &self.id.external
    }

    pub fn create(id: &str) -> Self {
        ID_STORE.create_id(id)
    }

    pub fn get(internal: u64) -> Self {
        ID_STORE.get(internal)
    }

    pub fn get_from_ext(external: &str) -> Self {
        ID_STORE.get_from_ext(external)
    }

    pub fn try_get_from_ext(external: &str) -> Option<Self> {
        ID_STORE.try_get_from_ext(external)
    }
}

/// Mark Id as enabled for the nohash_hasher::NoHashHasher t
impl<T: StableTypeId> nohash_hasher::IsEnabled for Id<T> {}
impl<T: StableTypeId> nohash_hasher::IsEnabled for &Id<T> {}

/// Implement PartialEq, Eq, PartialOrd, Ord, so that Ids can be used in HashMaps and Ordered collections
/// all four methods rely on the internal id.
impl<T: StableTypeId + 'static> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.internal().eq(&other.internal())
    }
}

impl<T: StableTypeId + 'static> Eq for Id<T> {}

impl<T: StableTypeId + 'static> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // use write u64 directly, so that we can use NoHashHasher with ids
        state.write_u64(self.internal());
    }
}

impl<T: StableTypeId + 'static> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.internal().cmp(&other.internal())
    }
}

impl<T: StableTypeId + 'static> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: StableTypeId + 'static> Display for Id<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.external())
    }
}

/// Output files reference external ids only.
impl<T: StableTypeId + 'static> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.external())
    }
}

/// This creates a new struct with a cloned Arc pointer
impl<T: StableTypeId> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self {
            _type_marker: PhantomData,
            id: self.id.clone(),
        }
    }
}

/// One store per process. Ids created on any thread resolve to the same internal ids.
static ID_STORE: Lazy<IdStore> = Lazy::new(IdStore::new);
