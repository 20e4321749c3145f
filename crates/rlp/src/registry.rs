//! Process-wide cache of per-type encoding metadata.
//!
//! Every type taking part in struct encoding gets one [`TypeInfo`] per
//! `(type, tag)` pair. Struct entries carry the [`FieldPlan`] produced by
//! validating the struct's field annotations; an invalid struct keeps its
//! error so every later use reports the same failure.
//!
//! Lookups are lock-free reads of an immutable snapshot. Misses take a writer
//! lock, build the missing entries into a copy of the map, and publish the copy.

use crate::{
    plan::{generate_plan, FieldPlan, RlpStruct},
    raw::RawValue,
    EncodeBuffer, Error, ErrorKind, FieldTag, Result, RlpDecodable, RlpEncodable, Shape, Stream,
    Value,
};
use arc_swap::ArcSwap;
use arrayvec::ArrayVec;
use bytes::{Bytes, BytesMut};
use core::{
    any::{Any, TypeId},
    fmt,
    marker::{PhantomData, PhantomPinned},
};
use num_bigint::{BigInt, BigUint};
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    rc::Rc,
    sync::Arc,
};
use tracing::{debug, trace};

static GLOBAL: Lazy<TypeRegistry> = Lazy::new(TypeRegistry::new);

type InfoMap = HashMap<TypeKey, Arc<TypeInfo>>;
type EncodeFn = fn(&dyn Any, &FieldTag, &mut EncodeBuffer) -> Result<()>;
type DecodeFn = fn(&mut Stream<'_>, &FieldTag) -> Result<Box<dyn Any>>;

/// A type that can be registered in a [`TypeRegistry`].
///
/// Implemented for every built-in encodable type. `#[derive(Rlp)]` implements
/// it for structs.
pub trait RlpType: RlpEncodable + RlpDecodable + 'static {
    /// Builds the metadata of this type, generating the types it depends on
    /// through `generator`.
    ///
    /// Returns the field plan for struct types and `None` for everything else.
    fn rlp_generate(
        generator: &mut Generator<'_>,
        tag: &FieldTag,
    ) -> Result<Option<Arc<FieldPlan>>> {
        let _ = (generator, tag);
        Ok(None)
    }
}

/// Cache key: a type together with the annotation it is used under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeKey {
    /// The Rust type.
    pub type_id: TypeId,
    /// The annotation of the field the type appears in.
    pub tag: FieldTag,
}

impl TypeKey {
    /// Returns the key of `T` under `tag`.
    pub fn of<T: 'static>(tag: FieldTag) -> Self {
        Self { type_id: TypeId::of::<T>(), tag }
    }
}

/// Cached encoding metadata of one type.
pub struct TypeInfo {
    key: TypeKey,
    type_name: &'static str,
    shape: Shape,
    encode: EncodeFn,
    decode: DecodeFn,
    body: OnceCell<Result<Option<Arc<FieldPlan>>>>,
}

impl TypeInfo {
    fn placeholder<T: RlpType>(key: TypeKey) -> Self {
        Self {
            key,
            type_name: core::any::type_name::<T>(),
            shape: T::rlp_shape(),
            encode: encode_erased::<T>,
            decode: decode_erased::<T>,
            body: OnceCell::new(),
        }
    }

    /// Returns the cache key of this entry.
    pub const fn key(&self) -> &TypeKey {
        &self.key
    }

    /// Returns the Rust name of the type.
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the structural shape of the type.
    pub const fn shape(&self) -> Shape {
        self.shape
    }

    /// Returns the field plan of a struct type.
    pub fn plan(&self) -> Option<&Arc<FieldPlan>> {
        match self.body.get() {
            Some(Ok(Some(plan))) => Some(plan),
            _ => None,
        }
    }

    /// Returns the error found while building this entry, if any.
    pub fn error(&self) -> Option<Error> {
        match self.body.get() {
            Some(Err(err)) => Some(*err),
            _ => None,
        }
    }

    /// Encodes `value`, which must be of this entry's type.
    pub fn encode(&self, value: &dyn Any, out: &mut EncodeBuffer) -> Result<()> {
        if let Some(err) = self.error() {
            return Err(err);
        }
        (self.encode)(value, &self.key.tag, out)
    }

    /// Decodes a value of this entry's type.
    pub fn decode(&self, s: &mut Stream<'_>) -> Result<Box<dyn Any>> {
        if let Some(err) = self.error() {
            return Err(err);
        }
        (self.decode)(s, &self.key.tag)
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("type_name", &self.type_name)
            .field("tag", &self.key.tag)
            .field("shape", &self.shape)
            .field("body", &self.body.get())
            .finish()
    }
}

fn encode_erased<T: RlpType>(
    value: &dyn Any,
    tag: &FieldTag,
    out: &mut EncodeBuffer,
) -> Result<()> {
    match value.downcast_ref::<T>() {
        Some(value) => value.rlp_encode_tagged(tag, out),
        None => Err(Error::new(ErrorKind::TypeMismatch)),
    }
}

fn decode_erased<T: RlpType>(s: &mut Stream<'_>, tag: &FieldTag) -> Result<Box<dyn Any>> {
    let value = T::rlp_decode_tagged(s, tag)?;
    Ok(Box::new(value))
}

/// A concurrent cache of [`TypeInfo`] entries.
pub struct TypeRegistry {
    snapshot: ArcSwap<InfoMap>,
    lock: Mutex<()>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self { snapshot: ArcSwap::from_pointee(HashMap::new()), lock: Mutex::new(()) }
    }

    /// Returns the process-wide registry used by derived encoders and decoders.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Returns the entry for `T` under `tag`, building it on first use.
    ///
    /// Building never fails here; check [`TypeInfo::error`] for problems found
    /// in the type's definition.
    pub fn info<T: RlpType>(&self, tag: &FieldTag) -> Arc<TypeInfo> {
        let key = TypeKey::of::<T>(*tag);
        if let Some(info) = self.snapshot.load().get(&key) {
            return info.clone();
        }

        let _guard = self.lock.lock();
        let current = self.snapshot.load_full();
        if let Some(info) = current.get(&key) {
            return info.clone();
        }

        let mut next = InfoMap::clone(&current);
        let before = next.len();
        let info = Generator { next: &mut next }.info_while_generating::<T>(tag);
        debug!(
            type_name = info.type_name,
            generated = next.len() - before,
            "published type info"
        );
        self.snapshot.store(Arc::new(next));
        info
    }

    /// Registers `T` for dynamic encoding and decoding.
    ///
    /// # Errors
    ///
    /// Returns the error found in `T`'s definition, such as an invalid field
    /// annotation. The error is cached and returned again on every later use.
    pub fn register<T: RlpType>(&self) -> Result<Arc<TypeInfo>> {
        let info = self.info::<T>(&FieldTag::NONE);
        match info.error() {
            Some(err) => Err(err),
            None => Ok(info),
        }
    }

    /// Returns the unannotated entry for the type with id `type_id`, if built.
    pub fn lookup(&self, type_id: TypeId) -> Option<Arc<TypeInfo>> {
        self.snapshot.load().get(&TypeKey { type_id, tag: FieldTag::NONE }).cloned()
    }

    /// Encodes a value of a registered type.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UnregisteredType`] if the value's type was never
    /// registered, or the type's cached definition error.
    pub fn encode_dyn(&self, value: &dyn Any, out: &mut EncodeBuffer) -> Result<()> {
        let type_id = (*value).type_id();
        let info = self.lookup(type_id).ok_or(Error::new(ErrorKind::UnregisteredType))?;
        info.encode(value, out)
    }

    /// Decodes a value of the registered type with id `type_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UnregisteredType`] if the type was never
    /// registered, or any decoding error.
    pub fn decode_dyn(&self, type_id: TypeId, s: &mut Stream<'_>) -> Result<Box<dyn Any>> {
        let info = self.lookup(type_id).ok_or_else(|| s.error(ErrorKind::UnregisteredType))?;
        info.decode(s)
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.snapshot.load().len()
    }

    /// Returns `true` if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.snapshot.load().is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry").field("len", &self.len()).finish()
    }
}

/// Builds entries for a [`TypeRegistry`] while its writer lock is held.
///
/// Passed to [`RlpType::rlp_generate`]. An entry is inserted before its body is
/// built, so a type that refers to itself resolves to the unfinished entry
/// instead of recursing forever.
pub struct Generator<'r> {
    next: &'r mut InfoMap,
}

impl Generator<'_> {
    /// Returns the entry for `T` under `tag`, building it if needed.
    ///
    /// # Errors
    ///
    /// Returns the error found in `T`'s definition. An entry that is still
    /// being built is returned as is.
    pub fn require<T: RlpType>(&mut self, tag: &FieldTag) -> Result<Arc<TypeInfo>> {
        let info = self.info_while_generating::<T>(tag);
        match info.error() {
            Some(err) => Err(err),
            None => Ok(info),
        }
    }

    /// Validates the fields of struct `T` and builds its plan.
    ///
    /// This is the body of [`RlpType::rlp_generate`] for derived structs.
    pub fn plan_struct<T: RlpStruct>(&mut self) -> Result<Option<Arc<FieldPlan>>> {
        generate_plan::<T>(self).map(Some)
    }

    fn info_while_generating<T: RlpType>(&mut self, tag: &FieldTag) -> Arc<TypeInfo> {
        let key = TypeKey::of::<T>(*tag);
        if let Some(info) = self.next.get(&key) {
            return info.clone();
        }

        let info = Arc::new(TypeInfo::placeholder::<T>(key));
        self.next.insert(key, info.clone());
        trace!(type_name = info.type_name, ?tag, "generating type info");

        let body = T::rlp_generate(self, tag);
        if let Err(err) = &body {
            debug!(type_name = info.type_name, %err, "invalid type definition");
        }
        let fresh = info.body.set(body).is_ok();
        debug_assert!(fresh, "placeholder for {} filled twice", info.type_name);
        info
    }
}

impl fmt::Debug for Generator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator").field("entries", &self.next.len()).finish()
    }
}

/// Returns the field plan of struct `T` from the global registry.
///
/// # Errors
///
/// Returns the cached error if `T`'s field annotations are invalid.
pub fn struct_plan<T: RlpStruct>() -> Result<Arc<FieldPlan>> {
    let info = TypeRegistry::global().info::<T>(&FieldTag::NONE);
    if let Some(err) = info.error() {
        return Err(err);
    }
    info.plan().cloned().ok_or(Error::new(ErrorKind::TypeMismatch))
}

macro_rules! leaf_impl {
    ($($(#[$attr:meta])* [$($params:tt)*] $t:ty),+ $(,)?) => {$(
        $(#[$attr])*
        impl<$($params)*> RlpType for $t {}
    )+};
}

leaf_impl! {
    [] bool,
    [] u8,
    [] u16,
    [] u32,
    [] u64,
    [] usize,
    [] u128,
    [const N: usize] [u8; N],
    [] String,
    [] Bytes,
    [] BytesMut,
    [const N: usize] ArrayVec<u8, N>,
    [T: ?Sized + 'static] PhantomData<T>,
    [] PhantomPinned,
    [] IpAddr,
    [] Ipv4Addr,
    [] Ipv6Addr,
    [] BigUint,
    [] BigInt,
    [] RawValue,
    [] Value,
}

macro_rules! container_impl {
    ($($t:ident),+ $(,)?) => {$(
        impl<T: RlpType> RlpType for $t<T> {
            fn rlp_generate(
                generator: &mut Generator<'_>,
                _tag: &FieldTag,
            ) -> Result<Option<Arc<FieldPlan>>> {
                generator.require::<T>(&FieldTag::NONE).map(|_| None)
            }
        }
    )+};
}

container_impl!(Vec, Option, Box, Rc, Arc);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{plan::FieldDesc, AnnotationReason};

    /// Hand-written struct with a bad annotation on its only field.
    #[derive(Debug, Default, PartialEq)]
    struct Bogus {
        a: u64,
    }

    impl RlpEncodable for Bogus {
        fn rlp_encode(&self, out: &mut EncodeBuffer) -> Result<()> {
            struct_plan::<Self>()?.encode(self, out)
        }
    }

    impl RlpDecodable for Bogus {
        fn rlp_decode(s: &mut Stream<'_>) -> Result<Self> {
            let plan = struct_plan::<Self>()?;
            let mut a = None;
            plan.decode(s, |s, _| {
                a = Some(s.decode::<u64>()?);
                Ok(())
            })?;
            Ok(Self { a: a.unwrap_or_default() })
        }
    }

    impl RlpType for Bogus {
        fn rlp_generate(
            generator: &mut Generator<'_>,
            _tag: &FieldTag,
        ) -> Result<Option<Arc<FieldPlan>>> {
            generator.plan_struct::<Self>()
        }
    }

    impl RlpStruct for Bogus {
        fn rlp_fields() -> Vec<FieldDesc> {
            vec![FieldDesc::new::<u64>(0, "a", "sometimes")]
        }

        fn rlp_encode_field(
            &self,
            _index: usize,
            tag: &FieldTag,
            out: &mut EncodeBuffer,
        ) -> Result<()> {
            self.a.rlp_encode_tagged(tag, out)
        }

        fn rlp_field_is_zero(&self, _index: usize) -> bool {
            self.a == 0
        }
    }

    #[test]
    fn leaf_entries_have_no_plan() {
        let registry = TypeRegistry::new();
        let info = registry.info::<u64>(&FieldTag::NONE);
        assert_eq!(info.shape(), Shape::String);
        assert!(info.plan().is_none());
        assert!(info.error().is_none());
        assert_eq!(registry.len(), 1);

        // cached
        let again = registry.info::<u64>(&FieldTag::NONE);
        assert!(Arc::ptr_eq(&info, &again));
    }

    #[test]
    fn containers_pull_in_their_elements() {
        let registry = TypeRegistry::new();
        registry.info::<Vec<Option<u64>>>(&FieldTag::NONE);
        assert_eq!(registry.len(), 3);
        assert!(registry.lookup(TypeId::of::<Option<u64>>()).is_some());
        assert!(registry.lookup(TypeId::of::<u64>()).is_some());
    }

    #[test]
    fn tags_are_part_of_the_key() {
        let registry = TypeRegistry::new();
        let tail = FieldTag { tail: true, ..FieldTag::NONE };
        let a = registry.info::<Vec<u8>>(&FieldTag::NONE);
        let b = registry.info::<Vec<u8>>(&tail);
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(b.key().tag, tail);
    }

    #[test]
    fn definition_errors_are_cached() {
        let registry = TypeRegistry::new();
        let err = registry.register::<Bogus>().unwrap_err();
        let ErrorKind::Annotation(annotation) = err.kind else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(annotation.reason, AnnotationReason::UnknownTag);
        assert_eq!(annotation.tag, "sometimes");

        assert_eq!(registry.register::<Bogus>().unwrap_err(), err);
        assert_eq!(crate::encode(Bogus { a: 1 }).unwrap_err().kind, err.kind);
        assert_eq!(crate::decode::<Bogus>([0xc1, 0x01]).unwrap_err().kind, err.kind);
    }

    #[test]
    fn dynamic_round_trip() {
        let registry = TypeRegistry::new();
        let mut out = EncodeBuffer::new();
        assert_eq!(
            registry.encode_dyn(&5u64, &mut out).unwrap_err().kind,
            ErrorKind::UnregisteredType
        );

        registry.register::<u64>().unwrap();
        registry.register::<String>().unwrap();
        registry.encode_dyn(&5u64, &mut out).unwrap();
        registry.encode_dyn(&String::from("dog"), &mut out).unwrap();
        assert_eq!(out.to_bytes(), [0x05, 0x83, b'd', b'o', b'g']);

        let bytes = out.to_bytes();
        let mut s = Stream::new(&bytes);
        let n = registry.decode_dyn(TypeId::of::<u64>(), &mut s).unwrap();
        assert_eq!(n.downcast_ref::<u64>(), Some(&5));
        let dog = registry.decode_dyn(TypeId::of::<String>(), &mut s).unwrap();
        assert_eq!(dog.downcast_ref::<String>().map(String::as_str), Some("dog"));
    }

    #[test]
    fn mismatched_value_is_rejected() {
        let registry = TypeRegistry::new();
        let info = registry.register::<u64>().unwrap();
        let mut out = EncodeBuffer::new();
        assert_eq!(info.encode(&1u32, &mut out).unwrap_err().kind, ErrorKind::TypeMismatch);
    }
}
