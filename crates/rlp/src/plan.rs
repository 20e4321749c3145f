//! Field selection for struct types.
//!
//! A struct's fields are described by [`FieldDesc`] values (normally emitted by
//! `#[derive(Rlp)]`). [`plan_fields`] parses each field's annotation, checks
//! that the annotations combine legally, and produces the [`FieldPlan`] that
//! drives encoding and decoding of every instance of the struct.

use crate::{
    error::{AnnotationError, AnnotationReason},
    registry::{Generator, TypeInfo},
    EncodeBuffer, Error, ErrorKind, NilKind, Result, RlpType, Stream,
};
use std::sync::Arc;

/// The structural shape of a type, as far as field annotations care.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Encodes as a string: integers, booleans, text and byte sequences.
    String,
    /// Encodes as a list: structs and anything custom.
    List,
    /// A homogeneous sequence encoded as a list, eligible for `tail`.
    Sequence,
    /// An optional value, eligible for `nil` annotations. Carries the nil kind of the inner type.
    Optional(NilKind),
}

impl Shape {
    /// Returns the empty value an absent value of this shape encodes as.
    #[inline]
    pub const fn default_nil(self) -> NilKind {
        match self {
            Self::String => NilKind::String,
            Self::List | Self::Sequence | Self::Optional(_) => NilKind::List,
        }
    }
}

/// Parsed, validated annotation of one struct field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FieldTag {
    /// For `Option` fields: the empty value that decodes as `None`.
    pub nil: Option<NilKind>,
    /// The field may be omitted from the end of the list.
    pub optional: bool,
    /// The field's elements are flattened into the enclosing list.
    pub tail: bool,
}

impl FieldTag {
    /// The tag of an unannotated value.
    pub const NONE: Self = Self { nil: None, optional: false, tail: false };
}

type InfoFn = fn(&mut Generator<'_>, &FieldTag) -> Result<Arc<TypeInfo>>;

/// Compile-time description of one struct field.
#[derive(Clone, Copy)]
pub struct FieldDesc {
    /// Field name, or its index for tuple structs.
    pub name: &'static str,
    /// Declaration index of the field.
    pub index: usize,
    /// The raw annotation text, e.g. `"optional"` or `"nil-as-list"`.
    pub annotation: &'static str,
    shape: Option<Shape>,
    info: Option<InfoFn>,
}

impl FieldDesc {
    /// Describes a field of type `T`.
    pub fn new<T: RlpType>(index: usize, name: &'static str, annotation: &'static str) -> Self {
        Self {
            name,
            index,
            annotation,
            shape: Some(T::rlp_shape()),
            info: Some(require_info::<T> as InfoFn),
        }
    }

    /// Describes a field whose type does not take part in encoding.
    ///
    /// The annotation must contain `ignore`.
    pub const fn ignored(index: usize, name: &'static str, annotation: &'static str) -> Self {
        Self { name, index, annotation, shape: None, info: None }
    }
}

impl core::fmt::Debug for FieldDesc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FieldDesc")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("annotation", &self.annotation)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

fn require_info<T: RlpType>(
    generator: &mut Generator<'_>,
    tag: &FieldTag,
) -> Result<Arc<TypeInfo>> {
    generator.require::<T>(tag)
}

/// One field that takes part in encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlannedField {
    /// Declaration index of the field.
    pub index: usize,
    /// Field name.
    pub name: &'static str,
    /// The field's annotation.
    pub tag: FieldTag,
}

/// The validated field layout of a struct type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldPlan {
    type_name: &'static str,
    fields: Vec<PlannedField>,
    first_optional: Option<usize>,
}

impl FieldPlan {
    /// Returns the name of the planned type.
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the participating fields in encoding order.
    pub fn fields(&self) -> &[PlannedField] {
        &self.fields
    }

    /// Encodes `value` as a list of its planned fields.
    ///
    /// If the struct has optional fields, the trailing run of zero-valued
    /// fields starting at or after the first optional one is left out.
    pub fn encode<T: RlpStruct>(&self, value: &T, out: &mut EncodeBuffer) -> Result<()> {
        let mut end = self.fields.len();
        if let Some(first) = self.first_optional {
            while end > first && value.rlp_field_is_zero(self.fields[end - 1].index) {
                end -= 1;
            }
        }

        let list = out.list_start();
        for field in &self.fields[..end] {
            value
                .rlp_encode_field(field.index, &field.tag, out)
                .map_err(|e| e.with_field(self.type_name, field.name))?;
        }
        out.list_end(list);
        Ok(())
    }

    /// Decodes a list into fields, calling `decode_field` once per present field.
    ///
    /// Fields that are not visited because the list ended early on an optional
    /// field must be left at their zero value by the caller.
    pub fn decode<'a, F>(&self, s: &mut Stream<'a>, mut decode_field: F) -> Result<()>
    where
        F: FnMut(&mut Stream<'a>, &PlannedField) -> Result<()>,
    {
        s.list_start()?;
        for field in &self.fields {
            match decode_field(s, field) {
                Ok(()) => {}
                Err(e) if e.is_end_of_list() => {
                    if field.tag.optional {
                        break;
                    }
                    return Err(s
                        .error(ErrorKind::TooFewElements)
                        .with_field(self.type_name, field.name));
                }
                Err(e) => return Err(e.with_field(self.type_name, field.name)),
            }
        }
        s.list_end().map_err(|e| match e.kind {
            ErrorKind::ListNotExhausted => Error { kind: ErrorKind::TooManyElements, ..e },
            _ => e,
        })
    }
}

/// A struct type encoded as a list of its fields.
///
/// Implemented by `#[derive(Rlp)]`; the field layout is validated once and
/// cached by the [`TypeRegistry`](crate::TypeRegistry).
pub trait RlpStruct: RlpType {
    /// Describes every field in declaration order, including ignored ones.
    fn rlp_fields() -> Vec<FieldDesc>;

    /// Encodes the field with declaration index `index`.
    fn rlp_encode_field(&self, index: usize, tag: &FieldTag, out: &mut EncodeBuffer)
        -> Result<()>;

    /// Returns `true` if the field with declaration index `index` holds its zero value.
    fn rlp_field_is_zero(&self, index: usize) -> bool;
}

/// Validates the annotations of `fields` and selects the participating ones.
///
/// # Errors
///
/// Returns an [`AnnotationError`] for unknown tokens, `nil` on a non-`Option`
/// field, `optional` combined with `tail`, `tail` anywhere but the last field
/// or on a non-sequence field, and a required field after an optional one.
pub fn plan_fields(
    type_name: &'static str,
    fields: &[FieldDesc],
) -> Result<FieldPlan, AnnotationError> {
    let mut planned = Vec::with_capacity(fields.len());
    let mut first_optional: Option<(usize, &'static str)> = None;

    for (pos, field) in fields.iter().enumerate() {
        let is_last = pos + 1 == fields.len();
        let Some(tag) = parse_tag(type_name, field, is_last)? else {
            continue;
        };

        if let Some((_, preceding)) = first_optional {
            if !tag.optional && !tag.tail {
                return Err(AnnotationError {
                    type_name,
                    field: field.name,
                    tag: field.annotation,
                    reason: AnnotationReason::MustBeOptional { preceding },
                });
            }
        } else if tag.optional {
            first_optional = Some((planned.len(), field.name));
        }

        planned.push(PlannedField { index: field.index, name: field.name, tag });
    }

    Ok(FieldPlan {
        type_name,
        fields: planned,
        first_optional: first_optional.map(|(pos, _)| pos),
    })
}

/// Parses one field annotation. Returns `None` for ignored fields.
fn parse_tag(
    type_name: &'static str,
    field: &FieldDesc,
    is_last: bool,
) -> Result<Option<FieldTag>, AnnotationError> {
    let err = |tag, reason| AnnotationError { type_name, field: field.name, tag, reason };

    let mut tag = FieldTag::NONE;
    let mut ignored = false;
    for token in field.annotation.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match token {
            "-" | "ignore" => ignored = true,
            "nil" | "nil-as-string" | "nil-as-list" => {
                let Some(Shape::Optional(inner)) = field.shape else {
                    return Err(err(token, AnnotationReason::NilOnNonOptional));
                };
                tag.nil = Some(match token {
                    "nil-as-string" => NilKind::String,
                    "nil-as-list" => NilKind::List,
                    _ => inner,
                });
            }
            "optional" => {
                tag.optional = true;
                if tag.tail {
                    return Err(err(token, AnnotationReason::OptionalWithTail));
                }
            }
            "tail" => {
                tag.tail = true;
                if !is_last {
                    return Err(err(token, AnnotationReason::TailNotLast));
                }
                if tag.optional {
                    return Err(err(token, AnnotationReason::OptionalWithTail));
                }
                if field.shape != Some(Shape::Sequence) {
                    return Err(err(token, AnnotationReason::TailNotSequence));
                }
            }
            _ => return Err(err(token, AnnotationReason::UnknownTag)),
        }
    }

    if ignored {
        return Ok(None);
    }
    if field.info.is_none() {
        // an `ignored` descriptor must carry the `ignore` token
        return Err(err(field.annotation, AnnotationReason::UnknownTag));
    }
    Ok(Some(tag))
}

/// Validates the field types of `T` and returns its plan.
///
/// Nested field types are generated through `generator`, so a field referring
/// back to `T` resolves to the entry currently being built.
pub(crate) fn generate_plan<T: RlpStruct>(
    generator: &mut Generator<'_>,
) -> Result<Arc<FieldPlan>> {
    let type_name = core::any::type_name::<T>();
    let fields = T::rlp_fields();
    let plan = plan_fields(type_name, &fields)?;

    for planned in &plan.fields {
        let info = fields
            .iter()
            .find(|f| f.index == planned.index)
            .and_then(|f| f.info)
            .ok_or(Error::new(ErrorKind::TypeMismatch))?;
        info(generator, &planned.tag).map_err(|e| e.with_field(type_name, planned.name))?;
    }
    Ok(Arc::new(plan))
}
