//! Derive macros for [`rlpkit`](https://docs.rs/rlpkit).
//!
//! This crate provides two derive macros:
//!
//! - `#[derive(Rlp)]` encodes a struct as a list of its fields. It implements
//!   `RlpEncodable`, `RlpDecodable`, `RlpType` and `RlpStruct`.
//! - `#[derive(RlpWrapper)]` encodes a single-field struct exactly like its
//!   field.
//!
//! Fields of a `Rlp` struct accept these attributes:
//!
//! - `#[rlp(ignore)]`: the field is not encoded and decodes to its default.
//! - `#[rlp(optional)]`: the field may be missing from the end of the list. Once
//!   one field is optional, all later ones must be `optional` or `tail`.
//! - `#[rlp(tail)]`: on a trailing `Vec<T>`, the elements are flattened into the
//!   enclosing list and absorb all remaining items.
//! - `#[rlp(nil)]`, `#[rlp(nil_as_string)]`, `#[rlp(nil_as_list)]`: on an
//!   `Option<T>` field, an empty string or list decodes as `None`.
//!
//! Annotations are validated when the type is first used. An invalid
//! combination is reported as an error by every encode or decode of the type.
//!
//! Fields that are `ignore`d, `optional` or `tail` must implement `Default`.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

extern crate proc_macro;

mod de;
mod en;
mod ty;
mod utils;

use de::{impl_decodable, impl_decodable_wrapper};
use en::{impl_encodable, impl_encodable_wrapper};
use proc_macro::TokenStream;
use ty::{impl_type, impl_type_wrapper};

/// Derives the struct codec traits. See the [crate-level docs](crate).
#[proc_macro_derive(Rlp, attributes(rlp))]
pub fn rlp(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);
    let parts = [impl_encodable(&ast), impl_decodable(&ast), impl_type(&ast)];
    collect(parts)
}

/// Derives the codec traits for a newtype, forwarding to its only field.
#[proc_macro_derive(RlpWrapper)]
pub fn rlp_wrapper(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);
    let parts =
        [impl_encodable_wrapper(&ast), impl_decodable_wrapper(&ast), impl_type_wrapper(&ast)];
    collect(parts)
}

fn collect(parts: [syn::Result<proc_macro2::TokenStream>; 3]) -> TokenStream {
    let mut out = proc_macro2::TokenStream::new();
    for part in parts {
        match part {
            Ok(tokens) => out.extend(tokens),
            Err(err) => return err.to_compile_error().into(),
        }
    }
    out.into()
}
