use crate::utils::{field_ident, make_generics, parse_fields, parse_struct};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, Result};

pub(crate) fn impl_encodable(ast: &syn::DeriveInput) -> Result<TokenStream> {
    let body = parse_struct(ast, "Rlp")?;
    let fields = parse_fields(body)?;
    let encoded: Vec<_> = fields.iter().filter(|f| !f.ignored).collect();

    let indices: Vec<_> = encoded.iter().map(|f| f.index).collect();
    let idents: Vec<_> = encoded.iter().map(|f| f.ident()).collect();
    let descs = fields.iter().map(|f| {
        let (index, name, annotation) = (f.index, f.name(), &f.annotation);
        if f.ignored {
            quote! { ::rlpkit::FieldDesc::ignored(#index, #name, #annotation) }
        } else {
            let ty = &f.field.ty;
            quote! { ::rlpkit::FieldDesc::new::<#ty>(#index, #name, #annotation) }
        }
    });

    let name = &ast.ident;
    let generics = make_generics(&ast.generics, quote!(::rlpkit::RlpType));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        const _: () = {
            impl #impl_generics ::rlpkit::RlpEncodable for #name #ty_generics #where_clause {
                #[inline]
                fn rlp_encode(&self, out: &mut ::rlpkit::EncodeBuffer) -> ::rlpkit::Result<()> {
                    ::rlpkit::struct_plan::<Self>()?.encode(self, out)
                }

                #[inline]
                fn rlp_is_zero(&self) -> bool {
                    true #( && ::rlpkit::RlpEncodable::rlp_is_zero(&self.#idents) )*
                }
            }

            impl #impl_generics ::rlpkit::RlpStruct for #name #ty_generics #where_clause {
                fn rlp_fields() -> ::rlpkit::private::Vec<::rlpkit::FieldDesc> {
                    ::rlpkit::private::Vec::from([#(#descs),*])
                }

                #[allow(unused_variables)]
                fn rlp_encode_field(
                    &self,
                    index: usize,
                    tag: &::rlpkit::FieldTag,
                    out: &mut ::rlpkit::EncodeBuffer,
                ) -> ::rlpkit::Result<()> {
                    match index {
                        #( #indices => ::rlpkit::RlpEncodable::rlp_encode_tagged(&self.#idents, tag, out), )*
                        _ => ::rlpkit::private::Err(::rlpkit::ErrorKind::TypeMismatch.into()),
                    }
                }

                #[allow(unused_variables)]
                fn rlp_field_is_zero(&self, index: usize) -> bool {
                    match index {
                        #( #indices => ::rlpkit::RlpEncodable::rlp_is_zero(&self.#idents), )*
                        _ => true,
                    }
                }
            }
        };
    })
}

pub(crate) fn impl_encodable_wrapper(ast: &syn::DeriveInput) -> Result<TokenStream> {
    let body = parse_struct(ast, "RlpWrapper")?;

    let mut fields = body.fields.iter();
    let (Some(field), None) = (fields.next(), fields.next()) else {
        let msg = "`RlpWrapper` is only defined for structs with one field.";
        return Err(Error::new(ast.ident.span(), msg));
    };
    let ident = field_ident(0, field);
    let ty = &field.ty;

    let name = &ast.ident;
    let generics = make_generics(&ast.generics, quote!(::rlpkit::RlpType));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        const _: () = {
            impl #impl_generics ::rlpkit::RlpEncodable for #name #ty_generics #where_clause {
                #[inline]
                fn rlp_encode(&self, out: &mut ::rlpkit::EncodeBuffer) -> ::rlpkit::Result<()> {
                    ::rlpkit::RlpEncodable::rlp_encode(&self.#ident, out)
                }

                #[inline]
                fn rlp_encode_tagged(
                    &self,
                    tag: &::rlpkit::FieldTag,
                    out: &mut ::rlpkit::EncodeBuffer,
                ) -> ::rlpkit::Result<()> {
                    ::rlpkit::RlpEncodable::rlp_encode_tagged(&self.#ident, tag, out)
                }

                #[inline]
                fn rlp_is_zero(&self) -> bool {
                    ::rlpkit::RlpEncodable::rlp_is_zero(&self.#ident)
                }

                #[inline]
                fn rlp_shape() -> ::rlpkit::Shape {
                    <#ty as ::rlpkit::RlpEncodable>::rlp_shape()
                }
            }
        };
    })
}
