use crate::utils::{field_ident, make_generics, parse_fields, parse_struct};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, Result};

pub(crate) fn impl_decodable(ast: &syn::DeriveInput) -> Result<TokenStream> {
    let body = parse_struct(ast, "Rlp")?;
    let fields = parse_fields(body)?;
    let decoded: Vec<_> = fields.iter().filter(|f| !f.ignored).collect();

    let locals = decoded.iter().map(|f| {
        let (local, ty) = (f.local(), &f.field.ty);
        quote! { let mut #local: ::rlpkit::private::Option<#ty> = ::rlpkit::private::None; }
    });
    let arms = decoded.iter().map(|f| {
        let (index, local) = (f.index, f.local());
        quote! {
            #index => #local = ::rlpkit::private::Some(
                ::rlpkit::RlpDecodable::rlp_decode_tagged(s, &field.tag)?
            ),
        }
    });
    let inits = fields.iter().map(|f| {
        let ident = f.ident();
        if f.ignored {
            return quote! { #ident: ::rlpkit::private::Default::default(), };
        }
        let local = f.local();
        if f.has("optional") || f.has("tail") {
            // absent from a short list
            quote! { #ident: ::rlpkit::private::Option::unwrap_or_default(#local), }
        } else {
            quote! {
                #ident: ::rlpkit::private::Option::ok_or(
                    #local,
                    ::rlpkit::Error::new(::rlpkit::ErrorKind::TooFewElements),
                )?,
            }
        }
    });

    let name = &ast.ident;
    let generics = make_generics(&ast.generics, quote!(::rlpkit::RlpType));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        const _: () = {
            impl #impl_generics ::rlpkit::RlpDecodable for #name #ty_generics #where_clause {
                #[allow(unused_variables)]
                fn rlp_decode(s: &mut ::rlpkit::Stream<'_>) -> ::rlpkit::Result<Self> {
                    let plan = ::rlpkit::struct_plan::<Self>()?;
                    #(#locals)*
                    plan.decode(s, |s, field| {
                        match field.index {
                            #(#arms)*
                            _ => {}
                        }
                        ::rlpkit::private::Ok(())
                    })?;
                    ::rlpkit::private::Ok(Self {
                        #(#inits)*
                    })
                }
            }
        };
    })
}

pub(crate) fn impl_decodable_wrapper(ast: &syn::DeriveInput) -> Result<TokenStream> {
    let body = parse_struct(ast, "RlpWrapper")?;

    let mut fields = body.fields.iter();
    let (Some(field), None) = (fields.next(), fields.next()) else {
        let msg = "`RlpWrapper` is only defined for structs with one field.";
        return Err(Error::new(ast.ident.span(), msg));
    };
    let ident = field_ident(0, field);

    let name = &ast.ident;
    let generics = make_generics(&ast.generics, quote!(::rlpkit::RlpType));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        const _: () = {
            impl #impl_generics ::rlpkit::RlpDecodable for #name #ty_generics #where_clause {
                #[inline]
                fn rlp_decode(s: &mut ::rlpkit::Stream<'_>) -> ::rlpkit::Result<Self> {
                    ::rlpkit::private::Ok(Self { #ident: ::rlpkit::RlpDecodable::rlp_decode(s)? })
                }

                #[inline]
                fn rlp_decode_tagged(
                    s: &mut ::rlpkit::Stream<'_>,
                    tag: &::rlpkit::FieldTag,
                ) -> ::rlpkit::Result<Self> {
                    ::rlpkit::private::Ok(Self {
                        #ident: ::rlpkit::RlpDecodable::rlp_decode_tagged(s, tag)?,
                    })
                }
            }
        };
    })
}
