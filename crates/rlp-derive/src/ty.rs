use crate::utils::{make_generics, parse_struct};
use proc_macro2::TokenStream;
use quote::quote;
use syn::Result;

pub(crate) fn impl_type(ast: &syn::DeriveInput) -> Result<TokenStream> {
    parse_struct(ast, "Rlp")?;
    impl_type_with(ast, quote! { generator.plan_struct::<Self>() })
}

pub(crate) fn impl_type_wrapper(ast: &syn::DeriveInput) -> Result<TokenStream> {
    let body = parse_struct(ast, "RlpWrapper")?;
    // arity is reported by the encoder half
    let Some(field) = body.fields.iter().next() else {
        return Ok(TokenStream::new());
    };
    let ty = &field.ty;
    impl_type_with(
        ast,
        quote! {
            ::rlpkit::private::Result::map(
                generator.require::<#ty>(&::rlpkit::FieldTag::NONE),
                |_| ::rlpkit::private::None,
            )
        },
    )
}

fn impl_type_with(ast: &syn::DeriveInput, generate: TokenStream) -> Result<TokenStream> {
    let name = &ast.ident;
    let generics = make_generics(&ast.generics, quote!(::rlpkit::RlpType));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        const _: () = {
            impl #impl_generics ::rlpkit::RlpType for #name #ty_generics #where_clause {
                fn rlp_generate(
                    generator: &mut ::rlpkit::Generator<'_>,
                    _tag: &::rlpkit::FieldTag,
                ) -> ::rlpkit::Result<
                    ::rlpkit::private::Option<::rlpkit::private::Arc<::rlpkit::FieldPlan>>,
                > {
                    #generate
                }
            }
        };
    })
}
