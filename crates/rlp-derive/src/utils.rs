use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    ext::IdentExt, parse_quote, Attribute, DataStruct, Error, Field, GenericParam, Generics,
    LitStr, Result,
};

pub(crate) fn parse_struct<'a>(
    ast: &'a syn::DeriveInput,
    derive_attr: &str,
) -> Result<&'a DataStruct> {
    let syn::Data::Struct(s) = &ast.data else {
        return Err(Error::new_spanned(
            ast,
            format!("#[derive({derive_attr})] is only defined for structs."),
        ));
    };
    if let Some(lt) = ast.generics.lifetimes().next() {
        let msg = format!("#[derive({derive_attr})] does not support lifetime parameters");
        return Err(Error::new_spanned(lt, msg));
    }
    Ok(s)
}

/// Collects the `#[rlp(...)]` idents of a field into annotation text.
///
/// `#[rlp(nil_as_list, optional)]` becomes `"nil-as-list,optional"`. Idents are
/// not checked here; the runtime field planner reports unknown ones.
pub(crate) fn field_annotation(attrs: &[Attribute]) -> Result<String> {
    let mut tokens = Vec::new();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("rlp")) {
        attr.parse_nested_meta(|meta| {
            let Some(ident) = meta.path.get_ident() else {
                return Err(meta.error("expected a single identifier"));
            };
            tokens.push(ident.unraw().to_string().replace('_', "-"));
            Ok(())
        })?;
    }
    Ok(tokens.join(","))
}

/// One struct field as seen by the derive.
pub(crate) struct FieldInfo<'a> {
    pub(crate) index: usize,
    pub(crate) field: &'a Field,
    pub(crate) annotation: String,
    pub(crate) ignored: bool,
}

impl FieldInfo<'_> {
    pub(crate) fn ident(&self) -> TokenStream {
        field_ident(self.index, self.field)
    }

    /// Local variable holding the decoded value.
    pub(crate) fn local(&self) -> syn::Ident {
        quote::format_ident!("__field{}", self.index)
    }

    pub(crate) fn name(&self) -> LitStr {
        let name = self
            .field
            .ident
            .as_ref()
            .map_or_else(|| self.index.to_string(), |ident| ident.unraw().to_string());
        LitStr::new(&name, proc_macro2::Span::call_site())
    }

    pub(crate) fn has(&self, token: &str) -> bool {
        self.annotation.split(',').any(|t| t == token)
    }
}

pub(crate) fn parse_fields(body: &DataStruct) -> Result<Vec<FieldInfo<'_>>> {
    body.fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let annotation = field_annotation(&field.attrs)?;
            let ignored = annotation.split(',').any(|t| t == "ignore");
            Ok(FieldInfo { index, field, annotation, ignored })
        })
        .collect()
}

pub(crate) fn field_ident(index: usize, field: &syn::Field) -> TokenStream {
    field.ident.as_ref().map_or_else(
        || {
            let index = syn::Index::from(index);
            quote! { #index }
        },
        |ident| quote! { #ident },
    )
}

pub(crate) fn make_generics(generics: &Generics, trait_name: TokenStream) -> Generics {
    let mut generics = generics.clone();
    let params: Vec<_> = generics
        .params
        .iter()
        .filter_map(|param| match param {
            GenericParam::Type(ty) => Some(ty.ident.clone()),
            _ => None,
        })
        .collect();
    let where_clause = generics.make_where_clause();
    for t in params {
        where_clause.predicates.push(parse_quote!(#t: #trait_name));
    }
    generics
}
