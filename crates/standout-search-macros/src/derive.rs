//! Implementation of the `#[derive(Searchable)]` macro.
//!
//! Generates `Field` and `Relation` constants and a `Searchable` impl from
//! `#[search(...)]` field annotations.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{
    spanned::Spanned, Data, DeriveInput, Error, Fields, GenericArgument, PathArguments, Result,
    Type,
};

use crate::attrs::{parse_search_attrs, SearchKind};

/// Main implementation of the Searchable derive macro.
pub fn searchable_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Searchable can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Searchable can only be derived for structs",
            ))
        }
    };

    let mut constants: Vec<TokenStream> = Vec::new();
    let mut field_consts: Vec<TokenStream> = Vec::new();
    let mut value_arms: Vec<TokenStream> = Vec::new();
    let mut relation_arms: Vec<TokenStream> = Vec::new();
    let mut relation_names: Vec<String> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_search_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let Some(kind) = attrs.kind else {
            continue;
        };

        let search_name = attrs.rename.unwrap_or_else(|| field_name.to_string());
        let const_name = format_ident!("{}", to_screaming_snake_case(&search_name));

        let (field_kind, value_expr) = match kind {
            SearchKind::Children => {
                let child = element_type(&field.ty)?;
                constants.push(quote! {
                    /// Relation handle for child searches.
                    pub const #const_name: ::standout_search::Relation<Self, #child> =
                        ::standout_search::Relation::new(#search_name);
                });
                relation_arms.push(quote! {
                    #search_name => ::core::option::Option::Some(
                        ::standout_search::children(&self.#field_name)
                    ),
                });
                relation_names.push(search_name);
                continue;
            }
            SearchKind::String => (
                quote! { String },
                quote! { ::standout_search::SearchText::search_text(&self.#field_name) },
            ),
            SearchKind::Number => (
                quote! { Number },
                quote! {
                    ::standout_search::Value::Number(::standout_search::Number::from(self.#field_name))
                },
            ),
            SearchKind::Timestamp => (
                quote! { Timestamp },
                quote! {
                    ::standout_search::Value::Timestamp(
                        ::standout_search::SearchTimestamp::search_timestamp(&self.#field_name)
                    )
                },
            ),
            SearchKind::Enum => (
                quote! { Enum },
                quote! {
                    ::standout_search::Value::Enum(
                        ::standout_search::SearchEnum::search_discriminant(&self.#field_name)
                    )
                },
            ),
            SearchKind::Bool => (
                quote! { Bool },
                quote! { ::standout_search::Value::Bool(self.#field_name) },
            ),
        };

        constants.push(quote! {
            /// Field selector for searches.
            pub const #const_name: ::standout_search::Field<Self> =
                ::standout_search::Field::new(#search_name, ::standout_search::FieldKind::#field_kind);
        });
        field_consts.push(quote! { Self::#const_name });
        value_arms.push(quote! {
            #search_name => #value_expr,
        });
    }

    let relations = if relation_names.is_empty() {
        quote! {}
    } else {
        quote! {
            fn children(&self, relation: &str) -> ::core::option::Option<::standout_search::Children<'_>> {
                match relation {
                    #(#relation_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn relation_names() -> ::std::vec::Vec<::std::borrow::Cow<'static, str>> {
                ::std::vec![#(::std::borrow::Cow::Borrowed(#relation_names)),*]
            }
        }
    };

    Ok(quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#constants)*
        }

        impl #impl_generics ::standout_search::Searchable for #struct_name #ty_generics #where_clause {
            fn field_value(&self, field: &str) -> ::standout_search::Value<'_> {
                match field {
                    #(#value_arms)*
                    _ => ::standout_search::Value::None,
                }
            }

            fn fields() -> ::std::vec::Vec<::standout_search::Field<Self>> {
                ::std::vec![#(#field_consts),*]
            }

            #relations
        }
    })
}

/// Returns `C` for a `Vec<C>` (or any single-parameter container) field.
fn element_type(ty: &Type) -> Result<&Type> {
    if let Type::Path(path) = ty {
        if let Some(segment) = path.path.segments.last() {
            if let PathArguments::AngleBracketed(args) = &segment.arguments {
                let mut types = args.args.iter().filter_map(|arg| match arg {
                    GenericArgument::Type(ty) => Some(ty),
                    _ => None,
                });
                if let (Some(element), None) = (types.next(), types.next()) {
                    return Ok(element);
                }
            }
        }
    }
    Err(Error::new(
        ty.span(),
        "#[search(children)] needs a Vec<T> field of searchable records",
    ))
}

/// Convert a string to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' || c == '.' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = c.is_alphanumeric();
        }
    }

    result
}
