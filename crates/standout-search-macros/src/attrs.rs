//! Attribute parsing for the Searchable derive macro.
//!
//! Parses the `#[search(...)]` field attributes.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Ident, Lit, Meta, Result, Token,
};

const EXPECTED: &str = "String, Number, Timestamp, Enum, Bool, children";

/// What a field contributes to the record's search surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    /// `#[search(String)]`
    String,
    /// `#[search(Number)]`
    Number,
    /// `#[search(Timestamp)]`
    Timestamp,
    /// `#[search(Enum)]`
    Enum,
    /// `#[search(Bool)]`
    Bool,
    /// `#[search(children)]`: a `Vec` of searchable child records.
    Children,
}

impl SearchKind {
    fn parse_name(name: &str, span: Span) -> Result<Self> {
        match name {
            "String" | "string" => Ok(SearchKind::String),
            "Number" | "number" => Ok(SearchKind::Number),
            "Timestamp" | "timestamp" => Ok(SearchKind::Timestamp),
            "Enum" | "enum" | "enumeration" => Ok(SearchKind::Enum),
            "Bool" | "bool" | "boolean" => Ok(SearchKind::Bool),
            "children" | "Children" => Ok(SearchKind::Children),
            other => Err(Error::new(
                span,
                format!("unknown search kind: '{other}'. Expected one of: {EXPECTED}"),
            )),
        }
    }

    /// Parses a kind written as an identifier.
    pub fn from_ident(ident: &Ident) -> Result<Self> {
        Self::parse_name(&ident.to_string(), ident.span())
    }
}

/// Field-level attributes from `#[search(...)]`.
#[derive(Debug, Clone)]
pub struct SearchAttr {
    /// The kind of this field, if it is searchable.
    pub kind: Option<SearchKind>,
    /// Exclude this field.
    pub skip: bool,
    /// Name used in predicates (default: the field name).
    pub rename: Option<String>,
    /// The span for error reporting.
    pub span: Span,
}

impl Default for SearchAttr {
    fn default() -> Self {
        SearchAttr {
            kind: None,
            skip: false,
            rename: None,
            span: Span::call_site(),
        }
    }
}

fn string_value(value: &syn::Expr, what: &str) -> Result<syn::LitStr> {
    match value {
        syn::Expr::Lit(syn::ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.clone()),
        other => Err(Error::new(
            other.span(),
            format!("{what} must be a string literal"),
        )),
    }
}

impl Parse for SearchAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = SearchAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") => attr.skip = true,
                Meta::Path(p) => {
                    let ident = p.get_ident().ok_or_else(|| {
                        Error::new(p.span(), format!("expected {EXPECTED}, or skip"))
                    })?;
                    attr.kind = Some(SearchKind::from_ident(ident)?);
                    attr.span = ident.span();
                }
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    attr.rename = Some(string_value(&nv.value, "rename")?.value());
                }
                // ty = "bool" for kinds that are keywords
                Meta::NameValue(nv) if nv.path.is_ident("ty") => {
                    let s = string_value(&nv.value, "ty")?;
                    attr.kind = Some(SearchKind::parse_name(&s.value(), s.span())?);
                    attr.span = s.span();
                }
                Meta::NameValue(nv) => {
                    return Err(Error::new(
                        nv.path.span(),
                        "unknown attribute. Expected: rename or ty",
                    ));
                }
                Meta::List(list) => {
                    return Err(Error::new(
                        list.span(),
                        format!(
                            "unknown search attribute. Expected: {EXPECTED}, skip, rename = \"...\", or ty = \"...\""
                        ),
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Extracts the `#[search(...)]` attribute of a field.
pub fn parse_search_attrs(attrs: &[Attribute]) -> Result<SearchAttr> {
    for attr in attrs {
        if attr.path().is_ident("search") {
            return attr.parse_args::<SearchAttr>();
        }
    }
    Ok(SearchAttr::default())
}
