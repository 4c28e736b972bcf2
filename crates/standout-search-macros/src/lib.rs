//! Derive macro for `standout-search`.
//!
//! Use it through the re-export in `standout-search` (feature `derive`,
//! enabled by default) rather than depending on this crate directly.

mod attrs;
mod derive;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives the `Searchable` trait for a struct with named fields.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `String` | Text field: `String`, `&str`, `Cow<str>` or an `Option` of one (via `SearchText`) |
/// | `Number` | Numeric field, converted with `Number::from` |
/// | `Timestamp` | Point in time - requires a `SearchTimestamp` impl |
/// | `Enum` | Enum field - requires a `SearchEnum` impl |
/// | `Bool` | Boolean field |
/// | `children` | `Vec<C>` of searchable child records, usable with `search_children` |
/// | `skip` | Exclude this field |
/// | `rename = "..."` | Use a custom name in predicates |
/// | `ty = "..."` | Spell the kind as a string, e.g. `ty = "enum"` |
///
/// Fields without an attribute are not searchable.
///
/// # Generated Code
///
/// 1. A `Field<Self>` constant per searchable field (`Order::CODE`) and a
///    `Relation<Self, C>` constant per child collection (`Order::LINES`)
/// 2. `Searchable::field_value` and `Searchable::fields`
/// 3. `Searchable::children` and `Searchable::relation_names` when the
///    struct has child collections
///
/// # Example
///
/// ```ignore
/// use standout_search::prelude::*;
///
/// #[derive(Searchable)]
/// struct Line {
///     #[search(String)]
///     sku: String,
///     #[search(Number)]
///     quantity: u32,
/// }
///
/// #[derive(Searchable)]
/// struct Order {
///     #[search(String)]
///     code: String,
///     #[search(children)]
///     lines: Vec<Line>,
///     #[search(skip)]
///     internal_id: u64,
/// }
///
/// let bulk = search(&orders, &[Order::CODE])?
///     .search_children(&[Order::LINES])?
///     .with(&[Line::QUANTITY])?
///     .greater_than(100)
///     .to_vec()?;
/// ```
#[proc_macro_derive(Searchable, attributes(search))]
pub fn searchable_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive::searchable_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
