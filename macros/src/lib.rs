//! Derive macros for todo-forms
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Generates the wire tag and command/event helpers
//!   for action enums
//!
//! # Example
//!
//! ```ignore
//! use todo_forms_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum TodoAction {
//!     #[command]
//!     AddTodo { id: u64, content: String },
//!
//!     #[command]
//!     #[action_type("GET_USERS_FETCH")]
//!     FetchUsers,
//!
//!     #[event]
//!     UsersLoaded { count: usize },
//! }
//!
//! assert_eq!(TodoAction::FetchUsers.action_type(), "GET_USERS_FETCH");
//! assert!(TodoAction::UsersLoaded { count: 0 }.is_event());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, Variant, parse_macro_input};

/// Derive macro for Action enums
///
/// Generates on the enum:
/// - `action_type()` - the variant's wire tag, SCREAMING_SNAKE_CASE of the
///   variant name unless overridden with `#[action_type("...")]`
/// - `is_command()` - true for variants marked `#[command]`
/// - `is_event()` - true for variants marked `#[event]`
/// - `ACTION_TYPES` - every tag, in declaration order
///
/// # Errors
///
/// Produces a compile error if:
/// - Applied to a non-enum type
/// - A variant has both `#[command]` and `#[event]`
/// - Two variants resolve to the same tag
#[proc_macro_derive(Action, attributes(command, event, action_type))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_action(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_action(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Enum(data_enum) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "#[derive(Action)] can only be used on enums",
        ));
    };

    let mut tags: Vec<String> = Vec::with_capacity(data_enum.variants.len());
    let mut tag_arms = Vec::new();
    let mut command_arms = Vec::new();
    let mut event_arms = Vec::new();

    for variant in &data_enum.variants {
        let is_command = has_attribute(&variant.attrs, "command");
        let is_event = has_attribute(&variant.attrs, "event");

        if is_command && is_event {
            return Err(syn::Error::new_spanned(
                variant,
                "Variant cannot be both #[command] and #[event]",
            ));
        }

        let tag = match tag_override(&variant.attrs)? {
            Some(tag) => tag,
            None => screaming_snake_case(&variant.ident.to_string()),
        };
        if tags.contains(&tag) {
            return Err(syn::Error::new_spanned(
                variant,
                format!("duplicate action type \"{tag}\""),
            ));
        }

        let pattern = variant_pattern(variant);
        tag_arms.push(quote! { #pattern => #tag, });
        if is_command {
            command_arms.push(quote! { #pattern => true, });
        }
        if is_event {
            event_arms.push(quote! { #pattern => true, });
        }
        tags.push(tag);
    }

    Ok(quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            /// Every action type tag, in declaration order
            pub const ACTION_TYPES: &'static [&'static str] = &[#(#tags),*];

            /// Returns the action's type tag
            #[must_use]
            pub const fn action_type(&self) -> &'static str {
                match self {
                    #(#tag_arms)*
                }
            }

            /// Returns true if this action is a command
            #[must_use]
            #[allow(unreachable_patterns)]
            pub const fn is_command(&self) -> bool {
                match self {
                    #(#command_arms)*
                    _ => false,
                }
            }

            /// Returns true if this action is an event
            #[must_use]
            #[allow(unreachable_patterns)]
            pub const fn is_event(&self) -> bool {
                match self {
                    #(#event_arms)*
                    _ => false,
                }
            }
        }
    })
}

fn variant_pattern(variant: &Variant) -> TokenStream2 {
    let ident = &variant.ident;
    match &variant.fields {
        Fields::Named(_) => quote! { Self::#ident { .. } },
        Fields::Unnamed(_) => quote! { Self::#ident(..) },
        Fields::Unit => quote! { Self::#ident },
    }
}

/// Reads `#[action_type("TAG")]`, if present
fn tag_override(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    attrs
        .iter()
        .find(|attr| attr.path().is_ident("action_type"))
        .map(|attr| attr.parse_args::<LitStr>().map(|lit| lit.value()))
        .transpose()
}

/// `AddTodo` → `ADD_TODO`, `HTTPFetch` → `HTTP_FETCH`
fn screaming_snake_case(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                out.push('_');
            }
        }
        out.extend(c.to_uppercase());
    }

    out
}

/// Helper function to check if an attribute list contains a specific attribute
fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}
