//! Procedural macros for slice-dispatch

use darling::{FromDeriveInput, FromMeta, FromVariant};
use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote};
use syn::{parse_macro_input, DeriveInput, Ident};

/// Naming convention for kind names derived from variant names
#[derive(Debug, Clone, Copy, Default, FromMeta)]
enum RenameRule {
    #[default]
    #[darling(rename = "snake_case")]
    SnakeCase,
    #[darling(rename = "camelCase")]
    CamelCase,
    #[darling(rename = "PascalCase")]
    PascalCase,
}

impl RenameRule {
    fn apply(self, variant: &str) -> String {
        match self {
            RenameRule::SnakeCase => to_snake_case(variant),
            RenameRule::CamelCase => to_camel_case(variant),
            RenameRule::PascalCase => variant.to_string(),
        }
    }
}

/// Container-level attributes for #[derive(ActionKind)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_unit))]
struct ActionKindOpts {
    ident: syn::Ident,
    vis: syn::Visibility,
    data: darling::ast::Data<ActionKindVariant, ()>,

    /// Naming convention for kind names
    #[darling(default)]
    rename_all: RenameRule,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionKindVariant {
    ident: syn::Ident,

    /// Explicit kind name override
    #[darling(default)]
    rename: Option<String>,

    /// The bound method takes a payload argument
    #[darling(default)]
    payload: bool,
}

/// Convert PascalCase to snake_case
fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}

/// Convert PascalCase to camelCase
fn to_camel_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

/// Method identifier for a variant, escaping keywords (`Move` -> `r#move`)
fn method_ident(variant: &Ident) -> Ident {
    let name = to_snake_case(&variant.to_string());
    match name.as_str() {
        // Path keywords cannot be raw identifiers
        "self" | "super" | "crate" => format_ident!("{}_", name),
        _ => match syn::parse_str::<Ident>(&name) {
            Ok(ident) => ident,
            Err(_) => Ident::new_raw(&name, Span::call_site()),
        },
    }
}

/// Derive macro for the ActionKind trait
///
/// Generates, for a unit-only enum:
/// - `impl ActionKind` with `name()`, `all()` and `takes_payload()`
/// - `impl From<Enum> for Cow<'static, str>`, so variants can name handlers
/// - an `{Enum}Actions<P>` trait implemented for `BoundActions<P>`, with one
///   method per variant that dispatches the matching message
///
/// Kind names default to the variant name in snake_case. Use
/// `#[action(rename_all = "camelCase")]` on the enum or
/// `#[action(rename = "...")]` on a variant to change them. Mark a variant
/// `#[action(payload)]` to give its method a `payload: P` argument.
///
/// Inherent methods of `BoundActions` (`get`, `iter`, `len`, ...) take
/// precedence over generated methods with the same name.
///
/// # Example
/// ```ignore
/// #[derive(ActionKind, Clone, Copy, Debug)]
/// #[action(rename_all = "camelCase")]
/// enum Counter {
///     Increment,
///     #[action(payload)]
///     IncrementBy,
/// }
///
/// let config = SliceConfig::<State, i32>::new(State::default())
///     .handler(Counter::Increment, |s, _| s.count += 1)
///     .handler(Counter::IncrementBy, |s, m| s.count += m.payload().copied().unwrap_or(0));
///
/// let (state, actions, _) = instance.render(|cx| use_bound_state(cx, &config));
/// actions.increment();
/// actions.increment_by(2);
/// assert_eq!(Counter::IncrementBy.name(), "incrementBy");
/// ```
#[proc_macro_derive(ActionKind, attributes(action))]
pub fn derive_action_kind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ActionKindOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;
    let vis = &opts.vis;

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "ActionKind can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    if variants.is_empty() {
        return syn::Error::new_spanned(&input, "ActionKind needs at least one variant")
            .to_compile_error()
            .into();
    }

    let kind_names: Vec<String> = variants
        .iter()
        .map(|v| {
            v.rename
                .clone()
                .unwrap_or_else(|| opts.rename_all.apply(&v.ident.to_string()))
        })
        .collect();

    let variant_idents: Vec<_> = variants.iter().map(|v| &v.ident).collect();

    let name_arms = variant_idents
        .iter()
        .zip(kind_names.iter())
        .map(|(v, s)| quote! { #name::#v => #s });

    let payload_variants: Vec<_> = variants
        .iter()
        .filter(|v| v.payload)
        .map(|v| {
            let ident = &v.ident;
            quote! { #name::#ident }
        })
        .collect();

    let takes_payload_body = if payload_variants.is_empty() {
        quote! { false }
    } else {
        quote! { matches!(self, #(#payload_variants)|*) }
    };

    let trait_name = format_ident!("{}Actions", name);
    let trait_doc = format!(
        "Typed bound actions for [`{}`], one method per kind.\n\n\
         Implemented for `slice_dispatch::BoundActions<P>`; each method dispatches \
         the matching message and returns nothing.",
        name
    );

    let trait_methods: Vec<_> = variants
        .iter()
        .zip(kind_names.iter())
        .map(|(v, kind)| {
            let method = method_ident(&v.ident);
            let doc = format!("Dispatch a `{}` message.", kind);
            if v.payload {
                quote! {
                    #[doc = #doc]
                    fn #method(&self, payload: P);
                }
            } else {
                quote! {
                    #[doc = #doc]
                    fn #method(&self);
                }
            }
        })
        .collect();

    let impl_methods: Vec<_> = variants
        .iter()
        .map(|v| {
            let method = method_ident(&v.ident);
            let ident = &v.ident;
            if v.payload {
                quote! {
                    fn #method(&self, payload: P) {
                        self.dispatch_kind(#name::#ident, ::core::option::Option::Some(payload))
                    }
                }
            } else {
                quote! {
                    fn #method(&self) {
                        self.dispatch_kind(#name::#ident, ::core::option::Option::None)
                    }
                }
            }
        })
        .collect();

    let expanded = quote! {
        impl slice_dispatch::ActionKind for #name {
            fn name(&self) -> &'static str {
                match self {
                    #(#name_arms),*
                }
            }

            fn all() -> &'static [Self] {
                static ALL: &[#name] = &[#(#name::#variant_idents),*];
                ALL
            }

            fn takes_payload(&self) -> bool {
                #takes_payload_body
            }
        }

        impl ::core::convert::From<#name> for ::std::borrow::Cow<'static, str> {
            fn from(kind: #name) -> Self {
                ::std::borrow::Cow::Borrowed(slice_dispatch::ActionKind::name(&kind))
            }
        }

        #[doc = #trait_doc]
        #vis trait #trait_name<P> {
            #(#trait_methods)*
        }

        impl<P> #trait_name<P> for slice_dispatch::BoundActions<P> {
            #(#impl_methods)*
        }
    };

    TokenStream::from(expanded)
}
