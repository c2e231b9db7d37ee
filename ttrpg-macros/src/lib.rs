//! Proc macros for TTRPG tool definitions.
//!
//! `#[derive(Tool)]` turns a tool's argument struct into a JSON schema and a
//! `claude::Tool` definition, so the schema the model sees and the struct the
//! arguments deserialize into can never drift apart.
//!
//! # Example
//!
//! ```ignore
//! /// Roll one or more dice of the same size.
//! #[derive(Tool, Deserialize)]
//! #[tool(name = "roll_dice")]
//! struct RollDice {
//!     /// How many dice to roll
//!     #[serde(default = "one")]
//!     n: i64,
//!     /// Which phase to switch to
//!     #[tool(one_of = "exploration, combat, interaction")]
//!     phase: String,
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, DeriveInput, Expr, Field, Lit, LitStr, Meta, Type};

/// Derive macro for generating tool definitions.
///
/// # Attributes
///
/// - `#[tool(name = "...")]` on the struct - tool name (defaults to snake_case struct name)
/// - `#[tool(optional)]` on a field - not listed as required
/// - `#[tool(rename = "...")]` on a field - property name in the schema
/// - `#[tool(one_of = "a, b")]` on a string field - restrict to an enum of values
///
/// Fields of type `Option<_>` or carrying `#[serde(default)]` are never required.
#[proc_macro_derive(Tool, attributes(tool))]
pub fn derive_tool(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_tool(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

/// Per-field `#[tool(...)]` options.
#[derive(Default)]
struct FieldOptions {
    optional: bool,
    rename: Option<String>,
    one_of: Vec<String>,
}

fn expand_tool(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let tool_name = tool_name(&input)?;
    let description = doc_comment(&input.attrs);

    let fields = match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            syn::Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
            syn::Fields::Unit => Vec::new(),
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Tool derive only supports structs with named fields",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(&input, "Tool derive only supports structs")),
    };

    let mut property_tokens = Vec::new();
    let mut required = Vec::new();

    for field in fields {
        let options = field_options(field)?;
        let property_name = match &options.rename {
            Some(name) => name.clone(),
            None => field
                .ident
                .as_ref()
                .map(|ident| ident.to_string())
                .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?,
        };

        let schema = type_to_schema(&field.ty);
        let field_doc = doc_comment(&field.attrs);
        let desc_token = if field_doc.is_empty() {
            quote! {}
        } else {
            quote! { property["description"] = serde_json::json!(#field_doc); }
        };
        let enum_token = if options.one_of.is_empty() {
            quote! {}
        } else {
            let values = &options.one_of;
            quote! { property["enum"] = serde_json::json!([#(#values),*]); }
        };

        property_tokens.push(quote! {
            {
                let mut property = #schema;
                #desc_token
                #enum_token
                properties.insert(#property_name.to_string(), property);
            }
        });

        if !options.optional && !is_option_type(&field.ty) && !has_serde_default(field) {
            required.push(property_name);
        }
    }

    Ok(quote! {
        impl #struct_name {
            /// Get the tool name.
            pub fn tool_name() -> &'static str {
                #tool_name
            }

            /// Get the tool description.
            pub fn tool_description() -> &'static str {
                #description
            }

            /// Generate the JSON schema for this tool's input.
            pub fn input_schema() -> serde_json::Value {
                #[allow(unused_mut)]
                let mut properties = serde_json::Map::new();
                #(#property_tokens)*

                let required: Vec<&str> = vec![#(#required),*];

                serde_json::json!({
                    "type": "object",
                    "properties": properties,
                    "required": required
                })
            }

            /// Create a Tool definition for use with the Claude API.
            pub fn as_tool() -> claude::Tool {
                claude::Tool {
                    name: Self::tool_name().to_string(),
                    description: Self::tool_description().to_string(),
                    input_schema: Self::input_schema(),
                }
            }
        }
    })
}

fn tool_name(input: &DeriveInput) -> syn::Result<String> {
    let mut name = None;
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("tool")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                name = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported tool attribute, expected `name`"))
            }
        })?;
    }

    Ok(name.unwrap_or_else(|| to_snake_case(&input.ident.to_string())))
}

fn field_options(field: &Field) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("tool")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("optional") {
                options.optional = true;
            } else if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                options.rename = Some(value.value());
            } else if meta.path.is_ident("one_of") {
                let value: LitStr = meta.value()?.parse()?;
                options.one_of = value
                    .value()
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            } else {
                return Err(meta.error(
                    "unsupported tool attribute, expected `optional`, `rename` or `one_of`",
                ));
            }
            Ok(())
        })?;
    }
    Ok(options)
}

/// `#[serde(default)]` or `#[serde(default = "...")]` on the field.
fn has_serde_default(field: &Field) -> bool {
    field
        .attrs
        .iter()
        .filter(|a| a.path().is_ident("serde"))
        .any(|attr| {
            let mut found = false;
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("default") {
                    found = true;
                }
                // Swallow any value so parsing continues past `rename = "..."` etc.
                if meta.input.peek(syn::Token![=]) {
                    let _: Expr = meta.value()?.parse()?;
                }
                Ok(())
            });
            found
        })
}

fn doc_comment(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter(|a| a.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(expr_lit) => match &expr_lit.lit {
                    Lit::Str(s) => Some(s.value().trim().to_string()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(type_path) => type_path.path.segments.last(),
        _ => None,
    }
}

fn first_generic(segment: &syn::PathSegment) -> Option<&Type> {
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            syn::GenericArgument::Type(inner) => Some(inner),
            _ => None,
        }),
        _ => None,
    }
}

fn is_option_type(ty: &Type) -> bool {
    last_segment(ty).is_some_and(|segment| segment.ident == "Option")
}

fn type_to_schema(ty: &Type) -> TokenStream2 {
    let Some(segment) = last_segment(ty) else {
        return quote! { serde_json::json!({}) };
    };

    match segment.ident.to_string().as_str() {
        "String" | "str" => quote! { serde_json::json!({"type": "string"}) },
        "i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32" | "u64" | "usize" => {
            quote! { serde_json::json!({"type": "integer"}) }
        }
        "f32" | "f64" => quote! { serde_json::json!({"type": "number"}) },
        "bool" => quote! { serde_json::json!({"type": "boolean"}) },
        // Any JSON value; the tool validates it at runtime.
        "Value" => quote! { serde_json::json!({}) },
        "Option" | "Box" => match first_generic(segment) {
            Some(inner) => type_to_schema(inner),
            None => quote! { serde_json::json!({}) },
        },
        "Vec" => match first_generic(segment) {
            Some(inner) => {
                let items = type_to_schema(inner);
                quote! { serde_json::json!({"type": "array", "items": #items}) }
            }
            None => quote! { serde_json::json!({"type": "array"}) },
        },
        _ => quote! { serde_json::json!({"type": "object"}) },
    }
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}
