//! Proc macros for FrameTale narrator tools.
//!
//! Provides `#[derive(Tool)]`, which turns a typed argument struct into a
//! function-calling schema the remote model can read.
//!
//! # Example
//!
//! ```ignore
//! /// Modify the player character's health points (HP).
//! #[derive(Tool, Deserialize)]
//! #[tool(name = "change_player_hp")]
//! struct ChangeHp {
//!     /// Positive for healing, negative for damage.
//!     amount: i64,
//! }
//!
//! let tool: openrouter::Tool = ChangeHp::as_tool();
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Expr, Field, Fields, GenericArgument, Lit,
    LitStr, Meta, PathArguments, PathSegment, Type,
};

/// Derive macro for generating tool schemas.
///
/// # Attributes
///
/// - `#[tool(name = "...")]` on the struct - Override the tool name (defaults to snake_case struct name)
/// - `#[tool(optional)]` on fields - Leave the field out of `required`
/// - `#[tool(rename = "...")]` on fields - Override the property name in the schema
///
/// `Option<T>` fields are never required.
#[proc_macro_derive(Tool, attributes(tool))]
pub fn derive_tool(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_tool(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

fn expand_tool(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let tool_name = tool_name(&input)?;
    let description = doc_comment(&input.attrs);

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Tool derive only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Tool derive only supports structs",
            ))
        }
    };

    let mut property_tokens = Vec::new();
    let mut required = Vec::new();

    for field in fields {
        let options = FieldOptions::parse(field)?;
        let property_name = match options.rename {
            Some(rename) => rename,
            None => field
                .ident
                .as_ref()
                .map(|ident| ident.to_string())
                .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?,
        };
        let field_doc = doc_comment(&field.attrs);
        let schema = schema_for(&field.ty);

        let describe = if field_doc.is_empty() {
            quote! {}
        } else {
            quote! { property["description"] = ::serde_json::json!(#field_doc); }
        };

        property_tokens.push(quote! {
            {
                #[allow(unused_mut)]
                let mut property = #schema;
                #describe
                properties.insert(#property_name.to_string(), property);
            }
        });

        if !options.optional && !is_option(&field.ty) {
            required.push(property_name);
        }
    }

    Ok(quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            /// Name the model uses to call this tool.
            pub fn tool_name() -> &'static str {
                #tool_name
            }

            /// Description shown to the model.
            pub fn tool_description() -> &'static str {
                #description
            }

            /// JSON schema of the argument object.
            pub fn parameters_schema() -> ::serde_json::Value {
                let mut properties = ::serde_json::Map::new();
                #(#property_tokens)*

                let required: Vec<&str> = vec![#(#required),*];

                ::serde_json::json!({
                    "type": "object",
                    "properties": properties,
                    "required": required
                })
            }

            /// Tool definition for a chat completions request.
            pub fn as_tool() -> ::openrouter::Tool {
                ::openrouter::Tool {
                    name: Self::tool_name().to_string(),
                    description: Self::tool_description().to_string(),
                    parameters: Self::parameters_schema(),
                }
            }
        }
    })
}

#[derive(Default)]
struct FieldOptions {
    rename: Option<String>,
    optional: bool,
}

impl FieldOptions {
    fn parse(field: &Field) -> syn::Result<Self> {
        let mut options = Self::default();
        for attr in field.attrs.iter().filter(|a| a.path().is_ident("tool")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("optional") {
                    options.optional = true;
                    Ok(())
                } else if meta.path.is_ident("rename") {
                    let value: LitStr = meta.value()?.parse()?;
                    options.rename = Some(value.value());
                    Ok(())
                } else {
                    Err(meta.error("expected `optional` or `rename = \"...\"`"))
                }
            })?;
        }
        Ok(options)
    }
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
                Err(meta.error("expected `name = \"...\"`"))
            }
        })?;
    }

    Ok(name.unwrap_or_else(|| to_snake_case(&input.ident.to_string())))
}

fn doc_comment(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(expr) => match &expr.lit {
                    Lit::Str(s) => Some(s.value().trim().to_string()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn last_segment(ty: &Type) -> Option<&PathSegment> {
    match ty {
        Type::Path(type_path) => type_path.path.segments.last(),
        _ => None,
    }
}

fn first_type_argument(segment: &PathSegment) -> Option<&Type> {
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        }),
        _ => None,
    }
}

fn is_option(ty: &Type) -> bool {
    last_segment(ty).is_some_and(|segment| segment.ident == "Option")
}

fn schema_for(ty: &Type) -> TokenStream2 {
    let Some(segment) = last_segment(ty) else {
        return quote! { ::serde_json::json!({}) };
    };

    match segment.ident.to_string().as_str() {
        "String" | "str" => quote! { ::serde_json::json!({"type": "string"}) },
        "i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32" | "u64" | "usize" => {
            quote! { ::serde_json::json!({"type": "integer"}) }
        }
        "f32" | "f64" => quote! { ::serde_json::json!({"type": "number"}) },
        "bool" => quote! { ::serde_json::json!({"type": "boolean"}) },
        "Option" => match first_type_argument(segment) {
            Some(inner) => schema_for(inner),
            None => quote! { ::serde_json::json!({}) },
        },
        "Vec" => match first_type_argument(segment) {
            Some(inner) => {
                let items = schema_for(inner);
                quote! { ::serde_json::json!({"type": "array", "items": #items}) }
            }
            None => quote! { ::serde_json::json!({"type": "array"}) },
        },
        _ => quote! { ::serde_json::json!({"type": "object"}) },
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
