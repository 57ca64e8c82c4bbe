//! Proc macros for structured-output schemas.
//!
//! Provides `#[derive(Schema)]` to generate the JSON response schema the
//! generative model must follow, straight from the struct that the answer is
//! deserialized into.
//!
//! # Example
//!
//! ```ignore
//! /// A per-level writing prompt
//! #[derive(Schema, Deserialize)]
//! #[serde(rename_all = "camelCase")]
//! struct Challenge {
//!     /// What the sentence should be about
//!     topic: String,
//!     step_description: String,
//!     #[schema(optional)]
//!     difficulty: String,
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, DeriveInput, Field, Lit, LitStr, Meta, Type};

/// Derive macro implementing `story_core::ResponseSchema`.
///
/// # Attributes
///
/// - `#[schema(optional)]` on fields - Leave the field out of `required`
/// - `#[schema(rename = "...")]` on fields - Override the property name
/// - `#[serde(rename_all = "camelCase")]` / `#[serde(rename = "...")]` are honored
///   so the schema matches what serde will read back
#[proc_macro_derive(Schema, attributes(schema))]
pub fn derive_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_schema(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

fn expand_schema(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let description = get_doc_comment(&input.attrs);
    let rename_all = get_serde_string(&input.attrs, "rename_all")?;

    let fields = match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            syn::Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Schema derive only supports structs with named fields",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(input, "Schema derive only supports structs")),
    };

    let mut property_tokens = Vec::new();
    let mut required_fields = Vec::new();

    for field in fields {
        let field_name_str = get_field_name(field, rename_all.as_deref())?;
        let field_desc = get_doc_comment(&field.attrs);
        let field_type = &field.ty;
        let type_schema = type_to_schema(field_type);

        let desc_token = if field_desc.is_empty() {
            quote! {}
        } else {
            quote! { property["description"] = serde_json::json!(#field_desc); }
        };

        let nullable_token = if is_option_type(field_type) {
            quote! { property["nullable"] = serde_json::json!(true); }
        } else {
            quote! {}
        };

        property_tokens.push(quote! {
            {
                let mut property = #type_schema;
                #desc_token
                #nullable_token
                properties.insert(#field_name_str.to_string(), property);
            }
        });

        if !has_schema_flag(field, "optional")? && !is_option_type(field_type) {
            required_fields.push(field_name_str);
        }
    }

    let desc_token = if description.is_empty() {
        quote! {}
    } else {
        quote! { schema["description"] = serde_json::json!(#description); }
    };

    Ok(quote! {
        impl ::story_core::ResponseSchema for #struct_name {
            fn response_schema() -> serde_json::Value {
                let mut properties = serde_json::Map::new();
                #(#property_tokens)*

                let required: Vec<&str> = vec![#(#required_fields),*];

                let mut schema = serde_json::json!({
                    "type": "OBJECT",
                    "properties": properties,
                    "required": required
                });
                #desc_token
                schema
            }
        }
    })
}

/// Read a `key = "value"` entry out of `#[serde(...)]`, skipping everything else.
fn get_serde_string(attrs: &[Attribute], key: &str) -> syn::Result<Option<String>> {
    let mut found = None;
    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident(key) {
                let value: LitStr = meta.value()?.parse()?;
                found = Some(value.value());
            } else if meta.input.peek(syn::Token![=]) {
                let _: syn::Expr = meta.value()?.parse()?;
            } else if meta.input.peek(syn::token::Paren) {
                let _group: proc_macro2::Group = meta.input.parse()?;
            }
            Ok(())
        })?;
    }
    Ok(found)
}

fn get_field_name(field: &Field, rename_all: Option<&str>) -> syn::Result<String> {
    for attr in &field.attrs {
        if attr.path().is_ident("schema") {
            if let Ok(Meta::NameValue(nv)) = attr.parse_args::<Meta>() {
                if nv.path.is_ident("rename") {
                    if let syn::Expr::Lit(expr_lit) = &nv.value {
                        if let Lit::Str(s) = &expr_lit.lit {
                            return Ok(s.value());
                        }
                    }
                }
            }
        }
    }

    if let Some(renamed) = get_serde_string(&field.attrs, "rename")? {
        return Ok(renamed);
    }

    let ident = field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?
        .to_string();

    Ok(match rename_all {
        Some("camelCase") => to_camel_case(&ident),
        _ => ident,
    })
}

fn has_schema_flag(field: &Field, flag: &str) -> syn::Result<bool> {
    for attr in &field.attrs {
        if attr.path().is_ident("schema") {
            if let Ok(Meta::Path(path)) = attr.parse_args::<Meta>() {
                if path.is_ident(flag) {
                    return Ok(true);
                }
            }
        }
    }
    Ok(false)
}

fn get_doc_comment(attrs: &[Attribute]) -> String {
    let mut docs = Vec::new();
    for attr in attrs {
        if attr.path().is_ident("doc") {
            if let Meta::NameValue(nv) = &attr.meta {
                if let syn::Expr::Lit(expr_lit) = &nv.value {
                    if let Lit::Str(s) = &expr_lit.lit {
                        docs.push(s.value().trim().to_string());
                    }
                }
            }
        }
    }
    docs.join(" ")
}

fn is_option_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Option";
        }
    }
    false
}

fn first_generic(segment: &syn::PathSegment) -> Option<&Type> {
    if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
        if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
            return Some(inner);
        }
    }
    None
}

fn type_to_schema(ty: &Type) -> TokenStream2 {
    let Type::Path(type_path) = ty else {
        return quote! { serde_json::json!({"type": "STRING"}) };
    };
    let Some(segment) = type_path.path.segments.last() else {
        return quote! { serde_json::json!({"type": "STRING"}) };
    };

    match segment.ident.to_string().as_str() {
        "String" | "str" => quote! { serde_json::json!({"type": "STRING"}) },
        "i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32" | "u64" | "usize" => {
            quote! { serde_json::json!({"type": "INTEGER"}) }
        }
        "f32" | "f64" => quote! { serde_json::json!({"type": "NUMBER"}) },
        "bool" => quote! { serde_json::json!({"type": "BOOLEAN"}) },
        "Option" => match first_generic(segment) {
            Some(inner) => type_to_schema(inner),
            None => quote! { serde_json::json!({"type": "STRING"}) },
        },
        "Vec" => match first_generic(segment) {
            Some(inner) => {
                let inner_schema = type_to_schema(inner);
                quote! {
                    serde_json::json!({
                        "type": "ARRAY",
                        "items": #inner_schema
                    })
                }
            }
            None => quote! { serde_json::json!({"type": "ARRAY"}) },
        },
        // Nested structs carry their own derive.
        _ => quote! { <#ty as ::story_core::ResponseSchema>::response_schema() },
    }
}

fn to_camel_case(s: &str) -> String {
    let mut result = String::new();
    let mut upper_next = false;
    for c in s.chars() {
        if c == '_' {
            upper_next = !result.is_empty();
        } else if upper_next {
            result.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            result.push(c);
        }
    }
    result
}
