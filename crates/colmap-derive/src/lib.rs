//! Derive macros for colmap records.
//!
//! This crate provides the `#[derive(Record)]` macro, which generates the
//! field descriptor table and value accessors used by `colmap-core`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, Meta, Type};

/// Column annotation that excludes a field. Mirrors
/// `colmap_core::IGNORE_SENTINEL`.
const IGNORE_SENTINEL: &str = "-";

/// Derives `Record` and `RecordMut` for a struct with named fields.
///
/// # Attributes
///
/// - `#[record(name = "Shape")]` - Overrides the shape name (optional,
///   defaults to the struct name)
///
/// # Field Attributes
///
/// - `#[column(name = "column_name")]` - Column annotation (optional,
///   defaults to the lower-cased field name)
/// - `#[column(kind = "varchar")]` - Column kind annotation (optional,
///   defaults to a kind inferred from the field type)
/// - `#[column(ignore)]` or `#[column(name = "-")]` - Excludes the field from
///   every mapping operation; its type need not implement `FieldType`.
///   `ignore` cannot be combined with `name`
///
/// Every other field type must implement `colmap_core::FieldType`.
#[proc_macro_derive(Record, attributes(record, column))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_record_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_record_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let shape_name = get_shape_name(&input.attrs, struct_name)?;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record derive does not support generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record derive only supports structs",
            ));
        }
    };

    // Collect field information
    let mut field_infos: Vec<FieldInfo> = Vec::new();
    for field in fields {
        let Some(field_name) = field.ident.clone() else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let column_attrs = parse_column_attrs(&field.attrs)?;

        field_infos.push(FieldInfo {
            field_name,
            field_type: field.ty.clone(),
            column: column_attrs.name,
            kind: column_attrs.kind,
        });
    }

    let field_count = field_infos.len();

    let descriptor_entries: Vec<TokenStream2> = field_infos
        .iter()
        .map(|info| {
            let declared = info.declared_name();
            let field_type = &info.field_type;
            let runtime = if info.is_ignored() {
                quote! {
                    ::colmap_core::RuntimeKind::Required(::colmap_core::ValueKind::Other)
                }
            } else {
                quote! { <#field_type as ::colmap_core::FieldType>::RUNTIME_KIND }
            };
            let column = option_tokens(info.column.as_deref());
            let kind = option_tokens(info.kind.as_deref());

            quote! {
                ::colmap_core::FieldDescriptor {
                    name: #declared,
                    column: #column,
                    kind: #kind,
                    runtime: #runtime,
                }
            }
        })
        .collect();

    let value_arms: Vec<TokenStream2> = field_infos
        .iter()
        .enumerate()
        .filter(|(_, info)| !info.is_ignored())
        .map(|(index, info)| {
            let field_name = &info.field_name;
            quote! {
                #index => ::colmap_core::FieldType::field_value(&self.#field_name),
            }
        })
        .collect();

    let set_arms: Vec<TokenStream2> = field_infos
        .iter()
        .enumerate()
        .filter(|(_, info)| !info.is_ignored())
        .map(|(index, info)| {
            let field_name = &info.field_name;
            let declared = info.declared_name();
            quote! {
                #index => {
                    self.#field_name = ::colmap_core::record::convert_field(#declared, value)?;
                    ::core::result::Result::Ok(())
                }
            }
        })
        .collect();

    let expanded = quote! {
        impl ::colmap_core::Record for #struct_name {
            fn shape_name(&self) -> &str {
                #shape_name
            }

            fn field_count(&self) -> usize {
                #field_count
            }

            fn descriptor(
                &self,
                index: usize,
            ) -> ::core::option::Option<::colmap_core::FieldDescriptor<'_>> {
                const FIELDS: &[::colmap_core::FieldDescriptor<'static>] = &[
                    #(#descriptor_entries),*
                ];
                FIELDS.get(index).copied()
            }

            fn value(&self, index: usize) -> ::core::option::Option<::colmap_core::SqlValue> {
                match index {
                    #(#value_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl ::colmap_core::RecordMut for #struct_name {
            #[allow(unused_variables)]
            fn set_value(
                &mut self,
                index: usize,
                value: ::core::option::Option<::colmap_core::SqlValue>,
            ) -> ::colmap_core::Result<()> {
                match index {
                    #(#set_arms)*
                    _ => ::core::result::Result::Err(
                        ::colmap_core::MapError::InvalidField(::std::format!("#{}", index)),
                    ),
                }
            }
        }
    };

    Ok(expanded)
}

struct FieldInfo {
    field_name: Ident,
    field_type: Type,
    column: Option<String>,
    kind: Option<String>,
}

impl FieldInfo {
    fn declared_name(&self) -> String {
        self.field_name.unraw().to_string()
    }

    fn is_ignored(&self) -> bool {
        self.column.as_deref() == Some(IGNORE_SENTINEL)
    }
}

#[derive(Default)]
struct ColumnAttrs {
    name: Option<String>,
    kind: Option<String>,
}

fn option_tokens(value: Option<&str>) -> TokenStream2 {
    match value {
        Some(v) => quote! { ::core::option::Option::Some(#v) },
        None => quote! { ::core::option::Option::None },
    }
}

fn get_shape_name(attrs: &[Attribute], struct_name: &Ident) -> syn::Result<String> {
    for attr in attrs {
        if attr.path().is_ident("record") {
            let mut shape_name = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    shape_name = Some(parse_str_value(&meta)?);
                    Ok(())
                } else {
                    Err(meta.error("unsupported record attribute"))
                }
            })?;
            if let Some(name) = shape_name {
                return Ok(name);
            }
        }
    }
    Ok(struct_name.to_string())
}

fn parse_column_attrs(attrs: &[Attribute]) -> syn::Result<ColumnAttrs> {
    let mut result = ColumnAttrs::default();
    let mut ignore = false;

    for attr in attrs {
        if attr.path().is_ident("column") {
            // Handle empty attribute like #[column]
            if matches!(attr.meta, Meta::Path(_)) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("ignore") {
                    if result.name.is_some() {
                        return Err(meta.error("`ignore` cannot be combined with `name`"));
                    }
                    ignore = true;
                } else if meta.path.is_ident("name") {
                    if ignore {
                        return Err(meta.error("`name` cannot be combined with `ignore`"));
                    }
                    result.name = Some(parse_str_value(&meta)?);
                } else if meta.path.is_ident("kind") {
                    result.kind = Some(parse_str_value(&meta)?);
                } else {
                    return Err(meta.error("unsupported column attribute"));
                }
                Ok(())
            })?;
        }
    }

    if ignore {
        result.name = Some(String::from(IGNORE_SENTINEL));
    }
    Ok(result)
}

fn parse_str_value(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<String> {
    let value: Expr = meta.value()?.parse()?;
    if let Expr::Lit(lit) = &value {
        if let Lit::Str(s) = &lit.lit {
            return Ok(s.value());
        }
    }
    Err(syn::Error::new_spanned(value, "expected a string literal"))
}
