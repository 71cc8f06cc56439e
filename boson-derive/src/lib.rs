//! # Boson Derive Macros
//!
//! Procedural macros for `boson`. `#[derive(Polo)]` implements the typed
//! record traits (`Polo`, `ToValue`, `FromValue`) for a struct with named
//! fields; `#[derive(PoloEnum)]` implements the enumeration traits for a
//! unit-variant enum.
//!
//! ## Recognized attributes
//!
//! On a struct or enum:
//! - `#[boson(class_name = "com.example.User")]` — override the wire class
//!   name (defaults to the type identifier).
//!
//! On a struct field:
//! - `#[boson(rename = "X")]` — external slot name override.
//! - `#[boson(ignore)]` — never encode this slot.
//! - `#[boson(readonly)]` — encode only when the encoder is configured with
//!   `serialize_readonly`.
//!
//! On an enum variant:
//! - `#[boson(rename = "X")]` — constant name override.
//!
//! Compatible with `syn 2.0`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, LitStr};

/// Derives `Polo`, `ToValue` and `FromValue` for a struct with named fields.
///
/// The type must implement `Default`; that is its zero-argument construction
/// path.
#[proc_macro_derive(Polo, attributes(boson))]
pub fn derive_polo(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident;

    let class_name = match parse_container_attributes(&input.attrs, &name.to_string()) {
        Ok(class_name) => class_name,
        Err(e) => return e.to_compile_error().into(),
    };

    let data_struct = match input.data {
        Data::Struct(ds) => ds,
        _ => {
            return syn::Error::new(name.span(), "Polo only supports structs")
                .to_compile_error()
                .into()
        }
    };
    let named = match data_struct.fields {
        Fields::Named(named) => named.named,
        _ => {
            return syn::Error::new(name.span(), "Polo requires named fields")
                .to_compile_error()
                .into()
        }
    };

    let mut slots = Vec::new();
    for field in named {
        let attrs = match parse_field_attributes(&field.attrs) {
            Ok(attrs) => attrs,
            Err(e) => return e.to_compile_error().into(),
        };
        let ident = field.ident.clone().expect("named field has an ident");
        let external = attrs.rename.unwrap_or_else(|| ident.to_string());
        slots.push(Slot {
            ident,
            external,
            ignore: attrs.ignore,
            readonly: attrs.readonly,
        });
    }

    let descriptor_fields = slots.iter().filter(|s| !s.ignore).map(|s| {
        let external = &s.external;
        let rust_name = s.ident.to_string();
        let readonly = s.readonly;
        quote! {
            boson::FieldDescriptor {
                name: #external,
                rust_name: #rust_name,
                readonly: #readonly,
            }
        }
    });

    let write_slots = slots.iter().filter(|s| !s.ignore).map(|s| {
        let ident = &s.ident;
        let external = &s.external;
        let write = quote! {
            let value = boson::ToValue::to_value(&self.#ident, graph, options);
            record.set(#external, value);
        };
        if s.readonly {
            quote! { if options.serialize_readonly { #write } }
        } else {
            write
        }
    });

    // Every declared slot is assignable on decode, including ignored and
    // readonly ones; the directives restrict what gets written, not what a
    // foreign producer may send.
    let read_arms = slots.iter().map(|s| {
        let ident = &s.ident;
        let external = &s.external;
        quote! {
            #external => boson::record::assign_field(
                &mut self.#ident,
                <Self as boson::Polo>::class_name(),
                name,
                value,
                graph,
            )?,
        }
    });

    let expanded = quote! {
        impl boson::Polo for #name {
            fn descriptor() -> &'static boson::ClassDescriptor {
                static DESCRIPTOR: std::sync::OnceLock<boson::ClassDescriptor> =
                    std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init(|| boson::ClassDescriptor {
                    class_name: #class_name,
                    fields: vec![#(#descriptor_fields),*],
                })
            }

            fn construct() -> boson::Result<Self> {
                Ok(<Self as ::core::default::Default>::default())
            }

            fn to_record(
                &self,
                graph: &mut boson::Graph,
                options: &boson::WriteOptions,
            ) -> boson::RecordId {
                let mut record = boson::Record::new(#class_name);
                #(#write_slots)*
                graph.add_record(record)
            }

            fn read_field(
                &mut self,
                name: &str,
                value: &boson::Value,
                graph: &boson::Graph,
            ) -> boson::Result<bool> {
                match name {
                    #(#read_arms)*
                    _ => return Ok(false),
                }
                Ok(true)
            }
        }

        impl boson::ToValue for #name {
            fn to_value(&self, graph: &mut boson::Graph, options: &boson::WriteOptions) -> boson::Value {
                boson::Value::Record(boson::Polo::to_record(self, graph, options))
            }
        }

        impl boson::FromValue for #name {
            fn from_value(
                value: &boson::Value,
                graph: &boson::Graph,
            ) -> ::core::result::Result<Self, boson::SlotError> {
                match value {
                    boson::Value::Record(id) => {
                        <Self as boson::Polo>::from_record(*id, graph)
                            .map_err(boson::SlotError::Fatal)
                    }
                    other => Err(boson::SlotError::mismatch("record", other)),
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// Derives `PoloEnum`, `ToValue` and `FromValue` for a unit-variant enum.
#[proc_macro_derive(PoloEnum, attributes(boson))]
pub fn derive_polo_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident;

    let class_name = match parse_container_attributes(&input.attrs, &name.to_string()) {
        Ok(class_name) => class_name,
        Err(e) => return e.to_compile_error().into(),
    };

    let data_enum = match input.data {
        Data::Enum(de) => de,
        _ => {
            return syn::Error::new(name.span(), "PoloEnum only supports enums")
                .to_compile_error()
                .into()
        }
    };

    let mut constants = Vec::new();
    for variant in data_enum.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return syn::Error::new(
                variant.ident.span(),
                "PoloEnum variants cannot carry data",
            )
            .to_compile_error()
            .into();
        }
        let attrs = match parse_field_attributes(&variant.attrs) {
            Ok(attrs) => attrs,
            Err(e) => return e.to_compile_error().into(),
        };
        let ident = variant.ident;
        let constant = attrs.rename.unwrap_or_else(|| ident.to_string());
        constants.push((ident, constant));
    }

    let constant_arms = constants.iter().map(|(ident, constant)| {
        quote! { Self::#ident => #constant, }
    });
    let resolve_arms = constants.iter().map(|(ident, constant)| {
        quote! { #constant => ::core::option::Option::Some(Self::#ident), }
    });

    let expanded = quote! {
        impl boson::PoloEnum for #name {
            fn class_name() -> &'static str {
                #class_name
            }

            fn constant(&self) -> &'static str {
                match self {
                    #(#constant_arms)*
                }
            }

            fn from_constant(constant: &str) -> ::core::option::Option<Self> {
                match constant {
                    #(#resolve_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl boson::ToValue for #name {
            fn to_value(&self, _graph: &mut boson::Graph, _options: &boson::WriteOptions) -> boson::Value {
                boson::Value::Enum {
                    class_name: <Self as boson::PoloEnum>::class_name().to_owned(),
                    constant: boson::PoloEnum::constant(self).to_owned(),
                }
            }
        }

        impl boson::FromValue for #name {
            fn from_value(
                value: &boson::Value,
                _graph: &boson::Graph,
            ) -> ::core::result::Result<Self, boson::SlotError> {
                match value {
                    boson::Value::Enum { class_name, constant } => {
                        if class_name != <Self as boson::PoloEnum>::class_name() {
                            return Err(boson::SlotError::Fatal(
                                boson::BosonError::MissingClass(class_name.clone()),
                            ));
                        }
                        <Self as boson::PoloEnum>::from_constant(constant).ok_or_else(|| {
                            boson::SlotError::Fatal(boson::BosonError::UnknownEnumConstant {
                                class_name: class_name.clone(),
                                constant: constant.clone(),
                            })
                        })
                    }
                    other => Err(boson::SlotError::mismatch("enum", other)),
                }
            }
        }
    };

    TokenStream::from(expanded)
}

// --- Parsing Logic (Syn 2.0) ---

struct Slot {
    ident: syn::Ident,
    external: String,
    ignore: bool,
    readonly: bool,
}

struct FieldAttributes {
    rename: Option<String>,
    ignore: bool,
    readonly: bool,
}

/// Parses `#[boson(class_name = "...")]` on the container.
fn parse_container_attributes(attrs: &[Attribute], default: &str) -> syn::Result<String> {
    let mut class_name = default.to_owned();
    for attr in attrs {
        if attr.path().is_ident("boson") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("class_name") {
                    let value = meta.value()?;
                    let s: LitStr = value.parse()?;
                    class_name = s.value();
                    return Ok(());
                }
                Err(meta.error("unknown boson container attribute key"))
            })?;
        }
    }
    Ok(class_name)
}

/// Parses `#[boson(...)]` on a field or enum variant.
fn parse_field_attributes(attrs: &[Attribute]) -> syn::Result<FieldAttributes> {
    let mut parsed = FieldAttributes {
        rename: None,
        ignore: false,
        readonly: false,
    };
    for attr in attrs {
        if attr.path().is_ident("boson") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let value = meta.value()?;
                    let s: LitStr = value.parse()?;
                    parsed.rename = Some(s.value());
                    return Ok(());
                }
                if meta.path.is_ident("ignore") {
                    parsed.ignore = true;
                    return Ok(());
                }
                if meta.path.is_ident("readonly") {
                    parsed.readonly = true;
                    return Ok(());
                }
                Err(meta.error("unknown boson attribute key"))
            })?;
        }
    }
    Ok(parsed)
}
