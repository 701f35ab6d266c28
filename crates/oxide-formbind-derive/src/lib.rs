//! Derive macro for form-bindable records.
//!
//! This crate provides the `#[derive(Record)]` macro, which lets a struct
//! with named fields act as a record node in an `oxide-formbind` form.

use std::collections::HashSet;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{
    parse_macro_input, parse_quote, Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit,
    LitStr, Meta, Path,
};

/// Derives `Record` and `Bindable` for a struct with named fields.
///
/// Every field must implement `Bindable`. Paths match field names ignoring
/// case and underscores, so a field `first_name` is reachable as `FirstName`.
///
/// # Attributes
///
/// - `#[record(crate = "path")]` - Path of the `oxide_formbind` crate
///   (optional, defaults to `::oxide_formbind`)
///
/// # Field Attributes
///
/// - `#[field(rename = "name")]` - Declares the field under another name
/// - `#[field(skip)]` - Hides the field from forms
#[proc_macro_derive(Record, attributes(record, field))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_record_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_record_impl(mut input: DeriveInput) -> syn::Result<TokenStream2> {
    let krate = get_crate_path(&input.attrs)?;

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

    let mut field_infos: Vec<FieldInfo> = Vec::new();
    let mut seen = HashSet::new();
    for field in fields {
        let Some(ident) = field.ident.clone() else {
            return Err(syn::Error::new_spanned(field, "field has no name"));
        };
        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let declared = attrs.rename.unwrap_or_else(|| ident.unraw().to_string());
        if !seen.insert(declared.to_lowercase()) {
            return Err(syn::Error::new_spanned(
                field,
                format!("duplicate record field name {declared:?}"),
            ));
        }
        field_infos.push(FieldInfo { ident, declared });
    }

    let type_params: Vec<Ident> = input
        .generics
        .type_params()
        .map(|param| param.ident.clone())
        .collect();
    let where_clause = input.generics.make_where_clause();
    for param in &type_params {
        where_clause
            .predicates
            .push(parse_quote!(#param: #krate::bind::Bindable));
    }

    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let declared_names: Vec<&str> = field_infos.iter().map(|f| f.declared.as_str()).collect();
    let idents: Vec<&Ident> = field_infos.iter().map(|f| &f.ident).collect();

    let expanded = quote! {
        impl #impl_generics #krate::bind::Record for #struct_name #ty_generics #where_clause {
            fn field_names(&self) -> &'static [&'static str] {
                &[#(#declared_names),*]
            }

            fn field(
                &self,
                name: &str,
            ) -> ::core::option::Option<&dyn #krate::bind::Bindable> {
                match name {
                    #(#declared_names => ::core::option::Option::Some(
                        &self.#idents as &dyn #krate::bind::Bindable
                    ),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_mut(
                &mut self,
                name: &str,
            ) -> ::core::option::Option<&mut dyn #krate::bind::Bindable> {
                match name {
                    #(#declared_names => ::core::option::Option::Some(
                        &mut self.#idents as &mut dyn #krate::bind::Bindable
                    ),)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl #impl_generics #krate::bind::Bindable for #struct_name #ty_generics #where_clause {
            fn kind(&self) -> #krate::value::Kind {
                #krate::value::Kind::Record
            }

            fn to_value(&self) -> #krate::value::Value {
                #krate::bind::record_value(self)
            }

            fn assign(
                &mut self,
                value: #krate::value::Value,
            ) -> ::core::result::Result<(), #krate::CoercionError> {
                #krate::bind::assign_record(self, value)
            }

            fn container(&self) -> #krate::bind::Container<'_> {
                #krate::bind::Container::Record(self)
            }

            fn container_mut(&mut self) -> #krate::bind::ContainerMut<'_> {
                #krate::bind::ContainerMut::Record(self)
            }
        }
    };

    Ok(expanded)
}

struct FieldInfo {
    ident: Ident,
    declared: String,
}

#[derive(Default)]
struct FieldAttrs {
    rename: Option<String>,
    skip: bool,
}

fn get_crate_path(attrs: &[Attribute]) -> syn::Result<Path> {
    for attr in attrs {
        if attr.path().is_ident("record") {
            let mut path = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("crate") {
                    let value: LitStr = meta.value()?.parse()?;
                    path = Some(value.parse::<Path>()?);
                    Ok(())
                } else {
                    Err(meta.error("unsupported record attribute"))
                }
            })?;
            if let Some(path) = path {
                return Ok(path);
            }
        }
    }
    Ok(parse_quote!(::oxide_formbind))
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("field") {
            // Handle empty attribute like #[field]
            if matches!(attr.meta, Meta::Path(_)) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    result.skip = true;
                } else if meta.path.is_ident("rename") {
                    let value: Expr = meta.value()?.parse()?;
                    match value {
                        Expr::Lit(lit) => match lit.lit {
                            Lit::Str(s) => result.rename = Some(s.value()),
                            other => {
                                return Err(syn::Error::new_spanned(
                                    other,
                                    "rename expects a string literal",
                                ));
                            }
                        },
                        other => {
                            return Err(syn::Error::new_spanned(
                                other,
                                "rename expects a string literal",
                            ));
                        }
                    }
                } else {
                    return Err(meta.error("unsupported field attribute"));
                }
                Ok(())
            })?;
        }
    }

    Ok(result)
}
