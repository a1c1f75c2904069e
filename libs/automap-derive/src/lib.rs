use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields, Type, Visibility};

/// Derive macro making a struct mappable by `automap::Config`.
///
/// Generates:
///
/// - `impl Mappable`: the struct as a record-kind field value.
/// - `impl Record`: ordered field descriptors, dynamic field read/write.
/// - `<Name>Fields`: one `FieldHandle` per field, used by `Config::for_field`.
///
/// The struct must implement `Default` and `Clone`. Only `pub` fields are
/// written by the mapper.
///
/// # Example
///
/// ```ignore
/// #[derive(Record, Default, Clone)]
/// pub struct Order {
///     pub id: u64,
///     pub lines: Vec<Line>,
///
///     #[automap(embed)]
///     pub audit: Audit,
/// }
/// ```
///
/// `#[automap(embed)]` marks a field of another `Record` type whose fields
/// are promoted: when the source has no field of the embedded field's name,
/// the embedded record is built from the source's fields instead.
///
/// Embedded records are held by value. `Option<T>`, `Box<T>`, `Rc<T>` and
/// `Arc<T>` are rejected on an `#[automap(embed)]` field; such a field can
/// still be an ordinary (non-embedded) field.
#[proc_macro_derive(Record, attributes(automap))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_record_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

/// Derive macro declaring a single-field tuple struct a named alias of the
/// type it wraps (`struct Celsius(pub f64)`).
///
/// The alias keeps its own identity but shares the wrapped type's kind, so
/// the mapper converts between the two in either direction.
#[proc_macro_derive(Alias)]
pub fn derive_alias(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_alias_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn derive_record_impl(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    let name = &input.ident;
    let name_str = name.to_string();
    let vis = &input.vis;
    let fields_ident = format_ident!("{}Fields", name);

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record does not support generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Record only supports structs with named fields",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(name, "Record only supports structs")),
    };

    let mut handle_fields = Vec::new();
    let mut handle_exprs = Vec::new();
    let mut descriptor_exprs = Vec::new();
    let mut read_arms = Vec::new();
    let mut write_arms = Vec::new();

    for (index, field) in fields.iter().enumerate() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;
        let field_name_str = field_name.to_string();
        let field_ty = &field.ty;
        let exported = matches!(field.vis, Visibility::Public(_));

        // Parse #[automap(...)] attribute.
        let mut embed = false;
        for attr in &field.attrs {
            if !attr.path().is_ident("automap") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("embed") {
                    embed = true;
                    Ok(())
                } else {
                    Err(meta.error("unknown automap attribute (expected 'embed')"))
                }
            })?;
        }

        let handle = quote! {
            automap::FieldHandle::new::<#name, #field_ty>(#name_str, #index, #field_name_str)
        };

        if embed {
            if let Some(wrapper) = indirection(field_ty) {
                return Err(syn::Error::new_spanned(
                    field_ty,
                    format!(
                        "embedded field '{field_name_str}' must hold its record by value, not through {wrapper}"
                    ),
                ));
            }
            handle_fields.push(quote! {
                pub #field_name: automap::Embedded<<#field_ty as automap::Record>::Fields>
            });
            handle_exprs.push(quote! {
                #field_name: automap::Embedded::new(
                    #handle,
                    <#field_ty as automap::Record>::fields(),
                )
            });
            descriptor_exprs.push(quote! {
                automap::FieldDescriptor::embedded::<#name, #field_ty>(
                    #name_str, #index, #field_name_str, #exported,
                )
            });
        } else {
            handle_fields.push(quote! {
                pub #field_name: automap::FieldHandle
            });
            handle_exprs.push(quote! {
                #field_name: #handle
            });
            descriptor_exprs.push(quote! {
                automap::FieldDescriptor::new::<#name, #field_ty>(
                    #name_str, #index, #field_name_str, #exported,
                )
            });
        }

        read_arms.push(quote! {
            #index => ::core::option::Option::Some(automap::Mappable::to_value(&self.#field_name)),
        });
        write_arms.push(quote! {
            #index => match <#field_ty as automap::Mappable>::from_value(value) {
                ::core::option::Option::Some(v) => {
                    self.#field_name = v;
                    true
                }
                ::core::option::Option::None => false,
            },
        });
    }

    let fields_doc = format!("Field handles of [`{name_str}`].");

    let expanded = quote! {
        #[doc = #fields_doc]
        #vis struct #fields_ident {
            #(#handle_fields,)*
        }

        impl automap::Mappable for #name {
            fn type_tag() -> automap::TypeTag {
                automap::TypeTag::record::<Self>(#name_str)
            }

            fn to_value(&self) -> automap::Value {
                automap::Value::Record(automap::RecordValue::new(::core::clone::Clone::clone(self)))
            }

            fn from_value(value: automap::Value) -> ::core::option::Option<Self> {
                match value {
                    automap::Value::Record(record) => record.downcast::<Self>(),
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl automap::Record for #name {
            type Fields = #fields_ident;

            fn fields() -> Self::Fields {
                #fields_ident {
                    #(#handle_exprs,)*
                }
            }

            fn descriptors() -> ::std::vec::Vec<automap::FieldDescriptor> {
                ::std::vec![
                    #(#descriptor_exprs),*
                ]
            }

            #[allow(unused_variables)]
            fn read_field(&self, index: usize) -> ::core::option::Option<automap::Value> {
                match index {
                    #(#read_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            #[allow(unused_variables)]
            fn write_field(&mut self, index: usize, value: automap::Value) -> bool {
                match index {
                    #(#write_arms)*
                    _ => false,
                }
            }
        }
    };

    Ok(expanded)
}

fn derive_alias_impl(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    let name = &input.ident;
    let name_str = name.to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Alias does not support generic structs",
        ));
    }

    let inner_ty = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Unnamed(fields) if fields.unnamed.len() == 1 => &fields.unnamed[0].ty,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Alias only supports tuple structs with exactly one field",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(name, "Alias only supports structs")),
    };

    let expanded = quote! {
        impl automap::Mappable for #name {
            fn type_tag() -> automap::TypeTag {
                automap::TypeTag::alias::<Self>(
                    #name_str,
                    <#inner_ty as automap::Mappable>::type_tag(),
                )
            }

            fn to_value(&self) -> automap::Value {
                automap::Mappable::to_value(&self.0)
            }

            fn from_value(value: automap::Value) -> ::core::option::Option<Self> {
                <#inner_ty as automap::Mappable>::from_value(value).map(#name)
            }
        }
    };

    Ok(expanded)
}

/// Name of the pointer or optional wrapper around `ty`, if any.
fn indirection(ty: &Type) -> Option<&'static str> {
    let Type::Path(path) = ty else {
        return None;
    };
    let last = path.path.segments.last()?;
    ["Option", "Box", "Rc", "Arc"]
        .into_iter()
        .find(|wrapper| last.ident == wrapper)
}
