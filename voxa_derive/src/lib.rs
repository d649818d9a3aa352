use proc_macro::TokenStream;
use proc_macro2::Literal;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Lit, parse_macro_input};

#[proc_macro_derive(Voxa, attributes(voxa))]
pub fn derive_voxa(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    derive_voxa_expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn derive_voxa_expand(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Generic types are not supported",
        ));
    }

    match &input.data {
        Data::Struct(data_struct) => impl_voxa_struct(name, data_struct),
        Data::Enum(_) => Err(syn::Error::new_spanned(
            name,
            "Enums are not supported; Voxa records map to structs with named fields",
        )),
        Data::Union(_) => Err(syn::Error::new_spanned(
            name,
            "Union types are not supported",
        )),
    }
}

/// What a `#[voxa(...)]` annotation says about one field.
enum FieldTag {
    /// Field is written under this tag text, validated when encoding.
    Tagged(Option<String>),
    Skipped,
}

fn parse_field_tag(field: &syn::Field) -> syn::Result<FieldTag> {
    let mut tag = None;
    let mut skip = false;

    for attr in &field.attrs {
        if !attr.path().is_ident("voxa") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else if meta.path.is_ident("id") {
                let text = match meta.value()?.parse::<Lit>()? {
                    Lit::Int(id) => id.base10_digits().to_string(),
                    Lit::Str(id) => id.value(),
                    other => {
                        return Err(syn::Error::new_spanned(
                            other,
                            "id must be an integer or a string",
                        ));
                    }
                };
                tag = Some(text);
                Ok(())
            } else {
                Err(meta.error("expected `id = ...` or `skip`"))
            }
        })?;
    }

    // "-" opts a field out, same as `skip`
    if skip || tag.as_deref() == Some("-") {
        return Ok(FieldTag::Skipped);
    }
    Ok(FieldTag::Tagged(tag))
}

fn impl_voxa_struct(
    name: &syn::Ident,
    data: &syn::DataStruct,
) -> syn::Result<proc_macro2::TokenStream> {
    if let Fields::Unnamed(_) = &data.fields {
        return Err(syn::Error::new_spanned(
            name,
            "Only named fields are supported",
        ));
    }

    let mut field_info = Vec::new();
    let mut all_fields = Vec::new();

    for field in data.fields.iter() {
        let Some(field_name) = field.ident.clone() else {
            continue;
        };
        all_fields.push(field_name.clone());

        if let FieldTag::Tagged(tag) = parse_field_tag(field)? {
            field_info.push((field_name, field.ty.clone(), tag));
        }
    }

    let field_defs = field_info.iter().map(|(field_name, ty, tag)| {
        let name_str = field_name.to_string();
        let tag = match tag {
            Some(tag) => quote! { ::core::option::Option::Some(#tag) },
            None => quote! { ::core::option::Option::None },
        };
        quote! {
            voxa::FieldDef::new(
                #name_str,
                #tag,
                <<#ty as voxa::FieldValue>::T as voxa::Voxa>::ATOM,
            )
        }
    });

    let indices: Vec<_> = (0..field_info.len()).map(Literal::usize_unsuffixed).collect();
    let field_names: Vec<_> = field_info.iter().map(|(name, _, _)| name.clone()).collect();
    let field_count = Literal::usize_unsuffixed(field_info.len());

    // a struct without fields is an empty record
    let init = if matches!(data.fields, Fields::Unit) {
        quote! { Self }
    } else {
        quote! {
            Self {
                #(#all_fields: ::core::default::Default::default(),)*
            }
        }
    };

    let expanded = quote! {
        impl voxa::Schema for #name {
            const FIELDS: &'static [voxa::FieldDef] = &[
                #(#field_defs,)*
            ];
        }

        impl voxa::Voxa for #name {
            const ATOM: voxa::Atom = voxa::Atom::Record;

            fn to_value(&self) -> voxa::EncodeResult<voxa::Value> {
                #[allow(unused_mut)]
                let mut encoder = voxa::RecordEncoder::new(#field_count);
                #(
                    encoder.field(
                        &<Self as voxa::Schema>::FIELDS[#indices],
                        &self.#field_names,
                    )?;
                )*
                Ok(encoder.finish())
            }

            fn from_value(value: voxa::Value) -> voxa::DecodeResult<Self> {
                let mut result = #init;
                voxa::assign_record(&mut result, value)?;
                Ok(result)
            }

            fn from_frame(frame: &voxa::Frame<'_>) -> voxa::DecodeResult<Self> {
                let mut result = #init;
                frame.read_record_into(&mut result)?;
                Ok(result)
            }
        }

        impl voxa::Aggregate for #name {
            fn accepts(&self, id: voxa::FieldId) -> bool {
                <Self as voxa::Schema>::FIELDS
                    .iter()
                    .any(|def| def.matches(id))
            }

            #[allow(unused_variables)]
            fn assign(&mut self, id: voxa::FieldId, value: voxa::Value) -> voxa::DecodeResult<()> {
                #(
                    if <Self as voxa::Schema>::FIELDS[#indices].matches(id) {
                        return voxa::assign_field(&mut self.#field_names, value);
                    }
                )*
                Ok(())
            }

            #[allow(unused_variables)]
            fn assign_frame(&mut self, frame: &voxa::Frame<'_>) -> voxa::DecodeResult<()> {
                let id = frame.field_id();
                #(
                    if <Self as voxa::Schema>::FIELDS[#indices].matches(id) {
                        return voxa::read_field(&mut self.#field_names, frame);
                    }
                )*
                Ok(())
            }
        }
    };

    Ok(expanded)
}
