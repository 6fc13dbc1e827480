use syn::ext::IdentExt;

use super::*;
use crate::utils::FieldOptions;

/// Implement `IntoValue` for a struct.
pub fn expand(item: &syn::DeriveInput) -> Result<proc_macro2::TokenStream> {
    let data = match &item.data {
        syn::Data::Struct(data) => data,
        syn::Data::Enum(data) => {
            bail!(data.enum_token, "enums cannot be converted into trees")
        }
        syn::Data::Union(data) => {
            bail!(data.union_token, "unions cannot be converted into trees")
        }
    };

    let body = match &data.fields {
        syn::Fields::Named(fields) => {
            let mut inserts = vec![];
            for field in &fields.named {
                let options = FieldOptions::parse(&field.attrs)?;
                if options.skip {
                    continue;
                }

                let Some(ident) = &field.ident else {
                    bail!(field, "expected a named field");
                };

                let key = match options.rename {
                    Some(lit) => lit.value(),
                    None => ident.unraw().to_string(),
                };

                inserts.push(quote! {
                    map.insert(#key, ::memotree::IntoValue::into_value(self.#ident));
                });
            }

            quote! {
                let map = ::memotree::Map::new();
                #(#inserts)*
                ::memotree::Value::Map(map)
            }
        }
        syn::Fields::Unnamed(fields) => {
            let mut pushes = vec![];
            for (i, field) in fields.unnamed.iter().enumerate() {
                let options = FieldOptions::parse(&field.attrs)?;
                if let Some(lit) = &options.rename {
                    bail!(lit, "tuple fields cannot be renamed");
                }

                if options.skip {
                    continue;
                }

                let index = syn::Index::from(i);
                pushes.push(quote! {
                    seq.push(::memotree::IntoValue::into_value(self.#index));
                });
            }

            quote! {
                let seq = ::memotree::Seq::new();
                #(#pushes)*
                ::memotree::Value::Seq(seq)
            }
        }
        syn::Fields::Unit => quote! { ::memotree::Value::Null },
    };

    // Every type parameter must be convertible itself.
    let mut generics = item.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(syn::parse_quote! { ::memotree::IntoValue });
    }

    let name = &item.ident;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics ::memotree::IntoValue for #name #ty_generics #where_clause {
            fn into_value(self) -> ::memotree::Value {
                #body
            }
        }
    })
}
