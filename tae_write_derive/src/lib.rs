extern crate proc_macro;

use crate::proc_macro::TokenStream;

use darling::{ast, FromDeriveInput, FromField, FromMeta, FromVariant};
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, Ident, Index, Meta, NestedMeta};

#[derive(FromField)]
#[darling(attributes(taewrite))]
struct WriteField {
    ident: Option<Ident>,
    #[darling(default)]
    pad_after: Option<usize>,
}

#[derive(FromVariant)]
#[darling(attributes(taewrite))]
struct WriteVariant {
    ident: Ident,
}

/// The underlying integer type for a C-like enum such as `#[taewrite(repr(u16))]`.
struct Repr(Ident);

impl FromMeta for Repr {
    fn from_list(items: &[NestedMeta]) -> darling::Result<Self> {
        match items {
            [NestedMeta::Meta(Meta::Path(path))] => path
                .get_ident()
                .cloned()
                .map(Repr)
                .ok_or_else(|| darling::Error::custom("expected a primitive integer type")),
            _ => Err(darling::Error::custom(
                "expected a single primitive integer type like repr(u32)",
            )),
        }
    }
}

#[derive(FromDeriveInput)]
#[darling(
    attributes(taewrite),
    supports(struct_named, struct_newtype, struct_tuple, enum_unit)
)]
struct WriteOptions {
    ident: Ident,
    generics: syn::Generics,
    data: ast::Data<WriteVariant, WriteField>,
    #[darling(default)]
    pad_after: Option<usize>,
    #[darling(default)]
    repr: Option<Repr>,
}

#[proc_macro_derive(TaeWrite, attributes(taewrite))]
pub fn tae_write_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let options = match WriteOptions::from_derive_input(&input) {
        Ok(options) => options,
        Err(e) => return TokenStream::from(e.write_errors()),
    };

    let (write_body, size_body) = match &options.data {
        ast::Data::Struct(fields) => struct_write_and_size(&fields.fields),
        ast::Data::Enum(variants) => match &options.repr {
            Some(Repr(repr)) => enum_write_and_size(&options.ident, variants, repr),
            None => {
                return TokenStream::from(
                    darling::Error::custom("unit enums require #[taewrite(repr(...))]")
                        .with_span(&options.ident)
                        .write_errors(),
                )
            }
        },
    };

    let pad_after = options.pad_after.unwrap_or(0);
    let write_pad_after = if pad_after > 0 {
        quote! { writer.write_all(&[0u8; #pad_after])?; }
    } else {
        quote! {}
    };

    let implementing_type = &options.ident;
    let (impl_generics, ty_generics, where_clause) = options.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics tae_write::TaeWrite for #implementing_type #ty_generics #where_clause {
            fn tae_write<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
                #write_body
                #write_pad_after
                Ok(())
            }

            fn size_in_bytes(&self) -> u64 {
                let mut size = 0;
                #size_body
                size + #pad_after as u64
            }
        }
    };

    TokenStream::from(expanded)
}

fn struct_write_and_size(fields: &[WriteField]) -> (TokenStream2, TokenStream2) {
    // Fields are written in declaration order with no implicit alignment.
    let accessors: Vec<_> = fields
        .iter()
        .enumerate()
        .map(|(i, field)| match &field.ident {
            Some(ident) => quote! { self.#ident },
            None => {
                let index = Index::from(i);
                quote! { self.#index }
            }
        })
        .collect();

    let writes = fields.iter().zip(accessors.iter()).map(|(field, accessor)| {
        let pad = field.pad_after.unwrap_or(0);
        if pad > 0 {
            quote! {
                tae_write::TaeWrite::tae_write(&#accessor, writer)?;
                writer.write_all(&[0u8; #pad])?;
            }
        } else {
            quote! { tae_write::TaeWrite::tae_write(&#accessor, writer)?; }
        }
    });

    let sizes = fields.iter().zip(accessors.iter()).map(|(field, accessor)| {
        let pad = field.pad_after.unwrap_or(0);
        quote! { size += tae_write::TaeWrite::size_in_bytes(&#accessor) + #pad as u64; }
    });

    (quote! { #(#writes)* }, quote! { #(#sizes)* })
}

fn enum_write_and_size(
    implementing_type: &Ident,
    variants: &[WriteVariant],
    repr: &Ident,
) -> (TokenStream2, TokenStream2) {
    let arms = variants.iter().map(|v| {
        let name = &v.ident;
        quote! { #implementing_type::#name => #implementing_type::#name as #repr, }
    });
    let write = quote! {
        let value = match self {
            #(#arms)*
        };
        writer.write_all(&value.to_le_bytes())?;
    };
    let size = quote! {
        size += std::mem::size_of::<#repr>() as u64;
    };
    (write, size)
}
