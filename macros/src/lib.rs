extern crate proc_macro;

macro_rules! bail {
    ($item:expr, $fmt:literal $($tts:tt)*) => {
        return Err(Error::new_spanned(
            &$item,
            format!(concat!("memotree: ", $fmt) $($tts)*)
        ))
    }
}

mod into_value;
mod utils;

use proc_macro::TokenStream;
use quote::quote;
use syn::{Error, Result};

/// Convert a struct into a snapshot tree.
///
/// Structs with named fields become mappings with one entry per field, in
/// declaration order. Tuple structs become sequences and unit structs become
/// null. Fields can be renamed or skipped:
///
/// ```ignore
/// #[derive(IntoValue)]
/// struct Reaction {
///     emoji: String,
///     #[memotree(rename = "updatedAt")]
///     updated_at: i64,
///     #[memotree(skip)]
///     scratch: Vec<u8>,
/// }
/// ```
///
/// Type parameters must implement `IntoValue` themselves.
#[proc_macro_derive(IntoValue, attributes(memotree))]
pub fn into_value(stream: TokenStream) -> TokenStream {
    let item = syn::parse_macro_input!(stream as syn::DeriveInput);
    into_value::expand(&item)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
