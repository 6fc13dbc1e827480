use super::*;

/// Options given to a field through `#[memotree(..)]` attributes.
#[derive(Default)]
pub struct FieldOptions {
    /// The key to use instead of the field's name.
    pub rename: Option<syn::LitStr>,
    /// Whether to leave the field out.
    pub skip: bool,
}

impl FieldOptions {
    /// Parse the options from a field's attributes.
    pub fn parse(attrs: &[syn::Attribute]) -> Result<Self> {
        let mut options = Self::default();
        for attr in attrs.iter().filter(|attr| attr.path().is_ident("memotree")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    options.skip = true;
                } else if meta.path.is_ident("rename") {
                    options.rename = Some(meta.value()?.parse()?);
                } else {
                    return Err(meta.error("memotree: unknown field option"));
                }
                Ok(())
            })?;
        }
        Ok(options)
    }
}
