//! Parsing for `#[derive(Bind)]`.
//!
//! This module turns a struct definition into a [`RecordInput`]: its name,
//! generics and the `#[bind(...)]` attributes of each named field.

use syn::{
    ext::IdentExt, punctuated::Punctuated, spanned::Spanned, Attribute, Data, DeriveInput, Expr,
    ExprLit, Fields, GenericArgument, Generics, Ident, Lit, LitStr, Meta, PathArguments, Token,
    Type,
};

/// Name of the field that receives the request payload.
pub const BODY_FIELD: &str = "body";

/// Tags from the `#[bind(...)]` attributes of one field.
#[derive(Debug, Default)]
pub struct BindAttrs {
    pub path: Option<LitStr>,
    pub header: Option<LitStr>,
    pub query: Option<LitStr>,
    pub context: Option<LitStr>,
    pub content_type: Option<LitStr>,
    pub default: Option<LitStr>,
}

impl BindAttrs {
    /// Collects every `#[bind(...)]` attribute on a field.
    pub fn from_attributes(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("bind")) {
            let meta_list =
                attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
            for meta in meta_list {
                parsed.apply(meta)?;
            }
        }

        Ok(parsed)
    }

    fn apply(&mut self, meta: Meta) -> syn::Result<()> {
        let nv = match meta {
            Meta::NameValue(nv) => nv,
            other => {
                return Err(syn::Error::new(
                    other.span(),
                    "expected name = \"value\"",
                ))
            }
        };

        let ident = nv
            .path
            .get_ident()
            .ok_or_else(|| syn::Error::new(nv.path.span(), "expected identifier"))?
            .to_string();

        let value = match &nv.value {
            Expr::Lit(ExprLit {
                lit: Lit::Str(s), ..
            }) => s.clone(),
            _ => {
                return Err(syn::Error::new(
                    nv.value.span(),
                    "expected string literal",
                ))
            }
        };

        let slot = match ident.as_str() {
            "path" => &mut self.path,
            "header" => &mut self.header,
            "query" => &mut self.query,
            "context" => &mut self.context,
            "content_type" => &mut self.content_type,
            "default" => &mut self.default,
            _ => {
                return Err(syn::Error::new(
                    nv.path.span(),
                    format!("unknown bind attribute: {ident}"),
                ))
            }
        };

        if slot.is_some() {
            return Err(syn::Error::new(
                nv.path.span(),
                format!("duplicate bind attribute: {ident}"),
            ));
        }
        *slot = Some(value);
        Ok(())
    }

    /// Present tags, paired with their `Tag` variant name.
    pub fn tags(&self) -> Vec<(&'static str, &LitStr)> {
        [
            ("Path", &self.path),
            ("Header", &self.header),
            ("Query", &self.query),
            ("Context", &self.context),
            ("ContentType", &self.content_type),
            ("Default", &self.default),
        ]
        .into_iter()
        .filter_map(|(variant, value)| value.as_ref().map(|lit| (variant, lit)))
        .collect()
    }

    /// Returns `true` if the field receives a path, header or query value.
    pub fn is_scalar(&self) -> bool {
        self.path.is_some() || self.header.is_some() || self.query.is_some()
    }
}

/// How a body field's type can receive the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    /// `Bytes`: raw only.
    Bytes,
    /// `Vec<u8>`: raw or JSON.
    ByteVec,
    /// Anything else: JSON only.
    Other,
}

impl BodyType {
    /// Classifies a type by its last path segment.
    pub fn of(ty: &Type) -> Self {
        let Type::Path(type_path) = ty else {
            return Self::Other;
        };
        if type_path.qself.is_some() {
            return Self::Other;
        }
        let Some(segment) = type_path.path.segments.last() else {
            return Self::Other;
        };

        match &segment.arguments {
            PathArguments::None if segment.ident == "Bytes" => Self::Bytes,
            PathArguments::AngleBracketed(args) if segment.ident == "Vec" && args.args.len() == 1 => {
                match args.args.first() {
                    Some(GenericArgument::Type(Type::Path(inner))) if inner.path.is_ident("u8") => {
                        Self::ByteVec
                    }
                    _ => Self::Other,
                }
            }
            _ => Self::Other,
        }
    }

    /// Returns `true` if the payload can be stored verbatim.
    pub fn is_raw(self) -> bool {
        matches!(self, Self::Bytes | Self::ByteVec)
    }

    /// Returns `true` if the type can be decoded from JSON.
    pub fn is_json(self) -> bool {
        !matches!(self, Self::Bytes)
    }
}

/// Returns `T` when `ty` is spelled `Option<T>`.
pub fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    if type_path.qself.is_some() {
        return None;
    }
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) if args.args.len() == 1 => match args.args.first() {
            Some(GenericArgument::Type(inner)) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

/// One named field of the record.
#[derive(Debug)]
pub struct RecordField {
    pub ident: Ident,
    pub name: String,
    pub ty: Type,
    pub index: usize,
    pub attrs: BindAttrs,
}

impl RecordField {
    /// Returns `true` for the field that receives the request payload.
    pub fn is_body(&self) -> bool {
        self.name == BODY_FIELD
    }
}

/// A struct that `Bind` is being derived for.
#[derive(Debug)]
pub struct RecordInput {
    pub ident: Ident,
    pub generics: Generics,
    pub fields: Vec<RecordField>,
}

impl RecordInput {
    /// Validates the derive input and collects its fields.
    pub fn parse(input: DeriveInput) -> syn::Result<Self> {
        let named = match input.data {
            Data::Struct(data) => match data.fields {
                Fields::Named(named) => named,
                other => {
                    return Err(syn::Error::new(
                        other.span(),
                        "Bind requires a struct with named fields",
                    ))
                }
            },
            Data::Enum(data) => {
                return Err(syn::Error::new(
                    data.enum_token.span(),
                    "Bind cannot be derived for enums",
                ))
            }
            Data::Union(data) => {
                return Err(syn::Error::new(
                    data.union_token.span(),
                    "Bind cannot be derived for unions",
                ))
            }
        };

        let fields = named
            .named
            .into_iter()
            .enumerate()
            .map(|(index, field)| {
                let ident = field
                    .ident
                    .ok_or_else(|| syn::Error::new(field.ty.span(), "expected a named field"))?;
                Ok(RecordField {
                    name: ident.unraw().to_string(),
                    attrs: BindAttrs::from_attributes(&field.attrs)?,
                    ident,
                    ty: field.ty,
                    index,
                })
            })
            .collect::<syn::Result<Vec<_>>>()?;

        Ok(Self {
            ident: input.ident,
            generics: input.generics,
            fields,
        })
    }
}
