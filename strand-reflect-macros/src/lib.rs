//! Proc-macro crate for strand-reflect.
//!
//! Provides `#[derive(Reflect)]` for field descriptors and
//! `#[reflect_methods]` for method descriptors. Generated code names the
//! runtime crate through whichever dependency the caller has: `strand-reflect`
//! directly (possibly renamed), or the `strand` umbrella, which re-exports it.

use std::collections::HashSet;

use proc_macro::TokenStream;
use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::{Span, TokenStream as TokenStream2, TokenTree};
use quote::{ToTokens, format_ident, quote};
use syn::spanned::Spanned;
use syn::{
    Attribute, Data, DeriveInput, Fields, FnArg, ImplItem, ItemImpl, LitStr, ReturnType, Type,
};

/// Derive field descriptors for a struct with named fields.
///
/// Field order is declaration order. Supported attributes:
///
/// - `#[reflect(name = "...")]` on the struct overrides the class name.
/// - `#[reflect(rename = "...")]` on a field overrides its reflected name.
/// - `#[reflect(skip)]` on a field leaves it out entirely.
///
/// ```ignore
/// #[derive(Reflect)]
/// struct Player {
///     health: i32,
///     speed: f32,
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);

    match expand_derive(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Derive method descriptors from an inherent `impl` block.
///
/// Every method taking `&self` or `&mut self` is described, in declaration
/// order. Associated functions without a receiver are left alone. Methods
/// accept `#[reflect(rename = "...")]` and `#[reflect(skip)]`.
///
/// ```ignore
/// #[reflect_methods]
/// impl Player {
///     #[reflect(rename = "TakeDamage")]
///     fn take_damage(&mut self, amount: i32) {
///         self.health -= amount;
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn reflect_methods(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        let attr = TokenStream2::from(attr);
        return syn::Error::new_spanned(attr, "#[reflect_methods] takes no arguments")
            .to_compile_error()
            .into();
    }
    let item = syn::parse_macro_input!(item as ItemImpl);

    match expand_methods(item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

// Parsed `#[reflect(...)]` options.
#[derive(Default)]
struct ReflectAttr {
    name: Option<LitStr>,
    rename: Option<LitStr>,
    skip: bool,
}

fn parse_reflect_attrs(attrs: &[Attribute]) -> syn::Result<ReflectAttr> {
    let mut out = ReflectAttr::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("reflect")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                out.skip = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                out.rename = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("name") {
                out.name = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unknown reflect attribute; expected `name`, `rename` or `skip`"))
            }
        })?;
    }
    Ok(out)
}

// Path to the runtime crate as seen from the crate being expanded.
fn runtime_path() -> TokenStream2 {
    let ident = |name: &str| syn::Ident::new(&name.replace('-', "_"), Span::call_site());
    match crate_name("strand-reflect") {
        // `strand-reflect` declares `extern crate self as strand_reflect`.
        Ok(FoundCrate::Itself) => quote! { ::strand_reflect },
        Ok(FoundCrate::Name(name)) => {
            let name = ident(&name);
            quote! { ::#name }
        }
        Err(_) => match crate_name("strand") {
            Ok(FoundCrate::Itself) => quote! { crate::strand_reflect },
            Ok(FoundCrate::Name(name)) => {
                let name = ident(&name);
                quote! { ::#name::strand_reflect }
            }
            Err(_) => quote! { ::strand_reflect },
        },
    }
}

fn name_type(krate: &TokenStream2, name: &str) -> TokenStream2 {
    quote! { #krate::Name<{ #krate::name_hash(#name) }> }
}

// Tracks reflected names so a duplicate is reported where it is declared.
struct NameSet {
    kind: &'static str,
    seen: HashSet<String>,
}

impl NameSet {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            seen: HashSet::new(),
        }
    }

    fn insert(&mut self, name: &str, span: proc_macro2::Span) -> syn::Result<()> {
        if self.seen.insert(name.to_string()) {
            Ok(())
        } else {
            Err(syn::Error::new(
                span,
                format!("duplicate reflected {} name `{name}`", self.kind),
            ))
        }
    }
}

fn expand_derive(input: DeriveInput) -> syn::Result<TokenStream2> {
    expand_derive_with(input, &runtime_path())
}

fn expand_derive_with(input: DeriveInput, krate: &TokenStream2) -> syn::Result<TokenStream2> {
    let ident = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(Reflect)] does not support generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    ident,
                    "#[derive(Reflect)] requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                ident,
                "#[derive(Reflect)] only supports structs",
            ));
        }
    };

    let container = parse_reflect_attrs(&input.attrs)?;
    if let Some(rename) = &container.rename {
        return Err(syn::Error::new_spanned(
            rename,
            "use `name = \"...\"` to rename the struct",
        ));
    }
    let class_name = container
        .name
        .map(|lit| lit.value())
        .unwrap_or_else(|| ident.to_string());

    let mut names = NameSet::new("field");
    let mut field_names = Vec::new();
    let mut visit_calls = Vec::new();
    let mut visit_mut_calls = Vec::new();
    let mut descriptors = Vec::new();

    for field in fields {
        let opts = parse_reflect_attrs(&field.attrs)?;
        if opts.skip {
            continue;
        }
        if let Some(name) = &opts.name {
            return Err(syn::Error::new_spanned(
                name,
                "use `rename = \"...\"` on fields",
            ));
        }
        let Some(member) = &field.ident else {
            continue;
        };
        let reflected = opts
            .rename
            .as_ref()
            .map(LitStr::value)
            .unwrap_or_else(|| member.to_string());
        names.insert(&reflected, field.span())?;

        let index = field_names.len();
        let ty = replace_self(field.ty.to_token_stream(), &ident.to_token_stream());
        let name_ty = name_type(krate, &reflected);

        visit_calls.push(quote! { f(#reflected, &self.#member); });
        visit_mut_calls.push(quote! { f(#reflected, &mut self.#member); });
        descriptors.push(quote! {
            impl #krate::FieldAt<#index> for #ident {
                type Value = #ty;
                const INFO: #krate::FieldInfo<Self, #ty> = {
                    fn get(owner: &#ident) -> &#ty {
                        &owner.#member
                    }
                    fn get_mut(owner: &mut #ident) -> &mut #ty {
                        &mut owner.#member
                    }
                    #krate::FieldInfo::new(#reflected, #index, get, get_mut)
                };
            }

            impl #krate::FieldNamed<#name_ty> for #ident {
                type Value = #ty;
                const INFO: #krate::FieldInfo<Self, #ty> =
                    <Self as #krate::FieldAt<#index>>::INFO;
            }
        });
        field_names.push(reflected);
    }

    Ok(quote! {
        impl #krate::Reflect for #ident {
            const CLASS_NAME: &'static str = #class_name;
            const FIELD_NAMES: &'static [&'static str] = &[#(#field_names),*];

            #[allow(unused_variables)]
            fn for_each_field(
                &self,
                f: &mut dyn FnMut(&'static str, &dyn ::core::any::Any),
            ) {
                #(#visit_calls)*
            }

            #[allow(unused_variables)]
            fn for_each_field_mut(
                &mut self,
                f: &mut dyn FnMut(&'static str, &mut dyn ::core::any::Any),
            ) {
                #(#visit_mut_calls)*
            }
        }

        #(#descriptors)*
    })
}

// Descriptor bodies are nested fns, where `Self` is not in scope.
fn replace_self(tokens: TokenStream2, self_ty: &TokenStream2) -> TokenStream2 {
    tokens
        .into_iter()
        .flat_map(|tt| match tt {
            TokenTree::Ident(ident) if ident == "Self" => self_ty.clone(),
            TokenTree::Group(g) => {
                let mut group =
                    proc_macro2::Group::new(g.delimiter(), replace_self(g.stream(), self_ty));
                group.set_span(g.span());
                TokenTree::Group(group).into_token_stream()
            }
            other => other.into_token_stream(),
        })
        .collect()
}

// Any `&` or lifetime inside a type would need a lifetime on the
// descriptor's associated types.
fn contains_borrow(tokens: TokenStream2) -> bool {
    tokens.into_iter().any(|tt| match tt {
        TokenTree::Punct(p) => p.as_char() == '&' || p.as_char() == '\'',
        TokenTree::Group(g) => contains_borrow(g.stream()),
        _ => false,
    })
}

fn expand_methods(item: ItemImpl) -> syn::Result<TokenStream2> {
    expand_methods_with(item, &runtime_path())
}

fn expand_methods_with(mut item: ItemImpl, krate: &TokenStream2) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[reflect_methods] applies to inherent impl blocks only",
        ));
    }
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "#[reflect_methods] does not support generic impl blocks",
        ));
    }
    let self_ty = item.self_ty.to_token_stream();
    if contains_borrow(self_ty.clone()) {
        return Err(syn::Error::new_spanned(
            &self_ty,
            "#[reflect_methods] requires a type without lifetimes",
        ));
    }

    let mut names = NameSet::new("method");
    let mut method_names = Vec::new();
    let mut descriptors = Vec::new();

    for impl_item in &mut item.items {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };
        let opts = parse_reflect_attrs(&method.attrs)?;
        method.attrs.retain(|a| !a.path().is_ident("reflect"));
        if opts.skip {
            continue;
        }
        if let Some(name) = &opts.name {
            return Err(syn::Error::new_spanned(
                name,
                "use `rename = \"...\"` on methods",
            ));
        }

        let sig = &method.sig;
        let Some(receiver) = sig.receiver() else {
            continue;
        };
        // `&self` and `self: &Self` both carry a reference type here.
        if !matches!(*receiver.ty, Type::Reference(_)) {
            return Err(syn::Error::new_spanned(
                receiver,
                "reflected methods must take `&self` or `&mut self`; add #[reflect(skip)]",
            ));
        }
        if let Some(asyncness) = &sig.asyncness {
            return Err(syn::Error::new_spanned(
                asyncness,
                "async methods cannot be reflected; add #[reflect(skip)]",
            ));
        }
        if !sig.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &sig.generics,
                "generic methods cannot be reflected; add #[reflect(skip)]",
            ));
        }

        let mut arg_idents = Vec::new();
        let mut arg_tys = Vec::new();
        for input in &sig.inputs {
            let FnArg::Typed(pat_type) = input else {
                continue;
            };
            let ty = pat_type.ty.as_ref();
            if contains_borrow(ty.to_token_stream()) || matches!(ty, Type::ImplTrait(_)) {
                return Err(syn::Error::new_spanned(
                    ty,
                    "reflected method parameters must be owned types",
                ));
            }
            arg_idents.push(format_ident!("arg{}", arg_idents.len()));
            arg_tys.push(replace_self(ty.to_token_stream(), &self_ty));
        }

        let output = match &sig.output {
            ReturnType::Default => quote! { () },
            ReturnType::Type(_, ty) => {
                if contains_borrow(ty.to_token_stream()) || matches!(**ty, Type::ImplTrait(_)) {
                    return Err(syn::Error::new_spanned(
                        ty,
                        "reflected methods must return an owned type",
                    ));
                }
                replace_self(ty.to_token_stream(), &self_ty)
            }
        };

        let fn_ident = &sig.ident;
        let reflected = opts
            .rename
            .as_ref()
            .map(LitStr::value)
            .unwrap_or_else(|| fn_ident.to_string());
        names.insert(&reflected, fn_ident.span())?;

        let index = method_names.len();
        let name_ty = name_type(krate, &reflected);
        let args_ty = quote! { (#(#arg_tys,)*) };

        descriptors.push(quote! {
            impl #krate::MethodAt<#index> for #self_ty {
                type Args = #args_ty;
                type Output = #output;
                const INFO: #krate::MethodInfo<Self, #args_ty, #output> = {
                    fn call(owner: &mut #self_ty, (#(#arg_idents,)*): #args_ty) -> #output {
                        owner.#fn_ident(#(#arg_idents),*)
                    }
                    #krate::MethodInfo::new(#reflected, #index, call)
                };
            }

            impl #krate::MethodNamed<#name_ty> for #self_ty {
                type Args = #args_ty;
                type Output = #output;
                const INFO: #krate::MethodInfo<Self, #args_ty, #output> =
                    <Self as #krate::MethodAt<#index>>::INFO;
            }
        });
        method_names.push(reflected);
    }

    Ok(quote! {
        #item

        impl #krate::ReflectMethods for #self_ty {
            const METHOD_NAMES: &'static [&'static str] = &[#(#method_names),*];
        }

        #(#descriptors)*
    })
}
