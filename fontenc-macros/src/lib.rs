#[allow(unused_extern_crates)]
extern crate proc_macro;

use std::path::Path;

use proc_macro::TokenStream;
use quote::quote;

fn fixture_path(args: &syn::AttributeArgs) -> Result<String, syn::Error> {
    match args.first() {
        Some(syn::NestedMeta::Lit(syn::Lit::Str(path))) if args.len() == 1 => Ok(path.value()),
        Some(syn::NestedMeta::Lit(other)) => Err(syn::Error::new_spanned(
            other,
            "Unsupported attribute type inside the macro",
        )),
        _ => Err(syn::Error::new(
            proc_macro2::Span::call_site(),
            "expected the path of an encoding fixture as the only argument",
        )),
    }
}

fn convert(
    mut input: syn::ItemFn,
    args: syn::AttributeArgs,
) -> Result<proc_macro2::TokenStream, syn::Error> {
    let path = fixture_path(&args)?;
    let expected_path = Path::new(&path)
        .with_extension("json")
        .to_string_lossy()
        .into_owned();

    let (pat, ty) = match input.sig.inputs.first() {
        Some(syn::FnArg::Typed(arg)) => (arg.pat.clone(), arg.ty.clone()),
        other => {
            return Err(syn::Error::new_spanned(
                other,
                "the test function must accept the encodings as its only argument",
            ))
        }
    };

    let sig = &mut input.sig;
    sig.inputs = syn::punctuated::Punctuated::new();
    let body = &input.block;
    let attrs = &input.attrs;
    let vis = &input.vis;

    Ok(quote! {
        #[test]
        #(#attrs)*
        #vis #sig {
            let mut path = std::path::PathBuf::from("./tests/");
            path.push(#path);
            path.set_extension("result.json");

            let encodings: fontenc::Encodings = fontenc::interpret(include_str!(#path))
                .expect("Error interpreting encoding fixture");

            let result = serde_json::to_string_pretty(&encodings)
                .expect("Error serializing encodings");
            std::fs::write(&path, result).expect("Error writing result file");

            let expected: fontenc::Encodings = serde_json::from_str(include_str!(#expected_path))
                .expect("Error parsing expected encodings");
            pretty_assertions::assert_eq!(
                encodings, expected,
                "Interpreted encodings do not match expected ones"
            );

            {
                let #pat: #ty = &encodings;
                #body
            }
        }
    })
}

/// Turns a function taking `&fontenc::Encodings` into a test that interprets the given encoding
/// fixture (relative to the `tests` directory) and compares the result against the `.json` file of
/// the same name. The interpreted encodings are also written to `<name>.result.json` to ease
/// updating fixtures.
#[proc_macro_attribute]
pub fn fixture_test(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as syn::ItemFn);
    let args = syn::parse_macro_input!(args as syn::AttributeArgs);

    for attr in &input.attrs {
        if attr.path.is_ident("test") {
            let msg = "second test attribute is supplied";
            return syn::Error::new_spanned(&attr, msg)
                .to_compile_error()
                .into();
        }
    }

    if input.sig.inputs.len() != 1 {
        let msg = "the test function must accept the encodings as its only argument";
        return syn::Error::new_spanned(&input.sig.inputs, msg)
            .to_compile_error()
            .into();
    }

    convert(input, args)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
