use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, LitInt, Pat, Signature};

/// Default slow-call threshold in milliseconds.
const DEFAULT_THRESHOLD_MS: u128 = 1;

/// Time a function or Bevy system when the `perf_stats` feature is enabled.
///
/// The body is wrapped in a drop guard that reports the elapsed time through
/// Bevy's `info!` when the call is slower than the threshold. Systems that take
/// a `tick: Res<SimTick>` parameter additionally report every 100th tick so
/// the per-frame cost of the simulation stays visible in the log.
///
/// Without `perf_stats` the guard is compiled out entirely.
///
/// ```ignore
/// #[profile]
/// fn tick_simulation(mut sim: ResMut<Simulation>, tick: Res<SimTick>) { /* ... */ }
///
/// #[profile(4)] // only report calls slower than 4ms
/// fn rebuild_grid() { /* ... */ }
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_ms = if attr.is_empty() {
        DEFAULT_THRESHOLD_MS
    } else {
        match syn::parse::<LitInt>(attr) {
            Ok(lit) => lit.base10_parse::<u128>().unwrap_or(DEFAULT_THRESHOLD_MS),
            Err(err) => return err.to_compile_error().into(),
        }
    };

    let ItemFn { attrs, vis, sig, block } = input;
    let name = sig.ident.to_string();
    let guard = build_guard(&name, threshold_ms, takes_sim_tick(&sig));

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_guard = { #guard };

            #block
        }
    };

    output.into()
}

/// True when the signature has a `tick` argument whose type mentions `SimTick`.
fn takes_sim_tick(sig: &Signature) -> bool {
    sig.inputs.iter().any(|arg| {
        let FnArg::Typed(pat_type) = arg else {
            return false;
        };
        let Pat::Ident(pat_ident) = pat_type.pat.as_ref() else {
            return false;
        };
        let ty = &pat_type.ty;
        pat_ident.ident == "tick" && quote!(#ty).to_string().contains("SimTick")
    })
}

fn build_guard(name: &str, threshold_ms: u128, with_tick: bool) -> TokenStream2 {
    let (tick_field, tick_init, tick_check) = if with_tick {
        (
            quote! { tick: u64, },
            quote! { tick: tick.0, },
            quote! { || self.tick % 100 == 0 },
        )
    } else {
        (quote! {}, quote! {}, quote! {})
    };

    quote! {
        struct ProfileGuard {
            name: &'static str,
            start: std::time::Instant,
            #tick_field
        }

        impl Drop for ProfileGuard {
            fn drop(&mut self) {
                let elapsed = self.start.elapsed();
                if elapsed.as_millis() > #threshold_ms #tick_check {
                    bevy::prelude::info!("[PERF] {}: {:?}", self.name, elapsed);
                }
            }
        }

        ProfileGuard {
            name: #name,
            start: std::time::Instant::now(),
            #tick_init
        }
    }
}
