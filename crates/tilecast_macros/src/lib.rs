use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, Pat};

/// Time a frame system when the `perf_stats` feature is enabled.
///
/// Wraps the function body in a guard that logs the elapsed time when the
/// guard drops. Expands to the untouched function when `perf_stats` is off.
///
/// # Features
/// - Auto-detects a `frame: Res<FrameCount>` parameter and then also logs
///   every 100th frame regardless of duration
/// - Logs through Bevy's `info!`
///
/// # Example
/// ```ignore
/// #[profile]
/// pub fn render_view(
///     mut framebuffer: ResMut<FrameBuffer>,
///     frame: Res<FrameCount>,  // Auto-detected!
/// ) {
///     // ... work ...
/// }
/// ```
///
/// # Optional Parameters
/// ```ignore
/// #[profile(2)]  // Custom threshold in milliseconds
/// pub fn upload_front_page() { ... }
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_ms: u128 = if attr.is_empty() {
        1
    } else {
        attr.to_string().parse().unwrap_or(1)
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let fn_name_str = sig.ident.to_string();

    // Looking for `frame: Res<FrameCount>`
    let has_frame_param = sig.inputs.iter().any(|arg| {
        if let FnArg::Typed(pat_type) = arg {
            if let Pat::Ident(pat_ident) = &*pat_type.pat {
                if pat_ident.ident == "frame" {
                    let ty = &pat_type.ty;
                    let type_str = quote!(#ty).to_string();
                    return type_str.contains("FrameCount");
                }
            }
        }
        false
    });

    let profile_guard_def = if has_frame_param {
        quote! {
            struct ProfileGuard {
                name: &'static str,
                start: std::time::Instant,
                frame_value: u32,
            }
            impl Drop for ProfileGuard {
                fn drop(&mut self) {
                    let elapsed = self.start.elapsed();
                    if elapsed.as_millis() > #threshold_ms || (self.frame_value % 100 == 0) {
                        bevy::prelude::info!("[PERF] {} (frame {}): {:?}", self.name, self.frame_value, elapsed);
                    }
                }
            }
            ProfileGuard {
                name: #fn_name_str,
                start: std::time::Instant::now(),
                frame_value: frame.0,
            }
        }
    } else {
        quote! {
            struct ProfileGuard {
                name: &'static str,
                start: std::time::Instant,
            }
            impl Drop for ProfileGuard {
                fn drop(&mut self) {
                    let elapsed = self.start.elapsed();
                    if elapsed.as_millis() > #threshold_ms {
                        bevy::prelude::info!("[PERF] {}: {:?}", self.name, elapsed);
                    }
                }
            }
            ProfileGuard {
                name: #fn_name_str,
                start: std::time::Instant::now(),
            }
        }
    };

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_timer = {
                #profile_guard_def
            };

            #block
        }
    };

    output.into()
}
