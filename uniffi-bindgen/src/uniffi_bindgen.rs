//! Generates Swift and Kotlin bindings for the `kyckit` library.

fn main() {
    uniffi::uniffi_bindgen_main();
}
