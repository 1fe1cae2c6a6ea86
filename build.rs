fn main() {
    // Keep `check-cfg` happy even when `tauri_build::build()` is skipped below.
    println!("cargo:rustc-check-cfg=cfg(desktop)");
    println!("cargo:rustc-check-cfg=cfg(mobile)");

    // `tauri_build::build()` expects the `tauri` crate to be present and reads env
    // vars it exports (e.g. `DEP_TAURI_DEV`). Core-only unit test builds
    // (`--no-default-features`) leave the Tauri runtime stack out entirely, so the
    // build helpers have to be skipped there.
    if std::env::var_os("CARGO_FEATURE_APP").is_some() {
        tauri_build::build()
    }
}
