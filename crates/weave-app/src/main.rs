//! Main application entry point (native).

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
fn main() {
    env_logger::init();
    log::info!("Starting Weave");

    if let Err(e) = pollster::block_on(weave_app::App::run()) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(not(all(feature = "native", not(target_arch = "wasm32"))))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
