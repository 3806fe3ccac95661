//! Entry point for the WASM application

fn main() {
    sitetester_web::mount();
}
