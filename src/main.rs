// This binary crate is intentionally minimal.
// All matrix and training logic lives in the library (src/lib.rs and its modules).
// Run demos with:
//   cargo run --example xor
//   cargo run --example adder4
fn main() {
    println!("hematite-nn: a from-scratch dense-matrix and neural network training engine.");
    println!("Run `cargo run --example xor` or `cargo run --example adder4` for demos.");
}
