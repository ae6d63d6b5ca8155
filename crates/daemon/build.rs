// Embedded migrations are read at compile time
fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
