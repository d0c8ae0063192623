// Build script for cmdforgectl - embeds version at compile time

fn main() {
    // Release builds may stamp a version; otherwise use Cargo.toml
    let version = std::env::var("CMDFORGE_VERSION")
        .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=CMDFORGE_VERSION={}", version);

    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-env-changed=CMDFORGE_VERSION");
}
