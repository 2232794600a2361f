//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `retain_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("retain_core ping={}", retain_core::ping());
    println!("retain_core version={}", retain_core::core_version());
}
