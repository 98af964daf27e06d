//! Benchmark harness crate for ballast.
//!
//! Holds no library code of its own — the criterion benchmarks live in
//! `benches/`. Run them with `cargo bench -p ballast-bench`.
