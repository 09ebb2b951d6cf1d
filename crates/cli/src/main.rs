// Copyright 2025 AMX Perf Contributors
// SPDX-License-Identifier: Apache-2.0

//! AMX Perf CLI entry point.

fn main() {
    if let Err(e) = amx_perf_cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
