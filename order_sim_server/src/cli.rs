use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Only list variables known to be safe to print
    const DISPLAY_ENVS: [&str; 17] = [
        "RUST_LOG",
        "OSIM_HOST",
        "OSIM_PORT",
        "OSIM_BROKER",
        "OSIM_BROKER_QUEUE_SIZE",
        "OSIM_SCHEDULER_ENABLED",
        "OSIM_SCHEDULER_INTERVAL_SECS",
        "OSIM_ORDERS_PER_BATCH",
        "OSIM_SCHEDULER_BUSINESS_ID",
        "OSIM_SCHEDULER_STATUS",
        "OSIM_INCLUDE_PAYMENT",
        "OSIM_INCLUDE_SHIPMENT",
        "OSIM_TEST_BUSINESS_ID",
        "OSIM_MARKETPLACE_INTEGRATION_ID",
        "OSIM_HOSTED_INTEGRATION_ID",
        "OSIM_STOREFRONT_INTEGRATION_ID",
        "OSIM_GENERATOR_SEED",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
