use std::{env, env::VarError};

/// The server takes no arguments. Any argument prints the help text and the current configuration instead.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
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
    // Only variables that never hold secrets
    const DISPLAY_ENVS: [&str; 13] = [
        "RUST_LOG",
        "SALES_HOST",
        "SALES_PORT",
        "SALES_DATABASE_URL",
        "SALES_ARP_BASE_URL",
        "SALES_ARP_MAX_ATTEMPTS",
        "SALES_ARP_TIMEOUT",
        "SALES_SYNC_INTERVAL",
        "SALES_POLL_INTERVAL",
        "SALES_HOUSE_USER_ID",
        "SALES_LOCAL_UTC_OFFSET",
        "SALES_PUSH_BUFFER",
        "SALES_REFRESH_QUEUE",
    ];

    println!("Current environment values:");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
