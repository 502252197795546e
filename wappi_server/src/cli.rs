use std::env;

const README: &str = include_str!("./cli-help.txt");

// Only settings that are safe to print. Keys and the database URL stay out of this list.
const DISPLAY_ENVS: [&str; 8] = [
    "RUST_LOG",
    "WAPPI_HOST",
    "WAPPI_PORT",
    "WAPPI_FRONTEND_URL",
    "WAPPI_HUB_BUFFER_SIZE",
    "WAPPI_CLIENT_BUFFER_SIZE",
    "WAPPI_USE_X_FORWARDED_FOR",
    "WAPPI_JWT_VERIFICATION_KEY",
];

/// The server takes no arguments, so any argument at all is a request for help. Returns true if help was printed.
pub fn handle_command_line_args() -> bool {
    let wants_help = env::args().count() > 1;
    if wants_help {
        println!("\n{README}\n");
        println!("Current environment values (EXCLUDING variables that contain secrets):");
        for name in DISPLAY_ENVS {
            println!("  {name:<35} {:<15}", describe_env(name));
        }
    }
    wants_help
}

fn describe_env(name: &str) -> String {
    match env::var_os(name) {
        None => "Not set".into(),
        Some(value) => match value.into_string() {
            Ok(s) => s,
            Err(raw) => format!("Invalid value: {}", raw.to_string_lossy()),
        },
    }
}
