use xbito::cli::{internal_error, is_internal, run};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    #[cfg(windows)]
    let _ = enable_ansi_support::enable_ansi_support();

    if let Err(e) = run() {
        if is_internal(&e) {
            // Show error chain if available
            let mut message = e.to_string();
            let mut causes = e.chain().skip(1).peekable();
            if causes.peek().is_some() {
                message.push_str("\n\nCaused by:");
                for (indent, cause) in causes.enumerate() {
                    message.push_str(&format!("\n{:indent$}  {}", "", cause, indent = indent + 1));
                }
            }
            internal_error(&message);
        } else {
            // User error
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
