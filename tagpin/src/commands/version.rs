/// Get the version string for tagpin and libtagpin
pub fn get_version_string() -> String {
    format!(
        "tagpin {}\nlibtagpin {}",
        env!("CARGO_PKG_VERSION"),
        libtagpin::version()
    )
}

/// Print version information to stdout
pub fn print_version() {
    println!("{}", get_version_string());
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
