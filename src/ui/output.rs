//! Build log formatting
//!
//! Lines go to stdout, which the lifecycle captures as the build log.

use crate::config::schema::BuildpackInfo;
use console::style;

/// Buildpack banner printed once per phase
pub fn title(info: &BuildpackInfo) {
    println!();
    println!(
        "{} {}",
        style(&info.name).cyan().bold(),
        style(&info.version).cyan()
    );
    if let Some(homepage) = &info.homepage {
        println!("  {}", style(homepage).dim());
    }
}

/// Section header, indented under the title
pub fn header(message: &str) {
    println!("  {}", style(message).bold());
}

/// Detail line under a header
pub fn body(message: &str) {
    for line in message.lines() {
        println!("    {}", line);
    }
}

/// Warning detail line
pub fn warn(message: &str) {
    println!("    {} {}", style("[WARN]").yellow(), message);
}
