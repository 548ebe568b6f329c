pub mod report;
pub mod scan;

use colored::Colorize;

pub fn print_banner() {
    let banner = r#"
        _ __                  __
  _____(_) /____ _   _____  / /_
 / ___/ / __/ _ \ | / / _ \/ __/
(__  ) / /_/  __/ |/ /  __/ /_
/____/_/\__/\___/|___/\___/\__/
"#;
    println!("{}", banner.cyan());
    println!(
        "{}",
        "  lightweight web application scanner - authorized testing only\n".dimmed()
    );
}
