use std::io::{self, Write};

use indicatif::{ProgressBar, ProgressStyle};

const RULE: &str = "=====================================================";

pub fn write_banner(out: &mut dyn Write, title: &str, num_conditions: usize) -> io::Result<()> {
    writeln!(out, "{RULE}")?;
    writeln!(out, "{title}")?;
    writeln!(out, "Number of wind conditions to optimize = {num_conditions}")?;
    writeln!(out, "{RULE}")?;
    out.flush()
}

pub fn create_progress_bar(total_conditions: usize) -> ProgressBar {
    let pb = ProgressBar::new(total_conditions as u64);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} wind conditions ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}
