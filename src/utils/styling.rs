//! Terminal styling for the train command

use console::{style, Emoji};
use std::path::Path;

use crate::pipeline::loader::DataSource;

pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static SEEDLING: Emoji<'_, '_> = Emoji("🌱 ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");

pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {} {}",
        style("agrorisk").green().bold(),
        style(format!("v{}", version)).dim()
    );
    println!(
        "    {}",
        style("Credit risk scoring for sustainable agricultural loans").dim()
    );
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Data source and artifact card
pub fn print_config(source: &DataSource, artifact: &Path, trees: usize) {
    println!(
        "    {} Data:     {}",
        FOLDER,
        truncate_path(&source.path, 40)
    );
    println!("    {} Sheet:    {}", FOLDER, style(&source.sheet).yellow());
    println!("    {} Model:    {}", SAVE, truncate_path(artifact, 40));
    println!(
        "    {} Trees:    {}",
        SEEDLING,
        style(trees).yellow()
    );
    println!();
}

pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        SEEDLING,
        style("Training complete!").green().bold()
    );
    println!();
}

fn truncate_path(path: &Path, max_len: usize) -> String {
    truncate_string(&path.display().to_string(), max_len)
}

/// Keep the tail of long strings, on a char boundary
fn truncate_string(s: &str, max_len: usize) -> String {
    let count = s.chars().count();
    if count <= max_len {
        return s.to_string();
    }
    let tail: String = s.chars().skip(count - max_len + 3).collect();
    format!("...{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("data/AVANCE_BIOCREDITOS", 10), "...REDITOS");
        assert_eq!(truncate_string("ÁÉÍÓÚáéíóú", 6), "...íóú");
    }
}
