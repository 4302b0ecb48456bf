//! Command-line definitions for the anketa binary.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "anketa — survey analytics assistant")]
pub struct Args {
    /// Path to the survey export (.csv or an Excel workbook)
    pub path: PathBuf,

    /// The message to handle, as the bot transport would deliver it
    #[arg(required = true)]
    pub text: Vec<String>,

    /// Excel worksheet to read (name or zero-based index)
    #[arg(long = "sheet")]
    pub sheet: Option<String>,

    /// Path to a TOML config file (defaults to the platform config dir)
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Directory for rendered chart images
    #[arg(long = "charts-dir", default_value = "charts")]
    pub charts_dir: PathBuf,
}

impl Args {
    /// The message text, with multi-word input joined back together.
    pub fn message(&self) -> String {
        self.text.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_path_message_and_options() {
        let args = Args::try_parse_from([
            "anketa",
            "--sheet",
            "Ответы на форму",
            "ответы.xlsx",
            "быстрый",
            "анализ",
        ])
        .unwrap();
        assert_eq!(args.path, PathBuf::from("ответы.xlsx"));
        assert_eq!(args.message(), "быстрый анализ");
        assert_eq!(args.sheet.as_deref(), Some("Ответы на форму"));
        assert_eq!(args.charts_dir, PathBuf::from("charts"));
    }

    #[test]
    fn message_is_required() {
        assert!(Args::try_parse_from(["anketa", "data.csv"]).is_err());
    }
}
