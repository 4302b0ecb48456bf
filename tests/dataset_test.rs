use anketa::config::BotConfig;
use anketa::dataset::Dataset;
use anketa::resolver;
use color_eyre::Result;
use std::io::Write;

#[test]
fn csv_snapshot_preserves_order_and_missing_cells() -> Result<()> {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
    writeln!(file, "Отметка времени,Укажите ваш пол.,Укажите ваш возраст.")?;
    writeln!(file, "2024-05-01,Мужской,25 лет")?;
    writeln!(file, "2024-05-02,Женский,")?;
    writeln!(file, "2024-05-03,,30")?;
    file.flush()?;

    let dataset = Dataset::load(file.path(), None)?;
    assert_eq!(
        dataset.columns(),
        &[
            "Отметка времени".to_string(),
            "Укажите ваш пол.".to_string(),
            "Укажите ваш возраст.".to_string(),
        ]
    );
    assert_eq!(dataset.len(), 3);
    assert_eq!(
        dataset.column("Укажите ваш пол.").unwrap(),
        vec![Some("Мужской"), Some("Женский"), None]
    );
    assert_eq!(
        dataset.numeric_column("Укажите ваш возраст.").unwrap(),
        vec![25.0, 30.0]
    );
    Ok(())
}

#[test]
fn unknown_extension_is_an_error() {
    let err = Dataset::load(std::path::Path::new("answers.parquet"), None);
    assert!(err.is_err());
}

#[test]
fn csv_snapshot_resolves_with_default_config() -> Result<()> {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
    writeln!(file, "Укажите ваш пол.,Укажите ваш возраст.")?;
    writeln!(file, "Мужской,25")?;
    writeln!(file, "Женский,30")?;
    file.flush()?;

    let dataset = Dataset::load(file.path(), None)?;
    let config = BotConfig::default();
    // A keyword buried in running text resolves to its canonical column.
    assert_eq!(
        resolver::resolve("посчитай гендерный состав", &dataset, &config),
        Some("Укажите ваш пол.")
    );
    assert_eq!(
        resolver::resolve("статистика по возрасту", &dataset, &config),
        Some("Укажите ваш возраст.")
    );
    Ok(())
}
