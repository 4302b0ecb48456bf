//! Startup configuration: the synonym table, quality metrics and tuning knobs.
//!
//! Everything here is read once at process start and passed by shared reference
//! into the resolver, aggregator and formatter. Nothing mutates it afterwards,
//! so a host that later parallelizes request handling needs no locking.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One entry of the synonym table: a short keyword that identifies a canonical
/// survey question. Table order is the authoritative tie-break when several
/// keywords match the same message.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Synonym {
    pub keyword: String,
    pub column: String,
}

impl Synonym {
    fn new(keyword: &str, column: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            column: column.to_string(),
        }
    }
}

/// A service-quality metric: the survey column it reads and the answer labels
/// counted as favorable.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct QualityMetric {
    pub label: String,
    pub column: String,
    pub positive: Vec<String>,
}

impl QualityMetric {
    fn new(label: &str, column: &str, positive: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            column: column.to_string(),
            positive: positive.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Column-resolution tuning.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
    /// Similarity floor for the fuzzy stage; best matches below it are rejected.
    pub fuzzy_cutoff: f64,
    /// Minimum token length (in characters) for the token-overlap fallback.
    pub min_token_len: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fuzzy_cutoff: 0.3,
            min_token_len: 3,
        }
    }
}

/// Report-formatting tuning.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReportConfig {
    /// Maximum characters per outgoing message; longer reports are split on
    /// line boundaries.
    pub message_limit: usize,
    /// Columns with at most this many distinct values get a full breakdown in
    /// the report; the rest get a top-N breakdown.
    pub inline_breakdown_max: usize,
    /// Breakdown length for columns above `inline_breakdown_max`.
    pub top_breakdown: usize,
    /// Case-insensitive name fragments that mark a column as timestamp-like;
    /// such columns are excluded from reports.
    pub timestamp_markers: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            message_limit: 4000,
            inline_breakdown_max: 4,
            top_breakdown: 3,
            timestamp_markers: vec!["отметка времени".to_string(), "timestamp".to_string()],
        }
    }
}

/// Chart-selection and rendering tuning.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChartConfig {
    /// Categorical columns with at most this many distinct values are drawn
    /// as a pie; above it, as a bar chart.
    pub pie_max_categories: usize,
    /// Histogram bin width for numeric columns.
    pub histogram_bin_width: f64,
    /// Category labels longer than this are truncated with an ellipsis.
    pub label_max_chars: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            pie_max_categories: 4,
            histogram_bin_width: 5.0,
            label_max_chars: 18,
        }
    }
}

/// Hosted-model endpoint settings. The API key never lives in the config
/// file; it comes from the environment.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OracleConfig {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4-1106-preview".to_string(),
            max_tokens: 700,
            temperature: 0.7,
        }
    }
}

/// Full assistant configuration. Deserialized from TOML over the built-in
/// defaults, which reproduce the bank-branch survey deployment.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BotConfig {
    /// Ordered keyword-to-column table; earlier entries win.
    pub synonyms: Vec<Synonym>,
    /// Canonical names of columns summarized numerically (and charted as
    /// histograms) instead of categorically.
    pub numeric_columns: Vec<String>,
    /// Quality metrics for the quick-analysis and quality-rating reports.
    pub quality_metrics: Vec<QualityMetric>,
    /// Issue-resolution rate metric, omitted from reports when absent.
    pub resolution: Option<QualityMetric>,
    /// Recommendation rate metric, omitted from reports when absent.
    pub recommendation: Option<QualityMetric>,
    pub resolver: ResolverConfig,
    pub report: ReportConfig,
    pub chart: ChartConfig,
    pub oracle: OracleConfig,
}

const BANK_COLUMN: &str = "Назовите банк, отделение которого вы посещали недавно.";
const PURPOSE_COLUMN: &str = "С какой целью вы посетили отделение банка?";
const QUEUE_COLUMN: &str = "Сколько времени вы обычно ждете в очереди до получения обслуживания?";
const GENDER_COLUMN: &str = "Укажите ваш пол.";
const AGE_COLUMN: &str = "Укажите ваш возраст.";
const POLITENESS_COLUMN: &str = "Насколько вежливы и доброжелательны сотрудники банка?";
const COMPETENCE_COLUMN: &str = "Как вы оцениваете компетентность сотрудников в решении вопросов?";
const CLARITY_COLUMN: &str =
    "Насколько понятно сотрудники объясняют условия банковских продуктов (кредиты, вклады и т.п.)?";
const CLEANLINESS_COLUMN: &str = "Как вы оцениваете чистоту и комфорт в помещении отделения?";
const INFO_COLUMN: &str =
    "Как вы оцениваете доступность информации о банковских услугах в отделении?";
const TERMINAL_COLUMN: &str = "Удобно ли вам пользоваться электронными терминалами или приложением?";
const PROBLEMS_COLUMN: &str = "Были ли у вас случаи, когда ваш вопрос не решился?";
const RECOMMEND_COLUMN: &str = "Порекомендовали бы вы это отделение банка своим друзьям и знакомым?";
const LOCATION_COLUMN: &str = "Как вы оцениваете удобство расположения отделения банка?";

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            synonyms: vec![
                Synonym::new("тип обращения", PURPOSE_COLUMN),
                Synonym::new("цель", PURPOSE_COLUMN),
                Synonym::new("очередь", QUEUE_COLUMN),
                Synonym::new("банк", BANK_COLUMN),
                Synonym::new("отделение", BANK_COLUMN),
                Synonym::new("расположение", LOCATION_COLUMN),
                Synonym::new("вежливость", POLITENESS_COLUMN),
                Synonym::new("компетентность", COMPETENCE_COLUMN),
                Synonym::new("доступность", INFO_COLUMN),
                Synonym::new("терминал", TERMINAL_COLUMN),
                Synonym::new("рекомендация", RECOMMEND_COLUMN),
                Synonym::new("понятно", CLARITY_COLUMN),
                Synonym::new("чистота", CLEANLINESS_COLUMN),
                Synonym::new("проблем", PROBLEMS_COLUMN),
                Synonym::new("жалоб", PROBLEMS_COLUMN),
                Synonym::new("пол", GENDER_COLUMN),
                Synonym::new("gender", GENDER_COLUMN),
                Synonym::new("гендер", GENDER_COLUMN),
                Synonym::new("возраст", AGE_COLUMN),
            ],
            numeric_columns: vec![AGE_COLUMN.to_string()],
            quality_metrics: vec![
                QualityMetric::new(
                    "Вежливость сотрудников",
                    POLITENESS_COLUMN,
                    &["Очень вежливы", "Вежливы"],
                ),
                QualityMetric::new(
                    "Компетентность сотрудников",
                    COMPETENCE_COLUMN,
                    &["Высокая", "Очень высокая"],
                ),
                QualityMetric::new(
                    "Понятность объяснений",
                    CLARITY_COLUMN,
                    &["Очень понятно", "Понятно"],
                ),
                QualityMetric::new(
                    "Чистота и комфорт",
                    CLEANLINESS_COLUMN,
                    &["Отлично", "Хорошо"],
                ),
                QualityMetric::new(
                    "Доступность информации",
                    INFO_COLUMN,
                    &["Очень доступна", "Доступна"],
                ),
                QualityMetric::new(
                    "Удобство терминалов",
                    TERMINAL_COLUMN,
                    &["Очень удобно", "Удобно"],
                ),
            ],
            resolution: Some(QualityMetric::new(
                "Успешность решения вопросов",
                PROBLEMS_COLUMN,
                &["Нет, все вопросы решены"],
            )),
            recommendation: Some(QualityMetric::new(
                "Готовность рекомендовать",
                RECOMMEND_COLUMN,
                &["Определенно да", "Скорее да"],
            )),
            resolver: ResolverConfig::default(),
            report: ReportConfig::default(),
            chart: ChartConfig::default(),
            oracle: OracleConfig::default(),
        }
    }
}

impl BotConfig {
    /// Looks up the canonical column a keyword maps to, regardless of whether
    /// the column exists in any particular snapshot.
    pub fn synonym_target(&self, keyword: &str) -> Option<&str> {
        self.synonyms
            .iter()
            .find(|s| s.keyword == keyword)
            .map(|s| s.column.as_str())
    }

    /// Whether a column is summarized numerically rather than categorically.
    pub fn is_numeric_column(&self, column: &str) -> bool {
        self.numeric_columns.iter().any(|c| c == column)
    }

    /// Whether a column name marks it as timestamp-like (excluded from reports).
    pub fn is_timestamp_column(&self, column: &str) -> bool {
        let lower = column.to_lowercase();
        self.report
            .timestamp_markers
            .iter()
            .any(|m| lower.contains(&m.to_lowercase()))
    }

    /// Parses a config from TOML text layered over the defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Default config file location: `<platform config dir>/anketa/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| eyre!("Could not determine config directory"))?;
        Ok(dir.join("anketa").join("config.toml"))
    }

    /// Loads the configuration. An explicit path must exist; the default
    /// location is optional and falls back to the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                let text = std::fs::read_to_string(p)
                    .map_err(|e| eyre!("Failed to read config {}: {}", p.display(), e))?;
                Self::from_toml_str(&text)
            }
            None => {
                let default = Self::default_path()?;
                if default.exists() {
                    let text = std::fs::read_to_string(&default)?;
                    Self::from_toml_str(&text)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_synonym_table_is_ordered() {
        let config = BotConfig::default();
        // "тип обращения" must stay ahead of "цель": both map to the purpose
        // column and earlier entries win.
        let first = config
            .synonyms
            .iter()
            .position(|s| s.keyword == "тип обращения")
            .unwrap();
        let second = config
            .synonyms
            .iter()
            .position(|s| s.keyword == "цель")
            .unwrap();
        assert!(first < second);
    }

    #[test]
    fn synonym_target_lookup() {
        let config = BotConfig::default();
        assert_eq!(config.synonym_target("банк"), Some(BANK_COLUMN));
        assert_eq!(config.synonym_target("отделение"), Some(BANK_COLUMN));
        assert_eq!(config.synonym_target("нет такого"), None);
    }

    #[test]
    fn timestamp_detection_is_case_insensitive() {
        let config = BotConfig::default();
        assert!(config.is_timestamp_column("Отметка времени"));
        assert!(config.is_timestamp_column("Form Timestamp"));
        assert!(!config.is_timestamp_column("Укажите ваш возраст."));
    }

    #[test]
    fn toml_overrides_layer_over_defaults() -> Result<()> {
        let config = BotConfig::from_toml_str(
            r#"
            numeric_columns = ["Возраст"]

            [resolver]
            fuzzy_cutoff = 0.5

            [[synonyms]]
            keyword = "пол"
            column = "Пол"
            "#,
        )?;
        assert_eq!(config.resolver.fuzzy_cutoff, 0.5);
        assert_eq!(config.resolver.min_token_len, 3);
        assert_eq!(config.synonyms.len(), 1);
        assert!(config.is_numeric_column("Возраст"));
        assert_eq!(config.report.message_limit, 4000);
        Ok(())
    }
}
