//! Transport-agnostic request handling: parses the user's message, routes it
//! to reports, charts or the oracle, and assembles the reply.
//!
//! The bot transport hands in raw text plus the current snapshot and gets
//! back messages and an optional chart. Every failure class here is locally
//! recoverable: a resolver miss, an empty aggregate or a collaborator error
//! becomes a friendly message, never a crash.

use crate::aggregate::{frequency_table, numeric_summary, summarize_column, ColumnSummary, NumericSummary};
use crate::chart::{chart_spec, ChartSpec, Renderer};
use crate::config::BotConfig;
use crate::dataset::Dataset;
use crate::digest::survey_digest;
use crate::oracle::Oracle;
use crate::report;
use crate::report::fmt_num;
use std::path::PathBuf;

/// A parsed user request. Button labels (with or without their emoji prefix)
/// map to fixed commands; free text is classified by intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FullReport,
    QuickAnalysis,
    QualityRating,
    GenderBreakdown,
    AgeStatistics,
    TopBanks,
    VisitPurposes,
    WaitingTime,
    DetailedAnalysis,
    QuestionList,
    /// Free text asking for a chart of some question.
    Chart(String),
    /// Free text asking to compare answers of some question.
    Compare(String),
    /// Free text asking for recommendations on some question.
    Recommend(String),
    /// Anything else: delegated to the oracle.
    Ask(String),
}

impl Command {
    /// Parses a message. Matching is case-insensitive and ignores a leading
    /// emoji, so both the keyboard button and its typed-out label work.
    pub fn parse(text: &str) -> Self {
        let lower = text.trim().to_lowercase();
        let stripped = lower.trim_start_matches(|c: char| !c.is_alphanumeric());
        match stripped {
            "полный отчет" | "отчет по опросу" => Self::FullReport,
            "быстрый анализ" => Self::QuickAnalysis,
            "оценки качества" => Self::QualityRating,
            "гендерный состав" | "гендерный pie chart" => Self::GenderBreakdown,
            "возрастная статистика" | "возраст: histogram" => Self::AgeStatistics,
            "топ банков" | "топ банков: bar chart" => Self::TopBanks,
            "цели посещения" | "тип обращения: bar chart" => Self::VisitPurposes,
            "время ожидания" => Self::WaitingTime,
            "детальный анализ" => Self::DetailedAnalysis,
            "все вопросы" => Self::QuestionList,
            _ => {
                if ["график", "диаграмм", "chart"].iter().any(|w| lower.contains(w)) {
                    Self::Chart(lower)
                } else if lower.contains("сравн") {
                    Self::Compare(lower)
                } else if lower.contains("рекоменд") {
                    Self::Recommend(lower)
                } else {
                    Self::Ask(text.trim().to_string())
                }
            }
        }
    }
}

/// A rendered chart attached to a reply.
#[derive(Debug, Clone)]
pub struct ChartAttachment {
    pub spec: ChartSpec,
    pub path: PathBuf,
}

/// What the transport should send back: one or more text messages and an
/// optional chart image.
#[derive(Debug, Clone, Default)]
pub struct Reply {
    pub messages: Vec<String>,
    pub chart: Option<ChartAttachment>,
}

impl Reply {
    fn message(text: impl Into<String>) -> Self {
        Self {
            messages: vec![text.into()],
            chart: None,
        }
    }
}

const EMPTY_DATASET_MSG: &str = "Ошибка: не удалось получить данные из таблицы";
const INSUFFICIENT_MSG: &str =
    "Недостаточно данных: не удалось сопоставить запрос с вопросом опроса";
const NO_METRIC_DATA_MSG: &str = "Нет данных по этой метрике";
const CHART_FAILED_MSG: &str = "Не удалось создать график - нет данных";
const ORACLE_FAILED_MSG: &str = "Не смог получить умный ответ. Попробуйте иначе!";

/// The assistant core. Holds the immutable configuration and the injected
/// collaborators; each call gets a fresh snapshot from the transport.
pub struct Assistant<'a> {
    config: &'a BotConfig,
    renderer: &'a dyn Renderer,
    oracle: &'a dyn Oracle,
}

impl<'a> Assistant<'a> {
    pub fn new(config: &'a BotConfig, renderer: &'a dyn Renderer, oracle: &'a dyn Oracle) -> Self {
        Self {
            config,
            renderer,
            oracle,
        }
    }

    /// Handles one inbound message against the given snapshot.
    pub fn handle(&self, text: &str, dataset: &Dataset) -> Reply {
        if dataset.is_empty() {
            return Reply::message(EMPTY_DATASET_MSG);
        }
        match Command::parse(text) {
            Command::FullReport => Reply {
                messages: report::paginate(
                    "ПОЛНЫЙ ОТЧЕТ",
                    &report::full_report(dataset, self.config),
                    self.config.report.message_limit,
                ),
                chart: None,
            },
            Command::QuickAnalysis => {
                Reply::message(report::quick_analysis(dataset, self.config))
            }
            Command::QualityRating => {
                Reply::message(report::quality_rating(dataset, self.config))
            }
            Command::DetailedAnalysis => {
                Reply::message(report::detailed_analysis(dataset, self.config))
            }
            Command::QuestionList => Reply::message(report::questions_list(dataset, self.config)),
            Command::GenderBreakdown => self.gender_breakdown(dataset),
            Command::AgeStatistics => self.age_statistics(dataset),
            Command::TopBanks => self.bar_with_analysis(
                dataset,
                "банк",
                "Топ банков",
                "Дай краткий анализ по топу банков",
                "Нет данных о банках",
            ),
            Command::VisitPurposes => self.bar_with_analysis(
                dataset,
                "тип обращения",
                "Цели посещения банка",
                "Дай краткий анализ по целям посещения банка",
                "Нет данных о целях посещения",
            ),
            Command::WaitingTime => self.bar_with_analysis(
                dataset,
                "очередь",
                "Время ожидания в очереди",
                "Дай краткий анализ по времени ожидания в очереди",
                "Нет данных о времени ожидания",
            ),
            Command::Chart(query) => self.chart_request(dataset, &query),
            Command::Compare(query) => self.column_request(dataset, &query, |ds, col| {
                report::comparison(ds, col)
            }),
            Command::Recommend(query) => self.column_request(dataset, &query, |ds, col| {
                report::recommendations(ds, col)
            }),
            Command::Ask(question) => self.ask_oracle(dataset, &question),
        }
    }

    fn gender_breakdown(&self, dataset: &Dataset) -> Reply {
        let column = self
            .config
            .synonym_target("пол")
            .and_then(|c| dataset.column_name(c));
        let Some(column) = column else {
            return Reply::message("Нет данных о поле респондентов");
        };
        let table = frequency_table(dataset, column).unwrap_or_default();
        if table.is_empty() {
            return Reply::message("Нет данных о поле респондентов");
        }

        let spec = chart_spec(dataset, self.config, column, "Гендерный состав");
        let chart = match self.renderer.render(dataset, &spec, self.config) {
            Ok(path) => ChartAttachment { spec, path },
            Err(e) => {
                log::warn!("chart rendering failed: {e}");
                return Reply::message(CHART_FAILED_MSG);
            }
        };

        let mut text = String::new();
        text.push_str("👥 *ГЕНДЕРНЫЙ СОСТАВ ОПРОШЕННЫХ*\n\n");
        text.push_str("📊 *Статистика:*\n");
        text.push_str(&format!("• Всего ответов: {}\n", table.total()));
        for (value, count) in table.entries() {
            text.push_str(&format!(
                "• {}: {} ({:.1}%)\n",
                value,
                count,
                table.percentage(*count)
            ));
        }
        if let Some(gap) = report::top_two_gap(&table) {
            text.push('\n');
            if gap.count_gap > 0 {
                text.push_str(&format!(
                    "🏆 Больше ответов '{}' на {} человек",
                    gap.first.0, gap.count_gap
                ));
            } else {
                text.push_str("⚖️ Ответы распределились поровну");
            }
        }
        Reply {
            messages: vec![text],
            chart: Some(chart),
        }
    }

    fn age_statistics(&self, dataset: &Dataset) -> Reply {
        let column = self
            .config
            .synonym_target("возраст")
            .and_then(|c| dataset.column_name(c));
        let Some(column) = column else {
            return Reply::message("Нет числовых данных о возрасте");
        };
        let numbers = dataset.numeric_column(column).unwrap_or_default();
        let Some(summary) = numeric_summary(&numbers) else {
            return Reply::message("Нет числовых данных о возрасте");
        };

        let spec = chart_spec(dataset, self.config, column, "Распределение по возрасту");
        let chart = match self.renderer.render(dataset, &spec, self.config) {
            Ok(path) => ChartAttachment { spec, path },
            Err(e) => {
                log::warn!("chart rendering failed: {e}");
                return Reply::message(CHART_FAILED_MSG);
            }
        };

        let mut text = String::new();
        text.push_str("📊 *РАСПРЕДЕЛЕНИЕ ПО ВОЗРАСТУ*\n\n");
        text.push_str("📈 *Статистика:*\n");
        text.push_str(&format!("• Всего ответов: {}\n", summary.count));
        text.push_str(&format!("• Средний возраст: {:.1} лет\n", summary.mean));
        text.push_str(&format!("• Медианный возраст: {:.1} лет\n", summary.median));
        text.push_str(&format!("• Минимальный возраст: {} лет\n", fmt_num(summary.min)));
        text.push_str(&format!("• Максимальный возраст: {} лет\n\n", fmt_num(summary.max)));
        text.push_str("🏆 *Самые частые возрасты:*\n");
        for (i, (age, count)) in summary.top_values.iter().enumerate() {
            text.push_str(&format!(
                "{}. {} лет: {} человек\n",
                i + 1,
                fmt_num(*age),
                count
            ));
        }
        Reply {
            messages: vec![text],
            chart: Some(chart),
        }
    }

    /// Shared path for the bar-chart buttons: draw the chart, then ask the
    /// oracle for a short commentary with a canned question.
    fn bar_with_analysis(
        &self,
        dataset: &Dataset,
        keyword: &str,
        title: &str,
        question: &str,
        missing_msg: &str,
    ) -> Reply {
        let column = self
            .config
            .synonym_target(keyword)
            .and_then(|c| dataset.column_name(c));
        let Some(column) = column else {
            return Reply::message(missing_msg);
        };
        let table = frequency_table(dataset, column).unwrap_or_default();
        if table.is_empty() {
            return Reply::message(missing_msg);
        }

        let spec = chart_spec(dataset, self.config, column, title);
        let chart = match self.renderer.render(dataset, &spec, self.config) {
            Ok(path) => ChartAttachment { spec, path },
            Err(e) => {
                log::warn!("chart rendering failed: {e}");
                return Reply::message(CHART_FAILED_MSG);
            }
        };

        let message = match self
            .oracle
            .ask(question, &survey_digest(dataset, self.config))
        {
            Ok(analysis) => analysis,
            Err(e) => {
                log::warn!("oracle call failed: {e}");
                ORACLE_FAILED_MSG.to_string()
            }
        };
        Reply {
            messages: vec![message],
            chart: Some(chart),
        }
    }

    /// Free-text chart request: resolve the column, chart it and add a short
    /// statistics message alongside.
    fn chart_request(&self, dataset: &Dataset, query: &str) -> Reply {
        let Some(column) = crate::resolver::resolve(query, dataset, self.config) else {
            return Reply::message(INSUFFICIENT_MSG);
        };
        let text = match summarize_column(dataset, column, self.config) {
            ColumnSummary::Empty => return Reply::message(NO_METRIC_DATA_MSG),
            ColumnSummary::Categorical(_) => report::comparison(dataset, column),
            ColumnSummary::Numeric(summary) => numeric_stats_text(column, &summary),
        };
        let spec = chart_spec(dataset, self.config, column, report::shorten(column, 50));
        let chart = match self.renderer.render(dataset, &spec, self.config) {
            Ok(path) => ChartAttachment { spec, path },
            Err(e) => {
                log::warn!("chart rendering failed: {e}");
                return Reply::message(CHART_FAILED_MSG);
            }
        };
        Reply {
            messages: vec![text],
            chart: Some(chart),
        }
    }

    /// Resolve-then-format path shared by comparison and recommendation
    /// requests.
    fn column_request(
        &self,
        dataset: &Dataset,
        query: &str,
        format: impl Fn(&Dataset, &str) -> String,
    ) -> Reply {
        match crate::resolver::resolve(query, dataset, self.config) {
            Some(column) => Reply::message(format(dataset, column)),
            None => Reply::message(INSUFFICIENT_MSG),
        }
    }

    fn ask_oracle(&self, dataset: &Dataset, question: &str) -> Reply {
        match self
            .oracle
            .ask(question, &survey_digest(dataset, self.config))
        {
            Ok(answer) => Reply::message(answer),
            Err(e) => {
                log::warn!("oracle call failed: {e}");
                Reply::message(ORACLE_FAILED_MSG)
            }
        }
    }
}

fn numeric_stats_text(column: &str, summary: &NumericSummary) -> String {
    let mut text = String::new();
    text.push_str(&format!("📊 *СТАТИСТИКА: {}*\n\n", column));
    text.push_str(&format!("• Всего ответов: {}\n", summary.count));
    text.push_str(&format!("• Среднее: {:.1}\n", summary.mean));
    text.push_str(&format!("• Медиана: {:.1}\n", summary.median));
    text.push_str(&format!("• Минимум: {}\n", fmt_num(summary.min)));
    text.push_str(&format!("• Максимум: {}\n", fmt_num(summary.max)));
    text
}
