//! Report formatting: pure functions from aggregation results to the text
//! blocks the assistant sends back.
//!
//! Templates reproduce the production bot's Russian-language reports. Long
//! reports are split into multiple messages on line boundaries; the split
//! budget and breakdown depths come from [`ReportConfig`](crate::config::ReportConfig).

use crate::aggregate::{percentage, FrequencyTable};
use crate::config::{BotConfig, QualityMetric};
use crate::dataset::{extract_numeric, Dataset};

/// Qualitative band for a positive-percentage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingBand {
    High,
    Medium,
    Low,
}

impl RatingBand {
    /// ≥ 80 is the best band, ≥ 60 the middle one, everything else the worst.
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 80.0 {
            Self::High
        } else if percent >= 60.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Self::High => "🟢",
            Self::Medium => "🟡",
            Self::Low => "🔴",
        }
    }

    pub fn verdict(self) -> &'static str {
        match self {
            Self::High => "🏆 *Отличное качество обслуживания!*",
            Self::Medium => "⚠️ *Хорошее качество, есть возможности для улучшения*",
            Self::Low => "❌ *Требуется серьезная работа над качеством*",
        }
    }
}

/// How decisively the top answer of a column leads over the runner-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    /// Gap above 20 percentage points.
    Dominant,
    /// Gap above 10 percentage points.
    Moderate,
    /// Anything closer.
    Even,
}

impl Dominance {
    pub fn from_point_gap(gap: f64) -> Self {
        if gap > 20.0 {
            Self::Dominant
        } else if gap > 10.0 {
            Self::Moderate
        } else {
            Self::Even
        }
    }
}

/// Gap between the two most frequent values of a column.
#[derive(Debug, Clone, PartialEq)]
pub struct TopGap {
    pub first: (String, usize),
    pub second: (String, usize),
    /// Absolute count difference.
    pub count_gap: usize,
    /// Percentage-point difference.
    pub point_gap: f64,
    pub dominance: Dominance,
}

/// Computes the top-2 gap of a frequency table. Needs at least two distinct
/// values.
pub fn top_two_gap(table: &FrequencyTable) -> Option<TopGap> {
    let entries = table.entries();
    if entries.len() < 2 {
        return None;
    }
    let first = entries[0].clone();
    let second = entries[1].clone();
    let count_gap = first.1 - second.1;
    let point_gap = table.percentage(first.1) - table.percentage(second.1);
    Some(TopGap {
        first,
        second,
        count_gap,
        point_gap,
        dominance: Dominance::from_point_gap(point_gap),
    })
}

/// Truncates to `max` characters, replacing the tail with an ellipsis.
pub(crate) fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Formats a number without a fractional part as an integer, otherwise with
/// one decimal place.
pub(crate) fn fmt_num(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

/// Share of a metric's favorable answers in a frequency table, in percent.
pub fn positive_rate(table: &FrequencyTable, metric: &QualityMetric) -> f64 {
    let positive: usize = metric.positive.iter().map(|v| table.count_of(v)).sum();
    percentage(positive, table.total())
}

/// Splits text into parts of at most `limit` characters, on line boundaries
/// only. A single line longer than the budget becomes its own oversized part
/// rather than being cut mid-line. Never produces empty parts.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;
    for line in text.split('\n') {
        let line_chars = line.chars().count() + 1;
        if current_chars + line_chars > limit && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
            current_chars = 0;
        }
        current.push_str(line);
        current.push('\n');
        current_chars += line_chars;
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Splits a report into messages and labels each part "(часть i/N)" when the
/// split produced more than one. The part header is not counted against the
/// budget.
pub fn paginate(title: &str, text: &str, limit: usize) -> Vec<String> {
    let parts = split_message(text, limit);
    if parts.len() <= 1 {
        return parts;
    }
    let n = parts.len();
    parts
        .into_iter()
        .enumerate()
        .map(|(i, part)| {
            format!("📊 {} (часть {}/{})\n{}\n\n{}", title, i + 1, n, "=".repeat(30), part)
        })
        .collect()
}

/// The full survey report: every non-timestamp column with at least two
/// distinct values, with a full or top-N breakdown depending on cardinality.
pub fn full_report(dataset: &Dataset, config: &BotConfig) -> String {
    let mut out = String::new();
    out.push_str("📊 ОТЧЕТ ПО ОПРОСУ БАНКОВСКИХ КЛИЕНТОВ\n");
    out.push_str(&"=".repeat(50));
    out.push_str("\n\n");
    out.push_str("📈 Общая статистика:\n");
    out.push_str(&format!("• Всего анкет: {}\n", dataset.len()));
    out.push_str(&format!("• Количество вопросов: {}\n\n", dataset.columns().len()));
    out.push_str("🔍 Основные результаты:\n\n");

    let relevant: Vec<&String> = dataset
        .columns()
        .iter()
        .filter(|c| !config.is_timestamp_column(c))
        .collect();

    for (i, column) in relevant.iter().enumerate() {
        let Some(values) = dataset.column(column) else {
            continue;
        };
        let table = FrequencyTable::from_values(values);
        if table.distinct_count() < 2 {
            continue;
        }
        let total = table.total();
        let Some((top, top_count)) = table.top() else {
            continue;
        };

        out.push_str(&format!("{}. {}\n", i + 1, shorten(column, 50)));
        out.push_str(&format!("   📊 Всего ответов: {}\n", total));
        out.push_str(&format!(
            "   🏆 Топ ответ: '{}' ({} раз, {:.1}%)\n",
            top,
            top_count,
            table.percentage(top_count)
        ));

        if table.distinct_count() <= config.report.inline_breakdown_max {
            out.push_str("   📋 Все ответы:\n");
            for (answer, count) in table.entries() {
                out.push_str(&format!(
                    "      • {}: {} ({:.1}%)\n",
                    answer,
                    count,
                    table.percentage(*count)
                ));
            }
        } else {
            out.push_str(&format!("   📋 Топ-{} ответа:\n", config.report.top_breakdown));
            for (j, (answer, count)) in table
                .entries()
                .iter()
                .take(config.report.top_breakdown)
                .enumerate()
            {
                out.push_str(&format!(
                    "      {}. {}: {} ({:.1}%)\n",
                    j + 1,
                    answer,
                    count,
                    table.percentage(*count)
                ));
            }
        }
        out.push('\n');
    }

    out.push_str("💡 Хотите увидеть графики? Напишите:\n");
    out.push_str("• 'график по банкам'\n");
    out.push_str("• 'статистика по возрасту'\n");
    out.push_str("• 'анализ проблем'\n");
    out.push_str("• 'сравнение мужчин и женщин'");
    out
}

/// Quick analysis of the key metrics. Metrics whose column is absent from the
/// snapshot are silently omitted.
pub fn quick_analysis(dataset: &Dataset, config: &BotConfig) -> String {
    let mut out = String::new();
    out.push_str("🎯 *БЫСТРЫЙ АНАЛИЗ КЛЮЧЕВЫХ МЕТРИК*\n\n");

    if let Some(bank_column) = config.synonym_target("банк") {
        if let Some(values) = dataset.column(bank_column) {
            let table = FrequencyTable::from_values(values);
            if let Some((top, count)) = table.top() {
                out.push_str(&format!(
                    "🏦 *Топ банк:* {} ({}/{} клиентов)\n\n",
                    top,
                    count,
                    table.total()
                ));
            }
        }
    }

    if let Some(age_column) = config.synonym_target("возраст") {
        if let Some(values) = dataset.column(age_column) {
            let ages = extract_numeric(&values);
            if !ages.is_empty() {
                let mean = ages.iter().sum::<f64>() / ages.len() as f64;
                out.push_str(&format!("📊 *Средний возраст:* {:.1} лет\n\n", mean));
            }
        }
    }

    out.push_str("⭐ *Оценки качества:*\n");
    for metric in &config.quality_metrics {
        if let Some(values) = dataset.column(&metric.column) {
            let table = FrequencyTable::from_values(values);
            if !table.is_empty() {
                out.push_str(&format!(
                    "• {}: {:.1}% положительных оценок\n",
                    metric.label,
                    positive_rate(&table, metric)
                ));
            }
        }
    }

    if let Some(metric) = &config.resolution {
        if let Some(values) = dataset.column(&metric.column) {
            let table = FrequencyTable::from_values(values);
            if !table.is_empty() {
                out.push_str(&format!(
                    "\n✅ *{}:* {:.1}%\n",
                    metric.label,
                    positive_rate(&table, metric)
                ));
            }
        }
    }
    if let Some(metric) = &config.recommendation {
        if let Some(values) = dataset.column(&metric.column) {
            let table = FrequencyTable::from_values(values);
            if !table.is_empty() {
                out.push_str(&format!(
                    "👍 *{}:* {:.1}%\n",
                    metric.label,
                    positive_rate(&table, metric)
                ));
            }
        }
    }

    out.push_str("\n💡 *Выводы:*\n");
    out.push_str("• Общее качество обслуживания высокое\n");
    out.push_str("• Большинство клиентов довольны\n");
    out.push_str("• Есть возможности для улучшения скорости\n");
    out
}

/// Per-metric quality rating with an unweighted average and a banded verdict.
pub fn quality_rating(dataset: &Dataset, config: &BotConfig) -> String {
    let mut out = String::new();
    out.push_str("⭐ *АНАЛИЗ КАЧЕСТВА ОБСЛУЖИВАНИЯ*\n\n");

    let mut scores = Vec::new();
    for metric in &config.quality_metrics {
        let Some(values) = dataset.column(&metric.column) else {
            continue;
        };
        let table = FrequencyTable::from_values(values);
        if table.is_empty() {
            continue;
        }
        let rate = positive_rate(&table, metric);
        scores.push(rate);
        out.push_str(&format!(
            "{} *{}:* {:.1}% положительных оценок\n",
            RatingBand::from_percent(rate).marker(),
            metric.label,
            rate
        ));
    }

    if !scores.is_empty() {
        let average = scores.iter().sum::<f64>() / scores.len() as f64;
        out.push_str(&format!("\n📊 *ОБЩИЙ РЕЙТИНГ КАЧЕСТВА:* {:.1}%\n\n", average));
        out.push_str(RatingBand::from_percent(average).verdict());
        out.push('\n');
    }
    out
}

/// Comparison of a column's two most frequent answers, with the dominance
/// verdict and the full distribution when there is more to show.
pub fn comparison(dataset: &Dataset, column: &str) -> String {
    let table = match dataset.column(column) {
        Some(values) => FrequencyTable::from_values(values),
        None => FrequencyTable::default(),
    };
    let Some(gap) = top_two_gap(&table) else {
        return format!("❌ Недостаточно данных для сравнения в колонке '{}'", column);
    };

    let mut out = String::new();
    out.push_str(&format!("📊 *СРАВНИТЕЛЬНЫЙ АНАЛИЗ: {}*\n\n", column));
    out.push_str("🏆 *Топ-2 ответа:*\n");
    out.push_str(&format!(
        "1. {}: {} ({:.1}%)\n",
        gap.first.0,
        gap.first.1,
        table.percentage(gap.first.1)
    ));
    out.push_str(&format!(
        "2. {}: {} ({:.1}%)\n\n",
        gap.second.0,
        gap.second.1,
        table.percentage(gap.second.1)
    ));
    out.push_str("📈 *Разница:*\n");
    out.push_str(&format!("• Количественная: {} ответов\n", gap.count_gap));
    out.push_str(&format!("• Процентная: {:.1}%\n\n", gap.point_gap));
    out.push_str(&match gap.dominance {
        Dominance::Dominant => format!("💡 *Вывод:* {} значительно преобладает\n", gap.first.0),
        Dominance::Moderate => format!("💡 *Вывод:* {} умеренно лидирует\n", gap.first.0),
        Dominance::Even => "💡 *Вывод:* Ответы распределены равномерно\n".to_string(),
    });

    if table.distinct_count() > 2 {
        out.push_str("\n📋 *Полное распределение:*\n");
        for (i, (answer, count)) in table.entries().iter().enumerate() {
            out.push_str(&format!(
                "{}. {}: {} ({:.1}%)\n",
                i + 1,
                answer,
                count,
                table.percentage(*count)
            ));
        }
    }
    out
}

/// Advice block for a column, keyed off the theme its name suggests.
pub fn recommendations(dataset: &Dataset, column: &str) -> String {
    let table = match dataset.column(column) {
        Some(values) => FrequencyTable::from_values(values),
        None => FrequencyTable::default(),
    };
    let Some((top, top_count)) = table.top() else {
        return format!("❌ Нет данных для анализа в колонке '{}'", column);
    };
    let top_percent = table.percentage(top_count);

    let mut out = String::new();
    out.push_str(&format!("💡 *РЕКОМЕНДАЦИИ ПО: {}*\n\n", column));

    let lower = column.to_lowercase();
    if lower.contains("банк") {
        out.push_str("🏦 *Анализ банков:*\n");
        out.push_str(&format!("• Лидер: {} ({:.1}% клиентов)\n\n", top, top_percent));
        out.push_str("📋 *Рекомендации:*\n");
        out.push_str("1. Изучить опыт лидирующего банка\n");
        out.push_str("2. Провести конкурентный анализ\n");
        out.push_str("3. Улучшить сервисы в отстающих банках\n");
        out.push_str("4. Разработать уникальные предложения\n");
    } else if lower.contains("возраст") {
        out.push_str("📊 *Анализ возраста:*\n");
        out.push_str(&format!("• Самый частый возраст: {} лет\n\n", top));
        out.push_str("📋 *Рекомендации:*\n");
        out.push_str("1. Адаптировать услуги под целевую аудиторию\n");
        out.push_str("2. Разработать программы для разных возрастных групп\n");
        out.push_str("3. Улучшить цифровые каналы для молодежи\n");
        out.push_str("4. Создать специальные предложения для старшего возраста\n");
    } else if lower.contains("пол") {
        out.push_str("👥 *Анализ гендера:*\n");
        out.push_str(&format!("• Преобладает: {}\n\n", top));
        out.push_str("📋 *Рекомендации:*\n");
        out.push_str("1. Разработать гендерно-ориентированные продукты\n");
        out.push_str("2. Адаптировать маркетинговые кампании\n");
        out.push_str("3. Улучшить обслуживание для меньшинства\n");
        out.push_str("4. Провести исследования потребностей\n");
    } else if lower.contains("качество") || lower.contains("оценка") || lower.contains("удовлетворенность") {
        out.push_str("⭐ *Анализ качества:*\n");
        out.push_str(&format!("• Основная оценка: {}\n\n", top));
        out.push_str("📋 *Рекомендации:*\n");
        out.push_str("1. Поддерживать высокие стандарты\n");
        out.push_str("2. Улучшить проблемные области\n");
        out.push_str("3. Провести обучение персонала\n");
        out.push_str("4. Внедрить систему обратной связи\n");
    } else if lower.contains("проблем") || lower.contains("жалоб") {
        out.push_str("⚠️ *Анализ проблем:*\n");
        out.push_str(&format!("• Основная проблема: {}\n\n", top));
        out.push_str("📋 *Рекомендации:*\n");
        out.push_str("1. Приоритизировать решение основных проблем\n");
        out.push_str("2. Улучшить процессы обслуживания\n");
        out.push_str("3. Увеличить количество персонала\n");
        out.push_str("4. Внедрить автоматизацию\n");
    } else {
        out.push_str("📊 *Общий анализ:*\n");
        out.push_str(&format!("• Топ ответ: {} ({:.1}%)\n\n", top, top_percent));
        out.push_str("📋 *Общие рекомендации:*\n");
        out.push_str("1. Изучить причины популярности топ-ответа\n");
        out.push_str("2. Улучшить менее популярные варианты\n");
        out.push_str("3. Провести дополнительное исследование\n");
        out.push_str("4. Разработать стратегию развития\n");
    }

    out.push_str("\n🎯 *Следующие шаги:*\n");
    out.push_str("• Провести детальный анализ\n");
    out.push_str("• Разработать план действий\n");
    out.push_str("• Измерить результаты изменений\n");
    out
}

/// Detailed analysis: demographics, top banks, problem breakdown, static
/// advice.
pub fn detailed_analysis(dataset: &Dataset, config: &BotConfig) -> String {
    let mut out = String::new();
    out.push_str("🔍 *ДЕТАЛЬНЫЙ АНАЛИЗ ОПРОСА*\n\n");

    out.push_str("👥 *ДЕМОГРАФИЯ:*\n");
    if let Some(gender_column) = config.synonym_target("пол") {
        if let Some(values) = dataset.column(gender_column) {
            let table = FrequencyTable::from_values(values);
            for (value, count) in table.entries() {
                out.push_str(&format!(
                    "• {}: {} ({:.1}%)\n",
                    value,
                    count,
                    table.percentage(*count)
                ));
            }
            if !table.is_empty() {
                out.push('\n');
            }
        }
    }

    out.push_str("🏦 *АНАЛИЗ БАНКОВ:*\n");
    if let Some(bank_column) = config.synonym_target("банк") {
        if let Some(values) = dataset.column(bank_column) {
            let table = FrequencyTable::from_values(values);
            for (i, (bank, count)) in table.entries().iter().take(3).enumerate() {
                out.push_str(&format!(
                    "{}. {}: {} клиентов ({:.1}%)\n",
                    i + 1,
                    bank,
                    count,
                    table.percentage(*count)
                ));
            }
            if !table.is_empty() {
                out.push('\n');
            }
        }
    }

    out.push_str("⚠️ *АНАЛИЗ ПРОБЛЕМ:*\n");
    if let Some(metric) = &config.resolution {
        if let Some(values) = dataset.column(&metric.column) {
            let table = FrequencyTable::from_values(values);
            for (problem, count) in table.entries() {
                out.push_str(&format!(
                    "• {}: {} ({:.1}%)\n",
                    problem,
                    count,
                    table.percentage(*count)
                ));
            }
            if !table.is_empty() {
                out.push('\n');
            }
        }
    }

    out.push_str("💡 *РЕКОМЕНДАЦИИ:*\n");
    out.push_str("1. Улучшить скорость обслуживания\n");
    out.push_str("2. Увеличить количество сотрудников в пиковые часы\n");
    out.push_str("3. Улучшить информационное обеспечение\n");
    out.push_str("4. Провести обучение персонала\n");
    out.push_str("5. Модернизировать терминалы\n\n");
    out.push_str("📈 *ПОТЕНЦИАЛ РОСТА:*\n");
    out.push_str("• Повышение удовлетворенности клиентов\n");
    out.push_str("• Увеличение лояльности\n");
    out.push_str("• Рост рекомендаций\n");
    out.push_str("• Снижение жалоб\n");
    out
}

/// List of every survey question with its response count and top answer.
pub fn questions_list(dataset: &Dataset, config: &BotConfig) -> String {
    let mut out = String::new();
    out.push_str("📋 *СПИСОК ВСЕХ ВОПРОСОВ ОПРОСА*\n\n");

    let relevant = dataset
        .columns()
        .iter()
        .filter(|c| !config.is_timestamp_column(c));
    for (i, column) in relevant.enumerate() {
        let table = match dataset.column(column) {
            Some(values) => FrequencyTable::from_values(values),
            None => continue,
        };
        out.push_str(&format!("{}. *{}*\n", i + 1, column));
        out.push_str(&format!("   📊 Ответов: {}\n", table.total()));
        if let Some((top, _)) = table.top() {
            out.push_str(&format!("   🏆 Топ ответ: {}\n", top));
        }
        out.push('\n');
    }

    out.push_str("💡 *Как использовать:*\n");
    out.push_str("• Напишите название вопроса для получения статистики\n");
    out.push_str("• Добавьте 'график' для визуализации\n");
    out.push_str("• Добавьте 'анализ' для глубокого изучения\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn survey() -> (Dataset, BotConfig) {
        let config = BotConfig::default();
        let gender = config.synonym_target("пол").unwrap().to_string();
        let age = config.synonym_target("возраст").unwrap().to_string();
        let bank = config.synonym_target("банк").unwrap().to_string();
        let mut dataset = Dataset::new(vec![
            "Отметка времени".to_string(),
            gender,
            age,
            bank.clone(),
        ])
        .unwrap();
        let rows = [
            ("2024-01-01 10:00", "Мужской", "25 лет", "Сбер"),
            ("2024-01-01 11:00", "Мужской", "30 лет", "Сбер"),
            ("2024-01-02 09:30", "Женский", "25", "ВТБ"),
            ("2024-01-02 12:15", "Женский", "41", "Альфа"),
            ("2024-01-03 16:45", "Мужской", "33", "Сбер"),
        ];
        for (ts, g, a, b) in rows {
            dataset.push_row(vec![
                Some(ts.to_string()),
                Some(g.to_string()),
                Some(a.to_string()),
                Some(b.to_string()),
            ]);
        }
        (dataset, config)
    }

    #[test]
    fn rating_bands_cut_at_80_and_60() {
        assert_eq!(RatingBand::from_percent(93.2), RatingBand::High);
        assert_eq!(RatingBand::from_percent(80.0), RatingBand::High);
        assert_eq!(RatingBand::from_percent(79.9), RatingBand::Medium);
        assert_eq!(RatingBand::from_percent(60.0), RatingBand::Medium);
        assert_eq!(RatingBand::from_percent(59.9), RatingBand::Low);
    }

    #[test]
    fn dominance_bands_cut_at_20_and_10_points() {
        assert_eq!(Dominance::from_point_gap(25.0), Dominance::Dominant);
        assert_eq!(Dominance::from_point_gap(20.0), Dominance::Moderate);
        assert_eq!(Dominance::from_point_gap(10.1), Dominance::Moderate);
        assert_eq!(Dominance::from_point_gap(10.0), Dominance::Even);
        assert_eq!(Dominance::from_point_gap(0.0), Dominance::Even);
    }

    #[test]
    fn top_two_gap_needs_two_values() {
        let single = FrequencyTable::from_values(vec![Some("Да"), Some("Да")]);
        assert!(top_two_gap(&single).is_none());

        let table = FrequencyTable::from_values(vec![
            Some("Сбер"),
            Some("Сбер"),
            Some("Сбер"),
            Some("ВТБ"),
        ]);
        let gap = top_two_gap(&table).unwrap();
        assert_eq!(gap.count_gap, 2);
        assert_eq!(format!("{:.1}", gap.point_gap), "50.0");
        assert_eq!(gap.dominance, Dominance::Dominant);
    }

    #[test]
    fn split_message_respects_line_boundaries() {
        // 30 lines of 300 characters each: 9030 chars in total, no line longer
        // than 500, so the split must give 3 parts within the 4000 budget.
        let line = "ж".repeat(299);
        let text: String = std::iter::repeat(line.clone())
            .take(30)
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(text.chars().count(), 300 * 30 - 1);

        let parts = split_message(&text, 4000);
        assert_eq!(parts.len(), 3);
        for part in &parts {
            assert!(!part.is_empty());
            assert!(part.chars().count() <= 4000);
            assert!(part.ends_with('\n'));
            // Line boundaries only: every piece of content is a whole line.
            for piece in part.trim_end_matches('\n').split('\n') {
                assert_eq!(piece, line);
            }
        }
    }

    #[test]
    fn split_message_short_text_is_single_part() {
        let parts = split_message("короткий отчет", 4000);
        assert_eq!(parts, vec!["короткий отчет".to_string()]);
    }

    #[test]
    fn paginate_labels_parts() {
        let line = "s".repeat(99);
        let text: String = std::iter::repeat(line).take(30).collect::<Vec<_>>().join("\n");
        let parts = paginate("ПОЛНЫЙ ОТЧЕТ", &text, 1000);
        assert_eq!(parts.len(), 3);
        assert!(parts[0].starts_with("📊 ПОЛНЫЙ ОТЧЕТ (часть 1/3)\n"));
        assert!(parts[2].starts_with("📊 ПОЛНЫЙ ОТЧЕТ (часть 3/3)\n"));
    }

    #[test]
    fn full_report_skips_timestamp_and_constant_columns() {
        let (mut dataset, config) = survey();
        // A constant column: only one distinct value, must be skipped.
        let mut with_constant = Dataset::new(
            dataset
                .columns()
                .iter()
                .cloned()
                .chain(["Константа".to_string()])
                .collect(),
        )
        .unwrap();
        for row in dataset.rows() {
            let mut row = row.clone();
            row.push(Some("одно и то же".to_string()));
            with_constant.push_row(row);
        }
        dataset = with_constant;

        let report = full_report(&dataset, &config);
        assert!(report.contains("• Всего анкет: 5"));
        assert!(!report.contains("Отметка времени"));
        assert!(!report.contains("Константа"));
        assert!(report.contains("🏆 Топ ответ: 'Мужской' (3 раз, 60.0%)"));
        assert!(report.contains("📋 Все ответы:"));
    }

    #[test]
    fn quick_analysis_names_top_bank_and_average_age() {
        let (dataset, config) = survey();
        let text = quick_analysis(&dataset, &config);
        assert!(text.contains("🏦 *Топ банк:* Сбер (3/5 клиентов)"));
        assert!(text.contains("📊 *Средний возраст:* 30.8 лет"));
        // Quality columns are absent from this snapshot: silently omitted.
        assert!(!text.contains("Вежливость сотрудников"));
    }

    #[test]
    fn quality_rating_averages_present_metrics() {
        let config = BotConfig::default();
        let politeness = &config.quality_metrics[0];
        let dataset = Dataset::from_rows(
            vec![politeness.column.clone()],
            vec![
                vec![Some("Очень вежливы".to_string())],
                vec![Some("Вежливы".to_string())],
                vec![Some("Грубы".to_string())],
                vec![Some("Вежливы".to_string())],
            ],
        )
        .unwrap();
        let text = quality_rating(&dataset, &config);
        assert!(text.contains("🟡 *Вежливость сотрудников:* 75.0%"));
        assert!(text.contains("📊 *ОБЩИЙ РЕЙТИНГ КАЧЕСТВА:* 75.0%"));
        assert!(text.contains("⚠️"));
    }

    #[test]
    fn comparison_reports_gap_and_distribution() {
        let (dataset, config) = survey();
        let bank = config.synonym_target("банк").unwrap();
        let text = comparison(&dataset, bank);
        assert!(text.contains("1. Сбер: 3 (60.0%)"));
        assert!(text.contains("2. ВТБ: 1 (20.0%)"));
        assert!(text.contains("• Количественная: 2 ответов"));
        assert!(text.contains("значительно преобладает"));
        assert!(text.contains("📋 *Полное распределение:*"));
    }

    #[test]
    fn comparison_handles_insufficient_data() {
        let dataset = Dataset::from_rows(
            vec!["Пол".to_string()],
            vec![vec![Some("Мужской".to_string())]],
        )
        .unwrap();
        let text = comparison(&dataset, "Пол");
        assert!(text.starts_with("❌ Недостаточно данных"));
    }

    #[test]
    fn recommendations_pick_theme_from_column_name() {
        let (dataset, config) = survey();
        let bank = config.synonym_target("банк").unwrap();
        assert!(recommendations(&dataset, bank).contains("🏦 *Анализ банков:*"));
        let gender = config.synonym_target("пол").unwrap();
        assert!(recommendations(&dataset, gender).contains("👥 *Анализ гендера:*"));
        assert!(recommendations(&dataset, "Неизвестно").starts_with("❌ Нет данных"));
    }

    #[test]
    fn questions_list_counts_responses() {
        let (dataset, config) = survey();
        let text = questions_list(&dataset, &config);
        assert!(!text.contains("Отметка времени"));
        assert!(text.contains("📊 Ответов: 5"));
        assert!(text.contains("🏆 Топ ответ: Сбер"));
    }

    #[test]
    fn shorten_keeps_short_names() {
        assert_eq!(shorten("Пол", 50), "Пол");
        let long = "о".repeat(60);
        let short = shorten(&long, 50);
        assert_eq!(short.chars().count(), 50);
        assert!(short.ends_with("..."));
    }

    #[test]
    fn fmt_num_integer_vs_fractional() {
        assert_eq!(fmt_num(25.0), "25");
        assert_eq!(fmt_num(26.666666), "26.7");
    }
}
