use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Формат ключа даты: `YYYY-MM-DD`
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Ключ даты для указанного момента (UTC)
pub fn date_key(at: DateTime<Utc>) -> String {
    at.date_naive().format(DATE_KEY_FORMAT).to_string()
}

/// Сегодняшний ключ даты, под ним сохраняются тарифы ежечасного цикла
pub fn today_key() -> String {
    date_key(Utc::now())
}

/// Вчерашний ключ даты: название листа ежедневной выгрузки
pub fn yesterday_key() -> String {
    date_key(Utc::now() - Duration::days(1))
}

/// Проверка, что строка является ключом даты в формате `YYYY-MM-DD`
pub fn is_date_key(value: &str) -> bool {
    value.len() == 10 && NaiveDate::parse_from_str(value, DATE_KEY_FORMAT).is_ok()
}

/// Пустая строка от API означает отсутствие даты
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
