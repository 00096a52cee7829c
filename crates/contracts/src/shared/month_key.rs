use chrono::{DateTime, Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

static MONTH_KEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})(?:-(\d{2}))?$").expect("month key pattern must compile")
});

/// Канонический ключ месяца: первый день календарного месяца (`YYYY-MM-01`).
///
/// Принимает как `YYYY-MM`, так и `YYYY-MM-DD`; день всегда нормализуется к `01`,
/// чтобы планы и агрегаты по продажам соединялись по одному и тому же ключу.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey(NaiveDate);

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, String> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(|| format!("Invalid month: {:04}-{:02}", year, month))
    }

    /// Разбор строки `YYYY-MM` или `YYYY-MM-DD`
    ///
    /// # Примеры
    /// ```
    /// use contracts::shared::month_key::MonthKey;
    /// assert_eq!(MonthKey::parse("2024-03").unwrap().to_string(), "2024-03-01");
    /// assert_eq!(MonthKey::parse("2024-03-17").unwrap().to_string(), "2024-03-01");
    /// assert!(MonthKey::parse("2024-3").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, String> {
        if s.is_empty() {
            return Err("Month key is empty".into());
        }

        let caps = MONTH_KEY_PATTERN
            .captures(s)
            .ok_or_else(|| format!("Month key must be YYYY-MM or YYYY-MM-DD, got '{}'", s))?;

        let year: i32 = caps[1]
            .parse()
            .map_err(|e| format!("Invalid year in '{}': {}", s, e))?;
        let month: u32 = caps[2]
            .parse()
            .map_err(|e| format!("Invalid month in '{}': {}", s, e))?;

        if let Some(day) = caps.get(3) {
            let day: u32 = day
                .as_str()
                .parse()
                .map_err(|e| format!("Invalid day in '{}': {}", s, e))?;
            if NaiveDate::from_ymd_opt(year, month, day).is_none() {
                return Err(format!("Invalid calendar date: '{}'", s));
            }
        }

        Self::new(year, month)
    }

    /// Месяц, к которому относится момент времени (UTC)
    pub fn from_timestamp(ts: &DateTime<Utc>) -> Self {
        Self(ts.date_naive().with_day(1).unwrap_or_else(|| ts.date_naive()))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Усечённое представление `YYYY-MM`, по которому группируются продажи
    pub fn period(&self) -> String {
        format!("{:04}-{:02}", self.year(), self.month())
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-01", self.period())
    }
}

impl std::str::FromStr for MonthKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_normalizes_to_first_day() {
        assert_eq!(MonthKey::parse("2024-03").unwrap().to_string(), "2024-03-01");
        assert_eq!(MonthKey::parse("2024-03-01").unwrap().to_string(), "2024-03-01");
        assert_eq!(MonthKey::parse("2024-03-31").unwrap().to_string(), "2024-03-01");
        assert_eq!(
            MonthKey::parse("2024-03").unwrap(),
            MonthKey::parse("2024-03-15").unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_malformed_keys() {
        for bad in [
            "", "2024", "2024-3", "24-03", "2024-03-1", "2024/03", " 2024-03", "2024-03 ",
            "2024-13", "2024-00", "2024-02-30", "2024-03-01T00:00:00",
        ] {
            assert!(MonthKey::parse(bad).is_err(), "expected '{}' to be rejected", bad);
        }
    }

    #[test]
    fn test_leap_day_is_accepted() {
        assert_eq!(MonthKey::parse("2024-02-29").unwrap().period(), "2024-02");
        assert!(MonthKey::parse("2023-02-29").is_err());
    }

    #[test]
    fn test_from_timestamp_truncates_in_utc() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap();
        assert_eq!(MonthKey::from_timestamp(&ts), MonthKey::new(2024, 3).unwrap());
        let ts = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        assert_eq!(MonthKey::from_timestamp(&ts).period(), "2024-04");
    }

    #[test]
    fn test_serde_uses_canonical_form() {
        let key = MonthKey::new(2024, 3).unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2024-03-01\"");
        let parsed: MonthKey = serde_json::from_str("\"2024-03\"").unwrap();
        assert_eq!(parsed, key);
        assert!(serde_json::from_str::<MonthKey>("\"March\"").is_err());
    }
}
