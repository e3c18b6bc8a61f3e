use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use regex::{Regex, RegexBuilder};

use crate::errors::{IndexError, Result};

/// Turns dates into index names and tells which index names are ours.
///
/// The template and the pattern are two independent settings, nothing but the
/// consistency check done by the lifecycle manager keeps them in sync.
#[derive(Debug, Clone)]
pub struct IndexNaming {
    template: String,
    pattern: String,
    regex: Regex,
}

impl IndexNaming {
    pub fn new(template: &str, pattern: &str) -> Result<Self> {
        if template.is_empty()
            || StrftimeItems::new(template).any(|item| matches!(item, Item::Error))
        {
            return Err(IndexError::InvalidTemplate {
                template: template.to_string(),
            });
        }

        // Only the start of the name is anchored.
        let regex = RegexBuilder::new(&format!("^(?:{pattern})"))
            .case_insensitive(true)
            .build()?;

        Ok(IndexNaming {
            template: template.to_string(),
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn name_for_date(&self, date: DateTime<Utc>) -> String {
        date.format(&self.template).to_string()
    }

    pub fn is_managed_name(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// Reads back the date an index name was built from, at midnight.
    ///
    /// Templates coarser than a day do not name a day, the missing components
    /// are anchored on the start of the period: the Monday of a week, the 1st
    /// of a month, January 1st of a year. The Monday of week `00` usually falls
    /// in the previous year, which chrono refuses to resolve from a week number:
    /// it is then recovered from the Sunday of that week.
    pub fn date_for_name(&self, name: &str) -> Result<NaiveDateTime> {
        let template = self.template.as_str();

        NaiveDate::parse_from_str(name, template)
            .ok()
            .or_else(|| {
                PERIOD_ANCHORS.iter().find_map(|(suffix, spec, days_back)| {
                    let anchored_name = format!("{name}{suffix}");
                    let anchored_template = format!("{template}{spec}");
                    NaiveDate::parse_from_str(&anchored_name, &anchored_template)
                        .ok()
                        .map(|date| date - Duration::days(*days_back))
                })
            })
            .map(|date| date.and_time(NaiveTime::MIN))
            .ok_or_else(|| IndexError::IndexNameParse {
                name: name.to_string(),
                template: self.template.clone(),
            })
    }
}

/// Suffix appended to a name, strftime specifier appended to the template and
/// number of days to step back, tried in order.
const PERIOD_ANCHORS: [(&str, &str, i64); 4] = [
    // Monday
    ("-1", "-%w", 0),
    // Sunday of week 00
    ("-0", "-%w", 6),
    // 1st of the month
    ("-01", "-%d", 0),
    // January 1st
    ("-01-01", "-%m-%d", 0),
];
