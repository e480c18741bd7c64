use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecurrenceError {
    #[error("expected KEY=VALUE, found '{0}'")]
    MalformedPart(String),

    #[error("INTERVAL is not a number: '{0}'")]
    BadInterval(String),
}

/// The recognised keys of a repeat rule. Unknown keys are dropped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Rule {
    pub freq: Option<String>,
    pub interval: Option<String>,
    pub count: Option<String>,
    pub byday: Option<String>,
    pub wkst: Option<String>,
}

impl Rule {
    /// An empty rule string is "no recurrence", not an error.
    pub fn parse(rule: &str) -> Result<Option<Self>, RecurrenceError> {
        if rule.is_empty() {
            return Ok(None);
        }
        let mut parsed = Self::default();
        for part in rule.split(';') {
            let mut pieces = part.split('=');
            let (Some(key), Some(value), None) = (pieces.next(), pieces.next(), pieces.next())
            else {
                return Err(RecurrenceError::MalformedPart(part.to_string()));
            };
            let slot = match key {
                "FREQ" => &mut parsed.freq,
                "INTERVAL" => &mut parsed.interval,
                "COUNT" => &mut parsed.count,
                "BYDAY" => &mut parsed.byday,
                "WKST" => &mut parsed.wkst,
                _ => continue,
            };
            *slot = Some(value.to_string()).filter(|v| !v.is_empty());
        }
        Ok(Some(parsed))
    }

    pub fn phrase(&self, due_date: Option<&str>) -> Result<String, RecurrenceError> {
        let mut words: Vec<String> = Vec::new();
        match self.interval.as_deref() {
            Some(interval) => {
                let interval = interval.trim();
                let n: i64 = interval
                    .parse()
                    .map_err(|_| RecurrenceError::BadInterval(interval.to_string()))?;
                words.push("every".into());
                if n > 1 {
                    words.push(interval.to_string());
                }
                match (self.byday.as_deref(), self.freq.as_deref()) {
                    (Some(days), _) => words.push(weekdays_long(days)),
                    (None, Some(freq)) => words.push(period_long(freq).to_string()),
                    (None, None) => {}
                }
            }
            None => words.extend(self.freq.clone()),
        }
        if let Some(due) = due_date.filter(|d| !d.is_empty()) {
            words.push(format!("starting {due}"));
        }
        Ok(words.join(" "))
    }
}

/// Parse and render in one go. `Ok(None)` when there is no rule.
pub fn translate(rule: &str, due_date: Option<&str>) -> Result<Option<String>, RecurrenceError> {
    Rule::parse(rule)?
        .map(|rule| rule.phrase(due_date))
        .transpose()
}

fn weekday_long(code: &str) -> &str {
    match code {
        "MO" => "Monday",
        "TU" => "Tuesday",
        "WE" => "Wednesday",
        "TH" => "Thursday",
        "FR" => "Friday",
        "SA" => "Saturday",
        "SU" => "Sunday",
        other => other,
    }
}

fn weekdays_long(codes: &str) -> String {
    codes
        .split(',')
        .map(weekday_long)
        .collect::<Vec<_>>()
        .join(", ")
}

fn period_long(freq: &str) -> &str {
    match freq {
        "DAILY" => "day",
        "WEEKLY" => "week",
        "MONTHLY" => "month",
        "YEARLY" => "year",
        other => other,
    }
}
