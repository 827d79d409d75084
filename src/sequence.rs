//! Input-sequence parser (C4).
//!
//! Parses a domain-specific textual grammar expressing values that change
//! over time, e.g. `10000 [0,retirement); 5000 [retirement,maturity)`, into
//! a vector of intervals, then realizes that vector against a concrete
//! issue age, retirement age, in-force duration, and projection length into
//! a per-year `Vec<f64>`.
//!
//! Grounded on the `ValueInterval`/`duration_mode` shape used by the system
//! this crate descends from; errors accumulate into a diagnostics vector
//! rather than aborting parsing immediately, so a caller (e.g. a GUI form)
//! can display every problem with an input string at once.

use crate::error::LmiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationMode {
    Invalid,
    Duration,
    AttainedAge,
    NumberOfYears,
    Inception,
    Inforce,
    Retirement,
    Maturity,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SequenceValue {
    Number(f64),
    Keyword(String),
}

#[derive(Debug, Clone)]
pub struct ValueInterval {
    pub value: SequenceValue,
    pub begin_duration: u32,
    pub begin_mode: DurationMode,
    pub begin_inclusive: bool,
    pub end_duration: u32,
    pub end_mode: DurationMode,
    pub end_inclusive: bool,
}

impl ValueInterval {
    fn whole_horizon(value: SequenceValue) -> Self {
        ValueInterval {
            value,
            begin_duration: 0,
            begin_mode: DurationMode::Inception,
            begin_inclusive: true,
            end_duration: 0,
            end_mode: DurationMode::Maturity,
            end_inclusive: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParsedSequence {
    pub intervals: Vec<ValueInterval>,
    pub diagnostics: Vec<String>,
}

impl ParsedSequence {
    /// Combines every accumulated diagnostic into one string, mirroring
    /// `abridge_diagnostics`'s role of producing a single displayable
    /// message from several distinct problems.
    pub fn abridge_diagnostics(&self) -> String {
        self.diagnostics.join("; ")
    }

    /// Realizes this parsed sequence into a per-year vector of length
    /// `years_to_maturity`, resolving each interval's duration-mode
    /// endpoints against the concrete timing parameters of one cell.
    pub fn realize(
        &self,
        years_to_maturity: u32,
        issue_age: u32,
        retirement_age: u32,
        inforce_duration: u32,
    ) -> Result<Vec<f64>, LmiError> {
        if !self.diagnostics.is_empty() {
            return Err(LmiError::SequenceParse(self.abridge_diagnostics()));
        }

        let mut out = vec![0.0; years_to_maturity as usize];
        for interval in &self.intervals {
            let value = match &interval.value {
                SequenceValue::Number(n) => *n,
                SequenceValue::Keyword(k) => {
                    return Err(LmiError::SequenceParse(format!(
                        "cannot realize keyword '{k}' to a numeric vector without a keyword table"
                    )));
                }
            };
            let begin = resolve_duration(
                interval.begin_duration,
                interval.begin_mode,
                issue_age,
                retirement_age,
                inforce_duration,
                years_to_maturity,
            );
            let end = resolve_duration(
                interval.end_duration,
                interval.end_mode,
                issue_age,
                retirement_age,
                inforce_duration,
                years_to_maturity,
            );
            let begin_idx = if interval.begin_inclusive { begin } else { begin + 1 };
            let end_idx = if interval.end_inclusive { end + 1 } else { end };
            let begin_idx = begin_idx.min(years_to_maturity);
            let end_idx = end_idx.min(years_to_maturity);
            for year in begin_idx..end_idx {
                out[year as usize] = value;
            }
        }
        Ok(out)
    }
}

fn resolve_duration(
    duration: u32,
    mode: DurationMode,
    issue_age: u32,
    retirement_age: u32,
    inforce_duration: u32,
    years_to_maturity: u32,
) -> u32 {
    match mode {
        DurationMode::Duration | DurationMode::NumberOfYears => duration,
        DurationMode::AttainedAge => duration.saturating_sub(issue_age),
        DurationMode::Inception => 0,
        DurationMode::Inforce => inforce_duration,
        DurationMode::Retirement => retirement_age.saturating_sub(issue_age),
        DurationMode::Maturity => years_to_maturity,
        DurationMode::Invalid => duration,
    }
}

/// Parses an input-sequence string into a `ParsedSequence`. Parsing never
/// panics; malformed clauses are reported as diagnostics.
pub fn parse(input: &str) -> ParsedSequence {
    let mut result = ParsedSequence::default();
    let trimmed = input.trim();
    if trimmed.is_empty() {
        result
            .diagnostics
            .push("empty input sequence".to_string());
        return result;
    }

    for clause in trimmed.split(';') {
        let clause = clause.trim();
        if clause.is_empty() {
            continue;
        }
        match parse_clause(clause) {
            Ok(interval) => result.intervals.push(interval),
            Err(msg) => result.diagnostics.push(msg),
        }
    }
    result
}

fn parse_clause(clause: &str) -> Result<ValueInterval, String> {
    let bracket_start = clause.find(['[', '(']);
    let (value_part, interval_part) = match bracket_start {
        Some(idx) => (clause[..idx].trim(), Some(clause[idx..].trim())),
        None => (clause.trim(), None),
    };

    let value = parse_value(value_part)?;

    match interval_part {
        None => Ok(ValueInterval::whole_horizon(value)),
        Some(spec) => parse_interval(spec, value),
    }
}

fn parse_value(token: &str) -> Result<SequenceValue, String> {
    if token.is_empty() {
        return Err("missing value before interval bracket".to_string());
    }
    match token.parse::<f64>() {
        Ok(n) => Ok(SequenceValue::Number(n)),
        Err(_) => Ok(SequenceValue::Keyword(token.to_string())),
    }
}

fn parse_interval(spec: &str, value: SequenceValue) -> Result<ValueInterval, String> {
    let begin_inclusive = spec.starts_with('[');
    let end_inclusive = spec.ends_with(']');
    if !begin_inclusive && !spec.starts_with('(') {
        return Err(format!("interval '{spec}' must begin with '[' or '('"));
    }
    if !end_inclusive && !spec.ends_with(')') {
        return Err(format!("interval '{spec}' must end with ')' or ']'"));
    }
    let inner = &spec[1..spec.len() - 1];
    let mut parts = inner.splitn(2, ',');
    let begin_tok = parts
        .next()
        .ok_or_else(|| format!("interval '{spec}' is missing a begin token"))?
        .trim();
    let end_tok = parts
        .next()
        .ok_or_else(|| format!("interval '{spec}' is missing an end token"))?
        .trim();

    let (begin_duration, begin_mode) = parse_duration_token(begin_tok, DurationMode::Inception)?;
    let (end_duration, end_mode) = parse_duration_token(end_tok, DurationMode::Maturity)?;

    Ok(ValueInterval {
        value,
        begin_duration,
        begin_mode,
        begin_inclusive,
        end_duration,
        end_mode,
        end_inclusive,
    })
}

fn parse_duration_token(token: &str, default_mode_if_empty: DurationMode) -> Result<(u32, DurationMode), String> {
    if token.is_empty() {
        return Ok((0, default_mode_if_empty));
    }
    if let Some(rest) = token.strip_prefix('@') {
        let age: u32 = rest
            .parse()
            .map_err(|_| format!("invalid attained-age token '{token}'"))?;
        return Ok((age, DurationMode::AttainedAge));
    }
    if let Some(rest) = token.strip_prefix('#') {
        let n: u32 = rest
            .parse()
            .map_err(|_| format!("invalid duration token '{token}'"))?;
        return Ok((n, DurationMode::Duration));
    }
    match token {
        "retirement" => return Ok((0, DurationMode::Retirement)),
        "maturity" => return Ok((0, DurationMode::Maturity)),
        "inception" => return Ok((0, DurationMode::Inception)),
        "inforce" => return Ok((0, DurationMode::Inforce)),
        _ => {}
    }
    let n: u32 = token
        .parse()
        .map_err(|_| format!("unrecognized duration token '{token}'"))?;
    Ok((n, DurationMode::NumberOfYears))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_flat_value_covers_whole_horizon() {
        let parsed = parse("10000");
        assert!(parsed.diagnostics.is_empty());
        let vec = parsed.realize(10, 45, 65, 0).unwrap();
        assert_eq!(vec, vec![10000.0; 10]);
    }

    #[test]
    fn two_piece_schedule_around_retirement() {
        let parsed = parse("10000 [0,retirement); 5000 [retirement,maturity)");
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        let vec = parsed.realize(40, 45, 65, 0).unwrap();
        // retirement at duration 20 (65 - 45)
        assert_eq!(vec[0], 10000.0);
        assert_eq!(vec[19], 10000.0);
        assert_eq!(vec[20], 5000.0);
        assert_eq!(vec[39], 5000.0);
    }

    #[test]
    fn attained_age_anchor_resolves_relative_to_issue_age() {
        let parsed = parse("1000 [@45,@50)");
        assert!(parsed.diagnostics.is_empty());
        let vec = parsed.realize(20, 45, 65, 0).unwrap();
        assert_eq!(vec[0], 1000.0);
        assert_eq!(vec[4], 1000.0);
        assert_eq!(vec[5], 0.0);
    }

    #[test]
    fn malformed_interval_accumulates_diagnostic_not_panic() {
        let parsed = parse("1000 [0,retirement");
        assert_eq!(parsed.diagnostics.len(), 1);
        assert!(parsed.realize(10, 45, 65, 0).is_err());
    }

    #[test]
    fn empty_input_is_a_diagnostic() {
        let parsed = parse("   ");
        assert_eq!(parsed.diagnostics.len(), 1);
    }

    #[test]
    fn keyword_value_round_trips_through_clause_parsing() {
        let parsed = parse("table_based [0,maturity)");
        assert!(parsed.diagnostics.is_empty());
        assert_eq!(
            parsed.intervals[0].value,
            SequenceValue::Keyword("table_based".to_string())
        );
    }
}
