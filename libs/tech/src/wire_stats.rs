//! Wire-length statistics reports.
//!
//! The routing-distance report compares an attacker's estimated wiring
//! distance against the design's own wire-length distribution, taken from a
//! place-and-route statistics report containing lines of the form:
//!
//! ```text
//! Avg net length = 12.4 (sigma = 3.1)
//! Avg connection length = 8.2 (sigma = 2.7)
//! ```

use nom::{
    bytes::complete::tag,
    character::complete::multispace0,
    number::complete::double,
    IResult, Parser,
};
use serde::{Deserialize, Serialize};

use crate::error::{TechError, TechResult};

/// Mean and standard deviation of net and connection lengths, in microns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WireStats {
    /// Mean net length.
    pub net_mean: f64,
    /// Net length standard deviation.
    pub net_sigma: f64,
    /// Mean connection length.
    pub connection_mean: f64,
    /// Connection length standard deviation.
    pub connection_sigma: f64,
}

/// Parses a wire statistics report.
///
/// # Errors
///
/// Fails with [`TechError::MissingRecord`] if either statistics line is
/// absent.
pub fn parse_wire_stats(text: &str) -> TechResult<WireStats> {
    let mut net = None;
    let mut connection = None;
    for raw in text.lines() {
        let line = raw.trim();
        if line.starts_with("Avg net length") {
            if let Ok((_, pair)) = parse_stat_tail(line, "Avg net length") {
                net = Some(pair);
            }
        } else if line.starts_with("Avg connection length") {
            if let Ok((_, pair)) = parse_stat_tail(line, "Avg connection length") {
                connection = Some(pair);
            }
        }
    }
    let (net_mean, net_sigma) = net.ok_or(TechError::MissingRecord {
        what: "`Avg net length` line in wire report",
    })?;
    let (connection_mean, connection_sigma) = connection.ok_or(TechError::MissingRecord {
        what: "`Avg connection length` line in wire report",
    })?;
    Ok(WireStats {
        net_mean,
        net_sigma,
        connection_mean,
        connection_sigma,
    })
}

/// `<prefix> = <mean> (sigma = <sigma>)`.
fn parse_stat_tail<'a>(input: &'a str, prefix: &str) -> IResult<&'a str, (f64, f64)> {
    let (rest, _) = tag(prefix).parse(input)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = tag("=").parse(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, mean) = double(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = tag("(sigma").parse(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = tag("=").parse(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, sigma) = double(rest)?;
    let (rest, _) = tag(")").parse(rest)?;
    Ok((rest, (mean, sigma)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_lines_parse() {
        let report = "\
Route Summary
  Avg net length = 12.4 (sigma = 3.1)
  Avg connection length = 8.2 (sigma = 2.7)
";
        let stats = parse_wire_stats(report).unwrap();
        assert_eq!(stats.net_mean, 12.4);
        assert_eq!(stats.net_sigma, 3.1);
        assert_eq!(stats.connection_mean, 8.2);
        assert_eq!(stats.connection_sigma, 2.7);
    }

    #[test]
    fn missing_lines_are_fatal() {
        assert!(matches!(
            parse_wire_stats("Avg net length = 1.0 (sigma = 2.0)\n"),
            Err(TechError::MissingRecord { .. })
        ));
    }
}
