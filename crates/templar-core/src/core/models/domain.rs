use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RangeParseError {
    #[error("Domain range '{0}' is not of the form 'start:end'")]
    Malformed(String),
    #[error("Domain range '{text}' has a non-integer bound '{bound}'")]
    InvalidBound { text: String, bound: String },
    #[error("Domain range '{0}' ends before it starts")]
    Inverted(String),
}

/// An inclusive residue interval.
///
/// Query ranges are 1-based sequence positions; structure ranges use the author
/// numbering of the deposited chain and may therefore start at zero or below.
/// The external representation is the string `"start:end"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomainRange {
    pub start: isize,
    pub end: isize,
}

impl DomainRange {
    pub fn new(start: isize, end: isize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        (self.end - self.start + 1).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn encode(&self) -> String {
        format!("{}:{}", self.start, self.end)
    }

    pub fn decode(text: &str) -> Result<Self, RangeParseError> {
        let (start, end) = text
            .trim()
            .split_once(':')
            .ok_or_else(|| RangeParseError::Malformed(text.to_string()))?;
        let parse_bound = |bound: &str| {
            bound
                .trim()
                .parse::<isize>()
                .map_err(|_| RangeParseError::InvalidBound {
                    text: text.to_string(),
                    bound: bound.to_string(),
                })
        };
        let range = Self::new(parse_bound(start)?, parse_bound(end)?);
        if range.is_empty() {
            return Err(RangeParseError::Inverted(text.to_string()));
        }
        Ok(range)
    }

    /// Whether the range is a valid window into a sequence of `sequence_len` residues.
    pub fn fits_sequence(&self, sequence_len: usize) -> bool {
        self.start >= 1 && self.start <= self.end && self.end as usize <= sequence_len
    }

    /// Byte slice of a 1-based inclusive window. The caller guarantees `fits_sequence`.
    pub fn slice<'s>(&self, sequence: &'s str) -> &'s str {
        &sequence[(self.start - 1) as usize..self.end as usize]
    }
}

impl fmt::Display for DomainRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

impl FromStr for DomainRange {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for DomainRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for DomainRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::decode(&text).map_err(serde::de::Error::custom)
    }
}

/// A single query domain: a family-annotated window of one protein sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SingleDomain {
    pub identity: String,
    pub family: String,
    pub range: DomainRange,
    pub sequence_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DomainPair {
    pub first: SingleDomain,
    pub second: SingleDomain,
}

/// The unit of work for template selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum DomainUnit {
    Single(SingleDomain),
    Pair(DomainPair),
}

impl DomainUnit {
    pub fn label(&self) -> String {
        match self {
            DomainUnit::Single(domain) => domain.identity.clone(),
            DomainUnit::Pair(pair) => {
                format!("{}*{}", pair.first.identity, pair.second.identity)
            }
        }
    }

    /// Relative directory under which artifacts for this unit are staged.
    pub fn storage_key(&self) -> String {
        match self {
            DomainUnit::Single(domain) => {
                format!("{}/{}", sanitize(&domain.sequence_id), sanitize(&domain.identity))
            }
            DomainUnit::Pair(pair) => format!(
                "{}/{}_{}",
                sanitize(&pair.first.sequence_id),
                sanitize(&pair.first.identity),
                sanitize(&pair.second.identity)
            ),
        }
    }

    /// Content-derived key: two units with equal keys select the same template.
    pub fn cache_key(&self) -> String {
        let side = |d: &SingleDomain| format!("{}|{}|{}", d.sequence_id, d.family, d.range);
        match self {
            DomainUnit::Single(domain) => format!("single:{}", side(domain)),
            DomainUnit::Pair(pair) => {
                format!("pair:{}+{}", side(&pair.first), side(&pair.second))
            }
        }
    }
}

fn sanitize(component: &str) -> String {
    component
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | ' ' => '_',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain(identity: &str, range: &str) -> SingleDomain {
        SingleDomain {
            identity: identity.to_string(),
            family: "Ras".to_string(),
            range: range.parse().unwrap(),
            sequence_id: "P01112".to_string(),
        }
    }

    #[test]
    fn decode_inverts_encode_for_valid_ranges() {
        for (start, end) in [(1, 1), (1, 166), (10, 50), (-3, 12), (0, 0), (999, 1200)] {
            let range = DomainRange::new(start, end);
            assert_eq!(DomainRange::decode(&range.encode()).unwrap(), range);
        }
    }

    #[test]
    fn decode_accepts_surrounding_whitespace() {
        assert_eq!(
            DomainRange::decode(" 5 : 40 ").unwrap(),
            DomainRange::new(5, 40)
        );
    }

    #[test]
    fn decode_rejects_malformed_strings() {
        assert!(matches!(
            DomainRange::decode("5-40"),
            Err(RangeParseError::Malformed(_))
        ));
        assert!(matches!(
            DomainRange::decode("a:40"),
            Err(RangeParseError::InvalidBound { .. })
        ));
        assert!(matches!(
            DomainRange::decode("40:5"),
            Err(RangeParseError::Inverted(_))
        ));
    }

    #[test]
    fn len_counts_both_bounds() {
        assert_eq!(DomainRange::new(10, 50).len(), 41);
        assert_eq!(DomainRange::new(-2, 2).len(), 5);
    }

    #[test]
    fn fits_sequence_enforces_one_based_bounds() {
        assert!(DomainRange::new(1, 100).fits_sequence(100));
        assert!(!DomainRange::new(0, 10).fits_sequence(100));
        assert!(!DomainRange::new(90, 101).fits_sequence(100));
    }

    #[test]
    fn slice_extracts_inclusive_window() {
        assert_eq!(DomainRange::new(2, 4).slice("ABCDEF"), "BCD");
        assert_eq!(DomainRange::new(1, 6).slice("ABCDEF"), "ABCDEF");
    }

    #[test]
    fn serde_uses_string_form() {
        let toml_text = toml::to_string(&domain("P01112_Ras", "1:166")).unwrap();
        assert!(toml_text.contains("range = \"1:166\""));
        let parsed: SingleDomain = toml::from_str(&toml_text).unwrap();
        assert_eq!(parsed.range, DomainRange::new(1, 166));
    }

    #[test]
    fn storage_and_cache_keys_distinguish_units() {
        let single = DomainUnit::Single(domain("P01112_Ras", "1:166"));
        let pair = DomainUnit::Pair(DomainPair {
            first: domain("P01112_Ras", "1:166"),
            second: domain("P01112_RasGEF", "200:400"),
        });
        assert_eq!(single.storage_key(), "P01112/P01112_Ras");
        assert_eq!(pair.storage_key(), "P01112/P01112_Ras_P01112_RasGEF");
        assert_ne!(single.cache_key(), pair.cache_key());
        assert_eq!(pair.label(), "P01112_Ras*P01112_RasGEF");
    }
}
