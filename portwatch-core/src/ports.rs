//! Port specification parsing.
//!
//! A spec is a comma-separated list of port numbers such as `"80, 443,8080"`.
//! Whitespace around entries is ignored, and so are empty entries (a trailing
//! comma, for instance). Entries that are not valid ports are collected as
//! [`PortSpecError`]s instead of failing the whole spec.

use portwatch_types::Target;

use crate::error::PortSpecError;

/// A port accepted from a spec, with its 1-based rank.
///
/// The rank is the port's position among the *accepted* entries, so
/// rejected entries do not leave gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedPort {
    pub port: u16,
    pub rank: u16,
}

/// Result of parsing a port spec.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortSpec {
    /// Accepted ports in spec order.
    pub ports: Vec<RankedPort>,
    /// Entries that were skipped, in spec order.
    pub rejected: Vec<PortSpecError>,
}

impl PortSpec {
    /// Parse a comma-separated port list.
    ///
    /// ```rust
    /// use portwatch_core::PortSpec;
    ///
    /// let spec = PortSpec::parse("80, abc, 443");
    /// assert_eq!(spec.ports.len(), 2);
    /// assert_eq!(spec.ports[1].port, 443);
    /// assert_eq!(spec.ports[1].rank, 2);
    /// assert_eq!(spec.rejected.len(), 1);
    /// ```
    pub fn parse(spec: &str) -> Self {
        let mut parsed = PortSpec::default();

        for token in spec.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match parse_port(token) {
                Ok(port) if parsed.contains(port) => {
                    parsed.rejected.push(PortSpecError::Duplicate { port });
                }
                Ok(port) => {
                    let rank = parsed.ports.len() as u16 + 1;
                    parsed.ports.push(RankedPort { port, rank });
                }
                Err(err) => parsed.rejected.push(err),
            }
        }

        parsed
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn contains(&self, port: u16) -> bool {
        self.ports.iter().any(|p| p.port == port)
    }

    /// Pair every accepted port with `host`.
    pub fn targets(&self, host: &str) -> Vec<(Target, u16)> {
        self.ports
            .iter()
            .map(|p| (Target::new(host, p.port), p.rank))
            .collect()
    }
}

fn parse_port(token: &str) -> Result<u16, PortSpecError> {
    let value: i64 = token.parse().map_err(|_| PortSpecError::NotANumber {
        token: token.to_string(),
    })?;

    if (1..=i64::from(u16::MAX)).contains(&value) {
        Ok(value as u16)
    } else {
        Err(PortSpecError::OutOfRange {
            token: token.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ports(spec: &PortSpec) -> Vec<(u16, u16)> {
        spec.ports.iter().map(|p| (p.port, p.rank)).collect()
    }

    #[test]
    fn ranks_follow_parse_order() {
        let spec = PortSpec::parse("8080,22,443");
        assert_eq!(ports(&spec), vec![(8080, 1), (22, 2), (443, 3)]);
        assert!(spec.rejected.is_empty());
    }

    #[test]
    fn invalid_entry_is_skipped_without_consuming_a_rank() {
        let spec = PortSpec::parse("80, abc, 443");
        assert_eq!(ports(&spec), vec![(80, 1), (443, 2)]);
        assert_eq!(
            spec.rejected,
            vec![PortSpecError::NotANumber {
                token: "abc".to_string()
            }]
        );
    }

    #[test]
    fn whitespace_is_tolerated() {
        let spec = PortSpec::parse("  22 ,\t80 ,  \n 443  ");
        assert_eq!(ports(&spec), vec![(22, 1), (80, 2), (443, 3)]);
    }

    #[test]
    fn empty_entries_are_ignored() {
        assert!(PortSpec::parse("").is_empty());
        assert!(PortSpec::parse(" , ,").rejected.is_empty());

        let spec = PortSpec::parse("80,");
        assert_eq!(ports(&spec), vec![(80, 1)]);
        assert!(spec.rejected.is_empty());
    }

    #[test]
    fn out_of_range_ports_are_rejected() {
        let spec = PortSpec::parse("0, 65535, 65536, -1");
        assert_eq!(ports(&spec), vec![(65535, 1)]);
        assert_eq!(spec.rejected.len(), 3);
        assert!(spec
            .rejected
            .iter()
            .all(|e| matches!(e, PortSpecError::OutOfRange { .. })));
    }

    #[test]
    fn decimal_and_huge_numbers_are_not_ports() {
        let spec = PortSpec::parse("80.5, 99999999999999999999999");
        assert!(spec.is_empty());
        assert!(spec
            .rejected
            .iter()
            .all(|e| matches!(e, PortSpecError::NotANumber { .. })));
    }

    #[test]
    fn duplicates_keep_first_rank() {
        let spec = PortSpec::parse("80, 443, 80, 22");
        assert_eq!(ports(&spec), vec![(80, 1), (443, 2), (22, 3)]);
        assert_eq!(spec.rejected, vec![PortSpecError::Duplicate { port: 80 }]);
    }

    #[test]
    fn targets_share_the_host() {
        let spec = PortSpec::parse("80,443");
        let targets = spec.targets("example.com");
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0], (Target::new("example.com", 80), 1));
        assert_eq!(targets[1], (Target::new("example.com", 443), 2));
    }
}
