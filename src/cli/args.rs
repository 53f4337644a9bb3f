//! Flag parsing and record references for shell commands.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::cli::core::CommandError;

/// Positional arguments plus the `--flag value` and `--switch` options a
/// command declared. `--flag=value` is accepted too.
#[derive(Debug, Default)]
pub(crate) struct ParsedArgs<'a> {
    positionals: Vec<&'a str>,
    values: HashMap<&'static str, &'a str>,
    switches: HashSet<&'static str>,
}

impl<'a> ParsedArgs<'a> {
    pub(crate) fn parse(
        args: &[&'a str],
        value_flags: &[&'static str],
        switch_flags: &[&'static str],
    ) -> Result<Self, CommandError> {
        let mut parsed = ParsedArgs::default();
        let mut iter = args.iter().copied();
        while let Some(arg) = iter.next() {
            let Some(flag) = arg.strip_prefix("--") else {
                parsed.positionals.push(arg);
                continue;
            };
            let (name, inline) = match flag.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (flag, None),
            };
            if let Some(known) = value_flags.iter().copied().find(|candidate| *candidate == name) {
                let value = match inline {
                    Some(value) => value,
                    None => iter.next().ok_or_else(|| {
                        CommandError::InvalidArguments(format!("`--{name}` expects a value"))
                    })?,
                };
                parsed.values.insert(known, value);
            } else if let Some(known) = switch_flags.iter().copied().find(|candidate| *candidate == name) {
                if inline.is_some() {
                    return Err(CommandError::InvalidArguments(format!(
                        "`--{name}` does not take a value"
                    )));
                }
                parsed.switches.insert(known);
            } else {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown option `--{name}`"
                )));
            }
        }
        Ok(parsed)
    }

    pub(crate) fn positionals(&self) -> &[&'a str] {
        &self.positionals
    }

    pub(crate) fn value(&self, flag: &str) -> Option<&'a str> {
        self.values.get(flag).copied()
    }

    pub(crate) fn has(&self, flag: &str) -> bool {
        self.switches.contains(flag)
    }
}

/// Resolves a 1-based row number from the default listing, or a unique id
/// prefix, to a record id.
pub(crate) fn resolve_reference(ids: &[Uuid], reference: &str) -> Result<Uuid, CommandError> {
    let reference = reference.trim();
    if let Ok(row) = reference.parse::<usize>() {
        return row
            .checked_sub(1)
            .and_then(|idx| ids.get(idx))
            .copied()
            .ok_or_else(|| {
                CommandError::InvalidArguments(format!(
                    "no row {row}; the list has {} entries",
                    ids.len()
                ))
            });
    }

    let needle = reference.to_ascii_lowercase();
    let mut matches = ids
        .iter()
        .filter(|id| id.to_string().starts_with(&needle));
    match (matches.next(), matches.next()) {
        (Some(id), None) if !needle.is_empty() => Ok(*id),
        (Some(_), Some(_)) => Err(CommandError::InvalidArguments(format!(
            "`{reference}` matches more than one record"
        ))),
        _ => Err(CommandError::InvalidArguments(format!(
            "no record matches `{reference}`"
        ))),
    }
}

/// Resolves every reference, failing on the first unknown one.
pub(crate) fn resolve_references(ids: &[Uuid], references: &[&str]) -> Result<Vec<Uuid>, CommandError> {
    references
        .iter()
        .map(|reference| resolve_reference(ids, reference))
        .collect()
}

/// Short form of an id for listings.
pub(crate) fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separates_positionals_values_and_switches() {
        let args = ["Salary", "2500", "--income", "--date=2024-03-01", "Salary"];
        let parsed = ParsedArgs::parse(&args, &["date"], &["income"]).unwrap();
        assert_eq!(parsed.positionals(), &["Salary", "2500", "Salary"]);
        assert_eq!(parsed.value("date"), Some("2024-03-01"));
        assert!(parsed.has("income"));
    }

    #[test]
    fn rejects_unknown_and_incomplete_flags() {
        assert!(ParsedArgs::parse(&["--bogus"], &[], &[]).is_err());
        assert!(ParsedArgs::parse(&["--date"], &["date"], &[]).is_err());
        assert!(ParsedArgs::parse(&["--income=yes"], &[], &["income"]).is_err());
    }

    #[test]
    fn resolves_rows_and_prefixes() {
        let first = Uuid::parse_str("aaaaaaaa-0000-4000-8000-000000000001").unwrap();
        let second = Uuid::parse_str("abbbbbbb-0000-4000-8000-000000000002").unwrap();
        let ids = [first, second];

        assert_eq!(resolve_reference(&ids, "2").unwrap(), second);
        assert_eq!(resolve_reference(&ids, "AB").unwrap(), second);
        assert!(resolve_reference(&ids, "0").is_err());
        assert!(resolve_reference(&ids, "3").is_err());
        assert!(resolve_reference(&ids, "a").is_err());
        assert!(resolve_reference(&ids, "ff").is_err());
        assert_eq!(short_id(first), "aaaaaaaa");
    }
}
