//! # Roster
//!
//! The participant model and the query pipeline behind the admin table.
//!
//! The store hands back the full roster on every admin action; all searching,
//! filtering and paging happens here, in memory, over tens to low hundreds of
//! records. The pipeline is a pure function so the handlers stay thin and the
//! semantics stay testable.
//!
//! ## Filters
//!
//! - Name search only kicks in at 3 typed characters, matching the frontend
//!   debounce rule. 1 or 2 characters match nothing.
//! - The minor/adult and delivered/pending filters are checkbox pairs in the
//!   UI. Checking both boxes means "don't restrict", so each pair is modeled
//!   as a tri-state with `All` as a named variant instead of two independent
//!   booleans.
//! - Phone filtering is an exact match on the final 4 digits and stays off
//!   until exactly 4 digits are typed.
//!
//! ## Ordering
//!
//! Rows sort ascending by name, case- and accent-insensitive, so "Ângela"
//! lands next to "Angela" instead of after "Zuleide". The sort is stable:
//! equal names keep registration order.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::{
    dates::is_minor,
    phone::last_four_digits,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Inscrito,
}

/// One participant document. Stored field names keep the original Portuguese
/// schema so documents written by earlier versions of the site stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(default)]
    pub id: String,

    #[serde(rename = "nome")]
    pub name: String,

    #[serde(rename = "telefone", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(rename = "dataNascimento")]
    pub birth_date: NaiveDate,

    #[serde(rename = "idade")]
    pub age: u32,

    #[serde(rename = "dataInscricao")]
    pub registered_at: DateTime<Utc>,

    pub status: Status,

    #[serde(rename = "autorizacaoEntregue", default)]
    pub consent_delivered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgeFilter {
    #[default]
    All,
    OnlyMinors,
    OnlyAdults,
}

impl AgeFilter {
    /// Maps the minor/adult checkbox pair. Both boxes checked (or neither)
    /// restricts nothing.
    pub fn from_flags(minors: bool, adults: bool) -> Self {
        match (minors, adults) {
            (true, false) => AgeFilter::OnlyMinors,
            (false, true) => AgeFilter::OnlyAdults,
            _ => AgeFilter::All,
        }
    }

    fn matches(self, age: u32) -> bool {
        match self {
            AgeFilter::All => true,
            AgeFilter::OnlyMinors => is_minor(age),
            AgeFilter::OnlyAdults => !is_minor(age),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsentFilter {
    #[default]
    All,
    OnlyDelivered,
    OnlyPending,
}

impl ConsentFilter {
    pub fn from_flags(delivered: bool, pending: bool) -> Self {
        match (delivered, pending) {
            (true, false) => ConsentFilter::OnlyDelivered,
            (false, true) => ConsentFilter::OnlyPending,
            _ => ConsentFilter::All,
        }
    }

    fn matches(self, consent_delivered: bool) -> bool {
        match self {
            ConsentFilter::All => true,
            ConsentFilter::OnlyDelivered => consent_delivered,
            ConsentFilter::OnlyPending => !consent_delivered,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Criteria {
    pub name_contains: Option<String>,
    pub registered_on: Option<NaiveDate>,
    pub age: AgeFilter,
    pub consent: ConsentFilter,
    pub phone_suffix: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage {
    pub rows: Vec<Participant>,
    pub total_pages: usize,
}

const MIN_NAME_SEARCH_CHARS: usize = 3;

fn name_matches(needle: &str, name: &str) -> bool {
    let needle = needle.trim();
    if needle.chars().count() < MIN_NAME_SEARCH_CHARS {
        return false;
    }

    name.to_lowercase().contains(&needle.to_lowercase())
}

/// Case-insensitive sort key with combining marks stripped, approximating
/// pt-BR collation without a full collator.
fn sort_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Filters and sorts without paging. Exports consume this directly so the
/// file rows match the table rows.
pub fn filtered(roster: &[Participant], criteria: &Criteria) -> Vec<Participant> {
    let mut rows: Vec<&Participant> = roster.iter().collect();

    if let Some(needle) = criteria.name_contains.as_deref() {
        if !needle.trim().is_empty() {
            rows.retain(|p| name_matches(needle, &p.name));
        }
    }

    if let Some(date) = criteria.registered_on {
        rows.retain(|p| p.registered_at.date_naive() == date);
    }

    rows.retain(|p| criteria.age.matches(p.age));
    rows.retain(|p| criteria.consent.matches(p.consent_delivered));

    if let Some(suffix) = criteria.phone_suffix.as_deref() {
        let digits: String = suffix.chars().filter(char::is_ascii_digit).collect();
        if digits.len() == 4 {
            rows.retain(|p| {
                p.phone
                    .as_deref()
                    .is_some_and(|phone| last_four_digits(phone) == digits)
            });
        }
    }

    rows.sort_by_cached_key(|p| sort_key(&p.name));

    rows.into_iter().cloned().collect()
}

/// One page of the filtered, sorted roster. Pages are 1-based; a page past
/// the end (or page 0) is an empty row set, never an error.
pub fn query(
    roster: &[Participant],
    criteria: &Criteria,
    page: usize,
    page_size: usize,
) -> QueryPage {
    if page_size == 0 {
        return QueryPage {
            rows: Vec::new(),
            total_pages: 0,
        };
    }

    let rows = filtered(roster, criteria);
    let total_pages = rows.len().div_ceil(page_size);

    let rows = if page == 0 {
        Vec::new()
    } else {
        rows.into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .collect()
    };

    QueryPage { rows, total_pages }
}

/// Distinct registration dates with counts, newest first. Built from the
/// unfiltered roster for the admin date chips.
pub fn date_counts(roster: &[Participant]) -> Vec<(NaiveDate, usize)> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for participant in roster {
        *counts
            .entry(participant.registered_at.date_naive())
            .or_default() += 1;
    }

    counts.into_iter().rev().collect()
}

/// Distinct last-4-digit phone groups with counts, biggest group first,
/// suffix order on ties. Participants without a phone are skipped.
pub fn phone_suffix_counts(roster: &[Participant]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for participant in roster {
        if let Some(phone) = participant.phone.as_deref() {
            let suffix = last_four_digits(phone);
            if !suffix.is_empty() {
                *counts.entry(suffix).or_default() += 1;
            }
        }
    }

    let mut groups: Vec<(String, usize)> = counts.into_iter().collect();
    groups.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    groups
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn participant(id: &str, name: &str, age: u32) -> Participant {
        Participant {
            id: id.to_string(),
            name: name.to_string(),
            phone: None,
            birth_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            age,
            registered_at: Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap(),
            status: Status::Inscrito,
            consent_delivered: false,
        }
    }

    fn with_phone(mut p: Participant, phone: &str) -> Participant {
        p.phone = Some(phone.to_string());
        p
    }

    #[test]
    fn test_query_is_idempotent() {
        let roster = vec![
            participant("1", "Bruno", 20),
            participant("2", "Ana", 17),
            participant("3", "Carla", 30),
        ];

        let first = query(&roster, &Criteria::default(), 1, 10);
        let second = query(&roster, &Criteria::default(), 1, 10);

        assert_eq!(first, second);
    }

    #[test]
    fn test_sorts_by_name_ignoring_case_and_accents() {
        let roster = vec![
            participant("1", "bruno", 20),
            participant("2", "Ângela", 25),
            participant("3", "Amanda", 30),
        ];

        let page = query(&roster, &Criteria::default(), 1, 10);
        let names: Vec<&str> = page.rows.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(names, vec!["Amanda", "Ângela", "bruno"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_names() {
        let roster = vec![
            participant("1", "ana silva", 20),
            participant("2", "Ana Silva", 25),
        ];

        let page = query(&roster, &Criteria::default(), 1, 10);
        let ids: Vec<&str> = page.rows.iter().map(|p| p.id.as_str()).collect();

        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_short_name_search_matches_nothing() {
        let roster = vec![participant("1", "Ana Silva", 20)];
        let criteria = Criteria {
            name_contains: Some("an".to_string()),
            ..Criteria::default()
        };

        let page = query(&roster, &criteria, 1, 10);

        assert!(page.rows.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_name_search_is_case_insensitive_substring() {
        let roster = vec![
            participant("1", "Ana Silva", 20),
            participant("2", "Mariana Costa", 25),
            participant("3", "Bruno Lima", 30),
        ];
        let criteria = Criteria {
            name_contains: Some("ana".to_string()),
            ..Criteria::default()
        };

        let page = query(&roster, &criteria, 1, 10);
        let names: Vec<&str> = page.rows.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(names, vec!["Ana Silva", "Mariana Costa"]);
    }

    #[test]
    fn test_both_age_boxes_checked_is_a_no_op() {
        let roster = vec![
            participant("1", "Ana", 17),
            participant("2", "Bruno", 20),
            participant("3", "Carla", 15),
        ];

        let unfiltered = query(&roster, &Criteria::default(), 1, 10);
        let both = query(
            &roster,
            &Criteria {
                age: AgeFilter::from_flags(true, true),
                ..Criteria::default()
            },
            1,
            10,
        );

        assert_eq!(unfiltered, both);
    }

    #[test]
    fn test_age_filter_uses_minor_boundary() {
        let roster = vec![
            participant("1", "Ana", 17),
            participant("2", "Bruno", 18),
        ];

        let minors = query(
            &roster,
            &Criteria {
                age: AgeFilter::from_flags(true, false),
                ..Criteria::default()
            },
            1,
            10,
        );
        let adults = query(
            &roster,
            &Criteria {
                age: AgeFilter::from_flags(false, true),
                ..Criteria::default()
            },
            1,
            10,
        );

        assert_eq!(minors.rows[0].name, "Ana");
        assert_eq!(adults.rows[0].name, "Bruno");
    }

    #[test]
    fn test_consent_filter() {
        let mut delivered = participant("1", "Ana", 17);
        delivered.consent_delivered = true;
        let pending = participant("2", "Bia", 16);
        let roster = vec![delivered, pending];

        let only_pending = query(
            &roster,
            &Criteria {
                consent: ConsentFilter::from_flags(false, true),
                ..Criteria::default()
            },
            1,
            10,
        );

        assert_eq!(only_pending.rows.len(), 1);
        assert_eq!(only_pending.rows[0].name, "Bia");

        let both = query(
            &roster,
            &Criteria {
                consent: ConsentFilter::from_flags(true, true),
                ..Criteria::default()
            },
            1,
            10,
        );
        assert_eq!(both.rows.len(), 2);
    }

    #[test]
    fn test_registration_date_filter() {
        let mut early = participant("1", "Ana", 20);
        early.registered_at = Utc.with_ymd_and_hms(2025, 1, 9, 23, 30, 0).unwrap();
        let late = participant("2", "Bruno", 22);
        let roster = vec![early, late];

        let criteria = Criteria {
            registered_on: NaiveDate::from_ymd_opt(2025, 1, 9),
            ..Criteria::default()
        };
        let page = query(&roster, &criteria, 1, 10);

        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].name, "Ana");
    }

    #[test]
    fn test_phone_filter_needs_exactly_four_digits() {
        let roster = vec![
            with_phone(participant("1", "Ana", 20), "(62) 99999-8888"),
            with_phone(participant("2", "Bruno", 22), "(62) 98888-7777"),
        ];

        let three = query(
            &roster,
            &Criteria {
                phone_suffix: Some("888".to_string()),
                ..Criteria::default()
            },
            1,
            10,
        );
        assert_eq!(three.rows.len(), 2);

        let four = query(
            &roster,
            &Criteria {
                phone_suffix: Some("8888".to_string()),
                ..Criteria::default()
            },
            1,
            10,
        );
        assert_eq!(four.rows.len(), 1);
        assert_eq!(four.rows[0].name, "Ana");
    }

    #[test]
    fn test_pagination() {
        let roster: Vec<Participant> = (0..25)
            .map(|i| participant(&i.to_string(), &format!("Nome {i:02}"), 20))
            .collect();

        let page = query(&roster, &Criteria::default(), 1, 10);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.rows.len(), 10);

        let last = query(&roster, &Criteria::default(), 3, 10);
        assert_eq!(last.rows.len(), 5);

        let beyond = query(&roster, &Criteria::default(), 4, 10);
        assert!(beyond.rows.is_empty());
        assert_eq!(beyond.total_pages, 3);

        let zero = query(&roster, &Criteria::default(), 0, 10);
        assert!(zero.rows.is_empty());
    }

    #[test]
    fn test_date_counts_newest_first() {
        let mut first = participant("1", "Ana", 20);
        first.registered_at = Utc.with_ymd_and_hms(2025, 1, 8, 9, 0, 0).unwrap();
        let mut second = participant("2", "Bruno", 22);
        second.registered_at = Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap();
        let mut third = participant("3", "Carla", 24);
        third.registered_at = Utc.with_ymd_and_hms(2025, 1, 10, 18, 0, 0).unwrap();

        let counts = date_counts(&[first, second, third]);

        assert_eq!(
            counts,
            vec![
                (NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(), 2),
                (NaiveDate::from_ymd_opt(2025, 1, 8).unwrap(), 1),
            ]
        );
    }

    #[test]
    fn test_phone_suffix_counts_by_group_size() {
        let roster = vec![
            with_phone(participant("1", "Ana", 20), "(62) 99999-8888"),
            with_phone(participant("2", "Bruno", 22), "(62) 98888-8888"),
            with_phone(participant("3", "Carla", 24), "(62) 97777-1111"),
            participant("4", "Davi", 30),
        ];

        let groups = phone_suffix_counts(&roster);

        assert_eq!(
            groups,
            vec![("8888".to_string(), 2), ("1111".to_string(), 1)]
        );
    }
}
