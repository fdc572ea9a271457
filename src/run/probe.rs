//! Date-range probing for already-reported sites.
//!
//! One ticket search per day of the interval, in ascending order. A day with
//! no match contributes nothing; a failed search aborts the probe.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::effects::{TicketEffect, TicketInterpreter, TicketResponse, TicketRow};
use crate::types::{DateInterval, TicketId};

use super::RunError;

/// A site that already has a matching ticket on some day of the interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedUnit {
    pub ticket_id: TicketId,
    /// Entity display name with the region prefix removed.
    pub site_name: String,
}

/// Removes the first occurrence of the region prefix from an entity name.
pub fn strip_region(entity_name: &str, region_prefix: &str) -> String {
    if region_prefix.is_empty() {
        return entity_name.to_string();
    }
    entity_name.replacen(region_prefix, "", 1)
}

/// Keeps the first unit seen for each site name.
pub fn dedupe_by_site(units: Vec<ReportedUnit>) -> Vec<ReportedUnit> {
    let mut seen = HashSet::new();
    units
        .into_iter()
        .filter(|u| seen.insert(u.site_name.clone()))
        .collect()
}

fn reported_from_rows(rows: Vec<TicketRow>, region_prefix: &str) -> Vec<ReportedUnit> {
    rows.into_iter()
        .map(|row| ReportedUnit {
            ticket_id: row.id,
            site_name: strip_region(&row.entity_name, region_prefix),
        })
        .collect()
}

/// Searches every day of `interval` for tickets titled `title`.
///
/// Returns the reported units deduplicated by site name, first seen wins.
/// A reversed interval issues no search.
#[instrument(skip(interpreter, region_prefix), fields(start = %interval.start, end = %interval.end))]
pub async fn probe_interval<T>(
    interpreter: &T,
    title: &str,
    region_prefix: &str,
    interval: &DateInterval,
) -> Result<Vec<ReportedUnit>, RunError>
where
    T: TicketInterpreter,
    T::Error: fmt::Display,
{
    let mut reported = Vec::new();

    for day in interval.days() {
        let effect = TicketEffect::SearchTickets {
            title: title.to_string(),
            day,
        };
        let rows = match interpreter
            .interpret(effect)
            .await
            .map_err(|e| RunError::Remote(e.to_string()))?
        {
            TicketResponse::Tickets(rows) => rows,
            other => return Err(RunError::unexpected("search_tickets", &other)),
        };
        debug!(%day, matches = rows.len(), "Probed day");
        reported.extend(reported_from_rows(rows, region_prefix));
    }

    Ok(dedupe_by_site(reported))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockTicketInterpreter;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    const PREFIX: &str = "REGIAO SACA > ";

    fn unit(id: u64, name: &str) -> ReportedUnit {
        ReportedUnit {
            ticket_id: TicketId(id),
            site_name: name.to_string(),
        }
    }

    fn row(id: u64, entity: &str) -> TicketRow {
        TicketRow {
            id: TicketId(id),
            entity_name: entity.to_string(),
        }
    }

    fn interval(start: &str, end: &str) -> DateInterval {
        DateInterval::parse(start, end).unwrap()
    }

    #[test]
    fn strip_region_removes_prefix() {
        assert_eq!(strip_region("REGIAO SACA > UBS Centro", PREFIX), "UBS Centro");
        assert_eq!(strip_region("Hospital", PREFIX), "Hospital");
        assert_eq!(strip_region("Hospital", ""), "Hospital");
    }

    #[test]
    fn strip_region_removes_only_the_first_occurrence() {
        assert_eq!(
            strip_region("REGIAO SACA > UBS REGIAO SACA > Anexo", PREFIX),
            "UBS REGIAO SACA > Anexo"
        );
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let units = vec![unit(1, "A"), unit(2, "B"), unit(3, "A"), unit(4, "C"), unit(5, "B")];
        assert_eq!(
            dedupe_by_site(units),
            vec![unit(1, "A"), unit(2, "B"), unit(4, "C")]
        );
    }

    #[tokio::test]
    async fn issues_one_search_per_day_inclusive() {
        let mock = MockTicketInterpreter::new();
        let found = probe_interval(&mock, "Verificar", PREFIX, &interval("2025-08-05", "2025-08-09"))
            .await
            .unwrap();
        assert!(found.is_empty());

        let days: Vec<NaiveDate> = mock
            .effects()
            .into_iter()
            .filter_map(|e| match e {
                TicketEffect::SearchTickets { day, .. } => Some(day),
                _ => None,
            })
            .collect();
        assert_eq!(days.len(), 5);
        assert_eq!(days[0], NaiveDate::from_ymd_opt(2025, 8, 5).unwrap());
        assert_eq!(days[4], NaiveDate::from_ymd_opt(2025, 8, 9).unwrap());
    }

    #[tokio::test]
    async fn reversed_interval_issues_no_search() {
        let mock = MockTicketInterpreter::new();
        probe_interval(&mock, "Verificar", PREFIX, &interval("2025-08-09", "2025-08-05"))
            .await
            .unwrap();
        assert!(mock.effects().is_empty());
    }

    #[tokio::test]
    async fn collects_and_dedupes_across_days() {
        let mock = MockTicketInterpreter::new()
            .with_search(
                "2025-08-05",
                vec![row(10, "REGIAO SACA > UBS Centro"), row(11, "REGIAO SACA > UBS Norte")],
            )
            .with_search("2025-08-06", vec![row(12, "REGIAO SACA > UBS Centro")]);

        let found = probe_interval(&mock, "Verificar", PREFIX, &interval("2025-08-05", "2025-08-06"))
            .await
            .unwrap();
        assert_eq!(found, vec![unit(10, "UBS Centro"), unit(11, "UBS Norte")]);
    }

    #[tokio::test]
    async fn failed_search_aborts_probe() {
        let mock = MockTicketInterpreter::new().fail_on("search_tickets", "ERROR_SESSION_TOKEN_INVALID");
        let err = probe_interval(&mock, "Verificar", PREFIX, &interval("2025-08-05", "2025-08-07"))
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Remote(msg) if msg.contains("ERROR_SESSION_TOKEN_INVALID")));
        assert_eq!(mock.effects().len(), 1);
    }

    proptest! {
        #[test]
        fn search_count_is_span_plus_one(offset in 0i64..400, span in 0i64..40) {
            let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(offset);
            let end = start + chrono::Duration::days(span);
            let interval = DateInterval::new(start, end);
            let mock = MockTicketInterpreter::new();
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(probe_interval(&mock, "t", PREFIX, &interval)).unwrap();
            prop_assert_eq!(mock.effects().len() as i64, span + 1);
        }

        #[test]
        fn dedupe_yields_unique_names_in_first_seen_order(
            names in prop::collection::vec("[a-d]", 0..20)
        ) {
            let units: Vec<ReportedUnit> = names
                .iter()
                .enumerate()
                .map(|(i, n)| unit(i as u64, n))
                .collect();
            let deduped = dedupe_by_site(units);

            let mut expected: Vec<String> = Vec::new();
            for n in &names {
                if !expected.contains(n) {
                    expected.push(n.clone());
                }
            }
            let got: Vec<String> = deduped.iter().map(|u| u.site_name.clone()).collect();
            prop_assert_eq!(got, expected);
        }
    }
}
