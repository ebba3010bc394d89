//! # Export
//!
//! Flattens participants into the row shape shared by the CSV download and
//! the PDF printout. Both formatters consume the same rows in the same order,
//! which is the order the roster query produced.

use serde::Serialize;

use crate::{
    dates::{format_br, format_br_datetime},
    roster::{Participant, Status},
};

pub const CSV_HEADERS: [&str; 7] = [
    "Nome",
    "Telefone",
    "Data Nascimento",
    "Idade",
    "Data Inscrição",
    "Status",
    "Autorização",
];

/// One flat, display-ready row. All dates are already `dd/mm/yyyy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub name: String,
    pub phone: String,
    pub birth_date: String,
    pub age: u32,
    pub registered_at: String,
    pub status: String,
    pub consent: String,
}

/// Order-preserving flatten of an already filtered and sorted list.
pub fn to_rows(participants: &[Participant]) -> Vec<ExportRow> {
    participants
        .iter()
        .map(|p| ExportRow {
            name: p.name.clone(),
            phone: p.phone.clone().unwrap_or_default(),
            birth_date: format_br(p.birth_date),
            age: p.age,
            registered_at: format_br_datetime(p.registered_at),
            status: match p.status {
                Status::Inscrito => "inscrito".to_string(),
            },
            consent: if p.consent_delivered {
                "entregue".to_string()
            } else {
                "pendente".to_string()
            },
        })
        .collect()
}

pub fn to_csv(rows: &[ExportRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(CSV_HEADERS.join(","));

    for row in rows {
        let fields = [
            csv_field(&row.name),
            csv_field(&row.phone),
            csv_field(&row.birth_date),
            row.age.to_string(),
            csv_field(&row.registered_at),
            csv_field(&row.status),
            csv_field(&row.consent),
        ];
        lines.push(fields.join(","));
    }

    lines.join("\n")
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;

    fn participant(name: &str) -> Participant {
        Participant {
            id: "1".to_string(),
            name: name.to_string(),
            phone: Some("(62) 99999-8888".to_string()),
            birth_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            age: 25,
            registered_at: Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap(),
            status: Status::Inscrito,
            consent_delivered: false,
        }
    }

    #[test]
    fn test_rows_preserve_order() {
        let rows = to_rows(&[participant("Bruno"), participant("Ana")]);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();

        assert_eq!(names, vec!["Bruno", "Ana"]);
    }

    #[test]
    fn test_row_formatting() {
        let rows = to_rows(&[participant("Ana")]);

        assert_eq!(rows[0].birth_date, "01/01/2000");
        assert_eq!(rows[0].registered_at, "10/01/2025");
        assert_eq!(rows[0].status, "inscrito");
        assert_eq!(rows[0].consent, "pendente");
    }

    #[test]
    fn test_csv_layout() {
        let csv = to_csv(&to_rows(&[participant("Ana")]));
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Nome,Telefone,Data Nascimento,Idade,Data Inscrição,Status,Autorização"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Ana,(62) 99999-8888,01/01/2000,25,10/01/2025,inscrito,pendente"
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_csv_quotes_delimiters() {
        let csv = to_csv(&to_rows(&[participant("Silva, Ana \"Aninha\"")]));

        assert!(csv.contains("\"Silva, Ana \"\"Aninha\"\"\""));
    }
}
