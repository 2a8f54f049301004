//! PontoMais export: `Seg, 04/03/2024` rows followed by the punches only.

use lazy_static::lazy_static;
use regex::Regex;

use super::{has_marker, set_header, DayRow, DayStatus, CATEGORY, ICON, PERIOD};
use crate::catalog::{text_lines, DocumentModel, ModelDescriptor};
use crate::models::record::{ExtractionRecord, RowsLabel};
use crate::rules::{clamp_score, first_capture, PunchFilter};

lazy_static! {
    static ref DAY: Regex =
        Regex::new(r"(?i)(Seg|Ter|Qua|Qui|Sex|Sáb|Sab|Dom),?\s*(\d{2}/\d{2}/\d{4})").unwrap();
    static ref TIME_TOKEN: Regex = Regex::new(r"^\d{2}:\d{2}$").unwrap();
    static ref EMPLOYEE: Regex =
        Regex::new(r"(?m)(?:Colaborador|Funcionário|Nome):\s*(.+?)(?:\s{2,}|\s+CPF|\s+PIS|\s*$)").unwrap();
}

static DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "Cartão Ponto — PontoMais",
    icon: ICON,
    description: "Relatório de ponto exportado pelo PontoMais",
    category: CATEGORY,
    variant: "PontoMais",
    period: PERIOD,
    requires_cleaning: false,
};

const DAY_OFF_MARKERS: [&str; 4] = ["folga", "feriado", "dsr", "compensado"];
const ABSENCE_MARKERS: [&str; 3] = ["ausente", "falta", "atestado"];

pub struct PontoMaisTimecard;

impl PontoMaisTimecard {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PontoMaisTimecard {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentModel for PontoMaisTimecard {
    fn descriptor(&self) -> &ModelDescriptor {
        &DESCRIPTOR
    }

    fn detect(&self, text: &str) -> f32 {
        let lowered = text.to_lowercase();
        let mut score = if lowered.contains("pontomais") || lowered.contains("ponto mais") {
            0.40
        } else {
            0.0
        };
        if DAY.find_iter(text).count() > 5 {
            score += 0.35;
        }
        if lowered.contains("cartão") || lowered.contains("ponto") {
            score += 0.10;
        }
        clamp_score(score)
    }

    fn extract(&self, text: &str) -> ExtractionRecord {
        let mut record = ExtractionRecord::tabular("Cartão Ponto (PontoMais)", RowsLabel::Registros);
        set_header(&mut record, first_capture(&[&*EMPLOYEE], text), None);

        let filter = PunchFilter::new();
        for line in text_lines(text) {
            let Some(caps) = DAY.captures(line) else {
                continue;
            };
            let rest = &line[caps.get(0).map_or(0, |m| m.end())..];
            if has_marker(rest, &ABSENCE_MARKERS) {
                record.push_row(DayRow::absent(&caps[2], &caps[1], DayStatus::Ausente).into_fields());
                continue;
            }
            if has_marker(rest, &DAY_OFF_MARKERS) {
                record.push_row(DayRow::absent(&caps[2], &caps[1], DayStatus::Folga).into_fields());
                continue;
            }

            let candidates: Vec<&str> = line
                .split_whitespace()
                .filter(|t| TIME_TOKEN.is_match(t))
                .collect();
            let punches = filter.filter(&candidates);
            record.push_row(DayRow::new(&caps[2], &caps[1]).with_punches(punches).into_fields());
        }

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
PontoMais - Espelho
Colaborador: ANA SOUZA  CPF 123.456.789-09
Seg, 04/03/2024 08:02 12:00 13:01 17:04 8h02
Ter, 05/03/2024 07:58 12:03 11:00 13:00
Qua, 06/03/2024 Folga
Qui, 07/03/2024 08:00 12:00 13:00 17:00 18:00
Sex, 08/03/2024 08:10
Sáb, 09/03/2024 09:00 13:00
Dom, 10/03/2024
Seg, 11/03/2024 Falta
";

    #[test]
    fn test_detect() {
        let model = PontoMaisTimecard::new();
        assert!(model.detect(SAMPLE) > 0.8);
        assert!(model.detect("PontoMais") < 0.6);
    }

    #[test]
    fn test_extract() {
        let record = PontoMaisTimecard::new().extract(SAMPLE);
        assert_eq!(record.get("funcionario"), Some("ANA SOUZA"));

        let rows = record.rows();
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0]["data"], "04/03/2024");
        assert_eq!(rows[0]["dia_semana"], "Seg");
        assert_eq!(rows[0]["saida2"], "17:04");
        assert_eq!(rows[1]["entrada2"], "13:00");
        assert_eq!(rows[1]["saida2"], "");
        assert_eq!(rows[3]["saida2"], "17:00");
        assert_eq!(rows[4]["entrada1"], "08:10");
    }

    #[test]
    fn test_marked_and_empty_days_are_kept() {
        let record = PontoMaisTimecard::new().extract(SAMPLE);
        let rows = record.rows();

        assert_eq!(rows[2]["data"], "06/03/2024");
        assert_eq!(rows[2]["status"], "Folga");
        for key in ["entrada1", "saida1", "entrada2", "saida2"] {
            assert_eq!(rows[2][key], "");
        }

        assert_eq!(rows[6]["data"], "10/03/2024");
        assert_eq!(rows[6]["status"], "Normal");
        assert_eq!(rows[6]["entrada1"], "");

        assert_eq!(rows[7]["data"], "11/03/2024");
        assert_eq!(rows[7]["status"], "Ausente");
    }
}
