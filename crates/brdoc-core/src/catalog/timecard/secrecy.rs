//! "Espelho do Ponto" timecard printed under a secrecy watermark.
//!
//! Punches carry an origin marker (`O` original, `I` included, `P`
//! pre-assigned); bare times on the same line are schedule columns and are
//! ignored.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

use super::{set_header, title_score, DayRow, DayStatus, CATEGORY, ICON, PERIOD};
use crate::catalog::{text_lines, DocumentModel, ModelDescriptor};
use crate::models::record::{ExtractionRecord, Fields, RowsLabel};
use crate::rules::{clamp_score, first_capture, first_captures, keyword_score, PunchFilter};

lazy_static! {
    static ref ROW: Regex = Regex::new(
        r"(?i)^(\d{2}/\d{2}/\d{4})\s+(Segunda|Terca|Terça|Quarta|Quinta|Sexta|Sabado|Sábado|Domingo)\b"
    ).unwrap();
    static ref MARKED_PUNCH: Regex = Regex::new(r"(\d{2}:\d{2})\s*([OIP])\b").unwrap();
    static ref WEEKDAY_NAME: Regex = Regex::new(
        r"(?i)\b(?:Segunda|Terca|Terça|Quarta|Quinta|Sexta|Sabado|Sábado|Domingo)\b"
    ).unwrap();
    static ref NAME: Regex = Regex::new(r"Nome:\s*([A-Z\s]+?)(?:\s+Chapa|\s+CPF|\s*$)").unwrap();
    static ref PERIOD_RANGE: Regex =
        Regex::new(r"Espelho do Ponto\s+(\d{2}/\d{2}/\d{4})\s*-\s*(\d{2}/\d{2}/\d{4})").unwrap();
    static ref ROLE: Regex = Regex::new(r"Função:\s*\d+\s*-\s*([A-Z]+)").unwrap();
    static ref REGISTRATION: Regex = Regex::new(r"Matrícula:\s*([\d\s-]+)").unwrap();
}

const SECTION_START: &str = "Data Dia 1a E.";
const SECTION_END: [&str; 6] = [
    "Marcações desconsideradas",
    "Banco de Horas",
    "Horários",
    "______________",
    "Assinatura do Funcionário",
    "Documento assinado",
];

const KEYWORDS: [(&str, f32); 2] = [("data dia 1a e.", 0.25), ("marcações desconsideradas", 0.10)];

static DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "Cartão Ponto — Sigilo",
    icon: ICON,
    description: "Espelho do ponto com marcações O/I/P e marca d'água de sigilo",
    category: CATEGORY,
    variant: "Sigilo",
    period: PERIOD,
    requires_cleaning: true,
};

pub struct SecrecyTimecard;

impl SecrecyTimecard {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SecrecyTimecard {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_day(line: &str, filter: &PunchFilter) -> Option<DayRow> {
    let caps = ROW.captures(line)?;
    let (date, weekday) = (&caps[1], &caps[2]);

    if line.contains("** Ausente **") {
        return Some(DayRow::absent(date, weekday, DayStatus::Ausente));
    }
    if line.to_uppercase().contains("FOLGA") {
        return Some(DayRow::absent(date, weekday, DayStatus::Folga));
    }

    let marked: Vec<&str> = MARKED_PUNCH
        .captures_iter(line)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();
    Some(DayRow::new(date, weekday).with_punches(filter.filter(&marked)))
}

impl DocumentModel for SecrecyTimecard {
    fn descriptor(&self) -> &ModelDescriptor {
        &DESCRIPTOR
    }

    fn detect(&self, text: &str) -> f32 {
        let lowered = text.to_lowercase();
        let mut score = keyword_score(&lowered, &KEYWORDS);
        if lowered.contains("espelho do ponto") {
            score += 0.35;
        } else {
            score += title_score(&lowered, 0.10);
        }
        if MARKED_PUNCH.find_iter(text).count() > 5 {
            score += 0.25;
        }
        if WEEKDAY_NAME.find_iter(text).count() > 3 {
            score += 0.10;
        }
        clamp_score(score)
    }

    fn extract(&self, text: &str) -> ExtractionRecord {
        let mut record = ExtractionRecord::tabular("Cartão Ponto (Sigilo)", RowsLabel::Registros);
        let period = first_captures(&[&*PERIOD_RANGE], text).map(|g| (g[0].clone(), g[1].clone()));
        set_header(&mut record, first_capture(&[&*NAME], text), period);
        record.set_opt("funcao", first_capture(&[&*ROLE], text));
        record.set_opt("matricula", first_capture(&[&*REGISTRATION], text));

        let filter = PunchFilter::new();
        let mut days: IndexMap<String, Fields> = IndexMap::new();
        let mut in_section = false;

        for line in text_lines(text) {
            if line.contains(SECTION_START) {
                in_section = true;
                continue;
            }
            if SECTION_END.iter().any(|end| line.contains(end)) {
                in_section = false;
                continue;
            }
            if !in_section {
                continue;
            }
            if let Some(day) = parse_day(line, &filter) {
                // A repeated date keeps its last reading.
                days.insert(day.data.clone(), day.into_fields());
            }
        }

        for (_, fields) in days {
            record.push_row(fields);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
Espelho do Ponto 01/04/2024 - 30/04/2024
Nome: CARLOS LIMA Chapa 555
Função: 12 - ESTOQUISTA
Matrícula: 00 555-1
Data Dia 1a E. 1a S. 2a E. 2a S.
01/04/2024 Segunda 08:00 17:00 07:58 O 12:01 O 13:00 I 17:03 O
02/04/2024 Terça ** Ausente **
03/04/2024 Quarta 08:00 17:00 08:05 O 12:00 P 11:30 O 13:10 O 17:00 O
06/04/2024 Sábado FOLGA
Marcações desconsideradas
04/04/2024 Quinta 08:00 O 12:00 O
";

    #[test]
    fn test_detect() {
        let model = SecrecyTimecard::new();
        let score = model.detect(SAMPLE);
        assert!(score > 0.9, "score was {}", score);
        assert!(model.detect("Cartão Ponto") < 0.2);
    }

    #[test]
    fn test_extract_header() {
        let record = SecrecyTimecard::new().extract(SAMPLE);
        assert_eq!(record.get("funcionario"), Some("CARLOS LIMA"));
        assert_eq!(record.get("periodo_inicio"), Some("01/04/2024"));
        assert_eq!(record.get("periodo_fim"), Some("30/04/2024"));
        assert_eq!(record.get("funcao"), Some("ESTOQUISTA"));
        assert_eq!(record.get("matricula"), Some("00 555-1"));
    }

    #[test]
    fn test_extract_marked_punches_only() {
        let record = SecrecyTimecard::new().extract(SAMPLE);
        let rows = record.rows();
        assert_eq!(rows.len(), 4);

        assert_eq!(rows[0]["entrada1"], "07:58");
        assert_eq!(rows[0]["saida2"], "17:03");
        assert_eq!(rows[1]["status"], "Ausente");
        assert_eq!(rows[2]["entrada1"], "08:05");
        assert_eq!(rows[2]["entrada2"], "13:10");
        assert_eq!(rows[2]["saida2"], "17:00");
        assert_eq!(rows[3]["status"], "Folga");
    }
}
