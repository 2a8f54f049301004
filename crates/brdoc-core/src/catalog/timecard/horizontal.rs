//! Full-date horizontal timecard: one `DD/MM/YYYY <Dia>` line per day, with
//! the four scheduled times printed before the punches.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use super::{
    has_marker, set_header, title_score, DayRow, DayStatus, CATEGORY, FULL_DATE_ROW, ICON,
    PERIOD, SHORT_DATE_ROW,
};
use crate::catalog::{text_lines, DocumentModel, ModelDescriptor};
use crate::models::record::{ExtractionRecord, RowsLabel};
use crate::rules::patterns::TIME_HHMM;
use crate::rules::{clamp_score, first_capture, first_captures, keyword_score, PunchFilter};

lazy_static! {
    static ref ROW: Regex =
        Regex::new(r"(?i)^(\d{2}/\d{2}/\d{4})\s+(Seg|Ter|Qua|Qui|Sex|Sáb|Sab|Dom)\b").unwrap();
    static ref EMPLOYEE: Regex =
        Regex::new(r"(?m)Empregado:\s*\d+-(.+?)(?:\s+Carteira|\s+Admissão|\s*$)").unwrap();
    static ref PERIOD_RANGE: Regex =
        Regex::new(r"Período:\s*(\d{2}/\d{2}/\d{4})\s*até\s*(\d{2}/\d{2}/\d{4})").unwrap();
    static ref ROLE: Regex = Regex::new(r"(?m)Função:\s*(.+?)(?:\s+Estrutura|\s*$)").unwrap();
}

const SCHEDULED_PREFIX: usize = 4;
const DAY_OFF_MARKERS: [&str; 5] = ["folga", "casa", "(-)", "feriado", "n.admitido"];
const ABSENCE_MARKERS: [&str; 2] = ["ausente", "falta"];

const KEYWORDS: [(&str, f32); 5] = [
    ("horário de trabalho", 0.15),
    ("banco de horas", 0.10),
    ("empregado:", 0.08),
    ("período:", 0.08),
    ("função:", 0.08),
];

static DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "Cartão Ponto — Horizontal",
    icon: ICON,
    description: "Cartão ponto com data completa e horários previstos antes das marcações",
    category: CATEGORY,
    variant: "Horizontal (completo)",
    period: PERIOD,
    requires_cleaning: false,
};

pub struct HorizontalTimecard;

impl HorizontalTimecard {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HorizontalTimecard {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_day(line: &str, filter: &PunchFilter) -> Option<DayRow> {
    let caps = ROW.captures(line)?;
    let rest = &line[caps.get(0)?.end()..];
    let (date, weekday) = (&caps[1], &caps[2]);

    if has_marker(rest, &ABSENCE_MARKERS) {
        return Some(DayRow::absent(date, weekday, DayStatus::Ausente));
    }
    if has_marker(rest, &DAY_OFF_MARKERS) {
        return Some(DayRow::absent(date, weekday, DayStatus::Folga));
    }

    let candidates: Vec<&str> = TIME_HHMM.find_iter(rest).map(|m| m.as_str()).collect();
    trace!("{} candidate times on {}", candidates.len(), date);
    Some(DayRow::new(date, weekday).with_punches(filter.filter(&candidates)))
}

impl DocumentModel for HorizontalTimecard {
    fn descriptor(&self) -> &ModelDescriptor {
        &DESCRIPTOR
    }

    fn detect(&self, text: &str) -> f32 {
        let lowered = text.to_lowercase();
        let mut score = title_score(&lowered, 0.30) + keyword_score(&lowered, &KEYWORDS);

        let full_rows = FULL_DATE_ROW.find_iter(text).count();
        let short_rows = SHORT_DATE_ROW.find_iter(text).count();
        if full_rows > 5 {
            score += 0.30;
        }
        if short_rows > full_rows {
            score -= 0.15;
        }
        clamp_score(score)
    }

    fn extract(&self, text: &str) -> ExtractionRecord {
        let mut record = ExtractionRecord::tabular("Cartão Ponto (Horizontal)", RowsLabel::Registros);
        let period = first_captures(&[&*PERIOD_RANGE], text).map(|g| (g[0].clone(), g[1].clone()));
        set_header(&mut record, first_capture(&[&*EMPLOYEE], text), period);
        record.set_opt("funcao", first_capture(&[&*ROLE], text));

        let filter = PunchFilter::new().with_scheduled_prefix(SCHEDULED_PREFIX);
        for line in text_lines(text) {
            if let Some(day) = parse_day(line, &filter) {
                record.push_row(day.into_fields());
            }
        }

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
CARTÃO PONTO
Empregado: 1234-MARIA DA SILVA Carteira 0001
Período: 01/03/2024 até 31/03/2024
Função: OPERADORA DE CAIXA Estrutura 10
Horário de Trabalho 08:00 12:00 13:00 17:00
01/03/2024 Sex 08:00 12:00 13:00 17:00 07:54 12:10 13:05 18:02
02/03/2024 Sáb FOLGA
03/03/2024 Dom FOLGA
04/03/2024 Seg 08:00 12:00 13:00 17:00 07:58 12:02 13:01 17:05 06:00
05/03/2024 Ter Falta
06/03/2024 Qua 08:00 12:00 13:00 17:00 08:01 12:00
Banco de Horas
";

    #[test]
    fn test_detect() {
        let model = HorizontalTimecard::new();
        let score = model.detect(SAMPLE);
        assert!(score > 0.8, "score was {}", score);

        let short = "Cartão Ponto\n01/03 Sex\n02/03 Sáb\n03/03 Dom";
        assert!(model.detect(short) < 0.3);
    }

    #[test]
    fn test_extract_header() {
        let record = HorizontalTimecard::new().extract(SAMPLE);
        assert_eq!(record.get("funcionario"), Some("MARIA DA SILVA"));
        assert_eq!(record.get("periodo_inicio"), Some("01/03/2024"));
        assert_eq!(record.get("periodo_fim"), Some("31/03/2024"));
        assert_eq!(record.get("funcao"), Some("OPERADORA DE CAIXA"));
    }

    #[test]
    fn test_extract_rows() {
        let record = HorizontalTimecard::new().extract(SAMPLE);
        let rows = record.rows();
        assert_eq!(rows.len(), 6);

        assert_eq!(rows[0]["entrada1"], "07:54");
        assert_eq!(rows[0]["saida2"], "18:02");
        assert_eq!(rows[1]["status"], "Folga");
        assert_eq!(rows[1]["entrada1"], "");
        assert_eq!(rows[3]["saida2"], "17:05");
        assert_eq!(rows[4]["status"], "Ausente");
        assert_eq!(rows[5]["entrada1"], "08:01");
        assert_eq!(rows[5]["saida1"], "12:00");
        assert_eq!(rows[5]["entrada2"], "");
    }
}
