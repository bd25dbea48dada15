//! Query classification by keyword lookup.
//!
//! A flat ordered table is all this needs: the label lists are short, the
//! traffic is low, and first-match order is part of the observable
//! behavior (a query naming both enrollment and cost classifies as
//! matrícula because that row comes first).

use aula_core::Topic;

/// Label → keyword table, in tie-break order.
static TOPIC_KEYWORDS: &[(Topic, &[&str])] = &[
    (
        Topic::Matricula,
        &["matrícula", "matricula", "matricularme", "inscripción"],
    ),
    (
        Topic::Traslado,
        &["traslado", "trasladar", "cambiar de instituto"],
    ),
    (Topic::Reserva, &["reserva", "reservar"]),
    (
        Topic::Reincorporacion,
        &["reincorporación", "reincorporacion", "volver"],
    ),
    (Topic::CambioTurno, &["cambio de turno", "turno", "horario"]),
    (
        Topic::Titulacion,
        &["titulación", "título", "bachiller", "titulado"],
    ),
    (
        Topic::Costos,
        &["costo", "precio", "pago", "cuánto", "tarifa"],
    ),
    (Topic::Fechas, &["fecha", "plazo", "cuándo", "cronograma"]),
    (Topic::Requisitos, &["requisito", "documento", "necesito"]),
    (Topic::Vacantes, &["vacante", "cupos", "disponibilidad"]),
    (Topic::Carreras, &["carrera", "programa", "especialidad"]),
    (
        Topic::Certificados,
        &["certificado", "constancia", "récord"],
    ),
    (
        Topic::Becas,
        &["beca", "becado", "descuento", "exoneración"],
    ),
    (
        Topic::Saludo,
        &["hola", "buenos días", "buenas tardes", "saludos"],
    ),
    (
        Topic::Despedida,
        &["gracias", "adiós", "chau", "hasta luego"],
    ),
];

/// Classify a user message into a topic.
///
/// Case-insensitive substring scan over the table; the first label with any
/// hit wins, `General` when nothing matches. Every input yields a label.
pub fn classify(message: &str) -> Topic {
    let lowered = message.to_lowercase();
    for (topic, keywords) in TOPIC_KEYWORDS {
        if keywords.iter().any(|kw| lowered.contains(kw)) {
            return *topic;
        }
    }
    Topic::General
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_keyword_hits_its_label() {
        assert_eq!(classify("deseo reservar mi vacante"), Topic::Reserva);
        assert_eq!(classify("necesito el cronograma"), Topic::Fechas);
        assert_eq!(classify("quiero una beca"), Topic::Becas);
        assert_eq!(classify("tienen cupos para enfermería?"), Topic::Vacantes);
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(classify("INFORMACIÓN SOBRE MATRÍCULA"), Topic::Matricula);
        assert_eq!(classify("Hola!"), Topic::Saludo);
    }

    #[test]
    fn unaccented_spellings_still_match() {
        assert_eq!(classify("como hago mi matricula"), Topic::Matricula);
        assert_eq!(classify("tramitar mi reincorporacion"), Topic::Reincorporacion);
    }

    #[test]
    fn first_label_in_table_order_wins() {
        // "matrícula" (row 1) beats "costo" (row 7)
        assert_eq!(classify("costo de la matrícula"), Topic::Matricula);
        // "turno" (row 5) beats "fecha" (row 8)
        assert_eq!(classify("fecha del cambio de turno"), Topic::CambioTurno);
    }

    #[test]
    fn no_match_falls_back_to_general() {
        assert_eq!(classify("xyzzy"), Topic::General);
        assert_eq!(classify(""), Topic::General);
    }

    #[test]
    fn multi_word_keywords_match() {
        assert_eq!(classify("quiero cambiar de instituto"), Topic::Traslado);
        assert_eq!(classify("buenas tardes"), Topic::Saludo);
    }
}
