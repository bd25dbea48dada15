//! Topic — the classification label attached to every user query.
//!
//! One label per message; `General` is the fallback when no keyword matches.
//! The wire names (serde/Display) keep the accented Spanish spellings the
//! rest of the institute's tooling expects in the consultation log.

use serde::{Deserialize, Serialize};

/// The fixed set of query topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    #[serde(rename = "matrícula")]
    Matricula,
    #[serde(rename = "traslado")]
    Traslado,
    #[serde(rename = "reserva")]
    Reserva,
    #[serde(rename = "reincorporación")]
    Reincorporacion,
    #[serde(rename = "cambio_turno")]
    CambioTurno,
    #[serde(rename = "titulación")]
    Titulacion,
    #[serde(rename = "costos")]
    Costos,
    #[serde(rename = "fechas")]
    Fechas,
    #[serde(rename = "requisitos")]
    Requisitos,
    #[serde(rename = "vacantes")]
    Vacantes,
    #[serde(rename = "carreras")]
    Carreras,
    #[serde(rename = "certificados")]
    Certificados,
    #[serde(rename = "becas")]
    Becas,
    #[serde(rename = "saludo")]
    Saludo,
    #[serde(rename = "despedida")]
    Despedida,
    #[serde(rename = "general")]
    General,
}

impl Topic {
    /// Topics where an answer about money must actually contain figures.
    pub fn money_sensitive(self) -> bool {
        matches!(self, Topic::Costos | Topic::Matricula | Topic::Titulacion)
    }

    /// Topics where an answer must carry a day number or month name.
    pub fn date_sensitive(self) -> bool {
        matches!(self, Topic::Fechas)
    }

    /// The label string used in logs and API responses.
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::Matricula => "matrícula",
            Topic::Traslado => "traslado",
            Topic::Reserva => "reserva",
            Topic::Reincorporacion => "reincorporación",
            Topic::CambioTurno => "cambio_turno",
            Topic::Titulacion => "titulación",
            Topic::Costos => "costos",
            Topic::Fechas => "fechas",
            Topic::Requisitos => "requisitos",
            Topic::Vacantes => "vacantes",
            Topic::Carreras => "carreras",
            Topic::Certificados => "certificados",
            Topic::Becas => "becas",
            Topic::Saludo => "saludo",
            Topic::Despedida => "despedida",
            Topic::General => "general",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
