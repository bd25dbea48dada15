//! Usefulness judging — the gate between a model answering and that answer
//! reaching a student.
//!
//! A response survives only if it is long enough and does not hide behind
//! an "I couldn't find that" phrase (a decline that hands over contact
//! details still passes). Money and date questions additionally require
//! actual figures. What fails here is not an error; the chain simply
//! tries the next model.

use aula_core::Topic;
use regex::Regex;
use std::sync::LazyLock;

/// Minimum response length; anything shorter is a non-answer.
const MIN_RESPONSE_CHARS: usize = 50;

/// Phrases that flag a non-answer. Matched as substrings of the lowercased
/// response.
static USELESS_PHRASES: &[&str] = &[
    "no tengo información",
    "no encuentro información",
    "no se menciona en los documentos",
    "lo siento",
    "no puedo responder",
    "no hay documentos",
    "contacta a la secretaría",
    "no está especificado",
    "no se proporciona",
    "no se encuentra",
    "no aparece en el texto",
    "no se detalla",
    "no cuento con la información",
    "no se indica",
    "no se menciona",
    "no dispongo de información",
];

/// A declined answer is still acceptable when it points somewhere concrete.
static CONTACT_INDICATORS: &[&str] = &["correo", "teléfono", "presencialmente", "dirección"];

/// Words that show the response is talking about money at all.
static MONEY_WORDS: &[&str] = &["costo", "pago", "precio"];

/// Currency marker or number: "S/.", "soles", or a (possibly decimal) figure.
static MONEY_FIGURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"s/\.|soles|\d+(\.\d+)?").expect("valid money regex"));

/// A day-of-month style 1-2 digit number.
static DAY_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}").expect("valid day regex"));

static MONTHS: &[&str] = &[
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Decide whether a candidate response is acceptable for the given topic.
///
/// Rules apply in order and short-circuit:
/// 1. absent or under 50 chars → not useful
/// 2. "no information" phrasing → not useful, unless contact details appear
/// 3. money-sensitive topic mentioning money with no figures → not useful
/// 4. date-sensitive topic with neither a day number nor a month → not useful
/// 5. otherwise useful
pub fn is_useful(response: Option<&str>, topic: Topic) -> bool {
    let Some(response) = response else {
        return false;
    };
    if response.chars().count() < MIN_RESPONSE_CHARS {
        return false;
    }

    let lowered = response.to_lowercase();

    if USELESS_PHRASES.iter().any(|p| lowered.contains(p)) {
        // A graceful decline that hands over a contact is still actionable
        if CONTACT_INDICATORS.iter().any(|c| lowered.contains(c)) {
            return true;
        }
        let preview: String = lowered.chars().take(100).collect();
        tracing::debug!(%preview, "Rejected: negative phrasing");
        return false;
    }

    if topic.money_sensitive()
        && MONEY_WORDS.iter().any(|w| lowered.contains(w))
        && !MONEY_FIGURE.is_match(&lowered)
    {
        tracing::debug!("Rejected: money question answered without figures");
        return false;
    }

    if topic.date_sensitive()
        && !DAY_NUMBER.is_match(&lowered)
        && !MONTHS.iter().any(|m| lowered.contains(m))
    {
        tracing::debug!("Rejected: date question answered without dates");
        return false;
    }

    true
}
