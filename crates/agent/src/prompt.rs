//! Prompt assembly.
//!
//! One fixed template for both providers — only the size of the document
//! context differs between them, and that truncation happens in the
//! orchestrator. All budgets count characters, not bytes, so truncation
//! can never split a multi-byte UTF-8 sequence.

use aula_core::{Role, Turn};

/// Assembles the single prompt string sent to every model.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    institute_name: String,
    web_budget: usize,
    history_turns: usize,
}

impl PromptBuilder {
    /// Create a builder with the production defaults (20k web chars,
    /// last 2 history turns).
    pub fn new(institute_name: impl Into<String>) -> Self {
        Self {
            institute_name: institute_name.into(),
            web_budget: 20_000,
            history_turns: 2,
        }
    }

    /// Override the website-context character budget.
    pub fn with_web_budget(mut self, budget: usize) -> Self {
        self.web_budget = budget;
        self
    }

    /// Override the history window.
    pub fn with_history_turns(mut self, turns: usize) -> Self {
        self.history_turns = turns;
        self
    }

    /// Build the prompt: preamble, document context (as given), truncated
    /// web context, trailing history turns, and the query.
    pub fn build(
        &self,
        user_message: &str,
        document_context: &str,
        web_context: &str,
        history: &[Turn],
    ) -> String {
        let web = truncate_chars(web_context, self.web_budget);

        let history_block = if history.is_empty() {
            "Inicio de conversación".to_string()
        } else {
            let tail = &history[history.len().saturating_sub(self.history_turns)..];
            tail.iter()
                .map(|turn| {
                    let who = match turn.role {
                        Role::User => "Usuario",
                        Role::Assistant => "Asistente",
                    };
                    format!("{who}: {}", turn.content)
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            "=== ROL ===\n\
             Eres el Asistente Virtual Oficial del {institute}.\n\
             \n\
             === MISIÓN ===\n\
             Tu ÚNICO objetivo es extraer y presentar DATOS EXACTOS (fechas, costos, requisitos) de los documentos proporcionados.\n\
             \n\
             === REGLAS DE ORO ===\n\
             1. **BUSCA EXHAUSTIVAMENTE**: La información ESTÁ en el texto. Busca precios en tablas, listas o anexos.\n\
             2. **NO SEAS GENÉRICO**: No digas \"el costo varía\". Di \"El costo es S/. 450.00\" (si está en el texto).\n\
             3. **SI ENCUENTRAS EL DATO**: Preséntalo directamente con viñetas.\n\
             4. **SI NO ENCUENTRAS EL DATO**: Di \"No encuentro esa información específica en los documentos\".\n\
             \n\
             === CONTEXTO (DOCUMENTOS Y WEB) ===\n\
             {documents}\n\
             {web}\n\
             \n\
             === HISTORIAL ===\n\
             {history}\n\
             \n\
             === CONSULTA ===\n\
             {query}\n",
            institute = self.institute_name,
            documents = document_context,
            web = web,
            history = history_block,
            query = user_message,
        )
    }
}

/// Truncate a string to at most `max_chars` characters, respecting UTF-8
/// boundaries.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> PromptBuilder {
        PromptBuilder::new("IESTP Juan Velasco Alvarado")
    }

    #[test]
    fn prompt_contains_all_sections() {
        let prompt = builder().build(
            "¿Cuánto cuesta la matrícula?",
            "MATRÍCULA 2025: S/. 200.00",
            "El instituto ofrece cinco programas.",
            &[],
        );
        assert!(prompt.contains("=== ROL ==="));
        assert!(prompt.contains("IESTP Juan Velasco Alvarado"));
        assert!(prompt.contains("MATRÍCULA 2025: S/. 200.00"));
        assert!(prompt.contains("El instituto ofrece cinco programas."));
        assert!(prompt.contains("Inicio de conversación"));
        assert!(prompt.ends_with("¿Cuánto cuesta la matrícula?\n"));
    }

    #[test]
    fn web_context_is_truncated_to_budget() {
        let long_web = "Ψ".repeat(25_000);
        let prompt = builder().build("hola", "", &long_web, &[]);
        assert_eq!(prompt.matches('Ψ').count(), 20_000);
    }

    #[test]
    fn document_context_is_not_truncated_here() {
        let long_docs = "Ω".repeat(300_000);
        let prompt = builder().build("hola", &long_docs, "", &[]);
        assert_eq!(prompt.matches('Ω').count(), 300_000);
    }

    #[test]
    fn only_last_two_turns_survive() {
        let history = vec![
            Turn::user("primera pregunta"),
            Turn::assistant("primera respuesta"),
            Turn::user("segunda pregunta"),
            Turn::assistant("segunda respuesta"),
        ];
        let prompt = builder().build("tercera pregunta", "", "", &history);
        assert!(!prompt.contains("primera pregunta"));
        assert!(!prompt.contains("primera respuesta"));
        assert!(prompt.contains("Usuario: segunda pregunta"));
        assert!(prompt.contains("Asistente: segunda respuesta"));
    }

    #[test]
    fn short_history_is_kept_whole() {
        let history = vec![Turn::user("única pregunta")];
        let prompt = builder().build("siguiente", "", "", &history);
        assert!(prompt.contains("Usuario: única pregunta"));
    }

    #[test]
    fn truncate_chars_counts_chars_not_bytes() {
        // 'á' is two bytes in UTF-8
        let s = "ááááá";
        assert_eq!(truncate_chars(s, 3), "ááá");
        assert_eq!(truncate_chars(s, 5), s);
        assert_eq!(truncate_chars(s, 99), s);
        assert_eq!(truncate_chars("", 10), "");
    }
}
