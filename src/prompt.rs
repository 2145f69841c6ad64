/// Persona and answer focus sent as the system instruction of every request.
pub const PERSONA_INSTRUCTION: &str = r#"You are an expert in understanding motor datasheets.
The text above is a combination of extracted text from a datasheet
and a user's question about the motor.
Answer the user's question in a comprehensive and informative way,
focusing on key motor specifications like power, torque, speed, etc."#;

/// Marks where the datasheet text ends and the user's question begins.
pub const QUERY_DELIMITER: &str = " || USER_QUERY: ";

/// One question about one datasheet, ready to send to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRequest {
    pub instruction: String,
    pub content: String,
}

/// Combines datasheet text and a question into an [`AnswerRequest`].
///
/// Both inputs are lower-cased. The question is not validated, so an empty
/// question still produces a well-formed request.
pub fn build_request(text: &str, question: &str) -> AnswerRequest {
    AnswerRequest {
        instruction: PERSONA_INSTRUCTION.to_string(),
        content: format!(
            "{}{}{}",
            text.to_lowercase(),
            QUERY_DELIMITER,
            question.to_lowercase()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_is_case_folded_and_delimited() {
        let request = build_request("Rated Power: 5kW\nRated Speed: 1450 RPM", "What is the Rated Power?");
        assert_eq!(
            request.content,
            "rated power: 5kw\nrated speed: 1450 rpm || USER_QUERY: what is the rated power?"
        );
        assert_eq!(request.instruction, PERSONA_INSTRUCTION);
    }

    #[test]
    fn test_empty_question_still_builds() {
        let request = build_request("Torque 20Nm", "");
        assert_eq!(request.content, "torque 20nm || USER_QUERY: ");
        assert!(request.instruction.contains("expert in understanding motor datasheets"));
    }

    #[test]
    fn test_persona_mentions_answer_focus() {
        for word in ["power", "torque", "speed", "comprehensive"] {
            assert!(PERSONA_INSTRUCTION.contains(word), "missing '{}'", word);
        }
    }

    #[test]
    fn test_unicode_is_folded() {
        let request = build_request("MOTOR ÜBERSICHT", "DREHMOMENT?");
        assert!(request.content.starts_with("motor übersicht"));
        assert!(request.content.ends_with("drehmoment?"));
    }
}
