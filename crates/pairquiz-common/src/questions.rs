/// The stock question list. Content management is out of scope; rooms just
/// walk this sequence cyclically.
const STANDARD_QUESTIONS: &[&str] = &[
    "Who is the better cook?",
    "Who is more likely to get lost?",
    "What is Player 1's dream destination?",
    "What is Player 2's favorite food?",
    "Who takes longer to get ready?",
    "Who said 'I love you' first?",
    "What is Player 1's biggest pet peeve?",
    "Who is the funnier one?",
    "What is Player 2's favorite movie?",
    "Who is more organized?",
];

/// An ordered, read-only sequence of questions. Rooms hold an index into
/// the deck and wrap around when they run past the end.
#[derive(Debug, Clone)]
pub struct QuestionDeck {
    questions: Vec<String>,
}

impl QuestionDeck {
    /// A deck must have at least one question; an empty one would leave
    /// rooms with nothing to ask.
    pub fn new(questions: Vec<String>) -> Self {
        assert!(!questions.is_empty(), "question deck cannot be empty");
        Self { questions }
    }

    pub fn standard() -> Self {
        Self::new(STANDARD_QUESTIONS.iter().map(|q| q.to_string()).collect())
    }

    /// Question at `index`, wrapping modulo deck length.
    pub fn question(&self, index: usize) -> &str {
        &self.questions[index % self.questions.len()]
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_deck_is_populated() {
        let deck = QuestionDeck::standard();
        assert_eq!(deck.len(), 10);
        assert_eq!(deck.question(0), "Who is the better cook?");
    }

    #[test]
    fn test_question_index_wraps() {
        let deck = QuestionDeck::new(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(deck.question(0), "a");
        assert_eq!(deck.question(2), "c");
        assert_eq!(deck.question(3), "a");
        assert_eq!(deck.question(7), "b");
    }

    #[test]
    #[should_panic]
    fn test_empty_deck_rejected() {
        QuestionDeck::new(Vec::new());
    }
}
