//! Scoring for a submitted exam session.

use std::collections::HashMap;

use crate::model::{Question, QuestionId};

/// Outcome of grading one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedSubmission {
    /// Points earned on correctly answered questions.
    pub score: u32,
    /// Points across the questions that were actually gradable.
    pub total_points: u32,
    /// `round(100 * score / total)`, half up; 0 when nothing was gradable.
    pub percentage: u8,
    /// Whether `percentage` met the passing threshold.
    pub passed: bool,
    /// Correctness per gradable question. Ids missing from the question
    /// store never appear here.
    pub correct: HashMap<QuestionId, bool>,
}

/// Grade a submission against the question store.
///
/// Walks `question_ids` in order. An id absent from `questions` is skipped
/// silently — a deleted question contributes to neither score nor total, so
/// it never penalizes the student. Answers are matched via
/// [`Question::matches_answer`] (trimmed, case-insensitive); an unanswered
/// question is simply wrong. Extra entries in `answers` whose ids are not in
/// `question_ids` are ignored.
#[must_use]
pub fn grade(
    question_ids: &[QuestionId],
    questions: &HashMap<QuestionId, Question>,
    answers: &HashMap<QuestionId, String>,
    passing_score: u8,
) -> GradedSubmission {
    let mut score = 0_u32;
    let mut total_points = 0_u32;
    let mut correct = HashMap::with_capacity(question_ids.len());

    for id in question_ids {
        let Some(question) = questions.get(id) else {
            continue;
        };
        total_points += question.points();
        let is_correct = answers.get(id).is_some_and(|a| question.matches_answer(a));
        correct.insert(*id, is_correct);
        if is_correct {
            score += question.points();
        }
    }

    let percentage = percentage_of(score, total_points);
    GradedSubmission {
        score,
        total_points,
        percentage,
        passed: percentage >= passing_score,
        correct,
    }
}

// score <= total, so the result always fits 0..=100.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percentage_of(score: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    (f64::from(score) * 100.0 / f64::from(total)).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionId;

    fn build_question(id: QuestionId, correct: &str, points: u32) -> Question {
        Question::new(
            id,
            "General",
            "JSS1",
            format!("Q worth {points}"),
            Vec::new(),
            correct,
            Some(points),
        )
        .unwrap()
    }

    fn store(entries: Vec<Question>) -> HashMap<QuestionId, Question> {
        entries.into_iter().map(|q| (q.id(), q)).collect()
    }

    #[test]
    fn partial_credit_scenario() {
        let q1 = QuestionId::new();
        let q2 = QuestionId::new();
        let questions = store(vec![
            build_question(q1, "Paris", 2),
            build_question(q2, "7", 3),
        ]);

        let mut answers = HashMap::new();
        answers.insert(q1, "paris".to_string());
        answers.insert(q2, "8".to_string());

        let graded = grade(&[q1, q2], &questions, &answers, 50);
        assert_eq!(graded.score, 2);
        assert_eq!(graded.total_points, 5);
        assert_eq!(graded.percentage, 40);
        assert!(!graded.passed);
        assert_eq!(graded.correct.get(&q1), Some(&true));
        assert_eq!(graded.correct.get(&q2), Some(&false));
    }

    #[test]
    fn full_marks_scenario() {
        let q1 = QuestionId::new();
        let q2 = QuestionId::new();
        let questions = store(vec![
            build_question(q1, "Paris", 2),
            build_question(q2, "7", 3),
        ]);

        let mut answers = HashMap::new();
        answers.insert(q1, "Paris".to_string());
        answers.insert(q2, "7".to_string());

        let graded = grade(&[q1, q2], &questions, &answers, 50);
        assert_eq!(graded.score, 5);
        assert_eq!(graded.total_points, 5);
        assert_eq!(graded.percentage, 100);
        assert!(graded.passed);
    }

    #[test]
    fn missing_question_is_skipped_not_penalized() {
        let q1 = QuestionId::new();
        let deleted = QuestionId::new();
        let questions = store(vec![build_question(q1, "Paris", 2)]);

        let mut answers = HashMap::new();
        answers.insert(q1, "Paris".to_string());
        answers.insert(deleted, "anything".to_string());

        let graded = grade(&[q1, deleted], &questions, &answers, 50);
        assert_eq!(graded.score, 2);
        assert_eq!(graded.total_points, 2);
        assert_eq!(graded.percentage, 100);
        assert!(!graded.correct.contains_key(&deleted));
    }

    #[test]
    fn empty_question_set_grades_to_zero() {
        let questions = HashMap::new();
        let answers = HashMap::new();

        let graded = grade(&[], &questions, &answers, 50);
        assert_eq!(graded.total_points, 0);
        assert_eq!(graded.percentage, 0);
        assert!(!graded.passed);

        // a zero threshold is met even by an empty set
        let graded = grade(&[], &questions, &answers, 0);
        assert!(graded.passed);
    }

    #[test]
    fn unanswered_question_counts_as_wrong() {
        let q1 = QuestionId::new();
        let questions = store(vec![build_question(q1, "Paris", 2)]);

        let graded = grade(&[q1], &questions, &HashMap::new(), 50);
        assert_eq!(graded.score, 0);
        assert_eq!(graded.total_points, 2);
        assert_eq!(graded.correct.get(&q1), Some(&false));
    }

    #[test]
    fn half_percent_rounds_up() {
        let q1 = QuestionId::new();
        let q2 = QuestionId::new();
        let q3 = QuestionId::new();
        // 1 of 8 points: 12.5% rounds to 13
        let questions = store(vec![
            build_question(q1, "a", 1),
            build_question(q2, "b", 3),
            build_question(q3, "c", 4),
        ]);

        let mut answers = HashMap::new();
        answers.insert(q1, "a".to_string());

        let graded = grade(&[q1, q2, q3], &questions, &answers, 50);
        assert_eq!(graded.percentage, 13);
    }

    #[test]
    fn answers_outside_the_set_are_ignored() {
        let q1 = QuestionId::new();
        let stray = QuestionId::new();
        let questions = store(vec![
            build_question(q1, "Paris", 2),
            build_question(stray, "7", 50),
        ]);

        let mut answers = HashMap::new();
        answers.insert(stray, "7".to_string());

        let graded = grade(&[q1], &questions, &answers, 50);
        assert_eq!(graded.score, 0);
        assert_eq!(graded.total_points, 2);
        assert!(!graded.correct.contains_key(&stray));
    }
}
