use std::time::Duration;

use super::{Answer, Question, QuestionSet};

/// Pause between committing an answer and showing the next question.
pub const ADVANCE_DELAY: Duration = Duration::from_millis(250);

pub const VERDICT_FALLBACK: &str = "Не вдалося отримати вердикт";
pub const EMPTY_QUESTION_SET: &str = "Сервер не повернув жодного запитання";

/// Progress through a single run of the quiz.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizSession {
    questions: Vec<Question>,
    index: usize,
    answers: Vec<Answer>,
    selected: Option<usize>,
    advancing: bool,
}

impl QuizSession {
    fn start(questions: Vec<Question>) -> Self {
        Self {
            questions,
            index: 0,
            answers: Vec::new(),
            selected: None,
            advancing: false,
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// The selected option text, if any. Empty options never count as a
    /// selection.
    pub fn selected_option(&self) -> Option<&str> {
        let question = self.current_question()?;
        self.selected
            .and_then(|idx| question.options.get(idx))
            .map(String::as_str)
            .filter(|option| !option.is_empty())
    }

    pub fn can_submit(&self) -> bool {
        !self.advancing && self.selected_option().is_some()
    }

    pub fn is_advancing(&self) -> bool {
        self.advancing
    }

    fn is_last_question(&self) -> bool {
        self.index + 1 >= self.questions.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizState {
    Loading,
    LoadFailed { message: String },
    Idle { questions: Vec<Question> },
    InProgress(QuizSession),
    AwaitingVerdict(QuizSession),
    Done { session: QuizSession, verdict: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizEvent {
    QuestionsLoaded(QuestionSet),
    QuestionsFailed(String),
    Retry,
    Start,
    Select(usize),
    SubmitAnswer,
    Advance,
    VerdictReceived(String),
    VerdictFailed,
}

/// Work the runner must perform after a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    FetchQuestions,
    ScheduleAdvance(Duration),
    RequestVerdict(Vec<Answer>),
}

impl QuizState {
    pub fn initial() -> (Self, Vec<Effect>) {
        (QuizState::Loading, vec![Effect::FetchQuestions])
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuizState::Loading => "loading",
            QuizState::LoadFailed { .. } => "load-failed",
            QuizState::Idle { .. } => "idle",
            QuizState::InProgress(_) => "in-progress",
            QuizState::AwaitingVerdict(_) => "awaiting-verdict",
            QuizState::Done { .. } => "done",
        }
    }

    /// Applies one event. Pairs with no transition leave the state untouched
    /// and produce no effects.
    pub fn update(self, event: QuizEvent) -> (Self, Vec<Effect>) {
        match (self, event) {
            (QuizState::Loading, QuizEvent::QuestionsLoaded(set)) => {
                if set.questions.is_empty() {
                    let message = EMPTY_QUESTION_SET.to_string();
                    (QuizState::LoadFailed { message }, Vec::new())
                } else {
                    let questions = set.questions;
                    (QuizState::Idle { questions }, Vec::new())
                }
            }
            (QuizState::Loading, QuizEvent::QuestionsFailed(message)) => {
                (QuizState::LoadFailed { message }, Vec::new())
            }
            (QuizState::LoadFailed { .. }, QuizEvent::Retry) => {
                (QuizState::Loading, vec![Effect::FetchQuestions])
            }

            (QuizState::Idle { questions }, QuizEvent::Start) => {
                (QuizState::InProgress(QuizSession::start(questions)), Vec::new())
            }
            (QuizState::Done { session, .. }, QuizEvent::Start) => (
                QuizState::InProgress(QuizSession::start(session.questions)),
                Vec::new(),
            ),

            (QuizState::InProgress(mut session), QuizEvent::Select(idx)) => {
                let in_range = session
                    .current_question()
                    .is_some_and(|question| idx < question.options.len());
                if in_range && !session.advancing {
                    session.selected = Some(idx);
                }
                (QuizState::InProgress(session), Vec::new())
            }
            (QuizState::InProgress(session), QuizEvent::SubmitAnswer) => submit(session),
            (QuizState::InProgress(mut session), QuizEvent::Advance) => {
                if session.advancing {
                    session.advancing = false;
                    session.index += 1;
                }
                (QuizState::InProgress(session), Vec::new())
            }

            (QuizState::AwaitingVerdict(session), QuizEvent::VerdictReceived(verdict)) => {
                (QuizState::Done { session, verdict }, Vec::new())
            }
            (QuizState::AwaitingVerdict(session), QuizEvent::VerdictFailed) => (
                QuizState::Done {
                    session,
                    verdict: VERDICT_FALLBACK.to_string(),
                },
                Vec::new(),
            ),

            (state, _) => (state, Vec::new()),
        }
    }
}

fn submit(mut session: QuizSession) -> (QuizState, Vec<Effect>) {
    if !session.can_submit() {
        return (QuizState::InProgress(session), Vec::new());
    }
    let Some(question) = session.current_question() else {
        return (QuizState::InProgress(session), Vec::new());
    };
    let chosen = session.selected_option().unwrap_or_default().to_string();
    let answer = Answer::new(question.text.clone(), chosen);

    session.answers.push(answer);
    session.selected = None;

    if session.is_last_question() {
        let answers = session.answers.clone();
        (
            QuizState::AwaitingVerdict(session),
            vec![Effect::RequestVerdict(answers)],
        )
    } else {
        session.advancing = true;
        (
            QuizState::InProgress(session),
            vec![Effect::ScheduleAdvance(ADVANCE_DELAY)],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn question(id: i64) -> Question {
        Question {
            id: id.into(),
            text: format!("Question {id}"),
            options: (0..4).map(|n| format!("Option {id}.{n}")).collect(),
        }
    }

    fn question_set(count: usize) -> QuestionSet {
        QuestionSet {
            questions: (0..count as i64).map(question).collect(),
        }
    }

    fn started(count: usize) -> QuizState {
        let (state, _) = QuizState::Loading.update(QuizEvent::QuestionsLoaded(question_set(count)));
        let (state, effects) = state.update(QuizEvent::Start);
        assert!(effects.is_empty());
        state
    }

    fn session(state: &QuizState) -> &QuizSession {
        match state {
            QuizState::InProgress(session) | QuizState::AwaitingVerdict(session) => session,
            QuizState::Done { session, .. } => session,
            other => panic!("no session in state {}", other.label()),
        }
    }

    /// Selects `choice`, submits, and fires the delayed advance if one was
    /// scheduled. Returns every effect produced along the way.
    fn answer(state: QuizState, choice: usize) -> (QuizState, Vec<Effect>) {
        let (state, _) = state.update(QuizEvent::Select(choice));
        let (mut state, effects) = state.update(QuizEvent::SubmitAnswer);
        if effects.contains(&Effect::ScheduleAdvance(ADVANCE_DELAY)) {
            state = state.update(QuizEvent::Advance).0;
        }
        (state, effects)
    }

    #[test]
    fn initial_state_fetches_questions() {
        let (state, effects) = QuizState::initial();
        assert_eq!(state, QuizState::Loading);
        assert_eq!(effects, vec![Effect::FetchQuestions]);
    }

    #[test]
    fn start_resets_session() {
        let state = started(3);
        let session = session(&state);
        assert_eq!(session.index(), 0);
        assert!(session.answers().is_empty());
        assert_eq!(session.selected_index(), None);
    }

    #[test]
    fn submit_without_selection_is_noop() {
        let state = started(3);
        let before = state.clone();

        let (after, effects) = state.update(QuizEvent::SubmitAnswer);

        assert_eq!(after, before);
        assert!(effects.is_empty());
    }

    #[test]
    fn empty_option_is_not_a_selection() {
        let set = QuestionSet {
            questions: vec![Question {
                id: 0.into(),
                text: "Q".into(),
                options: vec!["".into(), "b".into()],
            }],
        };
        let (state, _) = QuizState::Loading.update(QuizEvent::QuestionsLoaded(set));
        let (state, _) = state.update(QuizEvent::Start);
        let (state, _) = state.update(QuizEvent::Select(0));
        assert!(!session(&state).can_submit());

        let before = state.clone();
        let (after, effects) = state.update(QuizEvent::SubmitAnswer);
        assert_eq!(after, before);
        assert!(effects.is_empty());
    }

    #[test]
    fn out_of_range_selection_is_ignored() {
        let state = started(2);
        let (state, _) = state.update(QuizEvent::Select(7));
        assert_eq!(session(&state).selected_index(), None);
    }

    #[test]
    fn submit_commits_answer_and_schedules_advance() {
        let state = started(3);
        let (state, _) = state.update(QuizEvent::Select(2));
        let (state, effects) = state.update(QuizEvent::SubmitAnswer);

        assert_eq!(effects, vec![Effect::ScheduleAdvance(ADVANCE_DELAY)]);
        let current = session(&state);
        assert_eq!(current.index(), 0);
        assert!(current.is_advancing());
        assert_eq!(current.selected_index(), None);
        assert_eq!(current.answers(), &[Answer::new("Question 0", "Option 0.2")]);

        let (state, effects) = state.update(QuizEvent::Advance);
        assert!(effects.is_empty());
        assert_eq!(session(&state).index(), 1);
        assert_eq!(session(&state).answers().len(), session(&state).index());
    }

    #[test]
    fn selection_is_locked_while_advancing() {
        let state = started(3);
        let (state, _) = state.update(QuizEvent::Select(1));
        let (state, _) = state.update(QuizEvent::SubmitAnswer);

        let (state, _) = state.update(QuizEvent::Select(0));
        let (state, effects) = state.update(QuizEvent::SubmitAnswer);

        assert!(effects.is_empty());
        assert_eq!(session(&state).answers().len(), 1);
    }

    #[test]
    fn stray_advance_does_not_skip_questions() {
        let state = started(3);
        let (state, _) = state.update(QuizEvent::Advance);
        assert_eq!(session(&state).index(), 0);
    }

    #[test]
    fn ten_question_scenario_reaches_done() {
        let mut state = started(10);
        for choice in 0..9 {
            let (next, effects) = answer(state, choice % 4);
            assert!(!effects.iter().any(|e| matches!(e, Effect::RequestVerdict(_))));
            assert!(matches!(next, QuizState::InProgress(_)));
            state = next;
        }

        let (state, _) = state.update(QuizEvent::Select(3));
        let (state, effects) = state.update(QuizEvent::SubmitAnswer);
        assert!(matches!(state, QuizState::AwaitingVerdict(_)));
        let [Effect::RequestVerdict(answers)] = effects.as_slice() else {
            panic!("expected a single verdict request, got {effects:?}");
        };
        assert_eq!(answers.len(), 10);
        assert_eq!(answers[9], Answer::new("Question 9", "Option 9.3"));

        let (state, _) = state.update(QuizEvent::VerdictReceived("X".into()));
        match state {
            QuizState::Done { verdict, .. } => assert_eq!(verdict, "X"),
            other => panic!("expected done, got {}", other.label()),
        }
    }

    #[test]
    fn verdict_failure_shows_fallback() {
        let state = started(1);
        let (state, _) = answer(state, 0);
        let (state, _) = state.update(QuizEvent::VerdictFailed);

        match state {
            QuizState::Done { verdict, .. } => assert_eq!(verdict, VERDICT_FALLBACK),
            other => panic!("expected done, got {}", other.label()),
        }
    }

    #[test]
    fn failed_load_retries_with_identical_request() {
        let (state, first) = QuizState::initial();
        let (state, _) = state.update(QuizEvent::QuestionsFailed("boom".into()));
        assert_eq!(
            state,
            QuizState::LoadFailed {
                message: "boom".into()
            }
        );

        let (state, retry) = state.update(QuizEvent::Retry);
        assert_eq!(state, QuizState::Loading);
        assert_eq!(retry, first);
    }

    #[test]
    fn empty_question_set_is_a_load_failure() {
        let (state, _) = QuizState::Loading.update(QuizEvent::QuestionsLoaded(question_set(0)));
        assert_eq!(
            state,
            QuizState::LoadFailed {
                message: EMPTY_QUESTION_SET.into()
            }
        );
    }

    #[test]
    fn start_again_from_done_resets_everything() {
        let state = started(2);
        let (state, _) = answer(state, 1);
        let (state, _) = answer(state, 2);
        let (state, _) = state.update(QuizEvent::VerdictReceived("verdict".into()));

        let (state, effects) = state.update(QuizEvent::Start);
        assert!(effects.is_empty());
        let session = session(&state);
        assert!(matches!(state, QuizState::InProgress(_)));
        assert_eq!(session.index(), 0);
        assert!(session.answers().is_empty());
        assert_eq!(session.questions().len(), 2);
    }

    #[test]
    fn late_verdict_after_restart_is_ignored() {
        let state = started(1);
        let (state, _) = answer(state, 0);
        let (state, _) = state.update(QuizEvent::VerdictReceived("first".into()));
        let (state, _) = state.update(QuizEvent::Start);
        let before = state.clone();

        let (after, effects) = state.update(QuizEvent::VerdictReceived("late".into()));
        assert_eq!(after, before);
        assert!(effects.is_empty());
    }

    proptest! {
        #[test]
        fn n_submits_record_n_answers_and_one_verdict_request(
            choices in proptest::collection::vec(0usize..4, 1..15)
        ) {
            let mut state = started(choices.len());
            let mut verdict_requests = Vec::new();

            for &choice in &choices {
                let (next, effects) = answer(state, choice);
                verdict_requests.extend(
                    effects
                        .into_iter()
                        .filter(|e| matches!(e, Effect::RequestVerdict(_))),
                );
                state = next;
            }

            prop_assert!(matches!(state, QuizState::AwaitingVerdict(_)));
            prop_assert_eq!(verdict_requests.len(), 1);

            let expected: Vec<Answer> = choices
                .iter()
                .enumerate()
                .map(|(id, choice)| Answer::new(format!("Question {id}"), format!("Option {id}.{choice}")))
                .collect();
            prop_assert_eq!(session(&state).answers(), expected.as_slice());
            prop_assert_eq!(&verdict_requests[0], &Effect::RequestVerdict(expected));
        }
    }
}
